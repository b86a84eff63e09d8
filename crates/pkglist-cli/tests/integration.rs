//! Integration tests for pip-package-list

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project tree plus an isolated config file
struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> io::Result<Self> {
        Ok(Project {
            dir: TempDir::new()?,
        })
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.path().join("config").join("config.toml")
    }

    fn write(&self, name: &str, content: &str) -> io::Result<PathBuf> {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("pip-package-list");
        cmd.env("PIP_PACKAGE_LIST_CONFIG", self.config_path())
            .env_remove("RUST_LOG")
            .current_dir(self.path());
        cmd
    }
}

#[test]
fn test_version() -> io::Result<()> {
    Project::new()?
        .command()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pip-package-list"));
    Ok(())
}

#[test]
fn test_help() -> io::Result<()> {
    Project::new()?
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("flattens requirements files"));
    Ok(())
}

#[test]
fn test_invalid_command() -> io::Result<()> {
    Project::new()?.command().arg("invalid").assert().failure();
    Ok(())
}

#[test]
fn test_list_requires_files() -> io::Result<()> {
    Project::new()?.command().arg("list").assert().failure();
    Ok(())
}

#[test]
fn test_list_prints_entries_in_order() -> io::Result<()> {
    let project = Project::new()?;
    project.write(
        "requirements.txt",
        "# pinned\n-i https://pypi.org/simple\n-r base.txt\ndjango==1.0  # web\n\nsix\n",
    )?;
    project.write("base.txt", "pyyaml>=5\n")?;

    project
        .command()
        .args(["list", "requirements.txt"])
        .assert()
        .success()
        .stdout("-i https://pypi.org/simple\n-r base.txt\ndjango==1.0\nsix\n");
    Ok(())
}

#[test]
fn test_list_recurse_recursive() -> io::Result<()> {
    let project = Project::new()?;
    project.write("requirements.txt", "-r base.txt\ndjango==1.0\n")?;
    project.write("base.txt", "pyyaml>=5\n")?;

    project
        .command()
        .args(["list", "--recurse-recursive", "requirements.txt"])
        .assert()
        .success()
        .stdout("django==1.0\npyyaml>=5\n");
    Ok(())
}

#[test]
fn test_list_remove_flags() -> io::Result<()> {
    let project = Project::new()?;
    project.write(
        "requirements.txt",
        "-i https://pypi.org/simple\ngit+https://github.com/org/repo.git#egg=repo\nsix\ndjango==1.0\n",
    )?;

    project
        .command()
        .args([
            "list",
            "--remove-index-urls",
            "--remove-vcs",
            "--remove-unversioned",
            "requirements.txt",
        ])
        .assert()
        .success()
        .stdout("django==1.0\n");
    Ok(())
}

#[test]
fn test_list_dedupe_across_files() -> io::Result<()> {
    let project = Project::new()?;
    project.write("a.txt", "django==1.0\nsix\n")?;
    project.write("b.txt", "six\nredis\n")?;

    project
        .command()
        .args(["list", "--dedupe", "a.txt", "b.txt"])
        .assert()
        .success()
        .stdout("django==1.0\nsix\nredis\n");
    Ok(())
}

#[test]
fn test_list_inline_constraints() -> io::Result<()> {
    let project = Project::new()?;
    project.write("requirements.txt", "-c constraints.txt\ndjango\nsix\n")?;
    project.write("constraints.txt", "django==1.0\n")?;

    project
        .command()
        .args(["list", "--inline-constraints", "requirements.txt"])
        .assert()
        .success()
        .stdout("django==1.0\nsix\n");
    Ok(())
}

#[test]
fn test_list_setup_py_statically() -> io::Result<()> {
    let project = Project::new()?;
    project.write(
        "setup.py",
        r#"from setuptools import setup

setup(
    name="mywhopackage",
    install_requires=["django==1.0"],
    extras_require={"test": ["pytest==2.0"]},
)
"#,
    )?;

    project
        .command()
        .args(["list", "setup.py"])
        .assert()
        .success()
        .stdout("django==1.0\n");
    Ok(())
}

#[test]
fn test_list_recurse_editable_with_extras() -> io::Result<()> {
    let project = Project::new()?;
    project.write("requirements.txt", "-e ./pkg[test]\n")?;
    project.write(
        "pkg/setup.py",
        "import setuptools\nsetuptools.setup(install_requires=['six'], extras_require={'test': ['pytest==2.0']})\n",
    )?;

    project
        .command()
        .args(["list", "--recurse-editable", "requirements.txt"])
        .assert()
        .success()
        .stdout("six\npytest==2.0\n");
    Ok(())
}

#[test]
fn test_list_json_format() -> Result<(), Box<dyn std::error::Error>> {
    let project = Project::new()?;
    project.write("requirements.txt", "django==1.0\n")?;

    let output = project
        .command()
        .args(["list", "--format", "json", "requirements.txt"])
        .output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value[0]["kind"], "package");
    assert_eq!(value[0]["line"], "django==1.0");
    assert_eq!(value[0]["name"], "django");
    assert_eq!(value[0]["source"]["line_number"], 1);
    Ok(())
}

#[test]
fn test_list_missing_file_fails() -> io::Result<()> {
    let project = Project::new()?;
    project
        .command()
        .args(["list", "missing.txt"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("missing.txt"));
    Ok(())
}

#[test]
fn test_list_parse_error_names_location() -> io::Result<()> {
    let project = Project::new()?;
    project.write("requirements.txt", "django==1.0\n-r\n")?;

    project
        .command()
        .args(["list", "requirements.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requirements.txt:2"));
    Ok(())
}

#[test]
fn test_list_constraint_without_name_fails() -> io::Result<()> {
    let project = Project::new()?;
    project.write("requirements.txt", "-c constraints.txt\n")?;
    project.write("constraints.txt", "-i https://pypi.org/simple\n")?;

    project
        .command()
        .args(["list", "--inline-constraints", "requirements.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not have a name"));
    Ok(())
}

#[test]
fn test_config_path() -> io::Result<()> {
    let project = Project::new()?;
    project
        .command()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
    Ok(())
}

#[test]
fn test_config_show_defaults() -> io::Result<()> {
    let project = Project::new()?;
    project
        .command()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:"));
    Ok(())
}

#[test]
fn test_config_set_and_get() -> io::Result<()> {
    let project = Project::new()?;
    project
        .command()
        .args(["config", "set", "evaluator", "python"])
        .assert()
        .success();
    assert!(project.config_path().exists());

    project
        .command()
        .args(["config", "get", "evaluator"])
        .assert()
        .success()
        .stdout("python\n");
    Ok(())
}

#[test]
fn test_config_set_unknown_key_fails() -> io::Result<()> {
    let project = Project::new()?;
    project
        .command()
        .args(["config", "set", "cache-path", "/tmp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
    Ok(())
}

#[test]
fn test_config_list_defaults_apply() -> io::Result<()> {
    let project = Project::new()?;
    project.write("requirements.txt", "six\ndjango==1.0\n")?;

    project
        .command()
        .args(["config", "set", "list.remove-unversioned", "true"])
        .assert()
        .success();

    project
        .command()
        .args(["list", "requirements.txt"])
        .assert()
        .success()
        .stdout("django==1.0\n");
    Ok(())
}
