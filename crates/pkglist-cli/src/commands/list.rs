use crate::output::{render_entries, OutputFormat};
use clap::Args;
use colored::Colorize;
use pkglist_ast::StaticSetupEvaluator;
use pkglist_config::{Config, EvaluatorKind};
use pkglist_logger as logger;
use pkglist_manifest::{ListOptions, PackageLister, SetupEvaluator};
use pkglist_python::PythonSetupEvaluator;
use std::path::PathBuf;
use tracing::debug;

/// Flatten requirements files and `setup.py` manifests into a single list
#[derive(Args, Debug, Clone, Default)]
pub struct ListCommand {
    /// Manifests to list, in order (requirements files or setup.py)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// List the contents of `-r` files instead of the `-r` lines
    #[arg(long)]
    pub recurse_recursive: bool,
    /// List the requirements of `-e` packages instead of the `-e` lines
    #[arg(long)]
    pub recurse_editable: bool,
    /// Replace constrained requirements with the matching lines of `-c` files
    #[arg(long)]
    pub inline_constraints: bool,
    #[arg(long)]
    pub remove_editable: bool,
    #[arg(long)]
    pub remove_recursive: bool,
    #[arg(long)]
    pub remove_constraints: bool,
    #[arg(long)]
    pub remove_vcs: bool,
    #[arg(long)]
    pub remove_wheel: bool,
    /// Drop plain requirements without a version
    #[arg(long)]
    pub remove_unversioned: bool,
    #[arg(long)]
    pub remove_index_urls: bool,
    /// Drop entries that repeat an earlier line
    #[arg(long)]
    pub dedupe: bool,

    /// How to read setup.py files [default: from config, else static]
    #[arg(long, value_name = "static|python")]
    pub evaluator: Option<EvaluatorKind>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl ListCommand {
    /// The options given on the command line
    pub fn options(&self) -> ListOptions {
        ListOptions {
            recurse_recursive: self.recurse_recursive,
            recurse_editable: self.recurse_editable,
            inline_constraints: self.inline_constraints,
            remove_editable: self.remove_editable,
            remove_recursive: self.remove_recursive,
            remove_constraints: self.remove_constraints,
            remove_vcs: self.remove_vcs,
            remove_wheel: self.remove_wheel,
            remove_unversioned: self.remove_unversioned,
            remove_index_urls: self.remove_index_urls,
            dedupe: self.dedupe,
        }
    }
}

fn build_evaluator(
    kind: EvaluatorKind,
    config: &Config,
) -> Result<Box<dyn SetupEvaluator>, String> {
    match kind {
        EvaluatorKind::Static => Ok(Box::new(StaticSetupEvaluator)),
        EvaluatorKind::Python => {
            let evaluator = PythonSetupEvaluator::discover(config)
                .map_err(|e| format!("Cannot use the python evaluator: {}", e))?;
            logger::warn("setup.py files will be executed by the python evaluator");
            logger::debug(&format!(
                "Using interpreter {}",
                evaluator.interpreter().display()
            ));
            Ok(Box::new(evaluator))
        }
    }
}

/// List the entries of `cmd.files` and print them on stdout.
///
/// Nothing is printed when any manifest fails to read; the first error is returned.
pub fn handle_list(cmd: ListCommand, config: &Config) -> Result<(), String> {
    let options = cmd.options().merge(config.list);
    let kind = cmd.evaluator.unwrap_or_else(|| config.evaluator());
    debug!(?options, evaluator = %kind, "Listing {} manifest(s)", cmd.files.len());

    let evaluator = build_evaluator(kind, config)?;
    let lister = PackageLister::new(options, evaluator.as_ref());

    logger::spinner_start("Reading manifests");
    let mut entries = Vec::new();
    for result in lister.list(&cmd.files) {
        match result {
            Ok(entry) => {
                if let Some(source) = entry.source() {
                    logger::spinner_message(&format!("Reading {}", source.path.display()));
                }
                logger::step(&format!("{}: {}", entry.kind(), entry.render()));
                entries.push(entry);
            }
            Err(e) => {
                logger::spinner_error("Listing failed");
                return Err(e.to_string());
            }
        }
    }
    logger::spinner_stop();

    let rendered = render_entries(&entries, cmd.format, lister.base_dir())?;
    print!("{}", rendered);

    logger::info(&format!(
        "{} {} entries",
        "Listed".green(),
        entries.len()
    ));
    Ok(())
}
