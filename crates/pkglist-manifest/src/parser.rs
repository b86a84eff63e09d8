//! Parses the `requirements.txt` line grammar
//!
//! <https://pip.pypa.io/en/stable/reference/requirements-file-format/>
//!
//! Each line is cleaned, stripped of its options (` --hash=...`), markers (`; ...`) and extras
//! (`[...]`), and then classified. The first matching rule wins:
//!
//! ```text
//! recursive    = ('-r' | '--requirement') ('=' | ws) path
//! constraints  = ('-c' | '--constraint') ('=' | ws) path
//! editable     = ('-e' | '--editable') ('=' | ws) path
//! index_url    = ('-i' | '--index-url') ('=' | ws) url
//! vcs          = [a-zA-Z][a-zA-Z0-9]* '+' uri ('@' tag)? ('#egg=' name)?
//! direct_ref   = name ws? '@' ws? uri
//! wheel        = ('http' | 'https' | 'file') '://' any* '.whl' ('#egg=' name)?
//! package      = name (('==' | '>=' | '>' | '<=' | '<') version)?
//! ```
//!
//! Comments (`#` at the start of a line) and blank lines are skipped. Line numbers count every
//! raw line, including skipped ones.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use url::Url;

use crate::entry::{
    ConstraintsEntry, DirectRefEntry, EditableEntry, Entry, IndexUrlEntry, PackageEntry,
    RecursiveEntry, Source, VcsPackageEntry, WheelPackageEntry,
};
use crate::errors::ManifestError;
use crate::file_type::SETUP_PY;
use crate::paths::{realpath, resolve_from_source};

/// Version operators, longest first so that `>=` is never split as `>` + `=1.0`
const OPERATORS: [&str; 5] = ["==", ">=", ">", "<=", "<"];

static VCS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*\+").unwrap_or_else(|_| unreachable!()));

static WHEEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?|file)://\S+\.whl(?:#egg=\S+)?$").unwrap_or_else(|_| unreachable!())
});

/// Parse manifest lines into entries, lazily and in file order.
///
/// `source` is the manifest the lines came from; each entry gets a copy of it with the line
/// text and number filled in. Relative paths are resolved against the source's directory.
pub fn parse_requirements<'a, I>(
    source: Option<Source>,
    lines: I,
) -> impl Iterator<Item = Result<Entry, ManifestError>> + 'a
where
    I: IntoIterator + 'a,
    I::Item: AsRef<str>,
    I::IntoIter: 'a,
{
    lines
        .into_iter()
        .enumerate()
        .filter_map(move |(index, raw)| {
            let line = clean_line(raw.as_ref());
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let line_source = source.as_ref().map(|source| source.at_line(&line, index + 1));
            Some(parse_line(line_source, &line))
        })
}

/// Trim a raw line, drop stray line breaks and collapse runs of spaces.
pub fn clean_line(line: &str) -> String {
    let mut cleaned = line.trim().replace(['\r', '\n'], "");
    while cleaned.contains("  ") {
        cleaned = cleaned.replace("  ", " ");
    }
    cleaned
}

/// Parse a single cleaned, non-empty line.
pub fn parse_line(source: Option<Source>, line: &str) -> Result<Entry, ManifestError> {
    let (line_without_options, options) = split_options(line);
    let (requirement, markers) = split_markers(line_without_options);
    let (requirement, extras) = split_extras(requirement);
    let requirement = requirement.as_str();

    if let Some(path) = strip_flag(requirement, "-r", "--requirement") {
        let original_path = required(path, source.as_ref(), line)?;
        let absolute_path = resolve_from_source(source.as_ref(), &original_path);
        return Ok(Entry::Recursive(RecursiveEntry {
            source,
            original_path,
            absolute_path,
            options,
        }));
    }

    if let Some(path) = strip_flag(requirement, "-c", "--constraint") {
        let original_path = required(path, source.as_ref(), line)?;
        let absolute_path = resolve_from_source(source.as_ref(), &original_path);
        return Ok(Entry::Constraints(ConstraintsEntry {
            source,
            original_path,
            absolute_path,
            options,
        }));
    }

    if let Some(path) = strip_flag(requirement, "-e", "--editable") {
        let original_path = required(path, source.as_ref(), line)?;
        return Ok(parse_editable(source, original_path, extras, options));
    }

    // The index URL is taken verbatim from the whole line, options included.
    if let Some(url) = strip_flag(line, "-i", "--index-url") {
        let url = required(url, source.as_ref(), line)?;
        return Ok(Entry::IndexUrl(IndexUrlEntry { source, url }));
    }

    if VCS_PATTERN.is_match(requirement) {
        return Ok(parse_vcs(source, requirement, markers, options));
    }

    if let Some((name, uri)) = requirement.split_once('@') {
        let name = required(name, source.as_ref(), line)?;
        return Ok(Entry::DirectRef(DirectRefEntry {
            source,
            name,
            extras,
            uri: uri.trim().to_string(),
            markers,
            options,
        }));
    }

    if WHEEL_PATTERN.is_match(requirement) {
        let (uri, name) = match requirement.split_once("#egg=") {
            Some((uri, name)) => (uri, Some(name.to_string())),
            None => (requirement, None),
        };
        return Ok(Entry::Wheel(WheelPackageEntry {
            source,
            uri: uri.to_string(),
            name,
            markers,
            options,
        }));
    }

    let (name, operator, version) = OPERATORS
        .iter()
        .find_map(|operator| {
            requirement
                .split_once(operator)
                .map(|(name, version)| (name, Some(operator.to_string()), Some(version.trim())))
        })
        .unwrap_or((requirement, None, None));
    let name = required(name, source.as_ref(), line)?;

    Ok(Entry::Package(PackageEntry {
        source,
        name,
        extras,
        operator,
        version: version
            .filter(|version| !version.is_empty())
            .map(str::to_string),
        markers,
        options,
    }))
}

fn parse_editable(
    source: Option<Source>,
    original_path: String,
    extras: Vec<String>,
    options: Option<String>,
) -> Entry {
    let resolved_path = if original_path.ends_with(SETUP_PY) {
        original_path.clone()
    } else {
        Path::new(&original_path)
            .join(SETUP_PY)
            .to_string_lossy()
            .into_owned()
    };
    let absolute_path = resolve_from_source(source.as_ref(), &original_path);
    let resolved_absolute_path = if original_path.ends_with(SETUP_PY) {
        absolute_path.clone()
    } else {
        realpath(&absolute_path.join(SETUP_PY))
    };

    Entry::Editable(EditableEntry {
        source,
        original_path,
        absolute_path,
        resolved_path,
        resolved_absolute_path,
        extras,
        options,
    })
}

fn parse_vcs(
    source: Option<Source>,
    requirement: &str,
    markers: Option<String>,
    options: Option<String>,
) -> Entry {
    let (vcs, uri) = requirement.split_once('+').unwrap_or((requirement, ""));

    let (uri, tag, name, fragment) = if uri.contains("://") {
        match Url::parse(uri) {
            Ok(url) => split_vcs_url(url),
            Err(_) => split_vcs_shorthand(uri),
        }
    } else {
        split_vcs_shorthand(uri)
    };

    Entry::Vcs(VcsPackageEntry {
        source,
        vcs: vcs.to_string(),
        uri,
        tag,
        name,
        fragment,
        markers,
        options,
    })
}

type VcsParts = (String, Option<String>, Option<String>, Option<String>);

/// `scheme://[user@]host/path[@tag][#fragment]`; the tag lives on the path, which keeps it
/// apart from credentials.
fn split_vcs_url(mut url: Url) -> VcsParts {
    let (name, fragment) = url.fragment().map(split_fragment).unwrap_or_default();
    url.set_fragment(None);

    let path = url.path().to_string();
    let tag = match path.rsplit_once('@') {
        Some((head, tag)) => {
            url.set_path(head);
            non_empty_string(tag)
        }
        None => None,
    };

    (url.to_string(), tag, name, fragment)
}

/// `user@host:path[@tag][#fragment]`; only the repository path may carry a tag. The path starts
/// after the last `:`, or after the first `/` when there is no `:`.
fn split_vcs_shorthand(uri: &str) -> VcsParts {
    let (rest, name, fragment) = match uri.split_once('#') {
        Some((rest, fragment)) => {
            let (name, fragment) = split_fragment(fragment);
            (rest, name, fragment)
        }
        None => (uri, None, None),
    };

    let repo_start = rest
        .rfind(':')
        .or_else(|| rest.find('/'))
        .map(|separator| separator + 1);
    let tag_at = repo_start.and_then(|start| rest[start..].rfind('@').map(|at| start + at));
    let (uri, tag) = match tag_at {
        Some(at) => (&rest[..at], non_empty_string(&rest[at + 1..])),
        None => (rest, None),
    };

    (uri.to_string(), tag, name, fragment)
}

/// Split `egg=name&subdirectory=x` into the egg name and the remaining parameters.
fn split_fragment(fragment: &str) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut rest = Vec::new();
    for part in fragment.split('&') {
        if let Some(egg) = part.strip_prefix("egg=") {
            name = non_empty_string(egg);
        } else if !part.is_empty() {
            rest.push(part);
        }
    }
    let rest = if rest.is_empty() {
        None
    } else {
        Some(rest.join("&"))
    };
    (name, rest)
}

/// `django==1.0 --hash=sha256:...` -> (`django==1.0`, `--hash=sha256:...`)
fn split_options(line: &str) -> (&str, Option<String>) {
    match line.find(" --") {
        Some(index) => (
            line[..index].trim_end(),
            non_empty_string(line[index..].trim()),
        ),
        None => (line, None),
    }
}

/// `django==1.0; python_version < "3.9"` -> (`django==1.0`, `python_version < "3.9"`)
fn split_markers(line: &str) -> (&str, Option<String>) {
    match line.split_once(';') {
        Some((requirement, markers)) => (requirement.trim(), non_empty_string(markers.trim())),
        None => (line, None),
    }
}

/// `django[bcrypt, argon2]==4.0` -> (`django==4.0`, [`bcrypt`, `argon2`])
fn split_extras(requirement: &str) -> (String, Vec<String>) {
    let Some(start) = requirement.find('[') else {
        return (requirement.to_string(), Vec::new());
    };
    let Some(length) = requirement[start..].find(']') else {
        return (requirement.to_string(), Vec::new());
    };
    let end = start + length;

    let extras = requirement[start + 1..end]
        .split(',')
        .map(str::trim)
        .filter(|extra| !extra.is_empty())
        .map(str::to_string)
        .collect();
    let remainder = format!("{}{}", &requirement[..start], &requirement[end + 1..]);
    (remainder.trim().to_string(), extras)
}

/// In `-<key>=<value>` or `-<key> <value>`, return the value.
fn strip_flag<'a>(line: &'a str, short: &str, long: &str) -> Option<&'a str> {
    let rest = line
        .strip_prefix(long)
        .or_else(|| line.strip_prefix(short))?
        .trim_start();
    Some(rest.strip_prefix('=').unwrap_or(rest).trim())
}

fn required(value: &str, source: Option<&Source>, line: &str) -> Result<String, ManifestError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ManifestError::EntryParse {
            line: line.to_string(),
            location: source.map_or_else(|| "<input>".to_string(), Source::location),
        });
    }
    Ok(value.to_string())
}

fn non_empty_string(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
