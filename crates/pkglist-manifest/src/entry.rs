//! Entry model
//!
//! Every line of a manifest becomes exactly one [`Entry`]. Entries are immutable once parsed;
//! the passes that run over them select or replace entries, they never edit them.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::paths::{current_dir, relative_display};

/// Where an entry was read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    /// Absolute path of the manifest
    pub path: PathBuf,
    /// The cleaned line text
    pub line: Option<String>,
    /// 1-based line number
    pub line_number: Option<usize>,
}

impl Source {
    /// A file-level source, with no line attached yet
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Source {
            path: path.into(),
            line: None,
            line_number: None,
        }
    }

    /// The source of a single line within this file
    pub fn at_line(&self, line: &str, line_number: usize) -> Self {
        Source {
            path: self.path.clone(),
            line: Some(line.to_string()),
            line_number: Some(line_number),
        }
    }

    /// `path:line` for error messages
    pub fn location(&self) -> String {
        match self.line_number {
            Some(line_number) => format!("{}:{}", self.path.display(), line_number),
            None => self.path.display().to_string(),
        }
    }
}

/// `-r <path>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecursiveEntry {
    pub source: Option<Source>,
    pub original_path: String,
    pub absolute_path: PathBuf,
    /// Trailing ` --option ...` text, kept verbatim
    pub options: Option<String>,
}

/// `-c <path>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintsEntry {
    pub source: Option<Source>,
    pub original_path: String,
    pub absolute_path: PathBuf,
    /// Trailing ` --option ...` text, kept verbatim
    pub options: Option<String>,
}

/// `-e <path>[extras]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditableEntry {
    pub source: Option<Source>,
    pub original_path: String,
    pub absolute_path: PathBuf,
    /// `original_path`, pointing at the package's `setup.py`
    pub resolved_path: String,
    pub resolved_absolute_path: PathBuf,
    pub extras: Vec<String>,
    pub options: Option<String>,
}

/// `-i <url>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexUrlEntry {
    pub source: Option<Source>,
    pub url: String,
}

/// `<vcs>+<uri>[@tag][#egg=name]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VcsPackageEntry {
    pub source: Option<Source>,
    pub vcs: String,
    pub uri: String,
    pub tag: Option<String>,
    pub name: Option<String>,
    /// Fragment parameters other than `egg=`, e.g. `subdirectory=src`
    pub fragment: Option<String>,
    pub markers: Option<String>,
    pub options: Option<String>,
}

/// `<url>.whl[#egg=name]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WheelPackageEntry {
    pub source: Option<Source>,
    pub uri: String,
    pub name: Option<String>,
    pub markers: Option<String>,
    pub options: Option<String>,
}

/// `<name> @ <uri>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectRefEntry {
    pub source: Option<Source>,
    pub name: String,
    pub extras: Vec<String>,
    pub uri: String,
    pub markers: Option<String>,
    pub options: Option<String>,
}

/// `<name>[extras][<op><version>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageEntry {
    pub source: Option<Source>,
    pub name: String,
    pub extras: Vec<String>,
    pub operator: Option<String>,
    pub version: Option<String>,
    pub markers: Option<String>,
    pub options: Option<String>,
}

/// One parsed manifest line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Entry {
    Recursive(RecursiveEntry),
    Constraints(ConstraintsEntry),
    Editable(EditableEntry),
    IndexUrl(IndexUrlEntry),
    Vcs(VcsPackageEntry),
    Wheel(WheelPackageEntry),
    DirectRef(DirectRefEntry),
    Package(PackageEntry),
}

/// Discriminant of [`Entry`], used for filtering and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Recursive,
    Constraints,
    Editable,
    IndexUrl,
    Vcs,
    Wheel,
    DirectRef,
    Package,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::Recursive => "recursive",
            EntryKind::Constraints => "constraints",
            EntryKind::Editable => "editable",
            EntryKind::IndexUrl => "index-url",
            EntryKind::Vcs => "vcs",
            EntryKind::Wheel => "wheel",
            EntryKind::DirectRef => "direct-ref",
            EntryKind::Package => "package",
        };
        f.write_str(name)
    }
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Recursive(_) => EntryKind::Recursive,
            Entry::Constraints(_) => EntryKind::Constraints,
            Entry::Editable(_) => EntryKind::Editable,
            Entry::IndexUrl(_) => EntryKind::IndexUrl,
            Entry::Vcs(_) => EntryKind::Vcs,
            Entry::Wheel(_) => EntryKind::Wheel,
            Entry::DirectRef(_) => EntryKind::DirectRef,
            Entry::Package(_) => EntryKind::Package,
        }
    }

    pub fn source(&self) -> Option<&Source> {
        match self {
            Entry::Recursive(entry) => entry.source.as_ref(),
            Entry::Constraints(entry) => entry.source.as_ref(),
            Entry::Editable(entry) => entry.source.as_ref(),
            Entry::IndexUrl(entry) => entry.source.as_ref(),
            Entry::Vcs(entry) => entry.source.as_ref(),
            Entry::Wheel(entry) => entry.source.as_ref(),
            Entry::DirectRef(entry) => entry.source.as_ref(),
            Entry::Package(entry) => entry.source.as_ref(),
        }
    }

    /// The installable package name, if this entry names one
    pub fn canonical_name(&self) -> Option<&str> {
        match self {
            Entry::Recursive(_)
            | Entry::Constraints(_)
            | Entry::Editable(_)
            | Entry::IndexUrl(_) => None,
            Entry::Vcs(entry) => entry.name.as_deref(),
            Entry::Wheel(entry) => entry.name.as_deref(),
            Entry::DirectRef(entry) => Some(&entry.name),
            Entry::Package(entry) => Some(&entry.name),
        }
    }

    /// Render as a manifest line, with paths relative to the working directory
    pub fn render(&self) -> String {
        self.render_relative_to(&current_dir())
    }

    /// Render as a manifest line, with paths relative to `base`
    ///
    /// This is also the key used for de-duplication.
    pub fn render_relative_to(&self, base: &Path) -> String {
        let mut out = String::new();
        match self {
            Entry::Recursive(entry) => {
                out.push_str("-r ");
                out.push_str(&relative_display(&entry.absolute_path, base));
                push_options(&mut out, entry.options.as_deref());
            }
            Entry::Constraints(entry) => {
                out.push_str("-c ");
                out.push_str(&relative_display(&entry.absolute_path, base));
                push_options(&mut out, entry.options.as_deref());
            }
            Entry::Editable(entry) => {
                out.push_str("-e ");
                out.push_str(&relative_display(&entry.absolute_path, base));
                push_extras(&mut out, &entry.extras);
                push_options(&mut out, entry.options.as_deref());
            }
            Entry::IndexUrl(entry) => {
                out.push_str("-i ");
                out.push_str(&entry.url);
            }
            Entry::Vcs(entry) => {
                out.push_str(&entry.vcs);
                out.push('+');
                out.push_str(&entry.uri);
                if let Some(tag) = &entry.tag {
                    out.push('@');
                    out.push_str(tag);
                }
                match (&entry.name, &entry.fragment) {
                    (Some(name), Some(fragment)) => {
                        out.push_str(&format!("#egg={name}&{fragment}"));
                    }
                    (Some(name), None) => out.push_str(&format!("#egg={name}")),
                    (None, Some(fragment)) => out.push_str(&format!("#{fragment}")),
                    (None, None) => {}
                }
                push_spaced_markers(&mut out, entry.markers.as_deref());
                push_options(&mut out, entry.options.as_deref());
            }
            Entry::Wheel(entry) => {
                out.push_str(&entry.uri);
                if let Some(name) = &entry.name {
                    out.push_str("#egg=");
                    out.push_str(name);
                }
                push_spaced_markers(&mut out, entry.markers.as_deref());
                push_options(&mut out, entry.options.as_deref());
            }
            Entry::DirectRef(entry) => {
                out.push_str(&entry.name);
                push_extras(&mut out, &entry.extras);
                out.push_str(" @ ");
                out.push_str(&entry.uri);
                push_spaced_markers(&mut out, entry.markers.as_deref());
                push_options(&mut out, entry.options.as_deref());
            }
            Entry::Package(entry) => {
                out.push_str(&entry.name);
                push_extras(&mut out, &entry.extras);
                if let Some(operator) = &entry.operator {
                    out.push_str(operator);
                }
                if let Some(version) = &entry.version {
                    out.push_str(version);
                }
                if let Some(markers) = &entry.markers {
                    out.push_str("; ");
                    out.push_str(markers);
                }
                push_options(&mut out, entry.options.as_deref());
            }
        }
        out
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn push_extras(out: &mut String, extras: &[String]) {
    if !extras.is_empty() {
        out.push('[');
        out.push_str(&extras.join(","));
        out.push(']');
    }
}

fn push_spaced_markers(out: &mut String, markers: Option<&str>) {
    if let Some(markers) = markers {
        out.push_str(" ; ");
        out.push_str(markers);
    }
}

fn push_options(out: &mut String, options: Option<&str>) {
    if let Some(options) = options {
        out.push(' ');
        out.push_str(options);
    }
}
