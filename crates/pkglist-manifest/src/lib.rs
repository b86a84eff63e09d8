//! Requirements manifest flattening
//!
//! This crate turns one or more interlinked dependency manifests into a single ordered list of
//! entries. It handles:
//! - the `requirements.txt` line grammar (`-r`, `-c`, `-e`, `-i`, VCS, wheel, direct references
//!   and plain packages)
//! - `setup.py` manifests, through a pluggable [`SetupEvaluator`]
//! - the traversal that follows `-r` includes and `-e` editables into further manifests
//! - post-processing passes: kind removal, constraint inlining and de-duplication
//!
//! Reading is lazy: each manifest is opened only once the traversal reaches it, and entries are
//! handed out as they are parsed.

pub mod entry;
pub mod errors;
pub mod file_type;
pub mod filters;
pub mod lister;
pub mod options;
pub mod parser;
pub mod paths;
pub mod requirements_txt;
pub mod setup_py;

pub use entry::{
    ConstraintsEntry, DirectRefEntry, EditableEntry, Entry, EntryKind, IndexUrlEntry,
    PackageEntry, RecursiveEntry, Source, VcsPackageEntry, WheelPackageEntry,
};
pub use errors::ManifestError;
pub use file_type::{identify_manifest_kind, ManifestKind, SETUP_PY};
pub use lister::{list_packages, PackageLister};
pub use options::ListOptions;
pub use parser::{clean_line, parse_requirements};
pub use requirements_txt::read_requirements_txt;
pub use setup_py::{read_setup_py, SetupEvaluator, SetupMetadata};

/// A lazily produced sequence of parsed entries.
pub type EntryStream<'a> = Box<dyn Iterator<Item = Result<Entry, ManifestError>> + 'a>;
