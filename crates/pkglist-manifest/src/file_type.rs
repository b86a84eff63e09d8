use std::path::Path;

/// File name of a build-script manifest
pub const SETUP_PY: &str = "setup.py";

/// The two kinds of manifest this crate can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// Line-oriented `requirements.txt` style file
    RequirementsTxt,
    /// `setup.py` build script
    SetupPy,
}

/// Classify a manifest by its file name. Anything that is not a `setup.py` is read as a
/// requirements file.
pub fn identify_manifest_kind(path: &Path) -> ManifestKind {
    if path.to_string_lossy().ends_with(SETUP_PY) {
        ManifestKind::SetupPy
    } else {
        ManifestKind::RequirementsTxt
    }
}
