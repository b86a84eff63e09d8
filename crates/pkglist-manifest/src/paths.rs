//! Path resolution helpers
//!
//! Paths referenced from a manifest are always resolved against the directory holding that
//! manifest, never against the process working directory.

use std::path::{Component, Path, PathBuf};

use crate::entry::Source;

/// Resolve `original` (as written in a manifest) against the directory of `source`.
///
/// Without a source, or when the source path has no parent, the working directory is used.
pub fn resolve_from_source(source: Option<&Source>, original: &str) -> PathBuf {
    let joined = match source
        .and_then(|source| source.path.parent())
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        Some(parent) => parent.join(original),
        None => PathBuf::from(original),
    };
    realpath(&joined)
}

/// Like Python's `os.path.realpath`: symlinks are resolved for the part of the path that
/// exists, the remainder is normalized lexically. Never fails.
pub fn realpath(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    let normalized = normalize_path(&absolute);

    let mut existing = normalized.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = dunce::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc, component| acc.join(component));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return normalized,
        }
    }
}

/// Normalize a path, removing things like `.` and `..`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = path.components().peekable();
    let mut ret = if let Some(c @ Component::Prefix(..)) = components.peek().copied() {
        components.next();
        PathBuf::from(c.as_os_str())
    } else {
        PathBuf::new()
    };

    for component in components {
        match component {
            Component::Prefix(..) => {}
            Component::RootDir => ret.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => ret.push(c),
        }
    }
    ret
}

/// Display `path` relative to `base`, the way it would be written in a flattened manifest.
pub fn relative_display(path: &Path, base: &Path) -> String {
    match pathdiff::diff_paths(path, base) {
        Some(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Some(relative) => relative.display().to_string(),
        None => path.display().to_string(),
    }
}

/// The working directory, or `.` if it cannot be determined.
pub fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
