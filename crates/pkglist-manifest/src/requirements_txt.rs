use std::path::Path;
use tracing::debug;

use crate::entry::Source;
use crate::errors::ManifestError;
use crate::parser::parse_requirements;
use crate::paths::realpath;
use crate::EntryStream;

/// Open a `requirements.txt` style file and parse it into entries.
///
/// The file is read up front so that a missing or unreadable file fails here, not halfway
/// through iteration. Parsing itself stays lazy.
pub fn read_requirements_txt(path: &Path) -> Result<EntryStream<'static>, ManifestError> {
    let absolute_path = realpath(path);
    let content = std::fs::read_to_string(&absolute_path)
        .map_err(|err| ManifestError::io(&absolute_path, err))?;

    debug!(
        "Read {} ({} lines)",
        absolute_path.display(),
        content.lines().count()
    );

    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    Ok(Box::new(parse_requirements(
        Some(Source::file(absolute_path)),
        lines,
    )))
}
