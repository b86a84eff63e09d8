//! Passes that run over an aggregated entry stream
//!
//! Each pass is an iterator adapter. Errors from upstream are passed through unchanged and
//! end the stream for every pass that has to look at more than one entry at a time.

use ahash::{AHashMap, AHashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::entry::Entry;
use crate::errors::ManifestError;
use crate::options::ListOptions;
use crate::requirements_txt::read_requirements_txt;

/// Drop every entry matched by a `remove_*` option.
pub fn remove_suppressed<I>(
    input: I,
    options: ListOptions,
) -> impl Iterator<Item = Result<Entry, ManifestError>>
where
    I: Iterator<Item = Result<Entry, ManifestError>>,
{
    input.filter(move |entry| match entry {
        Ok(entry) => !options.suppresses(entry),
        Err(_) => true,
    })
}

/// Replaces constrained requirements by the entries of their constraints files.
///
/// The whole input is consumed on the first call to `next`, since a `-c` line may follow
/// the requirements it constrains. `-c` entries themselves are not emitted.
pub struct InlineConstraints<I> {
    input: Option<I>,
    output: std::vec::IntoIter<Entry>,
}

impl<I> InlineConstraints<I>
where
    I: Iterator<Item = Result<Entry, ManifestError>>,
{
    pub fn new(input: I) -> Self {
        InlineConstraints {
            input: Some(input),
            output: Vec::new().into_iter(),
        }
    }

    fn inline(input: I) -> Result<Vec<Entry>, ManifestError> {
        let mut requirements = Vec::new();
        let mut constraints: AHashMap<String, Vec<Entry>> = AHashMap::new();

        for entry in input {
            match entry? {
                Entry::Constraints(entry) => {
                    debug!("Reading constraints from {}", entry.absolute_path.display());
                    for constraint in read_requirements_txt(&entry.absolute_path)? {
                        let constraint = constraint?;
                        let Some(name) = constraint.canonical_name().map(str::to_string) else {
                            return Err(ManifestError::ConstraintWithoutName(
                                constraint
                                    .source()
                                    .and_then(|source| source.line.clone())
                                    .unwrap_or_else(|| constraint.render()),
                            ));
                        };
                        constraints.entry(name).or_default().push(constraint);
                    }
                }
                entry => requirements.push(entry),
            }
        }

        let mut output = Vec::with_capacity(requirements.len());
        for requirement in requirements {
            match requirement
                .canonical_name()
                .and_then(|name| constraints.get(name))
            {
                Some(replacements) => output.extend(replacements.iter().cloned()),
                None => output.push(requirement),
            }
        }
        Ok(output)
    }
}

impl<I> Iterator for InlineConstraints<I>
where
    I: Iterator<Item = Result<Entry, ManifestError>>,
{
    type Item = Result<Entry, ManifestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(input) = self.input.take() {
            match Self::inline(input) {
                Ok(entries) => self.output = entries.into_iter(),
                Err(err) => return Some(Err(err)),
            }
        }
        self.output.next().map(Ok)
    }
}

/// Drops entries whose rendered line was already emitted, keeping the first occurrence.
pub struct Dedupe<I> {
    input: I,
    base_dir: PathBuf,
    seen: AHashSet<String>,
}

impl<I> Dedupe<I> {
    /// `base_dir` is the directory paths are rendered relative to when building the key.
    pub fn new(input: I, base_dir: &Path) -> Self {
        Dedupe {
            input,
            base_dir: base_dir.to_path_buf(),
            seen: AHashSet::new(),
        }
    }
}

impl<I> Iterator for Dedupe<I>
where
    I: Iterator<Item = Result<Entry, ManifestError>>,
{
    type Item = Result<Entry, ManifestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.input.next()? {
                Ok(entry) => {
                    if self.seen.insert(entry.render_relative_to(&self.base_dir)) {
                        return Some(Ok(entry));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
