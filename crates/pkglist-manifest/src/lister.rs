//! Traversal over interlinked manifests
//!
//! Manifests are processed from a queue. The manifest at the head of the queue is read to the
//! end before the next one is opened; manifests discovered through `-r` and `-e` entries are
//! appended to the tail. A nested file's entries therefore come after the rest of the file that
//! referenced it, not at the point of reference.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::entry::Entry;
use crate::errors::ManifestError;
use crate::file_type::{identify_manifest_kind, ManifestKind};
use crate::filters::{remove_suppressed, Dedupe, InlineConstraints};
use crate::options::ListOptions;
use crate::paths::{current_dir, realpath};
use crate::requirements_txt::read_requirements_txt;
use crate::setup_py::{read_setup_py, SetupEvaluator};
use crate::EntryStream;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingManifest {
    Requirements(PathBuf),
    SetupPy { path: PathBuf, extras: Vec<String> },
}

impl PendingManifest {
    fn path(&self) -> &Path {
        match self {
            PendingManifest::Requirements(path) | PendingManifest::SetupPy { path, .. } => path,
        }
    }

    fn from_path(path: &Path) -> Self {
        let path = realpath(path);
        match identify_manifest_kind(&path) {
            ManifestKind::RequirementsTxt => PendingManifest::Requirements(path),
            ManifestKind::SetupPy => PendingManifest::SetupPy {
                path,
                extras: Vec::new(),
            },
        }
    }
}

/// A queued manifest and the chain of manifests that included it
#[derive(Debug)]
struct Pending {
    manifest: PendingManifest,
    ancestors: Vec<PathBuf>,
}

/// The raw traversal: every entry of every reachable manifest, with recursion applied
pub struct PackageList<'a> {
    pending: VecDeque<Pending>,
    current: Option<EntryStream<'static>>,
    /// The manifest being read, preceded by the manifests that included it
    chain: Vec<PathBuf>,
    options: ListOptions,
    evaluator: &'a dyn SetupEvaluator,
    manifests_read: usize,
    entries_listed: usize,
    done: bool,
}

impl<'a> PackageList<'a> {
    pub fn new<I>(paths: I, options: ListOptions, evaluator: &'a dyn SetupEvaluator) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let pending = paths
            .into_iter()
            .map(|path| Pending {
                manifest: PendingManifest::from_path(path.as_ref()),
                ancestors: Vec::new(),
            })
            .collect();
        PackageList {
            pending,
            current: None,
            chain: Vec::new(),
            options,
            evaluator,
            manifests_read: 0,
            entries_listed: 0,
            done: false,
        }
    }

    fn open(&mut self, pending: Pending) -> Result<EntryStream<'static>, ManifestError> {
        self.manifests_read += 1;
        let Pending {
            manifest,
            mut ancestors,
        } = pending;
        ancestors.push(manifest.path().to_path_buf());
        self.chain = ancestors;
        match manifest {
            PendingManifest::Requirements(path) => {
                debug!("Opening {}", path.display());
                read_requirements_txt(&path)
            }
            PendingManifest::SetupPy { path, extras } => {
                debug!("Evaluating {} with extras {:?}", path.display(), extras);
                read_setup_py(&path, &extras, self.evaluator)
            }
        }
    }

    /// Queue a manifest found through an entry of the current one. A manifest that is already
    /// part of the current include chain is skipped, so include cycles terminate; the same file
    /// reached through different paths is read each time.
    fn enqueue(&mut self, manifest: PendingManifest) {
        if self.chain.iter().any(|ancestor| ancestor == manifest.path()) {
            debug!("Skipping {}, it includes itself", manifest.path().display());
            return;
        }
        self.pending.push_back(Pending {
            manifest,
            ancestors: self.chain.clone(),
        });
    }

    fn fail(&mut self, err: ManifestError) -> Option<Result<Entry, ManifestError>> {
        self.done = true;
        self.current = None;
        self.pending.clear();
        Some(Err(err))
    }
}

impl Iterator for PackageList<'_> {
    type Item = Result<Entry, ManifestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            let Some(current) = self.current.as_mut() else {
                let Some(pending) = self.pending.pop_front() else {
                    self.done = true;
                    info!(
                        "Listed {} entries from {} manifests",
                        self.entries_listed, self.manifests_read
                    );
                    return None;
                };
                match self.open(pending) {
                    Ok(stream) => self.current = Some(stream),
                    Err(err) => return self.fail(err),
                }
                continue;
            };

            match current.next() {
                None => self.current = None,
                Some(Err(err)) => return self.fail(err),
                Some(Ok(Entry::Recursive(entry))) if self.options.recurse_recursive => {
                    self.enqueue(PendingManifest::Requirements(entry.absolute_path));
                }
                Some(Ok(Entry::Editable(entry))) if self.options.recurse_editable => {
                    self.enqueue(PendingManifest::SetupPy {
                        path: entry.resolved_absolute_path,
                        extras: entry.extras,
                    });
                }
                Some(Ok(entry)) => {
                    self.entries_listed += 1;
                    return Some(Ok(entry));
                }
            }
        }
    }
}

/// Lists the entries of a set of manifests, with removal and post-processing applied
pub struct PackageLister<'a> {
    options: ListOptions,
    evaluator: &'a dyn SetupEvaluator,
    base_dir: PathBuf,
}

impl<'a> PackageLister<'a> {
    pub fn new(options: ListOptions, evaluator: &'a dyn SetupEvaluator) -> Self {
        PackageLister {
            options,
            evaluator,
            base_dir: current_dir(),
        }
    }

    /// Directory that paths are rendered relative to when de-duplicating.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Traverse, remove, inline and de-duplicate, in that order.
    pub fn list<I>(&self, paths: I) -> EntryStream<'a>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let mut stream: EntryStream<'a> =
            Box::new(PackageList::new(paths, self.options, self.evaluator));
        if self.options.removes_anything() {
            stream = Box::new(remove_suppressed(stream, self.options));
        }
        if self.options.inline_constraints {
            stream = Box::new(InlineConstraints::new(stream));
        }
        if self.options.dedupe {
            stream = Box::new(Dedupe::new(stream, &self.base_dir));
        }
        stream
    }
}

/// Flatten `paths` into a single entry stream, rendering relative to the working directory.
pub fn list_packages<'a, I>(
    paths: I,
    options: ListOptions,
    evaluator: &'a dyn SetupEvaluator,
) -> EntryStream<'a>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    PackageLister::new(options, evaluator).list(paths)
}
