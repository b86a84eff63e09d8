use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// What to recurse into, what to drop and which post-passes to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ListOptions {
    /// Splice `-r` files into the output instead of listing them
    pub recurse_recursive: bool,
    /// Splice the requirements of `-e` packages into the output instead of listing them
    pub recurse_editable: bool,
    /// Replace constrained requirements with the lines of their `-c` files
    pub inline_constraints: bool,
    pub remove_editable: bool,
    pub remove_recursive: bool,
    pub remove_constraints: bool,
    pub remove_vcs: bool,
    pub remove_wheel: bool,
    pub remove_unversioned: bool,
    pub remove_index_urls: bool,
    /// Drop entries that render to an already listed line
    pub dedupe: bool,
}

impl ListOptions {
    /// Option names as used in configuration files and on the command line
    pub const KEYS: [&'static str; 11] = [
        "recurse-recursive",
        "recurse-editable",
        "inline-constraints",
        "remove-editable",
        "remove-recursive",
        "remove-constraints",
        "remove-vcs",
        "remove-wheel",
        "remove-unversioned",
        "remove-index-urls",
        "dedupe",
    ];

    /// Whether `entry` is dropped by one of the `remove_*` options
    pub fn suppresses(&self, entry: &Entry) -> bool {
        match entry {
            Entry::Recursive(_) => self.remove_recursive,
            Entry::Constraints(_) => self.remove_constraints,
            Entry::Editable(_) => self.remove_editable,
            Entry::IndexUrl(_) => self.remove_index_urls,
            Entry::Vcs(_) => self.remove_vcs,
            Entry::Wheel(_) => self.remove_wheel,
            Entry::DirectRef(_) => false,
            Entry::Package(entry) => self.remove_unversioned && entry.version.is_none(),
        }
    }

    /// Whether any `remove_*` option is set
    pub fn removes_anything(&self) -> bool {
        self.remove_editable
            || self.remove_recursive
            || self.remove_constraints
            || self.remove_vcs
            || self.remove_wheel
            || self.remove_unversioned
            || self.remove_index_urls
    }

    /// Options enabled in either `self` or `other`
    pub fn merge(self, other: ListOptions) -> ListOptions {
        ListOptions {
            recurse_recursive: self.recurse_recursive || other.recurse_recursive,
            recurse_editable: self.recurse_editable || other.recurse_editable,
            inline_constraints: self.inline_constraints || other.inline_constraints,
            remove_editable: self.remove_editable || other.remove_editable,
            remove_recursive: self.remove_recursive || other.remove_recursive,
            remove_constraints: self.remove_constraints || other.remove_constraints,
            remove_vcs: self.remove_vcs || other.remove_vcs,
            remove_wheel: self.remove_wheel || other.remove_wheel,
            remove_unversioned: self.remove_unversioned || other.remove_unversioned,
            remove_index_urls: self.remove_index_urls || other.remove_index_urls,
            dedupe: self.dedupe || other.dedupe,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut bool> {
        let field = match key {
            "recurse-recursive" => &mut self.recurse_recursive,
            "recurse-editable" => &mut self.recurse_editable,
            "inline-constraints" => &mut self.inline_constraints,
            "remove-editable" => &mut self.remove_editable,
            "remove-recursive" => &mut self.remove_recursive,
            "remove-constraints" => &mut self.remove_constraints,
            "remove-vcs" => &mut self.remove_vcs,
            "remove-wheel" => &mut self.remove_wheel,
            "remove-unversioned" => &mut self.remove_unversioned,
            "remove-index-urls" => &mut self.remove_index_urls,
            "dedupe" => &mut self.dedupe,
            _ => return None,
        };
        Some(field)
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        let mut copy = *self;
        copy.field_mut(key).map(|field| *field)
    }

    /// Set an option by name; returns `false` for an unknown name.
    pub fn set(&mut self, key: &str, value: bool) -> bool {
        match self.field_mut(key) {
            Some(field) => {
                *field = value;
                true
            }
            None => false,
        }
    }
}
