//! Explicit refactoring mapping: old identifier to new identifier or deletion.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

/// Human-authored rename table. A key without a value marks a deletion.
///
/// Keys and values are trimmed; an empty value counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefactoringMapping {
    entries: BTreeMap<String, Option<String>>,
    new_elements: BTreeSet<String>,
}

impl RefactoringMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from `(old, new)` pairs, normalizing both sides.
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut mapping = Self::new();
        for (old, new) in entries {
            mapping.insert(old.as_ref(), new.as_ref());
        }
        mapping
    }

    /// Adds `old -> new`. An empty `new` marks `old` as deleted.
    pub fn insert(&mut self, old: &str, new: &str) {
        let old = old.trim();
        if old.is_empty() {
            return;
        }
        let new = new.trim();
        let target = (!new.is_empty()).then(|| new.to_owned());
        self.entries.insert(old.to_owned(), target);
    }

    /// Marks `old` as deleted.
    pub fn delete(&mut self, old: &str) {
        self.insert(old, "");
    }

    /// Marks a current member identifier as intentionally new.
    pub fn mark_new(&mut self, identifier: &str) {
        let identifier = identifier.trim();
        if !identifier.is_empty() {
            self.new_elements.insert(identifier.to_owned());
        }
    }

    /// `None`: no entry. `Some(None)`: deletion. `Some(Some(new))`: rename.
    #[must_use]
    pub fn lookup(&self, identifier: &str) -> Option<Option<&str>> {
        self.entries.get(identifier).map(Option::as_deref)
    }

    #[must_use]
    pub fn is_new_element(&self, identifier: &str) -> bool {
        self.new_elements.contains(identifier)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.new_elements.is_empty()
    }
}

/// Supplies the refactoring mapping used during legacy mapping.
pub trait RefactoringMappingProvider: Send + Sync {
    fn provide_refactoring_mapping(&self) -> Arc<RefactoringMapping>;
}

type Loader = Box<dyn Fn() -> RefactoringMapping + Send + Sync>;

/// Loads the mapping on first use and serves that snapshot from then on.
pub struct LazyRefactoringProvider {
    loader: Loader,
    snapshot: OnceLock<Arc<RefactoringMapping>>,
}

impl LazyRefactoringProvider {
    pub fn new(loader: impl Fn() -> RefactoringMapping + Send + Sync + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            snapshot: OnceLock::new(),
        }
    }

    /// A provider whose snapshot is already frozen.
    #[must_use]
    pub fn from_mapping(mapping: RefactoringMapping) -> Self {
        let snapshot = OnceLock::new();
        let _ = snapshot.set(Arc::new(mapping));
        Self {
            loader: Box::new(RefactoringMapping::new),
            snapshot,
        }
    }
}

impl Default for LazyRefactoringProvider {
    fn default() -> Self {
        Self::from_mapping(RefactoringMapping::new())
    }
}

impl std::fmt::Debug for LazyRefactoringProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyRefactoringProvider")
            .field("snapshot", &self.snapshot.get())
            .finish_non_exhaustive()
    }
}

impl RefactoringMappingProvider for LazyRefactoringProvider {
    fn provide_refactoring_mapping(&self) -> Arc<RefactoringMapping> {
        Arc::clone(self.snapshot.get_or_init(|| Arc::new((self.loader)())))
    }
}
