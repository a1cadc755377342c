use super::entry::{MethodPointer, SuggestionEntry, SuggestionId};
use super::translate::{apply_modification, entry_from_record};
use crate::error::SuggestionError;
use crate::model::{Identifier, ProjectPath};
use crate::project::PathResolver;
use crate::store::{IndexObserver, ReactiveDb, ReactiveIndex};
use semscope_api::{LibraryComponentGroup, SuggestionsDatabaseUpdate};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Database shared between the synchronizer (sole writer) and readers.
pub type SharedSuggestionDb = Arc<RwLock<SuggestionDb>>;

type EntryIndex<IK> = ReactiveIndex<SuggestionId, SuggestionEntry, IK, SuggestionId>;

fn path_rows(id: &SuggestionId, entry: &SuggestionEntry) -> Vec<(ProjectPath, SuggestionId)> {
    vec![(entry.definition_path().normalized(), *id)]
}

fn parent_rows(id: &SuggestionId, entry: &SuggestionEntry) -> Vec<(ProjectPath, SuggestionId)> {
    entry
        .definition_path()
        .normalized()
        .parent()
        .map(|parent| (parent, *id))
        .into_iter()
        .collect()
}

fn name_rows(id: &SuggestionId, entry: &SuggestionEntry) -> Vec<(Identifier, SuggestionId)> {
    vec![(entry.name.clone(), *id)]
}

/// Secondary indices of the suggestion database.
pub struct SuggestionIndices {
    /// definition path -> ids
    by_path: EntryIndex<ProjectPath>,
    /// parent path -> child ids
    by_parent: EntryIndex<ProjectPath>,
    /// bare name -> ids
    by_name: EntryIndex<Identifier>,
}

impl Default for SuggestionIndices {
    fn default() -> Self {
        Self {
            by_path: ReactiveIndex::new(path_rows),
            by_parent: ReactiveIndex::new(parent_rows),
            by_name: ReactiveIndex::new(name_rows),
        }
    }
}

impl IndexObserver<SuggestionId, SuggestionEntry> for SuggestionIndices {
    fn observe(&mut self, key: &SuggestionId, value: Option<&SuggestionEntry>) {
        self.by_path.observe(key, value);
        self.by_parent.observe(key, value);
        self.by_name.observe(key, value);
    }

    fn clear(&mut self) {
        self.by_path.clear();
        self.by_parent.clear();
        self.by_name.clear();
    }
}

/// All suggestions known for the current project session.
///
/// Read-only from the outside: entries change only through the
/// synchronizer, except for [`SuggestionDb::mock_suggestion`].
#[derive(Default)]
pub struct SuggestionDb {
    entries: ReactiveDb<SuggestionId, SuggestionEntry, SuggestionIndices>,
    groups: Vec<LibraryComponentGroup>,
}

impl SuggestionDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSuggestionDb {
        Arc::new(RwLock::new(Self::new()))
    }

    // ---- Read API ----

    pub fn get(&self, id: SuggestionId) -> Option<&SuggestionEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: SuggestionId) -> bool {
        self.entries.contains(&id)
    }

    pub fn entries(&self) -> impl Iterator<Item = (SuggestionId, &SuggestionEntry)> {
        self.entries.entries().map(|(id, entry)| (*id, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn groups(&self) -> &[LibraryComponentGroup] {
        &self.groups
    }

    pub fn find_by_project_path(&self, path: &ProjectPath) -> Option<SuggestionId> {
        self.entries.indices().by_path.first(&path.normalized())
    }

    /// All entries sharing a definition path (e.g. locals shadowing each other).
    pub fn find_all_by_project_path(&self, path: &ProjectPath) -> Vec<SuggestionId> {
        self.entries.indices().by_path.lookup(&path.normalized())
    }

    pub fn get_entry_by_project_path(&self, path: &ProjectPath) -> Option<&SuggestionEntry> {
        self.find_by_project_path(path).and_then(|id| self.get(id))
    }

    pub fn find_by_method_pointer(&self, ptr: &MethodPointer) -> Option<SuggestionId> {
        self.find_by_project_path(&ptr.member_path())
    }

    /// Ids of all entries with the given bare name.
    pub fn find_by_name(&self, name: &Identifier) -> Vec<SuggestionId> {
        self.entries.indices().by_name.lookup(name)
    }

    /// The entry owning the path one segment above `id`'s definition path.
    pub fn parent_id(&self, id: SuggestionId) -> Option<SuggestionId> {
        self.entries
            .indices()
            .by_parent
            .reverse_lookup(&id)
            .first()
            .and_then(|parent| self.find_by_project_path(parent))
    }

    pub fn children(&self, id: SuggestionId) -> Vec<SuggestionId> {
        let Some(entry) = self.get(id) else {
            return Vec::new();
        };
        self.entries
            .indices()
            .by_parent
            .lookup(&entry.definition_path().normalized())
    }

    /// Supertypes of `entry`, nearest first. Stops at the first parent that
    /// is not in the database.
    pub fn ancestors<'a>(&'a self, entry: &SuggestionEntry) -> Ancestors<'a> {
        let mut visited = HashSet::new();
        visited.insert(entry.definition_path().normalized());
        Ancestors {
            db: self,
            next: entry.parent_type().cloned(),
            visited,
        }
    }

    // ---- Mutation (synchronizer only) ----

    pub(crate) fn insert(&mut self, id: SuggestionId, entry: SuggestionEntry) {
        self.entries.set(id, entry);
    }

    pub(crate) fn remove(&mut self, id: SuggestionId) -> Option<SuggestionEntry> {
        self.entries.delete(&id)
    }

    /// Drop every entry and load `entries` instead, e.g. after a snapshot reload.
    pub(crate) fn replace_all(
        &mut self,
        entries: impl IntoIterator<Item = (SuggestionId, SuggestionEntry)>,
    ) {
        self.entries.clear();
        for (id, entry) in entries {
            self.insert(id, entry);
        }
    }

    /// Replace the component groups and recompute documentation group indices.
    pub(crate) fn set_groups(&mut self, groups: Vec<LibraryComponentGroup>) {
        self.groups = groups;
        let grouped: Vec<SuggestionId> = self
            .entries()
            .filter(|(_, entry)| entry.documentation.group.is_some())
            .map(|(id, _)| id)
            .collect();
        for id in grouped {
            let groups = &self.groups;
            self.entries
                .update(&id, |entry| entry.documentation.resolve_group(groups));
        }
    }

    /// Apply one update record. A failed update leaves the database unchanged.
    pub(crate) fn apply_update(
        &mut self,
        update: &SuggestionsDatabaseUpdate,
        resolver: &PathResolver,
    ) -> Result<(), SuggestionError> {
        match update {
            SuggestionsDatabaseUpdate::Add { id, suggestion } => {
                let entry = entry_from_record(suggestion, resolver, &self.groups)?;
                self.insert(*id, entry);
            }
            SuggestionsDatabaseUpdate::Remove { id } => {
                self.remove(*id).ok_or(SuggestionError::UnknownEntry(*id))?;
            }
            SuggestionsDatabaseUpdate::Modify { id, modification } => {
                let mut entry = self
                    .get(*id)
                    .cloned()
                    .ok_or(SuggestionError::UnknownEntry(*id))?;
                apply_modification(&mut entry, modification, resolver, &self.groups)?;
                self.insert(*id, entry);
            }
        }
        Ok(())
    }

    /// Insert a synthetic entry without a server round trip. For tests and
    /// development tooling only; the id is one past the largest in use.
    pub fn mock_suggestion(&mut self, entry: SuggestionEntry) -> SuggestionId {
        let id = self
            .entries
            .keys()
            .max()
            .map_or(0, |max| max.saturating_add(1));
        self.insert(id, entry);
        id
    }
}

/// Lazy walk up a type's `parent_type` chain.
pub struct Ancestors<'a> {
    db: &'a SuggestionDb,
    next: Option<ProjectPath>,
    visited: HashSet<ProjectPath>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a SuggestionEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.next.take()?.normalized();
        if !self.visited.insert(path.clone()) {
            tracing::warn!("Cycle in type hierarchy at {:?}", path);
            return None;
        }
        let entry = self.db.get_entry_by_project_path(&path)?;
        self.next = entry.parent_type().cloned();
        Some(entry)
    }
}
