use tracing::debug;

use crate::{entry::GitUserEntry, error::AppError, storage::EntryStore};

/// Known identities, keyed by their display key.
///
/// Holds no list of its own: every call loads from the store and every
/// mutation writes the whole list back before returning. Missing keys,
/// duplicate adds and deletes on an absent list are all silent no-ops.
#[derive(Debug)]
pub struct IdentityRegistry<S> {
    store: S,
}

impl<S: EntryStore> IdentityRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// True when a non-empty identity list is stored
    pub fn exists(&self) -> Result<bool, AppError> {
        let entries = self.store.load_entries()?;
        Ok(entries.is_some_and(|entries| !entries.is_empty()))
    }

    /// Display keys in storage order, `None` when nothing is stored
    pub fn list_display_keys(&self) -> Result<Option<Vec<String>>, AppError> {
        let entries = self.store.load_entries()?;
        Ok(entries
            .filter(|entries| !entries.is_empty())
            .map(|entries| display_keys(&entries)))
    }

    /// Looks up the entry whose display key is `display_key`
    ///
    /// # Arguments
    /// * `display_key` - Key as produced by [`GitUserEntry::display_key`]
    pub fn resolve(&self, display_key: &str) -> Result<Option<GitUserEntry>, AppError> {
        let entries = self.store.load_entries()?.unwrap_or_default();
        Ok(find_by_key(&entries, display_key).cloned())
    }

    /// Appends `entry` unless an entry with the same display key is stored,
    /// returns whether it was appended.
    ///
    /// The list is written back even when nothing was appended.
    pub fn add(&self, entry: GitUserEntry) -> Result<bool, AppError> {
        let mut entries: Vec<GitUserEntry> = self.store.load_entries()?.unwrap_or_default();
        let display_key = entry.display_key();

        let added = insert_unique(&mut entries, entry);
        if added {
            debug!("added identity {display_key}");
        } else {
            debug!("identity {display_key} already stored");
        }

        self.store.save_entries(&entries)?;
        Ok(added)
    }

    /// Removes the entry for each key that matches one; unknown keys are skipped.
    /// Returns how many entries were removed.
    ///
    /// Does not touch the store at all when no list exists.
    ///
    /// # Arguments
    /// * `display_keys` - Keys of the entries to remove
    pub fn delete_many<I, K>(&self, display_keys: I) -> Result<usize, AppError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let Some(mut entries) = self.store.load_entries()? else {
            debug!("no identity list stored, nothing to delete");
            return Ok(0);
        };

        let removed = remove_keys(&mut entries, display_keys);
        debug!("removed {removed} identities");

        self.store.save_entries(&entries)?;
        Ok(removed)
    }
}

/// Display key of every entry, in list order
pub fn display_keys(entries: &[GitUserEntry]) -> Vec<String> {
    entries.iter().map(GitUserEntry::display_key).collect()
}

/// Finds the entry with the given display key; the last match wins
pub fn find_by_key<'a>(entries: &'a [GitUserEntry], display_key: &str) -> Option<&'a GitUserEntry> {
    entries
        .iter()
        .rev()
        .find(|entry| entry.display_key() == display_key)
}

/// Pushes `entry` if its display key is not present yet, returns whether it was pushed
pub fn insert_unique(entries: &mut Vec<GitUserEntry>, entry: GitUserEntry) -> bool {
    let display_key = entry.display_key();
    if entries.iter().any(|existing| existing.display_key() == display_key) {
        return false;
    }
    entries.push(entry);
    true
}

/// Removes the first entry matching each key, returns how many were removed
pub fn remove_keys<I, K>(entries: &mut Vec<GitUserEntry>, display_keys: I) -> usize
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let mut removed = 0;
    for display_key in display_keys {
        if let Some(idx) = entries
            .iter()
            .position(|entry| entry.display_key() == display_key.as_ref())
        {
            entries.remove(idx);
            removed += 1;
        }
    }
    removed
}
