use std::collections::HashMap;

use smallvec::SmallVec;

use crate::foundation::error::{SubcastError, SubcastResult};

/// Interned style/selection label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(u16);

impl TagId {
    /// Raw interned index.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Interns tag names so words can carry cheap, hashable tag sets.
#[derive(Debug, Default, Clone)]
pub struct TagRegistry {
    ids_by_name: HashMap<String, TagId>,
    names_by_id: Vec<String>,
}

impl TagRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, allocating one if needed.
    pub fn intern(&mut self, name: &str) -> SubcastResult<TagId> {
        if let Some(&id) = self.ids_by_name.get(name) {
            return Ok(id);
        }
        let raw = u16::try_from(self.names_by_id.len())
            .map_err(|_| SubcastError::validation("too many distinct tags (max 65536)"))?;
        let id = TagId(raw);
        self.names_by_id.push(name.to_owned());
        self.ids_by_name.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Look up an existing tag without interning.
    pub fn lookup(&self, name: &str) -> Option<TagId> {
        self.ids_by_name.get(name).copied()
    }

    /// Name of an interned tag.
    pub fn name(&self, id: TagId) -> Option<&str> {
        self.names_by_id.get(id.index()).map(String::as_str)
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.names_by_id.len()
    }

    /// Return `true` when no tag was interned.
    pub fn is_empty(&self) -> bool {
        self.names_by_id.is_empty()
    }
}

/// Small sorted set of tag ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagSet(SmallVec<[TagId; 4]>);

impl TagSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id`; returns `false` when it was already present.
    pub fn insert(&mut self, id: TagId) -> bool {
        match self.0.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, id);
                true
            }
        }
    }

    /// Remove `id`; returns `true` when it was present.
    pub fn remove(&mut self, id: TagId) -> bool {
        match self.0.binary_search(&id) {
            Ok(pos) => {
                self.0.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Membership test.
    pub fn contains(&self, id: TagId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Iterate ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TagId> + '_ {
        self.0.iter().copied()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` when the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<TagId> for TagSet {
    fn from_iter<I: IntoIterator<Item = TagId>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/tags.rs"]
mod tests;
