use std::collections::HashMap;

/// Identifier reserved for "no string"; never assigned to real text
pub const ABSENT: u32 = 0;

/// Deduplication side-table for one optimization session
///
/// Identifiers are handed out in first-seen order starting at 1. The table
/// only grows until [`StringInterner::reset`] is called; there is no eviction.
/// One session has one writer, so the interner is passed by `&mut` rather
/// than shared.
#[derive(Debug, Clone, Default)]
pub struct StringInterner {
    ids: HashMap<String, u32>,
    table: Vec<String>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `s`, allocating the next one if `s` is new. Empty input is [`ABSENT`].
    pub fn intern_or_lookup(&mut self, s: &str) -> u32 {
        if s.is_empty() {
            return ABSENT;
        }
        if let Some(&id) = self.ids.get(s) {
            return id;
        }

        self.table.push(s.to_string());
        let id = self.table.len() as u32;
        self.ids.insert(s.to_string(), id);
        id
    }

    pub fn intern_optional(&mut self, s: Option<&str>) -> u32 {
        s.map_or(ABSENT, |s| self.intern_or_lookup(s))
    }

    /// Forget every mapping; the next new string gets id 1 again
    pub fn reset(&mut self) {
        self.ids.clear();
        self.table.clear();
    }

    /// Strings ordered by id: index `i` holds the string with id `i + 1`
    pub fn export_table(&self) -> Vec<String> {
        self.table.clone()
    }

    pub fn resolve(&self, id: u32) -> Option<&str> {
        if id == ABSENT {
            return None;
        }
        self.table.get(id as usize - 1).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
