/// Append-only list of submitted source snapshots.
///
/// Consecutive snapshots are always distinct and entries are never removed
/// or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `snapshot` unless it equals the most recent entry.
    /// Returns whether an entry was added.
    pub fn push_if_changed(&mut self, snapshot: &str) -> bool {
        if self.last() == Some(snapshot) {
            return false;
        }
        self.entries.push(snapshot.to_owned());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Largest valid index, or `None` while empty.
    pub fn max_index(&self) -> Option<usize> {
        self.entries.len().checked_sub(1)
    }

    pub fn clamp_index(&self, index: usize) -> Option<usize> {
        self.max_index().map(|max| index.min(max))
    }
}
