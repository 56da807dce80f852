use crate::types::Table;

/// LIFO stack of table snapshots, one per successful operator application.
///
/// Each entry is the table as it was immediately before the application, so popping it is
/// the exact inverse of that application.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    snapshots: Vec<Table>,
}

impl HistoryStack {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the table as it was before an application.
    pub fn push(&mut self, snapshot: Table) {
        self.snapshots.push(snapshot);
    }

    /// Remove and return the most recent snapshot.
    pub fn pop(&mut self) -> Option<Table> {
        self.snapshots.pop()
    }

    /// The snapshot `pop` would return.
    pub fn peek(&self) -> Option<&Table> {
        self.snapshots.last()
    }

    /// Number of snapshots, i.e. how many applications can be undone.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// `true` when there is nothing to undo.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drop every snapshot. Called when a new source is loaded.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryStack;
    use crate::types::{DataType, Field, Schema, Table, Value};

    fn table(n: i64) -> Table {
        Table::new(
            Schema::new(vec![Field::new("n", DataType::Int64)]),
            vec![vec![Value::Int64(n)]],
        )
    }

    #[test]
    fn pops_in_reverse_push_order() {
        let mut h = HistoryStack::new();
        h.push(table(1));
        h.push(table(2));
        assert_eq!(h.len(), 2);
        assert_eq!(h.peek(), Some(&table(2)));
        assert_eq!(h.pop(), Some(table(2)));
        assert_eq!(h.pop(), Some(table(1)));
        assert_eq!(h.pop(), None);
        assert!(h.is_empty());
    }

    #[test]
    fn clear_empties_the_stack() {
        let mut h = HistoryStack::new();
        h.push(table(1));
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.peek(), None);
    }
}
