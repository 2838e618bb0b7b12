use std::collections::HashSet;

use crate::models::FileRecord;

/// Stable handle to a record owned by an [`AggregateTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(usize);

impl RecordId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Owns the records built during one organize call and remembers, in
/// first-registration order, which of them have been seen.
///
/// Each record is reached once per attribute pass, so membership is decided
/// by handle, never by comparing record contents: a half-filled record on the
/// first pass and the same record on the fifth pass must count as one.
#[derive(Debug, Default)]
pub struct AggregateTracker {
    records: Vec<FileRecord>,
    tracked: Vec<RecordId>,
    seen: HashSet<RecordId>,
}

impl AggregateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record and returns its handle. The record is not
    /// tracked until [`AggregateTracker::register`] is called for it.
    pub fn allocate(&mut self) -> RecordId {
        self.records.push(FileRecord::new());
        RecordId(self.records.len() - 1)
    }

    pub fn record(&self, id: RecordId) -> Option<&FileRecord> {
        self.records.get(id.0)
    }

    pub fn record_mut(&mut self, id: RecordId) -> Option<&mut FileRecord> {
        self.records.get_mut(id.0)
    }

    /// Appends `id` unless it is already tracked. Returns whether it was new.
    pub fn register(&mut self, id: RecordId) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.tracked.push(id);
        true
    }

    /// Tracked handles in registration order.
    pub fn tracked(&self) -> &[RecordId] {
        &self.tracked
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Runs `transform` once per tracked record, in registration order, and
    /// returns the results indexed by [`RecordId::index`]. Untracked slots
    /// stay `None`. Stops at the first error.
    pub fn finish<T, E, F>(mut self, mut transform: F) -> Result<Vec<Option<T>>, E>
    where
        F: FnMut(FileRecord) -> Result<T, E>,
    {
        let mut results: Vec<Option<T>> = std::iter::repeat_with(|| None)
            .take(self.records.len())
            .collect();

        for id in self.tracked {
            if let (Some(record), Some(slot)) =
                (self.records.get_mut(id.0), results.get_mut(id.0))
            {
                *slot = Some(transform(std::mem::take(record))?);
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attribute, Scalar};
    use std::convert::Infallible;

    #[test]
    fn test_register_is_by_handle() {
        let mut tracker = AggregateTracker::new();
        let first = tracker.allocate();
        let second = tracker.allocate();

        // Identical contents, distinct records.
        assert_eq!(tracker.record(first), tracker.record(second));

        assert!(tracker.register(first));
        assert!(tracker.register(second));
        assert!(!tracker.register(first));
        assert_eq!(tracker.tracked(), &[first, second]);
    }

    #[test]
    fn test_register_survives_mutation() {
        let mut tracker = AggregateTracker::new();
        let id = tracker.allocate();
        assert!(tracker.register(id));

        tracker
            .record_mut(id)
            .unwrap()
            .set(Attribute::Name, Scalar::from("a.jpg"));

        assert!(!tracker.register(id));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_finish_runs_in_registration_order() {
        let mut tracker = AggregateTracker::new();
        let a = tracker.allocate();
        let b = tracker.allocate();
        let untracked = tracker.allocate();
        tracker.record_mut(a).unwrap().set(Attribute::Name, Scalar::from("a"));
        tracker.record_mut(b).unwrap().set(Attribute::Name, Scalar::from("b"));

        tracker.register(b);
        tracker.register(a);

        let mut order = Vec::new();
        let results = tracker
            .finish(|record| {
                order.push(record.client_name().unwrap_or_default().to_string());
                Ok::<_, Infallible>(record.client_name().map(str::len))
            })
            .unwrap();

        assert_eq!(order, vec!["b", "a"]);
        assert_eq!(results[a.index()], Some(Some(1)));
        assert!(results[untracked.index()].is_none());
    }

    #[test]
    fn test_finish_stops_at_first_error() {
        let mut tracker = AggregateTracker::new();
        for _ in 0..3 {
            let id = tracker.allocate();
            tracker.register(id);
        }

        let mut calls = 0;
        let result = tracker.finish(|_| {
            calls += 1;
            if calls == 2 { Err("boom") } else { Ok(()) }
        });

        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 2);
    }
}
