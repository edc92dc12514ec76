//! Double-buffered point storage.
//!
//! Producers append to a pending list from any thread. The renderer calls
//! [`DataBuffer::commit`] once per refresh to publish the pending list as the
//! committed snapshot it draws from. Readers only ever see whole snapshots.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use heatmap_common::DataPoint;

#[derive(Debug, Default)]
struct Pending {
    points: Vec<DataPoint>,
    modified: bool,
}

/// Pending/committed point lists.
#[derive(Debug)]
pub struct DataBuffer {
    pending: Mutex<Pending>,
    committed: RwLock<Arc<[DataPoint]>>,
}

impl Default for DataBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DataBuffer {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Pending::default()),
            committed: RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// Queue a point for the next commit.
    pub fn add(&self, point: DataPoint) {
        let mut pending = self.lock_pending();
        pending.points.push(point);
        pending.modified = true;
    }

    /// Queue several points under one lock.
    pub fn add_all<I>(&self, points: I)
    where
        I: IntoIterator<Item = DataPoint>,
    {
        let mut pending = self.lock_pending();
        pending.points.extend(points);
        pending.modified = true;
    }

    /// Drop all queued points. The next commit publishes an empty list.
    pub fn clear(&self) {
        let mut pending = self.lock_pending();
        pending.points.clear();
        pending.modified = true;
    }

    /// Publish the pending list if anything changed since the last commit.
    ///
    /// Returns whether a new snapshot was published.
    pub fn commit(&self) -> bool {
        let mut pending = self.lock_pending();
        if !pending.modified {
            return false;
        }

        let points: Arc<[DataPoint]> = Arc::from(std::mem::take(&mut pending.points));
        pending.modified = false;

        let count = points.len();
        match self.committed.write() {
            Ok(mut committed) => *committed = points,
            Err(poisoned) => *poisoned.into_inner() = points,
        }

        tracing::debug!(points = count, "Committed data points");
        true
    }

    /// Current committed snapshot.
    pub fn committed(&self) -> Arc<[DataPoint]> {
        match self.committed.read() {
            Ok(committed) => Arc::clone(&committed),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn pending_len(&self) -> usize {
        self.lock_pending().points.len()
    }

    pub fn is_modified(&self) -> bool {
        self.lock_pending().modified
    }

    // A panicking producer cannot leave `Pending` half-updated, so a
    // poisoned lock is still safe to use.
    fn lock_pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(points: &[DataPoint]) -> Vec<f64> {
        points.iter().map(|p| p.value).collect()
    }

    #[test]
    fn test_commit_without_changes_keeps_snapshot() {
        let buffer = DataBuffer::new();
        buffer.add(DataPoint::new(0.0, 0.0, 1.0));
        assert!(buffer.commit());

        let before = buffer.committed();
        assert!(!buffer.commit());
        assert!(Arc::ptr_eq(&before, &buffer.committed()));
    }

    #[test]
    fn test_commit_moves_pending() {
        let buffer = DataBuffer::new();
        buffer.add(DataPoint::new(0.0, 0.0, 1.0));
        buffer.add(DataPoint::new(0.0, 0.0, 2.0));
        assert_eq!(buffer.pending_len(), 2);
        assert!(buffer.committed().is_empty());

        buffer.commit();
        assert_eq!(values(&buffer.committed()), vec![1.0, 2.0]);
        assert_eq!(buffer.pending_len(), 0);
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_clear_then_add_commits_only_later_points() {
        let buffer = DataBuffer::new();
        buffer.add(DataPoint::new(0.0, 0.0, 1.0));
        buffer.clear();
        buffer.add_all(vec![DataPoint::new(0.0, 0.0, 2.0), DataPoint::new(0.0, 0.0, 3.0)]);
        buffer.commit();
        assert_eq!(values(&buffer.committed()), vec![2.0, 3.0]);
    }

    #[test]
    fn test_clear_alone_publishes_empty_list() {
        let buffer = DataBuffer::new();
        buffer.add(DataPoint::new(0.0, 0.0, 1.0));
        buffer.commit();

        buffer.clear();
        assert!(buffer.commit());
        assert!(buffer.committed().is_empty());
    }
}
