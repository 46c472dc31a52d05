// src/grid/bulk.rs
// At most one bulk generation job per grid.

use crate::data::error::{DataError, DataResult};
use crate::data::service::BulkOutcome;
use crate::data::sqlite::validate_bulk_count;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BulkJobId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkJob {
    pub id: BulkJobId,
    pub count: u64,
}

#[derive(Debug, Default)]
pub struct BulkTracker {
    next_id: u64,
    active: Option<BulkJob>,
}

impl BulkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<BulkJob> {
        self.active
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, count: u64) -> DataResult<BulkJob> {
        validate_bulk_count(count)?;
        if let Some(job) = self.active {
            return Err(DataError::Validation(format!(
                "Already generating {} rows, wait for it to finish",
                job.count
            )));
        }
        let job = BulkJob {
            id: BulkJobId(self.next_id),
            count,
        };
        self.next_id += 1;
        self.active = Some(job);
        Ok(job)
    }

    /// Ends the job. Returns `(rows created, message, is_error)` or `None` for an unknown job.
    pub fn settle(&mut self, id: BulkJobId, result: &DataResult<BulkOutcome>) -> Option<(u64, String, bool)> {
        if self.active.map(|job| job.id) != Some(id) {
            return None;
        }
        self.active = None;
        Some(match result {
            Ok(outcome) => (outcome.created, format!("Generated {} rows", outcome.created), false),
            Err(e @ DataError::PartialBulk { created, .. }) => (*created, e.user_message(), true),
            Err(e) => (0, format!("Row generation failed: {}", e.user_message()), true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_is_validated() {
        let mut tracker = BulkTracker::new();
        assert!(matches!(tracker.start(0), Err(DataError::Validation(_))));
        assert!(matches!(tracker.start(100_001), Err(DataError::Validation(_))));
        assert!(!tracker.is_running());
        assert!(tracker.start(100_000).is_ok());
    }

    #[test]
    fn one_job_at_a_time() {
        let mut tracker = BulkTracker::new();
        let job = tracker.start(10).unwrap();
        assert!(tracker.start(5).is_err());
        let (created, _, is_error) = tracker.settle(job.id, &Ok(BulkOutcome { created: 10 })).unwrap();
        assert_eq!(created, 10);
        assert!(!is_error);
        assert!(tracker.start(5).is_ok());
    }

    #[test]
    fn partial_failure_reports_created_rows() {
        let mut tracker = BulkTracker::new();
        let job = tracker.start(2500).unwrap();
        let result = Err(DataError::PartialBulk { created: 2000, reason: "disk full".into() });
        let (created, message, is_error) = tracker.settle(job.id, &result).unwrap();
        assert_eq!(created, 2000);
        assert!(is_error);
        assert!(message.contains("2000"));
        assert!(tracker.settle(job.id, &result).is_none());
    }
}
