// src/grid/transaction.rs
// Optimistic cell commits as values: apply to the cache now, commit or roll back later.

use super::cache::{CellSnapshot, PageCache};
use crate::data::error::DataResult;
use crate::data::model::{Cell, CellId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Pending,
    Applied,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: CommitId,
    pub cell_id: CellId,
    pub value: String,
    snapshot: Option<CellSnapshot>,
    state: TxState,
    dispatched: bool,
}

impl Transaction {
    pub fn new(id: CommitId, cell_id: CellId, value: impl Into<String>) -> Self {
        Self {
            id,
            cell_id,
            value: value.into(),
            snapshot: None,
            state: TxState::Pending,
            dispatched: false,
        }
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn snapshot(&self) -> Option<&CellSnapshot> {
        self.snapshot.as_ref()
    }

    /// Writes the new value into the cache. False when the cell is not cached.
    pub fn apply(&mut self, cache: &mut PageCache) -> bool {
        if self.state != TxState::Pending {
            return false;
        }
        match cache.point_update(&self.cell_id, &self.value) {
            Some(snapshot) => {
                self.snapshot = Some(snapshot);
                self.state = TxState::Applied;
                true
            }
            None => false,
        }
    }

    /// Server accepted the value; `confirmed` is what it stored.
    pub fn commit(&mut self, cache: &mut PageCache, confirmed: &Cell) {
        if let Some(cell) = cache.cell(&self.cell_id) {
            if cell.value != confirmed.value {
                cache.point_update(&self.cell_id, &confirmed.value);
            }
        }
        self.state = TxState::Committed;
    }

    /// Server rejected the value; put the prior value back.
    pub fn rollback(&mut self, cache: &mut PageCache) -> bool {
        let restored = self
            .snapshot
            .as_ref()
            .map_or(false, |snapshot| cache.restore(snapshot));
        self.state = TxState::RolledBack;
        restored
    }

    fn inherit_prior(&mut self, prior: &str) {
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.prior = prior.to_string();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    Committed { cell_id: CellId },
    /// `restored` is false when the view was reset in the meantime.
    RolledBack { cell_id: CellId, restored: bool },
    /// Failed, but a later edit of the same cell is still pending and now owns the rollback.
    Superseded { cell_id: CellId },
}

/// A held commit that may now go to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyCommit {
    pub id: CommitId,
    pub cell_id: CellId,
    pub value: String,
}

/// In-flight commits of one grid, oldest first.
///
/// At most one commit per cell is out at the service; later edits of that cell
/// are applied to the cache at once but wait in the ledger until it settles.
#[derive(Debug, Default)]
pub struct CommitLedger {
    next_id: u64,
    pending: Vec<Transaction>,
}

impl CommitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and applies a transaction. `None` when the cell is not cached.
    /// The commit is not sent until `ready` hands it out.
    pub fn begin(&mut self, cache: &mut PageCache, cell_id: CellId, value: &str) -> Option<CommitId> {
        let id = CommitId(self.next_id);
        self.next_id += 1;
        let mut tx = Transaction::new(id, cell_id, value);
        if !tx.apply(cache) {
            return None;
        }
        self.pending.push(tx);
        Some(id)
    }

    /// Marks and returns the commits that can be sent now: the oldest undispatched
    /// one of each cell with nothing else of that cell at the service.
    pub fn ready(&mut self) -> Vec<ReadyCommit> {
        let mut ready = Vec::new();
        let mut busy: Vec<CellId> = Vec::new();
        for tx in &mut self.pending {
            if busy.contains(&tx.cell_id) {
                continue;
            }
            busy.push(tx.cell_id.clone());
            if !tx.dispatched {
                tx.dispatched = true;
                ready.push(ReadyCommit {
                    id: tx.id,
                    cell_id: tx.cell_id.clone(),
                    value: tx.value.clone(),
                });
            }
        }
        ready
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, cell_id: &CellId) -> bool {
        self.pending.iter().any(|tx| &tx.cell_id == cell_id)
    }

    pub fn settle(
        &mut self,
        cache: &mut PageCache,
        id: CommitId,
        result: &DataResult<Cell>,
    ) -> Option<SettleOutcome> {
        let pos = self.pending.iter().position(|tx| tx.id == id)?;
        let mut tx = self.pending.remove(pos);
        let later_same_cell = self.pending[pos..]
            .iter_mut()
            .find(|later| later.cell_id == tx.cell_id);

        match result {
            Ok(confirmed) => {
                if later_same_cell.is_none() {
                    tx.commit(cache, confirmed);
                } else {
                    tx.state = TxState::Committed;
                }
                Some(SettleOutcome::Committed { cell_id: tx.cell_id })
            }
            Err(_) => match later_same_cell {
                Some(later) => {
                    if let Some(prior) = tx.snapshot.as_ref().map(|s| s.prior.clone()) {
                        later.inherit_prior(&prior);
                    }
                    tx.state = TxState::RolledBack;
                    Some(SettleOutcome::Superseded { cell_id: tx.cell_id })
                }
                None => {
                    let restored = tx.rollback(cache);
                    Some(SettleOutcome::RolledBack {
                        cell_id: tx.cell_id,
                        restored,
                    })
                }
            },
        }
    }

    /// Forgets everything, e.g. when the grid closes.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::DataError;
    use crate::data::model::TableId;
    use crate::data::query::ViewQuery;
    use crate::grid::cache::tests::make_page;

    fn loaded_cache() -> PageCache {
        let mut cache = PageCache::new();
        cache.reset(ViewQuery::new(TableId::from("t"), 50));
        cache.append_page(make_page("t", 0, 3, 3, 50));
        cache.point_update(&CellId::from("r0c0"), "A");
        cache
    }

    fn value(cache: &PageCache) -> String {
        cache.cell(&CellId::from("r0c0")).unwrap().value.clone()
    }

    fn confirmed(value: &str) -> DataResult<Cell> {
        Ok(Cell {
            id: CellId::from("r0c0"),
            row_id: crate::data::model::RowId::from("r0"),
            column_id: crate::data::model::ColumnId::from("c0"),
            value: value.to_string(),
        })
    }

    fn rejected() -> DataResult<Cell> {
        Err(DataError::Transient("offline".into()))
    }

    #[test]
    fn transaction_apply_then_rollback() {
        let mut cache = loaded_cache();
        let mut tx = Transaction::new(CommitId(1), CellId::from("r0c0"), "B");
        assert!(tx.apply(&mut cache));
        assert_eq!(tx.state(), TxState::Applied);
        assert_eq!(value(&cache), "B");
        assert!(tx.rollback(&mut cache));
        assert_eq!(tx.state(), TxState::RolledBack);
        assert_eq!(value(&cache), "A");
    }

    #[test]
    fn commit_takes_the_server_value() {
        let mut cache = loaded_cache();
        let mut ledger = CommitLedger::new();
        let id = ledger.begin(&mut cache, CellId::from("r0c0"), " 7 ").unwrap();
        let outcome = ledger.settle(&mut cache, id, &confirmed("7"));
        assert!(matches!(outcome, Some(SettleOutcome::Committed { .. })));
        assert_eq!(value(&cache), "7");
        assert_eq!(ledger.pending_count(), 0);
    }

    #[test]
    fn optimistic_value_visible_until_failure_then_reverted() {
        let mut cache = loaded_cache();
        let mut ledger = CommitLedger::new();
        let id = ledger.begin(&mut cache, CellId::from("r0c0"), "B").unwrap();
        assert_eq!(value(&cache), "B");
        let outcome = ledger.settle(&mut cache, id, &rejected());
        assert_eq!(
            outcome,
            Some(SettleOutcome::RolledBack { cell_id: CellId::from("r0c0"), restored: true })
        );
        assert_eq!(value(&cache), "A");
    }

    #[test]
    fn earlier_failure_hands_its_prior_to_the_later_edit() {
        let mut cache = loaded_cache();
        let mut ledger = CommitLedger::new();
        let first = ledger.begin(&mut cache, CellId::from("r0c0"), "B").unwrap();
        let second = ledger.begin(&mut cache, CellId::from("r0c0"), "C").unwrap();

        let outcome = ledger.settle(&mut cache, first, &rejected());
        assert!(matches!(outcome, Some(SettleOutcome::Superseded { .. })));
        assert_eq!(value(&cache), "C");

        ledger.settle(&mut cache, second, &rejected());
        assert_eq!(value(&cache), "A");
    }

    #[test]
    fn later_failure_falls_back_to_earlier_pending_value_then_original() {
        let mut cache = loaded_cache();
        let mut ledger = CommitLedger::new();
        let first = ledger.begin(&mut cache, CellId::from("r0c0"), "B").unwrap();
        let second = ledger.begin(&mut cache, CellId::from("r0c0"), "C").unwrap();

        ledger.settle(&mut cache, second, &rejected());
        assert_eq!(value(&cache), "B");
        ledger.settle(&mut cache, first, &rejected());
        assert_eq!(value(&cache), "A");
    }

    #[test]
    fn second_edit_of_a_cell_waits_for_the_first_to_settle() {
        let mut cache = loaded_cache();
        let mut ledger = CommitLedger::new();
        let first = ledger.begin(&mut cache, CellId::from("r0c0"), "B").unwrap();
        let other = ledger.begin(&mut cache, CellId::from("r1c0"), "X").unwrap();
        let ready: Vec<CommitId> = ledger.ready().iter().map(|c| c.id).collect();
        assert_eq!(ready, vec![first, other]);

        let second = ledger.begin(&mut cache, CellId::from("r0c0"), "C").unwrap();
        let third = ledger.begin(&mut cache, CellId::from("r0c0"), "D").unwrap();
        assert_eq!(value(&cache), "D");
        assert!(ledger.ready().is_empty());

        ledger.settle(&mut cache, first, &confirmed("B"));
        let ready = ledger.ready();
        assert_eq!(ready.len(), 1);
        assert_eq!((ready[0].id, ready[0].value.as_str()), (second, "C"));
        assert!(ledger.ready().is_empty());
        assert_eq!(value(&cache), "D");

        ledger.settle(&mut cache, second, &rejected());
        assert_eq!(ledger.ready()[0].id, third);
        assert_eq!(ledger.pending_count(), 2);
    }

    #[test]
    fn unknown_commit_id_is_ignored() {
        let mut cache = loaded_cache();
        let mut ledger = CommitLedger::new();
        assert!(ledger.settle(&mut cache, CommitId(99), &rejected()).is_none());
        assert!(ledger.begin(&mut cache, CellId::from("missing"), "x").is_none());
    }
}
