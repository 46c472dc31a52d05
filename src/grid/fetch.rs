// src/grid/fetch.rs
// Client side of pagination: one request in flight, cursors in order, stale results dropped.

use super::cache::{AppendOutcome, PageCache};
use crate::data::error::{DataError, DataResult};
use crate::data::query::{Cursor, Page, ViewQuery};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub query: ViewQuery,
    pub cursor: Cursor,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Applied(AppendOutcome),
    /// Superseded by a reset, or answered for a query that is no longer active.
    Stale,
    Failed(DataError),
}

#[derive(Debug, Default)]
pub struct FetchEngine {
    next_ticket: u64,
    in_flight: Option<FetchRequest>,
    stalled: bool,
}

impl FetchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// A failed read stops automatic fetching until `retry` or a new query.
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Next request for the cache's stream, if one may be issued right now.
    pub fn request_next(&mut self, cache: &PageCache) -> Option<FetchRequest> {
        if self.in_flight.is_some() || self.stalled || !cache.has_more() {
            return None;
        }
        let query = cache.query()?.clone();
        let cursor = cache.next_cursor()?;
        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket += 1;
        let request = FetchRequest { ticket, query, cursor };
        bevy::log::debug!(
            "Fetch #{} at cursor {} (page size {})",
            ticket.0,
            cursor.offset(),
            request.query.page_size
        );
        self.in_flight = Some(request.clone());
        Some(request)
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: DataResult<Page>,
        cache: &mut PageCache,
    ) -> FetchOutcome {
        let is_current = self.in_flight.as_ref().map_or(false, |r| r.ticket == ticket);
        if !is_current {
            bevy::log::debug!("Dropping stale fetch result #{}", ticket.0);
            return FetchOutcome::Stale;
        }
        let Some(request) = self.in_flight.take() else {
            return FetchOutcome::Stale;
        };
        if cache.query() != Some(&request.query) {
            return FetchOutcome::Stale;
        }
        match result {
            Ok(page) => FetchOutcome::Applied(cache.append_page(page)),
            Err(e) => {
                bevy::log::warn!("Fetch #{} failed: {}", ticket.0, e);
                self.stalled = true;
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Forgets the in-flight request; its result will arrive as stale.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.stalled = false;
    }

    pub fn retry(&mut self) {
        self.stalled = false;
    }
}

/// Backoff for transient read failures. Writes are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt after `attempt` (1-based) failed, or `None`
    /// when the attempts are used up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }
        Some(self.base_delay * 2u32.saturating_pow(attempt - 1))
    }

    pub fn should_retry(&self, error: &DataError, attempt: u32) -> Option<Duration> {
        if error.is_transient() {
            self.delay_for(attempt)
        } else {
            None
        }
    }
}
