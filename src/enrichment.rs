//! Follow-up polling for newly created leads
//!
//! The backend enriches a lead (score, industry, company details) in the
//! background after `POST /leads`. The poller re-fetches the lead on a backoff
//! schedule until its `updated_at` moves past the value returned at creation.

use std::time::Duration;

use log::{debug, info};

use crate::data::{ApiError, Lead};
use crate::dispatch::{Outbox, Request, Ticket};

/// Delays before each re-fetch
pub const BACKOFF: [Duration; 4] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
    Duration::from_secs(8),
];

/// Result of handling one poll response
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Not enriched yet, another fetch is scheduled
    Waiting,
    /// The lead changed on the backend
    Enriched(Lead),
    /// Every attempt came back unchanged
    GaveUp,
}

/// Polls one lead until the backend reports it enriched
#[derive(Debug, Clone)]
pub struct EnrichmentPoller {
    lead_id: String,
    baseline: Option<String>,
    attempt: usize,
    pending: Ticket,
}

impl EnrichmentPoller {
    /// Schedules the first re-fetch of `created`
    pub fn start(created: &Lead, outbox: &mut Outbox) -> Self {
        let pending = outbox.send_after(Request::Lead(created.id.clone()), BACKOFF[0]);
        debug!("Polling lead {} for enrichment", created.id);
        Self {
            lead_id: created.id.clone(),
            baseline: created.updated_at.clone(),
            attempt: 0,
            pending,
        }
    }

    pub fn lead_id(&self) -> &str {
        &self.lead_id
    }

    /// Ticket of the scheduled re-fetch
    pub fn pending(&self) -> Ticket {
        self.pending
    }

    /// Handles the response to [`Self::pending`]
    ///
    /// A failed fetch uses up an attempt like an unchanged one.
    pub fn handle(&mut self, result: Result<&Lead, &ApiError>, outbox: &mut Outbox) -> PollOutcome {
        match result {
            Ok(lead) if lead.updated_at != self.baseline => {
                info!("Lead {} enriched after {} polls", self.lead_id, self.attempt + 1);
                return PollOutcome::Enriched(lead.clone());
            }
            Ok(_) => {}
            Err(e) => debug!("Enrichment poll for {} failed: {}", self.lead_id, e),
        }

        self.attempt += 1;
        match BACKOFF.get(self.attempt) {
            Some(delay) => {
                self.pending = outbox.send_after(Request::Lead(self.lead_id.clone()), *delay);
                PollOutcome::Waiting
            }
            None => {
                info!("Lead {} not enriched after {} polls", self.lead_id, BACKOFF.len());
                PollOutcome::GaveUp
            }
        }
    }
}
