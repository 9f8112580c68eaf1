//! Per-view state of one backend resource
//!
//! `Empty -> Loading -> {Ready, Error}`. A resource waiting on a request
//! remembers its ticket and ignores completions carrying any other.

use crate::dispatch::Ticket;

/// Where a resource is in its load cycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Empty,
    Loading(Ticket),
    Ready,
    /// Last request failed; previous data, if any, is kept
    Error(String),
}

/// Data a view shows plus its load status
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<T> {
    pub data: Option<T>,
    pub status: Status,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            data: None,
            status: Status::Empty,
        }
    }
}

impl<T> Resource<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resource initialized from a cache hit
    pub fn from_cache(cached: Option<T>) -> Self {
        match cached {
            Some(data) => Self {
                data: Some(data),
                status: Status::Ready,
            },
            None => Self::default(),
        }
    }

    /// Marks the resource as waiting on `ticket`, superseding any earlier request
    pub fn begin(&mut self, ticket: Ticket) {
        self.status = Status::Loading(ticket);
    }

    /// Whether a completion for `ticket` should be applied
    pub fn awaits(&self, ticket: Ticket) -> bool {
        self.status == Status::Loading(ticket)
    }

    /// Stores data for `ticket`. Returns false and leaves state untouched for a stale ticket.
    pub fn resolve(&mut self, ticket: Ticket, data: T) -> bool {
        if !self.awaits(ticket) {
            return false;
        }
        self.data = Some(data);
        self.status = Status::Ready;
        true
    }

    /// Records a failure for `ticket`, keeping prior data
    pub fn fail(&mut self, ticket: Ticket, message: impl Into<String>) -> bool {
        if !self.awaits(ticket) {
            return false;
        }
        self.status = Status::Error(message.into());
        true
    }

    /// Drops data and any pending request
    pub fn invalidate(&mut self) {
        self.data = None;
        self.status = Status::Empty;
    }

    /// The ticket being waited on, if loading
    pub fn pending(&self) -> Option<Ticket> {
        match self.status {
            Status::Loading(ticket) => Some(ticket),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, Status::Loading(_))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            Status::Error(message) => Some(message),
            _ => None,
        }
    }
}
