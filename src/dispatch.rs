//! Background request execution
//!
//! Views never await the network. They queue [`Request`]s in an [`Outbox`] and
//! get back a [`Ticket`]; the event loop hands the outbox to the [`Dispatcher`],
//! which runs each request as a tokio task and reports a [`Completion`] over a
//! channel. A view only applies the completion whose ticket it is waiting for,
//! so superseded or abandoned requests cannot overwrite newer state.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::cache::Mutation;
use crate::data::{
    Activity, ApiClient, ApiError, DashboardData, EvaluationReport, GeneratedMessage, Lead,
    LeadDraft, LeadOverview, LeadPatch, MessageRequest, NotifyResult,
};

/// Identifies one submitted request. Tickets increase monotonically.
pub type Ticket = u64;

/// A backend call a view wants made
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Dashboard,
    Activities,
    Leads,
    Lead(String),
    LeadOverview(String),
    CreateLead(LeadDraft),
    UpdateLead { id: String, patch: LeadPatch },
    DeleteLead(String),
    NotifyLeads(Vec<String>),
    GenerateMessage(MessageRequest),
    Evaluate,
}

impl Request {
    /// The mutation this request performs on the backend, if it writes
    pub fn mutation(&self) -> Option<Mutation> {
        match self {
            Request::CreateLead(_) => Some(Mutation::CreateLead),
            Request::UpdateLead { .. } => Some(Mutation::UpdateLead),
            Request::DeleteLead(_) => Some(Mutation::DeleteLead),
            Request::NotifyLeads(_) => Some(Mutation::NotifyLeads),
            _ => None,
        }
    }
}

/// Successful result of a [`Request`]
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Dashboard(DashboardData),
    Activities(Vec<Activity>),
    Leads(Vec<Lead>),
    Lead(Lead),
    LeadOverview(LeadOverview),
    LeadCreated(Lead),
    LeadUpdated(Lead),
    LeadDeleted(String),
    Notified(NotifyResult),
    MessageGenerated(GeneratedMessage),
    Evaluation(EvaluationReport),
}

/// Outcome of a request, tagged with its ticket
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub result: Result<Response, ApiError>,
}

/// A queued request waiting to be dispatched
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub ticket: Ticket,
    pub request: Request,
    /// Wait this long before sending
    pub delay: Option<Duration>,
}

/// Requests and cancellations queued by views since the last dispatch
#[derive(Debug, Default)]
pub struct Outbox {
    next_ticket: Ticket,
    queued: Vec<Outgoing>,
    cancelled: Vec<Ticket>,
    /// Writes still in flight, so their completion can invalidate the cache
    mutations: HashMap<Ticket, Mutation>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a request to be sent right away
    pub fn send(&mut self, request: Request) -> Ticket {
        self.enqueue(request, None)
    }

    /// Queues a request to be sent after `delay`
    pub fn send_after(&mut self, request: Request, delay: Duration) -> Ticket {
        self.enqueue(request, Some(delay))
    }

    fn enqueue(&mut self, request: Request, delay: Option<Duration>) -> Ticket {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        if let Some(mutation) = request.mutation() {
            self.mutations.insert(ticket, mutation);
        }
        self.queued.push(Outgoing {
            ticket,
            request,
            delay,
        });
        ticket
    }

    /// Abandons a request. If it has not been dispatched yet it is dropped from the queue.
    pub fn cancel(&mut self, ticket: Ticket) {
        let before = self.queued.len();
        self.queued.retain(|outgoing| outgoing.ticket != ticket);
        if self.queued.len() == before {
            self.cancelled.push(ticket);
        }
        self.mutations.remove(&ticket);
    }

    /// Requests queued and not yet dispatched
    pub fn queued(&self) -> &[Outgoing] {
        &self.queued
    }

    /// Removes and returns the mutation recorded for `ticket`
    pub fn take_mutation(&mut self, ticket: Ticket) -> Option<Mutation> {
        self.mutations.remove(&ticket)
    }

    /// Takes everything queued since the last call
    pub fn drain(&mut self) -> (Vec<Outgoing>, Vec<Ticket>) {
        (
            std::mem::take(&mut self.queued),
            std::mem::take(&mut self.cancelled),
        )
    }
}

/// Runs one request against the backend
pub async fn execute(client: &ApiClient, request: Request) -> Result<Response, ApiError> {
    match request {
        Request::Dashboard => client.dashboard().await.map(Response::Dashboard),
        Request::Activities => client.activities().await.map(Response::Activities),
        Request::Leads => client.leads().await.map(Response::Leads),
        Request::Lead(id) => client.lead(&id).await.map(Response::Lead),
        Request::LeadOverview(id) => client.lead_overview(&id).await.map(Response::LeadOverview),
        Request::CreateLead(draft) => client.create_lead(&draft).await.map(Response::LeadCreated),
        Request::UpdateLead { id, patch } => client
            .update_lead(&id, &patch)
            .await
            .map(Response::LeadUpdated),
        Request::DeleteLead(id) => client
            .delete_lead(&id)
            .await
            .map(|()| Response::LeadDeleted(id)),
        Request::NotifyLeads(ids) => client.notify_leads(&ids).await.map(Response::Notified),
        Request::GenerateMessage(request) => client
            .generate_message(&request)
            .await
            .map(Response::MessageGenerated),
        Request::Evaluate => client.evaluate().await.map(Response::Evaluation),
    }
}

/// Spawns requests and collects their completions
pub struct Dispatcher {
    client: ApiClient,
    sender: mpsc::Sender<Completion>,
    receiver: mpsc::Receiver<Completion>,
    in_flight: HashMap<Ticket, AbortHandle>,
}

impl Dispatcher {
    /// Creates a dispatcher. Must be called from within a tokio runtime.
    pub fn new(client: ApiClient) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        Self {
            client,
            sender,
            receiver,
            in_flight: HashMap::new(),
        }
    }

    /// Dispatches everything queued in `outbox` and applies its cancellations
    pub fn flush(&mut self, outbox: &mut Outbox) {
        let (outgoing, cancelled) = outbox.drain();
        for ticket in cancelled {
            self.cancel(ticket);
        }
        for item in outgoing {
            self.submit(item);
        }
    }

    /// Spawns a task for one request
    pub fn submit(&mut self, outgoing: Outgoing) {
        let Outgoing {
            ticket,
            request,
            delay,
        } = outgoing;
        debug!("Dispatching #{} {:?}", ticket, request);

        let client = self.client.clone();
        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let result = execute(&client, request).await;
            // The receiver is gone only when the app is shutting down
            let _ = sender.send(Completion { ticket, result }).await;
        });
        self.in_flight.insert(ticket, handle.abort_handle());
    }

    /// Aborts an in-flight request. The backend may still finish its work.
    pub fn cancel(&mut self, ticket: Ticket) {
        if let Some(handle) = self.in_flight.remove(&ticket) {
            debug!("Cancelling #{}", ticket);
            handle.abort();
        }
    }

    /// Number of requests dispatched and not yet received
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns the next completion without blocking
    pub fn try_recv(&mut self) -> Option<Completion> {
        let completion = self.receiver.try_recv().ok()?;
        self.in_flight.remove(&completion.ticket);
        Some(completion)
    }

    /// Waits for the next completion
    pub async fn recv(&mut self) -> Option<Completion> {
        let completion = self.receiver.recv().await?;
        self.in_flight.remove(&completion.ticket);
        Some(completion)
    }
}
