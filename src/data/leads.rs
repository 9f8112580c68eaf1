//! Lead endpoints
//!
//! CRUD against `/leads`, bulk notification and the per-lead message history.

use futures::future;
use log::{info, warn};
use serde::Deserialize;

use super::client::{ApiClient, ApiError};
use super::{Lead, LeadDraft, LeadMessage, LeadPatch, NotifyResult};

/// Response of `GET /leads/{id}/messages`
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    messages: Vec<LeadMessage>,
}

/// A lead together with its message history, as shown on the detail screen
#[derive(Debug, Clone, PartialEq)]
pub struct LeadOverview {
    pub lead: Lead,
    pub messages: Vec<LeadMessage>,
    /// Set when the lead loaded but its history did not
    pub messages_error: Option<String>,
}

impl ApiClient {
    /// Fetches every lead (`GET /leads`)
    pub async fn leads(&self) -> Result<Vec<Lead>, ApiError> {
        self.send_json(self.get("/leads")).await
    }

    /// Fetches one lead (`GET /leads/{id}`)
    pub async fn lead(&self, id: &str) -> Result<Lead, ApiError> {
        self.send_json(self.get(&format!("/leads/{}", id))).await
    }

    /// Creates a lead (`POST /leads`) and returns the stored record
    pub async fn create_lead(&self, draft: &LeadDraft) -> Result<Lead, ApiError> {
        let lead: Lead = self.send_json(self.post("/leads").json(draft)).await?;
        info!("Created lead {} ({})", lead.id, lead.company);
        Ok(lead)
    }

    /// Updates a lead (`PATCH /leads/{id}`)
    pub async fn update_lead(&self, id: &str, patch: &LeadPatch) -> Result<Lead, ApiError> {
        let lead: Lead = self
            .send_json(self.patch(&format!("/leads/{}", id)).json(patch))
            .await?;
        info!("Updated lead {}", id);
        Ok(lead)
    }

    /// Deletes a lead (`DELETE /leads/{id}`)
    pub async fn delete_lead(&self, id: &str) -> Result<(), ApiError> {
        self.send_empty(self.delete(&format!("/leads/{}", id)))
            .await?;
        info!("Deleted lead {}", id);
        Ok(())
    }

    /// Sends notifications for the given leads (`POST /leads/notify`)
    pub async fn notify_leads(&self, ids: &[String]) -> Result<NotifyResult, ApiError> {
        let result: NotifyResult = self
            .send_json(self.post("/leads/notify").json(ids))
            .await?;
        info!("Notified {} of {} leads", result.notified, ids.len());
        Ok(result)
    }

    /// Fetches the message history of a lead (`GET /leads/{id}/messages`)
    pub async fn lead_messages(&self, id: &str) -> Result<Vec<LeadMessage>, ApiError> {
        let response: MessagesResponse = self
            .send_json(self.get(&format!("/leads/{}/messages", id)))
            .await?;
        Ok(response.messages)
    }

    /// Fetches a lead and its history concurrently
    ///
    /// Fails only if the lead itself cannot be loaded.
    pub async fn lead_overview(&self, id: &str) -> Result<LeadOverview, ApiError> {
        let (lead, messages) = future::join(self.lead(id), self.lead_messages(id)).await;
        let lead = lead?;

        let (messages, messages_error) = match messages {
            Ok(messages) => (messages, None),
            Err(e) => {
                warn!("Failed to load messages for lead {}: {}", id, e);
                (Vec::new(), Some(e.user_message()))
            }
        };

        Ok(LeadOverview {
            lead,
            messages,
            messages_error,
        })
    }
}
