//! Core data models and backend client for Grok SDR
//!
//! This module contains the types exchanged with the lead management backend
//! (leads, activities, dashboard aggregates) and the [`ApiClient`] used to
//! fetch and mutate them.

pub mod client;
pub mod dashboard;
pub mod evaluation;
pub mod leads;
pub mod messages;

pub use client::{ApiClient, ApiError, DEFAULT_API_URL};
pub use evaluation::{model_name, EvaluationFailure, EvaluationReport, ModelScore, MODELS};
pub use leads::LeadOverview;
pub use messages::{html_to_text, GeneratedMessage, Goal, MessageRequest, Tone};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pipeline stage of a lead
///
/// Unknown stage strings from the backend are kept as `Other` instead of
/// failing the whole response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stage {
    New,
    Contacted,
    Qualified,
    Proposal,
    Closed,
    Lost,
    Other(String),
}

impl Stage {
    /// Stages offered when creating or editing a lead, in pipeline order
    pub const KNOWN: [Stage; 6] = [
        Stage::New,
        Stage::Contacted,
        Stage::Qualified,
        Stage::Proposal,
        Stage::Closed,
        Stage::Lost,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Stage::New => "new",
            Stage::Contacted => "contacted",
            Stage::Qualified => "qualified",
            Stage::Proposal => "proposal",
            Stage::Closed => "closed",
            Stage::Lost => "lost",
            Stage::Other(s) => s,
        }
    }

    /// Capitalized label for display
    pub fn label(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// The stage a lead moves to when advanced, `None` once the deal is decided
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::New => Some(Stage::Contacted),
            Stage::Contacted => Some(Stage::Qualified),
            Stage::Qualified => Some(Stage::Proposal),
            Stage::Proposal => Some(Stage::Closed),
            Stage::Closed | Stage::Lost | Stage::Other(_) => None,
        }
    }
}

impl From<String> for Stage {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "new" => Stage::New,
            "contacted" => Stage::Contacted,
            "qualified" => Stage::Qualified,
            "proposal" => Stage::Proposal,
            "closed" => Stage::Closed,
            "lost" => Stage::Lost,
            _ => Stage::Other(s),
        }
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        stage.as_str().to_string()
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::New
    }
}

/// A sales lead as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub company: String,
    pub contact: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub stage: Stage,
    /// Deal value, formatted by the backend (e.g. "$45,000")
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub industry: Option<String>,
    /// Qualification score (0-100)
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub last_contact: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `POST /leads`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadDraft {
    pub company: String,
    /// Full contact name, "First Last"
    pub contact: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub stage: Stage,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Body of `PATCH /leads/{id}`; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeadPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An entry in the activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub lead_id: Option<String>,
    /// Activity kind (email, call, meeting, analysis, ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    pub action: String,
    #[serde(default)]
    pub grok_generated: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Activity {
    /// Best available time of the activity
    pub fn when(&self) -> Option<&str> {
        self.timestamp.as_deref().or(self.created_at.as_deref())
    }
}

/// Headline counters shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub total_leads: u64,
    pub qualified_leads: u64,
    pub messages_sent: u64,
    pub meetings_booked: u64,
}

/// Number of leads in one pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

/// Response of `GET /dashboard`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardData {
    pub metrics: Metrics,
    pub pipeline: Vec<PipelineStage>,
    pub recent_activities: Vec<Activity>,
}

/// A message or activity recorded against a lead (`GET /leads/{id}/messages`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub action: String,
    /// JSON-encoded details; older records store an object instead of a string
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub grok_generated: bool,
}

/// Decoded contents of [`LeadMessage::details`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MessageDetails {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub tone: Option<String>,
    pub goal: Option<String>,
    pub model: Option<String>,
}

impl LeadMessage {
    /// Decodes the details payload, returning defaults when it is absent or malformed
    pub fn details(&self) -> MessageDetails {
        let value = match &self.details {
            Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
                Ok(v) => v,
                Err(_) => return MessageDetails::default(),
            },
            Some(v) => v.clone(),
            None => return MessageDetails::default(),
        };
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// Response of `POST /leads/notify`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyResult {
    pub notified: u64,
}

/// Parses a backend timestamp, accepting RFC 3339 and naive ISO 8601 (assumed UTC)
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Formats a backend timestamp relative to `now` ("5 mins ago", "2 days ago")
///
/// Unparseable timestamps are returned unchanged.
pub fn format_relative(s: &str, now: DateTime<Utc>) -> String {
    let Some(then) = parse_timestamp(s) else {
        return s.to_string();
    };

    let secs = (now - then).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    let (amount, unit) = match secs {
        s if s < 3_600 => (s / 60, "min"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 604_800 => (s / 86_400, "day"),
        s => (s / 604_800, "week"),
    };
    if amount == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", amount, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stage_parses_known_and_unknown_values() {
        let stages: Vec<Stage> =
            serde_json::from_str(r#"["new", "Qualified", "negotiation"]"#).unwrap();

        assert_eq!(stages[0], Stage::New);
        assert_eq!(stages[1], Stage::Qualified);
        assert_eq!(stages[2], Stage::Other("negotiation".to_string()));
    }

    #[test]
    fn test_stage_serializes_lowercase() {
        let json = serde_json::to_string(&Stage::Proposal).unwrap();
        assert_eq!(json, "\"proposal\"");
    }

    #[test]
    fn test_stage_advances_through_pipeline() {
        assert_eq!(Stage::New.next(), Some(Stage::Contacted));
        assert_eq!(Stage::Proposal.next(), Some(Stage::Closed));
        assert_eq!(Stage::Closed.next(), None);
        assert_eq!(Stage::Lost.next(), None);
        assert_eq!(Stage::New.label(), "New");
    }

    #[test]
    fn test_lead_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "1",
            "company": "Acme Corporation",
            "contact": "John Smith",
            "email": "john@acme.com",
            "score": 92,
            "stage": "qualified",
            "value": "$45,000"
        }"#;

        let lead: Lead = serde_json::from_str(json).unwrap();

        assert_eq!(lead.company, "Acme Corporation");
        assert_eq!(lead.stage, Stage::Qualified);
        assert_eq!(lead.score, 92);
        assert!(lead.phone.is_none());
        assert!(lead.updated_at.is_none());
    }

    #[test]
    fn test_lead_patch_only_sends_set_fields() {
        let patch = LeadPatch {
            stage: Some(Stage::Contacted),
            ..Default::default()
        };

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"stage": "contacted"}));
    }

    #[test]
    fn test_dashboard_tolerates_partial_payload() {
        let data: DashboardData =
            serde_json::from_str(r#"{"metrics": {"total_leads": 5}}"#).unwrap();

        assert_eq!(data.metrics.total_leads, 5);
        assert_eq!(data.metrics.qualified_leads, 0);
        assert!(data.pipeline.is_empty());
    }

    #[test]
    fn test_message_details_from_json_string() {
        let message: LeadMessage = serde_json::from_str(
            r#"{
                "id": "m1",
                "type": "email",
                "action": "Sent outreach",
                "details": "{\"subject\": \"Hello\", \"tone\": \"friendly\"}",
                "created_at": "2025-01-01T10:00:00",
                "grok_generated": true
            }"#,
        )
        .unwrap();

        let details = message.details();
        assert_eq!(details.subject.as_deref(), Some("Hello"));
        assert_eq!(details.tone.as_deref(), Some("friendly"));
        assert!(message.grok_generated);
    }

    #[test]
    fn test_message_details_malformed_yields_default() {
        let message: LeadMessage = serde_json::from_str(
            r#"{"type": "email", "action": "x", "details": "{not json"}"#,
        )
        .unwrap();

        assert_eq!(message.details(), MessageDetails::default());
    }

    #[test]
    fn test_parse_timestamp_accepts_naive_and_rfc3339() {
        assert!(parse_timestamp("2025-01-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("2025-01-01T10:00:00+00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_format_relative() {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();

        assert_eq!(format_relative("2025-01-10T11:59:30+00:00", now), "just now");
        assert_eq!(format_relative("2025-01-10T11:55:00+00:00", now), "5 mins ago");
        assert_eq!(format_relative("2025-01-10T11:00:00", now), "1 hour ago");
        assert_eq!(format_relative("2025-01-08T12:00:00", now), "2 days ago");
        assert_eq!(format_relative("3 hours ago", now), "3 hours ago");
    }
}
