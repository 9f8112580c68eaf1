//! AI message generation endpoint
//!
//! The backend drafts outreach with an LLM and returns the body as HTML;
//! [`html_to_text`] flattens it for the terminal.

use serde::{Deserialize, Serialize};

use super::client::{ApiClient, ApiError};

/// Tone of a generated message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Professional,
    Friendly,
    Casual,
    Direct,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Professional, Tone::Friendly, Tone::Casual, Tone::Direct];

    pub fn label(self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Friendly => "Friendly",
            Tone::Casual => "Casual",
            Tone::Direct => "Direct",
        }
    }
}

/// What the message should achieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Introduction,
    FollowUp,
    BookMeeting,
    Reengage,
}

impl Goal {
    pub const ALL: [Goal; 4] = [
        Goal::Introduction,
        Goal::FollowUp,
        Goal::BookMeeting,
        Goal::Reengage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Goal::Introduction => "Introduction",
            Goal::FollowUp => "Follow-up",
            Goal::BookMeeting => "Book a meeting",
            Goal::Reengage => "Re-engage",
        }
    }
}

/// Body of `POST /messages/generate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRequest {
    pub lead_id: String,
    pub tone: Tone,
    pub goal: Goal,
    pub model: String,
}

/// A drafted message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMessage {
    #[serde(default)]
    pub subject: String,
    /// HTML body
    #[serde(default)]
    pub body: String,
}

impl GeneratedMessage {
    /// Body flattened to plain text
    pub fn body_text(&self) -> String {
        html_to_text(&self.body)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<GeneratedMessage>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiClient {
    /// Asks the backend to draft a message for a lead
    pub async fn generate_message(
        &self,
        request: &MessageRequest,
    ) -> Result<GeneratedMessage, ApiError> {
        let response: GenerateResponse = self
            .send_json(self.post("/messages/generate").json(request))
            .await?;

        match response {
            GenerateResponse {
                success: true,
                message: Some(message),
                ..
            } => Ok(message),
            GenerateResponse { error, .. } => Err(ApiError::Rejected(
                error.unwrap_or_else(|| "Message generation failed".to_string()),
            )),
        }
    }
}

/// Converts a small HTML fragment into readable plain text
///
/// Block-level closing tags and `<br>` become line breaks, list items get a
/// bullet, every other tag is dropped and common entities are decoded.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            // Unterminated tag, keep the text as is
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let tag = rest[start + 1..start + end].trim().to_lowercase();
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("");

        match (tag.starts_with('/'), name) {
            (_, "br") => out.push('\n'),
            (false, "li") => out.push_str("\n• "),
            (true, "p" | "div" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4") => out.push('\n'),
            _ => {}
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    // Collapse runs of blank lines and trim trailing spaces
    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = 0;
    for line in decoded.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> MessageRequest {
        MessageRequest {
            lead_id: "1".to_string(),
            tone: Tone::Friendly,
            goal: Goal::BookMeeting,
            model: "grok-3".to_string(),
        }
    }

    #[test]
    fn test_request_serializes_snake_case() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "lead_id": "1",
                "tone": "friendly",
                "goal": "book_meeting",
                "model": "grok-3"
            })
        );
    }

    #[test]
    fn test_html_to_text_paragraphs_and_lists() {
        let html = "<p>Hi John,</p><p>We help teams:</p><ul><li>ship faster</li><li>cut costs &amp; risk</li></ul><p>Best,<br>Sam</p>";

        let text = html_to_text(html);

        assert_eq!(
            text,
            "Hi John,\nWe help teams:\n\n• ship faster\n• cut costs & risk\nBest,\nSam"
        );
    }

    #[test]
    fn test_html_to_text_plain_text_passthrough() {
        assert_eq!(html_to_text("Just text"), "Just text");
        assert_eq!(html_to_text("a < b"), "a < b");
    }

    #[tokio::test]
    async fn test_generate_message_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/messages/generate")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({"lead_id": "1"})))
            .with_status(200)
            .with_body(r#"{"success": true, "message": {"subject": "Quick idea", "body": "<p>Hello</p>"}}"#)
            .create_async()
            .await;
        let client = ApiClient::with_client(reqwest::Client::new(), &server.url());

        let message = client.generate_message(&request()).await.expect("generate");

        assert_eq!(message.subject, "Quick idea");
        assert_eq!(message.body_text(), "Hello");
    }

    #[tokio::test]
    async fn test_generate_message_unsuccessful_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/messages/generate")
            .with_status(200)
            .with_body(r#"{"success": false, "error": "Model overloaded"}"#)
            .create_async()
            .await;
        let client = ApiClient::with_client(reqwest::Client::new(), &server.url());

        let err = client.generate_message(&request()).await.unwrap_err();

        assert_eq!(err.user_message(), "Model overloaded");
    }
}
