//! One lead with its message history
//!
//! Supports advancing the pipeline stage and deleting the lead (after
//! confirmation). Both are mutations; the shell invalidates dependent cache
//! entries when they succeed.

use crossterm::event::{KeyCode, KeyEvent};

use crate::data::{ApiError, Lead, LeadOverview, LeadPatch};
use crate::dispatch::{Request, Response, Ticket};
use crate::resource::Resource;

use super::{Effect, Screen, ViewContext};

#[derive(Debug)]
pub struct LeadDetailView {
    pub lead_id: String,
    pub overview: Resource<LeadOverview>,
    /// Delete confirmation prompt is open
    pub confirm_delete: bool,
    pub scroll: u16,
    update_ticket: Option<Ticket>,
    delete_ticket: Option<Ticket>,
}

impl LeadDetailView {
    pub fn mount(lead_id: &str, ctx: &mut ViewContext) -> Self {
        let mut overview = Resource::new();
        overview.begin(ctx.outbox.send(Request::LeadOverview(lead_id.to_string())));
        Self {
            lead_id: lead_id.to_string(),
            overview,
            confirm_delete: false,
            scroll: 0,
            update_ticket: None,
            delete_ticket: None,
        }
    }

    /// Shows a newer copy of this lead, e.g. after enrichment
    pub fn update_lead(&mut self, updated: &Lead) {
        if let Some(overview) = self.overview.data.as_mut() {
            if overview.lead.id == updated.id {
                overview.lead = updated.clone();
            }
        }
    }

    /// A stage change or delete is in flight
    pub fn is_busy(&self) -> bool {
        self.update_ticket.is_some() || self.delete_ticket.is_some()
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> Option<Effect> {
        if self.confirm_delete {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.confirm_delete = false;
                    self.delete_ticket =
                        Some(ctx.outbox.send(Request::DeleteLead(self.lead_id.clone())));
                }
                KeyCode::Char('n') | KeyCode::Esc => self.confirm_delete = false,
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Backspace => return Some(Effect::navigate(Screen::Leads)),
            KeyCode::Char('m') => {
                return Some(Effect::open_lead(Screen::Messaging, self.lead_id.clone()))
            }
            KeyCode::Char('r') => {
                let ticket = ctx.outbox.send(Request::LeadOverview(self.lead_id.clone()));
                self.overview.begin(ticket);
            }
            KeyCode::Char('d') if !self.is_busy() => self.confirm_delete = true,
            KeyCode::Char('s') | KeyCode::Char('>') if !self.is_busy() => {
                let lead = &self.overview.data.as_ref()?.lead;
                let Some(next) = lead.stage.next() else {
                    return Some(Effect::Status(format!(
                        "{} is already {}",
                        lead.company,
                        lead.stage.label()
                    )));
                };
                let patch = LeadPatch {
                    stage: Some(next),
                    ..Default::default()
                };
                self.update_ticket = Some(ctx.outbox.send(Request::UpdateLead {
                    id: self.lead_id.clone(),
                    patch,
                }));
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            _ => {}
        }
        None
    }

    pub fn apply(&mut self, ticket: Ticket, result: &Result<Response, ApiError>) -> Option<Effect> {
        if self.update_ticket == Some(ticket) {
            self.update_ticket = None;
            return match result {
                Ok(Response::LeadUpdated(lead)) => {
                    let status = format!("Moved {} to {}", lead.company, lead.stage.label());
                    if let Some(overview) = self.overview.data.as_mut() {
                        overview.lead = lead.clone();
                    }
                    Some(Effect::Status(status))
                }
                Ok(_) => None,
                Err(e) => Some(Effect::Alert(format!(
                    "Failed to update lead: {}",
                    e.user_message()
                ))),
            };
        }

        if self.delete_ticket == Some(ticket) {
            self.delete_ticket = None;
            return match result {
                Ok(_) => Some(Effect::navigate(Screen::Leads)),
                Err(e) => Some(Effect::Alert(format!(
                    "Failed to delete lead: {}",
                    e.user_message()
                ))),
            };
        }

        if self.overview.awaits(ticket) {
            match result {
                Ok(Response::LeadOverview(overview)) => {
                    self.overview.resolve(ticket, overview.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    self.overview.fail(ticket, e.user_message());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Stage;
    use crate::views::testing::{key, lead, Harness};

    fn loaded(harness: &mut Harness, stage: Stage) -> LeadDetailView {
        let mut view = LeadDetailView::mount("1", &mut harness.ctx());
        let ticket = view.overview.pending().unwrap();
        let overview = LeadOverview {
            lead: lead("1", "Acme Corporation", "John Smith", stage),
            messages: Vec::new(),
            messages_error: None,
        };
        view.apply(ticket, &Ok(Response::LeadOverview(overview)));
        let _ = harness.outbox.drain();
        view
    }

    #[test]
    fn test_mount_fetches_lead_and_history() {
        let mut harness = Harness::new();

        LeadDetailView::mount("7", &mut harness.ctx());

        assert_eq!(
            harness.outbox.queued()[0].request,
            Request::LeadOverview("7".to_string())
        );
    }

    #[test]
    fn test_advance_stage_sends_patch() {
        let mut harness = Harness::new();
        let mut view = loaded(&mut harness, Stage::Qualified);

        view.handle_key(key(KeyCode::Char('s')), &mut harness.ctx());

        let queued = harness.outbox.queued()[0].clone();
        assert_eq!(
            queued.request,
            Request::UpdateLead {
                id: "1".to_string(),
                patch: LeadPatch {
                    stage: Some(Stage::Proposal),
                    ..Default::default()
                }
            }
        );

        let updated = lead("1", "Acme Corporation", "John Smith", Stage::Proposal);
        let effect = view.apply(queued.ticket, &Ok(Response::LeadUpdated(updated)));
        assert_eq!(
            effect,
            Some(Effect::Status("Moved Acme Corporation to Proposal".to_string()))
        );
        assert_eq!(view.overview.data.as_ref().unwrap().lead.stage, Stage::Proposal);
    }

    #[test]
    fn test_closed_lead_cannot_advance() {
        let mut harness = Harness::new();
        let mut view = loaded(&mut harness, Stage::Closed);

        let effect = view.handle_key(key(KeyCode::Char('s')), &mut harness.ctx());

        assert!(matches!(effect, Some(Effect::Status(_))));
        assert!(harness.outbox.queued().is_empty());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut harness = Harness::new();
        let mut view = loaded(&mut harness, Stage::New);

        view.handle_key(key(KeyCode::Char('d')), &mut harness.ctx());
        assert!(view.confirm_delete);
        view.handle_key(key(KeyCode::Char('n')), &mut harness.ctx());
        assert!(harness.outbox.queued().is_empty());

        view.handle_key(key(KeyCode::Char('d')), &mut harness.ctx());
        view.handle_key(key(KeyCode::Char('y')), &mut harness.ctx());
        let queued = harness.outbox.queued()[0].clone();
        assert_eq!(queued.request, Request::DeleteLead("1".to_string()));

        let effect = view.apply(queued.ticket, &Ok(Response::LeadDeleted("1".to_string())));
        assert_eq!(effect, Some(Effect::navigate(Screen::Leads)));
    }

    #[test]
    fn test_failed_delete_alerts_and_stays() {
        let mut harness = Harness::new();
        let mut view = loaded(&mut harness, Stage::New);
        view.handle_key(key(KeyCode::Char('d')), &mut harness.ctx());
        view.handle_key(key(KeyCode::Char('y')), &mut harness.ctx());
        let ticket = harness.outbox.queued()[0].ticket;
        let err = ApiError::Status {
            status: 404,
            detail: Some("Lead not found".to_string()),
        };

        let effect = view.apply(ticket, &Err(err));

        assert_eq!(
            effect,
            Some(Effect::Alert("Failed to delete lead: Lead not found".to_string()))
        );
        assert!(!view.is_busy());
    }

    #[test]
    fn test_compose_message_for_lead() {
        let mut harness = Harness::new();
        let mut view = loaded(&mut harness, Stage::New);

        let effect = view.handle_key(key(KeyCode::Char('m')), &mut harness.ctx());

        assert_eq!(effect, Some(Effect::open_lead(Screen::Messaging, "1")));
    }
}
