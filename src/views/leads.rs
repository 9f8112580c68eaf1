//! Lead list with stage filter, search and bulk notify

use std::collections::BTreeSet;

use crossterm::event::{KeyCode, KeyEvent};

use crate::data::{ApiError, Lead, Stage};
use crate::dispatch::{Request, Response, Ticket};
use crate::resource::Resource;

use super::{edit_text, step_index, Effect, Screen, ViewContext};

/// Filter tabs; `None` shows every lead
pub const STAGE_FILTERS: [Option<Stage>; 6] = [
    None,
    Some(Stage::New),
    Some(Stage::Contacted),
    Some(Stage::Qualified),
    Some(Stage::Proposal),
    Some(Stage::Closed),
];

#[derive(Debug)]
pub struct LeadsView {
    pub leads: Resource<Vec<Lead>>,
    /// Index into [`STAGE_FILTERS`]
    pub filter: usize,
    pub search: String,
    pub searching: bool,
    /// Cursor within the filtered list
    pub selected: usize,
    /// Ids marked for notification
    pub marked: BTreeSet<String>,
    notify_ticket: Option<Ticket>,
}

impl LeadsView {
    /// Always fetches; the lead list is not cached
    pub fn mount(ctx: &mut ViewContext) -> Self {
        let mut leads = Resource::new();
        leads.begin(ctx.outbox.send(Request::Leads));
        Self {
            leads,
            filter: 0,
            search: String::new(),
            searching: false,
            selected: 0,
            marked: BTreeSet::new(),
            notify_ticket: None,
        }
    }

    /// Leads passing the stage filter and the search query
    pub fn visible(&self) -> Vec<&Lead> {
        let query = self.search.trim().to_lowercase();
        let stage = &STAGE_FILTERS[self.filter];
        self.leads
            .data
            .iter()
            .flatten()
            .filter(|lead| stage.as_ref().map_or(true, |s| &lead.stage == s))
            .filter(|lead| {
                query.is_empty()
                    || lead.company.to_lowercase().contains(&query)
                    || lead.contact.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn selected_lead(&self) -> Option<&Lead> {
        self.visible().get(self.selected).copied()
    }

    /// Number of leads per filter tab
    pub fn count_for(&self, filter: usize) -> usize {
        let stage = &STAGE_FILTERS[filter];
        self.leads
            .data
            .iter()
            .flatten()
            .filter(|lead| stage.as_ref().map_or(true, |s| &lead.stage == s))
            .count()
    }

    /// Replaces a listed lead with a newer copy, e.g. after enrichment
    pub fn update_lead(&mut self, updated: &Lead) {
        if let Some(lead) = self
            .leads
            .data
            .iter_mut()
            .flatten()
            .find(|lead| lead.id == updated.id)
        {
            *lead = updated.clone();
        }
    }

    pub fn is_notifying(&self) -> bool {
        self.notify_ticket.is_some()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> Option<Effect> {
        if self.searching {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.searching = false,
                _ => {
                    if edit_text(&mut self.search, key) {
                        self.selected = 0;
                    }
                }
            }
            return None;
        }

        match key.code {
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Esc if !self.search.is_empty() => {
                self.search.clear();
                self.selected = 0;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.filter = step_index(self.filter, STAGE_FILTERS.len(), false);
                self.selected = 0;
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.filter = step_index(self.filter, STAGE_FILTERS.len(), true);
                self.selected = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = step_index(self.selected, self.visible().len(), false);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = step_index(self.selected, self.visible().len(), true);
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_lead().map(|lead| lead.id.clone()) {
                    if !self.marked.remove(&id) {
                        self.marked.insert(id);
                    }
                }
            }
            KeyCode::Char('n') if !self.is_notifying() => {
                if self.marked.is_empty() {
                    return Some(Effect::Alert(
                        "Select at least one lead to notify".to_string(),
                    ));
                }
                let ids = self.marked.iter().cloned().collect();
                self.notify_ticket = Some(ctx.outbox.send(Request::NotifyLeads(ids)));
            }
            KeyCode::Char('r') => self.leads.begin(ctx.outbox.send(Request::Leads)),
            KeyCode::Char('a') => return Some(Effect::navigate(Screen::AddLead)),
            KeyCode::Enter => {
                if let Some(lead) = self.selected_lead() {
                    return Some(Effect::open_lead(Screen::LeadDetail, lead.id.clone()));
                }
            }
            _ => {}
        }
        None
    }

    pub fn apply(&mut self, ticket: Ticket, result: &Result<Response, ApiError>) -> Option<Effect> {
        if self.notify_ticket == Some(ticket) {
            self.notify_ticket = None;
            return Some(match result {
                Ok(Response::Notified(outcome)) => {
                    self.marked.clear();
                    Effect::Status(format!("Notified {} leads", outcome.notified))
                }
                Ok(_) => return None,
                Err(e) => Effect::Alert(format!("Failed to notify leads: {}", e.user_message())),
            });
        }

        if self.leads.awaits(ticket) {
            match result {
                Ok(Response::Leads(leads)) => {
                    self.leads.resolve(ticket, leads.clone());
                    let known: BTreeSet<&str> = leads.iter().map(|l| l.id.as_str()).collect();
                    self.marked.retain(|id| known.contains(id.as_str()));
                    self.clamp_selection();
                }
                Ok(_) => {}
                Err(e) => {
                    self.leads.fail(ticket, e.user_message());
                }
            }
        }
        None
    }
}
