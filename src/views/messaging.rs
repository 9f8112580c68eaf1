//! AI-drafted outreach for a lead

use crossterm::event::{KeyCode, KeyEvent};

use crate::data::{ApiError, GeneratedMessage, Goal, Lead, MessageRequest, Tone, MODELS};
use crate::dispatch::{Request, Response, Ticket};
use crate::resource::Resource;

use super::{step_index, Effect, ViewContext};

/// Option rows of the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerRow {
    Lead,
    Tone,
    Goal,
    Model,
}

impl ComposerRow {
    pub const ALL: [ComposerRow; 4] = [
        ComposerRow::Lead,
        ComposerRow::Tone,
        ComposerRow::Goal,
        ComposerRow::Model,
    ];
}

#[derive(Debug)]
pub struct MessagingView {
    pub leads: Resource<Vec<Lead>>,
    /// Lead to preselect once the list arrives
    wanted_lead: Option<String>,
    pub lead: usize,
    pub tone: usize,
    pub goal: usize,
    pub model: usize,
    /// Index into [`ComposerRow::ALL`]
    pub row: usize,
    pub message: Resource<GeneratedMessage>,
}

impl MessagingView {
    pub fn mount(lead: Option<&str>, ctx: &mut ViewContext) -> Self {
        let mut leads = Resource::new();
        leads.begin(ctx.outbox.send(Request::Leads));
        let model = MODELS
            .iter()
            .position(|(id, _)| *id == ctx.settings.default_model)
            .unwrap_or(0);
        Self {
            leads,
            wanted_lead: lead.map(str::to_string),
            lead: 0,
            tone: 0,
            goal: 0,
            model,
            row: 0,
            message: Resource::new(),
        }
    }

    pub fn selected_lead(&self) -> Option<&Lead> {
        self.leads.data.as_ref()?.get(self.lead)
    }

    pub fn tone(&self) -> Tone {
        Tone::ALL[self.tone]
    }

    pub fn goal(&self) -> Goal {
        Goal::ALL[self.goal]
    }

    pub fn model_id(&self) -> &'static str {
        MODELS[self.model].0
    }

    fn cycle(&mut self, forward: bool) {
        let lead_count = self.leads.data.as_ref().map_or(0, Vec::len);
        match ComposerRow::ALL[self.row] {
            ComposerRow::Lead => self.lead = step_index(self.lead, lead_count, forward),
            ComposerRow::Tone => self.tone = step_index(self.tone, Tone::ALL.len(), forward),
            ComposerRow::Goal => self.goal = step_index(self.goal, Goal::ALL.len(), forward),
            ComposerRow::Model => self.model = step_index(self.model, MODELS.len(), forward),
        }
    }

    fn generate(&mut self, ctx: &mut ViewContext) -> Option<Effect> {
        let Some(lead) = self.selected_lead() else {
            return Some(Effect::Alert("Select a lead first".to_string()));
        };
        let request = MessageRequest {
            lead_id: lead.id.clone(),
            tone: self.tone(),
            goal: self.goal(),
            model: self.model_id().to_string(),
        };
        let ticket = ctx.outbox.send(Request::GenerateMessage(request));
        self.message.begin(ticket);
        None
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> Option<Effect> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.row = step_index(self.row, ComposerRow::ALL.len(), false)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.row = step_index(self.row, ComposerRow::ALL.len(), true)
            }
            KeyCode::Left | KeyCode::Char('h') => self.cycle(false),
            KeyCode::Right | KeyCode::Char('l') => self.cycle(true),
            KeyCode::Enter | KeyCode::Char('g') if !self.message.is_loading() => {
                return self.generate(ctx)
            }
            _ => {}
        }
        None
    }

    pub fn apply(&mut self, ticket: Ticket, result: &Result<Response, ApiError>) -> Option<Effect> {
        if self.leads.awaits(ticket) {
            match result {
                Ok(Response::Leads(leads)) => {
                    if let Some(wanted) = self.wanted_lead.take() {
                        self.lead = leads.iter().position(|l| l.id == wanted).unwrap_or(0);
                    }
                    self.leads.resolve(ticket, leads.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    self.leads.fail(ticket, e.user_message());
                }
            }
        } else if self.message.awaits(ticket) {
            match result {
                Ok(Response::MessageGenerated(message)) => {
                    self.message.resolve(ticket, message.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    self.message.fail(ticket, e.user_message());
                }
            }
        }
        None
    }
}
