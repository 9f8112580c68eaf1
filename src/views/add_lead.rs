//! New lead form
//!
//! Required fields are checked locally before anything is sent. A created lead
//! is enriched by the backend afterwards; the shell polls for that.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

use crate::data::{ApiError, LeadDraft, Stage};
use crate::dispatch::{Request, Response, Ticket};

use super::{edit_text, step_index, Effect, Screen, ViewContext};

/// Why a form cannot be submitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields (*)")]
    MissingRequired(Vec<FormField>),

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// Inputs of the form, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Company,
    Website,
    Industry,
    Employees,
    Location,
    FirstName,
    LastName,
    JobTitle,
    Email,
    Phone,
    Linkedin,
    Stage,
    Value,
    Notes,
    Tags,
}

impl FormField {
    pub const ALL: [FormField; 15] = [
        FormField::Company,
        FormField::Website,
        FormField::Industry,
        FormField::Employees,
        FormField::Location,
        FormField::FirstName,
        FormField::LastName,
        FormField::JobTitle,
        FormField::Email,
        FormField::Phone,
        FormField::Linkedin,
        FormField::Stage,
        FormField::Value,
        FormField::Notes,
        FormField::Tags,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Company => "Company Name",
            FormField::Website => "Company Website",
            FormField::Industry => "Industry",
            FormField::Employees => "Company Size",
            FormField::Location => "Location",
            FormField::FirstName => "First Name",
            FormField::LastName => "Last Name",
            FormField::JobTitle => "Job Title",
            FormField::Email => "Email",
            FormField::Phone => "Phone",
            FormField::Linkedin => "LinkedIn",
            FormField::Stage => "Stage",
            FormField::Value => "Deal Value",
            FormField::Notes => "Notes",
            FormField::Tags => "Tags",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            FormField::Company | FormField::FirstName | FormField::LastName | FormField::Email
        )
    }
}

/// Raw form input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadForm {
    pub company: String,
    pub website: String,
    pub industry: String,
    pub employees: String,
    pub location: String,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub stage: Stage,
    pub value: String,
    pub notes: String,
    /// Comma-separated
    pub tags: String,
}

fn optional(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl LeadForm {
    /// Text buffer behind a field; `None` for the stage selector
    pub fn text(&self, field: FormField) -> Option<&String> {
        Some(match field {
            FormField::Company => &self.company,
            FormField::Website => &self.website,
            FormField::Industry => &self.industry,
            FormField::Employees => &self.employees,
            FormField::Location => &self.location,
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::JobTitle => &self.job_title,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::Linkedin => &self.linkedin,
            FormField::Value => &self.value,
            FormField::Notes => &self.notes,
            FormField::Tags => &self.tags,
            FormField::Stage => return None,
        })
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        Some(match field {
            FormField::Company => &mut self.company,
            FormField::Website => &mut self.website,
            FormField::Industry => &mut self.industry,
            FormField::Employees => &mut self.employees,
            FormField::Location => &mut self.location,
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::JobTitle => &mut self.job_title,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::Linkedin => &mut self.linkedin,
            FormField::Value => &mut self.value,
            FormField::Notes => &mut self.notes,
            FormField::Tags => &mut self.tags,
            FormField::Stage => return None,
        })
    }

    /// Checks required fields and builds the request body
    pub fn validate(&self) -> Result<LeadDraft, ValidationError> {
        let missing: Vec<FormField> = FormField::ALL
            .into_iter()
            .filter(|field| field.is_required())
            .filter(|field| self.text(*field).map_or(true, |s| s.trim().is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingRequired(missing));
        }

        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
        if !valid_email {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(LeadDraft {
            company: self.company.trim().to_string(),
            contact: format!("{} {}", self.first_name.trim(), self.last_name.trim()),
            email: email.to_string(),
            phone: optional(&self.phone),
            stage: self.stage.clone(),
            value: optional(&self.value).unwrap_or_else(|| "$0".to_string()),
            industry: optional(&self.industry),
            employees: optional(&self.employees),
            website: optional(&self.website),
            location: optional(&self.location),
            job_title: optional(&self.job_title),
            linkedin: optional(&self.linkedin),
            notes: optional(&self.notes),
            tags: self
                .tags
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}

#[derive(Debug, Default)]
pub struct AddLeadView {
    pub form: LeadForm,
    /// Index into [`FormField::ALL`]
    pub focus: usize,
    save_ticket: Option<Ticket>,
}

impl AddLeadView {
    pub fn mount() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> FormField {
        FormField::ALL[self.focus]
    }

    pub fn is_saving(&self) -> bool {
        self.save_ticket.is_some()
    }

    fn submit(&mut self, ctx: &mut ViewContext) -> Option<Effect> {
        if self.is_saving() {
            return None;
        }
        match self.form.validate() {
            Ok(draft) => {
                self.save_ticket = Some(ctx.outbox.send(Request::CreateLead(draft)));
                None
            }
            Err(e) => Some(Effect::Alert(e.to_string())),
        }
    }

    fn cycle_stage(&mut self, forward: bool) {
        let index = Stage::KNOWN
            .iter()
            .position(|s| *s == self.form.stage)
            .unwrap_or(0);
        self.form.stage = Stage::KNOWN[step_index(index, Stage::KNOWN.len(), forward)].clone();
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> Option<Effect> {
        let field = self.focused();
        match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.submit(ctx)
            }
            KeyCode::Esc => return Some(Effect::navigate(Screen::Leads)),
            KeyCode::Enter if self.focus + 1 == FormField::ALL.len() => return self.submit(ctx),
            KeyCode::Tab | KeyCode::Down | KeyCode::Enter => {
                self.focus = step_index(self.focus, FormField::ALL.len(), true)
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = step_index(self.focus, FormField::ALL.len(), false)
            }
            KeyCode::Left if field == FormField::Stage => self.cycle_stage(false),
            KeyCode::Right | KeyCode::Char(' ') if field == FormField::Stage => {
                self.cycle_stage(true)
            }
            _ => {
                if let Some(buffer) = self.form.text_mut(field) {
                    edit_text(buffer, key);
                }
            }
        }
        None
    }

    pub fn apply(&mut self, ticket: Ticket, result: &Result<Response, ApiError>) -> Option<Effect> {
        if self.save_ticket != Some(ticket) {
            return None;
        }
        self.save_ticket = None;
        match result {
            Ok(_) => Some(Effect::navigate(Screen::Leads)),
            Err(e @ ApiError::Connection(_)) => Some(Effect::Alert(e.user_message())),
            Err(e) => Some(Effect::Alert(format!("Error saving lead: {}", e.user_message()))),
        }
    }
}
