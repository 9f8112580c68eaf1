//! Screens of the dashboard and their local state
//!
//! Each view reads its cached resource on mount, queues requests in the
//! shared [`Outbox`] when it needs fresh data, and applies only the
//! completions it is waiting for.

pub mod add_lead;
pub mod dashboard;
pub mod evaluation;
pub mod lead_detail;
pub mod leads;
pub mod messaging;
pub mod settings;

pub use add_lead::{AddLeadView, FormField, LeadForm, ValidationError};
pub use dashboard::DashboardView;
pub use evaluation::EvaluationView;
pub use lead_detail::LeadDetailView;
pub use leads::{LeadsView, STAGE_FILTERS};
pub use messaging::MessagingView;
pub use settings::SettingsView;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::cache::CacheManager;
use crate::data::ApiError;
use crate::dispatch::{Outbox, Response, Ticket};
use crate::settings::{Settings, SettingsStore};

/// Identifies a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Dashboard,
    Leads,
    LeadDetail,
    AddLead,
    Messaging,
    Evaluation,
    Settings,
}

impl Screen {
    /// Screens listed in the sidebar, in order (selected with `1`-`5`)
    pub const SIDEBAR: [Screen; 5] = [
        Screen::Dashboard,
        Screen::Leads,
        Screen::Evaluation,
        Screen::Messaging,
        Screen::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::Leads => "Leads",
            Screen::LeadDetail => "Lead Detail",
            Screen::AddLead => "Add Lead",
            Screen::Messaging => "Messaging",
            Screen::Evaluation => "Model Evaluation",
            Screen::Settings => "Settings",
        }
    }

    /// The sidebar entry highlighted while this screen is shown
    pub fn sidebar_entry(self) -> Screen {
        match self {
            Screen::LeadDetail | Screen::AddLead => Screen::Leads,
            other => other,
        }
    }
}

/// Shared services a view works with while handling input or completions
pub struct ViewContext<'a> {
    pub cache: &'a CacheManager,
    pub outbox: &'a mut Outbox,
    pub settings: &'a mut Settings,
    pub settings_store: &'a SettingsStore,
}

/// Something a view asks the shell to do
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Switch screens, optionally selecting a lead
    Navigate {
        screen: Screen,
        lead: Option<String>,
    },
    /// Show a modal message that must be dismissed
    Alert(String),
    /// Show a transient message in the status bar
    Status(String),
}

impl Effect {
    pub fn navigate(screen: Screen) -> Self {
        Effect::Navigate { screen, lead: None }
    }

    pub fn open_lead(screen: Screen, lead_id: impl Into<String>) -> Self {
        Effect::Navigate {
            screen,
            lead: Some(lead_id.into()),
        }
    }
}

/// The mounted view
#[derive(Debug)]
pub enum ActiveView {
    Dashboard(DashboardView),
    Leads(LeadsView),
    LeadDetail(LeadDetailView),
    AddLead(AddLeadView),
    Messaging(MessagingView),
    Evaluation(EvaluationView),
    Settings(SettingsView),
}

impl ActiveView {
    /// Mounts `screen`. Lead-specific screens fall back to the lead list without a lead.
    pub fn mount(screen: Screen, lead: Option<&str>, ctx: &mut ViewContext) -> Self {
        match (screen, lead) {
            (Screen::Dashboard, _) => ActiveView::Dashboard(DashboardView::mount(ctx)),
            (Screen::LeadDetail, Some(id)) => {
                ActiveView::LeadDetail(LeadDetailView::mount(id, ctx))
            }
            (Screen::Leads | Screen::LeadDetail, _) => ActiveView::Leads(LeadsView::mount(ctx)),
            (Screen::AddLead, _) => ActiveView::AddLead(AddLeadView::mount()),
            (Screen::Messaging, lead) => ActiveView::Messaging(MessagingView::mount(lead, ctx)),
            (Screen::Evaluation, _) => ActiveView::Evaluation(EvaluationView::mount(ctx)),
            (Screen::Settings, _) => ActiveView::Settings(SettingsView::mount(ctx)),
        }
    }

    pub fn screen(&self) -> Screen {
        match self {
            ActiveView::Dashboard(_) => Screen::Dashboard,
            ActiveView::Leads(_) => Screen::Leads,
            ActiveView::LeadDetail(_) => Screen::LeadDetail,
            ActiveView::AddLead(_) => Screen::AddLead,
            ActiveView::Messaging(_) => Screen::Messaging,
            ActiveView::Evaluation(_) => Screen::Evaluation,
            ActiveView::Settings(_) => Screen::Settings,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> Option<Effect> {
        match self {
            ActiveView::Dashboard(view) => view.handle_key(key, ctx),
            ActiveView::Leads(view) => view.handle_key(key, ctx),
            ActiveView::LeadDetail(view) => view.handle_key(key, ctx),
            ActiveView::AddLead(view) => view.handle_key(key, ctx),
            ActiveView::Messaging(view) => view.handle_key(key, ctx),
            ActiveView::Evaluation(view) => view.handle_key(key, ctx),
            ActiveView::Settings(view) => view.handle_key(key, ctx),
        }
    }

    /// Offers a completion to the view; views ignore tickets they are not waiting for
    pub fn apply(
        &mut self,
        ticket: Ticket,
        result: &Result<Response, ApiError>,
        ctx: &mut ViewContext,
    ) -> Option<Effect> {
        match self {
            ActiveView::Dashboard(view) => view.apply(ticket, result, ctx),
            ActiveView::Leads(view) => view.apply(ticket, result),
            ActiveView::LeadDetail(view) => view.apply(ticket, result),
            ActiveView::AddLead(view) => view.apply(ticket, result),
            ActiveView::Messaging(view) => view.apply(ticket, result),
            ActiveView::Evaluation(view) => view.apply(ticket, result, ctx),
            ActiveView::Settings(_) => None,
        }
    }

    /// Called before the view is replaced
    pub fn unmount(&mut self, ctx: &mut ViewContext) {
        if let ActiveView::Evaluation(view) = self {
            view.unmount(ctx);
        }
    }

    /// Whether the view is capturing text, so global shortcuts must not fire
    pub fn is_editing(&self) -> bool {
        match self {
            ActiveView::Leads(view) => view.searching,
            ActiveView::AddLead(_) => true,
            ActiveView::Messaging(_) | ActiveView::Dashboard(_) => false,
            ActiveView::LeadDetail(view) => view.confirm_delete,
            ActiveView::Evaluation(_) | ActiveView::Settings(_) => false,
        }
    }
}

/// Applies a text-editing key to `buffer`. Returns false for keys that do not edit.
pub fn edit_text(buffer: &mut String, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.push(c);
            true
        }
        KeyCode::Backspace => {
            buffer.pop();
            true
        }
        _ => false,
    }
}

/// Moves a list cursor by one, wrapping at both ends
pub fn step_index(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (index + 1) % len
    } else if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for view tests

    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use crate::cache::{CacheManager, ManualClock, MemoryStorage};
    use crate::data::{Lead, Stage};
    use crate::dispatch::Outbox;
    use crate::settings::{Settings, SettingsStore};

    use super::ViewContext;

    pub const START_MILLIS: i64 = 1_700_000_000_000;

    pub struct Harness {
        pub cache: CacheManager,
        pub clock: Arc<ManualClock>,
        pub outbox: Outbox,
        pub settings: Settings,
        pub settings_store: SettingsStore,
    }

    impl Harness {
        pub fn new() -> Self {
            let clock = Arc::new(ManualClock::new(START_MILLIS));
            Self {
                cache: CacheManager::new(Arc::new(MemoryStorage::new()), clock.clone()),
                clock,
                outbox: Outbox::new(),
                settings: Settings::default(),
                settings_store: SettingsStore::new(Arc::new(MemoryStorage::new())),
            }
        }

        pub fn ctx(&mut self) -> ViewContext<'_> {
            ViewContext {
                cache: &self.cache,
                outbox: &mut self.outbox,
                settings: &mut self.settings,
                settings_store: &self.settings_store,
            }
        }
    }

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    pub fn lead(id: &str, company: &str, contact: &str, stage: Stage) -> Lead {
        Lead {
            id: id.to_string(),
            company: company.to_string(),
            contact: contact.to_string(),
            email: format!("{}@example.com", id),
            phone: None,
            stage,
            value: "$10,000".to_string(),
            industry: Some("Technology".to_string()),
            score: 80,
            last_contact: None,
            created_at: None,
            updated_at: Some("2025-01-01T10:00:00".to_string()),
            website: None,
            location: None,
            job_title: None,
            linkedin: None,
            notes: None,
            tags: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ctrl, key, Harness};
    use super::*;

    #[test]
    fn test_sidebar_entry_for_nested_screens() {
        assert_eq!(Screen::LeadDetail.sidebar_entry(), Screen::Leads);
        assert_eq!(Screen::AddLead.sidebar_entry(), Screen::Leads);
        assert_eq!(Screen::Settings.sidebar_entry(), Screen::Settings);
    }

    #[test]
    fn test_mount_lead_detail_without_lead_falls_back_to_list() {
        let mut harness = Harness::new();

        let view = ActiveView::mount(Screen::LeadDetail, None, &mut harness.ctx());

        assert_eq!(view.screen(), Screen::Leads);
    }

    #[test]
    fn test_edit_text_ignores_control_chords() {
        let mut buffer = String::from("ab");

        assert!(edit_text(&mut buffer, key(KeyCode::Char('c'))));
        assert!(edit_text(&mut buffer, key(KeyCode::Backspace)));
        assert!(!edit_text(&mut buffer, ctrl('s')));
        assert_eq!(buffer, "ab");
    }

    #[test]
    fn test_step_index_wraps() {
        assert_eq!(step_index(0, 3, false), 2);
        assert_eq!(step_index(2, 3, true), 0);
        assert_eq!(step_index(0, 0, true), 0);
    }
}
