//! Application state management for Grok SDR
//!
//! This module contains the navigation shell: which view is mounted, which
//! lead is selected, global keyboard shortcuts, and routing of request
//! completions to the mounted view and the cache.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};

use crate::cache::{CacheManager, Mutation};
use crate::data::ApiError;
use crate::dispatch::{Completion, Outbox, Response};
use crate::enrichment::{EnrichmentPoller, PollOutcome};
use crate::settings::{Settings, SettingsStore};
use crate::views::{ActiveView, Effect, Screen, ViewContext};

/// Main application struct managing navigation and shared state
pub struct App {
    /// Currently mounted view
    pub view: ActiveView,
    /// Lead chosen in the list, used by the detail and messaging screens
    pub selected_lead: Option<String>,
    /// Session response cache
    pub cache: CacheManager,
    /// Requests queued by views, drained by the event loop
    pub outbox: Outbox,
    /// Saved settings
    pub settings: Settings,
    settings_store: SettingsStore,
    /// Leads waiting on backend enrichment
    pub pollers: Vec<EnrichmentPoller>,
    /// Modal message; blocks other input until dismissed
    pub alert: Option<String>,
    /// Transient message shown in the status bar
    pub status: Option<String>,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
}

impl App {
    /// Creates the app and mounts `initial`
    pub fn new(cache: CacheManager, settings_store: SettingsStore, initial: Screen) -> Self {
        let mut outbox = Outbox::new();
        let mut settings = settings_store.load();
        let view = ActiveView::mount(
            initial,
            None,
            &mut ViewContext {
                cache: &cache,
                outbox: &mut outbox,
                settings: &mut settings,
                settings_store: &settings_store,
            },
        );
        Self {
            view,
            selected_lead: None,
            cache,
            outbox,
            settings,
            settings_store,
            pollers: Vec::new(),
            alert: None,
            status: None,
            show_help: false,
            should_quit: false,
        }
    }

    /// Screen currently shown
    pub fn screen(&self) -> Screen {
        self.view.screen()
    }

    fn with_view<R>(&mut self, f: impl FnOnce(&mut ActiveView, &mut ViewContext) -> R) -> R {
        let mut ctx = ViewContext {
            cache: &self.cache,
            outbox: &mut self.outbox,
            settings: &mut self.settings,
            settings_store: &self.settings_store,
        };
        f(&mut self.view, &mut ctx)
    }

    /// Unmounts the current view and mounts `screen`
    pub fn navigate(&mut self, screen: Screen, lead: Option<String>) {
        if lead.is_some() {
            self.selected_lead = lead.clone();
        }
        self.with_view(|view, ctx| {
            view.unmount(ctx);
            *view = ActiveView::mount(screen, lead.as_deref(), ctx);
        });
    }

    fn apply_effect(&mut self, effect: Option<Effect>) {
        match effect {
            Some(Effect::Navigate { screen, lead }) => self.navigate(screen, lead),
            Some(Effect::Alert(message)) => self.alert = Some(message),
            Some(Effect::Status(message)) => self.status = Some(message),
            None => {}
        }
    }

    /// Handles keyboard input
    ///
    /// # Key Bindings
    /// - `Ctrl-C`: Quit from anywhere
    /// - `q`: Quit (when not typing)
    /// - `?`: Toggle help overlay
    /// - `Tab`/`Shift-Tab`: Next/previous sidebar entry
    /// - `1`-`5`: Jump to a sidebar entry
    ///
    /// Everything else is handled by the mounted view.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Alerts are modal
        if self.alert.is_some() {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('q')
            ) {
                self.alert = None;
            }
            return;
        }

        if self.show_help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        self.status = None;

        if !self.view.is_editing() {
            let sidebar = Screen::SIDEBAR;
            let current = sidebar
                .iter()
                .position(|s| *s == self.screen().sidebar_entry())
                .unwrap_or(0);
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                    return;
                }
                KeyCode::Tab => {
                    let lead = self.selected_lead.clone();
                    self.navigate(sidebar[(current + 1) % sidebar.len()], lead);
                    return;
                }
                KeyCode::BackTab => {
                    let lead = self.selected_lead.clone();
                    self.navigate(sidebar[(current + sidebar.len() - 1) % sidebar.len()], lead);
                    return;
                }
                KeyCode::Char(c @ '1'..='5') => {
                    let index = c as usize - '1' as usize;
                    let lead = self.selected_lead.clone();
                    self.navigate(sidebar[index], lead);
                    return;
                }
                _ => {}
            }
        }

        let effect = self.with_view(|view, ctx| view.handle_key(key, ctx));
        self.apply_effect(effect);
    }

    /// Applies a finished request
    ///
    /// Successful mutations invalidate their dependent cache entries before the
    /// view sees the result; failed ones leave the cache untouched.
    pub fn apply(&mut self, completion: Completion) {
        let Completion { ticket, result } = completion;

        if let Some(mutation) = self.outbox.take_mutation(ticket) {
            match &result {
                Ok(_) => {
                    let cleared = self.cache.invalidate(mutation);
                    info!("{:?} succeeded, cleared {:?}", mutation, cleared);
                }
                Err(e) => warn!("{:?} failed: {}", mutation, e),
            }
        }

        match &result {
            Ok(Response::LeadCreated(lead)) => {
                self.pollers
                    .push(EnrichmentPoller::start(lead, &mut self.outbox));
                self.status = Some(format!("Lead created. Enriching {}...", lead.company));
            }
            Ok(Response::LeadDeleted(_)) => self.status = Some("Lead deleted".to_string()),
            _ => {}
        }

        if let Some(index) = self.pollers.iter().position(|p| p.pending() == ticket) {
            self.apply_poll(index, result);
            return;
        }

        let effect = self.with_view(|view, ctx| view.apply(ticket, &result, ctx));
        self.apply_effect(effect);
    }

    fn apply_poll(&mut self, index: usize, result: Result<Response, ApiError>) {
        let outcome = match &result {
            Ok(Response::Lead(lead)) => self.pollers[index].handle(Ok(lead), &mut self.outbox),
            Ok(_) => return,
            Err(e) => self.pollers[index].handle(Err(e), &mut self.outbox),
        };

        match outcome {
            PollOutcome::Waiting => {}
            PollOutcome::Enriched(lead) => {
                self.pollers.remove(index);
                self.cache.invalidate(Mutation::EnrichLead);
                match &mut self.view {
                    ActiveView::Leads(view) => view.update_lead(&lead),
                    ActiveView::LeadDetail(view) => view.update_lead(&lead),
                    _ => {}
                }
                self.status = Some(format!("{} enriched (score {})", lead.company, lead.score));
            }
            PollOutcome::GaveUp => {
                self.pollers.remove(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::cache::{CachedResource, ManualClock, MemoryStorage, Storage};
    use crate::data::{DashboardData, Lead};
    use crate::dispatch::{Request, Ticket};
    use crate::resource::Status;

    const START_MILLIS: i64 = 1_700_000_000_000;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(initial: Screen) -> (App, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START_MILLIS));
        let cache = CacheManager::new(Arc::new(MemoryStorage::new()), clock.clone());
        (app_with_cache(cache, initial), clock)
    }

    fn app_with_cache(cache: CacheManager, initial: Screen) -> App {
        let store = SettingsStore::new(Arc::new(MemoryStorage::new()));
        App::new(cache, store, initial)
    }

    fn lead(id: &str, updated_at: &str) -> Lead {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "company": "Acme Corporation",
            "contact": "John Smith",
            "email": "john@acme.com",
            "stage": "new",
            "score": 0,
            "updated_at": updated_at
        }))
        .unwrap()
    }

    /// Takes the only queued request, panicking if there is not exactly one
    fn single_request(app: &mut App) -> (Ticket, Request) {
        let (mut queued, _) = app.outbox.drain();
        assert_eq!(queued.len(), 1, "expected one request, got {:?}", queued);
        let outgoing = queued.remove(0);
        (outgoing.ticket, outgoing.request)
    }

    fn seed_dashboard(app: &App, total_leads: u64) {
        app.cache
            .set(
                "dashboard_data",
                &serde_json::json!({"metrics": {"total_leads": total_leads}}),
            )
            .unwrap();
    }

    fn dashboard_total(app: &App) -> Option<u64> {
        match &app.view {
            ActiveView::Dashboard(view) => view.data.data.as_ref().map(|d| d.metrics.total_leads),
            _ => None,
        }
    }

    #[test]
    fn test_cached_dashboard_renders_without_loading() {
        let clock = Arc::new(ManualClock::new(START_MILLIS));
        let cache = CacheManager::new(Arc::new(MemoryStorage::new()), clock);
        cache
            .set("dashboard_data", &serde_json::json!({"metrics": {"total_leads": 5}}))
            .unwrap();

        let mut app = app_with_cache(cache, Screen::Dashboard);

        assert_eq!(dashboard_total(&app), Some(5));
        match &app.view {
            ActiveView::Dashboard(view) => assert_eq!(view.data.status, Status::Ready),
            _ => panic!("dashboard not mounted"),
        }
        assert!(app.outbox.drain().0.is_empty());
    }

    #[test]
    fn test_expired_dashboard_reloads_on_mount() {
        let (mut app, clock) = test_app(Screen::Leads);
        let _ = app.outbox.drain();
        seed_dashboard(&app, 5);
        clock.advance(Duration::from_secs(61));

        app.handle_key(key_event(KeyCode::Char('1')));

        assert_eq!(app.screen(), Screen::Dashboard);
        match &app.view {
            ActiveView::Dashboard(view) => assert!(view.data.is_loading()),
            _ => panic!("dashboard not mounted"),
        }
        assert_eq!(single_request(&mut app).1, Request::Dashboard);
    }

    #[test]
    fn test_successful_delete_invalidates_dashboard() {
        let (mut app, _) = test_app(Screen::Leads);
        let _ = app.outbox.drain();
        seed_dashboard(&app, 5);
        app.navigate(Screen::LeadDetail, Some("1".to_string()));
        let _ = app.outbox.drain();

        app.handle_key(key_event(KeyCode::Char('d')));
        app.handle_key(key_event(KeyCode::Char('y')));
        let (ticket, request) = single_request(&mut app);
        assert_eq!(request, Request::DeleteLead("1".to_string()));

        app.apply(Completion {
            ticket,
            result: Ok(Response::LeadDeleted("1".to_string())),
        });

        assert!(app.cache.storage().get_item("dashboard_data").unwrap().is_none());
        assert_eq!(app.screen(), Screen::Leads);
        assert_eq!(app.status.as_deref(), Some("Lead deleted"));
    }

    #[test]
    fn test_failed_mutation_keeps_cache() {
        let (mut app, _) = test_app(Screen::Leads);
        let _ = app.outbox.drain();
        seed_dashboard(&app, 5);
        app.navigate(Screen::LeadDetail, Some("1".to_string()));
        let _ = app.outbox.drain();
        app.handle_key(key_event(KeyCode::Char('d')));
        app.handle_key(key_event(KeyCode::Char('y')));
        let (ticket, _) = single_request(&mut app);

        app.apply(Completion {
            ticket,
            result: Err(ApiError::Status {
                status: 500,
                detail: None,
            }),
        });

        let cached: Option<DashboardData> = app.cache.get_resource(CachedResource::Dashboard);
        assert_eq!(cached.unwrap().metrics.total_leads, 5);
        assert_eq!(app.screen(), Screen::LeadDetail);
        assert!(app.alert.is_some());
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let (mut app, _) = test_app(Screen::Dashboard);
        let (first, _) = single_request(&mut app);
        app.handle_key(key_event(KeyCode::Char('r')));
        let (second, _) = single_request(&mut app);

        app.apply(Completion {
            ticket: first,
            result: Ok(Response::Dashboard(DashboardData::default())),
        });
        match &app.view {
            ActiveView::Dashboard(view) => assert_eq!(view.data.pending(), Some(second)),
            _ => panic!("dashboard not mounted"),
        }
        assert!(app.cache.get_default::<DashboardData>("dashboard_data").is_none());
    }

    #[test]
    fn test_completion_for_unmounted_view_is_dropped() {
        let (mut app, _) = test_app(Screen::Dashboard);
        let (ticket, _) = single_request(&mut app);
        app.handle_key(key_event(KeyCode::Char('2')));

        app.apply(Completion {
            ticket,
            result: Ok(Response::Dashboard(DashboardData::default())),
        });

        assert_eq!(app.screen(), Screen::Leads);
        assert!(app.cache.storage().keys().unwrap().is_empty());
    }

    #[test]
    fn test_leaving_evaluation_cancels_it() {
        let (mut app, _) = test_app(Screen::Evaluation);
        let (ticket, request) = single_request(&mut app);
        assert_eq!(request, Request::Evaluate);

        app.handle_key(key_event(KeyCode::Char('1')));

        let (_, cancelled) = app.outbox.drain();
        assert_eq!(cancelled, vec![ticket]);
    }

    #[test]
    fn test_created_lead_starts_enrichment_polling() {
        let (mut app, _) = test_app(Screen::Leads);
        let _ = app.outbox.drain();
        seed_dashboard(&app, 5);
        app.handle_key(key_event(KeyCode::Char('a')));
        assert_eq!(app.screen(), Screen::AddLead);
        for (field, text) in [(0, "Acme"), (5, "Jane"), (6, "Doe"), (8, "jane@acme.com")] {
            if let ActiveView::AddLead(view) = &mut app.view {
                view.focus = field;
            }
            for c in text.chars() {
                app.handle_key(key_event(KeyCode::Char(c)));
            }
        }
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        let (ticket, request) = single_request(&mut app);
        assert!(matches!(request, Request::CreateLead(_)));

        app.apply(Completion {
            ticket,
            result: Ok(Response::LeadCreated(lead("9", "t0"))),
        });

        assert!(app.cache.storage().get_item("dashboard_data").unwrap().is_none());
        assert_eq!(app.screen(), Screen::Leads);
        assert_eq!(app.pollers.len(), 1);

        let (queued, _) = app.outbox.drain();
        let poll = queued
            .iter()
            .find(|o| o.request == Request::Lead("9".to_string()))
            .expect("poll scheduled");
        assert_eq!(poll.delay, Some(Duration::from_secs(1)));

        seed_dashboard(&app, 6);
        let mut enriched = lead("9", "t1");
        enriched.score = 88;
        app.apply(Completion {
            ticket: poll.ticket,
            result: Ok(Response::Lead(enriched)),
        });

        assert!(app.pollers.is_empty());
        assert!(app.cache.storage().get_item("dashboard_data").unwrap().is_none());
        assert_eq!(
            app.status.as_deref(),
            Some("Acme Corporation enriched (score 88)")
        );
    }

    #[test]
    fn test_validation_alert_is_modal() {
        let (mut app, _) = test_app(Screen::AddLead);

        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(
            app.alert.as_deref(),
            Some("Please fill in all required fields (*)")
        );

        app.handle_key(key_event(KeyCode::Char('x')));
        assert!(app.alert.is_some());
        app.handle_key(key_event(KeyCode::Enter));
        assert!(app.alert.is_none());
        assert!(app.outbox.drain().0.is_empty());
    }

    #[test]
    fn test_number_keys_switch_sidebar_views() {
        let (mut app, _) = test_app(Screen::Dashboard);

        app.handle_key(key_event(KeyCode::Char('3')));
        assert_eq!(app.screen(), Screen::Evaluation);
        app.handle_key(key_event(KeyCode::Char('5')));
        assert_eq!(app.screen(), Screen::Settings);
        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.screen(), Screen::Dashboard);
        app.handle_key(key_event(KeyCode::BackTab));
        assert_eq!(app.screen(), Screen::Settings);
    }

    #[test]
    fn test_typing_in_form_does_not_trigger_shortcuts() {
        let (mut app, _) = test_app(Screen::AddLead);

        app.handle_key(key_event(KeyCode::Char('q')));
        app.handle_key(key_event(KeyCode::Char('2')));

        assert!(!app.should_quit);
        assert_eq!(app.screen(), Screen::AddLead);
        match &app.view {
            ActiveView::AddLead(view) => assert_eq!(view.form.company, "q2"),
            _ => panic!("form not mounted"),
        }
    }

    #[test]
    fn test_help_overlay_toggle() {
        let (mut app, _) = test_app(Screen::Dashboard);

        app.handle_key(key_event(KeyCode::Char('?')));
        assert!(app.show_help);
        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_while_typing() {
        let (mut app, _) = test_app(Screen::AddLead);

        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert!(app.should_quit);
    }

    #[test]
    fn test_lead_detail_selection_is_remembered() {
        let (mut app, _) = test_app(Screen::Leads);

        app.navigate(Screen::LeadDetail, Some("4".to_string()));
        app.handle_key(key_event(KeyCode::Char('m')));

        assert_eq!(app.selected_lead.as_deref(), Some("4"));
        assert_eq!(app.screen(), Screen::Messaging);
    }

    #[test]
    fn test_sidebar_messaging_preselects_remembered_lead() {
        let (mut app, _) = test_app(Screen::Leads);
        app.navigate(Screen::LeadDetail, Some("2".to_string()));
        app.navigate(Screen::Dashboard, None);
        let _ = app.outbox.drain();

        app.handle_key(key_event(KeyCode::Char('4')));
        let (ticket, request) = single_request(&mut app);
        assert_eq!(request, Request::Leads);
        app.apply(Completion {
            ticket,
            result: Ok(Response::Leads(vec![
                lead("1", "2025-01-01T10:00:00"),
                lead("2", "2025-01-01T10:00:00"),
            ])),
        });

        match &app.view {
            ActiveView::Messaging(view) => {
                assert_eq!(view.selected_lead().map(|l| l.id.as_str()), Some("2"))
            }
            _ => panic!("messaging not mounted"),
        }
    }
}
