//! Scoring weights and model preferences
//!
//! Edits a draft copy; nothing is persisted until the user saves.

use crossterm::event::{KeyCode, KeyEvent};

use crate::data::MODELS;
use crate::settings::Settings;

use super::{step_index, Effect, ViewContext};

const WEIGHT_STEP: i16 = 5;
const TOKEN_STEP: u32 = 100;
const MAX_TOKENS_LIMIT: u32 = 32_000;

/// A selectable row of the settings screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    Criterion(usize),
    Model,
    Temperature,
    MaxTokens,
    Stage(usize),
}

#[derive(Debug)]
pub struct SettingsView {
    pub draft: Settings,
    pub row: usize,
    pub dirty: bool,
}

impl SettingsView {
    pub fn mount(ctx: &mut ViewContext) -> Self {
        Self {
            draft: ctx.settings.clone(),
            row: 0,
            dirty: false,
        }
    }

    pub fn rows(&self) -> Vec<SettingsRow> {
        let mut rows: Vec<SettingsRow> = (0..self.draft.scoring.len())
            .map(SettingsRow::Criterion)
            .collect();
        rows.extend([
            SettingsRow::Model,
            SettingsRow::Temperature,
            SettingsRow::MaxTokens,
        ]);
        rows.extend((0..self.draft.stages.len()).map(SettingsRow::Stage));
        rows
    }

    pub fn current_row(&self) -> Option<SettingsRow> {
        self.rows().get(self.row).copied()
    }

    fn adjust(&mut self, forward: bool) {
        let Some(row) = self.current_row() else {
            return;
        };
        match row {
            SettingsRow::Criterion(i) => {
                let delta = if forward { WEIGHT_STEP } else { -WEIGHT_STEP };
                self.draft.adjust_weight(i, delta);
            }
            SettingsRow::Model => {
                let current = MODELS
                    .iter()
                    .position(|(id, _)| *id == self.draft.default_model)
                    .unwrap_or(0);
                let next = step_index(current, MODELS.len(), forward);
                self.draft.default_model = MODELS[next].0.to_string();
            }
            SettingsRow::Temperature => {
                self.draft.adjust_temperature(if forward { 0.1 } else { -0.1 });
            }
            SettingsRow::MaxTokens => {
                let tokens = if forward {
                    self.draft.max_tokens.saturating_add(TOKEN_STEP)
                } else {
                    self.draft.max_tokens.saturating_sub(TOKEN_STEP)
                };
                self.draft.max_tokens = tokens.clamp(TOKEN_STEP, MAX_TOKENS_LIMIT);
            }
            SettingsRow::Stage(_) => {
                self.toggle();
                return;
            }
        }
        self.dirty = true;
    }

    fn toggle(&mut self) {
        match self.current_row() {
            Some(SettingsRow::Criterion(i)) => {
                if let Some(c) = self.draft.scoring.get_mut(i) {
                    c.enabled = !c.enabled;
                    self.dirty = true;
                }
            }
            Some(SettingsRow::Stage(i)) => {
                if let Some(t) = self.draft.stages.get_mut(i) {
                    t.enabled = !t.enabled;
                    self.dirty = true;
                }
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> Option<Effect> {
        let rows = self.rows().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.row = step_index(self.row, rows, false),
            KeyCode::Down | KeyCode::Char('j') => self.row = step_index(self.row, rows, true),
            KeyCode::Left | KeyCode::Char('h') => self.adjust(false),
            KeyCode::Right | KeyCode::Char('l') => self.adjust(true),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle(),
            KeyCode::Char('s') => {
                return Some(match ctx.settings_store.save(&self.draft) {
                    Ok(()) => {
                        *ctx.settings = self.draft.clone();
                        self.dirty = false;
                        Effect::Status("Settings saved".to_string())
                    }
                    Err(e) => Effect::Alert(e.to_string()),
                });
            }
            KeyCode::Char('u') if self.dirty => {
                self.draft = ctx.settings.clone();
                self.dirty = false;
            }
            KeyCode::Char('x') => {
                return Some(match ctx.cache.clear(None) {
                    Ok(()) => Effect::Status("Session cache cleared".to_string()),
                    Err(e) => Effect::Alert(format!("Failed to clear cache: {}", e)),
                });
            }
            _ => {}
        }
        None
    }
}
