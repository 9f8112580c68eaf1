//! Model comparison on the qualification dataset

use crossterm::event::{KeyCode, KeyEvent};
use log::{info, warn};

use crate::cache::CachedResource;
use crate::data::{ApiError, EvaluationReport};
use crate::dispatch::{Request, Response, Ticket};
use crate::resource::{Resource, Status};

use super::{Effect, ViewContext};

#[derive(Debug)]
pub struct EvaluationView {
    pub report: Resource<EvaluationReport>,
    pub scroll: u16,
}

impl EvaluationView {
    pub fn mount(ctx: &mut ViewContext) -> Self {
        let mut view = Self {
            report: Resource::from_cache(ctx.cache.get_resource(CachedResource::ModelEvaluation)),
            scroll: 0,
        };
        if view.report.data.is_none() {
            view.run(ctx);
        }
        view
    }

    fn run(&mut self, ctx: &mut ViewContext) {
        if let Some(previous) = self.report.pending() {
            ctx.outbox.cancel(previous);
        }
        self.report.begin(ctx.outbox.send(Request::Evaluate));
    }

    /// Aborts a running evaluation. The backend may still finish it.
    pub fn unmount(&mut self, ctx: &mut ViewContext) {
        if let Some(ticket) = self.report.pending() {
            info!("Cancelling evaluation #{}", ticket);
            ctx.outbox.cancel(ticket);
            self.report.status = match self.report.data {
                Some(_) => Status::Ready,
                None => Status::Empty,
            };
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> Option<Effect> {
        match key.code {
            KeyCode::Char('r') => self.run(ctx),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            _ => {}
        }
        None
    }

    pub fn apply(
        &mut self,
        ticket: Ticket,
        result: &Result<Response, ApiError>,
        ctx: &mut ViewContext,
    ) -> Option<Effect> {
        if !self.report.awaits(ticket) {
            return None;
        }
        match result {
            Ok(Response::Evaluation(report)) => {
                if let Err(e) = ctx.cache.set_resource(CachedResource::ModelEvaluation, report) {
                    warn!("Evaluation results not cached: {}", e);
                }
                self.report.resolve(ticket, report.clone());
            }
            Ok(_) => {}
            Err(e) => {
                self.report.fail(ticket, e.user_message());
            }
        }
        None
    }
}
