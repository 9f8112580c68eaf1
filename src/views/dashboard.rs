//! Dashboard: headline metrics, pipeline and recent activity

use crossterm::event::{KeyCode, KeyEvent};
use log::warn;

use crate::cache::CachedResource;
use crate::data::{Activity, ApiError, DashboardData};
use crate::dispatch::{Request, Response, Ticket};
use crate::resource::Resource;

use super::{Effect, ViewContext};

#[derive(Debug)]
pub struct DashboardView {
    pub data: Resource<DashboardData>,
    /// Full activity feed, shown instead of recent activity while open. Never cached.
    pub feed: Option<Resource<Vec<Activity>>>,
}

impl DashboardView {
    /// Shows cached data immediately, fetching only on a miss
    pub fn mount(ctx: &mut ViewContext) -> Self {
        let mut view = Self {
            data: Resource::from_cache(ctx.cache.get_resource(CachedResource::Dashboard)),
            feed: None,
        };
        if view.data.data.is_none() {
            view.refresh(ctx);
        }
        view
    }

    fn refresh(&mut self, ctx: &mut ViewContext) {
        let ticket = ctx.outbox.send(Request::Dashboard);
        self.data.begin(ticket);
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> Option<Effect> {
        match key.code {
            KeyCode::Char('r') => self.refresh(ctx),
            KeyCode::Char('f') => {
                self.feed = match self.feed.take() {
                    Some(_) => None,
                    None => {
                        let mut feed = Resource::new();
                        feed.begin(ctx.outbox.send(Request::Activities));
                        Some(feed)
                    }
                };
            }
            KeyCode::Esc if self.feed.is_some() => self.feed = None,
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
        if self.data.awaits(ticket) {
            match result {
                Ok(Response::Dashboard(data)) => {
                    // A fetch started before an enrichment invalidation can land after it.
                    // Last write wins; the entry expires with the dashboard TTL.
                    if let Err(e) = ctx.cache.set_resource(CachedResource::Dashboard, data) {
                        warn!("Dashboard not cached: {}", e);
                    }
                    self.data.resolve(ticket, data.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    self.data.fail(ticket, e.user_message());
                }
            }
        } else if let Some(feed) = self.feed.as_mut().filter(|feed| feed.awaits(ticket)) {
            match result {
                Ok(Response::Activities(activities)) => {
                    feed.resolve(ticket, activities.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    feed.fail(ticket, e.user_message());
                }
            }
        }
        None
    }

    /// Activities to list: the full feed when open, otherwise the dashboard's recent ones
    pub fn activities(&self) -> &[Activity] {
        match &self.feed {
            Some(feed) => feed.data.as_deref().unwrap_or(&[]),
            None => self
                .data
                .data
                .as_ref()
                .map(|d| d.recent_activities.as_slice())
                .unwrap_or(&[]),
        }
    }
}
