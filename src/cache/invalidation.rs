//! Cached resources and the mutations that make them stale
//!
//! Every backend write is described by a [`Mutation`]. The [`InvalidationGraph`]
//! declares which cached resources depend on the data each mutation changes, so
//! write paths call `CacheManager::invalidate(mutation)` instead of remembering
//! individual keys.

use std::collections::HashMap;

/// A backend response that views keep in the session cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachedResource {
    /// Aggregate metrics, pipeline and recent activity (`GET /dashboard`)
    Dashboard,
    /// Last model comparison run (`POST /evaluate`)
    ModelEvaluation,
}

impl CachedResource {
    /// Storage key for this resource
    pub fn key(self) -> &'static str {
        match self {
            CachedResource::Dashboard => "dashboard_data",
            CachedResource::ModelEvaluation => "model_evaluation_results",
        }
    }

    /// How long, in seconds, readers treat the entry as fresh
    pub fn ttl_secs(self) -> i64 {
        match self {
            CachedResource::Dashboard => 60,
            CachedResource::ModelEvaluation => 3600,
        }
    }
}

/// A successful write against the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    CreateLead,
    UpdateLead,
    DeleteLead,
    NotifyLeads,
    /// Background enrichment changed a lead's fields (score, industry, ...)
    EnrichLead,
}

/// Declared dependencies from mutations to the cached resources they invalidate
#[derive(Debug, Clone)]
pub struct InvalidationGraph {
    edges: HashMap<Mutation, Vec<CachedResource>>,
}

impl InvalidationGraph {
    /// A graph with no declared dependencies
    pub fn empty() -> Self {
        Self {
            edges: HashMap::new(),
        }
    }

    /// Declares that `mutation` makes `resource` stale
    pub fn declare(mut self, mutation: Mutation, resource: CachedResource) -> Self {
        let dependents = self.edges.entry(mutation).or_default();
        if !dependents.contains(&resource) {
            dependents.push(resource);
        }
        self
    }

    /// Resources invalidated by `mutation`
    pub fn dependents(&self, mutation: Mutation) -> &[CachedResource] {
        self.edges
            .get(&mutation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for InvalidationGraph {
    /// Lead writes change every dashboard aggregate: lead counts, the
    /// pipeline breakdown, messages sent and the recent activity feed.
    /// Evaluation results do not depend on lead data.
    fn default() -> Self {
        Self::empty()
            .declare(Mutation::CreateLead, CachedResource::Dashboard)
            .declare(Mutation::UpdateLead, CachedResource::Dashboard)
            .declare(Mutation::DeleteLead, CachedResource::Dashboard)
            .declare(Mutation::NotifyLeads, CachedResource::Dashboard)
            .declare(Mutation::EnrichLead, CachedResource::Dashboard)
    }
}
