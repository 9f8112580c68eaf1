//! Grok SDR Library
//!
//! Terminal dashboard for a sales-lead backend: lead pipeline, AI-drafted
//! outreach and model evaluation, with a session response cache in front of
//! the HTTP API. The binary wires these modules to a crossterm terminal.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod dispatch;
pub mod enrichment;
pub mod logging;
pub mod resource;
pub mod settings;
pub mod ui;
pub mod views;
