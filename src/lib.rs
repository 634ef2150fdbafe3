//! Pinterest Affiliate Automation Client
//!
//! Client-side session and job-polling layer for the remote service that
//! posts Amazon affiliate products to Pinterest. All product discovery and
//! pin creation happens on the backend; this crate owns the session store,
//! the authenticated HTTP transport, the typed API, and the dashboard poller.

pub mod app_state;
pub mod config;
pub mod dashboard;
pub mod forms;
pub mod models;
pub mod services;
