//! invoicing-service: validated invoice mutations and credential login for the dashboard.

pub mod actions;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod schema;
pub mod services;
pub mod startup;

use actions::InvoiceActions;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub actions: InvoiceActions,
}

impl AppState {
    pub fn new(actions: InvoiceActions) -> Self {
        Self { actions }
    }
}
