//! HTTP surface of the wizard: one route per transition, each rendering the
//! whole page for a fresh per-request `WizardState`.
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::charts::ScriptBackend;
use crate::error::WizardError;
use crate::page::render_page;
use crate::submit::Transport;
use crate::wizard::WizardState;

/// Name of the repeated checkbox field on the selection form.
pub const PARAMETER_FIELD: &str = "parameter";

#[derive(Clone)]
pub struct AppState {
    transport: Arc<Transport>,
    retain_values_on_failure: bool,
}

impl AppState {
    pub fn new(transport: Transport, retain_values_on_failure: bool) -> Self {
        AppState {
            transport: Arc::new(transport),
            retain_values_on_failure,
        }
    }

    fn wizard(&self) -> WizardState<ScriptBackend> {
        WizardState::new(ScriptBackend::default()).retain_values_on_failure(self.retain_values_on_failure)
    }
}

fn page(wizard: &WizardState<ScriptBackend>) -> Response {
    match render_page(wizard) {
        Ok(html) => Html(html).into_response(),
        Err(err) => render_failed(err),
    }
}

fn render_failed(err: WizardError) -> Response {
    error!(%err, "page rendering failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}

async fn index(State(app): State<AppState>) -> Response {
    page(&app.wizard())
}

async fn values(State(app): State<AppState>, Form(fields): Form<Vec<(String, String)>>) -> Response {
    let mut wizard = app.wizard();
    let checked = fields
        .into_iter()
        .filter(|(name, _)| name == PARAMETER_FIELD)
        .map(|(_, id)| id);
    // rejection is carried as the page alert
    let _ = wizard.advance(checked);
    page(&wizard)
}

async fn predict(State(app): State<AppState>, Form(fields): Form<Vec<(String, String)>>) -> Response {
    let mut wizard = app.wizard();
    // the value form holds exactly one input per selected parameter, in order
    let names: Vec<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
    if wizard.advance(names).is_ok() {
        match wizard.submit(app.transport.as_ref(), fields.iter().map(|(n, v)| (n, v))).await {
            Ok(()) => info!(selected = wizard.selected().len(), "prediction page rendered"),
            Err(err) => debug!(%err, "returning to value step"),
        }
    }
    page(&wizard)
}

async fn reset(State(app): State<AppState>) -> Response {
    let mut wizard = app.wizard();
    wizard.reset();
    page(&wizard)
}

async fn health() -> impl IntoResponse {
    "ok"
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/values", post(values))
        .route("/predict", post(predict))
        .route("/reset", post(reset))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
