pub mod html;

use crate::intake::{self, FormInput, Submission, SubmissionError};
use crate::sink::Sink;
use crate::types::scoring::Assessment;
use axum::{
    extract::State,
    response::Html,
    routing::get,
    Form, Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared by every request. The sink is built once at start-up.
pub struct AppState {
    pub sink: Arc<dyn Sink>,
    pub contact_required: bool,
}

#[derive(Debug)]
pub enum Outcome {
    Rejected(SubmissionError),
    Scored {
        assessment: Assessment,
        saved: Result<(), String>,
    },
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .route("/healthz", get(healthz))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, sink = state.sink.name(), "diagnostic form listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await
}

async fn show_form(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(html::form_page(
        &FormInput::default(),
        None,
        state.contact_required,
    ))
}

async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(input): Form<FormInput>,
) -> Html<String> {
    let page = match handle_submission(&state, &input).await {
        Outcome::Rejected(err) => html::form_page(
            &input,
            Some(&html::rejection_message(&err)),
            state.contact_required,
        ),
        Outcome::Scored { assessment, saved } => {
            html::result_page(&assessment, saved.as_ref().map(|_| ()).map_err(String::as_str))
        }
    };
    Html(page)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "status": "ok", "sink": state.sink.name() }))
}

/// Validates, scores and records one submission. A storage failure still
/// yields the computed result.
pub async fn handle_submission(state: &AppState, input: &FormInput) -> Outcome {
    let submission = match Submission::from_form(input, state.contact_required, intake::now_local())
    {
        Ok(submission) => submission,
        Err(err) => {
            tracing::info!(error = %err, "submission rejected");
            return Outcome::Rejected(err);
        }
    };

    let assessment = submission.assessment.clone();
    let sink = Arc::clone(&state.sink);
    let saved = tokio::task::spawn_blocking(move || intake::record(sink.as_ref(), &submission))
        .await
        .map_err(|e| format!("storage task failed: {e}"))
        .and_then(|result| result.map_err(|e| e.to_string()));

    Outcome::Scored { assessment, saved }
}
