use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use wpmove_common::Result;

use crate::form::{Submission, parse_submission};
use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn show_form(State(state): State<SharedState>) -> Response {
    html_page(StatusCode::OK, state.pages.form())
}

async fn submit(
    State(state): State<SharedState>,
    form: std::result::Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    // A body that is not a form cannot carry `actz=move`.
    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(e) => {
            debug!("unreadable form body, showing the form: {e}");
            Vec::new()
        }
    };

    match parse_submission(&fields) {
        Ok(Submission::ShowForm) => html_page(StatusCode::OK, state.pages.form()),
        Ok(Submission::Move(request)) => {
            info!(
                "migration requested for database {} ({} -> {})",
                request.login().name,
                request.from_url(),
                request.to_url()
            );
            let report = state.migrator.run(&request).await;
            html_page(StatusCode::OK, state.pages.report(&report))
        }
        Err(e) => {
            warn!("rejected submission: {e}");
            html_page(StatusCode::BAD_REQUEST, state.pages.rejected(&e.to_string()))
        }
    }
}

fn html_page(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            warn!("failed to render page: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}
