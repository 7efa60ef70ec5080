//! # Form Handlers
//!
//! The on-demand trigger. The caller names a directory; the run writes the
//! date-stamped report there and the confirmation echoes the full path.
//!
//! The run is spawned onto its own task and awaited, so it completes even when
//! the client disconnects before the reply is written.
//!
//! The directory is not checked here. A missing or unwritable directory shows
//! up as a render-stage failure in the run log, and the confirmation is still
//! returned once the run completes.

use axum::extract::State;
use axum::response::Html;
use axum::Form;
use serde::Deserialize;
use tracing::{error, info};

use crate::models::TriggerSource;
use crate::web::state::AppState;

const FORM_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Website Status Checker</title></head>
  <body>
    <h1>Website Status Checker</h1>
    <form action="/set-path" method="post">
      <label for="path">Enter Download Path:</label><br>
      <input type="text" id="path" name="path" placeholder="e.g., /path/to/download/"><br><br>
      <input type="submit" value="Set Path">
    </form>
  </body>
</html>
"#;

/// Urlencoded body of `POST /set-path`
#[derive(Debug, Clone, Deserialize)]
pub struct SetPathForm {
    /// Destination directory for the report
    pub path: String,
}

/// GET /
pub async fn show_form() -> Html<&'static str> {
    Html(FORM_PAGE)
}

/// POST /set-path
pub async fn set_path(
    State(state): State<AppState>,
    Form(form): Form<SetPathForm>,
) -> Html<String> {
    let output_path = state.paths.path_in(&form.path, state.clock.now());
    info!(
        directory = %form.path,
        output_path = %output_path.display(),
        "🌐 WEB: On-demand run requested"
    );

    // Own task: a caller hanging up must not cancel a run that has started.
    // The record is logged by the coordinator; the reply does not depend on it.
    let coordinator = state.coordinator.clone();
    let run_path = output_path.clone();
    let run = tokio::spawn(async move {
        coordinator
            .execute_run(TriggerSource::OnDemand, run_path)
            .await
    });
    if let Err(e) = run.await {
        error!(error = %e, "❌ WEB: On-demand run task ended abnormally");
    }

    Html(confirmation(&output_path.display().to_string()))
}

pub fn confirmation(path: &str) -> String {
    format!(
        "<h2>PDF generated and sent to email at: {}</h2>",
        escape_html(path)
    )
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
