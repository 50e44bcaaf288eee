//! Home Page
//!
//! GET / serves a page with the current payload embedded and a script that
//! keeps it updated from `/ws`.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Html,
};
use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::render::PayloadKind;

const HOME_TEMPLATE: &str = "home";

const HOME_HTML: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>livepush</title>
</head>
<body>
<div id="payload" data-socket="ws://{{host}}/ws">{{#if markup}}{{{payload}}}{{else}}{{payload}}{{/if}}</div>
<script type="text/javascript">
(function() {
  var data = document.getElementById("payload");
  var markup = {{markup}};
  var conn = new WebSocket(data.dataset.socket);
  conn.onclose = function(evt) {
    data.textContent = "Connection closed";
  };
  conn.onmessage = function(evt) {
    if (markup) {
      data.innerHTML = evt.data;
    } else {
      data.textContent = evt.data;
    }
  };
})();
</script>
</body>
</html>
"#;

/// Values substituted into the home page
#[derive(Serialize)]
struct HomePage<'a> {
    host: &'a str,
    payload: &'a str,
    markup: bool,
}

/// Registry with the home page template compiled
pub fn page_templates() -> Result<Handlebars<'static>, TemplateError> {
    let mut templates = Handlebars::new();
    templates.set_strict_mode(true);
    templates.register_template_string(HOME_TEMPLATE, HOME_HTML)?;
    Ok(templates)
}

/// GET /
pub async fn home(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Html<String>> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    let payload = state.payload.render()?;
    let page = render_page(&state.templates, host, &payload, state.payload_kind)?;
    Ok(Html(page))
}

/// Fill the page template
///
/// Markup payloads are embedded as-is; text payloads and the host are
/// HTML-escaped. The socket URL sits in an attribute, never in script text.
pub fn render_page(
    templates: &Handlebars<'_>,
    host: &str,
    payload: &str,
    kind: PayloadKind,
) -> Result<String, RenderError> {
    templates.render(
        HOME_TEMPLATE,
        &HomePage {
            host,
            payload,
            markup: kind.is_markup(),
        },
    )
}

/// Non-GET requests to `/`
pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Any path without a route
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
