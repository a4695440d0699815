//! The bus endpoint.
//!
//! One URL, dispatched on method and fields the way the browser client
//! expects:
//!
//! * `GET ?dump` returns every stored record, `GET ?clear` wipes the log;
//! * `POST m=..&u=..` appends a message;
//! * `POST t=..` long-polls for messages after token `t`.

use crate::config::AppState;
use crate::error::{Error, Result};
use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use pollbus_core::{Cursor, WireMessage};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// Form fields accepted by `POST /chat`.
#[derive(Debug, Default, Deserialize)]
pub struct BusForm {
    /// Message text
    pub m: Option<String>,
    /// Author
    pub u: Option<String>,
    /// Last token seen by the poller
    pub t: Option<String>,
}

/// GET /chat
pub async fn get_bus(
    State(state): State<AppState>,
    Query(flags): Query<HashMap<String, String>>,
) -> Result<Response> {
    if flags.contains_key("dump") {
        let messages = state.log.snapshot().await?;
        info!("GET /chat?dump ({} messages)", messages.len());

        let body = serde_json::to_string_pretty(&messages)?;
        return Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response());
    }

    if flags.contains_key("clear") {
        info!("GET /chat?clear");
        state.log.clear().await?;
        return Ok(StatusCode::OK.into_response());
    }

    // Nothing to dispatch.
    Ok(StatusCode::OK.into_response())
}

/// POST /chat
pub async fn post_bus(
    State(state): State<AppState>,
    form: std::result::Result<Form<BusForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form.map_err(|rejection| Error::BadRequest(rejection.body_text()))?;

    match form {
        BusForm {
            m: Some(text),
            u: Some(author),
            ..
        } => {
            let message = state.log.append(text, author).await?;
            debug!("POST /chat appended {}", message.id);
            Ok(StatusCode::OK.into_response())
        }
        BusForm { t: Some(token), .. } => {
            let cursor = Cursor::parse(&token)?;
            debug!("POST /chat polling after {:?}", cursor.id());

            let messages = state.coordinator.poll(cursor).await?;
            let wire: Vec<WireMessage> = messages.into_iter().map(WireMessage::from).collect();
            Ok(Json(wire).into_response())
        }
        _ => Err(Error::BadRequest(
            "expected fields m and u to post, or t to poll".to_string(),
        )),
    }
}
