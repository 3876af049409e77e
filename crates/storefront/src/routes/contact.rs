//! Contact form route handler.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::error::Result;
use crate::services::ContactForm;
use crate::services::contact::ContactReceipt;
use crate::state::AppState;

/// Submit the contact form.
///
/// - 201 with a bilingual confirmation once the message is stored
/// - 422 with field-level messages when validation fails
/// - 409 while the sender's previous submission is still in flight
/// - 502 when the record store fails (not retried)
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<ContactReceipt>)> {
    let receipt = state.contact().submit(&form).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
