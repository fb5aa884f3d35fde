use crate::http::types::{HttpError, HttpResult, HttpSuccess, InboundSmsForm, SmsReplyResponse};
use crate::http::HttpState;
use crate::sms::PhoneNumber;
use axum::extract::State;
use axum::{Form, Json};
use tracing::log::{debug, error, info};

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/sms",
    tag = "SMS",
    request_body(
        content = crate::http::types::InboundSmsForm,
        content_type = "application/x-www-form-urlencoded",
        description = "Inbound message webhook fields"
    ),
    responses(
        (status = 200, description = "Reply generated and accepted by the SMS provider", body = crate::http::types::SmsReplyResponse,
            example = json!({"Sid": "SM0123456789abcdef0123456789abcdef"}))
    )
))]
pub async fn sms_webhook(
    State(state): State<HttpState>,
    Form(payload): Form<InboundSmsForm>,
) -> Result<Json<SmsReplyResponse>, HttpError> {
    let from = payload
        .from
        .parse::<PhoneNumber>()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if state.config.international_format_only && !from.is_international() {
        return Err(HttpError::bad_request(
            "Sender phone number must be in international format!",
        ));
    }

    debug!("Received SMS from {}", from.masked());
    match state.relay.handle(&from, &payload.body).await {
        Ok(sid) => {
            info!("Replied to {} with message {sid}", from.masked());
            Ok(Json(SmsReplyResponse { sid }))
        }
        Err(e) => {
            error!("Failed to reply to {}: {e}", from.masked());

            #[cfg(feature = "sentry")]
            sentry_anyhow::capture_anyhow(e.source_error());

            Err(HttpError::internal())
        }
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/sys/version",
    tag = "System",
    responses(
        (status = 200, description = "Version retrieved successfully", body = crate::http::types::SuccessfulResponse<String>,
            example = json!({"success": true, "response": "1.0.0+otr"}))
    )
))]
pub async fn sys_version() -> HttpResult<String> {
    Ok(HttpSuccess(crate::VERSION.to_string()))
}
