use crate::sms::MessageSid;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SuccessfulResponse<T> {
    pub success: bool,
    pub response: T,
}

#[derive(Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    #[cfg_attr(feature = "openapi", schema(default = false))]
    pub success: bool,
    pub error: String,
}

pub struct HttpSuccess<T>(pub T);
impl<T: Serialize> IntoResponse for HttpSuccess<T> {
    fn into_response(self) -> Response {
        Json(SuccessfulResponse {
            success: true,
            response: self.0,
        })
        .into_response()
    }
}

#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}
impl HttpError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Generic failure that never carries upstream detail back to the caller.
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_string(),
        }
    }
}
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub type HttpResult<T> = Result<HttpSuccess<T>, HttpError>;

/// Form fields posted by the SMS provider for an inbound message.
/// Anything else the provider includes (MessageSid, AccountSid, To...) is ignored.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InboundSmsForm {
    #[serde(rename = "From")]
    #[cfg_attr(feature = "openapi", schema(example = "+15551234567"))]
    pub from: String,

    #[serde(rename = "Body")]
    #[cfg_attr(feature = "openapi", schema(example = "What is the square root of 49?"))]
    pub body: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SmsReplyResponse {
    #[serde(rename = "Sid")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "SM0123456789abcdef0123456789abcdef"))]
    pub sid: MessageSid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_form_ignores_extra_fields() {
        let form: InboundSmsForm = parse_form(
            "ToCountry=US&MessageSid=SM1&From=%2B15551234567&Body=Why+is+the+sky+blue%3F&NumMedia=0",
        );
        assert_eq!(form.from, "+15551234567");
        assert_eq!(form.body, "Why is the sky blue?");
    }

    #[test]
    fn test_reply_response_shape() {
        let response = SmsReplyResponse {
            sid: MessageSid::new("SM42"),
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"Sid": "SM42"})
        );
    }

    fn parse_form(query: &str) -> InboundSmsForm {
        axum::extract::Query::<InboundSmsForm>::try_from_uri(
            &format!("http://localhost/sms?{query}").parse().unwrap(),
        )
        .unwrap()
        .0
    }
}
