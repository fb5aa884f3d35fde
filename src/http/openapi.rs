use crate::http::routes::*;
use crate::http::types::{ErrorResponse, InboundSmsForm, SmsReplyResponse};
use utoipa::openapi::{ContentBuilder, RefOr, Response};
use utoipa::Modify;

#[derive(utoipa::OpenApi)]
#[openapi(
    tags(
        (name = "SMS", description = "Inbound SMS webhook answered with a generated reply"),
        (name = "System", description = "Service information")
    ),
    paths(sms_webhook, sys_version),
    components(schemas(InboundSmsForm, SmsReplyResponse, ErrorResponse)),
    modifiers(&OpenApiModifier)
)]
pub struct ApiDoc;

struct OpenApiModifier;
impl Modify for OpenApiModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info = utoipa::openapi::InfoBuilder::new()
            .title("SMS Relay")
            .version(crate::VERSION)
            .description(Some(env!("CARGO_PKG_DESCRIPTION")))
            .license(Some(
                utoipa::openapi::LicenseBuilder::new()
                    .name(env!("CARGO_PKG_LICENSE"))
                    .url(Some(format!(
                        "https://spdx.org/licenses/{}.html",
                        env!("CARGO_PKG_LICENSE")
                    )))
                    .build(),
            ))
            .build();

        // Only the webhook can fail on input or upstream providers.
        let error_responses = [
            ("400", "Invalid sender phone number"),
            ("422", "Missing From or Body form field"),
            ("500", "Internal server error"),
        ];
        let Some(webhook) = openapi
            .paths
            .paths
            .get_mut("/sms")
            .and_then(|path_item| path_item.post.as_mut())
        else {
            return;
        };

        for (status, description) in error_responses {
            webhook
                .responses
                .responses
                .entry(status.to_string())
                .or_insert_with(|| {
                    let content = ContentBuilder::new()
                        .example(Some(serde_json::json!({
                            "success": false,
                            "error": description
                        })))
                        .build();

                    RefOr::T(
                        Response::builder()
                            .description(description)
                            .content("application/json", content)
                            .build(),
                    )
                });
        }
    }
}
