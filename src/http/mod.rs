mod routes;
mod types;

#[cfg(feature = "openapi")]
mod openapi;

use crate::config::HTTPConfig;
use crate::http::routes::*;
use crate::relay::Relay;
use axum::http::{HeaderName, HeaderValue};
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

#[cfg(feature = "openapi")]
use utoipa::OpenApi;

#[cfg(any(feature = "openapi", feature = "sentry"))]
use tracing::log::debug;

#[cfg(feature = "sentry")]
use {
    sentry::integrations::tower::{NewSentryLayer, SentryHttpLayer},
    tower::ServiceBuilder,
};

#[derive(Clone)]
pub struct HttpState {
    pub relay: Arc<Relay>,
    pub config: HTTPConfig,
}

pub fn create_app(config: HTTPConfig, relay: Arc<Relay>, _sentry: bool) -> axum::Router {
    let mut router = axum::Router::new()
        .route("/sms", post(sms_webhook))
        .route("/sys/version", get(sys_version))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-version"),
            HeaderValue::from_static(crate::VERSION),
        ));

    #[cfg(feature = "openapi")]
    {
        debug!("Adding OpenAPI SwaggerUi at /docs!");
        router = router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs")
                .url("/docs/openapi.json", openapi::ApiDoc::openapi()),
        );
    }

    #[cfg(feature = "sentry")]
    if _sentry {
        debug!("Adding Sentry HTTP layer!");
        router = router
            .layer(
                ServiceBuilder::new()
                    .layer(NewSentryLayer::<axum::http::Request<axum::body::Body>>::new_from_top()),
            )
            .layer(ServiceBuilder::new().layer(SentryHttpLayer::new().enable_transaction()))
    }

    router.with_state(HttpState { relay, config })
}
