use crate::config::{AppConfig, HTTPConfig};
use crate::http::create_app;
use crate::relay::Relay;
use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::log::{error, info};

#[cfg(feature = "sentry")]
pub type SentryGuard = Option<sentry::ClientInitGuard>;

#[cfg(not(feature = "sentry"))]
pub type SentryGuard = Option<()>;

pub struct AppHandles {
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    _sentry_guard: SentryGuard,
}
impl AppHandles {
    pub async fn new(config: AppConfig, _sentry_guard: SentryGuard) -> Result<AppHandles> {
        // Provider clients are built before serving so bad credentials never accept a request.
        let relay = Arc::new(Relay::from_config(&config)?);
        info!(
            "Replying from {} using completion deployment '{}'",
            config.sms.sender_number()?.masked(),
            config.completion.deployment
        );

        let http_handle =
            Self::start_http_server(config.http, relay, _sentry_guard.is_some()).await?;

        Ok(AppHandles {
            tasks: vec![("HTTP Server", http_handle)],
            _sentry_guard,
        })
    }

    pub async fn run(self) {
        let futures: Vec<_> = self
            .tasks
            .into_iter()
            .map(|(name, handle)| {
                info!("Starting task: {name}");
                Box::pin(async move {
                    match handle.await {
                        Ok(_) => error!("{name} task completed!"),
                        Err(e) => error!("{name} task failed: {e:?}!"),
                    }
                })
            })
            .collect();

        // Wait for any task to complete. All handles are boxed, so when dropped they are cancelled.
        let (_, _, remaining) = futures::future::select_all(futures).await;
        drop(remaining);
    }

    async fn start_http_server(
        config: HTTPConfig,
        relay: Arc<Relay>,
        sentry_enabled: bool,
    ) -> Result<JoinHandle<()>> {
        let address = config.address;
        let tls_config = config.tls.clone();
        let app = create_app(config, relay, sentry_enabled);

        let handle = match tls_config {
            Some(tls_config) => spawn_tls_server(address, &tls_config, app).await?,
            None => {
                info!("Starting HTTP (insecure) server on {address}");
                tokio::spawn(async move {
                    if let Err(e) = axum_server::bind(address)
                        .serve(app.into_make_service())
                        .await
                    {
                        error!("Server error: {e:?}");
                    }
                })
            }
        };

        Ok(handle)
    }
}

#[cfg(feature = "tls-rustls")]
async fn spawn_tls_server(
    address: std::net::SocketAddr,
    tls_config: &crate::config::TLSConfig,
    app: axum::Router,
) -> Result<JoinHandle<()>> {
    use anyhow::Context;

    let _ = rustls::crypto::CryptoProvider::install_default(
        rustls::crypto::aws_lc_rs::default_provider(),
    );
    let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(
        &tls_config.certificate_path,
        &tls_config.key_path,
    )
    .await
    .context("Failed to load rustls TLS certificates!")?;

    info!("Starting HTTPS (secure) server on {address}");
    Ok(tokio::spawn(async move {
        if let Err(e) = axum_server::bind_rustls(address, tls)
            .serve(app.into_make_service())
            .await
        {
            error!("Server error: {e:?}");
        }
    }))
}

#[cfg(all(feature = "tls-native", not(feature = "tls-rustls")))]
async fn spawn_tls_server(
    address: std::net::SocketAddr,
    tls_config: &crate::config::TLSConfig,
    app: axum::Router,
) -> Result<JoinHandle<()>> {
    use anyhow::Context;

    let tls = axum_server::tls_openssl::OpenSSLConfig::from_pem_file(
        &tls_config.certificate_path,
        &tls_config.key_path,
    )
    .context("Failed to load openssl TLS certificates!")?;

    info!("Starting HTTPS (secure) server on {address}");
    Ok(tokio::spawn(async move {
        if let Err(e) = axum_server::bind_openssl(address, tls)
            .serve(app.into_make_service())
            .await
        {
            error!("Server error: {e:?}");
        }
    }))
}
