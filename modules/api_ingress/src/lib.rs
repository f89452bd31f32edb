//! HTTP host for the Church App: owns the middleware stack, the
//! service-level routes (`/`, `/health`, docs) and the server loop.
//! Domain modules contribute their own routers, which are merged in before
//! the middleware is applied.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware::from_fn, routing::get, Extension, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod error;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use error::IngressError;

#[derive(Debug, Clone, Default)]
pub struct ApiIngress {
    config: ApiIngressConfig,
    openapi: Option<Arc<utoipa::openapi::OpenApi>>,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            openapi: None,
        }
    }

    /// Document served at `/openapi.json` when docs are enabled.
    pub fn with_openapi(mut self, doc: utoipa::openapi::OpenApi) -> Self {
        self.openapi = Some(Arc::new(doc));
        self
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Merge `api` with the host routes and wrap everything in the middleware stack.
    pub fn build_router(&self, api: Router) -> Router {
        let mut router = Router::new()
            .route("/", get(web::root))
            .route("/health", get(web::health_check))
            .merge(api);

        if self.config.enable_docs {
            if let Some(doc) = &self.openapi {
                router = router
                    .route("/openapi.json", get(web::openapi_json))
                    .route("/docs", get(web::serve_docs))
                    .layer(Extension(doc.clone()));
                tracing::debug!("API docs enabled at /docs");
            } else {
                tracing::warn!("enable_docs is set but no OpenAPI document was provided");
            }
        }

        let mut router = router.fallback(web::not_found);

        // Layers run outermost-last: the request id is set before tracing sees
        // the request and propagated onto the response afterwards.
        let x_request_id = request_id::header();
        router = router
            .layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_sec.max(1),
            )));
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer())
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                request_id::MakeReqId,
            ))
            .layer(PropagateRequestIdLayer::new(x_request_id))
    }

    /// Resolve the listen address: the module's own `bind_addr`, else `host:port`.
    pub fn bind_addr(&self, host: &str, port: u16) -> Result<SocketAddr, IngressError> {
        let raw = self
            .config
            .bind_addr
            .clone()
            .unwrap_or_else(|| format!("{host}:{port}"));
        raw.parse().map_err(|e: std::net::AddrParseError| IngressError::InvalidBindAddr {
            addr: raw.clone(),
            reason: e.to_string(),
        })
    }

    /// Bind `addr` and serve `router` until `shutdown` resolves.
    pub async fn serve<F>(
        &self,
        addr: SocketAddr,
        router: Router,
        shutdown: F,
    ) -> Result<(), IngressError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| IngressError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        serve_listener(listener, router, shutdown).await
    }
}

/// Serve on an already bound listener with graceful shutdown.
pub async fn serve_listener<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
) -> Result<(), IngressError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(local) = listener.local_addr() {
        tracing::info!("HTTP server bound on {}", local);
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(IngressError::Serve)?;
    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl+C (and SIGTERM on Unix).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, stopping HTTP server gracefully");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_prefers_module_setting() {
        let ingress = ApiIngress::new(ApiIngressConfig {
            bind_addr: Some("0.0.0.0:9001".into()),
            ..Default::default()
        });
        assert_eq!(ingress.bind_addr("127.0.0.1", 8000).unwrap().port(), 9001);

        let ingress = ApiIngress::default();
        let addr = ingress.bind_addr("127.0.0.1", 8000).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8000");
    }

    #[test]
    fn debug_output_covers_the_openapi_document() {
        let doc = utoipa::openapi::OpenApiBuilder::new()
            .info(utoipa::openapi::Info::new("Church App API", "0.1.0"))
            .build();
        let ingress = ApiIngress::default().with_openapi(doc);
        let out = format!("{ingress:?}");
        assert!(out.contains("ApiIngress"));
        assert!(out.contains("Church App API"));
    }

    #[test]
    fn bad_bind_addr_is_reported() {
        let err = ApiIngress::default()
            .bind_addr("not a host", 1)
            .unwrap_err();
        assert!(matches!(err, IngressError::InvalidBindAddr { .. }));
    }
}
