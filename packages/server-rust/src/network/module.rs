//! Network module with deferred startup lifecycle.
//!
//! `new()` creates shared state, `start()` binds the TCP listener, and
//! `serve()` accepts connections until shutdown. Binding separately from
//! serving lets callers learn the OS-assigned port before traffic flows.

use std::future::Future;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use bookshelf_core::BookRepository;
use tokio::net::TcpListener;
use tracing::info;

use super::config::NetworkConfig;
use super::handlers::{
    create_book, delete_book, get_book, health_handler, index_handler, list_books,
    liveness_handler, readiness_handler, update_book, AppState,
};
use super::middleware::{build_http_layers, track_in_flight};
use super::shutdown::ShutdownController;

/// Assembles the axum router with every route and the middleware stack.
///
/// Routes:
/// - `GET /` -- usage page
/// - `GET|POST /books` -- list, create
/// - `GET|PUT|DELETE /books/{id}` -- read, update, delete
/// - `GET /health`, `/health/live`, `/health/ready` -- probes
pub fn build_router(state: AppState) -> Router {
    let layers = build_http_layers(&state.config);

    Router::new()
        .route("/", get(index_handler))
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            track_in_flight,
        ))
        .layer(layers)
        .with_state(state)
}

/// Owns the HTTP server lifecycle.
pub struct NetworkModule {
    state: AppState,
    listener: Option<TcpListener>,
}

impl NetworkModule {
    /// Creates the module around a store without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, store: Arc<dyn BookRepository>) -> Self {
        Self {
            state: AppState::new(store, config),
            listener: None,
        }
    }

    /// Shared shutdown controller, for probes or programmatic shutdown.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.state.shutdown)
    }

    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Binds the listener and returns the actual port (differs from the
    /// configured one when port 0 is used).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let config = &self.state.config;
        let listener = TcpListener::bind(config.bind_addr()).await?;
        let port = listener.local_addr()?.port();

        info!("Server running on http://{}:{}", config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves until `shutdown` resolves or the controller begins draining.
    ///
    /// Health turns `Draining` as soon as the stop is requested. Open
    /// requests then get up to the configured drain timeout to finish; after
    /// that the server task is aborted and `serve` returns anyway.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called or the server hits a
    /// fatal I/O error.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let Some(listener) = self.listener else {
            anyhow::bail!("start() must be called before serve()");
        };
        let controller = Arc::clone(&self.state.shutdown);
        let drain_timeout = self.state.config.drain_timeout;
        let router = build_router(self.state);

        let signal = {
            let controller = Arc::clone(&controller);
            async move {
                tokio::select! {
                    () = shutdown => {}
                    () = controller.stop_requested() => {}
                }
                controller.begin_draining();
            }
        };

        controller.set_ready();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(signal)
                .await
        });

        tokio::select! {
            joined = &mut server => {
                controller.mark_stopped();
                joined??;
                return Ok(());
            }
            () = controller.stop_requested() => {}
        }

        match controller.drain(&mut server, drain_timeout).await {
            Some(joined) => {
                joined??;
                info!("All in-flight requests drained");
            }
            None => server.abort(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bookshelf_core::{IdAssignment, InMemoryBookStore};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    use super::*;
    use crate::network::HealthState;

    fn module(port: u16) -> NetworkModule {
        let config = NetworkConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..NetworkConfig::default()
        };
        NetworkModule::new(
            config,
            Arc::new(InMemoryBookStore::seeded(IdAssignment::LastPlusOne)),
        )
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached within 2s");
    }

    #[test]
    fn new_does_not_bind() {
        assert!(module(0).listener.is_none());
    }

    #[test]
    fn shutdown_controller_is_shared() {
        let module = module(0);
        assert!(Arc::ptr_eq(
            &module.shutdown_controller(),
            &module.shutdown_controller()
        ));
    }

    #[test]
    fn router_builds() {
        let _router = module(0).router();
    }

    #[tokio::test]
    async fn start_binds_os_assigned_port() {
        let mut module = module(0);
        let port = module.start().await.unwrap();
        assert!(port > 0);
        assert!(module.listener.is_some());
    }

    #[tokio::test]
    async fn serve_without_start_errors() {
        let err = module(0)
            .serve(std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("start() must be called"));
    }

    #[tokio::test]
    async fn serve_stops_when_controller_triggers() {
        let mut module = module(0);
        module.start().await.unwrap();
        let controller = module.shutdown_controller();

        let server = tokio::spawn(module.serve(std::future::pending::<()>()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(controller.health_state(), HealthState::Ready);

        controller.begin_draining();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(controller.health_state(), HealthState::Stopped);
    }

    #[tokio::test]
    async fn held_request_is_cut_off_after_drain_timeout() {
        let config = NetworkConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            drain_timeout: Duration::from_millis(100),
            request_timeout: Duration::from_secs(30),
            ..NetworkConfig::default()
        };
        let mut module = NetworkModule::new(
            config,
            Arc::new(InMemoryBookStore::seeded(IdAssignment::LastPlusOne)),
        );
        let port = module.start().await.unwrap();
        let controller = module.shutdown_controller();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(module.serve(async move {
            let _ = stop_rx.await;
        }));

        // Headers promise 64 body bytes; only a few are ever sent.
        let mut client = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        client
            .write_all(
                b"POST /books HTTP/1.1\r\n\
                  Host: localhost\r\n\
                  Content-Type: application/json\r\n\
                  Content-Length: 64\r\n\r\n\
                  {\"title\":",
            )
            .await
            .unwrap();

        wait_until(|| controller.in_flight_count() == 1).await;
        assert_eq!(controller.health_state(), HealthState::Ready);

        stop_tx.send(()).unwrap();
        wait_until(|| controller.health_state() != HealthState::Ready).await;
        assert_eq!(controller.health_state(), HealthState::Draining);

        tokio::time::timeout(Duration::from_secs(2), server)
            .await
            .expect("serve must return once the drain timeout expires")
            .unwrap()
            .unwrap();
        assert_eq!(controller.health_state(), HealthState::Stopped);
        drop(client);
    }
}
