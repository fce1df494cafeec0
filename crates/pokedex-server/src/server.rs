//! HTTP server lifecycle.
//!
//! A server moves through four states:
//!
//! 1. **Binding**: resolve and bind the listen address in [`Server::bind`].
//!    Failure is fatal and never retried.
//! 2. **Serving**: accept connections, one task per connection, each holding
//!    a [`ConnectionToken`](crate::shutdown::ConnectionToken).
//! 3. **Draining**: stop accepting, close the listener, let in-flight
//!    requests finish. Bounded by the configured shutdown timeout.
//! 4. **Stopped**: terminal; a server is never restarted in place.
//!
//! Three events leave the serving state: the caller's [`ShutdownSignal`], an
//! OS signal (SIGTERM or SIGINT), or the serve loop failing on its own. The
//! first two start an orderly drain; the last surfaces the loop's error. The
//! drain itself is fenced by a safety timer of the shutdown timeout plus one
//! second, and blowing through that fence is the only way to see
//! [`ServerError::DrainTimeout`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::header::HeaderValue;
use http::{Request, StatusCode};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn, Instrument};

use pokedex_core::RequestContext;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handlers::PokedexApi;
use crate::response::{self, ERR_CODE_NOT_FOUND};
use crate::router::Route;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Response header carrying the request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The pokedex HTTP server.
///
/// Binding happens at construction, so a caller that gets a `Server` back
/// already holds the port; `run` can only fail while serving or draining.
pub struct Server {
    config: ServerConfig,
    api: PokedexApi,
    listener: TcpListener,
    local_addr: SocketAddr,
    on_shutdown: Option<Box<dyn FnOnce() + Send>>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Binds the configured address and prepares the server.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidAddr`] when the configured address does
    /// not parse and [`ServerError::Bind`] when the port cannot be bound.
    pub async fn bind(config: ServerConfig, api: PokedexApi) -> ServerResult<Self> {
        let addr: SocketAddr = config
            .socket_addr()
            .map_err(|e| ServerError::invalid_addr(config.http_addr(), e))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::bind(addr.to_string(), e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::bind(addr.to_string(), e))?;

        info!("listening on {local_addr}");

        Ok(Self {
            config,
            api,
            listener,
            local_addr,
            on_shutdown: None,
        })
    }

    /// Returns the bound address, with the real port when 0 was configured.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Registers a hook invoked once, when draining begins.
    #[must_use]
    pub fn on_shutdown(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_shutdown = Some(Box::new(hook));
        self
    }

    /// Runs until an OS signal triggers the drain.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`run_with_shutdown`](Self::run_with_shutdown).
    pub async fn run(self) -> ServerResult<()> {
        self.run_with_shutdown(ShutdownSignal::new()).await
    }

    /// Runs until `shutdown` fires, an OS signal arrives, or serving fails.
    ///
    /// A drain that merely overruns its budget still returns `Ok`: the
    /// remaining connections are cut and that is logged, not surfaced. Only
    /// a serve task that never comes to rest produces
    /// [`ServerError::DrainTimeout`].
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Accept`] when accepting fails,
    /// [`ServerError::Serve`] when the serve task panics, and
    /// [`ServerError::DrainTimeout`] when the drain safety timer fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> ServerResult<()> {
        let Self {
            config,
            api,
            listener,
            local_addr: _,
            on_shutdown,
        } = self;

        let shutdown_timeout = config.shutdown_timeout();
        let tracker = ConnectionTracker::new();
        let (drain_tx, drain_rx) = watch::channel(false);

        let api = Arc::new(api);
        let mut serve_task = tokio::spawn(serve_loop(
            listener,
            api,
            tracker.clone(),
            drain_rx,
            shutdown_timeout,
        ));

        let os_signals = ShutdownSignal::with_os_signals();

        tokio::select! {
            result = &mut serve_task => {
                // The loop stopped without being asked to; no drain needed.
                return finish_serve(result);
            }
            _ = shutdown.recv() => info!("shutdown requested, draining connections"),
            _ = os_signals.recv() => info!("os signal received, draining connections"),
        }

        let _ = drain_tx.send(true);
        if let Some(hook) = on_shutdown {
            hook();
        }
        info!(
            active = tracker.active_connections(),
            timeout = ?shutdown_timeout,
            "waiting for in-flight connections"
        );

        // The serve loop bounds its own drain wait by the shutdown timeout;
        // the extra second only catches it wedging outright.
        let deadline = shutdown_timeout.saturating_add(Duration::from_secs(1));
        match timeout(deadline, &mut serve_task).await {
            Ok(result) => {
                let outcome = finish_serve(result);
                if outcome.is_ok() {
                    info!("server stopped");
                }
                outcome
            }
            Err(_) => {
                serve_task.abort();
                Err(ServerError::drain_timeout(
                    deadline,
                    tracker.active_connections(),
                ))
            }
        }
    }
}

fn finish_serve(result: Result<ServerResult<()>, tokio::task::JoinError>) -> ServerResult<()> {
    match result {
        Ok(outcome) => outcome,
        Err(join_error) => Err(ServerError::serve(join_error.to_string())),
    }
}

/// Accepts connections until an accept error or a drain request.
async fn serve_loop(
    listener: TcpListener,
    api: Arc<PokedexApi>,
    tracker: ConnectionTracker,
    mut drain: watch::Receiver<bool>,
    shutdown_timeout: Duration,
) -> ServerResult<()> {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, remote_addr) = accepted.map_err(ServerError::accept)?;
                let api = Arc::clone(&api);
                let token = tracker.acquire();
                let conn_drain = drain.clone();

                tokio::spawn(async move {
                    if let Err(error) = handle_connection(stream, remote_addr, api, conn_drain).await {
                        debug!(peer = %remote_addr, %error, "connection closed with error");
                    }
                    drop(token);
                });
            }
            _ = drain.changed() => break,
        }
    }

    // Refuse new connections while in-flight ones finish.
    drop(listener);

    tokio::select! {
        () = tracker.wait_for_idle() => info!("all connections closed"),
        () = tokio::time::sleep(shutdown_timeout) => {
            warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }
    }

    Ok(())
}

/// Serves one connection, honoring drain requests.
///
/// When a drain arrives mid-connection, hyper is told to finish the
/// in-flight exchange and then close, instead of having the stream cut
/// under it.
async fn handle_connection(
    stream: TcpStream,
    remote_addr: SocketAddr,
    api: Arc<PokedexApi>,
    mut drain: watch::Receiver<bool>,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req: Request<Incoming>| {
        let api = Arc::clone(&api);
        async move { handle_request(req, &api, remote_addr).await }
    });

    let conn = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(conn);

    // A drain may have been requested between accept and here.
    if !*drain.borrow_and_update() {
        tokio::select! {
            result = conn.as_mut() => return result,
            _ = drain.changed() => {}
        }
    }

    conn.as_mut().graceful_shutdown();
    conn.await
}

/// Handles one request: correlate, route, dispatch, tag the response.
async fn handle_request(
    req: Request<Incoming>,
    api: &PokedexApi,
    remote_addr: SocketAddr,
) -> Result<response::HttpResponse, Infallible> {
    let ctx = RequestContext::new();
    let request_id = ctx.request_id();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        peer = %remote_addr,
    );

    async move {
        let mut http_response = match Route::match_request(&method, &path) {
            Some(route) => api.dispatch(&ctx, route).await,
            None => {
                debug!("no route matched");
                response::json_error(
                    StatusCode::NOT_FOUND,
                    request_id,
                    ERR_CODE_NOT_FOUND,
                    "resource not found",
                )
            }
        };

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            http_response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        info!(
            status = %http_response.status(),
            duration_ms = %ctx.elapsed().as_millis(),
            "request completed"
        );

        Ok(http_response)
    }
    .instrument(span)
    .await
}
