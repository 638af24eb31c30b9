/*!
 * HTTP server exposing the aligner.
 *
 * Each accepted connection runs in its own task and carries exactly one
 * request. All tasks share the same immutable [`AlignService`].
 */

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::api::{self, ErrorBody};
use crate::app_config::{Config, ServerConfig};
use crate::cors::CorsPolicy;
use crate::errors::HttpError;
use crate::http::{self, HttpRequest, HttpResponse};

/// Request routing and handling, independent of the socket
#[derive(Debug, Clone)]
pub struct AlignService {
    // @field: Endpoint path and limits
    config: ServerConfig,

    // @field: Cross-origin policy, fixed at startup
    cors: CorsPolicy,
}

impl AlignService {
    pub fn new(config: ServerConfig, cors: CorsPolicy) -> Self {
        AlignService { config, cors }
    }

    /// Build the service from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.server.clone(), CorsPolicy::from_config(&config.cors))
    }

    pub fn server_config(&self) -> &ServerConfig {
        &self.config
    }

    /// Produce the response for one request
    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let origin = request.header("Origin");

        // Preflights are answered for every path, before routing
        if request.method == "OPTIONS" {
            if let (Some(origin), Some(method)) = (origin, request.header("Access-Control-Request-Method")) {
                return self.handle_preflight(origin, method, request.header("Access-Control-Request-Headers"));
            }
        }

        if request.path != self.config.route {
            return HttpResponse::json(404, &ErrorBody::new("Not Found"))
                .with_headers(self.cors.response_headers(origin));
        }

        match request.method.as_str() {
            "POST" => self.handle_align(request).with_headers(self.cors.response_headers(origin)),
            _ => Self::method_not_allowed().with_headers(self.cors.response_headers(origin)),
        }
    }

    fn handle_align(&self, request: &HttpRequest) -> HttpResponse {
        match api::handle_align_body(&request.body) {
            Ok(response) => {
                debug!("POST {} -> {} rows", self.config.route, response.data.len());
                HttpResponse::json(200, &response)
            }
            Err(e) => {
                warn!("Rejected alignment request: {}", e);
                HttpResponse::json(e.status_code(), &ErrorBody::from(&e))
            }
        }
    }

    fn handle_preflight(&self, origin: &str, method: &str, headers: Option<&str>) -> HttpResponse {
        match self.cors.preflight_headers(origin, method, headers) {
            Ok(cors_headers) => HttpResponse::text(200, "OK").with_headers(cors_headers),
            Err(rejection) => {
                debug!("Preflight from {} refused: {}", origin, rejection.message());
                HttpResponse::text(400, rejection.message())
            }
        }
    }

    fn method_not_allowed() -> HttpResponse {
        HttpResponse::json(405, &ErrorBody::new("Method Not Allowed")).with_header("Allow", "POST, OPTIONS")
    }

    /// Response for a request that could not be read
    pub fn error_response(error: &HttpError) -> Option<HttpResponse> {
        error
            .status_code()
            .map(|status| HttpResponse::json(status, &ErrorBody::new(error.to_string())))
    }
}

/// Bound listener serving the alignment endpoint
pub struct AlignServer {
    listener: TcpListener,
    service: Arc<AlignService>,
}

impl AlignServer {
    /// Bind the configured address
    pub async fn bind(config: &Config) -> Result<Self> {
        let address = config.server.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {}", address))?;

        Ok(AlignServer {
            listener,
            service: Arc::new(AlignService::from_config(config)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().context("Failed to read listener address")
    }

    /// Serve until Ctrl-C
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
    }

    /// Serve until `shutdown` completes
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let address = self.local_addr()?;
        info!("Listening on http://{}{}", address, self.service.server_config().route);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let service = Arc::clone(&self.service);
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, service).await {
                                    debug!("Connection from {} ended with error: {}", peer, e);
                                }
                            });
                        }
                        Err(e) => warn!("Failed to accept connection: {}", e),
                    }
                }
            }
        }
    }
}

/// Read one request, answer it and close the connection
async fn handle_connection(stream: TcpStream, service: Arc<AlignService>) -> Result<(), HttpError> {
    let mut stream = BufReader::new(stream);
    let config = service.server_config();
    let timeout_secs = config.request_timeout_secs;

    let read = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        http::read_request(&mut stream, config.body_limit()),
    )
    .await
    .unwrap_or(Err(HttpError::Timeout(timeout_secs)));

    let response = match read {
        Ok(request) => {
            debug!("{} {}", request.method, request.path);
            service.handle(&request)
        }
        Err(e) => match AlignService::error_response(&e) {
            Some(response) => {
                debug!("Unreadable request: {}", e);
                response
            }
            None => return Err(e),
        },
    };

    let stream = stream.get_mut();
    stream.write_all(&response.to_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await?;
    Ok(())
}
