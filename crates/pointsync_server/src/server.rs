//! HTTP server exposing the point repository.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{HandlerContext, RequestHandler};
use crate::repository::ServerRepository;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
        },
        HeaderValue, Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use pointsync_storage::FileBackend;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The point server.
///
/// Binds a TCP listener and serves the point endpoints until
/// [`PointServer::shutdown`] is called.
///
/// # Example
///
/// ```no_run
/// use pointsync_server::{PointServer, ServerConfig};
///
/// # async fn run() -> pointsync_server::ServerResult<()> {
/// let server = PointServer::open(ServerConfig::default()).await?;
/// println!("serving {}", server.url());
/// server.run_until_done().await
/// # }
/// ```
pub struct PointServer {
    local_addr: SocketAddr,
    repository: Arc<ServerRepository>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl PointServer {
    /// Opens the file store under `config.data_dir` and starts serving it.
    pub async fn open(config: ServerConfig) -> ServerResult<Self> {
        let backend = FileBackend::open(&config.data_dir)?;
        let repository = ServerRepository::open(Box::new(backend))?;
        Self::spawn(config, repository).await
    }

    /// Starts serving an existing repository.
    pub async fn spawn(config: ServerConfig, repository: ServerRepository) -> ServerResult<Self> {
        let repository = Arc::new(repository);
        let listener = TcpListener::bind(config.bind_addr).await?;
        let local_addr = listener.local_addr()?;

        let context = Arc::new(HandlerContext::new(config, Arc::clone(&repository)));
        let app = create_app(RequestHandler::new(context));

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!("point server listening on http://{local_addr}/points");
        Ok(Self {
            local_addr,
            repository,
            shutdown,
            task,
        })
    }

    /// Returns the bound socket address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the full points endpoint URL.
    pub fn url(&self) -> String {
        format!("http://{}/points", self.local_addr)
    }

    /// Returns the served repository.
    pub fn repository(&self) -> &Arc<ServerRepository> {
        &self.repository
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(self) -> ServerResult<()> {
        let _ = self.shutdown.send(());
        Self::join(self.task).await
    }

    /// Waits for the server task to finish.
    ///
    /// Runs forever unless serving fails.
    pub async fn run_until_done(self) -> ServerResult<()> {
        let Self { shutdown, task, .. } = self;
        let result = Self::join(task).await;
        drop(shutdown);
        result
    }

    async fn join(task: JoinHandle<std::io::Result<()>>) -> ServerResult<()> {
        match task.await {
            Ok(result) => Ok(result?),
            Err(err) if err.is_cancelled() => Ok(()),
            Err(err) => Err(ServerError::Internal(err.to_string())),
        }
    }
}

/// Builds the router for the point endpoints.
pub fn create_app(handler: RequestHandler) -> Router {
    let body_limit = DefaultBodyLimit::max(handler.max_body_bytes());

    Router::new()
        .route("/points", get(get_points).post(post_points))
        .route("/points/{id}", delete(delete_point))
        .fallback(not_found)
        .with_state(handler)
        .layer(body_limit)
        .layer(middleware::from_fn(cors))
        .layer(TraceLayer::new_for_http())
}

/// Answers preflight requests with 204 and adds CORS headers to every response.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

async fn get_points(State(handler): State<RequestHandler>) -> Response {
    match blocking(move || handler.handle_fetch()).await {
        Ok(body) => ([(CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn post_points(State(handler): State<RequestHandler>, body: Bytes) -> Response {
    match blocking(move || handler.handle_push(&body)).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_point(State(handler): State<RequestHandler>, Path(id): Path<String>) -> Response {
    match blocking(move || handler.handle_delete(&id)).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// Runs repository work off the async workers; it does synchronous file I/O.
async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.is_server_error() {
            warn!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}
