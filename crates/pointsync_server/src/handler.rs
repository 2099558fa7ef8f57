//! Request handlers for point endpoints.
//!
//! Handlers take and return raw bodies so they can be driven by the axum
//! router or directly from tests without a socket.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::repository::ServerRepository;
use pointsync_protocol::{decode_points, encode_points, PushResponse};
use std::sync::Arc;

/// Context for request handling.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// Point repository (shared across all handlers).
    pub repository: Arc<ServerRepository>,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, repository: Arc<ServerRepository>) -> Self {
        Self { config, repository }
    }
}

/// Handler for point requests.
#[derive(Clone)]
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Returns the shared repository.
    pub fn repository(&self) -> &Arc<ServerRepository> {
        &self.context.repository
    }

    /// Largest accepted push body.
    pub fn max_body_bytes(&self) -> usize {
        self.context.config.max_body_bytes
    }

    /// Handles `GET /points`: returns the JSON array of stored points.
    pub fn handle_fetch(&self) -> ServerResult<Vec<u8>> {
        let points = self.context.repository.fetch_all()?;
        encode_points(&points).map_err(|e| ServerError::Corrupted(e.to_string()))
    }

    /// Handles `POST /points`: unions the body into the stored set.
    pub fn handle_push(&self, body: &[u8]) -> ServerResult<PushResponse> {
        let limit = self.max_body_bytes();
        if body.len() > limit {
            return Err(ServerError::PayloadTooLarge {
                size: body.len(),
                limit,
            });
        }

        let incoming = decode_points(body).map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
        let count = self.context.repository.replace_all(incoming)?;
        Ok(PushResponse::success(count))
    }

    /// Handles `DELETE /points/{id}`.
    pub fn handle_delete(&self, id: &str) -> ServerResult<PushResponse> {
        let count = self.context.repository.remove(id)?;
        Ok(PushResponse::success(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointsync_storage::InMemoryBackend;

    fn create_handler() -> RequestHandler {
        create_handler_with(ServerConfig::default())
    }

    fn create_handler_with(config: ServerConfig) -> RequestHandler {
        let repository =
            Arc::new(ServerRepository::open(Box::new(InMemoryBackend::new())).unwrap());
        let context = Arc::new(HandlerContext::new(config, repository));
        RequestHandler::new(context)
    }

    #[test]
    fn fetch_empty() {
        let handler = create_handler();
        assert_eq!(handler.handle_fetch().unwrap(), b"[]");
    }

    #[test]
    fn push_and_fetch() {
        let handler = create_handler();

        let response = handler
            .handle_push(br#"[{"id":"A","name":"X","lat":1,"lng":2},{"id":"B","name":"Y","lat":3,"lng":4}]"#)
            .unwrap();
        assert_eq!(response, PushResponse::success(2));

        let points = decode_points(&handler.handle_fetch().unwrap()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points.get("B").unwrap().name, "Y");
    }

    #[test]
    fn push_same_body_twice_is_noop() {
        let handler = create_handler();
        let body = br#"[{"id":"A","name":"X","lat":1,"lng":2}]"#;

        handler.handle_push(body).unwrap();
        let first = handler.handle_fetch().unwrap();
        let response = handler.handle_push(body).unwrap();

        assert_eq!(response.count, 1);
        assert_eq!(handler.handle_fetch().unwrap(), first);
    }

    #[test]
    fn push_invalid_json() {
        let handler = create_handler();

        let err = handler.handle_push(b"{oops").unwrap_err();
        assert!(matches!(err, ServerError::InvalidRequest(_)));
        assert_eq!(err.status_code(), 400);

        // Valid JSON, wrong shape.
        let err = handler.handle_push(br#"{"id":"A"}"#).unwrap_err();
        assert_eq!(err.status_code(), 400);

        assert!(handler.repository().is_empty().unwrap());
    }

    #[test]
    fn push_too_large() {
        let handler = create_handler_with(ServerConfig::default().with_max_body_bytes(8));
        let err = handler.handle_push(b"[              ]").unwrap_err();
        assert_eq!(err.status_code(), 413);
    }

    #[test]
    fn delete_point() {
        let handler = create_handler();
        handler
            .handle_push(br#"[{"id":"A","name":"X","lat":1,"lng":2}]"#)
            .unwrap();

        assert_eq!(handler.handle_delete("A").unwrap(), PushResponse::success(0));
        assert_eq!(handler.handle_fetch().unwrap(), b"[]");
    }
}
