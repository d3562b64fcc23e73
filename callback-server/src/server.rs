//! HTTP server for receiving codec feedback events.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use futures::{Stream, StreamExt};
use warp::http::StatusCode;
use warp::reject::Reject;
use warp::{Filter, Rejection, Reply};

use crate::error::ServerError;
use crate::handler::{FeedbackHandler, HandlerError};

/// Path the codec posts feedback to unless configured otherwise
pub const DEFAULT_CALLBACK_PATH: &str = "/codecFeedback";

/// Response body for requests that arrive without a body
pub const EMPTY_BODY_MESSAGE: &str = "Please send a request body";

/// Largest feedback body accepted; larger requests get 413
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Request body could not be collected
#[derive(Debug)]
enum BodyRejection {
    TooLarge,
    Read(String),
}

impl Reject for BodyRejection {}

/// HTTP callback server for codec feedback.
///
/// Serves `POST /<path>` and hands each non-empty body to a
/// [`FeedbackHandler`]. The server has no shutdown path: once bound it
/// listens until the process exits.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use callback_server::{CallbackServer, FeedbackHandler};
/// # async fn start(handler: Arc<dyn FeedbackHandler>) -> Result<(), callback_server::ServerError> {
/// let server = CallbackServer::bind("0.0.0.0:8080".parse().unwrap(), "/codecFeedback", handler)?;
/// println!("Listening on {}", server.local_addr());
/// server.run().await
/// # }
/// ```
pub struct CallbackServer {
    /// The address the listener is bound to
    local_addr: SocketAddr,
    /// The callback path segment, without the leading slash
    segment: String,
    /// Server task handle
    server_handle: tokio::task::JoinHandle<()>,
}

impl CallbackServer {
    /// Bind the listener and start serving.
    ///
    /// Must be called from within a tokio runtime. Binding to port 0 picks
    /// an ephemeral port; see [`local_addr`](Self::local_addr).
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidPath`] if `path` is not a single
    /// segment, or [`ServerError::Bind`] if the address cannot be bound.
    pub fn bind(
        addr: SocketAddr,
        path: &str,
        handler: Arc<dyn FeedbackHandler>,
    ) -> Result<Self, ServerError> {
        let segment = Self::path_segment(path)?;
        let routes = Self::routes(segment.clone(), handler);

        let (local_addr, server) = warp::serve(routes)
            .try_bind_ephemeral(addr)
            .map_err(|e| ServerError::Bind {
                addr,
                reason: e.to_string(),
            })?;

        tracing::info!(%local_addr, path = %format!("/{segment}"), "Callback server listening");
        let server_handle = tokio::spawn(server);

        Ok(Self {
            local_addr,
            segment,
            server_handle,
        })
    }

    /// Get the address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Get the callback path, including the leading slash.
    pub fn path(&self) -> String {
        format!("/{}", self.segment)
    }

    /// Build the URL a device on the network should post to, given the
    /// host address it can reach this server at.
    pub fn callback_url(&self, host: IpAddr) -> String {
        Self::format_callback_url(host, self.local_addr.port(), &self.segment)
    }

    /// Serve until the process exits.
    pub async fn run(self) -> Result<(), ServerError> {
        self.server_handle
            .await
            .map_err(|e| ServerError::Task(e.to_string()))
    }

    /// Build a callback URL without a bound server.
    ///
    /// Registration happens before the server binds, so the URL has to be
    /// known up front.
    pub fn format_callback_url(host: IpAddr, port: u16, path: &str) -> String {
        let address = SocketAddr::new(host, port);
        format!("http://{}/{}", address, path.trim_start_matches('/'))
    }

    /// Detect the local IP address for callback URLs.
    ///
    /// This uses a UDP socket connection to determine the local IP address
    /// that would be used for outbound connections. No data is actually sent.
    pub fn detect_local_ip() -> Option<IpAddr> {
        let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        let local_addr = socket.local_addr().ok()?;
        Some(local_addr.ip())
    }

    fn path_segment(path: &str) -> Result<String, ServerError> {
        let segment = path.strip_prefix('/').unwrap_or(path);
        if segment.is_empty() || segment.contains('/') {
            return Err(ServerError::InvalidPath(path.to_string()));
        }
        Ok(segment.to_string())
    }

    fn routes(
        segment: String,
        handler: Arc<dyn FeedbackHandler>,
    ) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        warp::path(segment)
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::stream())
            .and_then(|stream| collect_body(stream, MAX_BODY_BYTES))
            .and(warp::any().map(move || handler.clone()))
            .then(handle_feedback)
            .recover(handle_rejection)
    }
}

/// Buffer the body, giving up once it exceeds `limit`.
///
/// Empty and chunked requests carry no `Content-Length`, so the limit is
/// enforced on the stream.
async fn collect_body<S, B>(stream: S, limit: usize) -> Result<Bytes, Rejection>
where
    S: Stream<Item = Result<B, warp::Error>>,
    B: Buf,
{
    let mut stream = std::pin::pin!(stream);
    let mut body = BytesMut::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| warp::reject::custom(BodyRejection::Read(e.to_string())))?;
        if body.len() + chunk.remaining() > limit {
            return Err(warp::reject::custom(BodyRejection::TooLarge));
        }
        body.put(chunk);
    }

    Ok(body.freeze())
}

/// Drive one feedback request through the handler.
async fn handle_feedback(body: Bytes, handler: Arc<dyn FeedbackHandler>) -> warp::reply::Response {
    tracing::debug!(bytes = body.len(), "Received feedback request");

    if body.is_empty() {
        tracing::warn!("Rejecting feedback request without a body");
        return warp::reply::with_status(EMPTY_BODY_MESSAGE, StatusCode::BAD_REQUEST).into_response();
    }

    match handler.handle(body).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(HandlerError::BadRequest(message)) => {
            tracing::warn!(%message, "Rejecting feedback request");
            warp::reply::with_status(message, StatusCode::BAD_REQUEST).into_response()
        }
    }
}

/// Handle rejections and convert them to HTTP responses.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not found";
    } else if let Some(rejection) = err.find::<BodyRejection>() {
        match rejection {
            BodyRejection::TooLarge => {
                tracing::warn!(limit = MAX_BODY_BYTES, "Rejecting oversized feedback request");
                code = StatusCode::PAYLOAD_TOO_LARGE;
                message = "Payload too large";
            }
            BodyRejection::Read(reason) => {
                tracing::warn!(%reason, "Failed to read feedback request body");
                code = StatusCode::BAD_REQUEST;
                message = "Failed to read request body";
            }
        }
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method not allowed";
    } else {
        tracing::error!(rejection = ?err, "Unhandled rejection");
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal server error";
    }

    Ok(warp::reply::with_status(message, code))
}
