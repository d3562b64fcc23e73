//! HTTP callback server for codec feedback events.
//!
//! The codec posts one JSON document per matching event to the URL it was
//! registered with. This crate owns the HTTP side of that exchange and knows
//! nothing about the document itself:
//!
//! - [`CallbackServer`]: binds the listener and serves `POST /<path>`.
//! - [`FeedbackHandler`]: the seam where the consuming crate decodes and acts
//!   on each body. The server awaits the handler before responding, so
//!   whatever the handler does happens before the codec sees the response.
//!
//! Requests without a body are answered `400 Please send a request body`
//! without reaching the handler. Bodies over [`MAX_BODY_BYTES`] get `413`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use callback_server::{CallbackServer, FeedbackHandler, HandlerError};
//!
//! struct PrintHandler;
//!
//! #[async_trait]
//! impl FeedbackHandler for PrintHandler {
//!     async fn handle(&self, body: Bytes) -> Result<(), HandlerError> {
//!         println!("{}", String::from_utf8_lossy(&body));
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), callback_server::ServerError> {
//!     let addr = "0.0.0.0:8080".parse().unwrap();
//!     let server = CallbackServer::bind(addr, "/codecFeedback", Arc::new(PrintHandler))?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use handler::{FeedbackHandler, HandlerError};
pub use server::{CallbackServer, DEFAULT_CALLBACK_PATH, EMPTY_BODY_MESSAGE, MAX_BODY_BYTES};
