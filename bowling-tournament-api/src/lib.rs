//! Typed access to the bowling tournament API.
//!
//! ```no_run
//! # async fn run() -> bowling_tournament_api::Result<()> {
//! use bowling_tournament_api::Client;
//!
//! let client = Client::new("http://localhost:3000");
//!
//! for tmnt in client.v1().tmnts().list().await? {
//!     println!("{} {}", tmnt.id, tmnt.tmnt_name);
//! }
//! # Ok(())
//! # }
//! ```
pub mod http;
pub mod id;
pub mod money;
pub mod v1;
pub mod validate;

pub use id::Identifier;
pub use money::Money;
pub use validate::{Validate, ValidationError};

use std::sync::Arc;

use ::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::{Request, RequestBuilder, Response};

#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    base_url: String,
    http: crate::http::Client,
}

impl Client {
    /// Creates a new `Client` talking to the server at `base_url`.
    pub fn new<T>(base_url: T) -> Self
    where
        T: ToString,
    {
        Self {
            inner: Arc::new(ClientInner {
                base_url: base_url.to_string(),
                http: crate::http::Client::new(),
            }),
        }
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    #[inline]
    pub fn v1(&self) -> v1::Client<'_> {
        v1::Client::new(self)
    }

    pub(crate) fn request(&self) -> RequestBuilder {
        RequestBuilder::new(&self.inner.base_url)
    }

    pub(crate) async fn send(&self, request: Request) -> Result<Response> {
        self.inner.http.send(request).await
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Hyper(#[from] hyper::Error),
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ::http::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A non 2xx response carrying an [`ErrorResponse`].
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("bad status code: {0}")]
    BadStatusCode(StatusCode),
    #[error("not found")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, Error>;

/// The number of rows affected by a write.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub count: u64,
}

impl From<u64> for Count {
    #[inline]
    fn from(count: u64) -> Self {
        Self { count }
    }
}

/// The error body returned by the server for all non 2xx responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}
