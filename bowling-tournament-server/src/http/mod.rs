#[cfg(feature = "metrics")]
mod metrics;
mod v1;

use crate::config::BindAddr;
use crate::{Error, State, StatusCodeError};

use std::convert::Infallible;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bowling_tournament_api::v1::stages::StageError;
use bowling_tournament_api::ErrorResponse;
use futures::future::BoxFuture;
use futures::Future;
use hyper::header::{
    HeaderValue, IntoHeaderName, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_LENGTH, CONTENT_TYPE,
};
use hyper::http::request::Parts;
use hyper::server::conn::Http;
use hyper::service::Service;
use hyper::body::Bytes;
use hyper::{Body, HeaderMap, Method, StatusCode, Uri};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpSocket;
use tokio::time::Instant;

pub type Result = std::result::Result<Response, Error>;

/// Maximum accepted size of a request body.
pub const MAX_BODY_SIZE: u64 = 1024 * 1024;

/// Time a client has to transmit the request body.
const BODY_TIMEOUT: Duration = Duration::new(30, 0);

/// SQLSTATE class of integrity constraint violations (duplicate keys, foreign keys).
const SQLSTATE_INTEGRITY: &str = "23000";

pub async fn bind(addr: BindAddr, state: State) -> std::result::Result<(), Error> {
    match addr {
        BindAddr::Tcp(addr) => bind_tcp(addr, state).await,
        #[cfg(unix)]
        BindAddr::Unix(path) => bind_unix(path, state).await,
        #[cfg(not(unix))]
        BindAddr::Unix(_) => Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "unix sockets are not supported on this platform",
        )
        .into()),
    }
}

async fn bind_tcp(addr: SocketAddr, state: State) -> std::result::Result<(), Error> {
    let mut shutdown = state.shutdown.listen();

    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };

    if let Err(err) = socket.set_reuseaddr(true) {
        log::warn!("Failed to set SO_REUSEADDR flag: {}", err);
    }

    // Enable SO_REUSEPORT for all supported systems.
    #[cfg(all(unix, not(target_os = "solaris"), not(target_os = "illumos")))]
    if let Err(err) = socket.set_reuseport(true) {
        log::warn!("Failed to set SO_REUSEPORT flag: {}", err);
    }

    socket.bind(addr)?;
    let listener = socket.listen(1024)?;

    log::info!("Listening on {}", addr);

    loop {
        tokio::select! {
            res = listener.accept() => {
                let (stream, addr) = match res {
                    Ok((stream, addr)) => (stream, addr),
                    Err(err) => {
                        log::warn!("Failed to accept connection: {:?}", err);
                        continue;
                    }
                };

                log::debug!("Accepting new connection from {:?}", addr);

                serve_connection(stream, state.clone());
            }
            // Shut down the server.
            _ = shutdown.wait() => {
                log::debug!("Shutting down http server");
                return Ok(());
            }
        }
    }
}

#[cfg(unix)]
async fn bind_unix(path: std::path::PathBuf, state: State) -> std::result::Result<(), Error> {
    use tokio::net::UnixListener;

    let mut shutdown = state.shutdown.listen();

    // Remove the socket of a previous run.
    if path.exists() {
        std::fs::remove_file(&path)?;
    }

    let listener = UnixListener::bind(&path)?;

    log::info!("Listening on {:?}", path);

    loop {
        tokio::select! {
            res = listener.accept() => {
                let stream = match res {
                    Ok((stream, _)) => stream,
                    Err(err) => {
                        log::warn!("Failed to accept connection: {:?}", err);
                        continue;
                    }
                };

                log::debug!("Accepting new connection on {:?}", path);

                serve_connection(stream, state.clone());
            }
            _ = shutdown.wait() => {
                log::debug!("Shutting down http server");
                return Ok(());
            }
        }
    }
}

fn serve_connection<S>(stream: S, state: State)
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let mut shutdown = state.shutdown.listen();

    #[cfg(feature = "metrics")]
    {
        state.metrics.http_connections_total.inc();
        state.metrics.http_connections_current.inc();
    }

    let service = RootService { state };

    tokio::task::spawn(async move {
        let conn = Http::new()
            .http1_keep_alive(true)
            .serve_connection(stream, service.clone());

        tokio::pin!(conn);

        tokio::select! {
            res = &mut conn => {
                if let Err(err) = res {
                    log::warn!("Http error: {:?}", err);
                }
            }
            _ = shutdown.wait() => {
                log::debug!("Shutting down connection");
                conn.as_mut().graceful_shutdown();

                if let Err(err) = conn.await {
                    log::warn!("Http error: {:?}", err);
                }
            }
        }

        #[cfg(feature = "metrics")]
        service.state.metrics.http_connections_current.dec();
    });
}

#[derive(Clone, Debug)]
struct RootService {
    state: State,
}

impl Service<hyper::Request<Body>> for RootService {
    type Response = hyper::Response<Body>;
    type Error = Infallible;
    type Future = RootServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    #[inline]
    fn call(&mut self, req: hyper::Request<Body>) -> Self::Future {
        RootServiceFuture::new(req, self.state.clone())
    }
}

struct RootServiceFuture(BoxFuture<'static, std::result::Result<hyper::Response<Body>, Infallible>>);

impl RootServiceFuture {
    fn new(req: hyper::Request<Body>, state: State) -> Self {
        Self(Box::pin(service_root(req, state)))
    }
}

impl Future for RootServiceFuture {
    type Output = std::result::Result<hyper::Response<Body>, Infallible>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        self.0.as_mut().poll(cx)
    }
}

async fn service_root(
    req: hyper::Request<Body>,
    state: State,
) -> std::result::Result<hyper::Response<Body>, Infallible> {
    log::trace!("Received Request:");
    log::trace!("Head: {} {}", req.method(), req.uri());
    log::trace!("Headers: {:?}", req.headers());

    #[cfg(feature = "metrics")]
    state.metrics.http_requests_total.inc();

    #[cfg(feature = "metrics")]
    let metrics = state.metrics.clone();

    let req = Request::new(req, state);

    let origin = req.headers().get("Origin").cloned();

    let res = route(req).await;

    let mut resp = match res {
        Ok(resp) => resp,
        Err(err) => error_response(err),
    };

    log::debug!("Settings CORS for origin: {:?}", origin);
    if let Some(origin) = origin {
        resp = resp.header(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }

    resp = resp.header(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );

    #[cfg(feature = "metrics")]
    metrics.record_status(resp.status);

    Ok(resp.build())
}

async fn route(req: Request) -> Result {
    check_body_length(req.method(), req.headers())?;

    let path = req.uri().path().to_owned();
    let mut uri = RequestUri::new(&path);

    log::debug!("{:?}", uri);

    match uri.take_str() {
        Some("v1") => v1::route(req, uri).await,
        #[cfg(feature = "metrics")]
        Some("metrics") if uri.is_empty() => metrics::route(req).await,
        _ => Err(StatusCodeError::not_found().into()),
    }
}

/// Requests with a body must announce its length, which must not exceed [`MAX_BODY_SIZE`].
fn check_body_length(method: &Method, headers: &HeaderMap) -> std::result::Result<(), Error> {
    if *method == Method::POST || *method == Method::PUT {
        let length = content_length(headers)?;
        if length > MAX_BODY_SIZE {
            return Err(StatusCodeError::payload_too_large().into());
        }
    }

    Ok(())
}

/// Returns the value of the "Content-Length" header. If the header is not present or has an
/// invalid value an error is returned.
fn content_length(headers: &HeaderMap) -> std::result::Result<u64, Error> {
    match headers.get(CONTENT_LENGTH) {
        Some(value) => match value.to_str() {
            Ok(value) => match value.parse() {
                Ok(value) => Ok(value),
                Err(err) => {
                    log::debug!("Failed to parse \"Content-Length\" header: {:?}", err);

                    Err(StatusCodeError::bad_request().into())
                }
            },
            Err(err) => {
                log::debug!("Failed to parse \"Content-Length\" header: {:?}", err);

                Err(StatusCodeError::bad_request().into())
            }
        },
        None => Err(StatusCodeError::length_required().into()),
    }
}

/// Reads the whole `body`. The body must arrive within `timeout` and must not be larger
/// than [`MAX_BODY_SIZE`].
async fn read_body(body: Body, timeout: Duration) -> std::result::Result<Bytes, Error> {
    let deadline = Instant::now() + timeout;

    let bytes = tokio::select! {
        res = hyper::body::to_bytes(body) => {
            res?
        }
        _ = tokio::time::sleep_until(deadline) => {
            log::info!("Client failed to transmit body in {:?}, dropping connection", timeout);
            return Err(StatusCodeError::request_timeout().into());
        }
    };

    // The Content-Length header is checked before routing, but the body may still be
    // longer than announced.
    if bytes.len() as u64 > MAX_BODY_SIZE {
        return Err(StatusCodeError::payload_too_large().into());
    }

    Ok(bytes)
}

/// Maps an error to the response returned to the client.
fn error_response(err: Error) -> Response {
    let err = match err {
        Error::StatusCodeError(err) => err,
        Error::Validation(err) => StatusCodeError::new(StatusCode::BAD_REQUEST, err),
        Error::Stage(StageError::Validation(err)) => {
            StatusCodeError::new(StatusCode::BAD_REQUEST, err)
        }
        Error::Stage(err @ StageError::Unknown(_)) => {
            StatusCodeError::new(StatusCode::BAD_REQUEST, err)
        }
        Error::Stage(err) => StatusCodeError::new(StatusCode::CONFLICT, err),
        Error::Json(err) => StatusCodeError::new(StatusCode::BAD_REQUEST, err),
        Error::Store(sqlx::Error::RowNotFound) => StatusCodeError::not_found(),
        Error::Store(sqlx::Error::Database(err))
            if err.code().as_deref() == Some(SQLSTATE_INTEGRITY) =>
        {
            log::debug!("Rejecting write: {}", err);
            StatusCodeError::conflict().message(err.message().to_owned())
        }
        err => {
            log::error!("{:?}", err);
            StatusCodeError::internal_server_error()
        }
    };

    Response::ok().status(err.code).json(&ErrorResponse {
        code: err.code.as_u16(),
        message: err.message.into_owned(),
    })
}

#[derive(Debug)]
pub struct Request {
    pub parts: Parts,
    pub body: Option<Body>,
    state: State,
}

impl Request {
    #[inline]
    fn new(req: hyper::Request<Body>, state: State) -> Self {
        let (parts, body) = req.into_parts();

        Self {
            parts,
            body: Some(body),
            state,
        }
    }

    #[inline]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap<HeaderValue> {
        &self.parts.headers
    }

    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Reads the body and parses it as json. The body must arrive within 30 seconds and
    /// must not be larger than [`MAX_BODY_SIZE`].
    pub async fn json<T>(&mut self) -> std::result::Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let body = self
            .body
            .take()
            .ok_or_else(StatusCodeError::internal_server_error)?;

        let bytes = read_body(body, BODY_TIMEOUT).await?;

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(err) => Err(StatusCodeError::new(StatusCode::BAD_REQUEST, err).into()),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct RequestUri<'a> {
    path: &'a str,
}

impl<'a> RequestUri<'a> {
    pub fn new(mut path: &'a str) -> Self {
        if path.starts_with('/') {
            path = &path[1..];
        }

        Self { path }
    }

    pub fn take_str(&mut self) -> Option<&'a str> {
        if self.path.is_empty() {
            None
        } else {
            Some(match self.path.split_once('/') {
                Some((part, rem)) => {
                    self.path = rem;
                    part
                }
                None => {
                    let path = self.path;
                    self.path = "";
                    path
                }
            })
        }
    }

    /// Returns `true` if all segments were taken. A trailing `/` counts as empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Returns an error unless all segments were taken.
    pub fn end(&self) -> std::result::Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(StatusCodeError::not_found().into())
        }
    }
}

#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    /// 200 OK
    pub fn ok() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }

    /// 201 Created
    pub fn created() -> Self {
        Self {
            status: StatusCode::CREATED,
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }

    /// 204 No Content
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn body<T>(mut self, body: T) -> Self
    where
        T: Into<Body>,
    {
        self.body = body.into();
        self
    }

    pub fn json<T>(mut self, body: &T) -> Self
    where
        T: Serialize,
    {
        match serde_json::to_vec(body) {
            Ok(buf) => {
                self.body = Body::from(buf);
                self.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            }
            Err(err) => {
                log::error!("Failed to serialize response body: {}", err);

                self.status = StatusCode::INTERNAL_SERVER_ERROR;
                self.body = Body::empty();
                self
            }
        }
    }

    pub fn header<K>(mut self, key: K, value: HeaderValue) -> Self
    where
        K: IntoHeaderName,
    {
        self.headers.append(key, value);
        self
    }

    fn build(self) -> hyper::Response<Body> {
        let mut resp = hyper::Response::new(self.body);
        *resp.status_mut() = self.status;
        *resp.headers_mut() = self.headers;
        resp
    }
}
