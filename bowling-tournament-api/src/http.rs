use crate::{Error, ErrorResponse, Result};

use http::{header::CONTENT_TYPE, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Clone, Debug, Default)]
pub struct Client {
    inner: native::InnerClient,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn send(&self, request: Request) -> Result<Response> {
        log::debug!("{} {}", request.method, request.uri);

        self.inner.send(request).await
    }
}

#[derive(Clone, Debug)]
pub struct Request {
    uri: String,
    method: Method,
    headers: Vec<(&'static str, String)>,
    body: Option<String>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    #[inline]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

impl Default for Request {
    fn default() -> Self {
        Self {
            uri: String::new(),
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RequestBuilder {
    inner: Request,
}

impl RequestBuilder {
    /// Creates a new `RequestBuilder` with all paths relative to `base`.
    pub fn new(base: &str) -> Self {
        let inner = Request {
            uri: base.trim_end_matches('/').to_owned(),
            ..Default::default()
        };

        Self { inner }
    }

    /// Sets the request method to `GET`.
    pub fn get(mut self) -> Self {
        self.inner.method = Method::GET;
        self
    }

    /// Sets the request method to `POST`.
    pub fn post(mut self) -> Self {
        self.inner.method = Method::POST;
        self
    }

    /// Sets the request method to `PUT`.
    pub fn put(mut self) -> Self {
        self.inner.method = Method::PUT;
        self
    }

    /// Sets the request method to `DELETE`.
    pub fn delete(mut self) -> Self {
        self.inner.method = Method::DELETE;
        self
    }

    /// Appends `uri` to the request path.
    pub fn uri(mut self, uri: &str) -> Self {
        self.inner.uri.push_str(uri);
        self
    }

    /// Adds an header to the request.
    pub fn header<T>(mut self, key: &'static str, value: T) -> Self
    where
        T: ToString,
    {
        self.inner.headers.push((key, value.to_string()));
        self
    }

    /// Uses `T` serialized as json as the request body.
    pub fn body<T>(mut self, body: &T) -> Result<Self>
    where
        T: Serialize,
    {
        self.inner.body = Some(serde_json::to_string(body)?);
        Ok(self.header(CONTENT_TYPE.as_str(), "application/json"))
    }

    pub fn build(self) -> Request {
        self.inner
    }
}

impl From<RequestBuilder> for Request {
    fn from(req: RequestBuilder) -> Self {
        req.inner
    }
}

#[derive(Debug)]
pub struct Response {
    inner: native::InnerResponse,
}

impl Response {
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Returns `true` if the response contains a 2xx status code.
    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Turns non 2xx responses into an [`enum@Error`]. The error body returned by the
    /// server is kept in [`Error::Status`].
    pub async fn error_for_status(self) -> Result<Self> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }

        let body = self.inner.bytes().await?;
        Err(status_error(status, &body))
    }

    /// Deserializes the body of a successful response.
    pub async fn json<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.error_for_status().await?.inner.json().await
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> Error {
    if status == StatusCode::NOT_FOUND {
        return Error::NotFound;
    }

    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(resp) => Error::Status {
            status,
            message: resp.message,
        },
        Err(_) => Error::BadStatusCode(status),
    }
}

mod native {
    use super::{Request, Response};
    use crate::{Error, Result};

    use http::StatusCode;
    use hyper::{body, body::Bytes, client::HttpConnector, Body};
    use hyper_tls::HttpsConnector;
    use serde::de::DeserializeOwned;

    #[derive(Clone, Debug)]
    pub struct InnerClient {
        inner: hyper::Client<HttpsConnector<HttpConnector>>,
    }

    impl InnerClient {
        pub async fn send(&self, request: Request) -> Result<Response> {
            let req = hyper::Request::try_from(request)?;

            let resp = self.inner.request(req).await?;

            Ok(Response {
                inner: InnerResponse(resp),
            })
        }
    }

    impl Default for InnerClient {
        fn default() -> Self {
            Self {
                inner: hyper::Client::builder().build(HttpsConnector::new()),
            }
        }
    }

    #[derive(Debug)]
    pub struct InnerResponse(hyper::Response<Body>);

    impl InnerResponse {
        pub fn status(&self) -> StatusCode {
            self.0.status()
        }

        pub async fn bytes(self) -> Result<Bytes> {
            Ok(body::to_bytes(self.0.into_body()).await?)
        }

        pub async fn json<T>(self) -> Result<T>
        where
            T: DeserializeOwned,
        {
            let bytes = self.bytes().await?;

            Ok(serde_json::from_slice(&bytes)?)
        }
    }

    impl TryFrom<Request> for hyper::Request<Body> {
        type Error = Error;

        fn try_from(request: Request) -> Result<Self> {
            let body = match request.body {
                Some(body) => Body::from(body),
                None => Body::empty(),
            };

            let mut builder = hyper::Request::builder()
                .uri(request.uri)
                .method(request.method);

            for (key, value) in request.headers {
                builder = builder.header(key, value);
            }

            Ok(builder.body(body)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{status_error, RequestBuilder};
    use crate::Error;

    use http::{Method, StatusCode};

    #[test]
    fn test_request_builder() {
        let req = RequestBuilder::new("http://localhost:3000/")
            .uri("/v1/divs/many")
            .post()
            .body(&vec![1, 2])
            .unwrap()
            .build();

        assert_eq!(req.uri(), "http://localhost:3000/v1/divs/many");
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.body(), Some("[1,2]"));
    }

    #[test]
    fn test_status_error() {
        let body = br#"{"code":409,"message":"cannot move from stage DEFINE to SCORES without override"}"#;
        match status_error(StatusCode::CONFLICT, body) {
            Error::Status { status, message } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(
                    message,
                    "cannot move from stage DEFINE to SCORES without override"
                );
            }
            err => panic!("unexpected error: {:?}", err),
        }

        let body = br#"{"code":400,"message":"invalid data in field `div_name` at index 1"}"#;
        assert_eq!(
            status_error(StatusCode::BAD_REQUEST, body).to_string(),
            "400 Bad Request: invalid data in field `div_name` at index 1"
        );

        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, b"<html></html>"),
            Error::BadStatusCode(StatusCode::BAD_GATEWAY)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, b""),
            Error::NotFound
        ));
    }
}
