//! Transport contract between the client core and the caller's HTTP layer.
//!
//! # Design
//! The core never touches the network. Every operation describes its call as
//! an `HttpRequest` value and hands it to a caller-supplied `Transport`,
//! which performs the round-trip (including OAuth signing) and returns the
//! raw body and headers as a `Response`. Pointing the library at a real API,
//! a local fixture or a test double only requires implementing `send`.
//!
//! The eight verb methods are provided on top of `send` and may be overridden
//! individually.

use std::fmt;

use tracing::trace;

use crate::error::TransportError;
use crate::params::Params;
use crate::response::Response;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An API call described as plain data.
///
/// `path` is relative to the API root (for example `/user/dashboard`). For
/// `GET` and `DELETE` the params belong in the query string; for `POST` and
/// `PUT` they are form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub params: Params,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: &str, params: Params) -> Self {
        trace!(%method, path, params = params.len(), "building request");
        Self {
            method,
            path: path.to_string(),
            params,
        }
    }
}

/// The caller-implemented HTTP seam.
pub trait Transport: fmt::Debug {
    /// Execute `request` and return the raw response.
    fn send(&self, request: HttpRequest) -> Result<Response, TransportError>;

    fn get(&self, path: &str) -> Result<Response, TransportError> {
        self.get_with_params(path, &Params::new())
    }

    fn get_with_params(&self, path: &str, params: &Params) -> Result<Response, TransportError> {
        self.send(HttpRequest::new(HttpMethod::Get, path, params.clone()))
    }

    fn post(&self, path: &str) -> Result<Response, TransportError> {
        self.post_with_params(path, &Params::new())
    }

    fn post_with_params(&self, path: &str, params: &Params) -> Result<Response, TransportError> {
        self.send(HttpRequest::new(HttpMethod::Post, path, params.clone()))
    }

    fn put(&self, path: &str) -> Result<Response, TransportError> {
        self.put_with_params(path, &Params::new())
    }

    fn put_with_params(&self, path: &str, params: &Params) -> Result<Response, TransportError> {
        self.send(HttpRequest::new(HttpMethod::Put, path, params.clone()))
    }

    fn delete(&self, path: &str) -> Result<Response, TransportError> {
        self.delete_with_params(path, &Params::new())
    }

    fn delete_with_params(&self, path: &str, params: &Params) -> Result<Response, TransportError> {
        self.send(HttpRequest::new(HttpMethod::Delete, path, params.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;

    #[test]
    fn plain_verbs_send_empty_params() {
        let transport = RecordingTransport::ok("{}");
        transport.get("/user/info").unwrap();
        transport.post("/user/follow").unwrap();
        transport.put("/x").unwrap();
        transport.delete("/y").unwrap();

        let calls = transport.calls();
        let methods: Vec<HttpMethod> = calls.iter().map(|c| c.method).collect();
        assert_eq!(
            methods,
            [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete]
        );
        assert!(calls.iter().all(|c| c.params.is_empty()));
        assert_eq!(calls[0].path, "/user/info");
    }

    #[test]
    fn with_params_verbs_forward_params() {
        let transport = RecordingTransport::ok("{}");
        let params = Params::new().with("limit", "3");
        transport.get_with_params("/user/likes", &params).unwrap();
        transport.delete_with_params("/z", &params).unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].method, HttpMethod::Get);
        assert_eq!(calls[0].params, params);
        assert_eq!(calls[1].method, HttpMethod::Delete);
    }

    #[test]
    fn transport_errors_pass_through() {
        let transport = RecordingTransport::failing(TransportError::Request("offline".to_string()));
        let err = transport.get("/user/info").unwrap_err();
        assert_eq!(err, TransportError::Request("offline".to_string()));
    }

    #[test]
    fn method_display() {
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }
}
