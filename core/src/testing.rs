//! Recording transport double for unit tests.

use std::cell::RefCell;

use crate::error::TransportError;
use crate::http::{HttpRequest, Transport};
use crate::response::Response;

/// Returns a canned response (or error) for every call and records the calls.
#[derive(Debug)]
pub(crate) struct RecordingTransport {
    response: RefCell<Response>,
    error: Option<TransportError>,
    calls: RefCell<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub(crate) fn ok(body: &str) -> Self {
        Self::with_response(Response::new(body, Vec::new()))
    }

    pub(crate) fn with_response(response: Response) -> Self {
        Self {
            response: RefCell::new(response),
            error: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: TransportError) -> Self {
        Self {
            error: Some(error),
            ..Self::ok("")
        }
    }

    /// Serve `body` from now on.
    pub(crate) fn respond_with(&self, body: &str) {
        *self.response.borrow_mut() = Response::new(body, Vec::new());
    }

    pub(crate) fn calls(&self) -> Vec<HttpRequest> {
        self.calls.borrow().clone()
    }

    pub(crate) fn last_call(&self) -> Option<HttpRequest> {
        self.calls.borrow().last().cloned()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: HttpRequest) -> Result<Response, TransportError> {
        self.calls.borrow_mut().push(request);
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(self.response.borrow().clone()),
        }
    }
}
