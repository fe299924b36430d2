//! Raw API responses and the `{meta, response, errors}` envelope.
//!
//! # Design
//! A `Response` keeps the body bytes and headers exactly as the transport
//! returned them. Typed decoding reads straight from the bytes; the generic
//! envelope maps are only parsed when a caller asks for them through
//! `populate_from_body`, and only once.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

/// A raw API response: body bytes, headers and the lazily parsed envelope.
#[derive(Debug, Clone, Default)]
pub struct Response {
    body: Vec<u8>,
    pub headers: Vec<(String, String)>,
    pub meta: Option<Map<String, Value>>,
    pub result: Option<Map<String, Value>>,
    pub errors: Option<Map<String, Value>>,
    populated: bool,
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    meta: Option<Map<String, Value>>,
    #[serde(default)]
    response: Option<Map<String, Value>>,
    #[serde(default)]
    errors: Option<Map<String, Value>>,
}

/// Typed view of the envelope used by every endpoint decoder. A body without
/// a `response` member decodes to the payload's defaults.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned + Default"))]
struct Envelope<T> {
    #[serde(default)]
    response: T,
}

impl Response {
    pub fn new(body: impl Into<Vec<u8>>, headers: Vec<(String, String)>) -> Self {
        Self {
            body: body.into(),
            headers,
            ..Self::default()
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether `populate_from_body` has already parsed the envelope, even
    /// if the body carried none of its members.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Parse the envelope maps from the body. A no-op once populated.
    pub fn populate_from_body(&mut self) -> Result<()> {
        if self.body.is_empty() {
            return Err(ApiError::EmptyBody);
        }
        if self.is_populated() {
            return Ok(());
        }
        let raw: RawEnvelope = serde_json::from_slice(&self.body)?;
        self.meta = raw.meta;
        self.result = raw.response;
        self.errors = raw.errors;
        self.populated = true;
        Ok(())
    }

    /// Decode the `response` member into `T`.
    pub fn decode<T: DeserializeOwned + Default>(&self) -> Result<T> {
        let envelope: Envelope<T> = serde_json::from_slice(&self.body)?;
        Ok(envelope.response)
    }

    #[cfg(test)]
    pub(crate) fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }
}
