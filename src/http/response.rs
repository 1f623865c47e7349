//! Response envelope: normalized header metadata plus the decoded JSON
//! payload.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result, ServerErrCode};
use crate::http::headers;

/// Response headers parsed into a normalized metadata bag.
///
/// Keys are lower-cased, the service prefix `x-bce-` is replaced with
/// `bce_`, remaining dashes become underscores, and quoted etag values are
/// unquoted. So `X-Bce-Request-Id` is read back as `bce_request_id`.
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    entries: BTreeMap<String, String>,
}

impl ResponseMetadata {
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut entries = BTreeMap::new();
        for (name, value) in headers {
            let lower = name.to_ascii_lowercase();
            let key = match lower.strip_prefix(headers::BCE_PREFIX) {
                Some(rest) => format!("bce_{rest}"),
                None => lower,
            }
            .replace('-', "_");
            let value = if key == headers::ETAG {
                value.trim_matches('"').to_string()
            } else {
                value.to_string()
            };
            entries.insert(key, value);
        }
        ResponseMetadata { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The request id assigned by the service, when present.
    pub fn request_id(&self) -> Option<&str> {
        self.get("bce_request_id")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A decoded response: HTTP status, normalized metadata, and the JSON
/// payload (null when the body was empty).
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub metadata: ResponseMetadata,
    pub body: serde_json::Value,
    /// Raw body text as received.
    pub raw: String,
}

impl HttpResponse {
    /// Decode the JSON payload into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| Error::client(format!("failed to decode response body: {e}")))
    }

    /// A single top-level field of the payload.
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.body.get(key)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    msg: String,
    code: i64,
}

/// Classify a response by status. 2xx passes; 1xx is unsupported outright;
/// anything else decodes the `{msg, code}` error body, falling back to the
/// HTTP reason phrase plus the request id when the body is empty or not the
/// expected shape.
pub(crate) fn check_status(
    status_code: u16,
    reason: &str,
    metadata: &ResponseMetadata,
    body_text: &str,
) -> Result<()> {
    match status_code / 100 {
        2 => Ok(()),
        1 => Err(Error::client("can not handle 1xx http status code")),
        _ => {
            let request_id = metadata.request_id().map(str::to_string);
            match serde_json::from_str::<ErrorBody>(body_text) {
                Ok(body) => Err(Error::Server {
                    status_code,
                    code: Some(ServerErrCode::from(body.code)),
                    message: body.msg,
                    request_id,
                }),
                Err(_) => Err(Error::Server {
                    status_code,
                    code: None,
                    message: reason.to_string(),
                    request_id,
                }),
            }
        }
    }
}
