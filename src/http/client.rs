//! Blocking HTTP transport.
//!
//! Owns the pooled connection, sends one logical request to completion
//! including retries, and produces a decoded [`HttpResponse`] or a typed
//! error. The request body is a JSON byte buffer kept for the life of the
//! call and resent verbatim on every retry; the date header and signature
//! are recomputed per attempt.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::config::ClientConfiguration;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::http::response::{self, HttpResponse, ResponseMetadata};
use crate::http::{headers, signer};

/// The only HTTP methods on the Mochow wire. Reads are POST with a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// Blocking HTTP client shared by all resource handles of one
/// [`MochowClient`](crate::client::MochowClient).
///
/// Thread-safe: the underlying pool may be used from multiple threads, and
/// `close()` is observed by every handle sharing the client.
#[derive(Debug)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
    closed: AtomicBool,
}

impl HttpClient {
    /// Build the connection pool. Keep-alive probing is tuned on the pool
    /// so long-lived idle connections to the service stay usable.
    pub fn new(config: &ClientConfiguration) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .tcp_keepalive(Duration::from_secs(120))
            .pool_max_idle_per_host(10);
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(HttpClient {
            inner: builder.build()?,
            closed: AtomicBool::new(false),
        })
    }

    /// Mark the client closed. Any later send fails fast with a client
    /// error; in-flight requests are unaffected.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send one logical request: sign, dispatch, classify, retry per the
    /// configured policy. On a non-retryable or exhausted failure the most
    /// recent error propagates unchanged.
    pub fn send_request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<Vec<u8>>,
        config: &ClientConfiguration,
    ) -> Result<HttpResponse> {
        if self.is_closed() {
            return Err(Error::client("conn is closed"));
        }
        let endpoint = config.endpoint()?;
        let credentials = config.credentials()?;
        let (base_url, host_header) = endpoint_parts(endpoint)?;

        let query = canonical_query_string(params);
        let url = if query.is_empty() {
            format!("{base_url}{path}")
        } else {
            format!("{base_url}{path}?{query}")
        };
        let user_agent = format!(
            "mochow-rust/{}/{}/{}",
            crate::SDK_VERSION,
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        let content_length = body.as_ref().map_or(0, Vec::len);
        let policy = config.retry_policy();
        let timeout = config.connection_timeout();

        debug!(method = method.as_str(), %url, "request start");

        let mut retries_attempted: u32 = 0;
        let mut errors: Vec<String> = Vec::new();
        loop {
            let attempt = self.send_once(
                method,
                &url,
                &host_header,
                &user_agent,
                content_length,
                body.as_deref(),
                credentials,
                timeout,
            );
            match attempt {
                Ok(response) => return Ok(response),
                Err(error) => {
                    errors.push(format!(">>>> attempt {}: {error}", retries_attempted + 1));
                    if policy.should_retry(&error, retries_attempted) {
                        let delay = policy.delay_before_next_retry(&error, retries_attempted);
                        debug!(
                            attempt = retries_attempted + 1,
                            delay_ms = delay.as_millis() as u64,
                            %error,
                            "retrying request"
                        );
                        thread::sleep(delay);
                    } else {
                        debug!(
                            retries = retries_attempted,
                            "unable to execute HTTP request; all errors:\n{}",
                            errors.join("\n")
                        );
                        return Err(error);
                    }
                }
            }
            retries_attempted += 1;
        }
    }

    fn send_once(
        &self,
        method: Method,
        url: &str,
        host_header: &str,
        user_agent: &str,
        content_length: usize,
        body: Option<&[u8]>,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<HttpResponse> {
        // Date recomputed per attempt so a retried request is re-signed
        // against a fresh clock reading.
        let date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let mut header_pairs: Vec<(&'static str, String)> = vec![
            (headers::USER_AGENT, user_agent.to_string()),
            (headers::HOST, host_header.to_string()),
            (headers::CONTENT_LENGTH, content_length.to_string()),
            (headers::CONTENT_TYPE, "application/json".to_string()),
            (headers::BCE_DATE, date),
        ];
        header_pairs.extend(signer::sign(credentials));
        check_headers(&header_pairs)?;

        let mut request = match method {
            Method::Post => self.inner.post(url),
            Method::Delete => self.inner.delete(url),
        }
        .timeout(timeout);
        for (name, value) in &header_pairs {
            request = request.header(*name, value.as_str());
        }
        if let Some(bytes) = body {
            request = request.body(bytes.to_vec());
        }

        let http_response = request.send()?;
        let status = http_response.status();
        let metadata = ResponseMetadata::from_headers(
            http_response
                .headers()
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
        );
        let text = http_response.text()?;
        debug!(status = status.as_u16(), "request return");

        response::check_status(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            &metadata,
            &text,
        )?;
        let body_value = if text.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| Error::client(format!("invalid JSON in response body: {e}")))?
        };
        Ok(HttpResponse {
            status_code: status.as_u16(),
            metadata,
            body: body_value,
            raw: text,
        })
    }
}

/// Reject header values with embedded newlines before any I/O happens.
fn check_headers(header_pairs: &[(&'static str, String)]) -> Result<()> {
    for (name, value) in header_pairs {
        if value.contains('\n') {
            return Err(Error::client(format!(
                "there should not be any \"\\n\" in header[{name}]:{value}"
            )));
        }
    }
    Ok(())
}

/// Split an endpoint into a base URL (scheme always present) and the host
/// header value (port appended only when non-default for the scheme).
fn endpoint_parts(endpoint: &str) -> Result<(String, String)> {
    let (scheme, rest) = if let Some(rest) = endpoint.strip_prefix("https://") {
        ("https", rest)
    } else if let Some(rest) = endpoint.strip_prefix("http://") {
        ("http", rest)
    } else {
        ("http", endpoint)
    };
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Err(Error::client(format!("invalid endpoint: {endpoint}")));
    }
    let default_port = if scheme == "https" { 443 } else { 80 };
    let host_header = match rest.rsplit_once(':') {
        Some((host, port)) if port.parse::<u16>() == Ok(default_port) => host.to_string(),
        _ => rest.to_string(),
    };
    Ok((format!("{scheme}://{rest}"), host_header))
}

/// Render query parameters. Operation discriminators are empty-valued and
/// must hit the wire as a bare key (`?upsert`, no `=`); valued parameters
/// are percent-encoded on both sides.
fn canonical_query_string(params: &[(&str, String)]) -> String {
    let mut parts = Vec::with_capacity(params.len());
    for (key, value) in params {
        if value.is_empty() {
            parts.push(percent_encode(key));
        } else {
            parts.push(format!("{}={}", percent_encode(key), percent_encode(value)));
        }
    }
    parts.join("&")
}

fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            other => {
                out.push('%');
                out.push(char::from_digit(u32::from(other >> 4), 16)
                    .unwrap_or('0')
                    .to_ascii_uppercase());
                out.push(char::from_digit(u32::from(other & 0xf), 16)
                    .unwrap_or('0')
                    .to_ascii_uppercase());
            }
        }
    }
    out
}
