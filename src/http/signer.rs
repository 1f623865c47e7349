//! Request signing.
//!
//! Mochow authenticates with bearer-style headers derived from the
//! credentials alone; there is no canonical-request or date-based HMAC
//! scheme. Signing is a pure function: no I/O, no mutation of inputs, same
//! credentials always produce the same header values.

use crate::credentials::Credentials;
use crate::http::headers;

/// Compute the authorization headers for `credentials`.
///
/// Plain credentials produce a single `authorization` header:
/// `Bearer account=<account>&api_key=<api_key>`. AppBuilder credentials
/// additionally produce `x-appbuilder-authorization: Bearer <token>`.
pub fn sign(credentials: &Credentials) -> Vec<(&'static str, String)> {
    let auth = format!(
        "Bearer account={}&api_key={}",
        credentials.account(),
        credentials.api_key()
    );
    match credentials {
        Credentials::Bce { .. } => vec![(headers::AUTHORIZATION, auth)],
        Credentials::AppBuilder {
            appbuilder_token, ..
        } => vec![
            (headers::AUTHORIZATION, auth),
            (
                headers::APPBUILDER_AUTHORIZATION,
                format!("Bearer {appbuilder_token}"),
            ),
        ],
    }
}
