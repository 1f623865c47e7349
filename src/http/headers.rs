//! Header names used on the Mochow wire.

pub const AUTHORIZATION: &str = "authorization";
pub const APPBUILDER_AUTHORIZATION: &str = "x-appbuilder-authorization";
pub const CONTENT_LENGTH: &str = "content-length";
pub const CONTENT_TYPE: &str = "content-type";
pub const HOST: &str = "host";
pub const USER_AGENT: &str = "user-agent";
pub const ETAG: &str = "etag";

/// Date header recomputed on every signed attempt.
pub const BCE_DATE: &str = "x-bce-date";
/// Prefix of service metadata headers; stripped and normalized to `bce_`
/// in the response metadata bag.
pub const BCE_PREFIX: &str = "x-bce-";
pub const BCE_REQUEST_ID: &str = "x-bce-request-id";
