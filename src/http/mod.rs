//! HTTP transport: header constants, request signing, the response
//! envelope, and the blocking client with its retry loop.

pub mod client;
pub mod headers;
pub mod response;
pub mod signer;

pub use client::{HttpClient, Method};
pub use response::{HttpResponse, ResponseMetadata};
