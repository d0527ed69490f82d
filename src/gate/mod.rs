//! Remote launch gate: decides whether a launch shows the native app or a
//! server-chosen web page.
//!
//! - [`request`] assembles the outbound URL from device metadata
//! - [`client`] sends it and hands the raw text to [`response`] for validation
//! - [`policy`] is an optional allow-list applied to trusted redirects

pub mod client;
pub mod policy;
pub mod request;
pub mod response;

pub use client::{GateClient, GateTransport, HttpTransport};
pub use policy::{PolicyViolation, UrlPolicy};
pub use request::{GateRequest, build_request, merge_query};
pub use response::{GateDecision, resolve, validate};
