//! Stock middleware stages.
//!
//! Each stage here is an ordinary [`Handler`](alacrity_core::Handler) the
//! application wires into whichever stack fits: query/body/route-variable
//! decoding, Basic-auth parsing, and response finalization. The dispatcher
//! never installs any of them implicitly.

pub mod basic_auth;
pub mod body;
pub mod close_response;
pub mod query;
pub mod route_params;

pub use basic_auth::ParseBasicAuth;
pub use body::{decode_params, ParseBody, ParseBodyParams, ReadBody, SkipBody};
pub use close_response::CloseResponse;
pub use query::ParseQueryParams;
pub use route_params::{DecodeRouteParams, ParseRouteParams};
