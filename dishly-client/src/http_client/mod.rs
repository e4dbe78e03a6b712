//! HTTP plumbing for API calls.
//!
//! [`ClientRequest`] builds a request, a [`Transport`](crate::Transport)
//! sends it, and [`Response`] carries the answer back. Transport failures
//! and bad statuses surface as [`ClientError`].

mod error;
mod request;
mod response;

pub use error::{ClientError, Result};
pub use request::ClientRequest;
pub use response::Response;
