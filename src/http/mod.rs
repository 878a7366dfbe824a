//! HTTP boundary types.
//!
//! The router works on the framework-agnostic [`Request`] and [`Response`]
//! defined here. The `http` feature adds an axum transport that converts
//! between axum and these types.

mod request;
mod response;

#[cfg(feature = "http")]
mod server;

pub use request::Request;
pub use response::Response;

pub(crate) use request::find_cookie;

#[cfg(feature = "http")]
pub use server::{router, serve};
