//! Typed client for the Novem REST API

pub mod client;
pub mod error;

pub use client::NovemApi;
pub use error::ApiError;
