//! Shared protocol types for the Novem workspace client
//!
//! Defines the REST payload shapes, the resource taxonomy and the
//! messages exchanged between the host and the embedded viewer.

pub mod commands;
pub mod messages;
pub mod resource;

pub use commands::*;
pub use messages::*;
pub use resource::*;
