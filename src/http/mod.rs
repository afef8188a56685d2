//! JSON-over-HTTP transport for the generation service.

pub mod error;
pub mod handlers;
pub mod router;
