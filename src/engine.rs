//! Audio engine interface and the `rodio` backend.
//!
//! `types` holds the traits the player is written against; `rodio_backend`
//! is the production engine.

mod rodio_backend;
mod types;

pub use rodio_backend::RodioEngine;
pub use types::*;

#[cfg(test)]
pub(crate) mod testing;
