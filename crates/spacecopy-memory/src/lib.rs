//! In-memory space backend for spacecopy.
//!
//! This crate provides an implementation of every repository trait from
//! `spacecopy-api` on top of a single in-process space. It backs the engine's
//! tests and the CLI's offline simulation.
//!
//! # Example
//!
//! ```ignore
//! use spacecopy_memory::{InMemorySpace, SpaceFixture};
//!
//! let fixture = SpaceFixture::load("source.json")?;
//! let source = std::sync::Arc::new(InMemorySpace::from_fixture(fixture));
//! let summaries = source.service_summary().summaries_in_current_space().await?;
//! ```

pub mod fixture;
mod repos;
pub mod space;

pub use fixture::{FixtureError, OfferingFixture, SpaceFixture};
pub use space::{InMemorySpace, OperationKind, RecordedOperation};

// Re-export the session trait for convenience
pub use spacecopy_api::SpaceSession;

/// Creates a shareable session from a fixture.
pub fn create_session(fixture: SpaceFixture) -> std::sync::Arc<InMemorySpace> {
    std::sync::Arc::new(InMemorySpace::from_fixture(fixture))
}
