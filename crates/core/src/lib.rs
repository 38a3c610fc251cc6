//! arx-core: the library build orchestration engine.
//!
//! This crate provides the pieces the `arx` CLI drives:
//! - `registry`: the static catalog of buildable libraries
//! - `context`: immutable per-run configuration shared by all drivers
//! - `driver`: one build driver per library, dispatched by name
//! - `store`: the shared install-prefix artifact convention
//! - `orchestrator`: dependency-ordered, strictly sequential execution

pub mod context;
pub mod driver;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod store;

pub use context::{BuildContext, ContextOptions};
pub use error::BuildError;
pub use orchestrator::{BuildOptions, BuildSummary, Orchestrator};
pub use store::{ArtifactSet, ArtifactStore};
