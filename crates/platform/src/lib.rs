//! Platform build backend for arx.
//!
//! This crate provides the host-platform abstractions the build drivers
//! are written against:
//! - OS, architecture and target-triple modelling
//! - shell-mediated external command execution with environment injection
//! - atomic staged-install merge primitives

mod error;
mod exec;
mod platform;
mod stage;

pub use error::ExecError;
pub use exec::{Backend, CommandOutput, Workdir};
pub use platform::{Arch, Os, Platform};
pub use stage::{install_file, merge_tree};
