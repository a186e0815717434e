//! Shared test utilities for the scribe workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only — never published.
//!
//! # Modules
//!
//! - [`archive`] — [`ArchiveBuilder`] for real `.tar.gz` extension packages
//! - [`tool`] — [`StubTool`] executables that record how they were invoked

pub mod archive;
pub mod tool;

pub use archive::ArchiveBuilder;
pub use tool::{Invocation, StubTool};
