//! Core library for flatnet-tools
//!
//! This crate implements the **Functional Core** of the flatnet-tools
//! application, following the Functional Core - Imperative Shell
//! architectural pattern.
//!
//! The project uses a two-crate layout to enforce separation of concerns:
//!
//! - **`flatnet_core`** (this crate): Pure transformation functions with zero I/O
//! - **`flatnet`**: I/O operations and orchestration (the Imperative Shell)
//!
//! All functions in this crate are deterministic, perform no I/O, and can be
//! tested with simple fixture data - no mocking required. Where data comes
//! from (a document library, a git-hosted seed file, stdin) and where it goes
//! is the shell's business.
//!
//! # Module Organization
//!
//! - [`inventory`]: Dynamic host inventory built from the seed CSV
//! - [`report`]: The shared site-report schema, row routing, and accumulation
//! - [`convert`]: YAML document to report-table conversion
//! - [`text`]: Free-text sectioning helpers

pub mod convert;
pub mod inventory;
pub mod report;
pub mod text;
