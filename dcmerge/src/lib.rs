#![allow(clippy::result_large_err)]
//! Merges several docker compose documents, from local paths or urls, into a single one.
//!
//! The merging itself is performed by [`docker_compose_config`].

pub mod cli;
pub mod errors;
pub mod fetcher;
pub mod fs;

pub use errors::*;
pub use fetcher::*;
pub use fs::*;
