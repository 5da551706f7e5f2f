//! # erdview (app library)
//!
//! Library surface of the erdview binary, exposed so integration tests can
//! exercise the API router and CLI plumbing directly.

pub mod api;
pub mod cli;
