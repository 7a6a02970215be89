//! Shared helpers for providers and the CLI

pub mod browser;
pub mod debug;
pub mod http;
