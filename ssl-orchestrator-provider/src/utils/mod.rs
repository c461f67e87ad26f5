//! Shared utilities used by provider implementations.

pub mod domain;
