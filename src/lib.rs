//! Publish-triggered purging of statically exported site pages.

pub mod application;
pub mod config;
pub mod domain;
pub mod export;
pub mod infra;
