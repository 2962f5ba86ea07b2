#![allow(dead_code)]
//! Shared fixtures for the integration harnesses.

pub mod fixtures;

pub use fixtures::*;
