//! Unit tests for backupchan-client
//!
//! These tests exercise the building blocks without a server.

mod config;
mod envelope;
