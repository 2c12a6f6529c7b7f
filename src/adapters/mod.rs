//! Adapters implementing domain ports.
//!
//! This module contains infrastructure implementations of the traits defined
//! in the ports module.

pub mod jsonl_batches;

pub use jsonl_batches::JsonlBatchSource;
