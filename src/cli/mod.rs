//! CLI infrastructure for the predexport tool
//!
//! This module provides the command-line interface for exporting and
//! inspecting JSON Lines dumps of prediction batches.

pub mod commands;
pub mod output;
