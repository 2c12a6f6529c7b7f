//! Ports (trait boundaries) for external dependencies.
//!
//! The exporter only needs a finite sequence of prediction batches. Where those
//! batches come from (a JSON Lines dump, an in-process evaluation loop) is
//! decided by the adapters implementing these traits.

pub mod batch_source;

pub use batch_source::BatchSource;
