//! Subcommands of the `predexport` binary

pub mod export;
pub mod inspect;
