//! # Packbox CLI
//!
//! Build, inspect and unpack packbox containers from the command line.
//!
//! ## Commands
//!
//! - **pack**: files plus an optional JSON manifest into a box
//! - **unpack**: a box back into its manifest JSON and entry files
//! - **list**: entry offsets, lengths and SHA-256 digests
//! - **cat**: resolve a resource URI against a box and its directory
//! - **template**: write a manifest template
//! - **make-map**: serialize a JSON string map, optionally deflated
//!
//! Configuration comes from `PACKBOX_*` environment variables, optionally
//! overlaid by a TOML file (see [`Config`]).

pub mod commands;
pub mod config;

pub use config::Config;

use packbox::{BoxError, ErrorKind, ResourceError, SerializeError};

/// Classify a command failure by the first library error in its chain
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<BoxError>() {
            Some(e.kind())
        } else if let Some(e) = cause.downcast_ref::<SerializeError>() {
            Some(e.kind())
        } else if let Some(e) = cause.downcast_ref::<ResourceError>() {
            Some(e.kind())
        } else if cause.downcast_ref::<std::io::Error>().is_some() {
            Some(ErrorKind::Io)
        } else {
            None
        }
    })
}
