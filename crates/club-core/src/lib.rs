//! Core types and trait definitions for the club store.
//!
//! No database or I/O dependencies live here. Storage backends and the
//! `club` binary depend on this crate.

pub mod error;
pub mod member;
pub mod seed;
pub mod sport;
pub mod store;
pub mod subscription;
pub mod view;

pub use error::{Error, ErrorKind, Result};
