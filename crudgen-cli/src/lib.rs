//! crudgen CLI library

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod gofmt;
pub mod observability;
pub mod source;

pub use gofmt::Gofmt;
pub use source::{RecordSource, SourceArgs};
