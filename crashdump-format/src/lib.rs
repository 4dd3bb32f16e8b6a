//! This crate defines [structs for the on-disk minidump format](format/index.html) and
//! [the exception codes](errors/index.html) found in its exception stream.
//!
//! You probably don't want to use this crate directly, the `crashdump` crate provides
//! the actual functionality of reading minidumps using the structs defined here.

pub mod errors;
pub mod format;
