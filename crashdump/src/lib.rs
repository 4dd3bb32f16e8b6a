// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! A parser for the minidump file format.
//!
//! The `crashdump` crate provides a parser for the
//! [minidump][minidump] file format as produced by Microsoft's
//! [`MinidumpWriteDump`][minidumpwritedump] API and the
//! [Google Breakpad][breakpad] and [Crashpad][crashpad] libraries.
//!
//! Only the streams a crash-reporting pipeline needs to identify a process are decoded:
//! [`MinidumpSystemInfo`], [`MinidumpMiscInfo`], [`MinidumpCrashpadInfo`] and
//! [`MinidumpException`]. Every other stream is still reachable as raw bytes through
//! [`Minidump::get_raw_stream`].
//!
//! # Usage
//!
//! The primary API for this crate is the [`Minidump`] struct, which can be
//! instantiated by calling the [`Minidump::read`] or [`Minidump::read_path`] methods.
//!
//! ```no_run
//! use crashdump::Minidump;
//!
//! fn main() -> Result<(), crashdump::Error> {
//!     let dump = Minidump::read_path("crash.dmp")?;
//!     let crashpad = dump.get_crashpad_info().unwrap_or_default();
//!     for module in &crashpad.module_list {
//!         if let Some(pid) = module.annotation_objects.get("pid") {
//!             println!("module {} pid {}", module.module_index, pid);
//!         }
//!     }
//!     let system_info = dump.get_system_info()?;
//!     println!("{} {}", system_info.os, system_info.cpu);
//!     Ok(())
//! }
//! ```
//!
//! [minidump]: https://msdn.microsoft.com/en-us/library/windows/desktop/ms680369%28v=vs.85%29.aspx
//! [minidumpwritedump]: https://msdn.microsoft.com/en-us/library/windows/desktop/ms680360%28v=vs.85%29.aspx
//! [breakpad]: https://chromium.googlesource.com/breakpad/breakpad/+/master/
//! [crashpad]: https://chromium.googlesource.com/crashpad/crashpad/+/master/README.md

pub use crashdump_format as format;
pub use scroll::Endian;

pub mod cursor;
mod minidump;
pub mod system_info;

pub use crate::cursor::{ByteCursor, OutOfBounds};
pub use crate::minidump::*;
