// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

use memmap2::Mmap;
use num_traits::FromPrimitive;
use scroll::ctx::{SizeWith, TryFromCtx};
use scroll::{BE, LE};
use std::borrow::Cow;
use std::collections::hash_map::{self, HashMap};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::ops::Deref;
use std::path::Path;
use std::time::{Duration, SystemTime};
use time::format_description::well_known::Rfc3339;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::cursor::{utf16_to_string, ByteCursor, OutOfBounds};
use crate::system_info::{Cpu, Os, PointerWidth};
use crashdump_format::errors as err;
use crashdump_format::format::{self as md, misc_info_offsets as misc};
use crashdump_format::format::{MiscInfoFlags, MiscInfoRevision, MINIDUMP_STREAM_TYPE};

/// An index into the contents of a minidump.
///
/// The `Minidump` struct represents the parsed header and
/// indices contained at the start of a minidump file. It can be instantiated
/// by calling the [`Minidump::read`][read] or
/// [`Minidump::read_path`][read_path] methods.
///
/// The header and stream directory are validated once, when the `Minidump` is created.
/// Streams are decoded on demand and every decoded record owns its data, so records
/// may outlive the `Minidump` they came from.
///
/// # Examples
///
/// ```no_run
/// use crashdump::Minidump;
///
/// # fn foo() -> Result<(), crashdump::Error> {
/// let dump = Minidump::read_path("crash.dmp")?;
/// # Ok(())
/// # }
/// ```
///
/// [read]: struct.Minidump.html#method.read
/// [read_path]: struct.Minidump.html#method.read_path
#[derive(Debug)]
pub struct Minidump<'a, T>
where
    T: Deref<Target = [u8]> + 'a,
{
    data: T,
    /// The raw minidump header from the file.
    pub header: md::MINIDUMP_HEADER,
    /// Stream type to (directory index, directory entry), first entry of each type only.
    streams: HashMap<u32, (u32, md::MINIDUMP_DIRECTORY)>,
    /// The endianness of this minidump file.
    pub endian: scroll::Endian,
    _phantom: PhantomData<&'a [u8]>,
}

/// Errors encountered while reading a `Minidump`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("File not found")]
    FileNotFound,
    #[error("I/O error: {0:?}")]
    IoError(io::ErrorKind),
    #[error("Missing minidump header (empty minidump?)")]
    MissingHeader,
    #[error("Header mismatch")]
    HeaderMismatch,
    #[error("Minidump version mismatch")]
    VersionMismatch,
    #[error(
        "Missing stream directory (heavily truncated minidump?): \
         needs {expected} bytes, file has {actual} bytes"
    )]
    MissingDirectory { expected: u64, actual: usize },
    #[error("Stream {0:#x} not found")]
    StreamNotFound(u32),
    #[error("Stream {stream_type:#x}: read of {len} bytes at offset {offset:#x} is out of bounds")]
    StreamOutOfBounds {
        stream_type: u32,
        offset: usize,
        len: usize,
    },
    #[error("Stream {stream_type:#x}: {reason}")]
    DataError {
        stream_type: u32,
        reason: &'static str,
    },
}

/// The broad classes of [`Error`], for callers that branch on the kind of failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The path did not resolve to a file.
    NotFound,
    /// The file exists but could not be read.
    ReadError,
    /// The header, directory, or a stream's location is malformed or truncated.
    InvalidFormat,
    /// The requested stream is not in the directory.
    StreamMissing,
    /// A stream was found but its contents broke one of its own invariants.
    DecodeError,
}

impl Error {
    /// Returns just the name of the error, as a more human-friendly version of
    /// an error-code for error logging.
    pub fn name(&self) -> &'static str {
        match self {
            Error::FileNotFound => "FileNotFound",
            Error::IoError(_) => "IoError",
            Error::MissingHeader => "MissingHeader",
            Error::HeaderMismatch => "HeaderMismatch",
            Error::VersionMismatch => "VersionMismatch",
            Error::MissingDirectory { .. } => "MissingDirectory",
            Error::StreamNotFound(_) => "StreamNotFound",
            Error::StreamOutOfBounds { .. } => "StreamOutOfBounds",
            Error::DataError { .. } => "DataError",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FileNotFound => ErrorKind::NotFound,
            Error::IoError(_) => ErrorKind::ReadError,
            Error::MissingHeader
            | Error::HeaderMismatch
            | Error::VersionMismatch
            | Error::MissingDirectory { .. }
            | Error::StreamOutOfBounds { .. } => ErrorKind::InvalidFormat,
            Error::StreamNotFound(_) => ErrorKind::StreamMissing,
            Error::DataError { .. } => ErrorKind::DecodeError,
        }
    }

    /// Attribute a failed cursor read to the stream `stream_type`.
    ///
    /// Meant for `.map_err(oob)?` chains inside a stream decoder.
    pub fn stream_bounds(stream_type: u32) -> impl Fn(OutOfBounds) -> Error + Copy {
        move |OutOfBounds { offset, len }| Error::StreamOutOfBounds {
            stream_type,
            offset,
            len,
        }
    }
}

/// The fundamental unit of data in a `Minidump`.
pub trait MinidumpStream: Sized {
    /// The stream type constant used in the `md::MINIDUMP_DIRECTORY` entry.
    /// This is usually a [MINIDUMP_STREAM_TYPE][] but it's left as a u32
    /// to allow external projects to add support for their own custom streams.
    const STREAM_TYPE: u32;

    /// Read this `MinidumpStream` type from `stream`.
    ///
    /// * `stream` is the contents of this specific stream.
    /// * `all` refers to the full contents of the minidump, for reading RVAs.
    ///
    /// Both cursors carry the byte order of the minidump.
    fn read(stream: ByteCursor<'_>, all: ByteCursor<'_>) -> Result<Self, Error>;
}

/// Information about the system that generated the minidump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinidumpSystemInfo {
    /// The `MINIDUMP_SYSTEM_INFO` direct from the minidump
    pub raw: md::MINIDUMP_SYSTEM_INFO,
    /// The operating system that generated the minidump
    pub os: Os,
    /// The CPU on which the minidump was generated
    pub cpu: Cpu,
    /// The service pack or OS build string, if it could be read
    csd_version: Option<String>,
    /// A string that describes the CPU, x86 family only
    cpu_info: Option<String>,
}

/// Miscellaneous information about the process that wrote the minidump.
///
/// Only the fields of `MINIDUMP_MISC_INFO` itself are always present. Every later field
/// is `Some` only when the declared `size_of_info` covers the revision that introduced
/// it *and* its guarding bit is set in `flags1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinidumpMiscInfo {
    /// The struct revision implied by `size_of_info`.
    pub revision: MiscInfoRevision,
    pub size_of_info: u32,
    /// The raw flags, including any unknown bits.
    pub flags1: u32,
    pub process_id: u32,
    /// Seconds since the unix epoch.
    pub process_create_time: u32,
    pub process_user_time: u32,
    pub process_kernel_time: u32,

    pub processor_max_mhz: Option<u32>,
    pub processor_current_mhz: Option<u32>,
    pub processor_mhz_limit: Option<u32>,
    pub processor_max_idle_state: Option<u32>,
    pub processor_current_idle_state: Option<u32>,

    pub process_integrity_level: Option<u32>,
    pub process_execute_flags: Option<u32>,
    pub protected_process: Option<u32>,
    pub time_zone_id: Option<u32>,
    pub time_zone: Option<MinidumpTimeZone>,

    pub build_string: Option<String>,
    pub dbg_bld_str: Option<String>,

    pub xstate_data: Option<MinidumpXStateConfig>,
    pub process_cookie: Option<u32>,
}

/// The time zone of the machine that wrote the minidump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinidumpTimeZone {
    /// Minutes to add to local time to get UTC.
    pub bias: i32,
    pub standard_name: String,
    /// When daylight saving time ends.
    pub standard_date: md::SYSTEMTIME,
    pub standard_bias: i32,
    pub daylight_name: String,
    /// When daylight saving time starts.
    pub daylight_date: md::SYSTEMTIME,
    pub daylight_bias: i32,
}

/// The XSAVE layout of the process, from `MINIDUMP_MISC_INFO_5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinidumpXStateConfig {
    pub size_of_info: u32,
    pub context_size: u32,
    pub enabled_features: u64,
    /// Descriptors of the enabled features only, in bit order.
    pub features: Vec<MinidumpXStateFeature>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MinidumpXStateFeature {
    /// The bit index in `enabled_features`.
    pub index: usize,
    /// The name of the feature, if it is a known one.
    pub name: Option<md::XstateFeatureIndex>,
    pub offset: u32,
    pub size: u32,
}

/// Additional Crashpad-specific information carried within a minidump file.
///
/// `Default` is an empty record, for callers that treat a missing stream as routine:
///
/// ```no_run
/// # fn foo() -> Result<(), crashdump::Error> {
/// let dump = crashdump::Minidump::read_path("crash.dmp")?;
/// let crashpad = dump.get_crashpad_info().unwrap_or_default();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinidumpCrashpadInfo {
    pub version: u32,
    pub report_id: Uuid,
    pub client_id: Uuid,
    /// Process-wide annotations.
    pub simple_annotations: BTreeMap<String, String>,
    pub module_list: Vec<MinidumpModuleCrashpadInfo>,
}

/// Annotations Crashpad collected from a single module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinidumpModuleCrashpadInfo {
    pub version: u32,
    /// Index of the module in the dump's module list. Not validated.
    pub module_index: u32,
    /// Unlabeled annotations, in the order they were written.
    pub list_annotations: Vec<String>,
    /// String annotations. A key written twice keeps its last value.
    pub simple_annotations: BTreeMap<String, String>,
    /// Typed annotations rendered as strings.
    ///
    /// Numbers are rendered in base 10, invalid annotations as `<invalid>` and
    /// client-defined types as `<user defined>`. Annotations with any other type are
    /// left out.
    pub annotation_objects: BTreeMap<String, String>,
}

/// Information about the exception that caused the minidump to be generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinidumpException {
    /// The raw exception information from the minidump stream.
    pub raw: md::MINIDUMP_EXCEPTION_STREAM,
    /// The thread that encountered this exception.
    pub thread_id: u32,
    pub exception_code: u32,
    pub exception_flags: u32,
    pub exception_address: u64,
    /// The valid entries of `exception_information`.
    pub parameters: Vec<u64>,
    /// The CPU context of the faulting thread, in the dump's native layout.
    ///
    /// Empty if the stream does not reference a context.
    pub context: Vec<u8>,
}

/// The reason for a process crash.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CrashReason {
    /// ExceptionCodeWindows::EXCEPTION_ACCESS_VIOLATION but with details on the kind of access.
    WindowsAccessViolation(err::ExceptionCodeWindowsAccessType),
    /// A Windows error code with no other interesting metadata.
    WindowsGeneral(err::ExceptionCodeWindows),
    /// A Mac/iOS error code with no other interesting details.
    MacGeneral(err::ExceptionCodeMac, u32),
    /// A Linux/Android error code with no other interesting metadata.
    LinuxGeneral(err::ExceptionCodeLinux, u32),
    /// An unknown exception code and flags.
    Unknown(u32, u32),
}

//======================================================
// Implementations

fn format_time_t(t: u32) -> String {
    time::OffsetDateTime::from_unix_timestamp(t as i64)
        .ok()
        .and_then(|datetime| datetime.format(&Rfc3339).ok())
        .unwrap_or_default()
}

fn format_system_time(time: &md::SYSTEMTIME) -> String {
    // Note this drops the day_of_week field on the ground -- is that fine?
    let format_date = || {
        use std::convert::TryFrom;
        let byte = |field: u16| u8::try_from(field).ok();
        let month = time::Month::try_from(byte(time.month)?).ok()?;
        let date =
            time::Date::from_calendar_date(time.year as i32, month, byte(time.day)?).ok()?;
        let datetime = date
            .with_hms_milli(
                byte(time.hour)?,
                byte(time.minute)?,
                byte(time.second)?,
                time.milliseconds,
            )
            .ok()?
            .assume_utc();
        datetime.format(&Rfc3339).ok()
    };
    format_date().unwrap_or_else(|| "<invalid date>".to_owned())
}

fn systemtime_from_timestamp(timestamp: u64) -> Option<SystemTime> {
    SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(timestamp))
}

/// Read a `u32`-count-prefixed list of `T` at `location`.
///
/// An empty location is an empty list.
fn read_list<'a, T>(
    all: ByteCursor<'a>,
    location: &md::MINIDUMP_LOCATION_DESCRIPTOR,
) -> Result<Vec<T>, OutOfBounds>
where
    T: TryFromCtx<'a, scroll::Endian, Error = scroll::Error> + SizeWith<scroll::Endian>,
{
    if location.data_size == 0 {
        return Ok(Vec::new());
    }
    let list = all.location(location)?;
    let count = list.read_u32(0)? as usize;
    list.read_fixed_array(4, count)
}

impl MinidumpStream for MinidumpSystemInfo {
    const STREAM_TYPE: u32 = MINIDUMP_STREAM_TYPE::SystemInfoStream as u32;

    fn read(stream: ByteCursor<'_>, all: ByteCursor<'_>) -> Result<MinidumpSystemInfo, Error> {
        let oob = Error::stream_bounds(Self::STREAM_TYPE);
        let raw: md::MINIDUMP_SYSTEM_INFO = stream.read(0).map_err(oob)?;
        let os = Os::from_platform_id(raw.platform_id);
        let cpu = Cpu::from_processor_architecture(raw.processor_architecture);

        // An unreadable CSD version leaves the rest of the stream usable.
        let csd_version = match raw.csd_version_rva {
            0 => None,
            rva => all.read_utf16_string(rva as usize).ok(),
        };

        // raw.cpu.data is actually a union which we resolve here.
        let cpu_info = match cpu {
            Cpu::X86 | Cpu::X86_64 => {
                let x86_info: md::X86CpuInfo = ByteCursor::new(&raw.cpu.data, stream.endian())
                    .read(0)
                    .map_err(oob)?;

                // The vendor's ID is an ascii string but we need to flatten out the u32's into u8's
                let vendor: String = x86_info
                    .vendor_id
                    .iter()
                    .flat_map(|i| i.to_le_bytes())
                    .filter(|&b| b != 0)
                    .map(char::from)
                    .collect();

                let mut cpu_info = String::new();
                if !vendor.is_empty() {
                    cpu_info.push_str(&vendor);
                    cpu_info.push(' ');
                }
                cpu_info.push_str(&format!(
                    "family {} model {} stepping {}",
                    raw.processor_level,
                    (raw.processor_revision >> 8) & 0xff,
                    raw.processor_revision & 0xff
                ));
                Some(cpu_info)
            }
            _ => None,
        };

        Ok(MinidumpSystemInfo {
            raw,
            os,
            cpu,
            csd_version,
            cpu_info,
        })
    }
}

impl MinidumpSystemInfo {
    /// Write a human-readable description of this `MinidumpSystemInfo` to `f`.
    ///
    /// This is very verbose, it is the format used by `crashdump_dump`.
    pub fn print<T: Write>(&self, f: &mut T) -> io::Result<()> {
        write!(
            f,
            "MINIDUMP_SYSTEM_INFO
  processor_architecture                     = {:#x}
  processor_level                            = {}
  processor_revision                         = {:#x}
  number_of_processors                       = {}
  product_type                               = {}
  major_version                              = {}
  minor_version                              = {}
  build_number                               = {}
  platform_id                                = {:#x}
  csd_version_rva                            = {:#x}
  suite_mask                                 = {:#x}
  (version)                                  = {} {}
  (os)                                       = {}
  (cpu)                                      = {}
  (cpu_info)                                 = {}

",
            self.raw.processor_architecture,
            self.raw.processor_level,
            self.raw.processor_revision,
            self.raw.number_of_processors,
            self.raw.product_type,
            self.raw.major_version,
            self.raw.minor_version,
            self.raw.build_number,
            self.raw.platform_id,
            self.raw.csd_version_rva,
            self.raw.suite_mask,
            self.os_version(),
            self.csd_version().unwrap_or(""),
            self.os.long_name(),
            self.cpu,
            self.cpu_info().unwrap_or(""),
        )?;
        Ok(())
    }

    /// If the minidump was generated on:
    /// - Windows: Returns the the name of the Service Pack.
    /// - macOS: Returns the product build number.
    /// - Linux: Returns the contents of `uname -srvmo`.
    pub fn csd_version(&self) -> Option<&str> {
        self.csd_version.as_deref()
    }

    /// Returns a string describing the cpu's vendor and model.
    pub fn cpu_info(&self) -> Option<&str> {
        self.cpu_info.as_deref()
    }

    /// The operating system version as `major.minor.build`.
    pub fn os_version(&self) -> String {
        format!(
            "{}.{}.{}",
            self.raw.major_version, self.raw.minor_version, self.raw.build_number
        )
    }

    pub fn number_of_processors(&self) -> u8 {
        self.raw.number_of_processors
    }
}

impl MinidumpTimeZone {
    fn from_raw(raw: &md::TIME_ZONE_INFORMATION) -> MinidumpTimeZone {
        MinidumpTimeZone {
            bias: raw.bias,
            standard_name: utf16_to_string(&raw.standard_name),
            standard_date: raw.standard_date,
            standard_bias: raw.standard_bias,
            daylight_name: utf16_to_string(&raw.daylight_name),
            daylight_date: raw.daylight_date,
            daylight_bias: raw.daylight_bias,
        }
    }
}

impl MinidumpXStateConfig {
    fn from_raw(raw: &md::XSTATE_CONFIG_FEATURE_MSC_INFO) -> MinidumpXStateConfig {
        let features = raw
            .iter()
            .map(|(index, feature)| MinidumpXStateFeature {
                index,
                name: md::XstateFeatureIndex::from_index(index),
                offset: feature.offset,
                size: feature.size,
            })
            .collect();
        MinidumpXStateConfig {
            size_of_info: raw.size_of_info,
            context_size: raw.context_size,
            enabled_features: raw.enabled_features,
            features,
        }
    }
}

impl MinidumpStream for MinidumpMiscInfo {
    const STREAM_TYPE: u32 = MINIDUMP_STREAM_TYPE::MiscInfoStream as u32;

    fn read(stream: ByteCursor<'_>, _all: ByteCursor<'_>) -> Result<MinidumpMiscInfo, Error> {
        use MiscInfoRevision::{V2, V3, V4, V5};

        let stream_type = Self::STREAM_TYPE;
        let oob = Error::stream_bounds(stream_type);

        // First resolve which revision of the struct this is...
        let size_of_info = stream.read_u32(misc::SIZE_OF_INFO).map_err(oob)?;
        let revision = MiscInfoRevision::from_size(size_of_info).ok_or(Error::DataError {
            stream_type,
            reason: "size_of_info is smaller than MINIDUMP_MISC_INFO",
        })?;
        let flags1 = stream.read_u32(misc::FLAGS1).map_err(oob)?;
        let flags = MiscInfoFlags::from_bits_retain(flags1);

        // ...then read each field only if both the revision and the flags allow it.
        let present = |since: MiscInfoRevision, flag: MiscInfoFlags| {
            revision >= since && flags.contains(flag)
        };
        let u32_field = |offset: usize, since: MiscInfoRevision, flag: MiscInfoFlags| {
            if present(since, flag) {
                stream.read_u32(offset).map(Some).map_err(oob)
            } else {
                Ok(None)
            }
        };

        let power_info = MiscInfoFlags::MINIDUMP_MISC1_PROCESSOR_POWER_INFO;
        let time_zone_flag = MiscInfoFlags::MINIDUMP_MISC3_TIMEZONE;

        let time_zone = if present(V3, time_zone_flag) {
            let raw: md::TIME_ZONE_INFORMATION = stream.read(misc::TIME_ZONE).map_err(oob)?;
            Some(MinidumpTimeZone::from_raw(&raw))
        } else {
            None
        };

        let (build_string, dbg_bld_str) =
            if present(V4, MiscInfoFlags::MINIDUMP_MISC4_BUILDSTRING) {
                let build_string = stream
                    .read_fixed_array::<u16>(misc::BUILD_STRING, misc::BUILD_STRING_CHARS)
                    .map_err(oob)?;
                let dbg_bld_str = stream
                    .read_fixed_array::<u16>(misc::DBG_BLD_STR, misc::DBG_BLD_STR_CHARS)
                    .map_err(oob)?;
                (
                    Some(utf16_to_string(&build_string)),
                    Some(utf16_to_string(&dbg_bld_str)),
                )
            } else {
                (None, None)
            };

        // There is no flag for the xstate data, an empty struct means it is absent.
        let xstate_data = if revision >= V5 {
            let raw: md::XSTATE_CONFIG_FEATURE_MSC_INFO =
                stream.read(misc::XSTATE_DATA).map_err(oob)?;
            if raw.size_of_info != 0 {
                Some(MinidumpXStateConfig::from_raw(&raw))
            } else {
                None
            }
        } else {
            None
        };

        Ok(MinidumpMiscInfo {
            revision,
            size_of_info,
            flags1,
            process_id: stream.read_u32(misc::PROCESS_ID).map_err(oob)?,
            process_create_time: stream.read_u32(misc::PROCESS_CREATE_TIME).map_err(oob)?,
            process_user_time: stream.read_u32(misc::PROCESS_USER_TIME).map_err(oob)?,
            process_kernel_time: stream.read_u32(misc::PROCESS_KERNEL_TIME).map_err(oob)?,

            processor_max_mhz: u32_field(misc::PROCESSOR_MAX_MHZ, V2, power_info)?,
            processor_current_mhz: u32_field(misc::PROCESSOR_CURRENT_MHZ, V2, power_info)?,
            processor_mhz_limit: u32_field(misc::PROCESSOR_MHZ_LIMIT, V2, power_info)?,
            processor_max_idle_state: u32_field(misc::PROCESSOR_MAX_IDLE_STATE, V2, power_info)?,
            processor_current_idle_state: u32_field(
                misc::PROCESSOR_CURRENT_IDLE_STATE,
                V2,
                power_info,
            )?,

            process_integrity_level: u32_field(
                misc::PROCESS_INTEGRITY_LEVEL,
                V3,
                MiscInfoFlags::MINIDUMP_MISC3_PROCESS_INTEGRITY,
            )?,
            process_execute_flags: u32_field(
                misc::PROCESS_EXECUTE_FLAGS,
                V3,
                MiscInfoFlags::MINIDUMP_MISC3_PROCESS_EXECUTE_FLAGS,
            )?,
            protected_process: u32_field(
                misc::PROTECTED_PROCESS,
                V3,
                MiscInfoFlags::MINIDUMP_MISC3_PROTECTED_PROCESS,
            )?,
            time_zone_id: u32_field(misc::TIME_ZONE_ID, V3, time_zone_flag)?,
            time_zone,

            build_string,
            dbg_bld_str,

            xstate_data,
            process_cookie: u32_field(
                misc::PROCESS_COOKIE,
                V5,
                MiscInfoFlags::MINIDUMP_MISC5_PROCESS_COOKIE,
            )?,
        })
    }
}

impl MinidumpMiscInfo {
    /// The known flags of `flags1`.
    pub fn flags(&self) -> MiscInfoFlags {
        MiscInfoFlags::from_bits_truncate(self.flags1)
    }

    pub fn process_create_time(&self) -> Option<SystemTime> {
        systemtime_from_timestamp(self.process_create_time as u64)
    }

    /// Write a human-readable description of this `MinidumpMiscInfo` to `f`.
    ///
    /// This is very verbose, it is the format used by `crashdump_dump`.
    pub fn print<T: Write>(&self, f: &mut T) -> io::Result<()> {
        macro_rules! write_optional_field {
            ($field:ident, $format:literal) => {
                write!(f, "  {:29}= ", stringify!($field))?;
                match self.$field {
                    Some($field) => writeln!(f, $format, $field)?,
                    None => writeln!(f, "(invalid)")?,
                }
            };
            ($field:ident) => {
                write_optional_field!($field, "{}");
            };
        }
        writeln!(f, "MINIDUMP_MISC_INFO")?;

        writeln!(f, "  size_of_info                 = {}", self.size_of_info)?;
        writeln!(f, "  (revision)                   = {:?}", self.revision)?;
        writeln!(f, "  flags1                       = {:x}", self.flags1)?;
        writeln!(f, "  process_id                   = {}", self.process_id)?;
        writeln!(
            f,
            "  process_create_time          = {:#x} {}",
            self.process_create_time,
            format_time_t(self.process_create_time),
        )?;
        writeln!(f, "  process_user_time            = {}", self.process_user_time)?;
        writeln!(f, "  process_kernel_time          = {}", self.process_kernel_time)?;

        write_optional_field!(processor_max_mhz);
        write_optional_field!(processor_current_mhz);
        write_optional_field!(processor_mhz_limit);
        write_optional_field!(processor_max_idle_state);
        write_optional_field!(processor_current_idle_state);

        write_optional_field!(process_integrity_level);
        write_optional_field!(process_execute_flags, "{:x}");
        write_optional_field!(protected_process);
        write_optional_field!(time_zone_id);

        write!(f, "  time_zone                    = ")?;
        match &self.time_zone {
            Some(time_zone) => {
                writeln!(f)?;
                writeln!(f, "    bias          = {}", time_zone.bias)?;
                writeln!(f, "    standard_name = {}", time_zone.standard_name)?;
                writeln!(
                    f,
                    "    standard_date = {}",
                    format_system_time(&time_zone.standard_date)
                )?;
                writeln!(f, "    standard_bias = {}", time_zone.standard_bias)?;
                writeln!(f, "    daylight_name = {}", time_zone.daylight_name)?;
                writeln!(
                    f,
                    "    daylight_date = {}",
                    format_system_time(&time_zone.daylight_date)
                )?;
                writeln!(f, "    daylight_bias = {}", time_zone.daylight_bias)?;
            }
            None => writeln!(f, "(invalid)")?,
        }

        writeln!(
            f,
            "  build_string                 = {}",
            self.build_string.as_deref().unwrap_or("(invalid)")
        )?;
        writeln!(
            f,
            "  dbg_bld_str                  = {}",
            self.dbg_bld_str.as_deref().unwrap_or("(invalid)")
        )?;

        write!(f, "  xstate_data                  = ")?;
        match &self.xstate_data {
            Some(xstate_data) => {
                writeln!(f)?;
                for feature in &xstate_data.features {
                    match feature.name {
                        Some(name) => {
                            let feature_name = format!("{:?}", name);
                            write!(f, "    feature {:2} - {:22}: ", feature.index, feature_name)?;
                        }
                        None => write!(
                            f,
                            "    feature {:2} - (unknown)             : ",
                            feature.index
                        )?,
                    }
                    writeln!(f, " offset {:4}, size {:4}", feature.offset, feature.size)?;
                }
            }
            None => writeln!(f, "(invalid)")?,
        }

        write_optional_field!(process_cookie);
        writeln!(f)?;
        Ok(())
    }
}

/// A typed annotation value, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MinidumpAnnotation {
    Invalid,
    String(String),
    U32(u32),
    U64(u64),
    I32(i32),
    I64(i64),
    UserDefined(u16),
}

impl MinidumpAnnotation {
    /// Decode the value of `raw` by its type tag.
    ///
    /// Returns `None` for a tag with no known rendering.
    fn read(all: ByteCursor<'_>, raw: &md::MINIDUMP_ANNOTATION) -> Result<Option<Self>, Error> {
        let oob = Error::stream_bounds(MinidumpCrashpadInfo::STREAM_TYPE);
        let value = match raw.ty {
            md::MINIDUMP_ANNOTATION::TYPE_INVALID => MinidumpAnnotation::Invalid,
            md::MINIDUMP_ANNOTATION::TYPE_STRING => {
                MinidumpAnnotation::String(all.read_utf8_string(raw.value as usize).map_err(oob)?)
            }
            md::MINIDUMP_ANNOTATION::TYPE_U32 => MinidumpAnnotation::U32(read_number(all, raw)?),
            md::MINIDUMP_ANNOTATION::TYPE_U64 => MinidumpAnnotation::U64(read_number(all, raw)?),
            md::MINIDUMP_ANNOTATION::TYPE_I32 => MinidumpAnnotation::I32(read_number(all, raw)?),
            md::MINIDUMP_ANNOTATION::TYPE_I64 => MinidumpAnnotation::I64(read_number(all, raw)?),
            ty if ty >= md::MINIDUMP_ANNOTATION::TYPE_USER_DEFINED => {
                MinidumpAnnotation::UserDefined(ty)
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

/// Read a numeric annotation value, a byte array exactly as wide as `T`.
fn read_number<'a, T>(all: ByteCursor<'a>, raw: &md::MINIDUMP_ANNOTATION) -> Result<T, Error>
where
    T: TryFromCtx<'a, scroll::Endian, Error = scroll::Error> + SizeWith<scroll::Endian>,
{
    let stream_type = MinidumpCrashpadInfo::STREAM_TYPE;
    let oob = Error::stream_bounds(stream_type);
    let bytes = all.read_byte_array(raw.value as usize).map_err(oob)?;
    if bytes.len() != T::size_with(&all.endian()) {
        return Err(Error::DataError {
            stream_type,
            reason: "numeric annotation has the wrong width",
        });
    }
    ByteCursor::new(bytes, all.endian()).read(0).map_err(oob)
}

impl fmt::Display for MinidumpAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinidumpAnnotation::Invalid => f.write_str("<invalid>"),
            MinidumpAnnotation::String(string) => f.write_str(string),
            MinidumpAnnotation::U32(value) => write!(f, "{}", value),
            MinidumpAnnotation::U64(value) => write!(f, "{}", value),
            MinidumpAnnotation::I32(value) => write!(f, "{}", value),
            MinidumpAnnotation::I64(value) => write!(f, "{}", value),
            MinidumpAnnotation::UserDefined(_) => f.write_str("<user defined>"),
        }
    }
}

fn read_string_list(
    all: ByteCursor<'_>,
    location: &md::MINIDUMP_LOCATION_DESCRIPTOR,
) -> Result<Vec<String>, OutOfBounds> {
    read_list::<md::RVA>(all, location)?
        .into_iter()
        .map(|rva| all.read_utf8_string(rva as usize))
        .collect()
}

fn read_simple_string_dictionary(
    all: ByteCursor<'_>,
    location: &md::MINIDUMP_LOCATION_DESCRIPTOR,
) -> Result<BTreeMap<String, String>, OutOfBounds> {
    let mut dictionary = BTreeMap::new();
    for entry in read_list::<md::MINIDUMP_SIMPLE_STRING_DICTIONARY_ENTRY>(all, location)? {
        let key = all.read_utf8_string(entry.key as usize)?;
        let value = all.read_utf8_string(entry.value as usize)?;
        dictionary.insert(key, value);
    }
    Ok(dictionary)
}

fn read_annotation_objects(
    all: ByteCursor<'_>,
    location: &md::MINIDUMP_LOCATION_DESCRIPTOR,
) -> Result<BTreeMap<String, String>, Error> {
    let oob = Error::stream_bounds(MinidumpCrashpadInfo::STREAM_TYPE);
    let mut annotations = BTreeMap::new();
    for raw in read_list::<md::MINIDUMP_ANNOTATION>(all, location).map_err(oob)? {
        match MinidumpAnnotation::read(all, &raw)? {
            Some(value) => {
                let name = all.read_utf8_string(raw.name as usize).map_err(oob)?;
                annotations.insert(name, value.to_string());
            }
            None => debug!(
                "skipping annotation at name rva {:#x} of unknown type {:#x}",
                raw.name, raw.ty
            ),
        }
    }
    Ok(annotations)
}

fn read_crashpad_module_links(
    all: ByteCursor<'_>,
    location: &md::MINIDUMP_LOCATION_DESCRIPTOR,
) -> Result<Vec<MinidumpModuleCrashpadInfo>, Error> {
    let oob = Error::stream_bounds(MinidumpCrashpadInfo::STREAM_TYPE);
    let links = read_list::<md::MINIDUMP_MODULE_CRASHPAD_INFO_LINK>(all, location).map_err(oob)?;

    let mut module_links = Vec::with_capacity(links.len());
    for link in links {
        let info: md::MINIDUMP_MODULE_CRASHPAD_INFO = all
            .location(&link.location)
            .and_then(|info| info.read(0))
            .map_err(oob)?;

        module_links.push(MinidumpModuleCrashpadInfo {
            version: info.version,
            module_index: link.minidump_module_list_index,
            list_annotations: read_string_list(all, &info.list_annotations).map_err(oob)?,
            simple_annotations: read_simple_string_dictionary(all, &info.simple_annotations)
                .map_err(oob)?,
            annotation_objects: read_annotation_objects(all, &info.annotation_objects)?,
        });
    }

    Ok(module_links)
}

fn guid_to_uuid(guid: &md::GUID) -> Uuid {
    Uuid::from_fields(guid.data1, guid.data2, guid.data3, &guid.data4)
}

impl MinidumpStream for MinidumpCrashpadInfo {
    const STREAM_TYPE: u32 = MINIDUMP_STREAM_TYPE::CrashpadInfoStream as u32;

    fn read(stream: ByteCursor<'_>, all: ByteCursor<'_>) -> Result<Self, Error> {
        let stream_type = Self::STREAM_TYPE;
        let oob = Error::stream_bounds(stream_type);
        let raw: md::MINIDUMP_CRASHPAD_INFO = stream.read(0).map_err(oob)?;

        if raw.version == 0 {
            // 0 is an invalid version, but all future versions are compatible with v1.
            return Err(Error::DataError {
                stream_type,
                reason: "crashpad info version 0 is invalid",
            });
        }

        let simple_annotations =
            read_simple_string_dictionary(all, &raw.simple_annotations).map_err(oob)?;

        let module_list = read_crashpad_module_links(all, &raw.module_list)?;

        Ok(Self {
            version: raw.version,
            report_id: guid_to_uuid(&raw.report_id),
            client_id: guid_to_uuid(&raw.client_id),
            simple_annotations,
            module_list,
        })
    }
}

impl MinidumpCrashpadInfo {
    /// Write a human-readable description of this `MinidumpCrashpadInfo` to `f`.
    ///
    /// This is very verbose, it is the format used by `crashdump_dump`.
    pub fn print<T: Write>(&self, f: &mut T) -> io::Result<()> {
        write!(
            f,
            "MDRawCrashpadInfo
  version = {}
  report_id = {}
  client_id = {}
",
            self.version, self.report_id, self.client_id,
        )?;

        for (name, value) in &self.simple_annotations {
            writeln!(f, "  simple_annotations[\"{}\"] = {}", name, value)?;
        }

        for (index, module) in self.module_list.iter().enumerate() {
            writeln!(
                f,
                "  module_list[{}].minidump_module_list_index = {}",
                index, module.module_index,
            )?;
            writeln!(f, "  module_list[{}].version = {}", index, module.version)?;

            for (annotation_index, annotation) in module.list_annotations.iter().enumerate() {
                writeln!(
                    f,
                    "  module_list[{}].list_annotations[{}] = {}",
                    index, annotation_index, annotation,
                )?;
            }

            for (name, value) in &module.simple_annotations {
                writeln!(
                    f,
                    "  module_list[{}].simple_annotations[\"{}\"] = {}",
                    index, name, value,
                )?;
            }

            for (name, value) in &module.annotation_objects {
                writeln!(
                    f,
                    "  module_list[{}].annotation_objects[\"{}\"] = {}",
                    index, name, value,
                )?;
            }
        }

        writeln!(f)?;

        Ok(())
    }
}

impl CrashReason {
    /// Get a `CrashReason` from a `MinidumpException` for a given `Os`.
    fn from_exception(exception: &MinidumpException, os: Os) -> CrashReason {
        let code = exception.exception_code;
        let flags = exception.exception_flags;
        match os {
            Os::Windows => match err::ExceptionCodeWindows::from_u32(code) {
                Some(err::ExceptionCodeWindows::EXCEPTION_ACCESS_VIOLATION) => {
                    // exception_information[0] is the kind of access, [1] the address.
                    match exception
                        .parameters
                        .first()
                        .and_then(|&ty| err::ExceptionCodeWindowsAccessType::from_u64(ty))
                    {
                        Some(ty) => CrashReason::WindowsAccessViolation(ty),
                        None => CrashReason::WindowsGeneral(
                            err::ExceptionCodeWindows::EXCEPTION_ACCESS_VIOLATION,
                        ),
                    }
                }
                Some(code) => CrashReason::WindowsGeneral(code),
                None => CrashReason::Unknown(code, flags),
            },
            Os::MacOs | Os::Ios => match err::ExceptionCodeMac::from_u32(code) {
                Some(code) => CrashReason::MacGeneral(code, flags),
                None => CrashReason::Unknown(code, flags),
            },
            Os::Linux | Os::Android => match err::ExceptionCodeLinux::from_u32(code) {
                Some(signal) => CrashReason::LinuxGeneral(signal, flags),
                None => CrashReason::Unknown(code, flags),
            },
            _ => CrashReason::Unknown(code, flags),
        }
    }
}

impl fmt::Display for CrashReason {
    /// A string describing the crash reason.
    ///
    /// This is OS-specific.
    /// For example, "EXCEPTION_ACCESS_VIOLATION_READ" (Windows),
    /// "EXC_BAD_ACCESS / 0x1" (Mac OS X), "SIGSEGV" (other Unix).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CrashReason::WindowsAccessViolation(ty) => {
                write!(f, "EXCEPTION_ACCESS_VIOLATION_{:?}", ty)
            }
            CrashReason::WindowsGeneral(code) => write!(f, "{:?}", code),
            CrashReason::MacGeneral(code, flags) => write!(f, "{:?} / {:#x}", code, flags),
            CrashReason::LinuxGeneral(signal, _) => write!(f, "{:?}", signal),
            CrashReason::Unknown(code, flags) => write!(f, "{:#010x} / {:#010x}", code, flags),
        }
    }
}

impl MinidumpStream for MinidumpException {
    const STREAM_TYPE: u32 = MINIDUMP_STREAM_TYPE::ExceptionStream as u32;

    fn read(stream: ByteCursor<'_>, all: ByteCursor<'_>) -> Result<Self, Error> {
        let oob = Error::stream_bounds(Self::STREAM_TYPE);
        let raw: md::MINIDUMP_EXCEPTION_STREAM = stream.read(0).map_err(oob)?;

        let record = &raw.exception_record;
        let declared = record.number_parameters as usize;
        if declared > md::EXCEPTION_MAXIMUM_PARAMETERS {
            warn!(
                "exception record declares {} parameters, only {} are stored",
                declared,
                md::EXCEPTION_MAXIMUM_PARAMETERS
            );
        }
        let parameters =
            record.exception_information[..declared.min(md::EXCEPTION_MAXIMUM_PARAMETERS)].to_vec();

        let context = if raw.thread_context.data_size == 0 {
            Vec::new()
        } else {
            all.location(&raw.thread_context)
                .map_err(oob)?
                .bytes()
                .to_vec()
        };

        Ok(MinidumpException {
            thread_id: raw.thread_id,
            exception_code: record.exception_code,
            exception_flags: record.exception_flags,
            exception_address: record.exception_address,
            parameters,
            context,
            raw,
        })
    }
}

impl MinidumpException {
    /// Get the address that "caused" the crash.
    ///
    /// The meaning of this value depends on the kind of crash this was.
    ///
    /// By default, it's the instruction pointer at the time of the crash.
    /// However, if the crash was caused by an illegal memory access, the
    /// the address would be the memory address.
    ///
    /// So for instance, if you crashed from dereferencing a null pointer,
    /// the crash_address will be 0 (or close to it, due to offsets).
    pub fn get_crash_address(&self, os: Os, cpu: Cpu) -> u64 {
        let addr = match (os, err::ExceptionCodeWindows::from_u32(self.exception_code)) {
            (Os::Windows, Some(err::ExceptionCodeWindows::EXCEPTION_ACCESS_VIOLATION))
            | (Os::Windows, Some(err::ExceptionCodeWindows::EXCEPTION_IN_PAGE_ERROR))
                if self.parameters.len() >= 2 =>
            {
                self.parameters[1]
            }
            _ => self.exception_address,
        };

        // Sometimes on 32-bit these values can be incorrectly sign-extended,
        // so mask and zero-extend them here.
        match cpu.pointer_width() {
            PointerWidth::Bits32 => addr as u32 as u64,
            _ => addr,
        }
    }

    /// Get the crash reason for an exception.
    ///
    /// The raw error codes are still available in [MinidumpException::raw][].
    pub fn get_crash_reason(&self, os: Os) -> CrashReason {
        CrashReason::from_exception(self, os)
    }

    /// The id of the thread that caused the crash (or otherwise requested
    /// the minidump, even if there wasn't actually a crash).
    pub fn get_crashing_thread_id(&self) -> u32 {
        self.thread_id
    }

    /// Write a human-readable description of this `MinidumpException` to `f`.
    ///
    /// This is very verbose, it is the format used by `crashdump_dump`.
    pub fn print<T: Write>(&self, f: &mut T) -> io::Result<()> {
        write!(
            f,
            "MINIDUMP_EXCEPTION
  thread_id                                  = {:#x}
  exception_record.exception_code            = {:#x}
  exception_record.exception_flags           = {:#x}
  exception_record.exception_record          = {:#x}
  exception_record.exception_address         = {:#x}
  exception_record.number_parameters         = {}
",
            self.thread_id,
            self.exception_code,
            self.exception_flags,
            self.raw.exception_record.exception_record,
            self.exception_address,
            self.raw.exception_record.number_parameters,
        )?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            writeln!(
                f,
                "  exception_record.exception_information[{:2}] = {:#x}",
                i, parameter
            )?;
        }
        write!(
            f,
            "  thread_context.data_size                   = {}
  thread_context.rva                         = {:#x}

",
            self.raw.thread_context.data_size, self.raw.thread_context.rva
        )?;
        Ok(())
    }
}

impl<'a> Minidump<'a, Mmap> {
    /// Read a `Minidump` from a `Path` to a file on disk.
    ///
    /// A path that does not name a regular file is [`Error::FileNotFound`].
    ///
    /// See [the type definition](Minidump.html) for an example.
    pub fn read_path<P>(path: P) -> Result<Minidump<'a, Mmap>, Error>
    where
        P: AsRef<Path>,
    {
        let f = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound,
            kind => Error::IoError(kind),
        })?;
        let metadata = f.metadata().map_err(|e| Error::IoError(e.kind()))?;
        if !metadata.is_file() {
            return Err(Error::FileNotFound);
        }
        if metadata.len() == 0 {
            return Err(Error::MissingHeader);
        }
        let mmap = unsafe { Mmap::map(&f).map_err(|e| Error::IoError(e.kind()))? };
        Minidump::read(mmap)
    }
}

impl<'a, T> Minidump<'a, T>
where
    T: Deref<Target = [u8]> + 'a,
{
    /// Read a `Minidump` from the provided `data`.
    ///
    /// Typically this will be a `Vec<u8>` or `&[u8]` with the full contents of the minidump,
    /// but you can also use something like `memmap2::Mmap`.
    pub fn read(data: T) -> Result<Minidump<'a, T>, Error> {
        let mut endian = LE;
        let mut header: md::MINIDUMP_HEADER = ByteCursor::new(data.deref(), endian)
            .read(0)
            .or(Err(Error::MissingHeader))?;
        if header.signature != md::MINIDUMP_SIGNATURE {
            if header.signature.swap_bytes() != md::MINIDUMP_SIGNATURE {
                return Err(Error::HeaderMismatch);
            }
            // Try again with big-endian.
            debug!("minidump signature is byte-swapped, reading as big-endian");
            endian = BE;
            header = ByteCursor::new(data.deref(), endian)
                .read(0)
                .or(Err(Error::MissingHeader))?;
            if header.signature != md::MINIDUMP_SIGNATURE {
                return Err(Error::HeaderMismatch);
            }
        }
        if (header.version & 0x0000ffff) != md::MINIDUMP_VERSION {
            return Err(Error::VersionMismatch);
        }

        let entry_size = md::MINIDUMP_DIRECTORY::size_with(&endian);
        let missing_directory = Error::MissingDirectory {
            expected: header.stream_directory_rva as u64
                + header.stream_count as u64 * entry_size as u64,
            actual: data.len(),
        };
        let entries = ByteCursor::new(data.deref(), endian)
            .read_fixed_array::<md::MINIDUMP_DIRECTORY>(
                header.stream_directory_rva as usize,
                header.stream_count as usize,
            )
            .or(Err(missing_directory))?;

        let mut streams = HashMap::with_capacity(entries.len());
        for (i, dir) in entries.into_iter().enumerate() {
            let i = i as u32;
            trace!(
                "directory[{}]: stream type {:#x}, {} bytes at {:#x}",
                i,
                dir.stream_type,
                dir.location.data_size,
                dir.location.rva
            );
            match streams.entry(dir.stream_type) {
                hash_map::Entry::Occupied(first) => {
                    let &(first_idx, ref first_dir): &(u32, md::MINIDUMP_DIRECTORY) = first.get();
                    warn!(
                        "Minidump contains multiple streams of type {:#x} ({}) at indices {} ({} bytes) and {} ({} bytes) (using {})",
                        dir.stream_type,
                        stream_name(dir.stream_type),
                        first_idx,
                        first_dir.location.data_size,
                        i,
                        dir.location.data_size,
                        first_idx,
                    );
                }
                hash_map::Entry::Vacant(slot) => {
                    slot.insert((i, dir));
                }
            }
        }

        Ok(Minidump {
            data,
            header,
            streams,
            endian,
            _phantom: PhantomData,
        })
    }

    /// A cursor over the whole minidump.
    fn cursor(&self) -> ByteCursor<'_> {
        ByteCursor::new(self.data.deref(), self.endian)
    }

    fn stream_cursor(&self, stream_type: u32) -> Result<ByteCursor<'_>, Error> {
        let (_, dir) = self
            .streams
            .get(&stream_type)
            .ok_or(Error::StreamNotFound(stream_type))?;
        self.cursor()
            .location(&dir.location)
            .map_err(Error::stream_bounds(stream_type))
    }

    /// Read and parse the specified [`MinidumpStream`][] `S` from the Minidump, if it exists.
    ///
    /// Because Minidump Streams can have totally different formats and meanings, the only
    /// way to coherently access one is by specifying a static type that provides an
    /// interpretation and interface of that format.
    ///
    /// A missing stream is always [`Error::StreamNotFound`]. A failure decoding one
    /// stream has no effect on any other.
    ///
    /// ## Currently Supported Streams
    ///
    /// * [`MinidumpCrashpadInfo`][]
    /// * [`MinidumpException`][]
    /// * [`MinidumpMiscInfo`][]
    /// * [`MinidumpSystemInfo`][]
    pub fn get_stream<S>(&self) -> Result<S, Error>
    where
        S: MinidumpStream,
    {
        let stream = self.stream_cursor(S::STREAM_TYPE)?;
        S::read(stream, self.cursor())
    }

    pub fn get_system_info(&self) -> Result<MinidumpSystemInfo, Error> {
        self.get_stream()
    }

    pub fn get_misc_info(&self) -> Result<MinidumpMiscInfo, Error> {
        self.get_stream()
    }

    pub fn get_crashpad_info(&self) -> Result<MinidumpCrashpadInfo, Error> {
        self.get_stream()
    }

    pub fn get_exception(&self) -> Result<MinidumpException, Error> {
        self.get_stream()
    }

    /// Get a stream of raw data from the minidump.
    ///
    /// This can be used to get the contents of arbitrary minidump streams.
    /// For streams of known types you almost certainly want to use
    /// [`Minidump::get_stream`][] instead.
    pub fn get_raw_stream(&self, stream_type: u32) -> Result<&[u8], Error> {
        Ok(self.stream_cursor(stream_type)?.bytes())
    }

    /// A listing of all the streams in the Minidump, in directory order.
    ///
    /// If there are multiple copies of the same stream (which should not happen for
    /// well-formed Minidumps), then only the first one is yielded.
    pub fn all_streams(&self) -> impl Iterator<Item = &md::MINIDUMP_DIRECTORY> + '_ {
        let mut streams = self.streams.values().collect::<Vec<_>>();
        streams.sort_by_key(|&&(i, _)| i);
        streams.into_iter().map(|(_, stream)| stream)
    }

    /// Write a verbose description of the `Minidump` to `f`.
    pub fn print<W: Write>(&self, f: &mut W) -> io::Result<()> {
        write!(
            f,
            r#"MDRawHeader
  signature            = {:#x}
  version              = {:#x}
  stream_count         = {}
  stream_directory_rva = {:#x}
  checksum             = {:#x}
  time_date_stamp      = {:#x} {}
  flags                = {:#x}

"#,
            self.header.signature,
            self.header.version,
            self.header.stream_count,
            self.header.stream_directory_rva,
            self.header.checksum,
            self.header.time_date_stamp,
            format_time_t(self.header.time_date_stamp),
            self.header.flags,
        )?;
        let mut streams = self.streams.values().collect::<Vec<_>>();
        streams.sort_by_key(|&&(i, _)| i);
        for &&(i, ref stream) in streams.iter() {
            write!(
                f,
                r#"mDirectory[{}]
MDRawDirectory
  stream_type        = {:#x} ({})
  location.data_size = {}
  location.rva       = {:#x}

"#,
                i,
                stream.stream_type,
                stream_name(stream.stream_type),
                stream.location.data_size,
                stream.location.rva
            )?;
        }
        writeln!(f, "Streams:")?;
        streams.sort_by_key(|&&(_, ref stream)| stream.stream_type);
        for &(i, ref stream) in streams {
            writeln!(
                f,
                "  stream type {:#x} ({}, {}) at index {}",
                stream.stream_type,
                stream_name(stream.stream_type),
                stream_vendor(stream.stream_type),
                i
            )?;
        }
        writeln!(f)?;
        Ok(())
    }
}

fn stream_name(stream_type: u32) -> Cow<'static, str> {
    if let Some(stream) = MINIDUMP_STREAM_TYPE::from_u32(stream_type) {
        Cow::Owned(format!("{:?}", stream))
    } else {
        Cow::Borrowed("unknown")
    }
}

/// Which vendor's range a stream type falls in.
pub fn stream_vendor(stream_type: u32) -> &'static str {
    if stream_type <= MINIDUMP_STREAM_TYPE::LastReservedStream as u32 {
        "Official"
    } else {
        match stream_type & 0xFFFF0000 {
            0x4767_0000 => "Google Extension",
            0x4350_0000 => "Crashpad Extension",
            0x4d7a_0000 => "Mozilla Extension",
            _ => "Unknown Extension",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crashdump_format::format::{PlatformId, ProcessorArchitecture, GUID, XSTATE_FEATURE};
    use crashdump_synth::{
        utf16_buffer, AnnotationObject, AnnotationValue, CrashpadInfo, CpuInfo, Exception, MiscFieldsBuildString,
        MiscFieldsPowerInfo, MiscFieldsProcessTimes, MiscFieldsTimeZone, MiscInfo5Fields,
        MiscStream, ModuleCrashpadInfo, SimpleStream, SynthMinidump, SystemInfo,
    };
    use test_assembler::*;

    fn read_synth_dump<'a>(dump: SynthMinidump) -> Result<Minidump<'a, Vec<u8>>, Error> {
        Minidump::read(dump.finish().unwrap())
    }

    fn empty_dump_bytes() -> Vec<u8> {
        SynthMinidump::with_endian(Endian::Little).finish().unwrap()
    }

    /// A module annotated the way Chromium tags its processes.
    fn process_annotations(endian: Endian, process_type: &str, pid: &str) -> SynthMinidump {
        let module = ModuleCrashpadInfo::new(0, endian)
            .add_annotation_object(
                "process_type",
                AnnotationValue::String(process_type.to_owned()),
            )
            .add_annotation_object("pid", AnnotationValue::String(pid.to_owned()));
        let crashpad_info = CrashpadInfo::new(endian).add_module(module);
        SynthMinidump::with_endian(endian).add_crashpad_info(crashpad_info)
    }

    fn annotation_objects(
        values: Vec<(&str, AnnotationValue)>,
    ) -> Result<BTreeMap<String, String>, Error> {
        let mut module = ModuleCrashpadInfo::new(0, Endian::Little);
        for (key, value) in values {
            module = module.add_annotation_object(key, value);
        }
        let crashpad_info = CrashpadInfo::new(Endian::Little).add_module(module);
        let dump = read_synth_dump(
            SynthMinidump::with_endian(Endian::Little).add_crashpad_info(crashpad_info),
        )?;
        let mut crashpad_info = dump.get_crashpad_info()?;
        Ok(crashpad_info.module_list.remove(0).annotation_objects)
    }

    fn misc_info_v4() -> MiscStream {
        let mut misc = MiscStream::new(Endian::Little);
        misc.process_id = Some(11423);
        misc.process_times = Some(MiscFieldsProcessTimes {
            process_create_time: 1699240689,
            process_user_time: 1,
            process_kernel_time: 1,
        });
        misc.power_info = Some(MiscFieldsPowerInfo {
            processor_max_mhz: 2900,
            processor_current_mhz: 2900,
            processor_mhz_limit: 0,
            processor_max_idle_state: 0,
            processor_current_idle_state: 0,
        });
        misc.time_zone = Some(MiscFieldsTimeZone {
            time_zone_id: 1,
            time_zone: md::TIME_ZONE_INFORMATION {
                bias: 480,
                standard_name: utf16_buffer("Pacific Standard Time"),
                standard_date: md::SYSTEMTIME {
                    month: 11,
                    day: 1,
                    hour: 2,
                    ..Default::default()
                },
                daylight_name: utf16_buffer("Pacific Daylight Time"),
                daylight_date: md::SYSTEMTIME {
                    month: 3,
                    day: 2,
                    hour: 2,
                    ..Default::default()
                },
                daylight_bias: -60,
                ..Default::default()
            },
        });
        misc.build_strings = Some(MiscFieldsBuildString {
            build_string: utf16_buffer("19041.1.amd64fre.vb_release.191206-1406"),
            dbg_bld_str: utf16_buffer("dbgcore.amd64,10.0.19041.1"),
        });
        misc
    }

    fn windows_exception(code: u32, parameters: &[u64]) -> Exception {
        let mut exception = Exception::new(Endian::Little);
        exception.thread_id = 0x1234;
        exception.exception_record.exception_code = code;
        exception.exception_record.exception_address = 0x7ff6_1000_2000;
        exception.exception_record.number_parameters = parameters.len() as u32;
        exception.exception_record.exception_information[..parameters.len()]
            .copy_from_slice(parameters);
        exception
    }

    #[test]
    fn test_simple_synth_dump() {
        const STREAM_TYPE: u32 = 0x11223344;
        let dump = SynthMinidump::with_endian(Endian::Little).add_stream(SimpleStream {
            stream_type: STREAM_TYPE,
            section: Section::with_endian(Endian::Little).D32(0x55667788),
        });
        let dump = read_synth_dump(dump).unwrap();
        assert_eq!(dump.endian, LE);
        assert_eq!(
            dump.get_raw_stream(STREAM_TYPE).unwrap(),
            &[0x88, 0x77, 0x66, 0x55]
        );

        assert_eq!(
            dump.get_raw_stream(0xaabbccddu32),
            Err(Error::StreamNotFound(0xaabbccdd))
        );
    }

    #[test]
    fn test_simple_synth_dump_bigendian() {
        const STREAM_TYPE: u32 = 0x11223344;
        let dump = SynthMinidump::with_endian(Endian::Big).add_stream(SimpleStream {
            stream_type: STREAM_TYPE,
            section: Section::with_endian(Endian::Big).D32(0x55667788),
        });
        let dump = read_synth_dump(dump).unwrap();
        assert_eq!(dump.endian, BE);
        assert_eq!(
            dump.get_raw_stream(STREAM_TYPE).unwrap(),
            &[0x55, 0x66, 0x77, 0x88]
        );
    }

    #[test]
    fn test_header_errors() {
        assert_eq!(
            Minidump::read(Vec::<u8>::new()).unwrap_err(),
            Error::MissingHeader
        );
        assert_eq!(
            Minidump::read(&empty_dump_bytes()[..31]).unwrap_err(),
            Error::MissingHeader
        );

        let mut bad_signature = empty_dump_bytes();
        bad_signature[0] = b'X';
        assert_eq!(
            Minidump::read(bad_signature).unwrap_err(),
            Error::HeaderMismatch
        );

        let mut bad_version = empty_dump_bytes();
        bad_version[4] = 0x94;
        let err = Minidump::read(bad_version).unwrap_err();
        assert_eq!(err, Error::VersionMismatch);
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);

        // The high bits of the version are implementation-specific.
        let mut vendor_version = empty_dump_bytes();
        vendor_version[6] = 0x12;
        vendor_version[7] = 0x34;
        assert!(Minidump::read(vendor_version).is_ok());
    }

    #[test]
    fn test_missing_directory() {
        let mut bytes = empty_dump_bytes();
        // Claim a directory entry that isn't there.
        bytes[8] = 1;
        let err = Minidump::read(bytes).unwrap_err();
        assert_eq!(
            err,
            Error::MissingDirectory {
                expected: 44,
                actual: 32,
            }
        );
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);

        let mut bytes = empty_dump_bytes();
        bytes[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        bytes[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(
            Minidump::read(bytes).unwrap_err().name(),
            "MissingDirectory"
        );
    }

    #[test]
    fn test_duplicate_streams_first_wins() {
        const STREAM_TYPE: u32 = 0x11223344;
        let dump = SynthMinidump::with_endian(Endian::Little)
            .add_stream(SimpleStream {
                stream_type: STREAM_TYPE,
                section: Section::with_endian(Endian::Little).D32(1),
            })
            .add_stream(SimpleStream {
                stream_type: STREAM_TYPE,
                section: Section::with_endian(Endian::Little).D32(2),
            });
        let dump = read_synth_dump(dump).unwrap();
        assert_eq!(dump.get_raw_stream(STREAM_TYPE).unwrap(), &[1, 0, 0, 0]);
        assert_eq!(dump.all_streams().count(), 1);
    }

    #[test]
    fn test_duplicate_system_info_first_wins() {
        let linux = SystemInfo::new(Endian::Little)
            .set_platform_id(PlatformId::Linux as u32)
            .set_processor_architecture(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_ARM64 as u16);
        let windows = SystemInfo::new(Endian::Little)
            .set_platform_id(PlatformId::VER_PLATFORM_WIN32_NT as u32);
        let dump = SynthMinidump::with_endian(Endian::Little)
            .add_stream(linux)
            .add_stream(windows);
        let dump = read_synth_dump(dump).unwrap();
        let system_info = dump.get_system_info().unwrap();
        assert_eq!(system_info.os, Os::Linux);
        assert_eq!(system_info.cpu, Cpu::Arm64);
    }

    #[test]
    fn test_stream_out_of_bounds() {
        let dump = SynthMinidump::with_endian(Endian::Little)
            .add_raw_directory_entry(MinidumpSystemInfo::STREAM_TYPE, 56, 0x10000)
            .add_misc_info(misc_info_v4());
        let dump = read_synth_dump(dump).unwrap();

        let err = dump.get_system_info().unwrap_err();
        assert_eq!(
            err,
            Error::StreamOutOfBounds {
                stream_type: MinidumpSystemInfo::STREAM_TYPE,
                offset: 0x10000,
                len: 56,
            }
        );
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert!(dump.get_raw_stream(MinidumpSystemInfo::STREAM_TYPE).is_err());

        // Other streams are unaffected.
        assert_eq!(dump.get_misc_info().unwrap().process_id, 11423);
    }

    #[test]
    fn test_all_streams_directory_order() {
        let dump = SynthMinidump::with_endian(Endian::Little)
            .add_stream(SimpleStream {
                stream_type: 0x30,
                section: Section::with_endian(Endian::Little).D32(0),
            })
            .add_stream(SimpleStream {
                stream_type: 0x10,
                section: Section::with_endian(Endian::Little).D32(0),
            })
            .add_stream(SimpleStream {
                stream_type: 0x20,
                section: Section::with_endian(Endian::Little).D32(0),
            });
        let dump = read_synth_dump(dump).unwrap();
        let types = dump
            .all_streams()
            .map(|stream| stream.stream_type)
            .collect::<Vec<_>>();
        assert_eq!(types, vec![0x30, 0x10, 0x20]);
    }

    #[test]
    fn test_missing_streams() {
        let dump = read_synth_dump(SynthMinidump::with_endian(Endian::Little)).unwrap();
        assert_eq!(
            dump.get_system_info().unwrap_err(),
            Error::StreamNotFound(MinidumpSystemInfo::STREAM_TYPE)
        );
        assert_eq!(
            dump.get_misc_info().unwrap_err(),
            Error::StreamNotFound(MinidumpMiscInfo::STREAM_TYPE)
        );
        assert_eq!(
            dump.get_exception().unwrap_err(),
            Error::StreamNotFound(MinidumpException::STREAM_TYPE)
        );
        let err = dump.get_crashpad_info().unwrap_err();
        assert_eq!(err, Error::StreamNotFound(0x43500001));
        assert_eq!(err.kind(), ErrorKind::StreamMissing);

        let crashpad_info = dump.get_crashpad_info().unwrap_or_default();
        assert!(crashpad_info.module_list.is_empty());
        assert!(crashpad_info.simple_annotations.is_empty());
    }

    #[test]
    fn test_system_info_macos() {
        let system_info = SystemInfo::new(Endian::Little)
            .set_platform_id(PlatformId::MacOs as u32)
            .set_processor_architecture(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_AMD64 as u16);
        let dump = SynthMinidump::with_endian(Endian::Little).add_system_info(system_info);
        let dump = read_synth_dump(dump).unwrap();
        let system_info = dump.get_system_info().unwrap();
        assert_eq!(system_info.os, Os::MacOs);
        assert_eq!(system_info.cpu, Cpu::X86_64);
        assert_eq!(system_info.os.tag(), "macOs");
        assert_eq!(system_info.cpu.tag(), "x86_64");
        assert_eq!(system_info.csd_version(), None);
    }

    #[test]
    fn test_system_info_details() {
        let mut system_info = SystemInfo::new(Endian::Little)
            .set_platform_id(PlatformId::VER_PLATFORM_WIN32_NT as u32)
            .set_processor_architecture(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_INTEL as u16);
        system_info.processor_level = 6;
        system_info.processor_revision = 0x9e0a;
        system_info.number_of_processors = 8;
        system_info.major_version = 10;
        system_info.minor_version = 0;
        system_info.build_number = 19045;
        system_info.csd_version = Some("Service Pack 1".to_owned());
        system_info.cpu = CpuInfo::X86CpuInfo {
            vendor_id: [
                u32::from_le_bytes(*b"Genu"),
                u32::from_le_bytes(*b"ineI"),
                u32::from_le_bytes(*b"ntel"),
            ],
            version_information: 0,
            feature_information: 0,
            amd_extended_cpu_features: 0,
        };
        let dump = SynthMinidump::with_endian(Endian::Little).add_system_info(system_info);
        let dump = read_synth_dump(dump).unwrap();
        let system_info = dump.get_system_info().unwrap();
        assert_eq!(system_info.os, Os::Windows);
        assert_eq!(system_info.cpu, Cpu::X86);
        assert_eq!(system_info.csd_version(), Some("Service Pack 1"));
        assert_eq!(
            system_info.cpu_info(),
            Some("GenuineIntel family 6 model 158 stepping 10")
        );
        assert_eq!(system_info.number_of_processors(), 8);
        assert_eq!(system_info.os_version(), "10.0.19045");
    }

    #[test]
    fn test_system_info_unknown_codes() {
        let system_info = SystemInfo::new(Endian::Little)
            .set_platform_id(0x9999)
            .set_processor_architecture(0x7777);
        let dump = SynthMinidump::with_endian(Endian::Little).add_system_info(system_info);
        let dump = read_synth_dump(dump).unwrap();
        let system_info = dump.get_system_info().unwrap();
        assert_eq!(system_info.os, Os::Unknown(0x9999));
        assert_eq!(system_info.cpu, Cpu::Unknown(0x7777));
        assert_eq!(system_info.cpu_info(), None);
    }

    #[test]
    fn test_system_info_truncated() {
        let dump = SynthMinidump::with_endian(Endian::Little).add_stream(SimpleStream {
            stream_type: MinidumpSystemInfo::STREAM_TYPE,
            section: Section::with_endian(Endian::Little).D32(0).D32(0x8101),
        });
        let dump = read_synth_dump(dump).unwrap();
        assert_eq!(
            dump.get_system_info().unwrap_err(),
            Error::StreamOutOfBounds {
                stream_type: MinidumpSystemInfo::STREAM_TYPE,
                offset: 0,
                len: 56,
            }
        );
    }

    #[test]
    fn test_system_info_bigendian() {
        let system_info = SystemInfo::new(Endian::Big)
            .set_platform_id(PlatformId::Linux as u32)
            .set_processor_architecture(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_PPC64 as u16);
        let dump = SynthMinidump::with_endian(Endian::Big).add_system_info(system_info);
        let dump = read_synth_dump(dump).unwrap();
        let system_info = dump.get_system_info().unwrap();
        assert_eq!(system_info.os, Os::Linux);
        assert_eq!(system_info.cpu, Cpu::Ppc64);
    }

    #[test]
    fn test_misc_info() {
        let dump = SynthMinidump::with_endian(Endian::Little).add_misc_info(misc_info_v4());
        let dump = read_synth_dump(dump).unwrap();
        let misc = dump.get_misc_info().unwrap();
        assert_eq!(misc.size_of_info, 832);
        assert_eq!(misc.revision, MiscInfoRevision::V4);
        assert_eq!(misc.flags1, 327);
        assert_eq!(misc.process_id, 11423);
        assert_eq!(misc.process_create_time, 1699240689);
        assert_eq!(misc.process_kernel_time, 1);
        assert_eq!(misc.process_user_time, 1);
        assert_eq!(misc.processor_current_mhz, Some(2900));
        assert_eq!(misc.processor_max_mhz, Some(2900));
        assert_eq!(misc.processor_current_idle_state, Some(0));
        assert_eq!(misc.processor_max_idle_state, Some(0));
        assert_eq!(misc.processor_mhz_limit, Some(0));
        assert_eq!(
            misc.process_create_time(),
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1699240689))
        );

        // Defined by this revision, but not flagged.
        assert_eq!(misc.process_integrity_level, None);
        assert_eq!(misc.process_execute_flags, None);
        assert_eq!(misc.protected_process, None);
        // Not defined by this revision.
        assert_eq!(misc.xstate_data, None);
        assert_eq!(misc.process_cookie, None);

        assert_eq!(misc.time_zone_id, Some(1));
        let time_zone = misc.time_zone.as_ref().unwrap();
        assert_eq!(time_zone.bias, 480);
        assert_eq!(time_zone.standard_name, "Pacific Standard Time");
        assert_eq!(time_zone.daylight_name, "Pacific Daylight Time");
        assert_eq!(time_zone.daylight_bias, -60);
        assert_eq!(time_zone.standard_date.month, 11);

        assert_eq!(
            misc.build_string.as_deref(),
            Some("19041.1.amd64fre.vb_release.191206-1406")
        );
        assert_eq!(misc.dbg_bld_str.as_deref(), Some("dbgcore.amd64,10.0.19041.1"));

        // Decoding is a pure function of the dump.
        assert_eq!(dump.get_misc_info().unwrap(), misc);
    }

    #[test]
    fn test_misc_info_flag_flip() {
        let mut misc = misc_info_v4();
        misc.flags1 = Some(327 & !MiscInfoFlags::MINIDUMP_MISC1_PROCESSOR_POWER_INFO.bits());
        let dump = SynthMinidump::with_endian(Endian::Little).add_misc_info(misc);
        let dump = read_synth_dump(dump).unwrap();
        let misc = dump.get_misc_info().unwrap();
        assert_eq!(misc.size_of_info, 832);
        assert_eq!(misc.processor_max_mhz, None);
        assert_eq!(misc.processor_current_mhz, None);
        assert_eq!(misc.processor_mhz_limit, None);
        assert_eq!(misc.processor_max_idle_state, None);
        assert_eq!(misc.processor_current_idle_state, None);
        // Everything else is still there.
        assert_eq!(misc.process_id, 11423);
        assert!(misc.time_zone.is_some());
        assert!(misc.build_string.is_some());

        let mut misc = misc_info_v4();
        misc.flags1 = Some(327 & !MiscInfoFlags::MINIDUMP_MISC3_TIMEZONE.bits());
        let dump = SynthMinidump::with_endian(Endian::Little).add_misc_info(misc);
        let dump = read_synth_dump(dump).unwrap();
        let misc = dump.get_misc_info().unwrap();
        assert_eq!(misc.time_zone_id, None);
        assert_eq!(misc.time_zone, None);
        assert_eq!(misc.processor_max_mhz, Some(2900));
    }

    #[test]
    fn test_misc_info_revision_gates_fields() {
        let mut misc = MiscStream::new(Endian::Little);
        misc.process_id = Some(42);
        // Flags for fields a MINIDUMP_MISC_INFO doesn't have.
        misc.flags1 = Some(0x3ff);
        let dump = SynthMinidump::with_endian(Endian::Little).add_misc_info(misc);
        let dump = read_synth_dump(dump).unwrap();
        let misc = dump.get_misc_info().unwrap();
        assert_eq!(misc.size_of_info, 24);
        assert_eq!(misc.revision, MiscInfoRevision::V1);
        assert_eq!(misc.process_id, 42);
        assert_eq!(misc.processor_max_mhz, None);
        assert_eq!(misc.process_integrity_level, None);
        assert_eq!(misc.time_zone, None);
        assert_eq!(misc.build_string, None);
        assert_eq!(misc.process_cookie, None);
    }

    #[test]
    fn test_misc_info_too_small() {
        let mut misc = MiscStream::new(Endian::Little);
        misc.process_id = Some(42);
        misc.size_of_info = Some(16);
        let dump = SynthMinidump::with_endian(Endian::Little).add_misc_info(misc);
        let dump = read_synth_dump(dump).unwrap();
        let err = dump.get_misc_info().unwrap_err();
        assert!(matches!(
            err,
            Error::DataError {
                stream_type: 15,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::DecodeError);
    }

    #[test]
    fn test_misc_info_truncated() {
        let mut misc = MiscStream::new(Endian::Little);
        misc.process_id = Some(42);
        misc.flags1 = Some(0x7);
        // Claims to be a MINIDUMP_MISC_INFO_2 but only has room for the first revision.
        misc.size_of_info = Some(44);
        let dump = SynthMinidump::with_endian(Endian::Little).add_misc_info(misc);
        let dump = read_synth_dump(dump).unwrap();
        assert_eq!(
            dump.get_misc_info().unwrap_err(),
            Error::StreamOutOfBounds {
                stream_type: 15,
                offset: 24,
                len: 4,
            }
        );
    }

    #[test]
    fn test_misc_info_5() {
        let mut xstate_data = md::XSTATE_CONFIG_FEATURE_MSC_INFO::default();
        xstate_data.context_size = 0x3c0;
        xstate_data.enabled_features = 0b111;
        xstate_data.features[0] = XSTATE_FEATURE {
            offset: 0,
            size: 160,
        };
        xstate_data.features[1] = XSTATE_FEATURE {
            offset: 160,
            size: 256,
        };
        xstate_data.features[2] = XSTATE_FEATURE {
            offset: 576,
            size: 256,
        };
        // Not enabled.
        xstate_data.features[5] = XSTATE_FEATURE {
            offset: 1000,
            size: 64,
        };

        let mut misc = MiscStream::new(Endian::Little);
        misc.process_id = Some(1);
        misc.misc_5 = Some(MiscInfo5Fields {
            xstate_data,
            process_cookie: Some(0xc0ffee),
        });
        let dump = SynthMinidump::with_endian(Endian::Little).add_misc_info(misc);
        let dump = read_synth_dump(dump).unwrap();
        let misc = dump.get_misc_info().unwrap();
        assert_eq!(misc.revision, MiscInfoRevision::V5);
        assert_eq!(misc.size_of_info, 1364);
        assert_eq!(misc.process_cookie, Some(0xc0ffee));

        let xstate = misc.xstate_data.unwrap();
        assert_eq!(xstate.size_of_info, 528);
        assert_eq!(xstate.context_size, 0x3c0);
        assert_eq!(xstate.features.len(), 3);
        assert_eq!(
            xstate.features[2],
            MinidumpXStateFeature {
                index: 2,
                name: Some(md::XstateFeatureIndex::GSSE_AND_AVX),
                offset: 576,
                size: 256,
            }
        );
    }

    #[test]
    fn test_misc_info_5_without_optional_parts() {
        let mut xstate_data = md::XSTATE_CONFIG_FEATURE_MSC_INFO::default();
        xstate_data.size_of_info = 0;
        let mut misc = MiscStream::new(Endian::Little);
        misc.misc_5 = Some(MiscInfo5Fields {
            xstate_data,
            process_cookie: None,
        });
        let dump = SynthMinidump::with_endian(Endian::Little).add_misc_info(misc);
        let dump = read_synth_dump(dump).unwrap();
        let misc = dump.get_misc_info().unwrap();
        assert_eq!(misc.revision, MiscInfoRevision::V5);
        assert_eq!(misc.xstate_data, None);
        assert_eq!(misc.process_cookie, None);
    }

    #[test]
    fn test_crashpad_info_browser() {
        let dump =
            read_synth_dump(process_annotations(Endian::Little, "browser", "11423")).unwrap();
        let crashpad_info = dump.get_crashpad_info().unwrap();
        assert_eq!(crashpad_info.module_list.len(), 1);
        let module = &crashpad_info.module_list[0];
        assert_eq!(module.module_index, 0);
        assert_eq!(module.annotation_objects["process_type"], "browser");
        assert_eq!(module.annotation_objects["pid"], "11423");
    }

    #[test]
    fn test_crashpad_info_renderer() {
        let dump =
            read_synth_dump(process_annotations(Endian::Little, "renderer", "11795")).unwrap();
        let crashpad_info = dump.get_crashpad_info().unwrap();
        let module = &crashpad_info.module_list[0];
        assert_eq!(module.annotation_objects["process_type"], "renderer");
        assert_eq!(module.annotation_objects["pid"], "11795");
    }

    #[test]
    fn test_crashpad_info_bigendian() {
        let module = ModuleCrashpadInfo::new(3, Endian::Big)
            .add_annotation_object("pid", AnnotationValue::U32(11423))
            .add_simple_annotation("channel", "beta");
        let crashpad_info = CrashpadInfo::new(Endian::Big).add_module(module);
        let dump = SynthMinidump::with_endian(Endian::Big).add_crashpad_info(crashpad_info);
        let dump = read_synth_dump(dump).unwrap();
        let crashpad_info = dump.get_crashpad_info().unwrap();
        let module = &crashpad_info.module_list[0];
        assert_eq!(module.module_index, 3);
        assert_eq!(module.annotation_objects["pid"], "11423");
        assert_eq!(module.simple_annotations["channel"], "beta");
    }

    #[test]
    fn test_crashpad_info_annotations() {
        let report_id = GUID {
            data1: 0x01020304,
            data2: 0x0506,
            data3: 0x0708,
            data4: [0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10],
        };
        let module = ModuleCrashpadInfo::new(42, Endian::Little)
            .add_list_annotation("first")
            .add_list_annotation("second")
            .add_simple_annotation("ptype", "gpu")
            .add_simple_annotation("ptype", "utility")
            .add_simple_annotation("lsb", "beta");
        let crashpad_info = CrashpadInfo::new(Endian::Little)
            .report_id(report_id)
            .add_simple_annotation("prod", "Chrome")
            .add_module(module)
            .add_module(ModuleCrashpadInfo::new(1, Endian::Little));
        let dump = SynthMinidump::with_endian(Endian::Little).add_crashpad_info(crashpad_info);
        let dump = read_synth_dump(dump).unwrap();
        let crashpad_info = dump.get_crashpad_info().unwrap();

        assert_eq!(crashpad_info.version, 1);
        assert_eq!(
            crashpad_info.report_id.to_string(),
            "01020304-0506-0708-090a-0b0c0d0e0f10"
        );
        assert!(crashpad_info.client_id.is_nil());
        assert_eq!(crashpad_info.simple_annotations["prod"], "Chrome");

        assert_eq!(crashpad_info.module_list.len(), 2);
        let module = &crashpad_info.module_list[0];
        // Not checked against any module list.
        assert_eq!(module.module_index, 42);
        assert_eq!(module.version, 1);
        assert_eq!(module.list_annotations, vec!["first", "second"]);
        // Last write wins.
        assert_eq!(module.simple_annotations["ptype"], "utility");
        assert_eq!(module.simple_annotations.len(), 2);
        assert!(module.annotation_objects.is_empty());

        let empty = &crashpad_info.module_list[1];
        assert_eq!(empty.module_index, 1);
        assert!(empty.list_annotations.is_empty());
        assert!(empty.simple_annotations.is_empty());
    }

    #[test]
    fn test_crashpad_numeric_annotations() {
        let annotations = annotation_objects(vec![
            ("u32", AnnotationValue::U32(7)),
            ("u64", AnnotationValue::U64(u64::MAX)),
            ("i32", AnnotationValue::I32(-5)),
            ("i64", AnnotationValue::I64(i64::MIN)),
            ("zero", AnnotationValue::U64(0)),
        ])
        .unwrap();
        assert_eq!(annotations["u32"], "7");
        assert_eq!(annotations["u64"], "18446744073709551615");
        assert_eq!(annotations["i32"], "-5");
        assert_eq!(annotations["i64"], "-9223372036854775808");
        assert_eq!(annotations["zero"], "0");
    }

    #[test]
    fn test_crashpad_other_annotation_types() {
        let annotations = annotation_objects(vec![
            ("invalid", AnnotationValue::Invalid),
            ("custom", AnnotationValue::Custom(0x8001, vec![1, 2, 3])),
            ("mystery", AnnotationValue::Custom(0x7, vec![1, 2, 3])),
            ("string", AnnotationValue::String("text".to_owned())),
        ])
        .unwrap();
        assert_eq!(annotations["invalid"], "<invalid>");
        assert_eq!(annotations["custom"], "<user defined>");
        assert_eq!(annotations["string"], "text");
        assert!(!annotations.contains_key("mystery"));
        assert_eq!(annotations.len(), 3);
    }

    #[test]
    fn test_crashpad_unknown_annotation_with_bad_name() {
        let module = ModuleCrashpadInfo::new(0, Endian::Little)
            .add_raw_annotation_object(AnnotationObject::with_raw_rvas(
                0xffff0000,
                0x7,
                0,
                Endian::Little,
            ))
            .add_annotation_object("pid", AnnotationValue::String("11423".to_owned()));
        let crashpad_info = CrashpadInfo::new(Endian::Little).add_module(module);
        let dump = read_synth_dump(
            SynthMinidump::with_endian(Endian::Little).add_crashpad_info(crashpad_info),
        )
        .unwrap();
        let crashpad_info = dump.get_crashpad_info().unwrap();
        let annotations = &crashpad_info.module_list[0].annotation_objects;
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations["pid"], "11423");
    }

    #[test]
    fn test_crashpad_numeric_annotation_wrong_width() {
        let err = annotation_objects(vec![(
            "pid",
            AnnotationValue::Custom(md::MINIDUMP_ANNOTATION::TYPE_U64, vec![0; 4]),
        )])
        .unwrap_err();
        assert_eq!(
            err,
            Error::DataError {
                stream_type: 0x43500001,
                reason: "numeric annotation has the wrong width",
            }
        );
    }

    #[test]
    fn test_crashpad_info_version_zero() {
        let crashpad_info = CrashpadInfo::new(Endian::Little).version(0);
        let dump = SynthMinidump::with_endian(Endian::Little).add_crashpad_info(crashpad_info);
        let dump = read_synth_dump(dump).unwrap();
        let err = dump.get_crashpad_info().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
        assert_eq!(err.name(), "DataError");
    }

    #[test]
    fn test_crashpad_info_future_version() {
        let crashpad_info = CrashpadInfo::new(Endian::Little).version(2);
        let dump = SynthMinidump::with_endian(Endian::Little).add_crashpad_info(crashpad_info);
        let dump = read_synth_dump(dump).unwrap();
        assert_eq!(dump.get_crashpad_info().unwrap().version, 2);
    }

    #[test]
    fn test_exception_access_violation() {
        let mut exception = windows_exception(0xc0000005, &[1, 0xdeadbeef]);
        exception.context = Some(Section::with_endian(Endian::Little).append_repeated(0xab, 16));
        let dump = SynthMinidump::with_endian(Endian::Little).add_exception(exception);
        let dump = read_synth_dump(dump).unwrap();
        let exception = dump.get_exception().unwrap();

        assert_eq!(exception.thread_id, 0x1234);
        assert_eq!(exception.get_crashing_thread_id(), 0x1234);
        assert_eq!(exception.exception_code, 0xc0000005);
        assert_eq!(exception.exception_flags, 0);
        assert_eq!(exception.exception_address, 0x7ff6_1000_2000);
        assert_eq!(exception.parameters, vec![1, 0xdeadbeef]);
        assert_eq!(exception.context, vec![0xab; 16]);

        assert_eq!(exception.get_crash_address(Os::Windows, Cpu::X86_64), 0xdeadbeef);
        // Only Windows stores the address in the parameters.
        assert_eq!(
            exception.get_crash_address(Os::Linux, Cpu::X86_64),
            0x7ff6_1000_2000
        );

        let reason = exception.get_crash_reason(Os::Windows);
        assert_eq!(
            reason,
            CrashReason::WindowsAccessViolation(err::ExceptionCodeWindowsAccessType::WRITE)
        );
        assert_eq!(reason.to_string(), "EXCEPTION_ACCESS_VIOLATION_WRITE");
    }

    #[test]
    fn test_exception_without_context() {
        let dump = SynthMinidump::with_endian(Endian::Little)
            .add_exception(windows_exception(0x80000003, &[]));
        let dump = read_synth_dump(dump).unwrap();
        let exception = dump.get_exception().unwrap();
        assert!(exception.context.is_empty());
        assert!(exception.parameters.is_empty());
        assert_eq!(
            exception.get_crash_reason(Os::Windows),
            CrashReason::WindowsGeneral(err::ExceptionCodeWindows::EXCEPTION_BREAKPOINT)
        );
    }

    #[test]
    fn test_exception_context_out_of_bounds() {
        let mut exception = windows_exception(0xc0000005, &[0, 0]);
        exception.raw_context_location = Some((0x4d0, 0x100000));
        let dump = SynthMinidump::with_endian(Endian::Little).add_exception(exception);
        let dump = read_synth_dump(dump).unwrap();
        assert_eq!(
            dump.get_exception().unwrap_err(),
            Error::StreamOutOfBounds {
                stream_type: MinidumpException::STREAM_TYPE,
                offset: 0x100000,
                len: 0x4d0,
            }
        );
    }

    #[test]
    fn test_exception_too_many_parameters() {
        let mut exception = windows_exception(0xc0000005, &[0; 15]);
        exception.exception_record.number_parameters = 20;
        let dump = SynthMinidump::with_endian(Endian::Little).add_exception(exception);
        let dump = read_synth_dump(dump).unwrap();
        let exception = dump.get_exception().unwrap();
        assert_eq!(exception.parameters.len(), md::EXCEPTION_MAXIMUM_PARAMETERS);
        assert_eq!(exception.raw.exception_record.number_parameters, 20);
    }

    #[test]
    fn test_crash_address_32bit() {
        let mut exception = windows_exception(0x80000003, &[]);
        exception.exception_record.exception_address = 0xffff_ffff_8000_1234;
        let dump = SynthMinidump::with_endian(Endian::Little).add_exception(exception);
        let dump = read_synth_dump(dump).unwrap();
        let exception = dump.get_exception().unwrap();
        assert_eq!(exception.get_crash_address(Os::Windows, Cpu::X86), 0x8000_1234);
        assert_eq!(
            exception.get_crash_address(Os::Windows, Cpu::X86_64),
            0xffff_ffff_8000_1234
        );
    }

    #[test]
    fn test_crash_reason_unix() {
        let mut exception = Exception::new(Endian::Little);
        exception.exception_record.exception_code = 11;
        exception.exception_record.exception_flags = 1;
        let dump = SynthMinidump::with_endian(Endian::Little).add_exception(exception);
        let exception = read_synth_dump(dump).unwrap().get_exception().unwrap();

        let linux = exception.get_crash_reason(Os::Linux);
        assert_eq!(
            linux,
            CrashReason::LinuxGeneral(err::ExceptionCodeLinux::SIGSEGV, 1)
        );
        assert_eq!(linux.to_string(), "SIGSEGV");

        let mac = exception.get_crash_reason(Os::MacOs);
        assert_eq!(
            mac,
            CrashReason::MacGeneral(err::ExceptionCodeMac::EXC_RESOURCE, 1)
        );
        assert_eq!(mac.to_string(), "EXC_RESOURCE / 0x1");

        assert_eq!(
            exception.get_crash_reason(Os::Solaris),
            CrashReason::Unknown(11, 1)
        );
        assert_eq!(
            CrashReason::Unknown(11, 1).to_string(),
            "0x0000000b / 0x00000001"
        );
    }

    #[test]
    fn test_crash_reason_mac_bad_access() {
        let mut exception = Exception::new(Endian::Little);
        exception.exception_record.exception_code = 1;
        exception.exception_record.exception_flags = 1;
        let dump = SynthMinidump::with_endian(Endian::Little).add_exception(exception);
        let exception = read_synth_dump(dump).unwrap().get_exception().unwrap();
        assert_eq!(
            exception.get_crash_reason(Os::MacOs).to_string(),
            "EXC_BAD_ACCESS / 0x1"
        );
        // Not a Windows exception code.
        assert_eq!(
            exception.get_crash_reason(Os::Windows),
            CrashReason::Unknown(1, 1)
        );
    }

    #[test]
    fn test_stream_vendor() {
        assert_eq!(stream_vendor(MinidumpSystemInfo::STREAM_TYPE), "Official");
        assert_eq!(stream_vendor(0xffff), "Official");
        assert_eq!(stream_vendor(0x47670007), "Google Extension");
        assert_eq!(stream_vendor(0x4d7a0001), "Mozilla Extension");
        assert_eq!(stream_vendor(0x43500001), "Crashpad Extension");
        assert_eq!(stream_vendor(0x11223344), "Unknown Extension");
    }

    #[test]
    fn test_print() {
        let mut exception = windows_exception(0xc0000005, &[0, 0x10]);
        exception.context = Some(Section::with_endian(Endian::Little).append_repeated(0, 8));
        let system_info = SystemInfo::new(Endian::Little)
            .set_platform_id(PlatformId::Linux as u32)
            .set_processor_architecture(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_AMD64 as u16);
        let dump = process_annotations(Endian::Little, "browser", "11423")
            .add_system_info(system_info)
            .add_misc_info(misc_info_v4())
            .add_exception(exception);
        let dump = read_synth_dump(dump).unwrap();

        let mut out = Vec::new();
        dump.print(&mut out).unwrap();
        dump.get_system_info().unwrap().print(&mut out).unwrap();
        dump.get_misc_info().unwrap().print(&mut out).unwrap();
        dump.get_crashpad_info().unwrap().print(&mut out).unwrap();
        dump.get_exception().unwrap().print(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("stream_count         = 4"));
        assert!(out.contains("(CrashpadInfoStream, Crashpad Extension)"));
        assert!(out.contains("  (os)") && out.contains("= Linux\n"));
        assert!(out.contains("  process_id                   = 11423"));
        assert!(out.contains("  process_integrity_level      = (invalid)"));
        assert!(out.contains("    standard_name = Pacific Standard Time"));
        assert!(out.contains("    standard_date = 0000-11-01T02:00:00Z"));
        assert!(out.contains("  module_list[0].annotation_objects[\"pid\"] = 11423"));
        assert!(out.contains("  exception_record.exception_information[ 1] = 0x10"));
        assert!(out.contains("  thread_context.data_size                   = 8"));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time_t(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_time_t(1699240689), "2023-11-06T03:18:09Z");
        assert_eq!(
            format_system_time(&md::SYSTEMTIME {
                month: 13,
                ..Default::default()
            }),
            "<invalid date>"
        );
        assert_eq!(
            format_system_time(&md::SYSTEMTIME {
                year: 2023,
                month: 11,
                day: 6,
                hour: 3,
                minute: 18,
                second: 9,
                ..Default::default()
            }),
            "2023-11-06T03:18:09Z"
        );
        // Fields wider than a byte must not wrap into valid values.
        assert_eq!(
            format_system_time(&md::SYSTEMTIME {
                year: 2023,
                month: 0x10b,
                day: 6,
                ..Default::default()
            }),
            "<invalid date>"
        );
        assert_eq!(
            format_system_time(&md::SYSTEMTIME {
                year: 2023,
                month: 11,
                day: 6,
                hour: 0x103,
                ..Default::default()
            }),
            "<invalid date>"
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(Error::FileNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::IoError(io::ErrorKind::PermissionDenied).kind(),
            ErrorKind::ReadError
        );
        assert_eq!(Error::HeaderMismatch.kind(), ErrorKind::InvalidFormat);
        assert_eq!(Error::StreamNotFound(7).name(), "StreamNotFound");
        assert_eq!(
            Error::StreamNotFound(7).to_string(),
            "Stream 0x7 not found"
        );

        let oob = Error::stream_bounds(6);
        assert_eq!(
            oob(OutOfBounds { offset: 3, len: 4 }),
            Error::StreamOutOfBounds {
                stream_type: 6,
                offset: 3,
                len: 4,
            }
        );
    }

    #[test]
    fn test_thread_safety() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Minidump<'static, Vec<u8>>>();
        assert_send_sync::<MinidumpSystemInfo>();
        assert_send_sync::<MinidumpMiscInfo>();
        assert_send_sync::<MinidumpCrashpadInfo>();
        assert_send_sync::<MinidumpException>();
        assert_send_sync::<Error>();
    }
}
