//! Minidump structure definitions.
//!
//! Types defined here should match those defined in [Microsoft's headers][msdn]. Additionally
//! some [Breakpad][breakpad] and [Crashpad][crashpad] extension types are defined here and should
//! match the definitions from those projects.
//!
//! Only the streams this workspace decodes have full layouts here: the header and directory,
//! `SystemInfoStream`, `MiscInfoStream`, `ExceptionStream` and `CrashpadInfoStream`.
//!
//! [msdn]: https://docs.microsoft.com/en-us/windows/desktop/api/minidumpapiset/
//! [breakpad]: https://chromium.googlesource.com/breakpad/breakpad/
//! [crashpad]: https://chromium.googlesource.com/crashpad/crashpad/+/master/README.md
#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]
#![allow(clippy::upper_case_acronyms)]

use bitflags::bitflags;
use enum_primitive_derive::Primitive;
use scroll::{Pread, SizeWith};

/// An offset from the start of the minidump file.
pub type RVA = u32;

/// The 4-byte magic number at the start of a minidump file.
///
/// In little endian this spells 'MDMP'.
pub const MINIDUMP_SIGNATURE: u32 = 0x504d444d;

/// The version of the minidump format.
///
/// Only the low 16 bits of `MINIDUMP_HEADER::version` carry it, the high bits are
/// implementation specific.
pub const MINIDUMP_VERSION: u32 = 42899;

/// The header at the start of a minidump file.
///
/// This struct matches the [Microsoft struct][msdn] of the same name.
///
/// [msdn]: https://docs.microsoft.com/en-us/windows/desktop/api/minidumpapiset/ns-minidumpapiset-_minidump_header
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct MINIDUMP_HEADER {
    /// This should be [`MINIDUMP_SIGNATURE`].
    pub signature: u32,
    /// The low 16 bits should be [`MINIDUMP_VERSION`].
    pub version: u32,
    /// The number of entries in the stream directory.
    pub stream_count: u32,
    /// The offset of the stream directory, an array of `stream_count`
    /// [`MINIDUMP_DIRECTORY`] entries.
    pub stream_directory_rva: RVA,
    pub checksum: u32,
    pub time_date_stamp: u32,
    pub flags: u64,
}

/// A location within a minidump file comprised of an offset and a size.
///
/// This struct matches the [Microsoft struct][msdn] of the same name.
///
/// [msdn]: https://docs.microsoft.com/en-us/windows/desktop/api/minidumpapiset/ns-minidumpapiset-_minidump_location_descriptor
#[derive(Debug, Copy, Default, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct MINIDUMP_LOCATION_DESCRIPTOR {
    /// The size of this data.
    pub data_size: u32,
    /// The offset to this data within the minidump file.
    pub rva: RVA,
}

/// Information about a data stream contained in a minidump file.
///
/// This struct matches the [Microsoft struct][msdn] of the same name.
///
/// [msdn]: https://docs.microsoft.com/en-us/windows/desktop/api/minidumpapiset/ns-minidumpapiset-_minidump_directory
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct MINIDUMP_DIRECTORY {
    /// Usually one of the values in [`MINIDUMP_STREAM_TYPE`], but user streams can have
    /// arbitrary values.
    pub stream_type: u32,
    /// The location of the stream contents within the dump.
    pub location: MINIDUMP_LOCATION_DESCRIPTOR,
}

/// The types of known minidump data streams.
///
/// Most of these values are derived from the [Microsoft enum][msdn] of the same name, but
/// the values after `LastReservedStream` are Breakpad, Crashpad and Mozilla extensions.
///
/// [msdn]: https://docs.microsoft.com/en-us/windows/desktop/api/minidumpapiset/ne-minidumpapiset-_minidump_stream_type
#[repr(u32)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Primitive)]
pub enum MINIDUMP_STREAM_TYPE {
    UnusedStream = 0,
    ReservedStream0 = 1,
    ReservedStream1 = 2,
    ThreadListStream = 3,
    ModuleListStream = 4,
    MemoryListStream = 5,
    /// Information about the exception that caused the process to exit
    ///
    /// See [`MINIDUMP_EXCEPTION_STREAM`].
    ExceptionStream = 6,
    /// System information
    ///
    /// See [`MINIDUMP_SYSTEM_INFO`].
    SystemInfoStream = 7,
    ThreadExListStream = 8,
    Memory64ListStream = 9,
    CommentStreamA = 10,
    CommentStreamW = 11,
    HandleDataStream = 12,
    FunctionTable = 13,
    UnloadedModuleListStream = 14,
    /// Miscellaneous process and system information
    ///
    /// The layout depends on the revision, see [`MiscInfoRevision`].
    MiscInfoStream = 15,
    MemoryInfoListStream = 16,
    ThreadInfoListStream = 17,
    HandleOperationListStream = 18,
    TokenStream = 19,
    JavaScriptDataStream = 20,
    SystemMemoryInfoStream = 21,
    ProcessVmCountersStream = 22,
    IptTraceStream = 23,
    ThreadNamesStream = 24,
    LastReservedStream = 0x0000ffff,
    /* Breakpad extension types.  0x4767 = "Gg" */
    BreakpadInfoStream = 0x47670001,
    AssertionInfoStream = 0x47670002,
    LinuxCpuInfo = 0x47670003,
    LinuxProcStatus = 0x47670004,
    LinuxLsbRelease = 0x47670005,
    LinuxCmdLine = 0x47670006,
    LinuxEnviron = 0x47670007,
    LinuxAuxv = 0x47670008,
    LinuxMaps = 0x47670009,
    LinuxDsoDebug = 0x4767000A,
    /* Crashpad extension types. 0x4350 = "CP" */
    /// Crashpad annotations
    ///
    /// See [`MINIDUMP_CRASHPAD_INFO`].
    CrashpadInfoStream = 0x43500001,
    /* Mozilla extension types. 0x4d7a = "Mz" */
    MozMacosCrashInfoStream = 0x4d7a0001,
    MozMacosBootargsStream = 0x4d7a0002,
    MozLinuxLimits = 0x4d7a0003,
    MozSoftErrors = 0x4d7a0004,
}

impl From<MINIDUMP_STREAM_TYPE> for u32 {
    fn from(ty: MINIDUMP_STREAM_TYPE) -> Self {
        ty as u32
    }
}

/// A GUID as specified in Rpcdce.h
///
/// Matches the [Microsoft struct][msdn] of the same name.
///
/// [msdn]: https://msdn.microsoft.com/en-us/library/windows/desktop/aa373931(v=vs.85).aspx
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pread, SizeWith)]
pub struct GUID {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

/// Processor and operating system information
///
/// This struct matches the [Microsoft struct][msdn] of the same name.
///
/// [msdn]: https://docs.microsoft.com/en-us/windows/desktop/api/minidumpapiset/ns-minidumpapiset-_minidump_system_info
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct MINIDUMP_SYSTEM_INFO {
    /// The system's processor architecture
    ///
    /// Known values are defined in [`ProcessorArchitecture`].
    pub processor_architecture: u16,
    /// x86 (5 = 586, 6 = 686 ...) or ARM (6 = ARMv6, 7 = ARMv7 ...) CPU level
    pub processor_level: u16,
    /// For x86, 0xMMSS where MM=model, SS=stepping
    pub processor_revision: u16,
    pub number_of_processors: u8,
    pub product_type: u8,
    pub major_version: u32,
    pub minor_version: u32,
    pub build_number: u32,
    /// The operating system platform
    ///
    /// Known values are defined in [`PlatformId`].
    pub platform_id: u32,
    /// An offset to a length-prefixed UTF-16 service pack or OS build string.
    pub csd_version_rva: RVA,
    pub suite_mask: u16,
    pub reserved2: u16,
    pub cpu: CPU_INFORMATION,
}

/// CPU information contained within the [`MINIDUMP_SYSTEM_INFO`] struct
///
/// This matches the `CPU_INFORMATION` union from minidumpapiset.h. The union can't be read
/// directly, so the raw bytes are kept and callers `pread` the variant they need.
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct CPU_INFORMATION {
    pub data: [u8; 24],
}

/// x86-specific CPU information derived from the `cpuid` instruction
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct X86CpuInfo {
    pub vendor_id: [u32; 3],
    pub version_information: u32,
    pub feature_information: u32,
    pub amd_extended_cpu_features: u32,
}

/// Known values of `MINIDUMP_SYSTEM_INFO.processor_architecture`
///
/// Many of these are taken from definitions in WinNT.h, but several of them are
/// Breakpad extensions.
#[repr(u16)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Primitive)]
pub enum ProcessorArchitecture {
    PROCESSOR_ARCHITECTURE_INTEL = 0,
    PROCESSOR_ARCHITECTURE_MIPS = 1,
    PROCESSOR_ARCHITECTURE_ALPHA = 2,
    PROCESSOR_ARCHITECTURE_PPC = 3,
    PROCESSOR_ARCHITECTURE_SHX = 4,
    PROCESSOR_ARCHITECTURE_ARM = 5,
    PROCESSOR_ARCHITECTURE_IA64 = 6,
    PROCESSOR_ARCHITECTURE_ALPHA64 = 7,
    /// Microsoft Intermediate Language
    PROCESSOR_ARCHITECTURE_MSIL = 8,
    PROCESSOR_ARCHITECTURE_AMD64 = 9,
    /// WoW64
    PROCESSOR_ARCHITECTURE_IA32_ON_WIN64 = 10,
    PROCESSOR_ARCHITECTURE_ARM64 = 12,
    /// Breakpad-defined value for SPARC
    PROCESSOR_ARCHITECTURE_SPARC = 0x8001,
    /// Breakpad-defined value for PPC64
    PROCESSOR_ARCHITECTURE_PPC64 = 0x8002,
    /// Breakpad-defined value for ARM64
    PROCESSOR_ARCHITECTURE_ARM64_OLD = 0x8003,
    /// Breakpad-defined value for MIPS64
    PROCESSOR_ARCHITECTURE_MIPS64 = 0x8004,
    PROCESSOR_ARCHITECTURE_UNKNOWN = 0xffff,
}

/// Known values of `MINIDUMP_SYSTEM_INFO.platform_id`
///
/// The Windows values here are taken from defines in WinNT.h, but the rest are Breakpad
/// extensions.
#[repr(u32)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Primitive)]
pub enum PlatformId {
    /// Windows 3.1
    VER_PLATFORM_WIN32s = 1,
    /// Windows 95-98-Me
    VER_PLATFORM_WIN32_WINDOWS = 2,
    /// Windows NT, 2000+
    VER_PLATFORM_WIN32_NT = 3,
    /// Windows CE, Windows Mobile
    VER_PLATFORM_WIN32_CE = 4,
    /// Generic Unix-ish (Breakpad extension)
    Unix = 0x8000,
    /// macOS/Darwin (Breakpad extension)
    MacOs = 0x8101,
    /// iOS (Breakpad extension)
    Ios = 0x8102,
    /// Linux (Breakpad extension)
    Linux = 0x8201,
    /// Solaris (Breakpad extension)
    Solaris = 0x8202,
    /// Android (Breakpad extension)
    Android = 0x8203,
    /// PlayStation 3 (Breakpad extension)
    Ps3 = 0x8204,
    /// Native Client (Breakpad extension)
    NaCl = 0x8205,
}

/// A date and time
///
/// This struct matches the [Microsoft struct][msdn] of the same name.
///
/// [msdn]: https://msdn.microsoft.com/en-us/library/windows/desktop/ms724950(v=vs.85).aspx
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pread, SizeWith)]
pub struct SYSTEMTIME {
    pub year: u16,
    pub month: u16,
    pub day_of_week: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub milliseconds: u16,
}

/// Settings for a time zone
///
/// This struct matches the [Microsoft struct][msdn] of the same name.
///
/// [msdn]: https://docs.microsoft.com/en-us/windows/desktop/api/timezoneapi/ns-timezoneapi-_time_zone_information
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct TIME_ZONE_INFORMATION {
    pub bias: i32,
    pub standard_name: [u16; 32],
    pub standard_date: SYSTEMTIME,
    pub standard_bias: i32,
    pub daylight_name: [u16; 32],
    pub daylight_date: SYSTEMTIME,
    pub daylight_bias: i32,
}

impl Default for TIME_ZONE_INFORMATION {
    fn default() -> Self {
        Self {
            bias: 0,
            standard_name: [0; 32],
            standard_date: SYSTEMTIME::default(),
            standard_bias: 0,
            daylight_name: [0; 32],
            daylight_date: SYSTEMTIME::default(),
            daylight_bias: 0,
        }
    }
}

/// The revisions of `MINIDUMP_MISC_INFO`.
///
/// Every revision appends fields to the previous one, so a stream is read as the largest
/// revision whose size fits within the declared `size_of_info`.
#[repr(u32)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Primitive)]
pub enum MiscInfoRevision {
    /// `MINIDUMP_MISC_INFO`
    V1 = 24,
    /// `MINIDUMP_MISC_INFO_2`, adds processor power information
    V2 = 44,
    /// `MINIDUMP_MISC_INFO_3`, adds process integrity and time zone information
    V3 = 232,
    /// `MINIDUMP_MISC_INFO_4`, adds build strings
    V4 = 832,
    /// `MINIDUMP_MISC_INFO_5`, adds the XState configuration and process cookie
    V5 = 1364,
}

impl MiscInfoRevision {
    /// All revisions, newest first.
    pub const ALL: [MiscInfoRevision; 5] = [
        MiscInfoRevision::V5,
        MiscInfoRevision::V4,
        MiscInfoRevision::V3,
        MiscInfoRevision::V2,
        MiscInfoRevision::V1,
    ];

    /// The size in bytes of this revision of the struct.
    pub fn size(self) -> u32 {
        self as u32
    }

    /// The largest revision that fits within `size_of_info` bytes.
    pub fn from_size(size_of_info: u32) -> Option<MiscInfoRevision> {
        Self::ALL
            .iter()
            .copied()
            .find(|revision| revision.size() <= size_of_info)
    }
}

/// Field offsets of the `MINIDUMP_MISC_INFO*` structs.
///
/// All revisions share a prefix, so one set of offsets serves every revision.
pub mod misc_info_offsets {
    pub const SIZE_OF_INFO: usize = 0;
    pub const FLAGS1: usize = 4;
    pub const PROCESS_ID: usize = 8;
    pub const PROCESS_CREATE_TIME: usize = 12;
    pub const PROCESS_USER_TIME: usize = 16;
    pub const PROCESS_KERNEL_TIME: usize = 20;
    pub const PROCESSOR_MAX_MHZ: usize = 24;
    pub const PROCESSOR_CURRENT_MHZ: usize = 28;
    pub const PROCESSOR_MHZ_LIMIT: usize = 32;
    pub const PROCESSOR_MAX_IDLE_STATE: usize = 36;
    pub const PROCESSOR_CURRENT_IDLE_STATE: usize = 40;
    pub const PROCESS_INTEGRITY_LEVEL: usize = 44;
    pub const PROCESS_EXECUTE_FLAGS: usize = 48;
    pub const PROTECTED_PROCESS: usize = 52;
    pub const TIME_ZONE_ID: usize = 56;
    pub const TIME_ZONE: usize = 60;
    pub const BUILD_STRING: usize = 232;
    pub const DBG_BLD_STR: usize = 752;
    pub const XSTATE_DATA: usize = 832;
    pub const PROCESS_COOKIE: usize = 1360;

    /// `WCHAR BuildString[MAX_PATH]`
    pub const BUILD_STRING_CHARS: usize = 260;
    /// `WCHAR DbgBldStr[40]`
    pub const DBG_BLD_STR_CHARS: usize = 40;
}

bitflags! {
    /// Known flags for `MINIDUMP_MISC_INFO*.flags1`
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct MiscInfoFlags: u32 {
        const MINIDUMP_MISC1_PROCESS_ID            = 0x00000001;
        const MINIDUMP_MISC1_PROCESS_TIMES         = 0x00000002;
        const MINIDUMP_MISC1_PROCESSOR_POWER_INFO  = 0x00000004;
        const MINIDUMP_MISC3_PROCESS_INTEGRITY     = 0x00000010;
        const MINIDUMP_MISC3_PROCESS_EXECUTE_FLAGS = 0x00000020;
        const MINIDUMP_MISC3_TIMEZONE              = 0x00000040;
        const MINIDUMP_MISC3_PROTECTED_PROCESS     = 0x00000080;
        const MINIDUMP_MISC4_BUILDSTRING           = 0x00000100;
        const MINIDUMP_MISC5_PROCESS_COOKIE        = 0x00000200;
    }
}

/// The offset and size of one feature within an XSAVE area.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pread, SizeWith)]
pub struct XSTATE_FEATURE {
    pub offset: u32,
    pub size: u32,
}

/// The XSAVE layout of the crashed process, as stored in `MINIDUMP_MISC_INFO_5`.
///
/// This struct matches the definition of the struct of the same name from minidumpapiset.h.
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct XSTATE_CONFIG_FEATURE_MSC_INFO {
    /// The size of this struct.
    pub size_of_info: u32,
    /// The total size of the XSAVE context.
    pub context_size: u32,
    /// A bit mask of enabled features, indexed by [`XstateFeatureIndex`].
    pub enabled_features: u64,
    /// The location of each feature within the context, indexed by [`XstateFeatureIndex`].
    pub features: [XSTATE_FEATURE; 64],
}

impl Default for XSTATE_CONFIG_FEATURE_MSC_INFO {
    fn default() -> Self {
        Self {
            size_of_info: 528,
            context_size: 0,
            enabled_features: 0,
            features: [XSTATE_FEATURE::default(); 64],
        }
    }
}

impl XSTATE_CONFIG_FEATURE_MSC_INFO {
    /// Iterate over the enabled features as `(index, feature)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &XSTATE_FEATURE)> + '_ {
        let enabled = self.enabled_features;
        self.features
            .iter()
            .enumerate()
            .filter(move |(i, _)| enabled & (1u64 << *i) != 0)
    }
}

/// Known bit indices of `XSTATE_CONFIG_FEATURE_MSC_INFO.enabled_features`
///
/// These come from the `XSTATE_*` defines in WinNT.h.
#[repr(usize)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Primitive)]
pub enum XstateFeatureIndex {
    LEGACY_FLOATING_POINT = 0,
    LEGACY_SSE = 1,
    GSSE_AND_AVX = 2,
    MPX_BNDREGS = 3,
    MPX_BNDCSR = 4,
    AVX512_KMASK = 5,
    AVX512_ZMM_H = 6,
    AVX512_ZMM = 7,
    IPT = 8,
    XSAVES_CET_U = 11,
    XSAVES_CET_S = 12,
    AMX_TILE_CONFIG = 17,
    AMX_TILE_DATA = 18,
    LWP = 62,
}

impl XstateFeatureIndex {
    pub fn from_index(index: usize) -> Option<Self> {
        num_traits::FromPrimitive::from_usize(index)
    }
}

/// Information about an exception that occurred in the process
///
/// This struct matches the [Microsoft struct][msdn] of the same name.
///
/// [msdn]: https://docs.microsoft.com/en-us/windows/desktop/api/minidumpapiset/ns-minidumpapiset-minidump_exception_stream
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct MINIDUMP_EXCEPTION_STREAM {
    /// The identifier of the thread that encountered the exception.
    pub thread_id: u32,
    pub __align: u32,
    /// Detailed information about the exception encountered.
    pub exception_record: MINIDUMP_EXCEPTION,
    /// The location of the CPU context of the faulting thread.
    pub thread_context: MINIDUMP_LOCATION_DESCRIPTOR,
}

/// Detailed information about an exception.
///
/// This struct matches the [Microsoft struct][msdn] of the same name.
///
/// [msdn]: https://docs.microsoft.com/en-us/windows/desktop/api/minidumpapiset/ns-minidumpapiset-_minidump_exception
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct MINIDUMP_EXCEPTION {
    /// The reason the exception occurred.
    ///
    /// Possible values are in the [`crate::errors`] enums.
    pub exception_code: u32,
    /// On Windows this is 1 for noncontinuable exceptions and 0 otherwise. Breakpad stores
    /// the exception code (as opposed to the exception type) here on macOS.
    pub exception_flags: u32,
    /// The address of an associated `MINIDUMP_EXCEPTION` for a nested exception.
    pub exception_record: u64,
    /// The address where the exception occurred.
    pub exception_address: u64,
    /// The number of valid elements in `exception_information`.
    pub number_parameters: u32,
    pub __align: u32,
    /// Additional arguments that describe the exception.
    ///
    /// For access violations the first element is the kind of access and the second is
    /// the address that was accessed.
    pub exception_information: [u64; 15], // EXCEPTION_MAXIMUM_PARAMETERS
}

/// The capacity of `MINIDUMP_EXCEPTION::exception_information`.
pub const EXCEPTION_MAXIMUM_PARAMETERS: usize = 15;

/// Crashpad-specific information stored in a minidump
///
/// This matches the struct of the same name from Crashpad's `minidump_extensions.h`.
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct MINIDUMP_CRASHPAD_INFO {
    /// Should be [`MINIDUMP_CRASHPAD_INFO::VERSION`]. Every non-zero version is
    /// compatible with version 1.
    pub version: u32,
    /// A unique identifier for this crash report.
    pub report_id: GUID,
    /// A unique identifier for the client that produced this report.
    pub client_id: GUID,
    /// A [`MINIDUMP_SIMPLE_STRING_DICTIONARY`] of process-wide annotations.
    pub simple_annotations: MINIDUMP_LOCATION_DESCRIPTOR,
    /// A count-prefixed list of [`MINIDUMP_MODULE_CRASHPAD_INFO_LINK`]s.
    pub module_list: MINIDUMP_LOCATION_DESCRIPTOR,
}

impl MINIDUMP_CRASHPAD_INFO {
    pub const VERSION: u32 = 1;
}

/// A link from the Crashpad module list to a module's annotations.
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct MINIDUMP_MODULE_CRASHPAD_INFO_LINK {
    /// The index of the module in the dump's `ModuleListStream`.
    pub minidump_module_list_index: u32,
    /// The location of a [`MINIDUMP_MODULE_CRASHPAD_INFO`].
    pub location: MINIDUMP_LOCATION_DESCRIPTOR,
}

/// Annotations Crashpad collected from a single module.
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct MINIDUMP_MODULE_CRASHPAD_INFO {
    /// Should be [`MINIDUMP_MODULE_CRASHPAD_INFO::VERSION`].
    pub version: u32,
    /// A count-prefixed list of RVAs of [`MINIDUMP_UTF8_STRING`]s.
    pub list_annotations: MINIDUMP_LOCATION_DESCRIPTOR,
    /// A [`MINIDUMP_SIMPLE_STRING_DICTIONARY`].
    pub simple_annotations: MINIDUMP_LOCATION_DESCRIPTOR,
    /// A count-prefixed list of [`MINIDUMP_ANNOTATION`]s.
    pub annotation_objects: MINIDUMP_LOCATION_DESCRIPTOR,
}

impl MINIDUMP_MODULE_CRASHPAD_INFO {
    pub const VERSION: u32 = 1;
}

/// A key/value pair of a `MINIDUMP_SIMPLE_STRING_DICTIONARY`.
///
/// The dictionary itself is a `u32` count followed by that many entries.
#[derive(Debug, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct MINIDUMP_SIMPLE_STRING_DICTIONARY_ENTRY {
    /// The RVA of a [`MINIDUMP_UTF8_STRING`] key.
    pub key: RVA,
    /// The RVA of a [`MINIDUMP_UTF8_STRING`] value.
    pub value: RVA,
}

/// A typed annotation object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pread, SizeWith)]
pub struct MINIDUMP_ANNOTATION {
    /// The RVA of a [`MINIDUMP_UTF8_STRING`] holding the annotation's name.
    pub name: RVA,
    /// The annotation's type, one of the `TYPE_*` constants.
    pub ty: u16,
    /// Always 0.
    pub _reserved: u16,
    /// The RVA of a `MINIDUMP_BYTE_ARRAY` holding the annotation's value.
    pub value: RVA,
}

impl MINIDUMP_ANNOTATION {
    /// An invalid annotation. Reserved for internal use.
    pub const TYPE_INVALID: u16 = 0;
    /// A `NUL`-terminated C-string.
    pub const TYPE_STRING: u16 = 1;
    /// A `u32` in the dump's byte order.
    pub const TYPE_U32: u16 = 2;
    /// A `u64` in the dump's byte order.
    pub const TYPE_U64: u16 = 3;
    /// An `i32` in the dump's byte order.
    pub const TYPE_I32: u16 = 4;
    /// An `i64` in the dump's byte order.
    pub const TYPE_I64: u16 = 5;
    /// Clients may declare their own custom types above this value.
    pub const TYPE_USER_DEFINED: u16 = 0x8000;
}

/// Layout marker for a UTF-8 string: a `u32` byte length, the bytes, and a `NUL`.
///
/// There is no fixed-size struct for this; it only exists to be referenced by docs.
pub enum MINIDUMP_UTF8_STRING {}

/// Layout marker for a string dictionary: a `u32` count followed by
/// [`MINIDUMP_SIMPLE_STRING_DICTIONARY_ENTRY`]s.
pub enum MINIDUMP_SIMPLE_STRING_DICTIONARY {}
