// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! Information about the system that produced a `Minidump`.

use crashdump_format::format::{PlatformId, ProcessorArchitecture};
use num_traits::FromPrimitive;
use std::borrow::Cow;
use std::fmt;

/// Known operating systems
///
/// This is a slightly nicer layer over the `PlatformId` enum defined in the
/// crashdump-format crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    MacOs,
    Ios,
    Linux,
    Solaris,
    Android,
    Ps3,
    NaCl,
    Unknown(u32),
}

impl Os {
    /// Get an `Os` value matching the `platform_id` value from `MINIDUMP_SYSTEM_INFO`
    pub fn from_platform_id(id: u32) -> Os {
        match PlatformId::from_u32(id) {
            Some(PlatformId::VER_PLATFORM_WIN32_WINDOWS)
            | Some(PlatformId::VER_PLATFORM_WIN32_NT)
            | Some(PlatformId::VER_PLATFORM_WIN32s)
            | Some(PlatformId::VER_PLATFORM_WIN32_CE) => Os::Windows,
            Some(PlatformId::MacOs) => Os::MacOs,
            Some(PlatformId::Ios) => Os::Ios,
            Some(PlatformId::Linux) => Os::Linux,
            Some(PlatformId::Solaris) => Os::Solaris,
            Some(PlatformId::Android) => Os::Android,
            Some(PlatformId::Ps3) => Os::Ps3,
            Some(PlatformId::NaCl) => Os::NaCl,
            _ => Os::Unknown(id),
        }
    }

    /// A short, stable tag for this operating system.
    ///
    /// Every unknown platform id shares the tag `"unknown"`.
    pub fn tag(&self) -> &'static str {
        match *self {
            Os::Windows => "windows",
            Os::MacOs => "macOs",
            Os::Ios => "iOS",
            Os::Linux => "linux",
            Os::Solaris => "solaris",
            Os::Android => "android",
            Os::Ps3 => "ps3",
            Os::NaCl => "naCl",
            Os::Unknown(_) => "unknown",
        }
    }

    /// Get a human-readable friendly name for an `Os`
    pub fn long_name(&self) -> Cow<'_, str> {
        match *self {
            Os::Windows => Cow::Borrowed("Windows NT"),
            Os::MacOs => Cow::Borrowed("Mac OS X"),
            Os::Ios => Cow::Borrowed("iOS"),
            Os::Linux => Cow::Borrowed("Linux"),
            Os::Solaris => Cow::Borrowed("Solaris"),
            Os::Android => Cow::Borrowed("Android"),
            Os::Ps3 => Cow::Borrowed("PS3"),
            Os::NaCl => Cow::Borrowed("NaCl"),
            Os::Unknown(val) => Cow::Owned(format!("{:#08x}", val)),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Known CPU types
///
/// This is a slightly nicer layer over the `ProcessorArchitecture` enum defined in
/// the crashdump-format crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cpu {
    X86,
    X86_64,
    Ppc,
    Ppc64,
    Sparc,
    Arm,
    Arm64,
    Mips,
    Mips64,
    Unknown(u16),
}

/// The width of a pointer on a given `Cpu`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointerWidth {
    Unknown,
    Bits32,
    Bits64,
}

impl Cpu {
    /// Get a `Cpu` value matching the `processor_architecture` value from `MINIDUMP_SYSTEM_INFO`
    pub fn from_processor_architecture(arch: u16) -> Cpu {
        match ProcessorArchitecture::from_u16(arch) {
            Some(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_IA32_ON_WIN64)
            | Some(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_INTEL) => Cpu::X86,
            Some(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_AMD64) => Cpu::X86_64,
            Some(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_PPC) => Cpu::Ppc,
            Some(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_PPC64) => Cpu::Ppc64,
            Some(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_SPARC) => Cpu::Sparc,
            Some(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_ARM) => Cpu::Arm,
            Some(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_ARM64)
            | Some(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_ARM64_OLD) => Cpu::Arm64,
            Some(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_MIPS) => Cpu::Mips,
            Some(ProcessorArchitecture::PROCESSOR_ARCHITECTURE_MIPS64) => Cpu::Mips64,
            _ => Cpu::Unknown(arch),
        }
    }

    /// A short, stable tag for this architecture.
    ///
    /// Every unknown architecture shares the tag `"unknown"`.
    pub fn tag(&self) -> &'static str {
        match *self {
            Cpu::X86 => "x86",
            Cpu::X86_64 => "x86_64",
            Cpu::Ppc => "ppc",
            Cpu::Ppc64 => "ppc64",
            Cpu::Sparc => "sparc",
            Cpu::Arm => "arm",
            Cpu::Arm64 => "arm64",
            Cpu::Mips => "mips",
            Cpu::Mips64 => "mips64",
            Cpu::Unknown(_) => "unknown",
        }
    }

    /// The native pointer width of this architecture.
    pub fn pointer_width(&self) -> PointerWidth {
        match self {
            Cpu::X86 | Cpu::Ppc | Cpu::Sparc | Cpu::Arm | Cpu::Mips => PointerWidth::Bits32,
            Cpu::X86_64 | Cpu::Ppc64 | Cpu::Arm64 | Cpu::Mips64 => PointerWidth::Bits64,
            Cpu::Unknown(_) => PointerWidth::Unknown,
        }
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
