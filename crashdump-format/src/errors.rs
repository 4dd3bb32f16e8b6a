//! Exception codes found in `MINIDUMP_EXCEPTION::exception_code`.
//!
//! The meaning of the code depends on the operating system that wrote the dump.
#![allow(non_camel_case_types)]
#![allow(clippy::upper_case_acronyms)]

use enum_primitive_derive::Primitive;

/// Values for `MINIDUMP_EXCEPTION.exception_code` for crashes on Windows
///
/// These values primarily come from WinBase.h and WinNT.h, with a few additions.
#[repr(u32)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Primitive)]
pub enum ExceptionCodeWindows {
    DBG_CONTROL_C = 0x40010005u32,
    EXCEPTION_GUARD_PAGE = 0x80000001u32,
    EXCEPTION_DATATYPE_MISALIGNMENT = 0x80000002u32,
    EXCEPTION_BREAKPOINT = 0x80000003u32,
    EXCEPTION_SINGLE_STEP = 0x80000004u32,
    EXCEPTION_ACCESS_VIOLATION = 0xc0000005u32,
    EXCEPTION_IN_PAGE_ERROR = 0xc0000006u32,
    EXCEPTION_INVALID_HANDLE = 0xc0000008u32,
    EXCEPTION_ILLEGAL_INSTRUCTION = 0xc000001du32,
    EXCEPTION_NONCONTINUABLE_EXCEPTION = 0xc0000025u32,
    EXCEPTION_INVALID_DISPOSITION = 0xc0000026u32,
    EXCEPTION_BOUNDS_EXCEEDED = 0xc000008cu32,
    EXCEPTION_FLT_DENORMAL_OPERAND = 0xc000008du32,
    EXCEPTION_FLT_DIVIDE_BY_ZERO = 0xc000008eu32,
    EXCEPTION_FLT_INEXACT_RESULT = 0xc000008fu32,
    EXCEPTION_FLT_INVALID_OPERATION = 0xc0000090u32,
    EXCEPTION_FLT_OVERFLOW = 0xc0000091u32,
    EXCEPTION_FLT_STACK_CHECK = 0xc0000092u32,
    EXCEPTION_FLT_UNDERFLOW = 0xc0000093u32,
    EXCEPTION_INT_DIVIDE_BY_ZERO = 0xc0000094u32,
    EXCEPTION_INT_OVERFLOW = 0xc0000095u32,
    EXCEPTION_PRIV_INSTRUCTION = 0xc0000096u32,
    EXCEPTION_STACK_OVERFLOW = 0xc00000fdu32,
    EXCEPTION_POSSIBLE_DEADLOCK = 0xc0000194u32,
    STATUS_HEAP_CORRUPTION = 0xc0000374u32,
    STATUS_STACK_BUFFER_OVERRUN = 0xc0000409u32,
    /// Exception thrown by Chromium allocators to indicate OOM
    OUT_OF_MEMORY = 0xe0000008u32,
    /// Thrown by the Visual C++ runtime for `throw`
    UNHANDLED_CPP_EXCEPTION = 0xe06d7363u32,
}

/// The kind of access of an `EXCEPTION_ACCESS_VIOLATION` or `EXCEPTION_IN_PAGE_ERROR`.
///
/// Stored in the first element of `exception_information`.
#[repr(u64)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Primitive)]
pub enum ExceptionCodeWindowsAccessType {
    READ = 0,
    WRITE = 1,
    EXEC = 8,
}

/// Values for `MINIDUMP_EXCEPTION.exception_code` for crashes on Linux and Android
///
/// These are signal numbers from bits/signum.h.
#[repr(u32)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Primitive)]
pub enum ExceptionCodeLinux {
    SIGHUP = 0x1,
    SIGINT = 0x2,
    SIGQUIT = 0x3,
    SIGILL = 0x4,
    SIGTRAP = 0x5,
    SIGABRT = 0x6,
    SIGBUS = 0x7,
    SIGFPE = 0x8,
    SIGKILL = 0x9,
    SIGUSR1 = 0xa,
    SIGSEGV = 0xb,
    SIGUSR2 = 0xc,
    SIGPIPE = 0xd,
    SIGALRM = 0xe,
    SIGTERM = 0xf,
    SIGSTKFLT = 0x10,
    SIGCHLD = 0x11,
    SIGCONT = 0x12,
    SIGSTOP = 0x13,
    SIGTSTP = 0x14,
    SIGTTIN = 0x15,
    SIGTTOU = 0x16,
    SIGURG = 0x17,
    SIGXCPU = 0x18,
    SIGXFSZ = 0x19,
    SIGVTALRM = 0x1a,
    SIGPROF = 0x1b,
    SIGWINCH = 0x1c,
    SIGIO = 0x1d,
    SIGPWR = 0x1e,
    SIGSYS = 0x1f,
    /// Breakpad's marker for a dump requested without a crash
    DUMP_REQUESTED = 0xffffffffu32,
}

/// Values for `MINIDUMP_EXCEPTION.exception_code` for crashes on macOS and iOS
///
/// Based on mach/exception_types.h. This is what macOS calls an "exception", the
/// "code" is stored in `exception_flags`.
#[repr(u32)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Primitive)]
pub enum ExceptionCodeMac {
    /// code can be a kern_return_t
    EXC_BAD_ACCESS = 1,
    EXC_BAD_INSTRUCTION = 2,
    EXC_ARITHMETIC = 3,
    EXC_EMULATION = 4,
    EXC_SOFTWARE = 5,
    EXC_BREAKPOINT = 6,
    EXC_SYSCALL = 7,
    EXC_MACH_SYSCALL = 8,
    EXC_RPC_ALERT = 9,
    EXC_RESOURCE = 11,
    EXC_GUARD = 12,
    /// Fake exception code used by Crashpad's SimulateCrash ('CPsx')
    SIMULATED = 0x43507378,
}
