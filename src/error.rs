//! Error types surfaced by the CPU core and the program loader.

use thiserror::Error;

/// Fatal conditions the CPU core can detect while stepping.
///
/// Every variant is fatal: a correct host never recovers from one by
/// retrying `step()`, only by resetting or by treating the emulated program
/// itself as buggy. No runtime error exists for program misbehavior (bad
/// stack discipline, jumping into data, infinite loops) — those are only
/// ever observable as unexpected register/cycle values.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CpuError {
    /// An opcode byte outside the 151 documented 6502 opcodes was fetched.
    /// `pc` is the address immediately after the offending byte (the CPU has
    /// already advanced past it, matching how a real fetch/decode cycle
    /// consumes the byte before decoding fails).
    #[error("unsupported opcode 0x{opcode:02X} at 0x{pc:04X}")]
    UnsupportedOpcode {
        /// The undocumented opcode byte that was fetched.
        opcode: u8,
        /// The PC value immediately after the offending byte.
        pc: u16,
    },
}

/// Fatal conditions raised by the [`crate::load_program`] helper.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoaderError {
    /// The program does not fit in the 64 KiB address space starting at
    /// `offset`.
    #[error(
        "program of {len} byte(s) at offset 0x{offset:04X} exceeds the 64 KiB address space"
    )]
    AddressOutOfRange {
        /// The requested load offset.
        offset: u16,
        /// The number of bytes the caller tried to load.
        len: usize,
    },
}
