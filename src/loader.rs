//! Program-loading convenience, external to the CPU core itself (§6).
//!
//! Writing a byte string into memory and pointing the reset vector at it is
//! not part of the CPU's architectural contract — real hardware has no such
//! operation — but every host that drives this core needs to do it, so it is
//! provided here rather than left for each caller to reimplement.

use crate::bus::Bus;
use crate::error::LoaderError;

/// Writes `bytes` into `bus` starting at `offset`, then points the reset
/// vector (`0xFFFC`/`0xFFFD`) at `initial_pc`.
///
/// This only pokes memory directly; it does not run [`crate::Cpu::reset`].
/// Call `reset` afterward to have the CPU actually pick up the vector.
///
/// # Errors
///
/// Returns [`LoaderError::AddressOutOfRange`] if `offset + bytes.len()`
/// would exceed the 64 KiB address space. Nothing is written in that case.
pub fn load_program(
    bus: &mut dyn Bus,
    offset: u16,
    bytes: &[u8],
    initial_pc: u16,
) -> Result<(), LoaderError> {
    let end = usize::from(offset) + bytes.len();
    if end > 0x1_0000 {
        return Err(LoaderError::AddressOutOfRange {
            offset,
            len: bytes.len(),
        });
    }

    for (i, &byte) in bytes.iter().enumerate() {
        bus.write(offset.wrapping_add(i as u16), byte);
    }

    let [lo, hi] = initial_pc.to_le_bytes();
    bus.write(0xFFFC, lo);
    bus.write(0xFFFD, hi);

    Ok(())
}
