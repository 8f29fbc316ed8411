//! CPU status register (P register) flags.
//!
//! The 6502 status register is an 8-bit register reflecting the state of the
//! processor:
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! │  │  │  │  │  │  │  └─ Carry
//! │  │  │  │  │  │  └──── Zero
//! │  │  │  │  │  └─────── Interrupt Disable
//! │  │  │  │  └────────── Decimal Mode (BCD arithmetic for ADC/SBC)
//! │  │  │  └───────────── Break (1 when pushed from PHP/BRK, 0 from IRQ/NMI)
//! │  │  └──────────────── Unused (always 1 when pushed to stack)
//! │  └─────────────────── Overflow
//! └────────────────────── Negative
//! ```

use bitflags::bitflags;

bitflags! {
    /// CPU status register flags.
    ///
    /// `bitflags`'s own `serde` feature (enabled transitively by this
    /// crate's `serde` feature) provides `Serialize`/`Deserialize` for this
    /// type; no manual derive is needed or correct here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        /// Carry flag - set if the last operation caused an overflow from bit 7
        /// or an underflow from bit 0.
        const C = 1 << 0;

        /// Zero flag - set if the result of the last operation was zero.
        const Z = 1 << 1;

        /// Interrupt Disable flag - when set, IRQ interrupts are not serviced.
        /// NMI interrupts are not affected.
        const I = 1 << 2;

        /// Decimal Mode flag - when set, ADC/SBC operate on BCD digits.
        const D = 1 << 3;

        /// Break flag - distinguishes software (BRK/PHP) pushes from
        /// hardware (IRQ/NMI) pushes. Only meaningful in the pushed image.
        const B = 1 << 4;

        /// Unused flag - always set to 1 when status is pushed to the stack.
        const U = 1 << 5;

        /// Overflow flag - set if the last operation caused a signed overflow.
        const V = 1 << 6;

        /// Negative flag - set if bit 7 of the result is set.
        const N = 1 << 7;
    }
}

impl Status {
    /// Status immediately after power-on/reset: I and U set, everything else clear.
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Mask of flags actually affected by PLP/RTI (B and U are never restored
    /// from the pulled byte; U always reads back as 1 and B only exists in
    /// the pushed image).
    pub const RESTORE_MASK: Self = Self::C
        .union(Self::Z)
        .union(Self::I)
        .union(Self::D)
        .union(Self::V)
        .union(Self::N);

    /// Status immediately after power-on.
    #[must_use]
    pub const fn new() -> Self {
        Self::POWER_ON
    }

    /// Sets or clears the Zero and Negative flags based on a value.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set_flag(Self::Z, value == 0);
        self.set_flag(Self::N, value & 0x80 != 0);
    }

    /// Sets or clears a single flag.
    #[inline]
    pub fn set_flag(&mut self, flag: Self, value: bool) {
        if value {
            *self |= flag;
        } else {
            *self &= !flag;
        }
    }

    /// Packs the flags into the byte pushed to the stack by PHP/BRK/interrupt
    /// servicing. U is always 1; B is 1 only for PHP/BRK, 0 for hardware
    /// interrupt servicing.
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, brk: bool) -> u8 {
        let mut value = self.bits() | Self::U.bits();
        if brk {
            value |= Self::B.bits();
        } else {
            value &= !Self::B.bits();
        }
        value
    }

    /// Reconstructs flags from a byte pulled by PLP/RTI. B and U are
    /// discarded; U always reads back as set so the stored value matches
    /// what a subsequent PHP would push.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & !Self::B.bits()) | Self::U.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_status() {
        let status = Status::new();
        assert!(status.contains(Status::I));
        assert!(status.contains(Status::U));
        assert!(!status.contains(Status::C));
        assert!(!status.contains(Status::Z));
        assert!(!status.contains(Status::N));
        assert!(!status.contains(Status::V));
        assert!(!status.contains(Status::D));
    }

    #[test]
    fn set_zn_zero() {
        let mut status = Status::empty();
        status.set_zn(0);
        assert!(status.contains(Status::Z));
        assert!(!status.contains(Status::N));
    }

    #[test]
    fn set_zn_negative() {
        let mut status = Status::empty();
        status.set_zn(0x80);
        assert!(!status.contains(Status::Z));
        assert!(status.contains(Status::N));
    }

    #[test]
    fn set_zn_positive() {
        let mut status = Status::empty();
        status.set_zn(0x42);
        assert!(!status.contains(Status::Z));
        assert!(!status.contains(Status::N));
    }

    #[test]
    fn to_stack_byte_with_brk() {
        let status = Status::C | Status::Z;
        let byte = status.to_stack_byte(true);
        assert_eq!(byte & Status::B.bits(), Status::B.bits());
        assert_eq!(byte & Status::U.bits(), Status::U.bits());
    }

    #[test]
    fn to_stack_byte_without_brk() {
        let status = Status::C | Status::Z;
        let byte = status.to_stack_byte(false);
        assert_eq!(byte & Status::B.bits(), 0);
        assert_eq!(byte & Status::U.bits(), Status::U.bits());
    }

    #[test]
    fn from_stack_byte_discards_b_forces_u() {
        let status = Status::from_stack_byte(0xFF);
        assert!(!status.contains(Status::B));
        assert!(status.contains(Status::U));
        assert!(status.contains(Status::C));
        assert!(status.contains(Status::Z));
        assert!(status.contains(Status::I));
        assert!(status.contains(Status::D));
        assert!(status.contains(Status::V));
        assert!(status.contains(Status::N));
    }

    #[test]
    fn restore_mask_excludes_b_and_u() {
        assert!(!Status::RESTORE_MASK.contains(Status::B));
        assert!(!Status::RESTORE_MASK.contains(Status::U));
    }
}
