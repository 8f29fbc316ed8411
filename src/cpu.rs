//! The 6502 CPU core: register file, fetch/decode/execute loop, stack
//! helpers, and interrupt sequencing.

use crate::addressing::{self, Operand};
use crate::bus::Bus;
use crate::error::CpuError;
use crate::instructions;
use crate::opcode::{self, Opcode};
use crate::status::Status;

/// A MOS 6502 CPU core.
///
/// Owns the register file, status flags, cycle counter, and interrupt
/// latches. Drives a [`Bus`] implementation to perform every memory access
/// the instruction set requires, including the "dummy" reads and writes
/// that exist purely to reproduce cycle-accurate timing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cpu {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Stack pointer; the effective stack address is always `0x0100 | sp`.
    pub sp: u8,
    /// Program counter.
    pub pc: u16,
    /// Status flags.
    pub status: Status,
    /// Total bus/internal cycles consumed since the last `reset`.
    pub cycles: u64,
    /// The most recently fetched opcode byte.
    pub opcode: u8,

    irq_pending: bool,
    nmi_pending: bool,
    interrupt_this_cycle: bool,
    interrupt_prev_cycle: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Creates a CPU in its architectural power-on state.
    ///
    /// `A`, `X`, `Y`, and `PC` start at zero; `SP` starts at `0xFD`, matching
    /// the value real hardware settles on after the reset sequence's three
    /// internal stack-pointer decrements (see `DESIGN.md` for the source
    /// ambiguity this resolves). Call [`Cpu::reset`] before stepping a real
    /// program so `PC` is loaded from the reset vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: Status::new(),
            cycles: 0,
            opcode: 0,
            irq_pending: false,
            nmi_pending: false,
            interrupt_this_cycle: false,
            interrupt_prev_cycle: false,
        }
    }

    /// Runs the reset sequence (§4.5): `SP ← 0xFD`, `I ← true`, both
    /// interrupt latches and the cycle counter clear, then `PC` is loaded
    /// from the reset vector at `0xFFFC/0xFFFD`. Nothing is pushed to the
    /// stack; real hardware's reset does not save any prior state.
    pub fn reset(&mut self, bus: &mut dyn Bus) {
        self.sp = 0xFD;
        self.status.insert(Status::I);
        self.irq_pending = false;
        self.nmi_pending = false;
        self.interrupt_this_cycle = false;
        self.interrupt_prev_cycle = false;
        self.cycles = 0;
        self.pc = bus.read_u16(0xFFFC);
    }

    /// Asserts the IRQ line. Level-triggered: stays pending until
    /// [`Cpu::clear_irq`] is called, and is re-evaluated on every cycle
    /// while asserted.
    pub fn raise_irq(&mut self) {
        self.irq_pending = true;
    }

    /// Deasserts the IRQ line.
    pub fn clear_irq(&mut self) {
        self.irq_pending = false;
    }

    /// Raises the NMI line. Edge-triggered: one-shot, cleared automatically
    /// once serviced.
    pub fn raise_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Reports whether the CPU currently has the IRQ line asserted.
    #[must_use]
    pub fn irq_line(&self) -> bool {
        self.irq_pending
    }

    /// Reports whether an NMI is latched and awaiting service.
    #[must_use]
    pub fn nmi_line(&self) -> bool {
        self.nmi_pending
    }

    /// Fetches, decodes, and executes one instruction, then services an
    /// interrupt if the one-cycle polling latch says one became pending by
    /// the instruction's last cycle. Returns once the instruction — and any
    /// interrupt service it triggers — has fully completed, so a single call
    /// can consume more than the instruction's own base cycle count.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::UnsupportedOpcode`] if the fetched byte is not
    /// one of the 151 documented opcodes. `PC` has already advanced past the
    /// offending byte when this happens.
    pub fn step(&mut self, bus: &mut dyn Bus) -> Result<(), CpuError> {
        let opcode_byte = self.fetch_opcode(bus);
        self.opcode = opcode_byte;

        let Opcode { mnemonic, mode, .. } = opcode::decode(opcode_byte).ok_or({
            CpuError::UnsupportedOpcode {
                opcode: opcode_byte,
                pc: self.pc,
            }
        })?;

        log::trace!(
            "step: opcode=0x{:02X} mnemonic={:?} mode={:?} pc=0x{:04X}",
            opcode_byte,
            mnemonic,
            mode,
            self.pc.wrapping_sub(1)
        );

        let operand = if matches!(mode, addressing::AddressingMode::Relative) {
            Operand::Implied
        } else {
            addressing::resolve(self, bus, mode)
        };

        instructions::execute(self, bus, mnemonic, mode, operand);

        if self.interrupt_prev_cycle {
            self.interrupt_prev_cycle = false;
            self.service_interrupt(bus);
        }

        Ok(())
    }

    /// Services whichever interrupt is pending, NMI taking priority over
    /// IRQ. Mirrors the BRK sequence but pushes `P` with `B` cleared and
    /// leaves `PC` untouched going in (no instruction was fetched for this
    /// cycle, so there is nothing to "undo").
    fn service_interrupt(&mut self, bus: &mut dyn Bus) {
        let is_nmi = self.nmi_pending;
        let vector = if is_nmi { 0xFFFA } else { 0xFFFE };

        // Two cycles standing in for the opcode-fetch-equivalent and
        // internal delay a real interrupt sequence spends before it starts
        // pushing state, so the total matches the documented 7 cycles.
        self.bus_read(bus, self.pc);
        self.internal_cycle();

        self.push_word(bus, self.pc);
        let status_byte = self.status.to_stack_byte(false);
        self.push_byte(bus, status_byte);
        self.status.insert(Status::I);

        let lo = self.bus_read(bus, vector);
        let hi = self.bus_read(bus, vector + 1);
        self.pc = u16::from_le_bytes([lo, hi]);

        if is_nmi {
            self.nmi_pending = false;
            log::trace!("serviced NMI, pc=0x{:04X}", self.pc);
        } else {
            log::trace!("serviced IRQ, pc=0x{:04X}", self.pc);
        }
    }

    /// Executes the software-interrupt (BRK) sequence: pushes `PC+1` then
    /// `P` with `B=1`, sets `I`, and loads `PC` from the IRQ/BRK vector.
    /// Unlike a hardware interrupt, NMI can "hijack" BRK if it becomes
    /// pending in the cycles between the padding-byte read and the status
    /// push; real hardware does this and test corpora rely on it.
    pub(crate) fn brk(&mut self, bus: &mut dyn Bus) {
        self.bus_read(bus, self.pc); // padding byte, discarded
        self.pc = self.pc.wrapping_add(1);

        self.push_word(bus, self.pc);

        let hijack_nmi = self.nmi_pending;
        let status_byte = self.status.to_stack_byte(true);
        self.push_byte(bus, status_byte);
        self.status.insert(Status::I);

        let vector = if hijack_nmi { 0xFFFA } else { 0xFFFE };
        if hijack_nmi {
            self.nmi_pending = false;
        }
        let lo = self.bus_read(bus, vector);
        let hi = self.bus_read(bus, vector + 1);
        self.pc = u16::from_le_bytes([lo, hi]);
    }

    /// Executes RTI: pulls `P` (discarding B and the reserved bit), then
    /// `PC` low, then `PC` high. No `+1` adjustment, unlike RTS.
    pub(crate) fn rti(&mut self, bus: &mut dyn Bus) {
        self.bus_read(bus, self.pc); // dummy read of the next byte, discarded
        self.internal_cycle();
        let status_byte = self.pop_byte(bus);
        self.status = Status::from_stack_byte(status_byte);
        self.pc = self.pop_word(bus);
    }

    /// Sets Z and N from `value`, as every register write that ends an
    /// instruction does unless explicitly noted (stores, TXS, and pushes do
    /// not call this).
    pub(crate) fn set_zn(&mut self, value: u8) {
        self.status.set_zn(value);
    }

    /// Advances every-cycle interrupt bookkeeping: recomputes whether an
    /// interrupt condition holds right now, and latches the previous value
    /// one cycle behind it. This is the mechanism behind the 6502's
    /// well-known one-instruction interrupt-polling delay.
    fn tick(&mut self) {
        self.cycles += 1;
        self.interrupt_prev_cycle = self.interrupt_this_cycle;
        self.interrupt_this_cycle =
            self.nmi_pending || (self.irq_pending && !self.status.contains(Status::I));
    }

    /// Fetches the opcode byte at `PC` and advances `PC`. Costs one cycle.
    fn fetch_opcode(&mut self, bus: &mut dyn Bus) -> u8 {
        let byte = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        self.tick();
        byte
    }

    /// Fetches one operand byte at `PC` and advances `PC`. Costs one cycle.
    pub(crate) fn fetch_operand_byte(&mut self, bus: &mut dyn Bus) -> u8 {
        let byte = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        self.tick();
        byte
    }

    /// Performs one bus read at `addr` without touching `PC`. Used both for
    /// "real" reads and for the dummy reads the addressing-mode resolver and
    /// RMW instructions require for cycle fidelity. Costs one cycle.
    pub(crate) fn bus_read(&mut self, bus: &mut dyn Bus, addr: u16) -> u8 {
        let value = bus.read(addr);
        self.tick();
        value
    }

    /// Performs one bus write. Costs one cycle.
    pub(crate) fn bus_write(&mut self, bus: &mut dyn Bus, addr: u16, value: u8) {
        bus.write(addr, value);
        self.tick();
    }

    /// An internal (non-bus) cycle: the "please take one more cycle" delays
    /// JSR/RTS/RTI/PLA/PLP/BRK perform that do not correspond to any address
    /// appearing on the bus. Still costs one cycle and still advances the
    /// interrupt-polling latch, since both are defined per-cycle, not
    /// per-bus-transaction.
    pub(crate) fn internal_cycle(&mut self) {
        self.tick();
    }

    /// Pushes one byte to `0x0100 | SP`, then decrements `SP`.
    pub(crate) fn push_byte(&mut self, bus: &mut dyn Bus, value: u8) {
        let addr = 0x0100 | u16::from(self.sp);
        self.bus_write(bus, addr, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Pushes a 16-bit value high-byte-first, matching JSR/BRK/interrupt
    /// stack order: high ends up at `0x100|SP`, low at `0x100|(SP-1)`.
    pub(crate) fn push_word(&mut self, bus: &mut dyn Bus, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push_byte(bus, hi);
        self.push_byte(bus, lo);
    }

    /// Increments `SP`, then reads the byte now on top of the stack.
    pub(crate) fn pop_byte(&mut self, bus: &mut dyn Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        let addr = 0x0100 | u16::from(self.sp);
        self.bus_read(bus, addr)
    }

    /// Pops a 16-bit value low byte first (the inverse of `push_word`).
    pub(crate) fn pop_word(&mut self, bus: &mut dyn Bus) -> u16 {
        let lo = self.pop_byte(bus);
        let hi = self.pop_byte(bus);
        u16::from_le_bytes([lo, hi])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Memory;

    fn setup(program: &[u8], entry: u16) -> (Cpu, Memory) {
        let mut mem = Memory::new();
        for (i, &byte) in program.iter().enumerate() {
            mem.write(entry.wrapping_add(i as u16), byte);
        }
        let [lo, hi] = entry.to_le_bytes();
        mem.write(0xFFFC, lo);
        mem.write(0xFFFD, hi);
        let mut cpu = Cpu::new();
        cpu.reset(&mut mem);
        (cpu, mem)
    }

    #[test]
    fn reset_loads_pc_from_vector_and_sets_sp() {
        let (cpu, _mem) = setup(&[], 0x8000);
        assert_eq!(cpu.pc, 0x8000);
        assert_eq!(cpu.sp, 0xFD);
        assert!(cpu.status.contains(Status::I));
        assert_eq!(cpu.cycles, 0);
    }

    #[test]
    fn unsupported_opcode_is_fatal() {
        let (mut cpu, mut mem) = setup(&[0x02], 0x8000); // undocumented JAM
        let err = cpu.step(&mut mem).unwrap_err();
        assert_eq!(
            err,
            CpuError::UnsupportedOpcode {
                opcode: 0x02,
                pc: 0x8001
            }
        );
    }

    #[test]
    fn s1_lda_then_adc() {
        let (mut cpu, mut mem) = setup(&[0xA9, 0x05, 0x69, 0x03], 0x0000);
        cpu.step(&mut mem).unwrap();
        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.a, 0x08);
        assert!(!cpu.status.contains(Status::C));
        assert!(!cpu.status.contains(Status::Z));
        assert!(!cpu.status.contains(Status::N));
        assert!(!cpu.status.contains(Status::V));
        assert_eq!(cpu.cycles, 4);
        assert_eq!(cpu.pc, 0x0004);
    }

    #[test]
    fn s2_adc_signed_overflow() {
        let (mut cpu, mut mem) = setup(&[0xA9, 0x7F, 0x69, 0x01], 0x0000);
        cpu.step(&mut mem).unwrap();
        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.a, 0x80);
        assert!(cpu.status.contains(Status::N));
        assert!(cpu.status.contains(Status::V));
        assert!(!cpu.status.contains(Status::C));
        assert!(!cpu.status.contains(Status::Z));
    }

    #[test]
    fn s3_bcd_add() {
        let (mut cpu, mut mem) = setup(&[0xF8, 0xA9, 0x15, 0x69, 0x27], 0x0000);
        cpu.step(&mut mem).unwrap(); // SED
        cpu.step(&mut mem).unwrap(); // LDA #$15
        cpu.step(&mut mem).unwrap(); // ADC #$27
        assert_eq!(cpu.a, 0x42);
        assert!(!cpu.status.contains(Status::C));
        assert!(cpu.status.contains(Status::D));
    }

    #[test]
    fn s4_jmp_indirect_page_wrap_bug() {
        let mut mem = Memory::new();
        mem.write(0x0000, 0x6C);
        mem.write(0x0001, 0xFF);
        mem.write(0x0002, 0x01);
        mem.write(0x01FF, 0x03);
        mem.write(0x0100, 0x02);
        mem.write(0xFFFC, 0x00);
        mem.write(0xFFFD, 0x00);
        let mut cpu = Cpu::new();
        cpu.reset(&mut mem);
        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.pc, 0x0203);
        assert_eq!(cpu.cycles, 5);
    }

    #[test]
    fn s5_jsr_rts_round_trip() {
        let (mut cpu, mut mem) = setup(&[0x20, 0x04, 0x00, 0x00, 0x60], 0x0000);
        let sp_before = cpu.sp;
        cpu.step(&mut mem).unwrap(); // JSR
        cpu.step(&mut mem).unwrap(); // RTS
        assert_eq!(cpu.pc, 0x0003);
        assert_eq!(cpu.sp, sp_before);
        assert_eq!(cpu.cycles, 12);
    }

    #[test]
    fn s6_brk_rti() {
        let mut mem = Memory::new();
        mem.write(0x0000, 0x00); // BRK
        mem.write(0xFFFE, 0xBC);
        mem.write(0xFFFF, 0xCD);
        mem.write(0xFFFC, 0x00);
        mem.write(0xFFFD, 0x00);
        let mut cpu = Cpu::new();
        cpu.reset(&mut mem);
        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.pc, 0xCDBC);
        assert!(cpu.status.contains(Status::I));
        assert_eq!(cpu.cycles, 7);
        assert_eq!(mem.read(0x01FD), 0x00); // PCH
        assert_eq!(mem.read(0x01FC), 0x02); // PCL
        assert_eq!(mem.read(0x01FB) & 0x10, 0x10); // B set in pushed P
    }

    #[test]
    fn rti_restores_pc_and_status_and_costs_six_cycles() {
        let mut mem = Memory::new();
        mem.write(0x0000, 0x00); // BRK
        mem.write(0xFFFE, 0x40); // handler: RTI
        mem.write(0x0040, 0x40);
        mem.write(0xFFFC, 0x00);
        mem.write(0xFFFD, 0x00);
        let mut cpu = Cpu::new();
        cpu.reset(&mut mem);
        cpu.status.insert(Status::C);
        cpu.step(&mut mem).unwrap(); // BRK: pushes PC=0x0002, P with C set and B set
        let cycles_after_brk = cpu.cycles;
        cpu.step(&mut mem).unwrap(); // RTI
        assert_eq!(cpu.pc, 0x0002);
        assert!(cpu.status.contains(Status::C));
        assert!(!cpu.status.contains(Status::B));
        assert_eq!(cpu.cycles - cycles_after_brk, 6);
    }

    #[test]
    fn pha_pla_round_trips_accumulator() {
        let (mut cpu, mut mem) = setup(&[0xA9, 0x42, 0x48, 0xA9, 0x00, 0x68], 0x0000);
        cpu.step(&mut mem).unwrap(); // LDA #$42
        cpu.step(&mut mem).unwrap(); // PHA
        cpu.step(&mut mem).unwrap(); // LDA #$00
        assert_eq!(cpu.a, 0x00);
        cpu.step(&mut mem).unwrap(); // PLA
        assert_eq!(cpu.a, 0x42);
    }

    #[test]
    fn php_plp_round_trips_flags_clearing_b_and_u() {
        let (mut cpu, mut mem) = setup(&[0x38, 0x08, 0x18, 0x28], 0x0000);
        cpu.step(&mut mem).unwrap(); // SEC
        cpu.step(&mut mem).unwrap(); // PHP (pushes with B=1,U=1)
        cpu.step(&mut mem).unwrap(); // CLC
        assert!(!cpu.status.contains(Status::C));
        cpu.step(&mut mem).unwrap(); // PLP
        assert!(cpu.status.contains(Status::C));
        assert!(!cpu.status.contains(Status::B));
    }

    #[test]
    fn irq_is_deferred_through_the_instruction_following_cli() {
        // SEI, CLI, NOP. CLI's own last cycle polls with the *old* I value
        // (still set), so the IRQ is not recognized until the NOP that
        // follows CLI has itself fully executed.
        let (mut cpu, mut mem) = setup(&[0x78, 0x58, 0xEA], 0x8000);
        mem.write(0xFFFE, 0x00);
        mem.write(0xFFFF, 0x90);
        cpu.step(&mut mem).unwrap(); // SEI
        cpu.raise_irq();
        cpu.step(&mut mem).unwrap(); // CLI: I clears, IRQ not yet recognized
        assert_eq!(cpu.pc, 0x8002);
        assert!(!cpu.status.contains(Status::I));
        cpu.step(&mut mem).unwrap(); // NOP runs, then the IRQ is serviced
        assert_eq!(cpu.pc, 0x9000);
        assert!(cpu.status.contains(Status::I));
    }

    #[test]
    fn nmi_takes_priority_over_irq() {
        let (mut cpu, mut mem) = setup(&[0xEA], 0x8000);
        mem.write(0xFFFA, 0x00);
        mem.write(0xFFFB, 0x90);
        mem.write(0xFFFE, 0x00);
        mem.write(0xFFFF, 0xA0);
        cpu.raise_irq();
        cpu.raise_nmi();
        cpu.status.remove(Status::I);
        cpu.step(&mut mem).unwrap(); // NOP runs, then NMI (not IRQ) is serviced
        assert_eq!(cpu.pc, 0x9000);
    }
}
