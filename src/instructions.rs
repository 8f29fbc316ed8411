//! Instruction bodies: the per-mnemonic effect an opcode has once its
//! operand has been resolved.
//!
//! Every function here assumes the opcode byte has already been fetched and
//! its addressing mode already resolved by [`crate::addressing::resolve`];
//! this module only spends the cycles an instruction's *own* effect costs
//! beyond that (the read/write/internal cycles the addressing-mode table
//! does not already account for).

use crate::addressing::{AddressingMode, Operand};
use crate::alu;
use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::opcode::Mnemonic;
use crate::status::Status;

/// Dispatches one decoded instruction to its implementation.
pub(crate) fn execute(
    cpu: &mut Cpu,
    bus: &mut dyn Bus,
    mnemonic: Mnemonic,
    mode: AddressingMode,
    operand: Operand,
) {
    use Mnemonic::*;

    match mnemonic {
        Lda => load(cpu, bus, operand, Register::A),
        Ldx => load(cpu, bus, operand, Register::X),
        Ldy => load(cpu, bus, operand, Register::Y),
        Sta => {
            let value = cpu.a;
            store(cpu, bus, operand, value);
        }
        Stx => {
            let value = cpu.x;
            store(cpu, bus, operand, value);
        }
        Sty => {
            let value = cpu.y;
            store(cpu, bus, operand, value);
        }

        Tax => {
            let value = cpu.a;
            transfer(cpu, bus, value, Register::X, true);
        }
        Tay => {
            let value = cpu.a;
            transfer(cpu, bus, value, Register::Y, true);
        }
        Txa => {
            let value = cpu.x;
            transfer(cpu, bus, value, Register::A, true);
        }
        Tya => {
            let value = cpu.y;
            transfer(cpu, bus, value, Register::A, true);
        }
        Tsx => {
            let value = cpu.sp;
            transfer(cpu, bus, value, Register::X, true);
        }
        Txs => {
            let value = cpu.x;
            transfer(cpu, bus, value, Register::Sp, false);
        }

        Pha => pha(cpu, bus),
        Php => php(cpu, bus),
        Pla => pla(cpu, bus),
        Plp => plp(cpu, bus),

        Adc => adc_sbc(cpu, bus, operand, false),
        Sbc => adc_sbc(cpu, bus, operand, true),
        And => logical(cpu, bus, operand, |a, m| a & m),
        Ora => logical(cpu, bus, operand, |a, m| a | m),
        Eor => logical(cpu, bus, operand, |a, m| a ^ m),
        Bit => bit(cpu, bus, operand),

        Asl => shift(cpu, bus, mode, operand, alu::asl),
        Lsr => shift(cpu, bus, mode, operand, alu::lsr),
        Rol => {
            let carry_in = alu::carry(cpu.status);
            shift(cpu, bus, mode, operand, move |v| alu::rol(v, carry_in));
        }
        Ror => {
            let carry_in = alu::carry(cpu.status);
            shift(cpu, bus, mode, operand, move |v| alu::ror(v, carry_in));
        }

        Inc => read_modify_write(cpu, bus, operand, |v| v.wrapping_add(1)),
        Dec => read_modify_write(cpu, bus, operand, |v| v.wrapping_sub(1)),
        Inx => increment(cpu, Register::X, 1),
        Iny => increment(cpu, Register::Y, 1),
        Dex => increment(cpu, Register::X, -1),
        Dey => increment(cpu, Register::Y, -1),

        Cmp => {
            let register = cpu.a;
            compare(cpu, bus, operand, register);
        }
        Cpx => {
            let register = cpu.x;
            compare(cpu, bus, operand, register);
        }
        Cpy => {
            let register = cpu.y;
            compare(cpu, bus, operand, register);
        }

        Bcc => {
            let taken = !cpu.status.contains(Status::C);
            branch(cpu, bus, taken);
        }
        Bcs => {
            let taken = cpu.status.contains(Status::C);
            branch(cpu, bus, taken);
        }
        Beq => {
            let taken = cpu.status.contains(Status::Z);
            branch(cpu, bus, taken);
        }
        Bne => {
            let taken = !cpu.status.contains(Status::Z);
            branch(cpu, bus, taken);
        }
        Bmi => {
            let taken = cpu.status.contains(Status::N);
            branch(cpu, bus, taken);
        }
        Bpl => {
            let taken = !cpu.status.contains(Status::N);
            branch(cpu, bus, taken);
        }
        Bvc => {
            let taken = !cpu.status.contains(Status::V);
            branch(cpu, bus, taken);
        }
        Bvs => {
            let taken = cpu.status.contains(Status::V);
            branch(cpu, bus, taken);
        }

        Jmp => cpu.pc = operand.address(),
        Jsr => jsr(cpu, bus, operand),
        Rts => rts(cpu, bus),

        Brk => cpu.brk(bus),
        Rti => cpu.rti(bus),

        Clc => flag(cpu, bus, Status::C, false),
        Sec => flag(cpu, bus, Status::C, true),
        Cld => flag(cpu, bus, Status::D, false),
        Sed => flag(cpu, bus, Status::D, true),
        Cli => flag(cpu, bus, Status::I, false),
        Sei => flag(cpu, bus, Status::I, true),
        Clv => flag(cpu, bus, Status::V, false),

        Nop => {
            cpu.bus_read(bus, cpu.pc);
        }
    }
}

#[derive(Clone, Copy)]
enum Register {
    A,
    X,
    Y,
    Sp,
}

fn load(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand, register: Register) {
    let value = read_operand(cpu, bus, operand);
    write_register(cpu, register, value);
    cpu.set_zn(value);
}

fn store(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand, value: u8) {
    cpu.bus_write(bus, operand.address(), value);
}

fn transfer(
    cpu: &mut Cpu,
    bus: &mut dyn Bus,
    value: u8,
    destination: Register,
    affects_flags: bool,
) {
    cpu.bus_read(bus, cpu.pc);
    write_register(cpu, destination, value);
    if affects_flags {
        let written = read_register(cpu, destination);
        cpu.set_zn(written);
    }
}

fn write_register(cpu: &mut Cpu, register: Register, value: u8) {
    match register {
        Register::A => cpu.a = value,
        Register::X => cpu.x = value,
        Register::Y => cpu.y = value,
        Register::Sp => cpu.sp = value,
    }
}

fn read_register(cpu: &Cpu, register: Register) -> u8 {
    match register {
        Register::A => cpu.a,
        Register::X => cpu.x,
        Register::Y => cpu.y,
        Register::Sp => cpu.sp,
    }
}

fn pha(cpu: &mut Cpu, bus: &mut dyn Bus) {
    cpu.bus_read(bus, cpu.pc);
    cpu.push_byte(bus, cpu.a);
}

fn php(cpu: &mut Cpu, bus: &mut dyn Bus) {
    cpu.bus_read(bus, cpu.pc);
    let byte = cpu.status.to_stack_byte(true);
    cpu.push_byte(bus, byte);
}

fn pla(cpu: &mut Cpu, bus: &mut dyn Bus) {
    cpu.bus_read(bus, cpu.pc);
    cpu.internal_cycle();
    let value = cpu.pop_byte(bus);
    cpu.a = value;
    cpu.set_zn(value);
}

fn plp(cpu: &mut Cpu, bus: &mut dyn Bus) {
    cpu.bus_read(bus, cpu.pc);
    cpu.internal_cycle();
    let value = cpu.pop_byte(bus);
    cpu.status = Status::from_stack_byte(value);
}

fn read_operand(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> u8 {
    cpu.bus_read(bus, operand.address())
}

fn adc_sbc(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand, subtract: bool) {
    let value = read_operand(cpu, bus, operand);
    let carry_in = alu::carry(cpu.status);
    let decimal = alu::decimal(cpu.status);
    let result = if subtract {
        alu::sbc(cpu.a, value, carry_in, decimal)
    } else {
        alu::adc(cpu.a, value, carry_in, decimal)
    };
    cpu.a = result.value;
    cpu.status.set_flag(Status::C, result.carry);
    cpu.status.set_flag(Status::V, result.overflow);
    cpu.set_zn(result.nz_source);
}

fn logical(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand, op: fn(u8, u8) -> u8) {
    let value = read_operand(cpu, bus, operand);
    cpu.a = op(cpu.a, value);
    cpu.set_zn(cpu.a);
}

fn bit(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) {
    let value = read_operand(cpu, bus, operand);
    cpu.status.set_flag(Status::Z, cpu.a & value == 0);
    cpu.status.set_flag(Status::V, value & 0x40 != 0);
    cpu.status.set_flag(Status::N, value & 0x80 != 0);
}

fn shift(
    cpu: &mut Cpu,
    bus: &mut dyn Bus,
    mode: AddressingMode,
    operand: Operand,
    op: impl Fn(u8) -> alu::ShiftResult,
) {
    if matches!(mode, AddressingMode::Accumulator) {
        cpu.internal_cycle();
        let result = op(cpu.a);
        cpu.a = result.value;
        cpu.status.set_flag(Status::C, result.carry);
        cpu.set_zn(cpu.a);
        return;
    }

    let addr = operand.address();
    let value = cpu.bus_read(bus, addr);
    let result = op(value);
    cpu.bus_write(bus, addr, value); // dummy write-back of the unmodified value
    cpu.bus_write(bus, addr, result.value);
    cpu.status.set_flag(Status::C, result.carry);
    cpu.set_zn(result.value);
}

fn read_modify_write(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand, op: fn(u8) -> u8) {
    let addr = operand.address();
    let value = cpu.bus_read(bus, addr);
    let new_value = op(value);
    cpu.bus_write(bus, addr, value); // dummy write-back of the unmodified value
    cpu.bus_write(bus, addr, new_value);
    cpu.set_zn(new_value);
}

fn increment(cpu: &mut Cpu, register: Register, delta: i8) {
    cpu.internal_cycle();
    let current = read_register(cpu, register);
    let new_value = if delta >= 0 {
        current.wrapping_add(delta as u8)
    } else {
        current.wrapping_sub(delta.unsigned_abs())
    };
    write_register(cpu, register, new_value);
    cpu.set_zn(new_value);
}

fn compare(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand, register: u8) {
    let value = read_operand(cpu, bus, operand);
    let result = alu::compare(register, value);
    cpu.status.set_flag(Status::C, result.carry);
    cpu.status.set_flag(Status::Z, result.zero);
    cpu.status.set_flag(Status::N, result.negative);
}

fn branch(cpu: &mut Cpu, bus: &mut dyn Bus, condition: bool) {
    let offset = cpu.fetch_operand_byte(bus) as i8;
    if !condition {
        return;
    }
    cpu.internal_cycle();
    let old_pc = cpu.pc;
    let new_pc = old_pc.wrapping_add(offset as i16 as u16);
    if old_pc & 0xFF00 != new_pc & 0xFF00 {
        cpu.internal_cycle();
    }
    cpu.pc = new_pc;
}

fn jsr(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) {
    let target = operand.address();
    cpu.internal_cycle();
    let return_addr = cpu.pc.wrapping_sub(1);
    cpu.push_word(bus, return_addr);
    cpu.pc = target;
}

fn rts(cpu: &mut Cpu, bus: &mut dyn Bus) {
    cpu.bus_read(bus, cpu.pc);
    cpu.internal_cycle();
    let addr = cpu.pop_word(bus);
    cpu.pc = addr.wrapping_add(1);
    cpu.internal_cycle();
}

fn flag(cpu: &mut Cpu, bus: &mut dyn Bus, which: Status, value: bool) {
    // Dummy read first, then write: a pending IRQ's poll during this
    // instruction's own last cycle must see the *old* value of I, matching
    // the documented one-instruction delay after CLI/SEI change it.
    cpu.bus_read(bus, cpu.pc);
    cpu.status.set_flag(which, value);
}
