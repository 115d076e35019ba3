use crate::{
    definitions::{cpu, display, memory},
    opcode::{Arithmetic, Instruction, Operation, ProgramCounter, ProgramCounterStep, Special},
    timer::TimedWorker,
    ProcessError,
};

use super::{
    machine::{memory_range, memory_range_mut},
    Machine,
};

impl<W: TimedWorker> Machine<W> {
    /// Will apply a single decoded instruction to the machine.
    ///
    /// The program counter already points past the instruction, every step taken here
    /// is relative to that. On error the instruction has not changed any state.
    pub fn execute(&mut self, instruction: Instruction) -> Result<Operation, ProcessError> {
        log::debug!("{:#06X} - {:?}", self.opcode, instruction);

        let mut operation = Operation::None;
        let step = match instruction {
            Instruction::Clear => {
                // 00E0
                self.display.clear();
                operation = Operation::Draw;
                ProgramCounterStep::Next
            }
            Instruction::Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.stack.pop()?;
                log::debug!("pc {:#X}", pc);
                ProgramCounterStep::Jump(pc)
            }
            Instruction::Jump { nnn } => ProgramCounterStep::Jump(nnn),
            Instruction::Call { nnn } => {
                // 2NNN
                // the pushed address is the instruction after the call
                self.stack.push(self.program_counter)?;
                ProgramCounterStep::Jump(nnn)
            }
            Instruction::SkipIfEqual { x, nn } => ProgramCounterStep::cond(self.registers[x] == nn),
            Instruction::SkipIfNotEqual { x, nn } => {
                ProgramCounterStep::cond(self.registers[x] != nn)
            }
            Instruction::SkipIfRegistersEqual { x, y } => {
                ProgramCounterStep::cond(self.registers[x] == self.registers[y])
            }
            Instruction::Set { x, nn } => {
                self.registers[x] = nn;
                ProgramCounterStep::Next
            }
            Instruction::Add { x, nn } => {
                // 7XNN
                // Adds NN to VX. (Carry flag is not changed)
                self.registers[x] = self.registers[x].wrapping_add(nn);
                ProgramCounterStep::Next
            }
            Instruction::Arithmetic { op, x, y } => {
                self.arithmetic(op, x, y);
                ProgramCounterStep::Next
            }
            Instruction::SkipIfRegistersNotEqual { x, y } => {
                ProgramCounterStep::cond(self.registers[x] != self.registers[y])
            }
            Instruction::SetIndex { nnn } => {
                self.index_register = nnn;
                ProgramCounterStep::Next
            }
            Instruction::JumpWithOffset { nnn } => {
                // BNNN
                // Jumps to the address NNN plus V0.
                ProgramCounterStep::Jump(nnn.wrapping_add(self.registers[0] as u16))
            }
            Instruction::Random { x, nn } => {
                // using a fill bytes call here, as the trait RngCore does not
                // support random u8.
                let mut rand: [u8; 1] = [0];
                self.rng.fill_bytes(&mut rand);
                self.registers[x] = nn & rand[0];
                ProgramCounterStep::Next
            }
            Instruction::Draw { x, y, n } => {
                self.draw(x, y, n)?;
                operation = Operation::Draw;
                ProgramCounterStep::Next
            }
            Instruction::SkipIfPressed { x } => {
                ProgramCounterStep::cond(self.keys.contains(self.registers[x]))
            }
            Instruction::SkipIfNotPressed { x } => {
                ProgramCounterStep::cond(!self.keys.contains(self.registers[x]))
            }
            Instruction::Special { op, x } => {
                self.special(op, x)?;
                ProgramCounterStep::Next
            }
        };

        self.step(step);
        Ok(operation)
    }

    /// The `8XYT` group, the flag is always computed from the values before the
    /// operation and written after the result, so `VF` as `X` ends up holding the flag.
    fn arithmetic(&mut self, op: Arithmetic, x: usize, y: usize) {
        let vx = self.registers[x];
        let vy = self.registers[y];

        let (result, flag) = match op {
            Arithmetic::Assign => (vy, None),
            Arithmetic::Or => (vx | vy, None),
            Arithmetic::And => (vx & vy, None),
            Arithmetic::Xor => (vx ^ vy, None),
            Arithmetic::Add => {
                let (sum, carry) = vx.overflowing_add(vy);
                (sum, Some(carry as u8))
            }
            Arithmetic::Sub => (vx.wrapping_sub(vy), Some((vx >= vy) as u8)),
            Arithmetic::ShiftRight => (vy >> 1, Some(vy & 0x1)),
            Arithmetic::SubReverse => (vy.wrapping_sub(vx), Some((vy >= vx) as u8)),
            Arithmetic::ShiftLeft => (vy << 1, Some(vy >> 7)),
        };

        self.registers[x] = result;
        if let Some(flag) = flag {
            self.registers[cpu::register::LAST] = flag;
        }
    }

    /// DXYN
    /// Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height of N
    /// pixels. Each row of 8 pixels is read as bit-coded starting from memory location I; I
    /// value doesn’t change after the execution of this instruction. VF is set to 1 if any
    /// screen pixels are flipped from set to unset when the sprite is drawn, and to 0 if that
    /// doesn’t happen. Every pixel wraps around the edges on its own.
    fn draw(&mut self, x: usize, y: usize, n: u8) -> Result<(), ProcessError> {
        let sprite = memory_range(&self.memory, self.index_register, n as usize)?;

        let rows = self.display.rows();
        let cols = self.display.cols();
        let origin_x = self.registers[x] as usize % cols;
        let origin_y = self.registers[y] as usize % rows;

        let mut collision = false;
        for (i, row) in sprite.iter().enumerate() {
            let py = (origin_y + i) % rows;
            // most significant bit first
            for j in 0..display::SPRITE_WIDTH {
                if *row & (0x80u8 >> j) == 0 {
                    continue;
                }
                let px = (origin_x + j) % cols;
                collision |= self.display.set_pixel(px as isize, py as isize);
            }
        }

        self.registers[cpu::register::LAST] = collision as u8;
        Ok(())
    }

    /// The `FXTT` group.
    fn special(&mut self, op: Special, x: usize) -> Result<(), ProcessError> {
        match op {
            Special::GetDelayTimer => self.registers[x] = self.timers.delay(),
            Special::AwaitKeyPress => {
                // FX0A
                // A key press is awaited, and then stored in VX. (Blocking Operation. All
                // instruction halted until next key event)
                log::debug!("Waiting for a key press");
                self.registers[x] = self.keys.wait_for_key()?;
            }
            Special::SetDelayTimer => self.timers.set_delay(self.registers[x]),
            Special::SetSoundTimer => self.timers.set_sound(self.registers[x]),
            Special::AddVxToI => {
                // FX1E
                // VF is only touched when I leaves the address space. I sticks at the top
                // instead of wrapping, so later accesses through it fail.
                self.index_register = self
                    .index_register
                    .saturating_add(self.registers[x] as u16);
                if self.index_register > memory::ADDRESS_SPACE {
                    self.registers[cpu::register::LAST] = 1;
                }
            }
            Special::SetIToSprite => {
                // FX29
                // only the low nibble selects the glyph
                let glyph = (self.registers[x] & 0xF) as u16;
                self.index_register =
                    display::fontset::LOCATION + display::fontset::GLYPH_SIZE * glyph;
            }
            Special::StoreBCD => {
                // FX33
                // hundreds digit at I, tens digit at I+1 and ones digit at I+2
                let value = self.registers[x];
                let target = memory_range_mut(&mut self.memory, self.index_register, 3)?;
                target.copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
            }
            Special::StoreV0ToVx => {
                // FX55
                // I itself is left unmodified
                let target = memory_range_mut(&mut self.memory, self.index_register, x + 1)?;
                target.copy_from_slice(&self.registers[..=x]);
            }
            Special::FillV0ToVx => {
                // FX65
                let source = memory_range(&self.memory, self.index_register, x + 1)?;
                self.registers[..=x].copy_from_slice(source);
            }
        }
        Ok(())
    }
}
