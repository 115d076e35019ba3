//! Opcode abstractions, decoding and constants.
use std::convert::TryFrom;

use crate::{definitions::memory, OpcodeError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a nibble in bits
const NIBBLE: u16 = 4;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(Err(err), build_opcode(&SPLIT_OPCODE, pointer));
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    match data.get(pointer..pointer.saturating_add(memory::opcodes::SIZE as usize)) {
        Some(&[high, low]) => Ok(Opcode::from_be_bytes([high, low])),
        _ => Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        }),
    }
}

/// These are special traits used to filter out the operand
/// fields of an opcode.
pub trait Operands {
    /// the opcode type, the top nibble `T___`
    fn t(&self) -> u8;

    /// the register index `_X__`
    fn x(&self) -> usize;

    /// the register index `__Y_`
    fn y(&self) -> usize;

    /// the four bit constant `___N`
    fn n(&self) -> u8;

    /// the eight bit constant `__NN`
    fn nn(&self) -> u8;

    /// the twelve bit address `_NNN`
    fn nnn(&self) -> u16;
}

impl Operands for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8 {
        ((self & OPCODE_MASK_F000) >> (3 * NIBBLE)) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> (2 * NIBBLE)) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.y(), 0xD);
    /// ```
    fn y(&self) -> usize {
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        ((self & MASK) >> NIBBLE) as usize
    }

    fn n(&self) -> u8 {
        (self & OPCODE_MASK_000F) as u8
    }

    fn nn(&self) -> u8 {
        (self & OPCODE_MASK_00FF) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.nnn(), 0xEDA);
    /// ```
    fn nnn(&self) -> u16 {
        self & OPCODE_MASK_0FFF
    }
}

/// The register to register operations of the `8XYT` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arithmetic {
    /// `8XY0` - `Vx = Vy`
    Assign,
    /// `8XY1` - `Vx |= Vy`
    Or,
    /// `8XY2` - `Vx &= Vy`
    And,
    /// `8XY3` - `Vx ^= Vy`
    Xor,
    /// `8XY4` - `Vx += Vy`, `VF` is the carry
    Add,
    /// `8XY5` - `Vx -= Vy`, `VF` is the no borrow flag
    Sub,
    /// `8XY6` - `Vx = Vy >> 1`, `VF` is the shifted out bit
    ShiftRight,
    /// `8XY7` - `Vx = Vy - Vx`, `VF` is the no borrow flag
    SubReverse,
    /// `8XYE` - `Vx = Vy << 1`, `VF` is the shifted out bit
    ShiftLeft,
}

impl TryFrom<u8> for Arithmetic {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let op = match value {
            0x0 => Arithmetic::Assign,
            0x1 => Arithmetic::Or,
            0x2 => Arithmetic::And,
            0x3 => Arithmetic::Xor,
            0x4 => Arithmetic::Add,
            0x5 => Arithmetic::Sub,
            0x6 => Arithmetic::ShiftRight,
            0x7 => Arithmetic::SubReverse,
            0xE => Arithmetic::ShiftLeft,
            _ => return Err(()),
        };
        Ok(op)
    }
}

/// The `FXTT` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    /// `FX07` - `Vx = get_delay()`
    GetDelayTimer,
    /// `FX0A` - `Vx = get_key()`, blocks until a key is pressed
    AwaitKeyPress,
    /// `FX15` - `delay_timer(Vx)`
    SetDelayTimer,
    /// `FX18` - `sound_timer(Vx)`
    SetSoundTimer,
    /// `FX1E` - `I += Vx`
    AddVxToI,
    /// `FX29` - `I = sprite_addr[Vx]`
    SetIToSprite,
    /// `FX33` - `set_BCD(Vx)`
    StoreBCD,
    /// `FX55` - `reg_dump(Vx, &I)`
    StoreV0ToVx,
    /// `FX65` - `reg_load(Vx, &I)`
    FillV0ToVx,
}

impl TryFrom<u8> for Special {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let op = match value {
            0x07 => Special::GetDelayTimer,
            0x0A => Special::AwaitKeyPress,
            0x15 => Special::SetDelayTimer,
            0x18 => Special::SetSoundTimer,
            0x1E => Special::AddVxToI,
            0x29 => Special::SetIToSprite,
            0x33 => Special::StoreBCD,
            0x55 => Special::StoreV0ToVx,
            0x65 => Special::FillV0ToVx,
            _ => return Err(()),
        };
        Ok(op)
    }
}

/// A fully decoded instruction with its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0` - clears the screen
    Clear,
    /// `00EE` - returns from a subroutine
    Return,
    /// `1NNN` - jumps to `NNN`
    Jump { nnn: u16 },
    /// `2NNN` - calls the subroutine at `NNN`
    Call { nnn: u16 },
    /// `3XNN` - skips the next instruction if `Vx == NN`
    SkipIfEqual { x: usize, nn: u8 },
    /// `4XNN` - skips the next instruction if `Vx != NN`
    SkipIfNotEqual { x: usize, nn: u8 },
    /// `5XY0` - skips the next instruction if `Vx == Vy`
    SkipIfRegistersEqual { x: usize, y: usize },
    /// `6XNN` - `Vx = NN`
    Set { x: usize, nn: u8 },
    /// `7XNN` - `Vx += NN`, the carry flag is not changed
    Add { x: usize, nn: u8 },
    /// `8XYT`
    Arithmetic { op: Arithmetic, x: usize, y: usize },
    /// `9XY0` - skips the next instruction if `Vx != Vy`
    SkipIfRegistersNotEqual { x: usize, y: usize },
    /// `ANNN` - `I = NNN`
    SetIndex { nnn: u16 },
    /// `BNNN` - jumps to `NNN + V0`
    JumpWithOffset { nnn: u16 },
    /// `CXNN` - `Vx = rand() & NN`
    Random { x: usize, nn: u8 },
    /// `DXYN` - draws an `N` rows high sprite at `(Vx, Vy)`
    Draw { x: usize, y: usize, n: u8 },
    /// `EX9E` - skips the next instruction if the key `Vx` is pressed
    SkipIfPressed { x: usize },
    /// `EXA1` - skips the next instruction if the key `Vx` is not pressed
    SkipIfNotPressed { x: usize },
    /// `FXTT`
    Special { op: Special, x: usize },
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
        let err = || OpcodeError::InvalidOpcode(opcode);
        let (x, y, n, nn, nnn) = (opcode.x(), opcode.y(), opcode.n(), opcode.nn(), opcode.nnn());

        let instruction = match opcode.t() {
            0x0 => match opcode {
                0x00E0 => Instruction::Clear,
                0x00EE => Instruction::Return,
                _ => return Err(err()),
            },
            0x1 => Instruction::Jump { nnn },
            0x2 => Instruction::Call { nnn },
            0x3 => Instruction::SkipIfEqual { x, nn },
            0x4 => Instruction::SkipIfNotEqual { x, nn },
            0x5 if n == 0 => Instruction::SkipIfRegistersEqual { x, y },
            0x6 => Instruction::Set { x, nn },
            0x7 => Instruction::Add { x, nn },
            0x8 => {
                let op = Arithmetic::try_from(n).map_err(|_| err())?;
                Instruction::Arithmetic { op, x, y }
            }
            0x9 if n == 0 => Instruction::SkipIfRegistersNotEqual { x, y },
            0xA => Instruction::SetIndex { nnn },
            0xB => Instruction::JumpWithOffset { nnn },
            0xC => Instruction::Random { x, nn },
            0xD => Instruction::Draw { x, y, n },
            0xE => match nn {
                0x9E => Instruction::SkipIfPressed { x },
                0xA1 => Instruction::SkipIfNotPressed { x },
                _ => return Err(err()),
            },
            0xF => {
                let op = Special::try_from(nn).map_err(|_| err())?;
                Instruction::Special { op, x }
            }
            _ => return Err(err()),
        };
        Ok(instruction)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip can take after an instruction,
/// the program counter already points at the following instruction by then.
pub enum ProgramCounterStep {
    /// Will continue with the following instruction
    Next,
    /// Will skip the following instruction
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(u16),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Applies the step to the given program counter.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(0x202, ProgramCounterStep::Next.apply(0x202));
    /// assert_eq!(0x204, ProgramCounterStep::Skip.apply(0x202));
    /// assert_eq!(0x420, ProgramCounterStep::Jump(0x420).apply(0x202));
    /// ```
    #[inline]
    pub fn apply(&self, pc: u16) -> u16 {
        match *self {
            ProgramCounterStep::Next => pc,
            ProgramCounterStep::Skip => pc.wrapping_add(memory::opcodes::SIZE),
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// Implemented by whatever owns a program counter.
pub trait ProgramCounter {
    /// Will move the program counter according to the step.
    fn step(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the frontend.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The display changed and shall be redrawn.
    Draw,
    /// The opcode could not be decoded and was skipped.
    Unknown(Opcode),
}

#[cfg(test)]
mod tests {
    use std::convert::TryInto;

    use super::*;

    #[test]
    fn test_operands() {
        let opcode: Opcode = 0xD4A7;
        assert_eq!(0xD, opcode.t());
        assert_eq!(0x4, opcode.x());
        assert_eq!(0xA, opcode.y());
        assert_eq!(0x7, opcode.n());
        assert_eq!(0xA7, opcode.nn());
        assert_eq!(0x4A7, opcode.nnn());
    }

    #[test]
    fn test_build_opcode_out_of_bounds() {
        let data = [0x12, 0x34, 0x56];
        assert_eq!(Ok(0x3456), build_opcode(&data, 1));
        assert_eq!(
            Err(OpcodeError::MemoryInvalid { pointer: 2, len: 3 }),
            build_opcode(&data, 2)
        );
        assert!(build_opcode(&data, usize::MAX - 1).is_err());
    }

    #[test]
    fn test_decode_simple() {
        let conv: Result<Instruction, _> = 0x00E0.try_into();
        assert_eq!(Ok(Instruction::Clear), conv);

        let conv: Result<Instruction, _> = 0x00E1.try_into();
        assert_eq!(Err(OpcodeError::InvalidOpcode(0x00E1)), conv);
    }

    #[test]
    fn test_decode_table() {
        let tests = [
            (0x00E0, Ok(Instruction::Clear)),
            (0x00EE, Ok(Instruction::Return)),
            (0x0123, Err(())),
            (0x1919, Ok(Instruction::Jump { nnn: 0x919 })),
            (0x2222, Ok(Instruction::Call { nnn: 0x222 })),
            (0x3123, Ok(Instruction::SkipIfEqual { x: 0x1, nn: 0x23 })),
            (0x4123, Ok(Instruction::SkipIfNotEqual { x: 0x1, nn: 0x23 })),
            (0x5120, Ok(Instruction::SkipIfRegistersEqual { x: 0x1, y: 0x2 })),
            (0x5121, Err(())),
            (0x6A02, Ok(Instruction::Set { x: 0xA, nn: 0x02 })),
            (0x7123, Ok(Instruction::Add { x: 0x1, nn: 0x23 })),
            (
                0x8124,
                Ok(Instruction::Arithmetic {
                    op: Arithmetic::Add,
                    x: 0x1,
                    y: 0x2,
                }),
            ),
            (
                0x812E,
                Ok(Instruction::Arithmetic {
                    op: Arithmetic::ShiftLeft,
                    x: 0x1,
                    y: 0x2,
                }),
            ),
            (0x8128, Err(())),
            (0x9120, Ok(Instruction::SkipIfRegistersNotEqual { x: 0x1, y: 0x2 })),
            (0x9121, Err(())),
            (0xA222, Ok(Instruction::SetIndex { nnn: 0x222 })),
            (0xB222, Ok(Instruction::JumpWithOffset { nnn: 0x222 })),
            (0xC123, Ok(Instruction::Random { x: 0x1, nn: 0x23 })),
            (0xD123, Ok(Instruction::Draw { x: 0x1, y: 0x2, n: 0x3 })),
            (0xE19E, Ok(Instruction::SkipIfPressed { x: 0x1 })),
            (0xE1A1, Ok(Instruction::SkipIfNotPressed { x: 0x1 })),
            (0xE111, Err(())),
            (
                0xF00A,
                Ok(Instruction::Special {
                    op: Special::AwaitKeyPress,
                    x: 0x0,
                }),
            ),
            (
                0xF533,
                Ok(Instruction::Special {
                    op: Special::StoreBCD,
                    x: 0x5,
                }),
            ),
            (0xF0AA, Err(())),
        ];
        for (value, res) in tests {
            let conv: Result<Instruction, _> = value.try_into();
            assert_eq!(conv, res.map_err(|_| OpcodeError::InvalidOpcode(value)));
        }
    }

    #[test]
    fn test_every_arithmetic_sub_opcode() {
        let valid = [0x0, 0x1, 0x2, 0x3, 0x4, 0x5, 0x6, 0x7, 0xE];
        for n in 0..=0xF_u8 {
            assert_eq!(valid.contains(&n), Arithmetic::try_from(n).is_ok());
        }
    }
}
