//! Opcode abstractions, functionality and constants.
use std::convert::TryFrom;

use crate::{definitions::memory, OpcodeError, ProcessError};

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

/// the size of a nibble
const NIBBLE: u16 = 4;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// the program counter, the index register and the stack entries are all
/// stored in 16 bit cells
pub type Address = u16;

/// will build an opcode from data and the given point, the first byte is the
/// high byte
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  assert_eq!(build_opcode(&SPLIT_OPCODE, 0), Some(0x00EE));
///  assert_eq!(build_opcode(&SPLIT_OPCODE, 2), Some(0x1EDA));
///  assert_eq!(build_opcode(&SPLIT_OPCODE, 3), None);
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Option<Opcode> {
    let high = *data.get(pointer)?;
    let low = *data.get(pointer + 1)?;
    Some(Opcode::from_be_bytes([high, low]))
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// the primary nibble `T` of any opcode `TXYN`
    fn t(&self) -> u8;

    /// the address `NNN` of the opcode type `TNNN`
    fn nnn(&self) -> Address;

    /// the register `X` and constant `NN` of the opcode type `TXNN`
    fn xnn(&self) -> (usize, u8);

    /// the registers `X`, `Y` and the subtype `N` of the opcode type `TXYN`
    fn xyn(&self) -> (usize, usize, u8);

    /// the registers `X` and `Y` of the opcode type `TXYT`
    fn xy(&self) -> (usize, usize);

    /// the register `X` of the opcode type `TXTT`
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
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
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> Address {
        self & OPCODE_MASK_0FFF
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8) {
        (self.x(), (self & OPCODE_MASK_00FF) as u8)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, u8) {
        let (x, y) = self.xy();
        (x, y, (self & OPCODE_MASK_000F) as u8)
    }

    fn xy(&self) -> (usize, usize) {
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        let y = ((self & MASK) >> NIBBLE) as usize;
        (self.x(), y)
    }

    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> (2 * NIBBLE)) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// How the program counter moves after an instruction was executed.
///
/// The counter has already been moved past the instruction when it runs,
/// so every step is relative to the following instruction.
pub enum ProgramCounterStep {
    /// Continue with the following instruction
    Next,
    /// Skip the following instruction
    Skip,
    /// Run the same instruction again
    Repeat,
    /// Will simply move the program counter to the given location.
    Jump(Address),
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

    /// Applies the step to an already advanced program counter.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(0x0202, ProgramCounterStep::Next.apply(0x0202));
    /// assert_eq!(0x0204, ProgramCounterStep::Skip.apply(0x0202));
    /// assert_eq!(0x0200, ProgramCounterStep::Repeat.apply(0x0202));
    /// assert_eq!(0x0ABC, ProgramCounterStep::Jump(0x0ABC).apply(0x0202));
    /// ```
    #[inline]
    pub fn apply(&self, pc: Address) -> Address {
        const STEP: Address = memory::opcodes::SIZE as Address;
        match *self {
            ProgramCounterStep::Next => pc,
            ProgramCounterStep::Skip => pc.wrapping_add(STEP),
            ProgramCounterStep::Repeat => pc.wrapping_sub(STEP),
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// What the host might want to react on after a step.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operation {
    None,
    /// The machine waits for a key press
    Wait,
    /// The display surface was changed
    Draw,
}

/// The `8XYN` operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    /// `8XY0` VX = VY
    Assign,
    /// `8XY1` VX |= VY
    Or,
    /// `8XY2` VX &= VY
    And,
    /// `8XY3` VX ^= VY
    Xor,
    /// `8XY4` VX += VY, VF = carry
    Add,
    /// `8XY5` VX -= VY, VF = no borrow
    Sub,
    /// `8XY6` VX >>= 1, VF = shifted out bit
    ShiftRight,
    /// `8XY7` VX = VY - VX, VF = no borrow
    SubReversed,
    /// `8XYE` VX <<= 1, VF = shifted out bit
    ShiftLeft,
}

impl TryFrom<u8> for ArithmeticOp {
    type Error = ();

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        let op = match n {
            0x0 => ArithmeticOp::Assign,
            0x1 => ArithmeticOp::Or,
            0x2 => ArithmeticOp::And,
            0x3 => ArithmeticOp::Xor,
            0x4 => ArithmeticOp::Add,
            0x5 => ArithmeticOp::Sub,
            0x6 => ArithmeticOp::ShiftRight,
            0x7 => ArithmeticOp::SubReversed,
            0xE => ArithmeticOp::ShiftLeft,
            _ => return Err(()),
        };
        Ok(op)
    }
}

/// The `EXNN` operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOp {
    /// `EX9E`
    SkipIfDown,
    /// `EXA1`
    SkipIfUp,
}

impl TryFrom<u8> for KeyOp {
    type Error = ();

    fn try_from(nn: u8) -> Result<Self, Self::Error> {
        match nn {
            0x9E => Ok(KeyOp::SkipIfDown),
            0xA1 => Ok(KeyOp::SkipIfUp),
            _ => Err(()),
        }
    }
}

/// The `FXNN` operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscOp {
    /// `FX07` VX = delay
    GetDelayTimer,
    /// `FX0A` wait for a key and store it in VX
    AwaitKeyPress,
    /// `FX15` delay = VX
    SetDelayTimer,
    /// `FX18` sound = VX
    SetSoundTimer,
    /// `FX1E` I += VX
    AddVxToI,
    /// `FX29` I = glyph of VX
    SetIToGlyph,
    /// `FX33` BCD of VX at I
    StoreBcd,
    /// `FX55` memory[I..=I+X] = V0..=VX
    StoreV0ToVx,
    /// `FX65` V0..=VX = memory[I..=I+X]
    FillV0ToVx,
}

impl TryFrom<u8> for MiscOp {
    type Error = ();

    fn try_from(nn: u8) -> Result<Self, Self::Error> {
        let op = match nn {
            0x07 => MiscOp::GetDelayTimer,
            0x0A => MiscOp::AwaitKeyPress,
            0x15 => MiscOp::SetDelayTimer,
            0x18 => MiscOp::SetSoundTimer,
            0x1E => MiscOp::AddVxToI,
            0x29 => MiscOp::SetIToGlyph,
            0x33 => MiscOp::StoreBcd,
            0x55 => MiscOp::StoreV0ToVx,
            0x65 => MiscOp::FillV0ToVx,
            _ => return Err(()),
        };
        Ok(op)
    }
}

/// A decoded instruction, the fields are already extracted from the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0`
    Clear,
    /// `00EE`
    Return,
    /// `1NNN`
    Jump { nnn: Address },
    /// `2NNN`
    Call { nnn: Address },
    /// `3XNN`
    SkipIfEqual { x: usize, nn: u8 },
    /// `4XNN`
    SkipIfNotEqual { x: usize, nn: u8 },
    /// `5XY0`
    SkipIfRegistersEqual { x: usize, y: usize },
    /// `6XNN`
    Set { x: usize, nn: u8 },
    /// `7XNN`
    Add { x: usize, nn: u8 },
    /// `8XYN`
    Arithmetic { ops: ArithmeticOp, x: usize, y: usize },
    /// `9XY0`
    SkipIfRegistersNotEqual { x: usize, y: usize },
    /// `ANNN`
    SetIndex { nnn: Address },
    /// `BNNN` / `BXNN`
    JumpWithOffset { x: usize, nnn: Address },
    /// `CXNN`
    Random { x: usize, nn: u8 },
    /// `DXYN`
    Draw { x: usize, y: usize, n: u8 },
    /// `EX9E` / `EXA1`
    Key { ops: KeyOp, x: usize },
    /// `FXNN`
    Misc { ops: MiscOp, x: usize },
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let invalid = |_| OpcodeError::InvalidOpcode(value);

        let (x, y, n) = value.xyn();
        let (_, nn) = value.xnn();
        let nnn = value.nnn();

        let res = match value.t() {
            0x0 => match value {
                0x00E0 => Instruction::Clear,
                0x00EE => Instruction::Return,
                _ => return Err(OpcodeError::InvalidOpcode(value)),
            },
            0x1 => Instruction::Jump { nnn },
            0x2 => Instruction::Call { nnn },
            0x3 => Instruction::SkipIfEqual { x, nn },
            0x4 => Instruction::SkipIfNotEqual { x, nn },
            0x5 if n == 0 => Instruction::SkipIfRegistersEqual { x, y },
            0x6 => Instruction::Set { x, nn },
            0x7 => Instruction::Add { x, nn },
            0x8 => Instruction::Arithmetic {
                ops: ArithmeticOp::try_from(n).map_err(invalid)?,
                x,
                y,
            },
            0x9 if n == 0 => Instruction::SkipIfRegistersNotEqual { x, y },
            0xA => Instruction::SetIndex { nnn },
            0xB => Instruction::JumpWithOffset { x, nnn },
            0xC => Instruction::Random { x, nn },
            0xD => Instruction::Draw { x, y, n },
            0xE => Instruction::Key {
                ops: KeyOp::try_from(nn).map_err(invalid)?,
                x,
            },
            0xF => Instruction::Misc {
                ops: MiscOp::try_from(nn).map_err(invalid)?,
                x,
            },
            _ => return Err(OpcodeError::InvalidOpcode(value)),
        };
        Ok(res)
    }
}

/// Moves the program counter.
pub trait ProgramCounter {
    fn advance(&mut self, step: ProgramCounterStep);
}

/// The result of a single instruction that may touch the display or wait.
pub type Outcome = Result<(ProgramCounterStep, Operation), ProcessError>;

/// The instruction set, the dispatch is shared by every compatibility level.
///
/// The implementor is expected to have moved its program counter past the
/// instruction before [`ChipOpcodes::calc`] is called.
pub trait ChipOpcodes: ProgramCounter {
    fn calc(&mut self, instruction: Instruction) -> Result<Operation, ProcessError> {
        let next = |step| (step, Operation::None);

        let (step, operation) = match instruction {
            Instruction::Clear => self.clear()?,
            Instruction::Return => next(self.ret()?),
            Instruction::Jump { nnn } => next(self.jump(nnn)),
            Instruction::Call { nnn } => next(self.call(nnn)?),
            Instruction::SkipIfEqual { x, nn } => next(self.skip_if_equal(x, nn)),
            Instruction::SkipIfNotEqual { x, nn } => next(self.skip_if_not_equal(x, nn)),
            Instruction::SkipIfRegistersEqual { x, y } => {
                next(self.skip_if_registers_equal(x, y))
            }
            Instruction::Set { x, nn } => next(self.set(x, nn)),
            Instruction::Add { x, nn } => next(self.add(x, nn)),
            Instruction::Arithmetic { ops, x, y } => next(self.arithmetic(ops, x, y)),
            Instruction::SkipIfRegistersNotEqual { x, y } => {
                next(self.skip_if_registers_not_equal(x, y))
            }
            Instruction::SetIndex { nnn } => next(self.set_index(nnn)),
            Instruction::JumpWithOffset { x, nnn } => next(self.jump_with_offset(x, nnn)),
            Instruction::Random { x, nn } => next(self.random(x, nn)),
            Instruction::Draw { x, y, n } => self.draw(x, y, n)?,
            Instruction::Key { ops, x } => next(self.key(ops, x)),
            Instruction::Misc { ops, x } => self.misc(ops, x)?,
        };

        self.advance(step);
        Ok(operation)
    }

    /// `00E0`
    fn clear(&mut self) -> Outcome;

    /// `00EE`
    fn ret(&mut self) -> Result<ProgramCounterStep, ProcessError>;

    /// `1NNN`
    fn jump(&self, nnn: Address) -> ProgramCounterStep;

    /// `2NNN`
    fn call(&mut self, nnn: Address) -> Result<ProgramCounterStep, ProcessError>;

    /// `3XNN`
    fn skip_if_equal(&self, x: usize, nn: u8) -> ProgramCounterStep;

    /// `4XNN`
    fn skip_if_not_equal(&self, x: usize, nn: u8) -> ProgramCounterStep;

    /// `5XY0`
    fn skip_if_registers_equal(&self, x: usize, y: usize) -> ProgramCounterStep;

    /// `6XNN`
    fn set(&mut self, x: usize, nn: u8) -> ProgramCounterStep;

    /// `7XNN`
    fn add(&mut self, x: usize, nn: u8) -> ProgramCounterStep;

    /// `8XYN`
    fn arithmetic(&mut self, ops: ArithmeticOp, x: usize, y: usize) -> ProgramCounterStep;

    /// `9XY0`
    fn skip_if_registers_not_equal(&self, x: usize, y: usize) -> ProgramCounterStep;

    /// `ANNN`
    fn set_index(&mut self, nnn: Address) -> ProgramCounterStep;

    /// `BNNN`
    fn jump_with_offset(&self, x: usize, nnn: Address) -> ProgramCounterStep;

    /// `CXNN`
    fn random(&mut self, x: usize, nn: u8) -> ProgramCounterStep;

    /// `DXYN`
    fn draw(&mut self, x: usize, y: usize, n: u8) -> Outcome;

    /// `EX9E` and `EXA1`
    fn key(&self, ops: KeyOp, x: usize) -> ProgramCounterStep;

    /// `FXNN`
    fn misc(&mut self, ops: MiscOp, x: usize) -> Outcome;
}

#[cfg(test)]
mod tests {
    use std::convert::TryInto;

    use super::*;

    #[test]
    fn test_tryfrom_opcode_simple() {
        let value: Opcode = 0x00E0;
        let conv = value.try_into();
        assert_eq!(conv, Ok(Instruction::Clear));
    }

    #[test]
    fn test_tryfrom_opcode_simple_fail() {
        let value: Opcode = 0x00E1;
        let conv: Result<Instruction, _> = value.try_into();
        assert_eq!(conv, Err(OpcodeError::InvalidOpcode(value)));
    }

    #[test]
    fn test_field_extraction() {
        let value: Opcode = 0xD12F;
        assert_eq!(value.t(), 0xD);
        assert_eq!(value.x(), 0x1);
        assert_eq!(value.xy(), (0x1, 0x2));
        assert_eq!(value.xyn(), (0x1, 0x2, 0xF));
        assert_eq!(value.xnn(), (0x1, 0x2F));
        assert_eq!(value.nnn(), 0x12F);
    }

    #[test]
    fn test_decode_groups() {
        let data: &[(Opcode, Instruction)] = &[
            (0x00EE, Instruction::Return),
            (0x1234, Instruction::Jump { nnn: 0x234 }),
            (0x2ABC, Instruction::Call { nnn: 0xABC }),
            (0x3A12, Instruction::SkipIfEqual { x: 0xA, nn: 0x12 }),
            (0x4A12, Instruction::SkipIfNotEqual { x: 0xA, nn: 0x12 }),
            (0x5AB0, Instruction::SkipIfRegistersEqual { x: 0xA, y: 0xB }),
            (0x6AFF, Instruction::Set { x: 0xA, nn: 0xFF }),
            (0x7A01, Instruction::Add { x: 0xA, nn: 0x01 }),
            (
                0x8AB4,
                Instruction::Arithmetic {
                    ops: ArithmeticOp::Add,
                    x: 0xA,
                    y: 0xB,
                },
            ),
            (
                0x8ABE,
                Instruction::Arithmetic {
                    ops: ArithmeticOp::ShiftLeft,
                    x: 0xA,
                    y: 0xB,
                },
            ),
            (0x9AB0, Instruction::SkipIfRegistersNotEqual { x: 0xA, y: 0xB }),
            (0xA123, Instruction::SetIndex { nnn: 0x123 }),
            (0xB123, Instruction::JumpWithOffset { x: 0x1, nnn: 0x123 }),
            (0xC30F, Instruction::Random { x: 0x3, nn: 0x0F }),
            (0xD125, Instruction::Draw { x: 0x1, y: 0x2, n: 0x5 }),
            (
                0xE39E,
                Instruction::Key {
                    ops: KeyOp::SkipIfDown,
                    x: 0x3,
                },
            ),
            (
                0xE3A1,
                Instruction::Key {
                    ops: KeyOp::SkipIfUp,
                    x: 0x3,
                },
            ),
            (
                0xF30A,
                Instruction::Misc {
                    ops: MiscOp::AwaitKeyPress,
                    x: 0x3,
                },
            ),
            (
                0xF365,
                Instruction::Misc {
                    ops: MiscOp::FillV0ToVx,
                    x: 0x3,
                },
            ),
        ];

        for (opcode, instruction) in data.iter() {
            assert_eq!(Ok(*instruction), Instruction::try_from(*opcode), "{:#06X}", opcode);
        }
    }

    #[test]
    fn test_decode_invalid() {
        let invalid: [Opcode; 9] = [
            0x0000, 0x00EF, 0x5121, 0x912F, 0x8008, 0x800F, 0xE19F, 0xF100, 0xF166,
        ];
        for opcode in invalid.iter() {
            assert_eq!(
                Err(OpcodeError::InvalidOpcode(*opcode)),
                Instruction::try_from(*opcode),
                "{:#06X}",
                opcode
            );
        }
    }
}
