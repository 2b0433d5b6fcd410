use crate::{
    definitions::{cpu, display::fontset, memory},
    devices::{DisplaySurface, InputSource},
    opcode::{
        Address, ArithmeticOp, ChipOpcodes, KeyOp, MiscOp, Operation, Outcome, ProgramCounterStep,
    },
    ProcessError,
};

use super::ChipSet;

/// `VF`
const FLAG: usize = cpu::register::LAST;

impl<D, K> ChipOpcodes for ChipSet<D, K>
where
    D: DisplaySurface,
    K: InputSource,
{
    fn clear(&mut self) -> Outcome {
        self.display.clear();
        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn ret(&mut self) -> Result<ProgramCounterStep, ProcessError> {
        // Return from sub routine => pop from stack
        let pc = self.stack.pop()?;
        log::debug!("return to {:#06X}", pc);
        Ok(ProgramCounterStep::Jump(pc))
    }

    fn jump(&self, nnn: Address) -> ProgramCounterStep {
        ProgramCounterStep::Jump(nnn)
    }

    fn call(&mut self, nnn: Address) -> Result<ProgramCounterStep, ProcessError> {
        // the program counter already points at the instruction after the call
        self.stack.push(self.program_counter)?;
        log::debug!("call {:#06X}, depth {}", nnn, self.stack.pointer());
        Ok(ProgramCounterStep::Jump(nnn))
    }

    fn skip_if_equal(&self, x: usize, nn: u8) -> ProgramCounterStep {
        ProgramCounterStep::cond(self.registers[x] == nn)
    }

    fn skip_if_not_equal(&self, x: usize, nn: u8) -> ProgramCounterStep {
        ProgramCounterStep::cond(self.registers[x] != nn)
    }

    fn skip_if_registers_equal(&self, x: usize, y: usize) -> ProgramCounterStep {
        ProgramCounterStep::cond(self.registers[x] == self.registers[y])
    }

    fn set(&mut self, x: usize, nn: u8) -> ProgramCounterStep {
        self.registers[x] = nn;
        ProgramCounterStep::Next
    }

    fn add(&mut self, x: usize, nn: u8) -> ProgramCounterStep {
        // let VX overflow, but ignore carry
        self.registers[x] = self.registers[x].wrapping_add(nn);
        ProgramCounterStep::Next
    }

    fn arithmetic(&mut self, ops: ArithmeticOp, x: usize, y: usize) -> ProgramCounterStep {
        let quirks = self.quirks();
        let vx = self.registers[x];
        let vy = self.registers[y];

        // the flag is always written after the result, so `VF` as target
        // ends up holding the flag
        let (result, flag) = match ops {
            ArithmeticOp::Assign => (vy, None),
            ArithmeticOp::Or => (vx | vy, quirks.logic_resets_flag.then(|| 0)),
            ArithmeticOp::And => (vx & vy, quirks.logic_resets_flag.then(|| 0)),
            ArithmeticOp::Xor => (vx ^ vy, quirks.logic_resets_flag.then(|| 0)),
            ArithmeticOp::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                (res, Some(carry as u8))
            }
            ArithmeticOp::Sub => (vx.wrapping_sub(vy), Some((vx >= vy) as u8)),
            ArithmeticOp::SubReversed => (vy.wrapping_sub(vx), Some((vy >= vx) as u8)),
            ArithmeticOp::ShiftRight => {
                let source = if quirks.shift_uses_vy { vy } else { vx };
                (source >> 1, Some(source & 0x01))
            }
            ArithmeticOp::ShiftLeft => {
                let source = if quirks.shift_uses_vy { vy } else { vx };
                (source << 1, Some(source >> 7))
            }
        };

        self.registers[x] = result;
        if let Some(flag) = flag {
            self.registers[FLAG] = flag;
        }
        ProgramCounterStep::Next
    }

    fn skip_if_registers_not_equal(&self, x: usize, y: usize) -> ProgramCounterStep {
        ProgramCounterStep::cond(self.registers[x] != self.registers[y])
    }

    fn set_index(&mut self, nnn: Address) -> ProgramCounterStep {
        self.index_register = nnn;
        ProgramCounterStep::Next
    }

    fn jump_with_offset(&self, x: usize, nnn: Address) -> ProgramCounterStep {
        // BNNN jumps to NNN + V0, later interpreters read it as BXNN and use VX
        let offset = if self.quirks().jump_uses_vx {
            self.registers[x]
        } else {
            self.registers[0]
        };
        ProgramCounterStep::Jump(nnn + offset as Address)
    }

    fn random(&mut self, x: usize, nn: u8) -> ProgramCounterStep {
        // using a fill bytes call here, as the trait RngCore does not
        // support random u8.
        let mut rand = [0u8; 1];
        self.rng.fill_bytes(&mut rand);
        self.registers[x] = nn & rand[0];
        ProgramCounterStep::Next
    }

    fn draw(&mut self, x: usize, y: usize, n: u8) -> Outcome {
        // Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height of N
        // pixels. Each row of 8 pixels is read as bit-coded starting from memory location I; I
        // value doesn’t change after the execution of this instruction. VF is set to 1 if any
        // screen pixels are flipped from set to unset when the sprite is drawn, and to 0 if that
        // doesn’t happen.
        let coorx = self.registers[x] as usize;
        let coory = self.registers[y] as usize;

        let sprite = self
            .memory
            .slice(self.index_register as usize, n as usize)?;

        let mut collided = false;
        for (i, row) in sprite.iter().enumerate() {
            collided |= self.display.draw_row(coorx, coory + i, *row);
        }

        self.registers[FLAG] = collided as u8;
        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn key(&self, ops: KeyOp, x: usize) -> ProgramCounterStep {
        let key = (self.registers[x] & 0x0F) as usize;
        let down = self.input.is_down(key);
        match ops {
            KeyOp::SkipIfDown => ProgramCounterStep::cond(down),
            KeyOp::SkipIfUp => ProgramCounterStep::cond(!down),
        }
    }

    fn misc(&mut self, ops: MiscOp, x: usize) -> Outcome {
        let mut op = Operation::None;
        let mut pcs = ProgramCounterStep::Next;
        let index = self.index_register as usize;

        match ops {
            MiscOp::GetDelayTimer => {
                self.registers[x] = self.timers.delay;
            }
            MiscOp::AwaitKeyPress => match self.input.first_down() {
                Some(key) => {
                    log::debug!("key {:#X} pressed", key);
                    self.registers[x] = key as u8;
                }
                None => {
                    // run this instruction again, until a key is down
                    pcs = ProgramCounterStep::Repeat;
                    op = Operation::Wait;
                }
            },
            MiscOp::SetDelayTimer => {
                self.timers.delay = self.registers[x];
            }
            MiscOp::SetSoundTimer => {
                self.timers.sound = self.registers[x];
            }
            MiscOp::AddVxToI => {
                // VF is set to 1 when there is a range overflow (I+VX>0xFFF), and to 0 when
                // there isn't.
                let sum = index + self.registers[x] as usize;
                let overflow = sum > memory::LAST_ADDRESS;
                self.index_register = (sum & memory::LAST_ADDRESS) as Address;
                self.registers[FLAG] = overflow as u8;
            }
            MiscOp::SetIToGlyph => {
                let digit = (self.registers[x] & 0x0F) as usize;
                self.index_register = (fontset::LOCATION + fontset::GLYPH_SIZE * digit) as Address;
            }
            MiscOp::StoreBcd => {
                let r = self.registers[x];
                let digits = [r / 100, r / 10 % 10, r % 10];
                self.memory.load(index, &digits)?;
            }
            MiscOp::StoreV0ToVx => {
                self.memory.load(index, &self.registers[..=x])?;
                self.increment_index(x);
            }
            MiscOp::FillV0ToVx => {
                let data = self.memory.slice(index, x + 1)?;
                self.registers[..=x].copy_from_slice(data);
                self.increment_index(x);
            }
        }
        Ok((pcs, op))
    }
}

impl<D, K> ChipSet<D, K>
where
    D: DisplaySurface,
    K: InputSource,
{
    /// The original interpreter leaves `I` behind the last register it stored or loaded.
    fn increment_index(&mut self, x: usize) {
        if self.quirks().load_store_increments_index {
            self.index_register = self.index_register.wrapping_add(x as Address + 1);
        }
    }
}
