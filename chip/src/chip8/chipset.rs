use std::convert::TryFrom;

use rand::RngCore;

use crate::{
    definitions::{cpu, display::fontset, memory},
    devices::{DisplaySurface, InputSource},
    memory::Memory,
    opcode::{
        Address, ChipOpcodes, Instruction, Opcode, Operation, ProgramCounter, ProgramCounterStep,
    },
    quirks::{CompatLevel, Quirks},
    resources::{Font, Rom},
    stack::Stack,
    timer::Timers,
    Fault, ImageError, MemoryError,
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
///
/// The display surface and the input source are owned by the chipset, but
/// only ever used through their traits.
pub struct ChipSet<D, K>
where
    D: DisplaySurface,
    K: InputSource,
{
    /// name of the loaded rom
    pub(super) name: String,
    /// the last fetched opcode, all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x050-0x09F` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Memory,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: Address,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: Address,
    pub(super) stack: Stack,
    pub(super) timers: Timers,
    /// Selects the quirks applied by the dispatch
    pub(super) compat: CompatLevel,
    pub(super) display: D,
    pub(super) input: K,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
    /// Traces every executed instruction when set
    pub(super) debug: bool,
}

impl<D, K> ChipSet<D, K>
where
    D: DisplaySurface,
    K: InputSource,
{
    /// will create a new chipset object, the memory only contains the
    /// built in font
    pub fn new(display: D, input: K) -> Self {
        let mut chip = Self {
            name: String::new(),
            opcode: 0,
            memory: Memory::new(),
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER as Address,
            stack: Stack::new(),
            timers: Timers::new(),
            compat: CompatLevel::default(),
            display,
            input,
            rng: Box::new(rand::rngs::OsRng),
            debug: false,
        };
        chip.load_font(&Font::default());
        chip
    }

    /// will create a new chipset object with the given rom loaded
    pub fn with_rom(rom: &Rom, display: D, input: K) -> Self {
        let mut chip = Self::new(display, input);
        chip.load_rom(rom);
        chip
    }

    pub fn with_compat_level(mut self, compat: CompatLevel) -> Self {
        self.compat = compat;
        self
    }

    /// Replaces the random number generator used by `CXNN`.
    pub fn with_rng<R>(mut self, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        self.rng = Box::new(rng);
        self
    }

    /// Will write the rom into memory starting at `0x200`.
    pub fn load_rom(&mut self, rom: &Rom) {
        // a rom is validated on creation, so it always fits
        if self.write_program(rom.get_data()).is_ok() {
            self.name = rom.get_name().to_string();
        }
    }

    /// Will write the raw program into memory starting at `0x200`.
    pub fn load_program(&mut self, data: &[u8]) -> Result<(), ImageError> {
        self.write_program(data).map_err(|_| {
            log::warn!("rejected program with {} bytes", data.len());
            ImageError::ProgramTooLarge {
                len: data.len(),
                max: cpu::PROGRAM_SIZE,
            }
        })
    }

    fn write_program(&mut self, data: &[u8]) -> Result<(), MemoryError> {
        self.memory.load(cpu::PROGRAM_COUNTER, data)?;
        log::debug!("loaded program with {} bytes", data.len());
        Ok(())
    }

    /// Will write the font into memory starting at `0x050`.
    pub fn load_font(&mut self, font: &Font) {
        // a font always has the exact size of the font region
        if let Err(err) = self.memory.load(fontset::LOCATION, font.get_data()) {
            log::error!("unable to load the font: {}", err);
        }
    }

    /// Will advance the program by a single instruction.
    ///
    /// The program counter is moved past the instruction before it is
    /// executed. On a fault nothing is changed and the program counter
    /// keeps pointing at the faulting instruction.
    pub fn step(&mut self) -> Result<Operation, Fault> {
        let pc = self.program_counter;

        let opcode = self.fetch().map_err(|err| Fault::new(pc, None, err))?;
        self.opcode = opcode;

        if self.debug {
            log::trace!("{}", self.trace_line());
        }

        let instruction =
            Instruction::try_from(opcode).map_err(|err| Fault::new(pc, Some(opcode), err))?;
        log::debug!("{:#06X}: {:#06X} {:?}", pc, opcode, instruction);

        self.program_counter = pc.wrapping_add(memory::opcodes::SIZE as Address);

        self.calc(instruction).map_err(|err| {
            self.program_counter = pc;
            Fault::new(pc, Some(opcode), err)
        })
    }

    /// Reads the big endian opcode the program counter points at.
    fn fetch(&self) -> Result<Opcode, MemoryError> {
        let pc = self.program_counter as usize;
        let high = self.memory.read(pc)?;
        let low = self.memory.read(pc + 1)?;
        Ok(Opcode::from_be_bytes([high, low]))
    }

    /// Counts the delay and the sound timer down, expected to be called at 60 hertz.
    pub fn tick(&mut self) {
        self.timers.tick();
    }

    /// Will reset the registers, the stack, the timers and the display. The
    /// memory, and with it the loaded program and font, is kept.
    pub fn reset(&mut self) {
        log::debug!("reset of '{}'", self.name);
        self.opcode = 0;
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER as Address;
        self.stack.clear();
        self.timers.reset();
        self.display.clear();
    }

    pub fn get_compat_level(&self) -> CompatLevel {
        self.compat
    }

    /// Changes the quirks used from the next instruction on, the machine
    /// state itself is not changed.
    pub fn set_compat_level(&mut self, compat: CompatLevel) {
        log::debug!("compatibility level {} -> {}", self.compat, compat);
        self.compat = compat;
    }

    pub(super) fn quirks(&self) -> Quirks {
        self.compat.quirks()
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// the last fetched opcode
    pub fn get_opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn get_program_counter(&self) -> Address {
        self.program_counter
    }

    pub fn get_index_register(&self) -> Address {
        self.index_register
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_stack(&self) -> &Stack {
        &self.stack
    }

    pub fn get_memory(&self) -> &Memory {
        &self.memory
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.timers.sound
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.timers.delay
    }

    /// The host shall play a tone while this is true.
    pub fn is_sounding(&self) -> bool {
        self.timers.is_sounding()
    }

    pub fn get_display(&self) -> &D {
        &self.display
    }

    pub fn get_display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn get_input(&self) -> &K {
        &self.input
    }

    /// Used by the host to feed key events into the input source
    pub fn get_input_mut(&mut self) -> &mut K {
        &mut self.input
    }
}

impl<D, K> ProgramCounter for ChipSet<D, K>
where
    D: DisplaySurface,
    K: InputSource,
{
    fn advance(&mut self, step: ProgramCounterStep) {
        self.program_counter = step.apply(self.program_counter);
    }
}
