use std::{convert::TryFrom, sync::Arc};

use rand::RngCore;

use crate::{
    definitions::{cpu, display::fontset, memory, Config},
    display::Display,
    keyboard::Keys,
    opcode::{self, Instruction, Opcode, Operation, ProgramCounter, ProgramCounterStep},
    stack::Stack,
    timer::{TimedWorker, TimerHandle, Timers, Worker},
    MemoryError, ProcessError,
};

/// The Machine struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instance of the
/// Chip8 CPU.
pub struct Machine<W: TimedWorker = Worker> {
    pub(super) config: Config,
    /// the last fetched opcode, all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x050-0x0A0` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Vec<u8>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter points at the next instruction to be fetched from memory.
    pub(super) program_counter: u16,
    pub(super) stack: Stack,
    /// Delay and sound timer, both counting down at 60 hertz until they reach 0.
    pub(super) timers: Timers<W>,
    pub(super) display: Display,
    /// Shared with the input source, which feeds the key presses.
    pub(super) keys: Arc<Keys>,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl<W: TimedWorker> Machine<W> {
    /// Will create a new machine with the built in font loaded and
    /// the timers running.
    pub fn new(config: Config) -> Self {
        let mut machine = Self {
            config,
            opcode: 0,
            memory: vec![0; memory::SIZE],
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: Stack::new(),
            timers: Timers::new(),
            display: Display::new(config.rows, config.cols),
            keys: Arc::new(Keys::new()),
            rng: Box::new(rand::rngs::OsRng),
        };
        machine.load_font(&fontset::FONTSET);
        machine
    }

    /// Will copy the program into memory at the program start, there is
    /// no validation of the content.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), MemoryError> {
        let start = cpu::PROGRAM_COUNTER as usize;
        let available = self.memory.len() - start;
        if rom.len() > available {
            return Err(MemoryError::RomTooLarge {
                size: rom.len(),
                available,
            });
        }
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        log::info!("Loaded a rom of {} bytes", rom.len());
        Ok(())
    }

    /// Will copy the glyphs into the reserved font region.
    pub fn load_font(&mut self, font: &[[u8; fontset::GLYPH_SIZE as usize]; 16]) {
        let start = fontset::LOCATION as usize;
        for (glyph, chunk) in font
            .iter()
            .zip(self.memory[start..].chunks_mut(fontset::GLYPH_SIZE as usize))
        {
            chunk.copy_from_slice(glyph);
        }
    }

    /// Will read the opcode at the program counter and move the counter
    /// on to the following instruction.
    pub fn fetch(&mut self) -> Result<Opcode, ProcessError> {
        self.opcode = opcode::build_opcode(&self.memory, self.program_counter as usize)?;
        self.program_counter = self
            .program_counter
            .wrapping_add(memory::opcodes::SIZE);
        Ok(self.opcode)
    }

    /// will advance the program by a single step
    ///
    /// An opcode that can not be decoded is logged and skipped, every
    /// other error is fatal for the run.
    pub fn next(&mut self) -> Result<Operation, ProcessError> {
        let opcode = self.fetch()?;
        match Instruction::try_from(opcode) {
            Ok(instruction) => self.execute(instruction),
            Err(err) => {
                log::warn!(
                    "Skipping at {:#06X}: {}",
                    self.program_counter.wrapping_sub(memory::opcodes::SIZE),
                    err
                );
                Ok(Operation::Unknown(opcode))
            }
        }
    }

    /// Replaces the random source used by `CXNN`.
    pub fn set_rng(&mut self, rng: Box<dyn RngCore + Send>) {
        self.rng = rng;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The last fetched opcode.
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn index_register(&self) -> u16 {
        self.index_register
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// The handle the input source uses to deliver key presses.
    pub fn keys(&self) -> Arc<Keys> {
        self.keys.clone()
    }

    pub fn timers(&self) -> &Timers<W> {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut Timers<W> {
        &mut self.timers
    }

    pub fn timer_handle(&self) -> TimerHandle {
        self.timers.handle()
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay()
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound()
    }
}

impl<W: TimedWorker> ProgramCounter for Machine<W> {
    fn step(&mut self, step: ProgramCounterStep) {
        self.program_counter = step.apply(self.program_counter);
    }
}

/// Will return `len` bytes of memory starting at `from`, or the first address
/// that is not backed by memory.
pub(super) fn memory_range(memory: &[u8], from: u16, len: usize) -> Result<&[u8], MemoryError> {
    let from = from as usize;
    memory
        .get(from..from + len)
        .ok_or(MemoryError::OutOfBounds {
            address: from.max(memory.len()),
            len: memory.len(),
        })
}

/// The mutable counterpart to [`memory_range`](memory_range).
pub(super) fn memory_range_mut(
    memory: &mut [u8],
    from: u16,
    len: usize,
) -> Result<&mut [u8], MemoryError> {
    let size = memory.len();
    let from = from as usize;
    memory
        .get_mut(from..from + len)
        .ok_or(MemoryError::OutOfBounds {
            address: from.max(size),
            len: size,
        })
}
