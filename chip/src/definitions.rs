/// The definitions

pub mod memory {
    /// The size of the chipset ram
    pub const SIZE: usize = 0x1000; // 4096

    /// The highest address reachable with the twelve bit operands
    pub const ADDRESS_SPACE: u16 = 0x0FFF;

    /// opcode information
    pub mod opcodes {
        /// The step used for calculating the program counter increments
        pub const SIZE: u16 = 2;
    }
}

/// The definitions for the cpu
pub mod cpu {
    /// The starting point for the program
    pub const PROGRAM_COUNTER: u16 = 0x0200;
    /// The amound of hertz the emulation shall run at.
    pub const HERTZ: u64 = 500;

    /// The definitions needed for the register
    pub mod register {
        /// The size of the chip set registers
        pub const SIZE: usize = 16;
        /// The last entry of the registers, doubles as the flag register `VF`
        pub const LAST: usize = SIZE - 1;
    }

    /// The stack definitions
    pub mod stack {
        /// The count of nesting entries
        pub const SIZE: usize = 16;
    }
}

/// The timer definitions
pub mod timer {
    use std::time::Duration;

    /// The amount of hertz the clocks run at
    pub const HERTZ: u8 = 60;
    /// The interval between two ticks
    pub const INTERVAL: Duration = Duration::from_micros(1_000_000 / HERTZ as u64);
}

/// The display definitions
pub mod display {
    /// The amount of pixel rows
    pub const ROWS: usize = 32;
    /// The amount of pixel columns
    pub const COLS: usize = 64;
    /// The amount of frames the frontend paints per second
    pub const FPS: u64 = 60;
    /// The width of a sprite row in pixels
    pub const SPRITE_WIDTH: usize = 8;

    /// The fontset information
    pub mod fontset {
        /// Is the location of the beginning to the font in memory
        pub const LOCATION: u16 = 0x50;
        /// The amount of bytes a single glyph takes up
        pub const GLYPH_SIZE: u16 = 5;
        /// The font set character to be rendered on the screen
        pub const FONTSET: [[u8; GLYPH_SIZE as usize]; 16] = [
            [0xF0, 0x90, 0x90, 0x90, 0xF0], // 0
            [0x20, 0x60, 0x20, 0x20, 0x70], // 1
            [0xF0, 0x10, 0xF0, 0x80, 0xF0], // 2
            [0xF0, 0x10, 0xF0, 0x10, 0xF0], // 3
            [0x90, 0x90, 0xF0, 0x10, 0x10], // 4
            [0xF0, 0x80, 0xF0, 0x10, 0xF0], // 5
            [0xF0, 0x80, 0xF0, 0x90, 0xF0], // 6
            [0xF0, 0x10, 0x20, 0x40, 0x40], // 7
            [0xF0, 0x90, 0xF0, 0x90, 0xF0], // 8
            [0xF0, 0x90, 0xF0, 0x10, 0xF0], // 9
            [0xF0, 0x90, 0xF0, 0x90, 0x90], // A
            [0xE0, 0x90, 0xE0, 0x90, 0xE0], // B
            [0xF0, 0x80, 0x80, 0x80, 0xF0], // C
            [0xE0, 0x90, 0x90, 0x90, 0xE0], // D
            [0xF0, 0x80, 0xF0, 0x80, 0xF0], // E
            [0xF0, 0x80, 0xF0, 0x80, 0x80], // F
        ];
    }
}

/// The definitions needed for correct keyboard definitions.
pub mod keyboard {
    use std::time::Duration;

    /// all the different keyboard entries
    pub const SIZE: usize = 16;
    /// How long a single press counts as held
    pub const TTL: Duration = Duration::from_millis(50);
    /// The keyboard layout requested by the chipset
    pub const LAYOUT: [[u8; 4]; 4] = [
        [0x1, 0x2, 0x3, 0xC],
        [0x4, 0x5, 0x6, 0xD],
        [0x7, 0x8, 0x9, 0xE],
        [0xA, 0x0, 0xB, 0xF],
    ];
}

/// The runtime configuration handed in by the caller at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// The amount of pixel rows
    pub rows: usize,
    /// The amount of pixel columns
    pub cols: usize,
    /// Instructions executed per second
    pub frequency: u64,
    /// Frames painted per second by the frontend
    pub fps: u64,
}

impl Config {
    /// The time the runner takes for a single instruction.
    pub fn instruction_interval(&self) -> std::time::Duration {
        std::time::Duration::from_micros(1_000_000 / self.frequency.max(1))
    }

    /// The time between two painted frames.
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_micros(1_000_000 / self.fps.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: display::ROWS,
            cols: display::COLS,
            frequency: cpu::HERTZ,
            fps: display::FPS,
        }
    }
}
