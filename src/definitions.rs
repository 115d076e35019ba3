/// The definitions of the terminal layout
pub(crate) mod field {
    /// The title of the board
    pub const TITLE: &str = "CHIP-8";
    /// The width and height the border takes up
    pub const BORDER: u16 = 2;
    /// The height of the status line below the board
    pub const STATUS_HEIGHT: u16 = 1;
    /// Shown while the sound timer is running
    pub const SOUND: &str = "♪";
}

/// The command line defaults
pub(crate) mod cli {
    pub const LOG_FILE: &str = "chip8.log";
    pub const LOG_LEVEL: &str = "info";
}

/// The keyboard rows, that are mapped onto the rows of the hex keypad
pub(crate) mod keyboard {
    pub const ROWS: [[char; 4]; 4] = [
        ['1', '2', '3', '4'],
        ['q', 'w', 'e', 'r'],
        ['a', 's', 'd', 'f'],
        ['z', 'x', 'c', 'v'],
    ];
}
