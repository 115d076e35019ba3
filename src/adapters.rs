use std::sync::Arc;

use chip::{definitions::Config, devices::DisplayCommands, display::Display};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use parking_lot::Mutex;

use crate::definitions;

/// The latest frame handed out by the machine, shared between the runner and the
/// terminal, which paints it at its own pace.
#[derive(Debug, Clone)]
pub(crate) struct FrameBuffer {
    display: Arc<Mutex<Display>>,
}

impl FrameBuffer {
    pub fn new(config: &Config) -> Self {
        Self {
            display: Arc::new(Mutex::new(Display::new(config.rows, config.cols))),
        }
    }

    fn store(&self, display: &Display) {
        self.display.lock().clone_from(display);
    }

    /// The coordinates of every set pixel, with the y axis pointing up as the canvas
    /// expects it.
    pub fn points(&self) -> Vec<(f64, f64)> {
        let display = self.display.lock();
        let mut points = Vec::new();
        for (y, line) in display.lines().enumerate() {
            for (x, cell) in line.iter().enumerate() {
                if *cell == 1 {
                    points.push((x as f64, -(y as f64)));
                }
            }
        }
        points
    }
}

/// Hands the framebuffer of the machine over to the terminal.
pub(crate) struct DisplayAdapter {
    frame: FrameBuffer,
}

impl DisplayAdapter {
    pub fn new(frame: FrameBuffer) -> Self {
        Self { frame }
    }
}

impl DisplayCommands for DisplayAdapter {
    fn display(&mut self, display: &Display) {
        log::trace!("Storing a new frame");
        self.frame.store(display);
    }
}

/// What a single key event means for the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// A key of the hex keypad
    Key(u8),
    Quit,
    None,
}

/// Translates the key event with the conventional layout, where the left block of
/// the keyboard maps onto the hex keypad.
pub(crate) fn translate(event: KeyEvent) -> Action {
    match event.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char(key) => keypad(key).map_or(Action::None, Action::Key),
        _ => Action::None,
    }
}

fn keypad(key: char) -> Option<u8> {
    let key = key.to_ascii_lowercase();
    definitions::keyboard::ROWS
        .iter()
        .zip(chip::definitions::keyboard::LAYOUT.iter())
        .find_map(|(row, layout)| {
            row.iter()
                .position(|entry| *entry == key)
                .map(|index| layout[index])
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_translate_layout() {
        let expected = [
            ('1', 0x1),
            ('2', 0x2),
            ('3', 0x3),
            ('4', 0xC),
            ('q', 0x4),
            ('w', 0x5),
            ('e', 0x6),
            ('r', 0xD),
            ('a', 0x7),
            ('s', 0x8),
            ('d', 0x9),
            ('f', 0xE),
            ('z', 0xA),
            ('x', 0x0),
            ('c', 0xB),
            ('v', 0xF),
        ];
        for (code, hex) in expected.iter() {
            assert_eq!(Action::Key(*hex), translate(key(KeyCode::Char(*code))));
        }
        assert_eq!(Action::Key(0xF), translate(key(KeyCode::Char('V'))));
    }

    #[test]
    fn test_translate_others() {
        assert_eq!(Action::Quit, translate(key(KeyCode::Esc)));
        assert_eq!(
            Action::Quit,
            translate(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
        );
        assert_eq!(Action::None, translate(key(KeyCode::Char('p'))));
        assert_eq!(Action::None, translate(key(KeyCode::Enter)));
    }

    #[test]
    fn test_display_adapter_stores_frame() {
        let config = Config::default();
        let frame = FrameBuffer::new(&config);
        let mut adapter = DisplayAdapter::new(frame.clone());
        assert!(frame.points().is_empty());

        let mut display = Display::new(config.rows, config.cols);
        display.set_pixel(3, 2);
        display.set_pixel(0, 31);
        adapter.display(&display);

        let mut points = frame.points();
        points.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(vec![(0.0, -31.0), (3.0, -2.0)], points);
    }
}
