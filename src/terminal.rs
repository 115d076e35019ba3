//! Paints the frames and forwards the key presses, until the user quits or the
//! machine stops.
use std::{
    io::{self, Stdout},
    time::Instant,
};

use anyhow::Context;
use chip::{definitions::Config, Runner};
use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::{Span, Spans},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Paragraph,
    },
    Terminal,
};

use crate::{
    adapters::{self, Action, FrameBuffer},
    definitions::field,
};

/// The terminal in raw mode on the alternate screen, restored on drop.
pub(crate) struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Screen {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, frame: &FrameBuffer, config: &Config, status: &str) -> io::Result<()> {
        let points = frame.points();
        let width = config.cols as u16 + field::BORDER;
        let height = config.rows as u16 + field::BORDER;

        self.terminal.draw(|f| {
            let board = Rect::new(0, 0, width, height).intersection(f.size());
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title(field::TITLE)
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds([0.0, (config.cols - 1) as f64])
                .y_bounds([-((config.rows - 1) as f64), 0.0])
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &points,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, board);

            let line = Rect::new(0, height, width, field::STATUS_HEIGHT).intersection(f.size());
            f.render_widget(Paragraph::new(Spans::from(Span::raw(status))), line);
        })?;
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let restored = terminal::disable_raw_mode().and_then(|_| {
            execute!(
                self.terminal.backend_mut(),
                LeaveAlternateScreen,
                cursor::Show
            )
        });
        if let Err(err) = restored {
            log::error!("Unable to restore the terminal: {}", err);
        }
    }
}

/// The line below the board.
fn status(runner: &Runner) -> String {
    let sound = if runner.timers().sound() > 0 {
        field::SOUND
    } else {
        ""
    };
    format!("PC {:#06X} {}", runner.program_counter(), sound)
}

/// Runs the frontend until escape is pressed or the runner stopped on its own.
pub(crate) fn run(runner: &Runner, frame: &FrameBuffer, config: &Config) -> anyhow::Result<()> {
    let mut screen = Screen::new().context("Unable to prepare the terminal")?;
    let keys = runner.keys();
    let interval = config.frame_interval();

    loop {
        let started = Instant::now();
        screen
            .draw(frame, config, &status(runner))
            .context("Unable to draw the frame")?;

        if !runner.is_alive() {
            log::info!("The machine stopped, leaving the terminal.");
            return Ok(());
        }

        // handle input until the next frame is due
        while let Some(timeout) = interval.checked_sub(started.elapsed()) {
            if !event::poll(timeout)? {
                break;
            }
            let key = match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => key,
                _ => continue,
            };
            match adapters::translate(key) {
                Action::Quit => return Ok(()),
                Action::Key(key) => {
                    log::trace!("Key {:#X} pressed", key);
                    keys.press(key);
                }
                Action::None => {}
            }
        }
    }
}
