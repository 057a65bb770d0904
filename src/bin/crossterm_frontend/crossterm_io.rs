use chip_8::emulator::output::{SCREEN_HEIGHT, SCREEN_WIDTH};
use chip_8::emulator::{EmulatorInput, EmulatorOutput};

use super::key_manager::KeyManager;

use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use std::io::{stdout, Stdout, Write};

pub struct CrosstermInput<'a> {
    key_manager: &'a KeyManager,
}

impl CrosstermInput<'_> {
    pub fn new(key_manager: &KeyManager) -> CrosstermInput {
        CrosstermInput { key_manager }
    }
}

impl EmulatorInput for CrosstermInput<'_> {
    fn get_keys(&self) -> u16 {
        self.key_manager.held()
    }

    fn get_key(&self) -> Option<u8> {
        self.key_manager.last()
    }
}

/// Draws the screen inside a frame, each pixel two columns wide.
/// Drawing is queued and flushed once per frame by `refresh`.
pub struct CrosstermOutput {
    stdout: Stdout,
    cells: [[bool; SCREEN_WIDTH]; SCREEN_HEIGHT],
}

impl CrosstermOutput {
    /// Switch the terminal to raw mode on the alternate screen.
    /// The terminal is restored when the output is dropped.
    pub fn new() -> crossterm::Result<CrosstermOutput> {
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        terminal::enable_raw_mode()?;
        let mut output = CrosstermOutput {
            stdout,
            cells: [[false; SCREEN_WIDTH]; SCREEN_HEIGHT],
        };
        output.draw_border()?;
        output.stdout.flush()?;
        Ok(output)
    }

    fn draw_border(&mut self) -> crossterm::Result<()> {
        let bottom = SCREEN_HEIGHT as u16 + 1;
        let right = 2 * SCREEN_WIDTH as u16 + 1;
        for y in 0..=bottom {
            for x in 0..=right {
                let c = match (x, y) {
                    (0, 0) => '┏',
                    (x, 0) if x == right => '┓',
                    (0, y) if y == bottom => '┗',
                    (x, y) if x == right && y == bottom => '┛',
                    (_, y) if y == 0 || y == bottom => '━',
                    (x, _) if x == 0 || x == right => '┃',
                    _ => continue,
                };
                queue!(self.stdout, cursor::MoveTo(x, y))?;
                write!(self.stdout, "{}", c)?;
            }
        }
        Ok(())
    }

    fn draw(&mut self, x: usize, y: usize, on: bool) -> crossterm::Result<()> {
        queue!(self.stdout, cursor::MoveTo(2 * x as u16 + 1, y as u16 + 1))?;
        write!(self.stdout, "{}", if on { "██" } else { "  " })?;
        Ok(())
    }
}

impl Drop for CrosstermOutput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("Could not disable raw mode: {}", e);
        }
        if let Err(e) = execute!(self.stdout, LeaveAlternateScreen, cursor::Show) {
            log::error!("Could not leave alternate screen: {}", e);
        }
    }
}

impl EmulatorOutput for CrosstermOutput {
    fn clear_display(&mut self) {
        self.cells = [[false; SCREEN_WIDTH]; SCREEN_HEIGHT];
        let redrawn = queue!(self.stdout, Clear(ClearType::All)).and_then(|_| self.draw_border());
        if let Err(e) = redrawn {
            log::error!("Could not clear screen: {}", e);
        }
    }

    fn draw_pixel(&mut self, x: usize, y: usize, bit: bool) -> bool {
        let (x, y) = (x % SCREEN_WIDTH, y % SCREEN_HEIGHT);
        let cell = self.cells[y][x];
        let collided = cell && bit;
        if bit {
            self.cells[y][x] = !cell;
            if let Err(e) = self.draw(x, y, !cell) {
                log::error!("Could not draw pixel ({}, {}): {}", x, y, e);
            }
        }
        collided
    }

    fn refresh(&mut self) {
        if let Err(e) = self.stdout.flush() {
            log::error!("Could not flush stdout: {}", e);
        }
    }
}
