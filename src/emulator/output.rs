use std::fmt;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// Represents an output device that can be drawn to.
pub trait EmulatorOutput {
    /// Turn every pixel off.
    fn clear_display(&mut self);

    /// XOR `bit` into the pixel at `(x, y)`.
    /// Returns true when the pixel was on and `bit` is on, which turns it off.
    fn draw_pixel(&mut self, x: usize, y: usize, bit: bool) -> bool;

    /// Called by the host once per frame to present what was drawn.
    fn refresh(&mut self) {}
}

/// A simple output device that keeps the frame buffer in memory.
pub struct DummyOutput {
    cells: [[bool; SCREEN_WIDTH]; SCREEN_HEIGHT],
    clears: usize,
    draws: usize,
}

impl DummyOutput {
    pub fn new() -> DummyOutput {
        DummyOutput {
            cells: [[false; SCREEN_WIDTH]; SCREEN_HEIGHT],
            clears: 0,
            draws: 0,
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.cells[y][x]
    }

    /// Number of pixels currently on.
    pub fn lit(&self) -> usize {
        self.cells.iter().flat_map(|row| row.iter()).filter(|cell| **cell).count()
    }

    /// Number of `clear_display` calls so far.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Number of `draw_pixel` calls so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl Default for DummyOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulatorOutput for DummyOutput {
    fn clear_display(&mut self) {
        self.clears += 1;
        self.cells = [[false; SCREEN_WIDTH]; SCREEN_HEIGHT];
    }

    fn draw_pixel(&mut self, x: usize, y: usize, bit: bool) -> bool {
        self.draws += 1;
        let cell = &mut self.cells[y % SCREEN_HEIGHT][x % SCREEN_WIDTH];
        let collided = *cell && bit;
        *cell ^= bit;
        collided
    }
}

impl fmt::Display for DummyOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.iter() {
            for cell in row.iter() {
                write!(f, "{}", if *cell { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
