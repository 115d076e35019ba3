//! The monochrome framebuffer.

/// The graphics are black and white, every cell holds either `0` or `1`. The cells are stored
/// row major, so the cell `(x, y)` lives at `x + y * cols`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    rows: usize,
    cols: usize,
    grid: Vec<u8>,
}

impl Display {
    /// Creates a cleared grid, a zero dimension is raised to a single pixel.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            grid: vec![0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The raw cells, row major.
    pub fn grid(&self) -> &[u8] {
        &self.grid
    }

    /// Returns if the pixel at the given location is set, the coordinates
    /// have to be inside of the grid.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.grid[x + y * self.cols] == 1
    }

    /// Iterates over the rows of the grid.
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        self.grid.chunks(self.cols.max(1))
    }

    /// Will toggle the pixel at the given location and return true if a set pixel was unset.
    ///
    /// Coordinates are wrapped back into the grid by a single step only, so a coordinate more
    /// than one span outside of the grid has to be normalized by the caller.
    pub fn set_pixel(&mut self, x: isize, y: isize) -> bool {
        let x = wrap_once(x, self.cols);
        let y = wrap_once(y, self.rows);

        let index = x + y * self.cols;
        self.grid[index] ^= 1;

        self.grid[index] != 1
    }

    /// Turns every pixel off.
    pub fn clear(&mut self) {
        self.grid = vec![0; self.rows * self.cols];
    }
}

fn wrap_once(value: isize, span: usize) -> usize {
    let span = span as isize;
    let value = if value >= span {
        value - span
    } else if value < 0 {
        value + span
    } else {
        value
    };
    value as usize
}
