use outbreak_common::CellState;
use serde::{Deserialize, Serialize};

/// A fixed-size, row-major rectangle of per-cell values.
///
/// Dimensions are set at creation and never change; `values.len() == width * height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCellMap<T>")]
pub struct CellMap<T> {
    width: usize,
    height: usize,
    values: Vec<T>,
}

/// Unchecked wire form of [`CellMap`]; deserialization goes through [`CellMap::from_vec`].
#[derive(Deserialize)]
struct RawCellMap<T> {
    width: usize,
    height: usize,
    values: Vec<T>,
}

impl<T> TryFrom<RawCellMap<T>> for CellMap<T> {
    type Error = String;

    fn try_from(raw: RawCellMap<T>) -> Result<Self, Self::Error> {
        let (width, height, len) = (raw.width, raw.height, raw.values.len());
        CellMap::from_vec(width, height, raw.values)
            .ok_or_else(|| format!("{} values do not fill a {}x{} map", len, width, height))
    }
}

/// The population grid: exactly one [`CellState`] per cell.
pub type Grid = CellMap<CellState>;

/// Number of infected Moore neighbors per cell (0..=8).
pub type NeighborCounts = CellMap<u8>;

/// Next-tick infection probability per cell, 0.0 for cells that are not Healthy.
pub type RiskMap = CellMap<f64>;

impl<T: Clone> CellMap<T> {
    /// Creates a map with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }
}

impl<T> CellMap<T> {
    /// Wraps an existing row-major vector. Returns `None` when the length does not match.
    pub fn from_vec(width: usize, height: usize, values: Vec<T>) -> Option<Self> {
        (width.checked_mul(height) == Some(values.len())).then_some(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    // Calculates the 1D index for a cell coordinate.
    #[inline(always)]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Inverse of [`CellMap::index`].
    #[inline(always)]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            self.values.get(self.index(x, y))
        } else {
            None
        }
    }

    /// Overwrites one cell. Out-of-bounds coordinates are ignored and report `false`.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.values[idx] = value;
            true
        } else {
            false
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Iterates `(x, y, value)` in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        let width = self.width;
        self.values
            .iter()
            .enumerate()
            .map(move |(idx, value)| (idx % width, idx / width, value))
    }

    /// Combines two same-shaped maps cell by cell.
    pub fn zip_map<U, V, F>(&self, other: &CellMap<U>, mut f: F) -> CellMap<V>
    where
        F: FnMut(&T, &U) -> V,
    {
        debug_assert!(self.same_shape(other), "zipped maps must have the same shape");
        CellMap {
            width: self.width,
            height: self.height,
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }

    pub fn same_shape<U>(&self, other: &CellMap<U>) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl Grid {
    /// An all-Healthy grid.
    pub fn healthy(width: usize, height: usize) -> Self {
        Self::filled(width, height, CellState::Healthy)
    }

    /// Number of cells currently in `state`.
    pub fn count(&self, state: CellState) -> usize {
        self.values.iter().filter(|&&cell| cell == state).count()
    }
}

/// Counts infected cells in each cell's 8-neighborhood, excluding the cell itself.
///
/// Out-of-bounds neighbors count as 0 (zero padding, no wrap-around), so a corner
/// cell sees at most 3 neighbors and an edge cell at most 5. The 3x3 box sum is
/// computed separably: a horizontal pass over each row, then a vertical pass over
/// those row sums, which keeps the whole count O(width * height).
pub fn count_infected_neighbors(grid: &Grid) -> NeighborCounts {
    let width = grid.width();
    let height = grid.height();
    let mask: Vec<u8> = grid
        .as_slice()
        .iter()
        .map(|&cell| u8::from(cell == CellState::Infected))
        .collect();

    // Phase 1: sum of each cell and its left/right neighbors.
    let mut row_sums = vec![0u8; mask.len()];
    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            let mut sum = mask[row + x];
            if x > 0 {
                sum += mask[row + x - 1];
            }
            if x + 1 < width {
                sum += mask[row + x + 1];
            }
            row_sums[row + x] = sum;
        }
    }

    // Phase 2: add the rows above and below, then drop the center cell.
    let mut counts = vec![0u8; mask.len()];
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let mut sum = row_sums[idx];
            if y > 0 {
                sum += row_sums[idx - width];
            }
            if y + 1 < height {
                sum += row_sums[idx + width];
            }
            counts[idx] = sum - mask[idx];
        }
    }

    CellMap {
        width,
        height,
        values: counts,
    }
}
