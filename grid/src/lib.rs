#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state shared by the AlgoView engine.
//!
//! The grid is a flat, row-major array of cells. Exactly one cell holds
//! [`StateCode::Start`] and exactly one holds [`StateCode::End`]; both are
//! fixed for the lifetime of the grid. While an algorithm runs the step
//! controller locks the grid and becomes its only writer, so user edits
//! submitted through [`apply`] are rejected until the run completes.

use algoview_core::{Command, EditError, Event, GridGeometry, StateCode};
use thiserror::Error;
use tracing::debug;

/// Reasons a grid cannot be constructed from the requested geometry.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The requested grid has no cells.
    #[error("grid dimensions {width}x{height} contain no cells")]
    Empty {
        /// Requested number of columns.
        width: usize,
        /// Requested number of rows.
        height: usize,
    },
    /// An endpoint lies outside the grid.
    #[error("endpoint {index} lies outside a grid of {size} cells")]
    EndpointOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of cells in the grid.
        size: usize,
    },
    /// Start and end resolve to the same cell.
    #[error("start and end both resolve to cell {index}")]
    CoincidentEndpoints {
        /// Shared index.
        index: usize,
    },
}

/// Single grid position and the state it currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    column: usize,
    row: usize,
    state: StateCode,
}

impl Cell {
    /// Zero-based column of the cell.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// State code currently stored in the cell.
    #[must_use]
    pub const fn state(&self) -> StateCode {
        self.state
    }
}

/// Row-major grid of cells with fixed endpoints and an exclusive edit lock.
#[derive(Clone, Debug)]
pub struct Grid {
    geometry: GridGeometry,
    cells: Vec<Cell>,
    start: usize,
    end: usize,
    locked: bool,
}

impl Grid {
    /// Creates a walled grid with the default endpoint layout.
    ///
    /// Start occupies the first column of the middle row and end the last
    /// column of the same row.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        let start = (height / 2).saturating_mul(width);
        let end = start.saturating_add(width).saturating_sub(1);
        Self::with_endpoints(width, height, start, end)
    }

    /// Creates a walled grid with explicit endpoints.
    pub fn with_endpoints(
        width: usize,
        height: usize,
        start: usize,
        end: usize,
    ) -> Result<Self, GridError> {
        let geometry = GridGeometry::new(width, height);
        let size = width
            .checked_mul(height)
            .ok_or(GridError::Empty { width, height })?;
        if size == 0 {
            return Err(GridError::Empty { width, height });
        }
        for index in [start, end] {
            if index >= size {
                return Err(GridError::EndpointOutOfRange { index, size });
            }
        }
        if start == end {
            return Err(GridError::CoincidentEndpoints { index: start });
        }

        let cells = (0..size)
            .map(|index| Cell {
                column: index % width,
                row: index / width,
                state: if index == start {
                    StateCode::Start
                } else if index == end {
                    StateCode::End
                } else {
                    StateCode::Wall
                },
            })
            .collect();

        Ok(Self {
            geometry,
            cells,
            start,
            end,
            locked: false,
        })
    }

    /// Index arithmetic describing the grid.
    #[must_use]
    pub const fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.geometry.width()
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.geometry.height()
    }

    /// Number of cells.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Index of the start cell.
    #[must_use]
    pub const fn start_index(&self) -> usize {
        self.start
    }

    /// Index of the end cell.
    #[must_use]
    pub const fn end_index(&self) -> usize {
        self.end
    }

    /// Every cell in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// State code stored at `index`, if the index is in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<StateCode> {
        self.cells.get(index).map(Cell::state)
    }

    /// Stores `state` at `index`.
    ///
    /// Out-of-range indices are ignored. Endpoint cells only accept their own
    /// reserved code and reserved codes are never written anywhere else, so
    /// the single-start/single-end invariant cannot be broken through this
    /// method. Returns whether the stored state changed.
    pub fn set(&mut self, index: usize, state: StateCode) -> bool {
        let expected = self.reserved_code(index);
        match (expected, state.is_reserved()) {
            (Some(reserved), _) if reserved != state => return false,
            (None, true) => return false,
            _ => {}
        }

        let Some(cell) = self.cells.get_mut(index) else {
            return false;
        };
        if cell.state == state {
            return false;
        }
        cell.state = state;
        true
    }

    /// Orthogonal neighbours of `index`, ordered west, east, north, south.
    pub fn neighbors4(&self, index: usize) -> impl Iterator<Item = usize> {
        self.geometry.neighbors4(index)
    }

    /// Copies the state column so an algorithm can work on it privately.
    #[must_use]
    pub fn state_codes(&self) -> Vec<StateCode> {
        self.cells.iter().map(Cell::state).collect()
    }

    /// Indices of every cell whose state satisfies `predicate`.
    pub fn cells_with_predicate<F>(&self, mut predicate: F) -> Vec<usize>
    where
        F: FnMut(StateCode) -> bool,
    {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| predicate(cell.state))
            .map(|(index, _)| index)
            .collect()
    }

    /// Clears every non-endpoint cell matching `predicate` back to open.
    ///
    /// Returns the number of cells that changed.
    pub fn reset<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(StateCode) -> bool,
    {
        self.paint_where(predicate, StateCode::Open)
    }

    /// Paints every non-endpoint cell matching `predicate` with `state`.
    ///
    /// Reserved codes are never painted. Returns the number of cells that
    /// changed.
    pub fn paint_where<F>(&mut self, mut predicate: F, state: StateCode) -> usize
    where
        F: FnMut(StateCode) -> bool,
    {
        if state.is_reserved() {
            return 0;
        }

        let mut changed = 0;
        for (index, cell) in self.cells.iter_mut().enumerate() {
            if index == self.start || index == self.end {
                continue;
            }
            if predicate(cell.state) && cell.state != state {
                cell.state = state;
                changed += 1;
            }
        }
        changed
    }

    /// Reports whether an algorithm currently owns the grid.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Marks the grid as owned by an algorithm.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Releases ownership so user edits are accepted again.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    fn reserved_code(&self, index: usize) -> Option<StateCode> {
        if index == self.start {
            Some(StateCode::Start)
        } else if index == self.end {
            Some(StateCode::End)
        } else {
            None
        }
    }

    fn paint_line(&mut self, from: usize, to: usize, state: StateCode) -> Result<usize, EditError> {
        let (from_column, from_row) = self
            .geometry
            .coordinates(from)
            .ok_or(EditError::OutOfBounds)?;
        let (to_column, to_row) = self
            .geometry
            .coordinates(to)
            .ok_or(EditError::OutOfBounds)?;

        let cells: Vec<usize> = if from_row == to_row {
            let (low, high) = ordered(from_column, to_column);
            (low..=high)
                .filter_map(|column| self.geometry.index(column, from_row))
                .collect()
        } else if from_column == to_column {
            let (low, high) = ordered(from_row, to_row);
            (low..=high)
                .filter_map(|row| self.geometry.index(from_column, row))
                .collect()
        } else {
            return Err(EditError::NotStraight);
        };

        let mut changed = 0;
        for index in cells {
            if self.reserved_code(index).is_some() {
                continue;
            }
            if self.set(index, state) {
                changed += 1;
            }
        }
        Ok(changed)
    }
}

/// Query functions that provide read-only access to the grid state.
pub mod query {
    use std::slice::Chunks;

    use super::{Cell, Grid};
    use algoview_core::StateCode;

    /// Iterates over the grid one row of cells at a time, top to bottom.
    pub fn rows(grid: &Grid) -> Chunks<'_, Cell> {
        grid.cells.chunks(grid.geometry.width())
    }

    /// Cells currently painted as part of a found path.
    #[must_use]
    pub fn path_cells(grid: &Grid) -> Vec<usize> {
        grid.cells_with_predicate(|state| state == StateCode::Path)
    }

    /// Reports whether any traversal marker is still on the grid.
    #[must_use]
    pub fn has_traversal_markers(grid: &Grid) -> bool {
        grid.cells.iter().any(|cell| cell.state.is_traversal_marker())
    }

    /// Counts the cells holding `state`.
    #[must_use]
    pub fn count(grid: &Grid, state: StateCode) -> usize {
        grid.cells.iter().filter(|cell| cell.state == state).count()
    }
}

/// Applies a user edit to the grid, reporting the outcome through `out_events`.
pub fn apply(grid: &mut Grid, command: Command, out_events: &mut Vec<Event>) {
    let outcome = if grid.is_locked() {
        Err(EditError::Locked)
    } else {
        execute(grid, &command)
    };

    match outcome {
        Ok(count) => out_events.push(Event::CellsChanged { count }),
        Err(reason) => {
            debug!(?command, ?reason, "grid edit rejected");
            out_events.push(Event::EditRejected { reason });
        }
    }
}

fn execute(grid: &mut Grid, command: &Command) -> Result<usize, EditError> {
    match *command {
        Command::PaintCell { index, state } => {
            ensure_paintable(state)?;
            if !grid.geometry.contains(index) {
                return Err(EditError::OutOfBounds);
            }
            if grid.reserved_code(index).is_some() {
                return Err(EditError::ReservedCell);
            }
            Ok(usize::from(grid.set(index, state)))
        }
        Command::PaintLine { from, to, state } => {
            ensure_paintable(state)?;
            grid.paint_line(from, to, state)
        }
        Command::ClearTraversal => Ok(grid.reset(StateCode::is_traversal_marker)),
        Command::ClearWalls => Ok(grid.reset(StateCode::is_wall)),
        Command::ClearAll => Ok(grid.reset(|_| true)),
    }
}

fn ensure_paintable(state: StateCode) -> Result<(), EditError> {
    match state {
        StateCode::Open | StateCode::Wall => Ok(()),
        _ => Err(EditError::InvalidState),
    }
}

fn ordered(first: usize, second: usize) -> (usize, usize) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}
