#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the AlgoView engine.
//!
//! This crate defines the vocabulary that connects the grid model, the
//! resumable algorithm systems, the step controller and the adapters. Adapters
//! submit [`Command`] values describing user edits, the grid executes those
//! commands via its `apply` entry point and answers with [`Event`] values.
//! Algorithm systems never touch the shared grid: they work on a private copy
//! of its [`StateCode`] column and describe their progress as [`CellUpdate`]
//! values which the controller applies in emission order.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "AlgoView v1.0";

/// Small signed tag describing what a grid cell currently represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateCode {
    /// Origin of every traversal. Reserved.
    Start,
    /// Destination of every traversal. Reserved.
    End,
    /// Walkable cell without any traversal marker.
    Open,
    /// Impassable cell.
    Wall,
    /// Discovered by the forward (or only) frontier.
    DiscoveredA,
    /// Discovered by the backward frontier of a bidirectional search.
    DiscoveredB,
    /// Fully expanded by the forward (or only) frontier.
    ProcessedA,
    /// Fully expanded by the backward frontier of a bidirectional search.
    ProcessedB,
    /// Part of the reconstructed shortest path.
    Path,
}

impl StateCode {
    /// Every state code ordered by its numeric value.
    pub const ALL: [StateCode; 9] = [
        StateCode::End,
        StateCode::Start,
        StateCode::Open,
        StateCode::Wall,
        StateCode::DiscoveredA,
        StateCode::DiscoveredB,
        StateCode::ProcessedA,
        StateCode::ProcessedB,
        StateCode::Path,
    ];

    /// Numeric representation of the state.
    #[must_use]
    pub const fn code(self) -> i8 {
        match self {
            Self::Start => -1,
            Self::End => -2,
            Self::Open => 0,
            Self::Wall => 1,
            Self::DiscoveredA => 2,
            Self::DiscoveredB => 3,
            Self::ProcessedA => 4,
            Self::ProcessedB => 5,
            Self::Path => 6,
        }
    }

    /// Resolves a numeric code back into a state, if it is known.
    #[must_use]
    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(Self::Start),
            -2 => Some(Self::End),
            0 => Some(Self::Open),
            1 => Some(Self::Wall),
            2 => Some(Self::DiscoveredA),
            3 => Some(Self::DiscoveredB),
            4 => Some(Self::ProcessedA),
            5 => Some(Self::ProcessedB),
            6 => Some(Self::Path),
            _ => None,
        }
    }

    /// Reports whether the code is one of the reserved endpoint codes.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        self.code() < 0
    }

    /// Reports whether a traversal may enter a cell carrying this code.
    ///
    /// Mirrors the `code < 1` test: open cells and both endpoints qualify,
    /// walls and every traversal marker do not.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        self.code() < 1
    }

    /// Reports whether the code blocks movement.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }

    /// Reports whether the code was produced by a shortest-path run.
    #[must_use]
    pub const fn is_traversal_marker(self) -> bool {
        self.code() >= 2
    }

    /// Reports whether the code is a discovered or processed marker that the
    /// controller strips once a run completes.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(
            self,
            Self::DiscoveredA | Self::DiscoveredB | Self::ProcessedA | Self::ProcessedB
        )
    }
}

/// Cardinal directions between neighbouring cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// The two directions perpendicular to `self`.
    #[must_use]
    pub const fn perpendicular(self) -> [Self; 2] {
        match self {
            Self::North | Self::South => [Self::West, Self::East],
            Self::East | Self::West => [Self::North, Self::South],
        }
    }
}

/// Dimensions of a row-major grid together with its index arithmetic.
///
/// Indices are plain `usize` offsets into a flat array of
/// `width * height` cells. Helpers never wrap across row boundaries and return
/// `None` instead of producing an out-of-range index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridGeometry {
    width: usize,
    height: usize,
}

impl GridGeometry {
    /// Creates a geometry with the provided number of columns and rows.
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.width * self.height
    }

    /// Reports whether the index addresses a cell of the grid.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index < self.size()
    }

    /// Column and row of the provided index.
    #[must_use]
    pub fn coordinates(&self, index: usize) -> Option<(usize, usize)> {
        if !self.contains(index) {
            return None;
        }
        Some((index % self.width, index / self.width))
    }

    /// Flat index of the provided column and row.
    #[must_use]
    pub fn index(&self, column: usize, row: usize) -> Option<usize> {
        if column < self.width && row < self.height {
            Some(row * self.width + column)
        } else {
            None
        }
    }

    /// Neighbouring index in the provided direction, if it exists.
    #[must_use]
    pub fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        let (column, row) = self.coordinates(index)?;
        match direction {
            Direction::North => self.index(column, row.checked_sub(1)?),
            Direction::East => self.index(column.checked_add(1)?, row),
            Direction::South => self.index(column, row.checked_add(1)?),
            Direction::West => self.index(column.checked_sub(1)?, row),
        }
    }

    /// Up to four orthogonal neighbours, ordered west, east, north, south.
    pub fn neighbors4(&self, index: usize) -> impl Iterator<Item = usize> {
        let mut candidates = [None; 4];
        for (slot, direction) in [
            Direction::West,
            Direction::East,
            Direction::North,
            Direction::South,
        ]
        .into_iter()
        .enumerate()
        {
            candidates[slot] = self.neighbor(index, direction);
        }
        candidates.into_iter().flatten()
    }

    /// Direction leading from `from` to the orthogonally adjacent `to`.
    #[must_use]
    pub fn direction_between(&self, from: usize, to: usize) -> Option<Direction> {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
        .into_iter()
        .find(|direction| self.neighbor(from, *direction) == Some(to))
    }

    /// Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan(&self, first: usize, second: usize) -> Option<usize> {
        let (first_column, first_row) = self.coordinates(first)?;
        let (second_column, second_row) = self.coordinates(second)?;
        Some(first_column.abs_diff(second_column) + first_row.abs_diff(second_row))
    }
}

/// Algorithms the step controller knows how to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmKind {
    /// Randomized depth-first maze carving.
    MazeGeneration,
    /// Breadth-first shortest path search.
    Bfs,
    /// Breadth-first search growing from both endpoints.
    BidirectionalBfs,
    /// A* search guided by the Manhattan heuristic.
    AStar,
}

impl AlgorithmKind {
    /// Every kind in presentation order.
    pub const ALL: [AlgorithmKind; 4] = [
        AlgorithmKind::MazeGeneration,
        AlgorithmKind::Bfs,
        AlgorithmKind::BidirectionalBfs,
        AlgorithmKind::AStar,
    ];

    /// Short human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MazeGeneration => "random maze",
            Self::Bfs => "bfs",
            Self::BidirectionalBfs => "bidirectional bfs",
            Self::AStar => "a*",
        }
    }

    /// Reports whether the kind searches for a path rather than carving.
    #[must_use]
    pub const fn is_pathfinding(self) -> bool {
        !matches!(self, Self::MazeGeneration)
    }
}

/// Single unit of progress emitted by a resumable computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellUpdate {
    /// Paints the cell with the provided state code.
    Paint {
        /// Cell receiving the new code.
        index: usize,
        /// Code to store in the cell.
        state: StateCode,
    },
    /// Opens a cell during maze generation.
    Carve {
        /// Cell becoming open.
        index: usize,
        /// Diagnostic count of the work performed in the emitting step.
        work: u32,
    },
}

impl CellUpdate {
    /// Cell affected by the update.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Paint { index, .. } | Self::Carve { index, .. } => *index,
        }
    }

    /// State the cell holds once the update is applied.
    #[must_use]
    pub const fn state(&self) -> StateCode {
        match self {
            Self::Paint { state, .. } => *state,
            Self::Carve { .. } => StateCode::Open,
        }
    }
}

/// Outcome of resuming a computation once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Progress {
    /// The computation performed a step and may be resumed again.
    Advanced,
    /// The computation has no work left and must be discarded.
    Exhausted,
}

/// User edits that may be applied to the grid between algorithm runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Paints a single cell open or walled.
    PaintCell {
        /// Cell to paint.
        index: usize,
        /// Either [`StateCode::Open`] or [`StateCode::Wall`].
        state: StateCode,
    },
    /// Paints a straight horizontal or vertical run of cells.
    PaintLine {
        /// First cell of the run.
        from: usize,
        /// Last cell of the run.
        to: usize,
        /// Either [`StateCode::Open`] or [`StateCode::Wall`].
        state: StateCode,
    },
    /// Strips every traversal marker back to open.
    ClearTraversal,
    /// Strips every wall back to open.
    ClearWalls,
    /// Resets every non-reserved cell to open.
    ClearAll,
}

/// Events emitted by the grid after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that an edit was applied.
    CellsChanged {
        /// Number of cells whose state actually changed.
        count: usize,
    },
    /// Reports that an edit was rejected.
    EditRejected {
        /// Specific reason the edit failed.
        reason: EditError,
    },
}

/// Reasons a user edit may be rejected by the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditError {
    /// An algorithm currently owns the grid.
    Locked,
    /// The edit targets the start or end cell.
    ReservedCell,
    /// The edit addresses a cell outside the grid.
    OutOfBounds,
    /// Only open and wall may be painted by hand.
    InvalidState,
    /// Line edits must stay within one row or one column.
    NotStraight,
}
