#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Step controller that owns the grid and at most one running algorithm.
//!
//! The controller is either idle or running exactly one resumable
//! computation. Activation prepares and locks the grid, every
//! [`StepController::advance`] resumes the computation once and applies the
//! emitted updates in order, and exhaustion finalizes the grid and unlocks it
//! again. User edits go through [`StepController::apply`] and are rejected by
//! the grid for as long as a run holds the lock.

use algoview_core::{AlgorithmKind, CellUpdate, Command, Event, Progress, StateCode};
use algoview_grid::Grid;
use algoview_system_maze_generation::MazeGenerator;
use algoview_system_pathfinding::{AStar, Bfs, BidirectionalBfs};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Diagnostics gathered over one completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    kind: AlgorithmKind,
    steps: u64,
    updates: u64,
    work: u64,
    path_length: usize,
}

impl RunSummary {
    /// Algorithm that produced the run.
    #[must_use]
    pub const fn kind(&self) -> AlgorithmKind {
        self.kind
    }

    /// Resumes performed before the computation was exhausted.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Cell updates applied to the grid.
    #[must_use]
    pub const fn updates(&self) -> u64 {
        self.updates
    }

    /// Work reported by maze carving; zero for path searches.
    #[must_use]
    pub const fn work(&self) -> u64 {
        self.work
    }

    /// Path tiles painted between start and end; zero when no path exists.
    #[must_use]
    pub const fn path_length(&self) -> usize {
        self.path_length
    }
}

#[derive(Debug)]
enum Computation {
    Maze(MazeGenerator),
    Bfs(Bfs),
    Bidirectional(BidirectionalBfs),
    AStar(AStar),
}

impl Computation {
    fn step(&mut self, out: &mut Vec<CellUpdate>) -> Progress {
        match self {
            Self::Maze(generator) => generator.step(out),
            Self::Bfs(search) => search.step(out),
            Self::Bidirectional(search) => search.step(out),
            Self::AStar(search) => search.step(out),
        }
    }

    fn steps(&self) -> u64 {
        match self {
            Self::Maze(generator) => generator.steps(),
            Self::Bfs(search) => search.steps(),
            Self::Bidirectional(search) => search.steps(),
            Self::AStar(search) => search.steps(),
        }
    }
}

#[derive(Debug)]
struct ActiveRun {
    kind: AlgorithmKind,
    computation: Computation,
    updates: u64,
    work: u64,
    path_length: usize,
}

/// Owns the grid and mediates every algorithm run against it.
#[derive(Debug)]
pub struct StepController {
    grid: Grid,
    active: Option<ActiveRun>,
    last_run: Option<RunSummary>,
    rng: ChaCha8Rng,
    scratch: Vec<CellUpdate>,
}

impl StepController {
    /// Creates an idle controller; `seed` drives every maze it generates.
    #[must_use]
    pub fn new(grid: Grid, seed: u64) -> Self {
        Self {
            grid,
            active: None,
            last_run: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            scratch: Vec::new(),
        }
    }

    /// Read-only view of the grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Releases the grid, discarding any run in progress.
    #[must_use]
    pub fn into_grid(mut self) -> Grid {
        self.grid.unlock();
        self.grid
    }

    /// Forwards a user edit to the grid.
    pub fn apply(&mut self, command: Command, out_events: &mut Vec<Event>) {
        algoview_grid::apply(&mut self.grid, command, out_events);
    }

    /// Starts `kind` against the grid.
    ///
    /// Does nothing and returns `false` while another run is active.
    pub fn activate(&mut self, kind: AlgorithmKind) -> bool {
        if let Some(active) = &self.active {
            debug!(
                requested = kind.label(),
                active = active.kind.label(),
                "activation ignored while a run is active"
            );
            return false;
        }

        let start = self.grid.start_index();
        let end = self.grid.end_index();
        let geometry = self.grid.geometry();

        let computation = match kind {
            AlgorithmKind::MazeGeneration => {
                let _ = self.grid.reset(|_| true);
                let _ = self.grid.paint_where(|_| true, StateCode::Wall);
                let seed = self.rng.gen::<u64>();
                debug!(seed, "seeding maze generation");
                Computation::Maze(MazeGenerator::new(geometry, start, end, seed))
            }
            AlgorithmKind::Bfs | AlgorithmKind::BidirectionalBfs | AlgorithmKind::AStar => {
                let _ = self.grid.reset(StateCode::is_traversal_marker);
                let snapshot = self.grid.state_codes();
                match kind {
                    AlgorithmKind::Bfs => Computation::Bfs(Bfs::new(geometry, start, end, snapshot)),
                    AlgorithmKind::BidirectionalBfs => Computation::Bidirectional(
                        BidirectionalBfs::new(geometry, start, end, snapshot),
                    ),
                    _ => Computation::AStar(AStar::new(geometry, start, end, snapshot)),
                }
            }
        };

        self.grid.lock();
        self.active = Some(ActiveRun {
            kind,
            computation,
            updates: 0,
            work: 0,
            path_length: 0,
        });
        info!(
            algorithm = kind.label(),
            width = self.grid.width(),
            height = self.grid.height(),
            "run started"
        );
        true
    }

    /// Resumes the active run once and applies what it emitted.
    ///
    /// Returns [`Progress::Exhausted`] when idle or when this call finished
    /// the run.
    pub fn advance(&mut self) -> Progress {
        let Some(active) = self.active.as_mut() else {
            return Progress::Exhausted;
        };

        self.scratch.clear();
        let progress = active.computation.step(&mut self.scratch);
        for update in self.scratch.drain(..) {
            active.updates += 1;
            match update {
                CellUpdate::Paint { index, state } => {
                    if state == StateCode::Path {
                        active.path_length += 1;
                    }
                    let _ = self.grid.set(index, state);
                }
                CellUpdate::Carve { index, work } => {
                    active.work += u64::from(work);
                    if self
                        .grid
                        .get(index)
                        .is_some_and(|state| !state.is_reserved())
                    {
                        let _ = self.grid.set(index, StateCode::Open);
                    }
                }
            }
        }

        if progress == Progress::Exhausted {
            self.finalize();
        }
        progress
    }

    /// Reports whether a run currently owns the grid.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Algorithm currently running, if any.
    #[must_use]
    pub fn active_kind(&self) -> Option<AlgorithmKind> {
        self.active.as_ref().map(|active| active.kind)
    }

    /// Resumes performed by the active run; zero while idle.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.active
            .as_ref()
            .map_or(0, |active| active.computation.steps())
    }

    /// Summary of the most recently completed run.
    #[must_use]
    pub const fn last_run(&self) -> Option<RunSummary> {
        self.last_run
    }

    fn finalize(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        if active.kind.is_pathfinding() {
            let _ = self.grid.reset(StateCode::is_transient);
        }
        self.grid.unlock();

        let summary = RunSummary {
            kind: active.kind,
            steps: active.computation.steps(),
            updates: active.updates,
            work: active.work,
            path_length: active.path_length,
        };
        info!(
            algorithm = summary.kind.label(),
            steps = summary.steps,
            updates = summary.updates,
            work = summary.work,
            path_length = summary.path_length,
            "run finished"
        );
        self.last_run = Some(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: usize, height: usize) -> Grid {
        let mut grid = Grid::new(width, height).expect("valid geometry");
        let _ = grid.reset(|_| true);
        grid
    }

    #[test]
    fn advancing_while_idle_does_nothing() {
        let mut controller = StepController::new(open_grid(4, 3), 1);
        let before = controller.grid().state_codes();

        assert_eq!(controller.advance(), Progress::Exhausted);
        assert_eq!(controller.grid().state_codes(), before);
        assert!(controller.last_run().is_none());
    }

    #[test]
    fn activation_locks_and_completion_unlocks() {
        let mut controller = StepController::new(open_grid(5, 3), 1);
        assert!(controller.activate(AlgorithmKind::Bfs));
        assert!(controller.grid().is_locked());
        assert_eq!(controller.active_kind(), Some(AlgorithmKind::Bfs));

        while controller.advance() == Progress::Advanced {}

        assert!(!controller.is_active());
        assert!(!controller.grid().is_locked());
        assert_eq!(controller.steps(), 0);
    }

    #[test]
    fn second_activation_keeps_the_running_computation() {
        let mut controller = StepController::new(open_grid(9, 7), 3);
        assert!(controller.activate(AlgorithmKind::AStar));
        for _ in 0..3 {
            assert_eq!(controller.advance(), Progress::Advanced);
        }

        assert!(!controller.activate(AlgorithmKind::Bfs));
        assert_eq!(controller.active_kind(), Some(AlgorithmKind::AStar));
        assert_eq!(controller.steps(), 3);
    }

    #[test]
    fn maze_activation_walls_the_grid_first() {
        let mut controller = StepController::new(open_grid(6, 6), 9);
        assert!(controller.activate(AlgorithmKind::MazeGeneration));

        let grid = controller.grid();
        let walls = grid.cells_with_predicate(StateCode::is_wall);
        assert_eq!(walls.len(), grid.size() - 2);
    }
}
