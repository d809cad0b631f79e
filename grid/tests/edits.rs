use algoview_core::{Command, EditError, Event, StateCode};
use algoview_grid::{apply, Grid};

fn open_grid(width: usize, height: usize) -> Grid {
    let mut grid = Grid::new(width, height).expect("valid geometry");
    let _ = grid.reset(|_| true);
    grid
}

fn submit(grid: &mut Grid, command: Command) -> Event {
    let mut events = Vec::new();
    apply(grid, command, &mut events);
    assert_eq!(events.len(), 1, "every edit reports exactly one event");
    events[0]
}

#[test]
fn painting_a_cell_reports_whether_it_changed() {
    let mut grid = open_grid(5, 3);
    let paint = Command::PaintCell {
        index: 1,
        state: StateCode::Wall,
    };

    assert_eq!(submit(&mut grid, paint.clone()), Event::CellsChanged { count: 1 });
    assert_eq!(submit(&mut grid, paint), Event::CellsChanged { count: 0 });
    assert_eq!(grid.get(1), Some(StateCode::Wall));
}

#[test]
fn endpoints_cannot_be_painted() {
    let mut grid = open_grid(5, 3);
    let start = grid.start_index();

    assert_eq!(
        submit(
            &mut grid,
            Command::PaintCell {
                index: start,
                state: StateCode::Wall,
            },
        ),
        Event::EditRejected {
            reason: EditError::ReservedCell
        },
    );
    assert_eq!(grid.get(start), Some(StateCode::Start));
}

#[test]
fn malformed_paints_are_rejected() {
    let mut grid = open_grid(4, 4);

    assert_eq!(
        submit(
            &mut grid,
            Command::PaintCell {
                index: 16,
                state: StateCode::Wall,
            },
        ),
        Event::EditRejected {
            reason: EditError::OutOfBounds
        },
    );
    assert_eq!(
        submit(
            &mut grid,
            Command::PaintCell {
                index: 0,
                state: StateCode::Path,
            },
        ),
        Event::EditRejected {
            reason: EditError::InvalidState
        },
    );
    assert_eq!(
        submit(
            &mut grid,
            Command::PaintLine {
                from: 0,
                to: 5,
                state: StateCode::Wall,
            },
        ),
        Event::EditRejected {
            reason: EditError::NotStraight
        },
    );
}

#[test]
fn lines_skip_endpoints_and_accept_either_direction() {
    let mut grid = open_grid(6, 3);
    // Middle row holds start (6) and end (11).
    assert_eq!(
        submit(
            &mut grid,
            Command::PaintLine {
                from: 11,
                to: 6,
                state: StateCode::Wall,
            },
        ),
        Event::CellsChanged { count: 4 },
    );
    assert_eq!(
        grid.cells_with_predicate(StateCode::is_wall),
        vec![7, 8, 9, 10]
    );
    assert_eq!(grid.get(6), Some(StateCode::Start));
    assert_eq!(grid.get(11), Some(StateCode::End));

    assert_eq!(
        submit(
            &mut grid,
            Command::PaintLine {
                from: 2,
                to: 14,
                state: StateCode::Wall,
            },
        ),
        Event::CellsChanged { count: 2 },
    );
}

#[test]
fn clear_commands_target_their_own_cells() {
    let mut grid = open_grid(4, 3);
    assert!(grid.set(0, StateCode::Wall));
    assert!(grid.set(1, StateCode::DiscoveredA));
    assert!(grid.set(2, StateCode::Path));

    assert_eq!(
        submit(&mut grid, Command::ClearTraversal),
        Event::CellsChanged { count: 2 }
    );
    assert_eq!(grid.get(0), Some(StateCode::Wall));

    assert_eq!(
        submit(&mut grid, Command::ClearWalls),
        Event::CellsChanged { count: 1 }
    );

    assert!(grid.set(3, StateCode::Wall));
    assert!(grid.set(8, StateCode::ProcessedB));
    assert_eq!(
        submit(&mut grid, Command::ClearAll),
        Event::CellsChanged { count: 2 }
    );
    assert!(grid
        .cells_with_predicate(|state| !state.is_reserved())
        .iter()
        .all(|index| grid.get(*index) == Some(StateCode::Open)));
}

#[test]
fn locked_grid_rejects_every_edit() {
    let mut grid = open_grid(5, 5);
    grid.lock();
    let before = grid.state_codes();

    for command in [
        Command::PaintCell {
            index: 0,
            state: StateCode::Wall,
        },
        Command::PaintLine {
            from: 0,
            to: 4,
            state: StateCode::Wall,
        },
        Command::ClearTraversal,
        Command::ClearWalls,
        Command::ClearAll,
    ] {
        assert_eq!(
            submit(&mut grid, command),
            Event::EditRejected {
                reason: EditError::Locked
            },
        );
    }
    assert_eq!(grid.state_codes(), before);

    grid.unlock();
    assert_eq!(
        submit(
            &mut grid,
            Command::PaintCell {
                index: 0,
                state: StateCode::Wall,
            },
        ),
        Event::CellsChanged { count: 1 },
    );
}
