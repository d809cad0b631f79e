//! Plain-text frames and run summaries.

use std::fmt::Write as _;

use algoview_core::StateCode;
use algoview_grid::{query, Grid};
use algoview_system_controller::RunSummary;

const fn glyph(state: StateCode) -> char {
    match state {
        StateCode::Start => 'S',
        StateCode::End => 'E',
        StateCode::Open => ' ',
        StateCode::Wall => '#',
        StateCode::DiscoveredA => 'a',
        StateCode::DiscoveredB => 'b',
        StateCode::ProcessedA => 'A',
        StateCode::ProcessedB => 'B',
        StateCode::Path => '*',
    }
}

/// Renders the grid one row per line, framed by a border.
pub(crate) fn frame(grid: &Grid) -> String {
    let border = format!("+{}+", "-".repeat(grid.width()));
    let mut text = String::with_capacity((grid.width() + 3) * (grid.height() + 2));
    text.push_str(&border);
    text.push('\n');
    for row in query::rows(grid) {
        text.push('|');
        text.extend(row.iter().map(|cell| glyph(cell.state())));
        text.push_str("|\n");
    }
    text.push_str(&border);
    text
}

/// Single-line description of a finished run.
pub(crate) fn summary(run: &RunSummary) -> String {
    let mut line = format!(
        "{}: {} steps, {} updates",
        run.kind().label(),
        run.steps(),
        run.updates()
    );
    if run.kind().is_pathfinding() {
        if run.path_length() == 0 {
            line.push_str(", no path");
        } else {
            let _ = write!(line, ", path of {} cells", run.path_length());
        }
    } else {
        let _ = write!(line, ", {} work", run.work());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_draws_every_cell_inside_a_border() {
        let mut grid = Grid::new(4, 3).expect("valid geometry");
        assert!(grid.set(5, StateCode::Open));
        assert!(grid.set(6, StateCode::Path));

        assert_eq!(frame(&grid), "+----+\n|####|\n|S *E|\n|####|\n+----+");
    }
}
