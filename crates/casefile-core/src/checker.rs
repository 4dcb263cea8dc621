//! Flat comparison of a grid against a case's authored solution.

use crate::case::Solution;
use crate::grid::{GridState, Mark};

/// True iff every solution cell is marked with exactly its authored value.
///
/// Pairs missing from the grid count as unknown, and unknown never equals a
/// boolean, so an incomplete grid is never correct.
pub fn check(grid: &GridState, solution: &Solution) -> bool {
    solution
        .iter()
        .all(|(subject, item, value)| mark_for(grid, subject, item).matches(value))
}

fn mark_for(grid: &GridState, subject: &str, item: &str) -> Mark {
    grid.get(subject, item).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Case, Catalog};
    use std::sync::Arc;

    fn diamond() -> Arc<Case> {
        Catalog::builtin().unwrap().find("diamond-heist").unwrap()
    }

    fn solved_grid(case: &Case) -> GridState {
        let mut grid = GridState::initialize(case);
        for (subject, item, value) in case.solution().iter() {
            grid.set(subject, item, Mark::from(value)).unwrap();
        }
        grid
    }

    #[test]
    fn test_empty_grid_fails() {
        let case = diamond();
        let grid = GridState::initialize(&case);
        assert!(!check(&grid, case.solution()));
    }

    #[test]
    fn test_solution_grid_passes() {
        let case = diamond();
        let grid = solved_grid(&case);
        assert!(check(&grid, case.solution()));
    }

    #[test]
    fn test_any_single_change_fails() {
        let case = diamond();
        let solved = solved_grid(&case);
        for (subject, item, _) in case.solution().iter() {
            for mark in [Mark::Unknown, Mark::True, Mark::False] {
                let mut grid = solved.clone();
                let previous = grid.set(subject, item, mark).unwrap();
                if previous != mark {
                    assert!(!check(&grid, case.solution()), "{subject}/{item} -> {mark:?}");
                }
            }
        }
    }

    #[test]
    fn test_grid_from_other_case_fails() {
        let catalog = Catalog::builtin().unwrap();
        let diamond = catalog.find("diamond-heist").unwrap();
        let mansion = catalog.find("mansion-murder").unwrap();
        let grid = solved_grid(&mansion);
        assert!(!check(&grid, diamond.solution()));
    }
}
