use crate::case::Case;
use crate::error::{CaseError, Result};
use crate::grid::{GridState, Mark};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A solution cell revealed by a hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedFact {
    pub subject: String,
    pub item: String,
    pub value: bool,
}

impl std::fmt::Display for RevealedFact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let relation = if self.value { "is" } else { "is not" };
        write!(f, "{} {} associated with {}", self.subject, relation, self.item)
    }
}

/// Result of asking for a hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintOutcome {
    /// One cell was overwritten with its authored value
    Revealed(RevealedFact),
    /// The hint budget is spent; nothing changed
    Refused { hints_used: u32, max_hints: u32 },
}

impl HintOutcome {
    pub fn fact(&self) -> Option<&RevealedFact> {
        match self {
            HintOutcome::Revealed(fact) => Some(fact),
            HintOutcome::Refused { .. } => None,
        }
    }

    pub fn is_refused(&self) -> bool {
        matches!(self, HintOutcome::Refused { .. })
    }
}

/// Reveals random solution cells within a case's hint budget.
///
/// Picks a subject uniformly, then an item uniformly within that subject.
/// The same cell may be revealed more than once.
#[derive(Clone)]
pub struct HintProvider<R = StdRng> {
    rng: R,
}

impl HintProvider<StdRng> {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a provider with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for HintProvider<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for HintProvider<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HintProvider").finish_non_exhaustive()
    }
}

impl<R: Rng> HintProvider<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Reveal one cell unless `hints_used` has reached the case's budget.
    ///
    /// On success the grid cell is overwritten with the authored value and
    /// `hints_used` is incremented. A refusal leaves both untouched.
    pub fn give_hint(
        &mut self,
        case: &Case,
        grid: &mut GridState,
        hints_used: &mut u32,
    ) -> Result<HintOutcome> {
        if *hints_used >= case.max_hints() {
            debug!(case = case.id(), hints_used = *hints_used, "hint refused");
            return Ok(HintOutcome::Refused {
                hints_used: *hints_used,
                max_hints: case.max_hints(),
            });
        }

        let solution = case.solution();
        let subjects = solution.subjects();
        let items = solution.items();
        if subjects.is_empty() || items.is_empty() {
            return Err(CaseError::invalid_case(case.id(), "solution has no cells"));
        }

        let row = self.rng.gen_range(0..subjects.len());
        let col = self.rng.gen_range(0..items.len());
        let value = solution
            .value_at(row, col)
            .ok_or_else(|| CaseError::invalid_coordinate(&subjects[row], &items[col]))?;

        grid.set(&subjects[row], &items[col], Mark::from(value))?;
        *hints_used += 1;

        let fact = RevealedFact {
            subject: subjects[row].clone(),
            item: items[col].clone(),
            value,
        };
        debug!(case = case.id(), hints_used = *hints_used, %fact, "hint revealed");
        Ok(HintOutcome::Revealed(fact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;
    use std::collections::HashSet;

    #[test]
    fn test_fact_display() {
        let fact = RevealedFact {
            subject: "Alice".into(),
            item: "Gallery".into(),
            value: true,
        };
        assert_eq!(fact.to_string(), "Alice is associated with Gallery");

        let fact = RevealedFact { value: false, ..fact };
        assert_eq!(fact.to_string(), "Alice is not associated with Gallery");
    }

    #[test]
    fn test_hints_reveal_authored_values() {
        let case = Catalog::builtin().unwrap().find("diamond-heist").unwrap();
        let mut grid = GridState::initialize(&case);
        let mut hints_used = 0;
        let mut provider = HintProvider::with_seed(7);

        let mut revealed = HashSet::new();
        for expected in 1..=case.max_hints() {
            let outcome = provider.give_hint(&case, &mut grid, &mut hints_used).unwrap();
            let fact = outcome.fact().unwrap().clone();
            assert_eq!(hints_used, expected);
            assert_eq!(case.solution().get(&fact.subject, &fact.item), Some(fact.value));
            revealed.insert((fact.subject, fact.item));
        }

        for (subject, item) in &revealed {
            let value = case.solution().get(subject, item).unwrap();
            assert!(grid.get(subject, item).unwrap().matches(value));
        }
        assert_eq!(grid.marked_count(), revealed.len());
    }

    #[test]
    fn test_refused_at_budget() {
        let case = Catalog::builtin().unwrap().find("art-forgery").unwrap();
        let mut grid = GridState::initialize(&case);
        let mut hints_used = case.max_hints();
        let before = grid.clone();

        let outcome = HintProvider::with_seed(1)
            .give_hint(&case, &mut grid, &mut hints_used)
            .unwrap();
        assert_eq!(
            outcome,
            HintOutcome::Refused {
                hints_used: 1,
                max_hints: 1
            }
        );
        assert_eq!(hints_used, case.max_hints());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_hint_overwrites_wrong_mark() {
        let case = Catalog::builtin().unwrap().find("diamond-heist").unwrap();
        let mut grid = GridState::initialize(&case);
        for (subject, item, value) in case.solution().iter() {
            grid.set(subject, item, Mark::from(!value)).unwrap();
        }

        let mut hints_used = 0;
        let outcome = HintProvider::with_seed(3)
            .give_hint(&case, &mut grid, &mut hints_used)
            .unwrap();
        let fact = outcome.fact().unwrap();
        assert!(grid.get(&fact.subject, &fact.item).unwrap().matches(fact.value));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let case = Catalog::builtin().unwrap().find("bank-robbery").unwrap();
        let run = |seed| {
            let mut grid = GridState::initialize(&case);
            let mut hints_used = 0;
            let mut provider = HintProvider::with_seed(seed);
            (0..case.max_hints())
                .map(|_| provider.give_hint(&case, &mut grid, &mut hints_used).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }
}
