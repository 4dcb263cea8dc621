//! Casefile core: logic-grid mysteries.
//!
//! A [`Case`] pairs narrative clues with a hidden subject x item solution.
//! The player works on a [`GridState`] inside a [`Session`], checks it with
//! [`check`] and may spend a bounded number of random hints.

mod case;
mod catalog;
mod checker;
mod daily;
mod error;
mod grid;
mod hint;
mod progress;
mod session;

pub use case::{Case, Category, Clue, ClueKind, Difficulty, Solution};
pub use catalog::{Catalog, BUILTIN_CASES};
pub use checker::check;
pub use daily::{daily_case, today};
pub use error::{CaseError, Result};
pub use grid::{Cell, GridState, Mark};
pub use hint::{HintOutcome, HintProvider, RevealedFact};
pub use progress::{
    PlayerProgress, SolveRecord, DAILY_BONUS, HINT_PENALTY, MAX_TIME_BONUS, MIN_SCORE,
};
pub use session::{Phase, Session};
