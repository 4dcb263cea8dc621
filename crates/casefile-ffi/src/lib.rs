use casefile_core::{
    daily_case, today, Case, CaseError, Catalog, Cell, ClueKind, Difficulty, HintOutcome, Mark,
    Phase, Session,
};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

uniffi::setup_scaffolding!();

/// Errors surfaced to the host app
#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum CasefileError {
    #[error("case not found: {0}")]
    CaseNotFound(String),
    #[error("invalid cell: {0}")]
    InvalidCell(String),
    #[error("invalid case data: {0}")]
    InvalidCase(String),
    #[error("{0}")]
    InvalidState(String),
}

impl From<CaseError> for CasefileError {
    fn from(e: CaseError) -> Self {
        match e {
            CaseError::CaseNotFound(id) => CasefileError::CaseNotFound(id),
            CaseError::InvalidCoordinate { .. } => CasefileError::InvalidCell(e.to_string()),
            CaseError::InvalidCase { .. } | CaseError::Parse(_) => {
                CasefileError::InvalidCase(e.to_string())
            }
            CaseError::InvalidState { .. } => CasefileError::InvalidState(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum CaseDifficulty {
    Easy,
    Medium,
    Hard,
}

impl From<Difficulty> for CaseDifficulty {
    fn from(d: Difficulty) -> Self {
        match d {
            Difficulty::Easy => CaseDifficulty::Easy,
            Difficulty::Medium => CaseDifficulty::Medium,
            Difficulty::Hard => CaseDifficulty::Hard,
        }
    }
}

/// The player's mark on one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum CellMark {
    Unknown,
    True,
    False,
}

impl From<Mark> for CellMark {
    fn from(m: Mark) -> Self {
        match m {
            Mark::Unknown => CellMark::Unknown,
            Mark::True => CellMark::True,
            Mark::False => CellMark::False,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum SessionPhase {
    NotStarted,
    StoryShown,
    InProgress,
    Solved,
    Abandoned,
}

impl From<Phase> for SessionPhase {
    fn from(p: Phase) -> Self {
        match p {
            Phase::NotStarted => SessionPhase::NotStarted,
            Phase::StoryShown => SessionPhase::StoryShown,
            Phase::InProgress => SessionPhase::InProgress,
            Phase::Solved => SessionPhase::Solved,
            Phase::Abandoned => SessionPhase::Abandoned,
        }
    }
}

/// Catalog entry shown on a case list
#[derive(Debug, Clone, uniffi::Record)]
pub struct CaseSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: CaseDifficulty,
    pub is_premium: bool,
    pub max_hints: u32,
    pub time_limit_minutes: Option<u32>,
    pub subject_count: u32,
    pub item_count: u32,
}

impl From<&Case> for CaseSummary {
    fn from(case: &Case) -> Self {
        Self {
            id: case.id().to_string(),
            title: case.title().to_string(),
            description: case.description().to_string(),
            difficulty: case.difficulty().into(),
            is_premium: case.is_premium(),
            max_hints: case.max_hints(),
            time_limit_minutes: case.time_limit_minutes(),
            subject_count: case.subjects().len() as u32,
            item_count: case.attribute_items().len() as u32,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct ClueInfo {
    pub id: String,
    pub text: String,
    /// "positive", "negative" or "exclusive"
    pub kind: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    pub items: Vec<String>,
}

/// One cell of the grid snapshot
#[derive(Debug, Clone, uniffi::Record)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
    pub subject: String,
    pub item: String,
    pub mark: CellMark,
}

/// Result of a hint request
#[derive(Debug, Clone, uniffi::Record)]
pub struct HintResult {
    /// False when the hint budget is spent
    pub revealed: bool,
    pub subject: Option<String>,
    pub item: Option<String>,
    pub value: Option<bool>,
    /// Human-readable explanation
    pub description: String,
    pub hints_used: u32,
    pub max_hints: u32,
}

/// Score and rating of a solved session
#[derive(Debug, Clone, uniffi::Record)]
pub struct SolveSummary {
    pub case_id: String,
    pub time_secs: u64,
    pub hints_used: u32,
    pub score: u64,
    pub stars: u8,
    pub daily: bool,
}

static CATALOG: OnceLock<Result<Catalog, String>> = OnceLock::new();

fn builtin_catalog() -> Result<&'static Catalog, CasefileError> {
    CATALOG
        .get_or_init(|| Catalog::builtin().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| CasefileError::InvalidCase(e.clone()))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// All built-in cases in catalog order
#[uniffi::export]
pub fn list_cases() -> Result<Vec<CaseSummary>, CasefileError> {
    Ok(builtin_catalog()?
        .cases()
        .iter()
        .map(|case| CaseSummary::from(case.as_ref()))
        .collect())
}

/// Id of today's daily challenge
#[uniffi::export]
pub fn daily_case_id() -> Option<String> {
    daily_case_id_for_day(today())
}

/// Id of the daily challenge for a day number (days since the Unix epoch)
#[uniffi::export]
pub fn daily_case_id_for_day(day: u64) -> Option<String> {
    let catalog = builtin_catalog().ok()?;
    daily_case(catalog, day).map(|case| case.id().to_string())
}

/// Parse and validate a JSON case file
#[uniffi::export]
pub fn validate_catalog(json: String) -> Result<Vec<CaseSummary>, CasefileError> {
    let catalog = Catalog::from_json(&json)?;
    Ok(catalog
        .cases()
        .iter()
        .map(|case| CaseSummary::from(case.as_ref()))
        .collect())
}

// Free function for custom cases (UniFFI constructors cannot parse arbitrary input lazily)

/// Open a session on a single case given as JSON
#[uniffi::export]
pub fn session_from_json(case_json: String) -> Result<Arc<PuzzleSession>, CasefileError> {
    let case = Case::from_json(&case_json)?;
    Ok(PuzzleSession::wrap(Session::open(Arc::new(case))))
}

/// A puzzle session owned by the host app
#[derive(uniffi::Object)]
pub struct PuzzleSession {
    session: Mutex<Session>,
}

impl PuzzleSession {
    fn wrap(session: Session) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(session),
        })
    }

    fn case(&self) -> Arc<Case> {
        lock(&self.session).case().clone()
    }
}

#[uniffi::export]
impl PuzzleSession {
    /// Open a built-in case with its story showing
    #[uniffi::constructor]
    pub fn new(case_id: String) -> Result<Arc<Self>, CasefileError> {
        let case = builtin_catalog()?.find(&case_id)?;
        Ok(Self::wrap(Session::open(case)))
    }

    /// Open today's daily challenge; solving it earns the daily bonus
    #[uniffi::constructor]
    pub fn new_daily() -> Result<Arc<Self>, CasefileError> {
        let catalog = builtin_catalog()?;
        let case = daily_case(catalog, today())
            .ok_or_else(|| CasefileError::CaseNotFound("daily".to_string()))?;
        let mut session = Session::open(case);
        session.set_daily(true);
        Ok(Self::wrap(session))
    }

    pub fn summary(&self) -> CaseSummary {
        CaseSummary::from(self.case().as_ref())
    }

    pub fn story(&self) -> String {
        self.case().story().to_string()
    }

    pub fn clues(&self) -> Vec<ClueInfo> {
        self.case()
            .clues()
            .iter()
            .map(|clue| ClueInfo {
                id: clue.id.clone(),
                text: clue.text.clone(),
                kind: match clue.kind {
                    ClueKind::Positive => "positive",
                    ClueKind::Negative => "negative",
                    ClueKind::Exclusive => "exclusive",
                }
                .to_string(),
            })
            .collect()
    }

    /// Subject category first, then the attribute categories
    pub fn categories(&self) -> Vec<CategoryInfo> {
        self.case()
            .categories()
            .iter()
            .map(|c| CategoryInfo {
                id: c.id.clone(),
                name: c.name.clone(),
                items: c.items.clone(),
            })
            .collect()
    }

    /// Start the clock and allow marking
    pub fn begin(&self) -> Result<(), CasefileError> {
        Ok(lock(&self.session).begin()?)
    }

    /// Cycle a cell by its labels: unknown, true, false
    pub fn toggle(&self, subject: String, item: String) -> Result<CellMark, CasefileError> {
        Ok(lock(&self.session).toggle(&subject, &item)?.into())
    }

    /// Cycle a cell by row (subject) and column (item) index
    pub fn toggle_at(&self, row: u32, col: u32) -> Result<CellMark, CasefileError> {
        let cell = Cell::new(row as usize, col as usize);
        Ok(lock(&self.session).toggle_at(cell)?.into())
    }

    /// Reset every cell to unknown; spent hints are not refunded
    pub fn clear_grid(&self) -> Result<(), CasefileError> {
        Ok(lock(&self.session).clear_grid()?)
    }

    pub fn get_mark(&self, subject: String, item: String) -> Option<CellMark> {
        lock(&self.session)
            .grid()
            .get(&subject, &item)
            .map(CellMark::from)
    }

    /// Snapshot of every cell, row-major
    pub fn get_all_cells(&self) -> Vec<GridCell> {
        let session = lock(&self.session);
        let grid = session.grid();
        let (_, cols) = grid.dimensions();
        grid.iter()
            .enumerate()
            .map(|(i, (subject, item, mark))| GridCell {
                row: (i / cols) as u32,
                col: (i % cols) as u32,
                subject: subject.to_string(),
                item: item.to_string(),
                mark: mark.into(),
            })
            .collect()
    }

    /// Compare the grid to the solution; true moves the session to solved
    pub fn check(&self) -> Result<bool, CasefileError> {
        Ok(lock(&self.session).check()?)
    }

    pub fn hint(&self) -> Result<HintResult, CasefileError> {
        let mut session = lock(&self.session);
        let outcome = session.hint()?;
        let hints_used = session.hints_used();
        let max_hints = session.case().max_hints();

        Ok(match outcome {
            HintOutcome::Revealed(fact) => HintResult {
                revealed: true,
                description: fact.to_string(),
                subject: Some(fact.subject),
                item: Some(fact.item),
                value: Some(fact.value),
                hints_used,
                max_hints,
            },
            HintOutcome::Refused { .. } => HintResult {
                revealed: false,
                subject: None,
                item: None,
                value: None,
                description: "No hints remaining".to_string(),
                hints_used,
                max_hints,
            },
        })
    }

    pub fn abandon(&self) -> Result<(), CasefileError> {
        Ok(lock(&self.session).abandon()?)
    }

    /// Returns whether the session is now paused
    pub fn toggle_pause(&self) -> Result<bool, CasefileError> {
        Ok(lock(&self.session).toggle_pause()?)
    }

    pub fn phase(&self) -> SessionPhase {
        lock(&self.session).phase().into()
    }

    pub fn is_paused(&self) -> bool {
        lock(&self.session).is_paused()
    }

    pub fn is_daily(&self) -> bool {
        lock(&self.session).is_daily()
    }

    pub fn hints_used(&self) -> u32 {
        lock(&self.session).hints_used()
    }

    pub fn hints_remaining(&self) -> u32 {
        lock(&self.session).hints_remaining()
    }

    pub fn elapsed_secs(&self) -> u64 {
        lock(&self.session).elapsed().as_secs()
    }

    /// Elapsed time as MM:SS
    pub fn elapsed_string(&self) -> String {
        lock(&self.session).elapsed_string()
    }

    pub fn is_overtime(&self) -> bool {
        lock(&self.session).is_overtime()
    }

    /// Score and stars, once solved
    pub fn solve_summary(&self) -> Option<SolveSummary> {
        let record = lock(&self.session).solve_record()?;
        Some(SolveSummary {
            score: record.score(),
            stars: record.stars(),
            case_id: record.case_id,
            time_secs: record.time_secs,
            hints_used: record.hints_used,
            daily: record.daily,
        })
    }

    /// Grid state as JSON, for saving in the host app
    pub fn serialize_grid(&self) -> String {
        let session = lock(&self.session);
        serde_json::to_string(session.grid()).unwrap_or_default()
    }
}
