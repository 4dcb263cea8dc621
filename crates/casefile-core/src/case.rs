//! Case definitions: categories, clues and the authored solution.
//!
//! A [`Case`] can only be built through validation, so every value of this
//! type satisfies the schema invariants: at least two categories, unique
//! labels, and a solution cell for every subject x attribute-item pair.

use crate::error::{CaseError, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::warn;

/// Difficulty level of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All difficulties in ascending order
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    /// Star count shown next to a case (1-3)
    pub fn stars(&self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Points awarded for solving a case of this difficulty before adjustments
    pub fn base_score(&self) -> u64 {
        match self {
            Difficulty::Easy => 500,
            Difficulty::Medium => 750,
            Difficulty::Hard => 1000,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// How a clue is phrased. Purely descriptive; clues are never evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClueKind {
    Positive,
    Negative,
    Exclusive,
}

/// A narrative hint shown to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: ClueKind,
}

/// A named, ordered set of mutually exclusive labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub items: Vec<String>,
}

/// The authored answer: a boolean for every subject x attribute-item pair.
///
/// Stored row-major in the order the categories declare their items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    subjects: Vec<String>,
    items: Vec<String>,
    values: Vec<bool>,
}

impl Solution {
    /// Subject labels, in category order
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Attribute item labels across all attribute categories, in order
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Look up the authored value for a pair
    pub fn get(&self, subject: &str, item: &str) -> Option<bool> {
        let row = self.subjects.iter().position(|s| s == subject)?;
        let col = self.items.iter().position(|i| i == item)?;
        Some(self.values[row * self.items.len() + col])
    }

    /// Authored value by index, `None` when out of range
    pub fn value_at(&self, subject: usize, item: usize) -> Option<bool> {
        if subject < self.subjects.len() && item < self.items.len() {
            Some(self.values[subject * self.items.len() + item])
        } else {
            None
        }
    }

    /// Every (subject, item, value) triple, row by row
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, bool)> + '_ {
        self.subjects.iter().enumerate().flat_map(move |(row, subject)| {
            self.items.iter().enumerate().map(move |(col, item)| {
                (
                    subject.as_str(),
                    item.as_str(),
                    self.values[row * self.items.len() + col],
                )
            })
        })
    }

    /// Number of cells in the solution
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn from_table(
        case_id: &str,
        categories: &[Category],
        table: &HashMap<String, HashMap<String, bool>>,
    ) -> Result<Self> {
        let subjects = categories[0].items.clone();
        let items: Vec<String> = categories[1..]
            .iter()
            .flat_map(|c| c.items.iter().cloned())
            .collect();

        for (subject, row) in table {
            if !subjects.contains(subject) {
                return Err(CaseError::invalid_case(
                    case_id,
                    format!("solution names unknown subject '{}'", subject),
                ));
            }
            if let Some(item) = row.keys().find(|k| !items.contains(k)) {
                return Err(CaseError::invalid_case(
                    case_id,
                    format!("solution for '{}' names unknown item '{}'", subject, item),
                ));
            }
        }

        let mut values = Vec::with_capacity(subjects.len() * items.len());
        for subject in &subjects {
            let row = table.get(subject).ok_or_else(|| {
                CaseError::invalid_case(case_id, format!("solution is missing subject '{}'", subject))
            })?;
            for item in &items {
                let value = row.get(item).copied().ok_or_else(|| {
                    CaseError::invalid_case(
                        case_id,
                        format!("solution is missing ('{}', '{}')", subject, item),
                    )
                })?;
                values.push(value);
            }
        }

        Ok(Self {
            subjects,
            items,
            values,
        })
    }
}

struct SolutionRow<'a> {
    items: &'a [String],
    values: &'a [bool],
}

impl Serialize for SolutionRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (item, value) in self.items.iter().zip(self.values) {
            map.serialize_entry(item, value)?;
        }
        map.end()
    }
}

impl Serialize for Solution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let width = self.items.len();
        let mut map = serializer.serialize_map(Some(self.subjects.len()))?;
        for (row, subject) in self.subjects.iter().enumerate() {
            let row = SolutionRow {
                items: &self.items,
                values: &self.values[row * width..(row + 1) * width],
            };
            map.serialize_entry(subject, &row)?;
        }
        map.end()
    }
}

/// Case as written in the authoring format, before validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDef {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    story: String,
    difficulty: Difficulty,
    #[serde(default)]
    is_premium: bool,
    max_hints: u32,
    #[serde(default)]
    time_limit: Option<u32>,
    categories: Vec<Category>,
    #[serde(default)]
    clues: Vec<Clue>,
    solution: HashMap<String, HashMap<String, bool>>,
}

/// A single logic-grid mystery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CaseDef")]
pub struct Case {
    id: String,
    title: String,
    description: String,
    story: String,
    difficulty: Difficulty,
    is_premium: bool,
    max_hints: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_limit: Option<u32>,
    categories: Vec<Category>,
    clues: Vec<Clue>,
    solution: Solution,
}

impl TryFrom<CaseDef> for Case {
    type Error = CaseError;

    fn try_from(def: CaseDef) -> Result<Self> {
        if def.id.trim().is_empty() {
            return Err(CaseError::invalid_case(&def.id, "case id is empty"));
        }
        if def.time_limit == Some(0) {
            return Err(CaseError::invalid_case(&def.id, "time limit must be positive"));
        }
        validate_categories(&def.id, &def.categories)?;
        let solution = Solution::from_table(&def.id, &def.categories, &def.solution)?;

        let case = Self {
            id: def.id,
            title: def.title,
            description: def.description,
            story: def.story,
            difficulty: def.difficulty,
            is_premium: def.is_premium,
            max_hints: def.max_hints,
            time_limit: def.time_limit,
            categories: def.categories,
            clues: def.clues,
            solution,
        };

        if !case.is_one_to_one() {
            warn!(case = %case.id, "solution is not a one-to-one assignment");
        }

        Ok(case)
    }
}

fn validate_categories(case_id: &str, categories: &[Category]) -> Result<()> {
    if categories.len() < 2 {
        return Err(CaseError::invalid_case(
            case_id,
            format!("needs at least 2 categories, found {}", categories.len()),
        ));
    }

    let mut attribute_labels = HashSet::new();
    for (index, category) in categories.iter().enumerate() {
        if category.items.is_empty() {
            return Err(CaseError::invalid_case(
                case_id,
                format!("category '{}' has no items", category.id),
            ));
        }

        let mut seen = HashSet::new();
        for item in &category.items {
            if !seen.insert(item.as_str()) {
                return Err(CaseError::invalid_case(
                    case_id,
                    format!("category '{}' repeats item '{}'", category.id, item),
                ));
            }
            // Grid and solution are keyed by bare label
            if index > 0 && !attribute_labels.insert(item.as_str()) {
                return Err(CaseError::invalid_case(
                    case_id,
                    format!("item '{}' appears in more than one attribute category", item),
                ));
            }
        }
    }

    Ok(())
}

impl Case {
    /// Parse and validate a single case from the authoring format
    pub fn from_json(json: &str) -> Result<Self> {
        let def: CaseDef = serde_json::from_str(json)?;
        Self::try_from(def)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn story(&self) -> &str {
        &self.story
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    /// Hint budget for one session
    pub fn max_hints(&self) -> u32 {
        self.max_hints
    }

    /// Advisory time limit in minutes
    pub fn time_limit_minutes(&self) -> Option<u32> {
        self.time_limit
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
            .map(|minutes| Duration::from_secs(u64::from(minutes) * 60))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// The first category; its items label the grid rows
    pub fn subject_category(&self) -> &Category {
        &self.categories[0]
    }

    /// Every category after the subject category
    pub fn attribute_categories(&self) -> &[Category] {
        &self.categories[1..]
    }

    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Subject labels (grid rows)
    pub fn subjects(&self) -> &[String] {
        self.solution.subjects()
    }

    /// Attribute item labels (grid columns)
    pub fn attribute_items(&self) -> &[String] {
        self.solution.items()
    }

    /// Category containing an attribute item
    pub fn category_of(&self, item: &str) -> Option<&Category> {
        self.attribute_categories()
            .iter()
            .find(|c| c.items.iter().any(|i| i == item))
    }

    /// For every subject, the attribute items the solution marks true
    pub fn assignments(&self) -> Vec<(&str, Vec<&str>)> {
        self.subjects()
            .iter()
            .map(|subject| {
                let items = self
                    .solution
                    .iter()
                    .filter(|(s, _, value)| *s == subject.as_str() && *value)
                    .map(|(_, item, _)| item)
                    .collect();
                (subject.as_str(), items)
            })
            .collect()
    }

    /// Whether each subject has exactly one true item per attribute category
    pub fn is_one_to_one(&self) -> bool {
        self.subjects().iter().all(|subject| {
            self.attribute_categories().iter().all(|category| {
                category
                    .items
                    .iter()
                    .filter(|item| self.solution.get(subject, item) == Some(true))
                    .count()
                    == 1
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI: &str = r#"{
        "id": "mini",
        "title": "Mini",
        "difficulty": "easy",
        "maxHints": 1,
        "categories": [
            { "id": "who", "name": "Who", "items": ["Ann", "Ben"] },
            { "id": "where", "name": "Where", "items": ["Hall", "Attic"] }
        ],
        "clues": [{ "id": "c1", "text": "Ann was not in the Attic.", "type": "negative" }],
        "solution": {
            "Ann": { "Hall": true, "Attic": false },
            "Ben": { "Hall": false, "Attic": true }
        }
    }"#;

    fn with_solution(solution: &str) -> String {
        MINI.replace(
            r#""solution": {
            "Ann": { "Hall": true, "Attic": false },
            "Ben": { "Hall": false, "Attic": true }
        }"#,
            &format!(r#""solution": {}"#, solution),
        )
    }

    fn reason(err: CaseError) -> String {
        match err {
            CaseError::InvalidCase { reason, .. } => reason,
            other => panic!("expected InvalidCase, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_valid_case() {
        let case = Case::from_json(MINI).unwrap();
        assert_eq!(case.id(), "mini");
        assert_eq!(case.difficulty(), Difficulty::Easy);
        assert!(!case.is_premium());
        assert_eq!(case.time_limit(), None);
        assert_eq!(case.subjects(), ["Ann", "Ben"]);
        assert_eq!(case.attribute_items(), ["Hall", "Attic"]);
        assert_eq!(case.clues()[0].kind, ClueKind::Negative);
        assert_eq!(case.solution().get("Ben", "Attic"), Some(true));
        assert_eq!(case.solution().get("Ben", "Cellar"), None);
        assert!(case.is_one_to_one());
    }

    #[test]
    fn test_missing_solution_cell_rejected() {
        let json = with_solution(
            r#"{ "Ann": { "Hall": true, "Attic": false }, "Ben": { "Hall": false } }"#,
        );
        let err = Case::from_json(&json).unwrap_err();
        assert!(reason(err).contains("missing ('Ben', 'Attic')"));
    }

    #[test]
    fn test_missing_subject_rejected() {
        let json = with_solution(r#"{ "Ann": { "Hall": true, "Attic": false } }"#);
        let err = Case::from_json(&json).unwrap_err();
        assert!(reason(err).contains("missing subject 'Ben'"));
    }

    #[test]
    fn test_unknown_solution_keys_rejected() {
        let json = with_solution(
            r#"{ "Ann": { "Hall": true, "Attic": false },
                 "Ben": { "Hall": false, "Attic": true },
                 "Cat": { "Hall": false, "Attic": false } }"#,
        );
        assert!(reason(Case::from_json(&json).unwrap_err()).contains("unknown subject 'Cat'"));

        let json = with_solution(
            r#"{ "Ann": { "Hall": true, "Attic": false, "Cellar": false },
                 "Ben": { "Hall": false, "Attic": true } }"#,
        );
        assert!(reason(Case::from_json(&json).unwrap_err()).contains("unknown item 'Cellar'"));
    }

    #[test]
    fn test_single_category_rejected() {
        let json = r#"{
            "id": "lonely", "title": "Lonely", "difficulty": "hard", "maxHints": 0,
            "categories": [{ "id": "who", "name": "Who", "items": ["Ann"] }],
            "solution": { "Ann": {} }
        }"#;
        assert!(reason(Case::from_json(json).unwrap_err()).contains("at least 2 categories"));
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let json = MINI.replace(r#"["Hall", "Attic"]"#, r#"["Hall", "Hall"]"#);
        assert!(reason(Case::from_json(&json).unwrap_err()).contains("repeats item 'Hall'"));
    }

    #[test]
    fn test_label_shared_across_attributes_rejected() {
        let json = MINI.replace(
            r#"{ "id": "where", "name": "Where", "items": ["Hall", "Attic"] }"#,
            r#"{ "id": "where", "name": "Where", "items": ["Hall", "Attic"] },
               { "id": "when", "name": "When", "items": ["Hall"] }"#,
        );
        assert!(reason(Case::from_json(&json).unwrap_err()).contains("more than one attribute"));
    }

    #[test]
    fn test_zero_time_limit_rejected() {
        let json = MINI.replace(r#""maxHints": 1,"#, r#""maxHints": 1, "timeLimit": 0,"#);
        assert!(reason(Case::from_json(&json).unwrap_err()).contains("time limit"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            Case::from_json("{ not json"),
            Err(CaseError::Parse(_))
        ));
    }

    #[test]
    fn test_not_one_to_one_is_accepted() {
        let json = with_solution(
            r#"{ "Ann": { "Hall": true, "Attic": true }, "Ben": { "Hall": false, "Attic": false } }"#,
        );
        let case = Case::from_json(&json).unwrap();
        assert!(!case.is_one_to_one());
    }

    #[test]
    fn test_assignments() {
        let case = Case::from_json(MINI).unwrap();
        assert_eq!(
            case.assignments(),
            vec![("Ann", vec!["Hall"]), ("Ben", vec!["Attic"])]
        );
        assert_eq!(case.category_of("Attic").map(|c| c.id.as_str()), Some("where"));
    }

    #[test]
    fn test_serialize_uses_authoring_format() {
        let case = Case::from_json(MINI).unwrap();
        let value = serde_json::to_value(&case).unwrap();
        assert_eq!(value["maxHints"], 1);
        assert_eq!(value["isPremium"], false);
        assert!(value.get("timeLimit").is_none());
        assert_eq!(value["solution"]["Ann"]["Hall"], true);
        assert_eq!(value["clues"][0]["type"], "negative");

        let reparsed: Case = serde_json::from_value(value).unwrap();
        assert_eq!(reparsed, case);
    }
}
