use crate::case::{Case, CaseDef};
use crate::error::{CaseError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// The five built-in cases in the authoring format
pub const BUILTIN_CASES: &str = include_str!("../data/cases.json");

/// Ordered, immutable collection of validated cases
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cases: Vec<Arc<Case>>,
}

impl Catalog {
    /// The catalog embedded in the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CASES)
    }

    /// Parse a JSON array of cases in the authoring format
    pub fn from_json(json: &str) -> Result<Self> {
        let defs: Vec<CaseDef> = serde_json::from_str(json)?;
        let cases = defs
            .into_iter()
            .map(Case::try_from)
            .collect::<Result<Vec<_>>>()?;
        let catalog = Self::from_cases(cases)?;
        info!(cases = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Build from already validated cases; ids must be unique
    pub fn from_cases(cases: Vec<Case>) -> Result<Self> {
        let mut seen = HashSet::new();
        for case in &cases {
            if !seen.insert(case.id().to_string()) {
                return Err(CaseError::invalid_case(case.id(), "duplicate case id"));
            }
        }
        Ok(Self {
            cases: cases.into_iter().map(Arc::new).collect(),
        })
    }

    /// Exact id lookup
    pub fn find(&self, id: &str) -> Result<Arc<Case>> {
        self.cases
            .iter()
            .find(|case| case.id() == id)
            .cloned()
            .ok_or_else(|| CaseError::CaseNotFound(id.to_string()))
    }

    /// Cases in authored order
    pub fn cases(&self) -> &[Arc<Case>] {
        &self.cases
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.cases.iter().position(|case| case.id() == id)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
