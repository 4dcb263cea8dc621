use crate::case::Case;
use crate::error::{CaseError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The player's mark for one (subject, item) cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    #[default]
    Unknown,
    True,
    False,
}

impl Mark {
    /// Next mark in the toggle cycle: unknown -> true -> false -> unknown
    pub fn next(self) -> Self {
        match self {
            Mark::Unknown => Mark::True,
            Mark::True => Mark::False,
            Mark::False => Mark::Unknown,
        }
    }

    /// The boolean this mark asserts, if any
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Mark::Unknown => None,
            Mark::True => Some(true),
            Mark::False => Some(false),
        }
    }

    /// Whether the mark equals an authored value. Unknown never does.
    pub fn matches(self, value: bool) -> bool {
        self.as_bool() == Some(value)
    }

    pub fn is_unknown(self) -> bool {
        self == Mark::Unknown
    }
}

impl From<bool> for Mark {
    fn from(value: bool) -> Self {
        if value {
            Mark::True
        } else {
            Mark::False
        }
    }
}

impl From<Option<bool>> for Mark {
    fn from(value: Option<bool>) -> Self {
        value.map(Mark::from).unwrap_or_default()
    }
}

/// Index of a cell: row is the subject, column the attribute item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub subject: usize,
    pub item: usize,
}

impl Cell {
    pub fn new(subject: usize, item: usize) -> Self {
        Self { subject, item }
    }
}

/// The player's working assignment over subject x attribute-item cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridState {
    subjects: Vec<String>,
    items: Vec<String>,
    marks: Vec<Mark>,
}

impl GridState {
    /// Fresh grid for a case with every cell unknown
    pub fn initialize(case: &Case) -> Self {
        let subjects = case.subjects().to_vec();
        let items = case.attribute_items().to_vec();
        let marks = vec![Mark::Unknown; subjects.len() * items.len()];
        Self {
            subjects,
            items,
            marks,
        }
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// (rows, columns)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.subjects.len(), self.items.len())
    }

    /// Resolve labels to a cell index
    pub fn locate(&self, subject: &str, item: &str) -> Option<Cell> {
        let row = self.subjects.iter().position(|s| s == subject)?;
        let col = self.items.iter().position(|i| i == item)?;
        Some(Cell::new(row, col))
    }

    /// Labels of a cell index
    pub fn labels(&self, cell: Cell) -> Option<(&str, &str)> {
        let subject = self.subjects.get(cell.subject)?;
        let item = self.items.get(cell.item)?;
        Some((subject, item))
    }

    fn offset(&self, cell: Cell) -> Option<usize> {
        if cell.subject < self.subjects.len() && cell.item < self.items.len() {
            Some(cell.subject * self.items.len() + cell.item)
        } else {
            None
        }
    }

    /// Mark at a labelled pair, `None` when the pair is not part of the grid
    pub fn get(&self, subject: &str, item: &str) -> Option<Mark> {
        self.locate(subject, item).and_then(|cell| self.mark_at(cell))
    }

    /// Mark at a cell index
    pub fn mark_at(&self, cell: Cell) -> Option<Mark> {
        self.offset(cell).map(|offset| self.marks[offset])
    }

    /// Advance one cell through the toggle cycle and return its new mark
    pub fn toggle(&mut self, subject: &str, item: &str) -> Result<Mark> {
        let cell = self
            .locate(subject, item)
            .ok_or_else(|| CaseError::invalid_coordinate(subject, item))?;
        self.toggle_at(cell)
    }

    /// Index-based variant of [`GridState::toggle`]
    pub fn toggle_at(&mut self, cell: Cell) -> Result<Mark> {
        let offset = self.offset(cell).ok_or_else(|| {
            CaseError::invalid_coordinate(&cell.subject.to_string(), &cell.item.to_string())
        })?;
        let mark = self.marks[offset].next();
        self.marks[offset] = mark;
        debug!(row = cell.subject, col = cell.item, ?mark, "toggled cell");
        Ok(mark)
    }

    /// Overwrite one cell and return the mark it held before
    pub fn set(&mut self, subject: &str, item: &str, mark: Mark) -> Result<Mark> {
        let offset = self
            .locate(subject, item)
            .and_then(|cell| self.offset(cell))
            .ok_or_else(|| CaseError::invalid_coordinate(subject, item))?;
        Ok(std::mem::replace(&mut self.marks[offset], mark))
    }

    /// Every (subject, item, mark) triple, row by row
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, Mark)> + '_ {
        let width = self.items.len();
        self.marks.iter().enumerate().map(move |(offset, mark)| {
            (
                self.subjects[offset / width].as_str(),
                self.items[offset % width].as_str(),
                *mark,
            )
        })
    }

    /// One row of marks
    pub fn row(&self, subject: usize) -> &[Mark] {
        let width = self.items.len();
        let start = (subject * width).min(self.marks.len());
        let end = (start + width).min(self.marks.len());
        &self.marks[start..end]
    }

    /// Number of cells that are not unknown
    pub fn marked_count(&self) -> usize {
        self.marks.iter().filter(|m| !m.is_unknown()).count()
    }

    pub fn cell_count(&self) -> usize {
        self.marks.len()
    }

    /// Clear every mark back to unknown
    pub fn reset(&mut self) {
        self.marks.fill(Mark::Unknown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    fn diamond() -> GridState {
        let catalog = Catalog::builtin().unwrap();
        GridState::initialize(&catalog.find("diamond-heist").unwrap())
    }

    #[test]
    fn test_mark_cycle() {
        assert_eq!(Mark::Unknown.next(), Mark::True);
        assert_eq!(Mark::True.next(), Mark::False);
        assert_eq!(Mark::False.next(), Mark::Unknown);
        assert!(!Mark::Unknown.matches(true));
        assert!(!Mark::Unknown.matches(false));
        assert!(Mark::False.matches(false));
        assert_eq!(Mark::from(None), Mark::Unknown);
    }

    #[test]
    fn test_initialize_all_unknown() {
        let grid = diamond();
        assert_eq!(grid.dimensions(), (3, 6));
        assert_eq!(grid.marked_count(), 0);
        assert!(grid.iter().all(|(_, _, mark)| mark == Mark::Unknown));
        assert_eq!(grid, diamond());
    }

    #[test]
    fn test_toggle_touches_only_one_cell() {
        let mut grid = diamond();
        assert_eq!(grid.toggle("Alice", "Gallery").unwrap(), Mark::True);
        assert_eq!(grid.marked_count(), 1);
        assert_eq!(grid.get("Alice", "Gallery"), Some(Mark::True));
        assert_eq!(grid.get("Bob", "Gallery"), Some(Mark::Unknown));
    }

    #[test]
    fn test_toggle_invalid_coordinate() {
        let mut grid = diamond();
        let err = grid.toggle("Mallory", "Gallery").unwrap_err();
        assert!(matches!(err, CaseError::InvalidCoordinate { .. }));
        assert!(grid.toggle("Alice", "Moon").is_err());
        assert!(grid.toggle_at(Cell::new(0, 99)).is_err());
        assert_eq!(grid.marked_count(), 0);
    }

    #[test]
    fn test_set_returns_previous() {
        let mut grid = diamond();
        assert_eq!(grid.set("Bob", "Keycard", Mark::False).unwrap(), Mark::Unknown);
        assert_eq!(grid.set("Bob", "Keycard", Mark::True).unwrap(), Mark::False);
        assert_eq!(grid.get("Bob", "Keycard"), Some(Mark::True));
    }

    #[test]
    fn test_index_access_and_reset() {
        let mut grid = diamond();
        let cell = grid.locate("Charlie", "Office").unwrap();
        grid.toggle_at(cell).unwrap();
        assert_eq!(grid.labels(cell), Some(("Charlie", "Office")));
        assert_eq!(grid.row(cell.subject)[cell.item], Mark::True);

        grid.reset();
        assert_eq!(grid.marked_count(), 0);
    }
}
