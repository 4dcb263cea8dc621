use crate::case::Case;
use crate::catalog::Catalog;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const SECS_PER_DAY: u64 = 86_400;

/// Days since the Unix epoch in UTC
pub fn today() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() / SECS_PER_DAY)
        .unwrap_or(0)
}

/// The case featured on a given day, cycling through the catalog in order
pub fn daily_case(catalog: &Catalog, day: u64) -> Option<Arc<Case>> {
    if catalog.is_empty() {
        return None;
    }
    let index = (day % catalog.len() as u64) as usize;
    catalog.cases().get(index).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_wraps() {
        let catalog = Catalog::builtin().unwrap();
        let first = daily_case(&catalog, 0).unwrap();
        assert_eq!(first.id(), "diamond-heist");
        assert_eq!(daily_case(&catalog, 4).unwrap().id(), "cyber-heist");
        assert_eq!(daily_case(&catalog, 5).unwrap().id(), first.id());
        assert_eq!(
            daily_case(&catalog, 20_000 + 3).unwrap().id(),
            daily_case(&catalog, 3).unwrap().id()
        );
    }

    #[test]
    fn test_daily_empty_catalog() {
        let catalog = Catalog::from_cases(Vec::new()).unwrap();
        assert!(daily_case(&catalog, today()).is_none());
    }

    #[test]
    fn test_today_is_after_2024() {
        // 2024-01-01 is day 19723
        assert!(today() > 19_723);
    }
}
