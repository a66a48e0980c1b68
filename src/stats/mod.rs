//! Statistics engine
//!
//! Match and team statistics derived from a snapshot of the match store.
//! Every query re-reads the full store; nothing is cached between calls.

pub mod links;
pub mod match_stats;
pub mod notes;
pub mod numeric;
pub mod team_stats;

pub use match_stats::{AllianceStats, MatchStatistics, MatchStatisticsCalculator};
pub use team_stats::{TeamStatistics, TeamStatisticsCalculator, TeamStatisticsComputer};

use crate::data::MatchStore;
use crate::report::ScoutingReport;
use crate::{MatchRecord, Result, TeamNumber};
use serde::Serialize;
use std::collections::BTreeSet;

/// Lowest and highest stored match numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchBounds {
    pub min: u32,
    pub max: u32,
}

/// Distinct team numbers across all records, ascending
pub fn list_all_teams(matches: &[MatchRecord]) -> Vec<TeamNumber> {
    matches
        .iter()
        .flat_map(|m| m.team_numbers())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn match_bounds(matches: &[MatchRecord]) -> Option<MatchBounds> {
    let min = matches.iter().map(|m| m.match_number).min()?;
    let max = matches.iter().map(|m| m.match_number).max()?;
    Some(MatchBounds { min, max })
}

/// Query operations over a match store
pub struct StatisticsEngine<S: MatchStore> {
    store: S,
}

impl<S: MatchStore> StatisticsEngine<S> {
    pub fn new(store: S) -> Self {
        StatisticsEngine { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn list_all_teams(&self) -> Result<Vec<TeamNumber>> {
        Ok(list_all_teams(&self.store.fetch_all_matches()?))
    }

    pub fn match_bounds(&self) -> Result<Option<MatchBounds>> {
        Ok(match_bounds(&self.store.fetch_all_matches()?))
    }

    /// Statistics for one match. Both alliance sections are `None` when
    /// nothing was recorded under this number.
    pub fn match_statistics(&self, match_number: u32) -> Result<MatchStatistics> {
        MatchStatisticsCalculator::new(&self.store).compute(match_number)
    }

    /// Statistics for one team, or `None` for a team that never played
    pub fn team_statistics(&self, team: TeamNumber) -> Result<Option<TeamStatistics>> {
        TeamStatisticsCalculator::new(&self.store).compute(team)
    }

    /// Everything at once, from a single snapshot
    pub fn report(&self) -> Result<ScoutingReport> {
        let matches = self.store.fetch_all_matches()?;
        Ok(ScoutingReport::build(matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemoryStore;
    use crate::testutil::sample_record;
    use crate::Alliance;

    fn engine() -> StatisticsEngine<InMemoryStore> {
        let store = InMemoryStore::with_records(vec![
            sample_record(3, Alliance::Red, [971, 254, 1678]),
            sample_record(3, Alliance::Blue, [118, 148, 1323]),
            sample_record(5, Alliance::Red, [254, 4414, 118]),
        ])
        .unwrap();
        StatisticsEngine::new(store)
    }

    #[test]
    fn test_list_all_teams_sorted_distinct() {
        let teams = engine().list_all_teams().unwrap();
        let numbers: Vec<u32> = teams.iter().map(|t| t.0).collect();
        assert_eq!(numbers, vec![118, 148, 254, 971, 1323, 1678, 4414]);
        assert!(teams.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_store() {
        let engine = StatisticsEngine::new(InMemoryStore::new());
        assert!(engine.list_all_teams().unwrap().is_empty());
        assert_eq!(engine.match_bounds().unwrap(), None);
        assert!(engine.match_statistics(1).unwrap().is_empty());
        assert!(engine.team_statistics(TeamNumber(254)).unwrap().is_none());
    }

    #[test]
    fn test_queries() {
        let engine = engine();
        assert_eq!(
            engine.match_bounds().unwrap(),
            Some(MatchBounds { min: 3, max: 5 })
        );

        let third = engine.match_statistics(3).unwrap();
        assert!(third.red.is_some() && third.blue.is_some());
        assert!(engine.match_statistics(4).unwrap().is_empty());

        let team = engine.team_statistics(TeamNumber(118)).unwrap().unwrap();
        assert_eq!(team.matches.number_played, 2);
        assert!(engine.team_statistics(TeamNumber(7)).unwrap().is_none());
    }

    #[test]
    fn test_reads_see_new_inserts() {
        let engine = engine();
        assert!(engine.team_statistics(TeamNumber(7)).unwrap().is_none());
        engine
            .store()
            .insert_match(&sample_record(6, Alliance::Blue, [7, 8, 9]))
            .unwrap();
        assert!(engine.team_statistics(TeamNumber(7)).unwrap().is_some());
    }
}
