//! Aggregate reports
//!
//! The full statistics payload for dashboards and exports, plus text
//! formatting for the CLI.

pub mod format;

pub use format::{format_match_statistics, format_team_statistics};

use crate::stats::{
    list_all_teams, match_bounds, MatchBounds, MatchStatistics, TeamStatistics,
    TeamStatisticsComputer,
};
use crate::{MatchRecord, TeamNumber};
use serde::Serialize;
use std::collections::BTreeMap;

/// Widest match range reported with an entry for every number. Wider
/// ranges only report numbers that have records.
pub const MATCH_SPAN_LIMIT: u32 = 10_000;

#[derive(Debug, Clone, Serialize)]
pub struct ReportStats {
    pub teams: Vec<TeamStatistics>,
    /// One entry per match number in bounds, including numbers with no
    /// records, unless the bounds span more than `MATCH_SPAN_LIMIT`
    pub matches: Vec<MatchStatistics>,
}

/// Every record plus every derived statistic, from one snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ScoutingReport {
    pub matches: Vec<MatchRecord>,
    pub team_list: Vec<TeamNumber>,
    pub match_bounds: Option<MatchBounds>,
    pub stats: ReportStats,
}

impl ScoutingReport {
    pub fn build(matches: Vec<MatchRecord>) -> Self {
        let team_list = list_all_teams(&matches);
        let bounds = match_bounds(&matches);

        let mut computer = TeamStatisticsComputer::new();
        computer.process_matches(&matches);

        let match_stats = match bounds {
            Some(b) => match_statistics_in(&matches, b),
            None => Vec::new(),
        };

        log::info!(
            "Built report: {} records, {} teams",
            matches.len(),
            team_list.len()
        );

        ScoutingReport {
            team_list,
            match_bounds: bounds,
            stats: ReportStats {
                teams: computer.all(),
                matches: match_stats,
            },
            matches,
        }
    }
}

fn match_statistics_in(matches: &[MatchRecord], bounds: MatchBounds) -> Vec<MatchStatistics> {
    let mut by_number: BTreeMap<u32, Vec<&MatchRecord>> = BTreeMap::new();
    for record in matches {
        by_number.entry(record.match_number).or_default().push(record);
    }

    if bounds.max - bounds.min >= MATCH_SPAN_LIMIT {
        log::warn!(
            "Match numbers span {} to {}, reporting only recorded matches",
            bounds.min,
            bounds.max
        );
        return by_number
            .into_iter()
            .map(|(number, records)| MatchStatistics::from_records(number, records))
            .collect();
    }

    (bounds.min..=bounds.max)
        .map(|number| {
            let records = by_number.get(&number).map(Vec::as_slice).unwrap_or_default();
            MatchStatistics::from_records(number, records.iter().copied())
        })
        .collect()
}
