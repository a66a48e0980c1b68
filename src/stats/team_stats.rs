//! Team statistics computation
//!
//! Aggregate performance for a team across every match it played in,
//! accumulated one match at a time.

use crate::data::MatchStore;
use crate::stats::links::{LinkCredit, LINK_LENGTH};
use crate::stats::list_all_teams;
use crate::stats::notes;
use crate::stats::numeric::{rate, Distribution};
use crate::{
    Alliance, ChargeState, GridRow, GridRowCells, ItemType, MatchRecord, Result, Slot, TeamNumber,
    WinResult, GRID_COLUMNS,
};
use serde::Serialize;
use std::collections::HashMap;

/// A match the team took part in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayedMatch {
    pub match_number: u32,
    pub alliance: Alliance,
    pub win_result: WinResult,
    pub slot: Slot,
}

/// Win/loss record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecordStats {
    pub played: Vec<PlayedMatch>,
    pub number_played: usize,
    pub won: usize,
    pub lost: usize,
    pub tied: usize,
    /// (wins + ties / 2) / played
    pub win_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoStats {
    pub mobility: usize,
    pub mobility_rate: Option<f64>,
    pub docked: usize,
    pub docked_rate: Option<f64>,
    pub charged: usize,
    pub charged_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndStats {
    pub docked: usize,
    pub docked_rate: Option<f64>,
    pub charged: usize,
    pub charged_rate: Option<f64>,
}

/// Pieces placed in one row in one match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItemTotals {
    pub cones: u32,
    pub cubes: u32,
}

impl ItemTotals {
    pub fn total(&self) -> u32 {
        self.cones + self.cubes
    }
}

/// One grid row's history for a team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowStats {
    /// Matches in which the team scored in each column
    pub heat_map: [u32; GRID_COLUMNS],
    /// Per match, in match order
    pub item_totals: Vec<ItemTotals>,
    /// Pieces per match, in match order
    pub totals: Vec<u32>,
    pub scores: Distribution,
    /// Link credit per match, in match order
    pub link_totals: Vec<f64>,
    pub links: Distribution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridStats {
    pub top: RowStats,
    pub mid: RowStats,
    pub low: RowStats,
}

impl GridStats {
    pub fn row(&self, row: GridRow) -> &RowStats {
        match row {
            GridRow::Top => &self.top,
            GridRow::Mid => &self.mid,
            GridRow::Low => &self.low,
        }
    }
}

/// Aggregate statistics for a team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStatistics {
    pub team_number: TeamNumber,
    /// Non-empty notes, in match order
    pub notes: Vec<String>,
    /// First emoji of each note that has one
    pub emojis: Vec<String>,
    pub matches: MatchRecordStats,
    pub auto: AutoStats,
    pub teleop: GridStats,
    pub end: EndStats,
}

#[derive(Debug, Clone, Default)]
struct RowAccumulator {
    heat_map: [u32; GRID_COLUMNS],
    item_totals: Vec<ItemTotals>,
    link_thirds: Vec<u32>,
}

impl RowAccumulator {
    fn update(&mut self, cells: &GridRowCells, slot: Slot) {
        let mut items = ItemTotals::default();
        for (column, cell) in cells.iter().enumerate() {
            if cell.scorer() != Some(slot) {
                continue;
            }
            match cell.item {
                ItemType::Cone => items.cones += 1,
                ItemType::Cube => items.cubes += 1,
                ItemType::None => continue,
            }
            self.heat_map[column] += 1;
        }
        self.item_totals.push(items);
        self.link_thirds.push(LinkCredit::for_row(cells).thirds(slot));
    }

    fn finish(&self) -> RowStats {
        let totals: Vec<u32> = self.item_totals.iter().map(ItemTotals::total).collect();
        let score_values: Vec<f64> = totals.iter().map(|&t| t as f64).collect();
        let link_totals: Vec<f64> = self
            .link_thirds
            .iter()
            .map(|&thirds| thirds as f64 / LINK_LENGTH as f64)
            .collect();

        RowStats {
            heat_map: self.heat_map,
            item_totals: self.item_totals.clone(),
            scores: Distribution::of(&score_values),
            totals,
            links: Distribution::of(&link_totals),
            link_totals,
        }
    }
}

/// Running totals for one team, updated once per match
#[derive(Debug, Clone)]
pub struct TeamAccumulator {
    team: TeamNumber,
    played: Vec<PlayedMatch>,
    wins: usize,
    losses: usize,
    ties: usize,
    mobility: usize,
    auto_docked: usize,
    auto_charged: usize,
    end_docked: usize,
    end_charged: usize,
    rows: [RowAccumulator; 3],
    notes: Vec<String>,
}

impl TeamAccumulator {
    pub fn new(team: TeamNumber) -> Self {
        TeamAccumulator {
            team,
            played: Vec::new(),
            wins: 0,
            losses: 0,
            ties: 0,
            mobility: 0,
            auto_docked: 0,
            auto_charged: 0,
            end_docked: 0,
            end_charged: 0,
            rows: Default::default(),
            notes: Vec::new(),
        }
    }

    pub fn team(&self) -> TeamNumber {
        self.team
    }

    pub fn matches_played(&self) -> usize {
        self.played.len()
    }

    /// Fold one match into the totals. Returns false, leaving the totals
    /// untouched, when the team did not play in this record.
    pub fn update(&mut self, record: &MatchRecord) -> bool {
        let Some(slot) = record.slot_of(self.team) else {
            return false;
        };
        let robot = record.robot(slot);

        self.played.push(PlayedMatch {
            match_number: record.match_number,
            alliance: record.alliance,
            win_result: record.win_result,
            slot,
        });

        match record.win_result {
            WinResult::Victory => self.wins += 1,
            WinResult::Defeat => self.losses += 1,
            WinResult::Tie => self.ties += 1,
        }

        if robot.auto_mobility {
            self.mobility += 1;
        }
        match robot.auto_charge {
            ChargeState::Docked => self.auto_docked += 1,
            ChargeState::Charged => self.auto_charged += 1,
            ChargeState::None => {}
        }
        match robot.end_charge {
            ChargeState::Docked => self.end_docked += 1,
            ChargeState::Charged => self.end_charged += 1,
            ChargeState::None => {}
        }

        for (index, row) in GridRow::ALL.iter().enumerate() {
            self.rows[index].update(record.score_grid.row(*row), slot);
        }

        self.notes.push(robot.notes.clone());
        true
    }

    pub fn finish(&self) -> TeamStatistics {
        let played = self.matches_played();
        let win_points = self.wins as f64 + 0.5 * self.ties as f64;

        TeamStatistics {
            team_number: self.team,
            notes: notes::collect_notes(self.notes.iter().map(String::as_str)),
            emojis: notes::leading_emojis(self.notes.iter().map(String::as_str)),
            matches: MatchRecordStats {
                played: self.played.clone(),
                number_played: played,
                won: self.wins,
                lost: self.losses,
                tied: self.ties,
                win_percent: (played > 0).then(|| win_points / played as f64),
            },
            auto: AutoStats {
                mobility: self.mobility,
                mobility_rate: rate(self.mobility, played),
                docked: self.auto_docked,
                docked_rate: rate(self.auto_docked, played),
                charged: self.auto_charged,
                charged_rate: rate(self.auto_charged, played),
            },
            teleop: GridStats {
                top: self.rows[0].finish(),
                mid: self.rows[1].finish(),
                low: self.rows[2].finish(),
            },
            end: EndStats {
                docked: self.end_docked,
                docked_rate: rate(self.end_docked, played),
                charged: self.end_charged,
                charged_rate: rate(self.end_charged, played),
            },
        }
    }
}

/// Statistics for one team from a set of records, or `None` if the team
/// never played
pub fn team_statistics(matches: &[MatchRecord], team: TeamNumber) -> Option<TeamStatistics> {
    if list_all_teams(matches).binary_search(&team).is_err() {
        return None;
    }

    let mut played: Vec<&MatchRecord> = matches.iter().filter(|m| m.has_team(team)).collect();
    played.sort_by_key(|m| m.match_number);

    let mut accumulator = TeamAccumulator::new(team);
    for record in played {
        accumulator.update(record);
    }
    log::debug!(
        "Team {}: {} matches played",
        team,
        accumulator.matches_played()
    );
    Some(accumulator.finish())
}

/// Computes team statistics from a store snapshot
pub struct TeamStatisticsCalculator<'a, S: MatchStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: MatchStore + ?Sized> TeamStatisticsCalculator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        TeamStatisticsCalculator { store }
    }

    pub fn compute(&self, team: TeamNumber) -> Result<Option<TeamStatistics>> {
        let matches = self.store.fetch_all_matches()?;
        Ok(team_statistics(&matches, team))
    }
}

/// Compute statistics for all teams in one pass over the matches
pub struct TeamStatisticsComputer {
    /// Accumulators by team
    stats: HashMap<TeamNumber, TeamAccumulator>,
}

impl TeamStatisticsComputer {
    pub fn new() -> Self {
        TeamStatisticsComputer {
            stats: HashMap::new(),
        }
    }

    /// Process matches in match number order
    pub fn process_matches(&mut self, matches: &[MatchRecord]) {
        let mut ordered: Vec<&MatchRecord> = matches.iter().collect();
        ordered.sort_by_key(|m| m.match_number);

        for record in ordered {
            for team in record.team_numbers() {
                self.stats
                    .entry(team)
                    .or_insert_with(|| TeamAccumulator::new(team))
                    .update(record);
            }
        }
    }

    /// Get statistics for a team
    pub fn get(&self, team: TeamNumber) -> Option<TeamStatistics> {
        self.stats.get(&team).map(TeamAccumulator::finish)
    }

    /// Statistics for every team, ordered by team number
    pub fn all(&self) -> Vec<TeamStatistics> {
        let mut teams: Vec<&TeamAccumulator> = self.stats.values().collect();
        teams.sort_by_key(|acc| acc.team());
        teams.into_iter().map(TeamAccumulator::finish).collect()
    }
}

impl Default for TeamStatisticsComputer {
    fn default() -> Self {
        Self::new()
    }
}
