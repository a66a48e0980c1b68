//! Per-match alliance statistics
//!
//! Scores, links, charge station activation and ranking points for the
//! alliances recorded under one match number.

use crate::data::MatchStore;
use crate::stats::links::LinkCredit;
use crate::{
    Alliance, ChargeState, GridRow, MatchRecord, Result, RobotRecord, Slot, TeamNumber, WinResult,
};
use serde::Serialize;
use std::ops::RangeInclusive;

/// Grid columns shared between the alliances for the cooperation bonus
pub const COOP_COLUMNS: RangeInclusive<usize> = 3..=5;
/// Pieces in the cooperation columns needed for an alliance to cooperate
pub const COOP_MIN_SCORES: u32 = 3;

pub const AUTO_CHARGED_POINTS: u32 = 12;
pub const AUTO_DOCKED_POINTS: u32 = 8;
pub const END_CHARGED_POINTS: u32 = 10;
pub const END_DOCKED_POINTS: u32 = 6;
/// Charge station points needed for the activation ranking point
pub const ACTIVATION_THRESHOLD: u32 = 26;

/// Links needed for the sustainability ranking point
pub const SUSTAINABILITY_LINKS: u32 = 5;
/// Links needed when both alliances cooperated
pub const COOP_SUSTAINABILITY_LINKS: u32 = 4;

/// One alliance's statistics for one match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllianceStats {
    pub match_number: u32,
    pub alliance: Alliance,
    pub win_result: WinResult,
    /// Team numbers in slot order
    pub teams: [TeamNumber; 3],
    /// Pieces scored per slot
    pub scores_per_team: [u32; 3],
    /// Auto and teleop grid points per slot
    pub points_per_team: [u32; 3],
    /// Fractional link credit per slot
    pub links_per_team: [f64; 3],
    pub total_links: f64,
    /// Pieces in the cooperation columns, any slot
    pub coop_scores: u32,
    pub coop: bool,
    pub auto_charge_points: u32,
    pub end_charge_points: u32,
    pub activation: bool,
    /// `None` when the opposing alliance has no record for this match
    pub sustainability: Option<bool>,
    pub ranking_points: u8,
    #[serde(skip)]
    link_credit: LinkCredit,
}

impl AllianceStats {
    /// Everything that depends on this alliance's record alone.
    /// Sustainability is left unknown until the opponent is considered.
    pub fn from_record(record: &MatchRecord) -> Self {
        let mut scores_per_team = [0u32; 3];
        let mut points_per_team = [0u32; 3];
        let mut coop_scores = 0;
        let mut link_credit = LinkCredit::default();

        for row in GridRow::ALL {
            let cells = record.score_grid.row(row);
            for (column, cell) in cells.iter().enumerate() {
                let Some(slot) = cell.scorer() else {
                    continue;
                };
                scores_per_team[slot.index()] += 1;
                points_per_team[slot.index()] += row.points(cell.auto);
                if COOP_COLUMNS.contains(&column) {
                    coop_scores += 1;
                }
            }
            link_credit.add(&LinkCredit::for_row(cells));
        }

        let auto_charge_points = auto_charge_points(&record.robots());
        let end_charge_points = end_charge_points(&record.robots());
        let activation = auto_charge_points + end_charge_points >= ACTIVATION_THRESHOLD;

        let mut stats = AllianceStats {
            match_number: record.match_number,
            alliance: record.alliance,
            win_result: record.win_result,
            teams: record.team_numbers(),
            scores_per_team,
            points_per_team,
            links_per_team: link_credit.per_slot(),
            total_links: link_credit.total_links(),
            coop_scores,
            coop: coop_scores >= COOP_MIN_SCORES,
            auto_charge_points,
            end_charge_points,
            activation,
            sustainability: None,
            ranking_points: 0,
            link_credit,
        };
        stats.ranking_points = stats.count_ranking_points();
        stats
    }

    /// Settle sustainability now that the opposing alliance's cooperation
    /// is known
    fn apply_sustainability(&mut self, both_cooperated: bool) {
        let threshold = if both_cooperated {
            COOP_SUSTAINABILITY_LINKS
        } else {
            SUSTAINABILITY_LINKS
        };
        self.sustainability = Some(self.link_credit.meets(threshold));
        self.ranking_points = self.count_ranking_points();
    }

    fn count_ranking_points(&self) -> u8 {
        let mut points = 0;
        if self.activation {
            points += 1;
        }
        points += match self.win_result {
            WinResult::Victory => 2,
            WinResult::Tie => 1,
            WinResult::Defeat => 0,
        };
        if self.sustainability == Some(true) {
            points += 1;
        }
        points
    }

    /// Grid points across all slots
    pub fn total_points(&self) -> u32 {
        self.points_per_team.iter().sum()
    }

    pub fn slot_points(&self, slot: Slot) -> u32 {
        self.points_per_team[slot.index()]
    }
}

/// Autonomous charge station points. Any charged robot earns the charged
/// bonus; docking counts only when nobody charged.
pub fn auto_charge_points(robots: &[&RobotRecord]) -> u32 {
    let charged = robots
        .iter()
        .any(|r| r.auto_charge == ChargeState::Charged);
    let docked = robots.iter().any(|r| r.auto_charge == ChargeState::Docked);

    if charged {
        AUTO_CHARGED_POINTS
    } else if docked {
        AUTO_DOCKED_POINTS
    } else {
        0
    }
}

/// End-game charge station points. Each charged robot scores; docked robots
/// score only when no robot charged.
pub fn end_charge_points(robots: &[&RobotRecord]) -> u32 {
    let count = |state: ChargeState| robots.iter().filter(|r| r.end_charge == state).count() as u32;

    let charging = count(ChargeState::Charged);
    let docking = if charging > 0 {
        0
    } else {
        count(ChargeState::Docked)
    };
    charging * END_CHARGED_POINTS + docking * END_DOCKED_POINTS
}

/// Statistics for both alliances of one match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchStatistics {
    pub match_number: u32,
    /// Both alliances cooperated. With one alliance missing this is
    /// `Some(false)` if the recorded alliance did not cooperate, and `None`
    /// if it did or if neither alliance is recorded.
    pub coop: Option<bool>,
    pub red: Option<AllianceStats>,
    pub blue: Option<AllianceStats>,
}

impl MatchStatistics {
    /// Compute from a set of records; records for other match numbers are ignored
    pub fn from_records<'a, I>(match_number: u32, records: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut red = None;
        let mut blue = None;

        for record in records {
            if record.match_number != match_number {
                continue;
            }
            let section = match record.alliance {
                Alliance::Red => &mut red,
                Alliance::Blue => &mut blue,
            };
            if section.is_none() {
                *section = Some(AllianceStats::from_record(record));
            }
        }

        let coop = match (&red, &blue) {
            (Some(r), Some(b)) => Some(r.coop && b.coop),
            (Some(s), None) | (None, Some(s)) if !s.coop => Some(false),
            _ => None,
        };

        if let (Some(r), Some(b)) = (red.as_mut(), blue.as_mut()) {
            let both = r.coop && b.coop;
            r.apply_sustainability(both);
            b.apply_sustainability(both);
        }

        log::debug!(
            "Match {}: red {}, blue {}",
            match_number,
            red.as_ref().map_or("absent".to_string(), |s| format!("{} RP", s.ranking_points)),
            blue.as_ref().map_or("absent".to_string(), |s| format!("{} RP", s.ranking_points)),
        );

        MatchStatistics {
            match_number,
            coop,
            red,
            blue,
        }
    }

    pub fn alliance(&self, alliance: Alliance) -> Option<&AllianceStats> {
        match alliance {
            Alliance::Red => self.red.as_ref(),
            Alliance::Blue => self.blue.as_ref(),
        }
    }

    /// No record exists for either alliance
    pub fn is_empty(&self) -> bool {
        self.red.is_none() && self.blue.is_none()
    }
}

/// Computes match statistics from a store snapshot
pub struct MatchStatisticsCalculator<'a, S: MatchStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: MatchStore + ?Sized> MatchStatisticsCalculator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        MatchStatisticsCalculator { store }
    }

    pub fn compute(&self, match_number: u32) -> Result<MatchStatistics> {
        let matches = self.store.fetch_all_matches()?;
        Ok(MatchStatistics::from_records(match_number, &matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemoryStore;
    use crate::testutil::{cell, fill, sample_record};
    use crate::ItemType;

    fn with_result(mut record: MatchRecord, result: WinResult) -> MatchRecord {
        record.win_result = result;
        record
    }

    /// A record whose rows hold `links` full links (three per full row)
    fn with_links(mut record: MatchRecord, links: usize) -> MatchRecord {
        let mut remaining = links;
        for row in GridRow::ALL {
            let in_row = remaining.min(3);
            let columns: Vec<usize> = (0..in_row * 3).collect();
            fill(&mut record, row, &columns, 1);
            remaining -= in_row;
        }
        record
    }

    #[test]
    fn test_split_link_scenario() {
        let mut record = sample_record(1, Alliance::Red, [254, 1678, 971]);
        record.score_grid.top[0] = cell(ItemType::Cone, 1, false);
        record.score_grid.top[1] = cell(ItemType::Cube, 1, false);
        record.score_grid.top[2] = cell(ItemType::Cone, 2, false);

        let stats = AllianceStats::from_record(&record);
        assert!((stats.links_per_team[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((stats.links_per_team[1] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.links_per_team[2], 0.0);
        assert_eq!(stats.total_links, 1.0);
        assert_eq!(stats.scores_per_team, [2, 1, 0]);
        assert_eq!(stats.points_per_team, [10, 5, 0]);
    }

    #[test]
    fn test_points_use_auto_flag() {
        let mut record = sample_record(1, Alliance::Blue, [254, 1678, 971]);
        record.score_grid.top[8] = cell(ItemType::Cone, 3, true);
        record.score_grid.mid[0] = cell(ItemType::Cube, 3, true);
        record.score_grid.mid[1] = cell(ItemType::Cube, 3, false);
        record.score_grid.low[4] = cell(ItemType::Cube, 2, true);
        record.score_grid.low[5] = cell(ItemType::Cone, 2, false);

        let stats = AllianceStats::from_record(&record);
        assert_eq!(stats.points_per_team, [0, 3 + 2, 6 + 4 + 3]);
        assert_eq!(stats.total_points(), 18);
        assert_eq!(stats.slot_points(Slot::Three), 13);
        assert_eq!(stats.coop_scores, 2);
        assert!(!stats.coop);
    }

    #[test]
    fn test_empty_grid() {
        let mut record = sample_record(2, Alliance::Red, [254, 1678, 971]);
        let stats = AllianceStats::from_record(&record);
        assert_eq!(stats.scores_per_team, [0, 0, 0]);
        assert_eq!(stats.total_links, 0.0);
        assert!(!stats.coop);
        assert!(!stats.activation);

        record.team1.auto_charge = ChargeState::Charged;
        record.team1.end_charge = ChargeState::Charged;
        record.team2.end_charge = ChargeState::Docked;
        record.team3.end_charge = ChargeState::Charged;
        let stats = AllianceStats::from_record(&record);
        assert_eq!(stats.auto_charge_points, 12);
        assert_eq!(stats.end_charge_points, 20);
        assert!(stats.activation);
    }

    #[test]
    fn test_charge_dominance() {
        let mut record = sample_record(3, Alliance::Red, [254, 1678, 971]);
        record.team1.auto_charge = ChargeState::Docked;
        record.team2.auto_charge = ChargeState::Charged;
        assert_eq!(auto_charge_points(&record.robots()), 12);

        record.team2.auto_charge = ChargeState::None;
        assert_eq!(auto_charge_points(&record.robots()), 8);

        record.team1.end_charge = ChargeState::Docked;
        record.team2.end_charge = ChargeState::Docked;
        assert_eq!(end_charge_points(&record.robots()), 12);

        record.team3.end_charge = ChargeState::Charged;
        assert_eq!(end_charge_points(&record.robots()), 10);
    }

    #[test]
    fn test_activation_threshold() {
        let mut record = sample_record(3, Alliance::Red, [254, 1678, 971]);
        // 8 + 3 * 6 = 26
        record.team1.auto_charge = ChargeState::Docked;
        for robot in [&mut record.team1, &mut record.team2, &mut record.team3] {
            robot.end_charge = ChargeState::Docked;
        }
        assert!(AllianceStats::from_record(&record).activation);

        record.team3.end_charge = ChargeState::None;
        assert!(!AllianceStats::from_record(&record).activation);
    }

    #[test]
    fn test_coop_columns() {
        let mut record = sample_record(4, Alliance::Blue, [254, 1678, 971]);
        record.score_grid.top[3] = cell(ItemType::Cone, 1, false);
        record.score_grid.mid[4] = cell(ItemType::Cube, 2, false);
        record.score_grid.low[2] = cell(ItemType::Cube, 3, false);
        assert!(!AllianceStats::from_record(&record).coop);

        record.score_grid.low[5] = cell(ItemType::Cube, 3, false);
        let stats = AllianceStats::from_record(&record);
        assert_eq!(stats.coop_scores, 3);
        assert!(stats.coop);
    }

    #[test]
    fn test_sustainability_threshold_with_coop() {
        let red = with_result(
            with_links(sample_record(5, Alliance::Red, [1, 2, 3]), 5),
            WinResult::Victory,
        );
        let blue = with_result(
            with_links(sample_record(5, Alliance::Blue, [4, 5, 6]), 4),
            WinResult::Defeat,
        );

        let red_record = red;
        let stats = MatchStatistics::from_records(5, [&red_record, &blue]);
        let red = stats.red.as_ref().unwrap();
        let blue = stats.blue.as_ref().unwrap();

        // Full top row puts pieces in columns 3..=5 for both alliances
        assert!(red.coop && blue.coop);
        assert_eq!(stats.coop, Some(true));
        assert_eq!(red.sustainability, Some(true));
        assert_eq!(blue.sustainability, Some(true));
        assert_eq!(red.ranking_points, 3);
        assert_eq!(blue.ranking_points, 1);

        let short = with_result(
            with_links(sample_record(5, Alliance::Blue, [4, 5, 6]), 3),
            WinResult::Defeat,
        );
        let stats = MatchStatistics::from_records(5, [&red_record, &short]);
        assert_eq!(stats.coop, Some(true));
        assert_eq!(stats.blue.as_ref().unwrap().sustainability, Some(false));
    }

    #[test]
    fn test_sustainability_threshold_without_coop() {
        // Links at the grid edges leave the cooperation columns empty
        let edge_links = |alliance, rows: &[GridRow]| {
            let mut record = sample_record(6, alliance, [1, 2, 3]);
            for &row in rows {
                fill(&mut record, row, &[0, 1, 2, 6, 7, 8], 2);
            }
            record
        };
        let mut red = edge_links(Alliance::Red, &[GridRow::Top, GridRow::Mid]);
        let blue = edge_links(Alliance::Blue, &[GridRow::Top]);

        let stats = MatchStatistics::from_records(6, [&red, &blue]);
        assert_eq!(stats.coop, Some(false));
        assert_eq!(stats.red.as_ref().unwrap().total_links, 4.0);
        assert_eq!(stats.red.as_ref().unwrap().sustainability, Some(false));

        fill(&mut red, GridRow::Low, &[0, 1, 2], 3);
        let stats = MatchStatistics::from_records(6, [&red, &blue]);
        assert_eq!(stats.red.as_ref().unwrap().total_links, 5.0);
        assert_eq!(stats.red.as_ref().unwrap().sustainability, Some(true));
        assert_eq!(stats.blue.as_ref().unwrap().sustainability, Some(false));
    }

    #[test]
    fn test_missing_opponent_leaves_sustainability_unknown() {
        let red = with_result(
            with_links(sample_record(7, Alliance::Red, [1, 2, 3]), 9),
            WinResult::Victory,
        );
        let stats = MatchStatistics::from_records(7, [&red]);
        let red_stats = stats.red.as_ref().unwrap();

        assert!(stats.blue.is_none());
        assert_eq!(red_stats.sustainability, None);
        assert_eq!(red_stats.ranking_points, 2);
        assert_eq!(stats.coop, None);
    }

    #[test]
    fn test_missing_opponent_with_failed_coop() {
        let red = sample_record(8, Alliance::Red, [1, 2, 3]);
        let stats = MatchStatistics::from_records(8, [&red]);
        assert_eq!(stats.coop, Some(false));
    }

    #[test]
    fn test_ranking_points_bounds() {
        let mut red = with_result(
            with_links(sample_record(9, Alliance::Red, [1, 2, 3]), 9),
            WinResult::Victory,
        );
        red.team1.auto_charge = ChargeState::Charged;
        for robot in [&mut red.team1, &mut red.team2, &mut red.team3] {
            robot.end_charge = ChargeState::Charged;
        }
        let blue = with_result(sample_record(9, Alliance::Blue, [4, 5, 6]), WinResult::Defeat);

        let stats = MatchStatistics::from_records(9, [&red, &blue]);
        assert_eq!(stats.red.as_ref().unwrap().ranking_points, 4);
        assert_eq!(stats.blue.as_ref().unwrap().ranking_points, 0);

        let tie_red = with_result(red.clone(), WinResult::Tie);
        let tie_blue = with_result(blue, WinResult::Tie);
        let stats = MatchStatistics::from_records(9, [&tie_red, &tie_blue]);
        assert_eq!(stats.red.as_ref().unwrap().ranking_points, 3);
        assert_eq!(stats.blue.as_ref().unwrap().ranking_points, 1);
    }

    #[test]
    fn test_calculator_reads_store() {
        let store = InMemoryStore::new();
        store
            .insert_match(&sample_record(10, Alliance::Blue, [4, 5, 6]))
            .unwrap();

        let calculator = MatchStatisticsCalculator::new(&store);
        let stats = calculator.compute(10).unwrap();
        assert!(stats.red.is_none());
        assert_eq!(stats.alliance(Alliance::Blue).unwrap().teams[0], TeamNumber(4));

        let missing = calculator.compute(11).unwrap();
        assert!(missing.is_empty());
        assert_eq!(missing.coop, None);
    }
}
