//! Fixture builders shared by unit tests

use crate::{
    Alliance, ChargeState, ItemType, MatchRecord, RobotRecord, ScoreGrid, ScoringCell, Slot,
    TeamNumber, WinResult,
};
use chrono::{TimeZone, Utc};

pub fn cell(item: ItemType, slot_id: u8, auto: bool) -> ScoringCell {
    ScoringCell::new(item, Slot::try_from(slot_id).unwrap(), auto)
}

pub fn robot(team: u32, slot: Slot) -> RobotRecord {
    RobotRecord {
        team_number: TeamNumber(team),
        slot,
        auto_mobility: false,
        auto_charge: ChargeState::None,
        end_charge: ChargeState::None,
        notes: String::new(),
    }
}

/// An empty-grid record with the given lineup, recorded as a tie
pub fn sample_record(match_number: u32, alliance: Alliance, teams: [u32; 3]) -> MatchRecord {
    MatchRecord {
        match_number,
        alliance,
        timestamp: Utc.timestamp_opt(1_680_000_000 + match_number as i64 * 600, 0).unwrap(),
        win_result: WinResult::Tie,
        score_grid: ScoreGrid::default(),
        team1: robot(teams[0], Slot::One),
        team2: robot(teams[1], Slot::Two),
        team3: robot(teams[2], Slot::Three),
    }
}

/// Fill `columns` of a row with cones owned by `slot_id`
pub fn fill(record: &mut MatchRecord, row: crate::GridRow, columns: &[usize], slot_id: u8) {
    for &column in columns {
        record.score_grid.row_mut(row)[column] = cell(ItemType::Cone, slot_id, false);
    }
}
