//! Scouting statistics for a three-robot alliance field game
//!
//! Turns per-alliance match records (a 3x9 scoring grid plus per-robot
//! autonomous and end-game states) into match and team statistics.

pub mod data;
pub mod report;
pub mod stats;

#[cfg(test)]
pub(crate) mod testutil;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Number of columns in every scoring grid row
pub const GRID_COLUMNS: usize = 9;

/// Public identifier of a competing team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamNumber(pub u32);

impl fmt::Display for TeamNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Alliance color. There is no "none" alliance: a record without a color
/// cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    Red,
    Blue,
}

impl Alliance {
    pub const ALL: [Alliance; 2] = [Alliance::Red, Alliance::Blue];

    pub fn opponent(&self) -> Alliance {
        match self {
            Alliance::Red => Alliance::Blue,
            Alliance::Blue => Alliance::Red,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Alliance::Red => "red",
            Alliance::Blue => "blue",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "red" => Some(Alliance::Red),
            "blue" => Some(Alliance::Blue),
            _ => None,
        }
    }
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

/// Outcome of a match from one alliance's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinResult {
    Victory,
    Defeat,
    Tie,
}

impl WinResult {
    /// The result the opposing alliance must have recorded
    pub fn opposite(&self) -> WinResult {
        match self {
            WinResult::Victory => WinResult::Defeat,
            WinResult::Defeat => WinResult::Victory,
            WinResult::Tie => WinResult::Tie,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            WinResult::Victory => "victory",
            WinResult::Defeat => "defeat",
            WinResult::Tie => "tie",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "victory" => Some(WinResult::Victory),
            "defeat" => Some(WinResult::Defeat),
            "tie" => Some(WinResult::Tie),
            _ => None,
        }
    }
}

impl fmt::Display for WinResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

/// Charge station state reached by one robot in one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeState {
    None,
    Docked,
    Charged,
}

/// Game piece occupying a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    None,
    Cone,
    Cube,
}

/// A robot's position within its alliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Slot {
    One,
    Two,
    Three,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::One, Slot::Two, Slot::Three];

    /// Zero-based index into per-slot arrays
    pub fn index(&self) -> usize {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
            Slot::Three => 2,
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;

    fn try_from(id: u8) -> std::result::Result<Self, Self::Error> {
        match id {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            3 => Ok(Slot::Three),
            other => Err(format!("slot id must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        slot.index() as u8 + 1
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&u8::from(*self), f)
    }
}

/// Cell owners are encoded as 0 (unoccupied) or a slot id
mod cell_owner {
    use super::Slot;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        owner: &Option<Slot>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(owner.map(u8::from).unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<Slot>, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(None),
            id => Slot::try_from(id)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// One grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringCell {
    pub item: ItemType,
    #[serde(rename = "team_id", with = "cell_owner")]
    pub owner: Option<Slot>,
    /// Placed during the autonomous period
    pub auto: bool,
}

impl ScoringCell {
    pub const EMPTY: ScoringCell = ScoringCell {
        item: ItemType::None,
        owner: None,
        auto: false,
    };

    pub fn new(item: ItemType, owner: Slot, auto: bool) -> Self {
        ScoringCell {
            item,
            owner: Some(owner),
            auto,
        }
    }

    /// Holds any game piece
    pub fn is_occupied(&self) -> bool {
        self.item != ItemType::None
    }

    /// The slot credited for this cell, if it holds a piece
    pub fn scorer(&self) -> Option<Slot> {
        if self.is_occupied() {
            self.owner
        } else {
            None
        }
    }
}

impl Default for ScoringCell {
    fn default() -> Self {
        ScoringCell::EMPTY
    }
}

/// Named grid row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridRow {
    Top,
    Mid,
    Low,
}

impl GridRow {
    pub const ALL: [GridRow; 3] = [GridRow::Top, GridRow::Mid, GridRow::Low];

    /// Points for a piece placed during autonomous
    pub fn auto_points(&self) -> u32 {
        match self {
            GridRow::Top => 6,
            GridRow::Mid => 4,
            GridRow::Low => 3,
        }
    }

    /// Points for a piece placed during teleop
    pub fn teleop_points(&self) -> u32 {
        match self {
            GridRow::Top => 5,
            GridRow::Mid => 3,
            GridRow::Low => 2,
        }
    }

    pub fn points(&self, auto: bool) -> u32 {
        if auto {
            self.auto_points()
        } else {
            self.teleop_points()
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GridRow::Top => "top",
            GridRow::Mid => "mid",
            GridRow::Low => "low",
        }
    }
}

pub type GridRowCells = [ScoringCell; GRID_COLUMNS];

/// The alliance's 3x9 scoring grid
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreGrid {
    pub top: GridRowCells,
    pub mid: GridRowCells,
    pub low: GridRowCells,
}

impl ScoreGrid {
    pub fn row(&self, row: GridRow) -> &GridRowCells {
        match row {
            GridRow::Top => &self.top,
            GridRow::Mid => &self.mid,
            GridRow::Low => &self.low,
        }
    }

    pub fn row_mut(&mut self, row: GridRow) -> &mut GridRowCells {
        match row {
            GridRow::Top => &mut self.top,
            GridRow::Mid => &mut self.mid,
            GridRow::Low => &mut self.low,
        }
    }
}

/// One robot's performance in one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotRecord {
    pub team_number: TeamNumber,
    pub slot: Slot,
    pub auto_mobility: bool,
    pub auto_charge: ChargeState,
    pub end_charge: ChargeState,
    #[serde(default)]
    pub notes: String,
}

/// One alliance's performance in one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_number: u32,
    pub alliance: Alliance,
    pub timestamp: DateTime<Utc>,
    pub win_result: WinResult,
    pub score_grid: ScoreGrid,
    pub team1: RobotRecord,
    pub team2: RobotRecord,
    pub team3: RobotRecord,
}

impl MatchRecord {
    /// Robot records in slot order
    pub fn robots(&self) -> [&RobotRecord; 3] {
        [&self.team1, &self.team2, &self.team3]
    }

    pub fn robot(&self, slot: Slot) -> &RobotRecord {
        match slot {
            Slot::One => &self.team1,
            Slot::Two => &self.team2,
            Slot::Three => &self.team3,
        }
    }

    pub fn team_numbers(&self) -> [TeamNumber; 3] {
        [
            self.team1.team_number,
            self.team2.team_number,
            self.team3.team_number,
        ]
    }

    /// Slot the given team occupied in this match
    pub fn slot_of(&self, team: TeamNumber) -> Option<Slot> {
        self.robots()
            .into_iter()
            .find(|robot| robot.team_number == team)
            .map(|robot| robot.slot)
    }

    pub fn has_team(&self, team: TeamNumber) -> bool {
        self.slot_of(team).is_some()
    }

    /// Check the record against the data model's invariants
    pub fn validate(&self) -> Result<()> {
        let context = || format!("match {} ({})", self.match_number, self.alliance);

        if self.match_number == 0 {
            return Err(ScoutingError::MalformedInput(format!(
                "{}: match number must be positive",
                context()
            )));
        }

        let mut seen = HashSet::new();
        for (expected, robot) in Slot::ALL.iter().zip(self.robots()) {
            if robot.slot != *expected {
                return Err(ScoutingError::MalformedInput(format!(
                    "{}: team{} record carries slot {}",
                    context(),
                    expected,
                    robot.slot
                )));
            }
            if !seen.insert(robot.team_number) {
                return Err(ScoutingError::MalformedInput(format!(
                    "{}: team {} appears in more than one slot",
                    context(),
                    robot.team_number
                )));
            }
        }

        for row in GridRow::ALL {
            for (column, cell) in self.score_grid.row(row).iter().enumerate() {
                if cell.is_occupied() != cell.owner.is_some() {
                    return Err(ScoutingError::MalformedInput(format!(
                        "{}: {} row column {} has item {:?} with team id {}",
                        context(),
                        row.name(),
                        column,
                        cell.item,
                        cell.owner.map(u8::from).unwrap_or(0)
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum ScoutingError {
    #[error("Match {match_number} ({alliance}) already exists in the database")]
    DuplicateRecord {
        match_number: u32,
        alliance: Alliance,
    },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ScoutingError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                database_path: "data/scouting.db".to_string(),
            },
            report: ReportConfig { pretty: true },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScoutingError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ScoutingError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScoutingError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Serialize a value as JSON honouring the `report.pretty` setting
    pub fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.report.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.map_err(|e| ScoutingError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{cell, sample_record};

    #[test]
    fn test_valid_record_passes() {
        let record = sample_record(1, Alliance::Red, [254, 1678, 971]);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_slot_of_team() {
        let record = sample_record(1, Alliance::Blue, [254, 1678, 971]);
        assert_eq!(record.slot_of(TeamNumber(1678)), Some(Slot::Two));
        assert_eq!(record.slot_of(TeamNumber(118)), None);
    }

    #[test]
    fn test_rejects_occupied_cell_without_owner() {
        let mut record = sample_record(3, Alliance::Red, [254, 1678, 971]);
        record.score_grid.mid[4] = ScoringCell {
            item: ItemType::Cube,
            owner: None,
            auto: false,
        };
        assert!(matches!(
            record.validate(),
            Err(ScoutingError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_rejects_owner_on_empty_cell() {
        let mut record = sample_record(3, Alliance::Red, [254, 1678, 971]);
        record.score_grid.low[0] = ScoringCell {
            item: ItemType::None,
            owner: Some(Slot::One),
            auto: false,
        };
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_team_and_wrong_slot() {
        let mut record = sample_record(2, Alliance::Red, [254, 254, 971]);
        assert!(record.validate().is_err());

        record = sample_record(2, Alliance::Red, [254, 1678, 971]);
        record.team3.slot = Slot::One;
        assert!(record.validate().is_err());

        record = sample_record(0, Alliance::Red, [254, 1678, 971]);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_cell_owner_encoding() {
        let json = serde_json::to_value(cell(ItemType::Cone, 2, true)).unwrap();
        assert_eq!(json["team_id"], 2);
        assert_eq!(json["item"], "cone");

        let empty: ScoringCell =
            serde_json::from_str(r#"{"item":"none","team_id":0,"auto":false}"#).unwrap();
        assert_eq!(empty, ScoringCell::EMPTY);

        let bad = serde_json::from_str::<ScoringCell>(r#"{"item":"cube","team_id":4,"auto":false}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_none_alliance_is_not_decodable() {
        assert!(serde_json::from_str::<Alliance>(r#""none""#).is_err());
        assert_eq!(
            serde_json::from_str::<Alliance>(r#""blue""#).unwrap(),
            Alliance::Blue
        );
    }

    #[test]
    fn test_short_row_is_rejected() {
        let record = sample_record(5, Alliance::Red, [254, 1678, 971]);
        let mut json = serde_json::to_value(&record).unwrap();
        json["score_grid"]["top"]
            .as_array_mut()
            .unwrap()
            .pop();
        assert!(serde_json::from_value::<MatchRecord>(json).is_err());
    }

    #[test]
    fn test_win_result_opposite() {
        assert_eq!(WinResult::Victory.opposite(), WinResult::Defeat);
        assert_eq!(WinResult::Tie.opposite(), WinResult::Tie);
    }

    #[test]
    fn test_row_points() {
        assert_eq!(GridRow::Top.points(true), 6);
        assert_eq!(GridRow::Top.points(false), 5);
        assert_eq!(GridRow::Mid.points(true), 4);
        assert_eq!(GridRow::Low.points(false), 2);
    }
}
