//! SQLite database management for scouting data

use crate::data::store::{check_insert, MatchStore};
use crate::{Alliance, MatchRecord, Result, RobotRecord, ScoreGrid, ScoutingError, WinResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

const MATCH_COLUMNS: &str =
    "match_number, alliance, timestamp, win_result, score_grid, team1, team2, team3";

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

/// A match row as stored, before decoding
struct StoredMatch {
    match_number: u32,
    alliance: String,
    timestamp: String,
    win_result: String,
    score_grid: String,
    teams: [String; 3],
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| {
            ScoutingError::StorageUnavailable(format!("{}: {}", path.display(), e))
        })?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS matches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                match_number INTEGER NOT NULL,
                alliance TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                win_result TEXT NOT NULL,
                score_grid TEXT NOT NULL,
                team1 TEXT NOT NULL,
                team2 TEXT NOT NULL,
                team3 TEXT NOT NULL,
                UNIQUE(match_number, alliance)
            );

            CREATE INDEX IF NOT EXISTS idx_matches_number ON matches(match_number);
            "#,
        )?;
        Ok(())
    }

    // ==================== Match Operations ====================

    /// Get the stored records for one match number (zero, one or two alliances)
    pub fn get_match_records(&self, match_number: u32) -> Result<Vec<MatchRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM matches WHERE match_number = ?1 ORDER BY alliance",
            MATCH_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![match_number], Self::row_to_stored)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::decode).collect()
    }

    fn row_to_stored(row: &rusqlite::Row) -> rusqlite::Result<StoredMatch> {
        Ok(StoredMatch {
            match_number: row.get(0)?,
            alliance: row.get(1)?,
            timestamp: row.get(2)?,
            win_result: row.get(3)?,
            score_grid: row.get(4)?,
            teams: [row.get(5)?, row.get(6)?, row.get(7)?],
        })
    }

    fn decode(stored: StoredMatch) -> Result<MatchRecord> {
        let malformed = |what: &str, detail: String| {
            ScoutingError::MalformedInput(format!(
                "stored match {} has invalid {}: {}",
                stored.match_number, what, detail
            ))
        };

        let alliance = Alliance::from_code(&stored.alliance)
            .ok_or_else(|| malformed("alliance", stored.alliance.clone()))?;
        let win_result = WinResult::from_code(&stored.win_result)
            .ok_or_else(|| malformed("win result", stored.win_result.clone()))?;
        let timestamp = DateTime::parse_from_rfc3339(&stored.timestamp)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| malformed("timestamp", e.to_string()))?;
        let score_grid: ScoreGrid = serde_json::from_str(&stored.score_grid)
            .map_err(|e| malformed("score grid", e.to_string()))?;

        let [team1, team2, team3] = &stored.teams;
        let parse_robot = |json: &str| -> Result<RobotRecord> {
            serde_json::from_str(json).map_err(|e| malformed("robot record", e.to_string()))
        };

        let record = MatchRecord {
            match_number: stored.match_number,
            alliance,
            timestamp,
            win_result,
            score_grid,
            team1: parse_robot(team1)?,
            team2: parse_robot(team2)?,
            team3: parse_robot(team3)?,
        };
        record.validate()?;
        Ok(record)
    }

    fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
        serde_json::to_string(value).map_err(|e| ScoutingError::Parse(e.to_string()))
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let record_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))?;

        let (min_match, max_match): (Option<u32>, Option<u32>) = self.conn.query_row(
            "SELECT MIN(match_number), MAX(match_number) FROM matches",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let team_count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM (
                SELECT json_extract(team1, '$.team_number') FROM matches
                UNION SELECT json_extract(team2, '$.team_number') FROM matches
                UNION SELECT json_extract(team3, '$.team_number') FROM matches
            )
            "#,
            [],
            |row| row.get(0),
        )?;

        Ok(DatabaseStats {
            record_count: record_count as usize,
            team_count: team_count as usize,
            first_match: min_match,
            last_match: max_match,
        })
    }
}

impl MatchStore for Database {
    fn fetch_all_matches(&self) -> Result<Vec<MatchRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM matches ORDER BY match_number, id",
            MATCH_COLUMNS
        ))?;

        let rows = stmt
            .query_map([], Self::row_to_stored)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::decode).collect()
    }

    fn insert_match(&self, record: &MatchRecord) -> Result<()> {
        let existing = self.get_match_records(record.match_number)?;
        check_insert(&existing, record)?;

        self.conn.execute(
            &format!(
                "INSERT INTO matches ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                MATCH_COLUMNS
            ),
            params![
                record.match_number,
                record.alliance.code(),
                record.timestamp.to_rfc3339(),
                record.win_result.code(),
                Self::encode(&record.score_grid)?,
                Self::encode(&record.team1)?,
                Self::encode(&record.team2)?,
                Self::encode(&record.team3)?,
            ],
        )?;
        log::debug!(
            "Stored match {} ({})",
            record.match_number,
            record.alliance
        );
        Ok(())
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub record_count: usize,
    pub team_count: usize,
    pub first_match: Option<u32>,
    pub last_match: Option<u32>,
}
