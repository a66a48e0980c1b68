//! Plain-text rendering of statistics for the terminal

use crate::stats::numeric::Distribution;
use crate::stats::{AllianceStats, MatchStatistics, TeamStatistics};
use crate::{GridRow, Slot};
use std::fmt::Write;

fn opt(value: Option<f64>, precision: usize) -> String {
    value.map_or("-".to_string(), |v| format!("{:.*}", precision, v))
}

fn percent(value: Option<f64>) -> String {
    value.map_or("-".to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    }
}

fn alliance_section(out: &mut String, stats: &AllianceStats) {
    let _ = writeln!(
        out,
        "│  {} alliance: {}, {} RP",
        stats.alliance, stats.win_result, stats.ranking_points
    );
    let _ = writeln!(out, "│    Slot  Team   Pieces  Points  Links");
    for slot in Slot::ALL {
        let i = slot.index();
        let _ = writeln!(
            out,
            "│    {:<5} {:<6} {:>6}  {:>6}  {:>5.2}",
            slot,
            stats.teams[i],
            stats.scores_per_team[i],
            stats.points_per_team[i],
            stats.links_per_team[i]
        );
    }
    let _ = writeln!(
        out,
        "│    Links: {:.2}  Coop: {} ({} in coop grid)",
        stats.total_links,
        flag(Some(stats.coop)),
        stats.coop_scores
    );
    let _ = writeln!(
        out,
        "│    Charge: auto {} + end {}  Activation: {}  Sustainability: {}",
        stats.auto_charge_points,
        stats.end_charge_points,
        flag(Some(stats.activation)),
        flag(stats.sustainability)
    );
}

pub fn format_match_statistics(stats: &MatchStatistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "┌─────────────────────────────────────────────────");
    let _ = writeln!(out, "│  Match {}", stats.match_number);
    let _ = writeln!(out, "├─────────────────────────────────────────────────");

    if stats.is_empty() {
        let _ = writeln!(out, "│  No records for this match");
    }
    for section in [&stats.red, &stats.blue].into_iter().flatten() {
        alliance_section(&mut out, section);
    }
    if !stats.is_empty() {
        let _ = writeln!(out, "│  Both alliances cooperated: {}", flag(stats.coop));
    }
    let _ = writeln!(out, "└─────────────────────────────────────────────────");
    out
}

fn distribution_line(label: &str, dist: &Distribution) -> String {
    format!(
        "{:<7} sum {:>6.2}  mean {:>5}  median {:>5}  stdev {:>5}",
        label,
        dist.sum,
        opt(dist.mean, 2),
        opt(dist.median, 2),
        opt(dist.stdev, 2)
    )
}

pub fn format_team_statistics(stats: &TeamStatistics) -> String {
    let mut out = String::new();
    let record = &stats.matches;

    let _ = writeln!(out, "┌─────────────────────────────────────────────────");
    let _ = writeln!(out, "│  Team {}", stats.team_number);
    let _ = writeln!(out, "├─────────────────────────────────────────────────");
    let _ = writeln!(
        out,
        "│  Record:    {}-{}-{} in {} matches ({} win)",
        record.won,
        record.lost,
        record.tied,
        record.number_played,
        percent(record.win_percent)
    );
    let _ = writeln!(
        out,
        "│  Auto:      mobility {}  docked {}  charged {}",
        percent(stats.auto.mobility_rate),
        percent(stats.auto.docked_rate),
        percent(stats.auto.charged_rate)
    );
    let _ = writeln!(
        out,
        "│  End game:  docked {}  charged {}",
        percent(stats.end.docked_rate),
        percent(stats.end.charged_rate)
    );

    for row in GridRow::ALL {
        let row_stats = stats.teleop.row(row);
        let heat: Vec<String> = row_stats.heat_map.iter().map(|c| c.to_string()).collect();
        let _ = writeln!(out, "│  {:<4} heat map [{}]", row.name(), heat.join(" "));
        let _ = writeln!(out, "│       {}", distribution_line("pieces", &row_stats.scores));
        let _ = writeln!(out, "│       {}", distribution_line("links", &row_stats.links));
    }

    if !stats.emojis.is_empty() {
        let _ = writeln!(out, "│  Vibes:     {}", stats.emojis.join(" "));
    }
    for note in &stats.notes {
        let _ = writeln!(out, "│  Note: {}", note);
    }
    let _ = writeln!(out, "└─────────────────────────────────────────────────");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::team_stats::team_statistics;
    use crate::testutil::{fill, sample_record};
    use crate::{Alliance, TeamNumber};

    #[test]
    fn test_format_match() {
        let mut red = sample_record(8, Alliance::Red, [254, 1678, 971]);
        fill(&mut red, GridRow::Top, &[0, 1, 2], 2);

        let text = format_match_statistics(&MatchStatistics::from_records(8, [&red]));
        assert!(text.contains("Match 8"));
        assert!(text.contains("red alliance: tie, 1 RP"));
        assert!(text.contains("Sustainability: unknown"));
        assert!(!text.contains("blue alliance"));

        let empty = format_match_statistics(&MatchStatistics::from_records(9, [&red]));
        assert!(empty.contains("No records"));
    }

    #[test]
    fn test_format_team() {
        let mut record = sample_record(1, Alliance::Blue, [254, 1678, 971]);
        record.team1.notes = "solid 👍".to_string();
        let stats = team_statistics(&[record], TeamNumber(254)).unwrap();

        let text = format_team_statistics(&stats);
        assert!(text.contains("Team 254"));
        assert!(text.contains("0-0-1 in 1 matches (50.0% win)"));
        assert!(text.contains("Vibes:     👍"));
        assert!(text.contains("Note: solid 👍"));
    }
}
