//! Match scouting CLI
//!
//! Imports scouting submissions and reports match and team statistics.

use clap::{Parser, Subcommand};
use scouting::{Config, Result};

#[derive(Parser)]
#[command(name = "scouting")]
#[command(about = "Match scouting statistics for alliance selection", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// List every team seen in stored matches
    Teams,
    /// Show statistics for one match
    Match {
        /// Match number
        number: u32,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Show statistics for one team
    Team {
        /// Team number
        number: u32,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Export every record and statistic as JSON
    Report {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Import JSON submission batches
    Import {
        /// Submission files
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Show database status
    Status,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Import { files } => commands::data_import(&config, &files),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Teams => commands::teams(&config),
        Commands::Match { number, format } => commands::match_stats(&config, number, format),
        Commands::Team { number, format } => commands::team_stats(&config, number, format),
        Commands::Report { output } => commands::report(&config, output),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use scouting::data::{import_file, Database, ImportSummary};
    use scouting::report::{format_match_statistics, format_team_statistics};
    use scouting::stats::StatisticsEngine;
    use scouting::TeamNumber;

    fn engine(config: &Config) -> Result<StatisticsEngine<Database>> {
        Ok(StatisticsEngine::new(Database::open(
            &config.data.database_path,
        )?))
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        if let Some(dir) = std::path::Path::new(&config.data.database_path).parent() {
            std::fs::create_dir_all(dir)?;
            println!("Created {}/ directory", dir.display());
        }

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'scouting data import <FILES>' to load submissions");
        println!("  3. Run 'scouting team <NUMBER>' to review a team");

        Ok(())
    }

    pub fn data_import(config: &Config, files: &[String]) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let mut summary = ImportSummary::default();

        for file in files {
            println!("Importing {}...", file);
            summary.merge(import_file(&db, file)?);
        }

        println!(
            "Inserted {} of {} submitted records",
            summary.inserted, summary.submitted
        );
        if !summary.rejections.is_empty() {
            println!("\nRejected:");
            for rejection in &summary.rejections {
                println!(
                    "  Match {:<4} {:<5} {}",
                    rejection.match_number, rejection.alliance, rejection.reason
                );
            }
        }

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.get_stats()?;

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:     {}", config.data.database_path);
        println!("  Records:  {}", stats.record_count);
        println!("  Teams:    {}", stats.team_count);
        if let (Some(first), Some(last)) = (stats.first_match, stats.last_match) {
            println!("  Matches:  {} to {}", first, last);
        }

        Ok(())
    }

    pub fn teams(config: &Config) -> Result<()> {
        let teams = engine(config)?.list_all_teams()?;
        if teams.is_empty() {
            println!("No teams recorded yet");
            return Ok(());
        }
        for team in teams {
            println!("{}", team);
        }
        Ok(())
    }

    pub fn match_stats(config: &Config, number: u32, format: OutputFormat) -> Result<()> {
        let stats = engine(config)?.match_statistics(number)?;
        match format {
            OutputFormat::Table => print!("{}", format_match_statistics(&stats)),
            OutputFormat::Json => println!("{}", config.to_json(&stats)?),
        }
        Ok(())
    }

    pub fn team_stats(config: &Config, number: u32, format: OutputFormat) -> Result<()> {
        let Some(stats) = engine(config)?.team_statistics(TeamNumber(number))? else {
            println!("Team {} has no recorded matches", number);
            return Ok(());
        };
        match format {
            OutputFormat::Table => print!("{}", format_team_statistics(&stats)),
            OutputFormat::Json => println!("{}", config.to_json(&stats)?),
        }
        Ok(())
    }

    pub fn report(config: &Config, output: Option<String>) -> Result<()> {
        let report = engine(config)?.report()?;
        let json = config.to_json(&report)?;

        match output {
            Some(path) => {
                std::fs::write(&path, json)?;
                println!(
                    "Wrote report for {} records and {} teams to {}",
                    report.matches.len(),
                    report.team_list.len(),
                    path
                );
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}
