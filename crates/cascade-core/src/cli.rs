//! Command-line interface.
//!
//! Thin plumbing over the library: every command resolves settings, opens
//! the store once, and saves only the tier it changed.

use crate::advisor::{Advisor, AdvisorConfig};
use crate::exit_codes::ExitCode;
use crate::seed::bootstrap;
use crate::store::{FailurePattern, PatternData, PatternStore, Tier};
use crate::tracker::SessionTracker;
use cascade_common::{Error, OutputFormat};
use cascade_config::{resolve_settings, Overrides, Settings};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "cascade",
    version,
    about = "Learn which validation errors follow the fix of another, and warn about them"
)]
pub struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Config file (overrides CASCADE_CONFIG and <project>/.cascade/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the per-project learned pattern files
    #[arg(long, global = true, value_name = "DIR")]
    pub global_root: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record the blocking codes of one validation round
    Observe {
        /// Session identifier correlating consecutive rounds
        #[arg(long)]
        session: String,
        /// Blocking codes; none means the round passed
        #[arg(value_delimiter = ',')]
        codes: Vec<String>,
    },
    /// Warn about cascades likely to follow fixing these codes
    Advise {
        /// Currently blocking codes
        #[arg(value_delimiter = ',')]
        codes: Vec<String>,
        /// Minimum occurrences before a cascade is reported
        #[arg(long)]
        min_count: Option<u32>,
        /// Warnings per code (0 = unlimited)
        #[arg(long)]
        max_per_error: Option<usize>,
        /// Warnings overall (0 = unlimited)
        #[arg(long)]
        max_total: Option<usize>,
    },
    /// List known patterns, strongest first
    Patterns {
        /// Which view to list
        #[arg(long, value_enum, default_value_t = TierArg::Merged)]
        tier: TierArg,
        /// Only patterns seen at least this often
        #[arg(long, default_value_t = 1)]
        min_count: u32,
    },
    /// List tracked sessions
    Sessions,
    /// Forget the previous codes of a session
    ClearSession {
        #[arg(long)]
        session: String,
    },
    /// Evict stale learned patterns and idle sessions
    Cleanup {
        /// Pattern age limit in days (defaults to the configured value)
        #[arg(long)]
        max_age_days: Option<u64>,
        /// Session idle limit in hours (defaults to the configured value)
        #[arg(long)]
        session_max_age_hours: Option<u64>,
    },
    /// Write the built-in cascade catalog if the project has no data yet
    Seed,
    /// Show pattern and session counts
    Stats,
    /// Print the JSON Schema of the pattern data files
    Schema,
}

/// Pattern view selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    Merged,
    Project,
    Global,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let mut overrides = Overrides {
            config_path: self.config.clone(),
            global_root: self.global_root.clone(),
            ..Overrides::default()
        };
        if let Command::Advise {
            min_count,
            max_per_error,
            max_total,
            ..
        } = &self.command
        {
            overrides.min_count = *min_count;
            overrides.max_per_error = *max_per_error;
            overrides.max_total = *max_total;
        }
        overrides
    }
}

/// Execute a parsed command line.
pub fn run(cli: &Cli) -> Result<ExitCode, Error> {
    if let Command::Schema = cli.command {
        let schema = schemars::schema_for!(PatternData);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(ExitCode::Clean);
    }

    let project_root = match &cli.project_root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };
    let settings = resolve_settings(&project_root, &cli.overrides())?;
    let store = PatternStore::open(&project_root, &settings)?;

    if let Command::Seed = cli.command {
        let seeded = bootstrap(&store)?;
        let message = if seeded {
            format!("seeded {}", store.paths().project.display())
        } else {
            "project data already present; nothing written".to_string()
        };
        emit(cli.format, &json!({ "seeded": seeded }), || message)?;
        return Ok(ExitCode::Clean);
    }
    if settings.seed_on_first_use {
        if let Err(err) = bootstrap(&store) {
            warn!(target: "cascade.seed", error = %err, "first-use seeding failed, continuing without seeds");
        }
    }

    match &cli.command {
        Command::Observe { session, codes } => observe(cli.format, &store, &settings, session, codes),
        Command::Advise { codes, .. } => advise(cli.format, &store, &settings, codes),
        Command::Patterns { tier, min_count } => patterns(cli.format, &store, *tier, *min_count),
        Command::Sessions => sessions(cli.format, &store),
        Command::ClearSession { session } => {
            SessionTracker::new(&store).clear_session(session);
            store.save()?;
            emit(cli.format, &json!({ "cleared": session }), || {
                format!("cleared session {session}")
            })?;
            Ok(ExitCode::Clean)
        }
        Command::Cleanup {
            max_age_days,
            session_max_age_hours,
        } => {
            let pattern_age = max_age_days
                .map(cascade_config::days)
                .unwrap_or_else(|| settings.pattern_max_age());
            let session_age = session_max_age_hours
                .map(cascade_config::hours)
                .unwrap_or_else(|| settings.session_max_age());
            let patterns = store.cleanup(pattern_age);
            let sessions = store.cleanup_sessions(session_age);
            store.save()?;
            emit(
                cli.format,
                &json!({ "patterns_removed": patterns, "sessions_removed": sessions }),
                || format!("removed {patterns} patterns, {sessions} sessions"),
            )?;
            Ok(ExitCode::Clean)
        }
        Command::Stats => {
            let stats = store.stats();
            let text = format!(
                "project: {} ({})\nglobal: {} ({})\nmerged: {} ({} seed)\nsessions: {}",
                stats.project_patterns,
                store.paths().project.display(),
                stats.global_patterns,
                store.paths().global.display(),
                stats.merged_patterns,
                stats.seed_patterns,
                stats.active_sessions,
            );
            emit(cli.format, &stats, || text)?;
            Ok(ExitCode::Clean)
        }
        Command::Seed | Command::Schema => Ok(ExitCode::Clean),
    }
}

fn observe(
    format: OutputFormat,
    store: &PatternStore,
    settings: &Settings,
    session: &str,
    codes: &[String],
) -> Result<ExitCode, Error> {
    store.cleanup_sessions(settings.session_max_age());
    let observation = SessionTracker::new(store).observe(session, codes);
    store.save()?;

    emit(format, &observation, || {
        if observation.cleared {
            format!("session {session} passed; history cleared")
        } else {
            observation
                .transitions
                .iter()
                .map(|(from, to)| format!("{from} -> {to}"))
                .collect::<Vec<_>>()
                .join("\n")
        }
    })?;
    Ok(ExitCode::Clean)
}

fn advise(
    format: OutputFormat,
    store: &PatternStore,
    settings: &Settings,
    codes: &[String],
) -> Result<ExitCode, Error> {
    let advisor = Advisor::new(store, AdvisorConfig::from(settings));
    let hints = advisor.hints(codes);
    emit(format, &hints, || {
        hints
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    Ok(if hints.is_empty() {
        ExitCode::Clean
    } else {
        ExitCode::HintsAvailable
    })
}

fn patterns(
    format: OutputFormat,
    store: &PatternStore,
    tier: TierArg,
    min_count: u32,
) -> Result<ExitCode, Error> {
    let map = match tier {
        TierArg::Merged => store.all_patterns(),
        TierArg::Project => store.patterns_from(Tier::Project),
        TierArg::Global => store.patterns_from(Tier::Global),
    };
    let mut list: Vec<FailurePattern> = map
        .into_values()
        .filter(|p| p.count >= min_count)
        .collect();
    list.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key().cmp(&b.key())));

    emit(format, &list, || {
        list.iter()
            .map(|p| {
                let marker = if p.seed { " (seed)" } else { "" };
                format!("{}\t{}{}\tlast seen {}", p.key(), p.count, marker, p.last_seen.to_rfc3339())
            })
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    Ok(ExitCode::Clean)
}

fn sessions(format: OutputFormat, store: &PatternStore) -> Result<ExitCode, Error> {
    let sessions = store.active_sessions();
    emit(format, &sessions, || {
        sessions
            .iter()
            .map(|(id, entry)| format!("{id}\t{}\t{}", entry.codes.join(","), entry.last_seen.to_rfc3339()))
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    Ok(ExitCode::Clean)
}

/// Print `value` as JSON, or the text rendering. Empty text prints nothing.
fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> Result<(), Error>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => {
            let rendered = text();
            if !rendered.is_empty() {
                println!("{rendered}");
            }
        }
    }
    Ok(())
}
