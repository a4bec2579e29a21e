//! quiztrack - offline session reports
//!
//! Read-only views over the sessions directory: list, report, export.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

use quiztrack::{
    cli::{Args, Commands, Config, Verbosity},
    report,
    session::{statistics, Session, SessionStore},
};

fn init_logging(verbosity: Verbosity, config: &Config) {
    let level = verbosity
        .log_directive()
        .unwrap_or(config.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(msg) = args.validate() {
        eprintln!("{}: {}", "Error".red(), msg);
        std::process::exit(2);
    }

    let config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    init_logging(args.verbosity(), &config);

    if !config.report.color {
        colored::control::set_override(false);
    }

    let mut persistence = config.persistence();
    if let Some(dir) = &args.sessions_dir {
        persistence.sessions_dir = dir.clone();
    }

    if !persistence.sessions_dir.exists() {
        println!("No sessions directory found. Run the viewer first to create a session.");
        return Ok(());
    }

    let store = SessionStore::new(persistence).context("Failed to open sessions directory")?;
    let verbose = args.verbosity().show_correct_rows() && !config.report.quiet;

    tracing::debug!(dir = %store.sessions_dir().display(), command = ?args.command, "starting");

    match &args.command {
        Some(Commands::List) => list_sessions(&store)?,
        Some(Commands::Show { id, current, export }) => {
            let session = if *current {
                store.load_current()
            } else {
                lookup(&store, id.as_deref().unwrap_or_default())
            };

            match session {
                Some(session) => {
                    print!("{}", report::render_report(&session, verbose));
                    if *export {
                        export_session(&session, None)?;
                    }
                }
                None if *current => println!("No current session found."),
                None => {}
            }
        }
        Some(Commands::Export { target, output }) => {
            let session = if target.trim() == "current" {
                store.load_current()
            } else {
                lookup(&store, target)
            };

            match session {
                Some(session) => export_session(&session, output.as_deref())?,
                None if target.trim() == "current" => println!("No current session found."),
                None => {}
            }
        }
        Some(Commands::All) => {
            for session in store.load_all_archived()? {
                print!("{}", report::render_report(&session, verbose));
                println!();
            }
        }
        None => match store.load_current() {
            Some(session) => print!("{}", report::render_report(&session, verbose)),
            None => list_sessions(&store)?,
        },
    }

    Ok(())
}

fn list_sessions(store: &SessionStore) -> Result<()> {
    let current = store.load_current();
    let archived = store
        .list_archived()
        .context("Failed to read archived sessions")?;
    print!("{}", report::render_listing(current.as_ref(), &archived));
    Ok(())
}

/// Find an archived session, printing the recovery hint on a miss
fn lookup(store: &SessionStore, query: &str) -> Option<Session> {
    let found = store.find_by_id(query);
    if found.is_none() {
        println!("{}", report::render_not_found(query.trim(), &store.recent_ids(5)));
    }
    found
}

fn export_session(session: &Session, output: Option<&Path>) -> Result<()> {
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("session_{}.csv", session.id)));

    let file = File::create(&path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    statistics::export_csv(session, BufWriter::new(file))
        .with_context(|| format!("Failed to export session {}", session.id))?;

    println!("Exported to: {}", path.display());
    Ok(())
}
