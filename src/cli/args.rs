//! Command-line argument parsing for quiztrack
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// quiztrack - Inspect and export quiz evaluation sessions
#[derive(Parser, Debug)]
#[command(name = "quiztrack")]
#[command(version)]
#[command(about = "Analyze saved quiz sessions and generate reports", long_about = None)]
pub struct Args {
    /// Sessions directory (overrides the configured one)
    #[arg(long, env = "QUIZTRACK_SESSIONS_DIR")]
    pub sessions_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less verbose output (hide correct answers, log errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List the live session and all archived sessions
    List,

    /// Show a full report for one session
    Show {
        /// Archived session id (exact or partial)
        #[arg(value_name = "ID")]
        id: Option<String>,

        /// Report the live session instead
        #[arg(short, long)]
        current: bool,

        /// Also export the session to CSV
        #[arg(short, long)]
        export: bool,
    },

    /// Export a session's answers to CSV
    Export {
        /// Archived session id, or "current" for the live session
        #[arg(value_name = "ID")]
        target: String,

        /// Output file (defaults to session_<id>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report every archived session, oldest first
    All,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Check that subcommand arguments are coherent
    pub fn validate(&self) -> Result<(), String> {
        if let Some(Commands::Show { id, current, .. }) = &self.command {
            match (id, current) {
                (None, false) => {
                    return Err("Session id required. Use 'quiztrack show <ID>' or 'quiztrack show --current'.".to_string());
                }
                (Some(_), true) => {
                    return Err("Cannot specify a session id with --current.".to_string());
                }
                _ => {}
            }
        }

        if let Some(Commands::Export { target, .. }) = &self.command {
            if target.trim().is_empty() {
                return Err("Export target must not be empty.".to_string());
            }
        }

        Ok(())
    }
}

impl Verbosity {
    /// Log filter directive, `None` to defer to the configured level
    pub fn log_directive(&self) -> Option<&'static str> {
        match self {
            Verbosity::Quiet => Some("error"),
            Verbosity::Normal => None,
            Verbosity::Verbose => Some("info"),
            Verbosity::VeryVerbose => Some("debug"),
        }
    }

    /// Whether reports list correctly answered rows
    pub fn show_correct_rows(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbosity_quiet() {
        let args = parse(&["quiztrack", "-q", "list"]);
        assert_eq!(args.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        let args = parse(&["quiztrack"]);
        assert_eq!(args.verbosity(), Verbosity::Normal);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_verbosity_verbose() {
        let args = parse(&["quiztrack", "-v", "list"]);
        assert_eq!(args.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_very_verbose() {
        let args = parse(&["quiztrack", "list", "-vv"]);
        assert_eq!(args.verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_show_with_id() {
        let args = parse(&["quiztrack", "show", "20260214", "--export"]);
        assert_eq!(
            args.command,
            Some(Commands::Show {
                id: Some("20260214".to_string()),
                current: false,
                export: true
            })
        );
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_show_requires_target() {
        let args = parse(&["quiztrack", "show"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_show_rejects_both() {
        let args = parse(&["quiztrack", "show", "abc", "--current"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_export_output() {
        let args = parse(&["quiztrack", "export", "current", "-o", "out.csv"]);
        assert_eq!(
            args.command,
            Some(Commands::Export {
                target: "current".to_string(),
                output: Some(PathBuf::from("out.csv"))
            })
        );
    }

    #[test]
    fn test_sessions_dir_flag() {
        let args = parse(&["quiztrack", "--sessions-dir", "/tmp/s", "list"]);
        assert_eq!(args.sessions_dir, Some(PathBuf::from("/tmp/s")));
    }

    #[test]
    fn test_verbosity_methods() {
        assert_eq!(Verbosity::Quiet.log_directive(), Some("error"));
        assert_eq!(Verbosity::Normal.log_directive(), None);
        assert!(!Verbosity::Quiet.show_correct_rows());
        assert!(Verbosity::Verbose.show_correct_rows());
        assert_eq!(Verbosity::VeryVerbose.log_directive(), Some("debug"));
    }
}
