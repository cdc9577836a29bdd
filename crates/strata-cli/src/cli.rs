use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "strata",
    about = "Versioned element trees: build, inspect, compare, and stress",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a sample tree and write it as a snapshot
    Build(BuildArgs),
    /// Print every record of a snapshot
    Dump(DumpArgs),
    /// Count the elements reachable from a path
    Count(CountArgs),
    /// Show added, removed, and changed elements between two snapshots
    Diff(DiffArgs),
    /// Run concurrent readers against a writer
    Stress(StressArgs),
    /// Show the lock scope an operation needs
    Rules(RulesArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    #[arg(long)]
    pub fanout: Option<usize>,
    #[arg(short, long)]
    pub out: PathBuf,
    /// Elements to delete before writing
    #[arg(long)]
    pub without: Vec<String>,
}

#[derive(Args)]
pub struct DumpArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct CountArgs {
    pub file: PathBuf,
    #[arg(long, default_value = "/")]
    pub start: String,
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    #[arg(long, default_value = "/")]
    pub start: String,
}

#[derive(Args)]
pub struct StressArgs {
    #[arg(long)]
    pub fanout: Option<usize>,
    #[arg(long)]
    pub reader_iterations: Option<usize>,
    #[arg(long)]
    pub writer_iterations: Option<usize>,
}

#[derive(Args)]
pub struct RulesArgs {
    pub operation: RuleOperation,
    pub path: Option<String>,
    pub destination: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum RuleOperation {
    Build,
    Create,
    Delete,
    Refresh,
    Copy,
    Modify,
    Move,
    Marker,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_build() {
        let cli = Cli::try_parse_from([
            "strata", "build", "--fanout", "4", "--out", "t.snap", "--without", "/sol/proj0",
        ])
        .unwrap();
        if let Command::Build(args) = cli.command {
            assert_eq!(args.fanout, Some(4));
            assert_eq!(args.out, PathBuf::from("t.snap"));
            assert_eq!(args.without, vec!["/sol/proj0"]);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_count_default_start() {
        let cli = Cli::try_parse_from(["strata", "count", "t.snap"]).unwrap();
        if let Command::Count(args) = cli.command {
            assert_eq!(args.start, "/");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_stress_overrides() {
        let cli = Cli::try_parse_from([
            "strata", "stress", "--reader-iterations", "10", "--writer-iterations", "2",
        ])
        .unwrap();
        if let Command::Stress(args) = cli.command {
            assert_eq!(args.fanout, None);
            assert_eq!(args.reader_iterations, Some(10));
            assert_eq!(args.writer_iterations, Some(2));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_rules_move() {
        let cli = Cli::try_parse_from(["strata", "rules", "move", "/p/a", "/q/b"]).unwrap();
        if let Command::Rules(args) = cli.command {
            assert!(matches!(args.operation, RuleOperation::Move));
            assert_eq!(args.destination.as_deref(), Some("/q/b"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from(["strata", "dump", "x", "-v", "--config", "c.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }
}
