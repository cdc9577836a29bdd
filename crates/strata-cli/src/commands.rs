use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;

use strata_diff::{diff_generations_eq, ElementChange};
use strata_rules::{LockScope, RuleFactory};
use strata_snapshot::{dump, read_generation, SnapshotConfig, SnapshotReader, SnapshotWriter};
use strata_tree::Generation;
use strata_types::PathKey;

use crate::cli::*;
use crate::config::{CliConfig, StressConfig};
use crate::element::{ElementInfo, ElementKind};
use crate::workload::{run_stress, setup_element_tree};

pub fn run_command(cli: Cli, config: CliConfig) -> anyhow::Result<()> {
    match cli.command {
        Command::Build(args) => cmd_build(args, &config),
        Command::Dump(args) => cmd_dump(args, &config),
        Command::Count(args) => cmd_count(args, &config),
        Command::Diff(args) => cmd_diff(args, &config),
        Command::Stress(args) => cmd_stress(args, &config),
        Command::Rules(args) => cmd_rules(args, &config),
    }
}

fn parse_path(text: &str) -> anyhow::Result<PathKey> {
    text.parse()
        .with_context(|| format!("invalid element path {text:?}"))
}

fn load(path: &Path, config: &SnapshotConfig) -> anyhow::Result<Generation<ElementInfo>> {
    let mut reader = SnapshotReader::open(path, config.clone())
        .with_context(|| format!("opening snapshot {}", path.display()))?;
    Ok(read_generation(&mut reader)?)
}

fn cmd_build(args: BuildArgs, config: &CliConfig) -> anyhow::Result<()> {
    let fanout = args.fanout.unwrap_or(config.stress.fanout);
    let tree = Generation::with_root_data(ElementInfo::new(ElementKind::Root));
    setup_element_tree(&tree, fanout)?;
    for path in &args.without {
        tree.delete_element(&parse_path(path)?)?;
    }
    let frozen = tree.immutable();

    let mut writer = SnapshotWriter::create(&args.out)
        .with_context(|| format!("creating snapshot {}", args.out.display()))?;
    let records = writer.write_generation(&frozen)?;
    writer.finish()?;

    println!(
        "{} Wrote {} elements to {}",
        "✓".green().bold(),
        records.to_string().bold(),
        args.out.display()
    );
    Ok(())
}

fn cmd_dump(args: DumpArgs, config: &CliConfig) -> anyhow::Result<()> {
    let mut reader = SnapshotReader::open(&args.file, config.snapshot.clone())
        .with_context(|| format!("opening snapshot {}", args.file.display()))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let lines = dump::<ElementInfo, _, _>(&mut reader, &mut out)?;
    writeln!(out, "{}", format!("{lines} records").dimmed())?;
    Ok(())
}

fn cmd_count(args: CountArgs, config: &CliConfig) -> anyhow::Result<()> {
    let tree = load(&args.file, &config.snapshot)?;
    let start = parse_path(&args.start)?;
    if !tree.includes(&start) {
        bail!("{start} does not exist in {}", args.file.display());
    }
    let visited = tree.iterate(&start, |_: &PathKey, _: &ElementInfo| true);
    println!("{} elements under {}", visited.to_string().bold(), start.to_string().cyan());
    Ok(())
}

fn cmd_diff(args: DiffArgs, config: &CliConfig) -> anyhow::Result<()> {
    let old = load(&args.old, &config.snapshot)?;
    let new = load(&args.new, &config.snapshot)?;
    let start = parse_path(&args.start)?;
    let delta = diff_generations_eq(&old, &new, &start)?;

    if delta.is_empty() {
        println!("No changes.");
        return Ok(());
    }
    for change in &delta.changes {
        match change {
            ElementChange::Added { path } => println!("{} {path}", "+".green()),
            ElementChange::Removed { path } => println!("{} {path}", "-".red()),
            ElementChange::Changed { path } => println!("{} {path}", "~".yellow()),
        }
    }
    println!(
        "{} added, {} removed, {} changed",
        delta.added().len().to_string().green(),
        delta.removed().len().to_string().red(),
        delta.changed().len().to_string().yellow()
    );
    Ok(())
}

fn cmd_stress(args: StressArgs, config: &CliConfig) -> anyhow::Result<()> {
    let stress = StressConfig {
        fanout: args.fanout.unwrap_or(config.stress.fanout),
        reader_iterations: args.reader_iterations.unwrap_or(config.stress.reader_iterations),
        writer_iterations: args.writer_iterations.unwrap_or(config.stress.writer_iterations),
    };
    let report = run_stress(&stress)?;

    println!("{} Stress run finished in {:.2?}", "✓".green().bold(), report.elapsed);
    println!(
        "  Reader: {} walks, {}..={} elements each, {} total",
        report.reader_iterations,
        report.min_visited,
        report.max_visited,
        report.total_visited
    );
    println!("  Writer: {} rebuilds", report.writer_iterations);
    println!("  Final tree: {} elements", report.final_count.to_string().bold());
    Ok(())
}

fn cmd_rules(args: RulesArgs, config: &CliConfig) -> anyhow::Result<()> {
    let rules = RuleFactory::new(config.rules.clone());
    let path = args.path.as_deref().map(parse_path).transpose()?;
    let destination = args.destination.as_deref().map(parse_path).transpose()?;

    let require = |path: Option<&PathKey>, what: &str| -> anyhow::Result<PathKey> {
        match path {
            Some(path) => Ok(path.clone()),
            None => bail!("{:?} needs a {what} path", args.operation),
        }
    };

    let scope: Option<LockScope> = match args.operation {
        RuleOperation::Build => Some(rules.build_rule()),
        RuleOperation::Create => Some(rules.create_rule(&require(path.as_ref(), "target")?)),
        RuleOperation::Delete => Some(rules.delete_rule(&require(path.as_ref(), "target")?)),
        RuleOperation::Refresh => Some(rules.refresh_rule(&require(path.as_ref(), "target")?)),
        RuleOperation::Modify => Some(rules.modify_rule(&require(path.as_ref(), "target")?)),
        RuleOperation::Marker => rules.marker_rule(&require(path.as_ref(), "target")?),
        RuleOperation::Copy => Some(rules.copy_rule(
            &require(path.as_ref(), "source")?,
            &require(destination.as_ref(), "destination")?,
        )),
        RuleOperation::Move => Some(rules.move_rule(
            &require(path.as_ref(), "source")?,
            &require(destination.as_ref(), "destination")?,
        )),
    };

    match scope {
        Some(scope) => println!("{}", scope.to_string().cyan()),
        None => println!("{}", "no lock needed".dimmed()),
    }
    Ok(())
}
