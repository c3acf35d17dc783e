use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use linref_join::{sink, IntervalJoinEngine, JoinConfig, JoinType, RelationResolver, Table};

/// linref-join - overlap and parent/child joins for road network records
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML file with column names and defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Join two tables on overlapping link positions
    Overlap {
        /// JSON array of left records
        #[arg(long)]
        left: PathBuf,

        /// JSON array of right records
        #[arg(long)]
        right: PathBuf,

        #[arg(long)]
        left_prefix: Option<String>,

        /// Derived from the right table's object type when omitted
        #[arg(long)]
        right_prefix: Option<String>,

        /// inner, left, right or full (defaults to the configured join type)
        #[arg(long)]
        join: Option<String>,

        /// Keep one row per distinct value of this column
        #[arg(long)]
        dedup_on: Option<String>,
    },

    /// Attach parent records to the children referencing them
    Parents {
        /// JSON array of parent records
        #[arg(long)]
        parents: PathBuf,

        /// JSON array of child records with relation fields
        #[arg(long)]
        children: PathBuf,

        #[arg(long)]
        parent_prefix: Option<String>,

        /// Derived from the child table's object type when omitted
        #[arg(long)]
        child_prefix: Option<String>,

        /// Keep child column names unchanged
        #[arg(long)]
        skip_child_prefix: bool,
    },
}

fn read_table(path: &Path) -> anyhow::Result<Table> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Table::from_json_reader(BufReader::new(file))
        .with_context(|| format!("reading records from {}", path.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => JoinConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => JoinConfig::default(),
    };

    let result = match cli.command {
        Command::Overlap {
            left,
            right,
            left_prefix,
            right_prefix,
            join,
            dedup_on,
        } => {
            let join_type = match join {
                Some(s) => s.parse::<JoinType>()?,
                None => config.join_type,
            };
            let joined = IntervalJoinEngine::from_config(&config).join(
                &read_table(&left)?,
                &read_table(&right)?,
                left_prefix.as_deref(),
                right_prefix.as_deref(),
                join_type,
            )?;
            match dedup_on {
                Some(column) => joined.deduplicate_on(&column)?,
                None => joined,
            }
        }
        Command::Parents {
            parents,
            children,
            parent_prefix,
            child_prefix,
            skip_child_prefix,
        } => {
            let (resolved, report) = RelationResolver::from_config(&config)
                .resolve_parents_with_report(
                    &read_table(&parents)?,
                    &read_table(&children)?,
                    parent_prefix.as_deref(),
                    child_prefix.as_deref(),
                    skip_child_prefix,
                )?;
            log::info!(
                "{} rows, {} multiplicity anomalies, {} children without relation",
                resolved.len(),
                report.anomalies.len(),
                report.children_without_relation
            );
            resolved
        }
    };

    match &cli.output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            sink::write_json(&result, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            sink::write_json(&result, &mut writer)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn main() {
    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
