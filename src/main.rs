use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keyed_frame::{FrameConfig, JoinKind, JoinOptions, KeyedFrame, KeyedJoin};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keyframe")]
#[command(about = "Sort, de-duplicate and join tables by their key columns")]
struct Args {
    /// Input table (.csv or .parquet)
    input: PathBuf,

    /// Key columns, comma separated
    #[arg(short, long, value_delimiter = ',')]
    key: Vec<String>,

    /// JSON config file (or set KEYFRAME_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the result as CSV instead of a table
    #[arg(long)]
    csv: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the keyed table
    Show,
    /// Sort by the key, or by --by for this run
    Sort {
        #[arg(long, value_delimiter = ',')]
        by: Vec<String>,
    },
    /// Drop rows whose key repeats, or judged on --by
    Unique {
        #[arg(long, value_delimiter = ',')]
        by: Vec<String>,
    },
    Head {
        #[arg(short)]
        n: Option<usize>,
    },
    Tail {
        #[arg(short)]
        n: Option<usize>,
    },
    /// Join with a second table
    Join {
        other: PathBuf,

        #[arg(long, default_value = "inner")]
        kind: JoinKind,

        /// Join columns; derived from the keys when omitted
        #[arg(long, value_delimiter = ',')]
        on: Vec<String>,

        /// Key columns of the second table; it is joined as a plain table
        /// when omitted
        #[arg(long, value_delimiter = ',')]
        other_key: Vec<String>,
    },
    /// Report duplicate keys and whether rows are in key order
    Check,
}

fn read_table(path: &Path) -> Result<DataFrame> {
    let df = if path.extension().and_then(|e| e.to_str()) == Some("csv") {
        LazyCsvReader::new(path)
            .finish()
            .with_context(|| format!("Failed to scan CSV {}", path.display()))?
            .collect()
            .with_context(|| format!("Failed to collect CSV {}", path.display()))?
    } else {
        LazyFrame::scan_parquet(path, ScanArgsParquet::default())
            .with_context(|| format!("Failed to scan parquet {}", path.display()))?
            .collect()
            .with_context(|| format!("Failed to collect parquet {}", path.display()))?
    };
    Ok(df)
}

fn emit(kf: KeyedFrame, csv: bool) -> Result<()> {
    if csv {
        let mut df = kf.into_inner();
        CsvWriter::new(std::io::stdout()).finish(&mut df)?;
    } else {
        println!("{}", kf);
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => FrameConfig::load(path)?,
        None => FrameConfig::from_env()?,
    };

    let table = read_table(&args.input)?;
    info!(
        "Loaded {} ({} rows x {} columns)",
        args.input.display(),
        table.height(),
        table.width()
    );
    let kf = KeyedFrame::new(table, args.key.clone())?;
    info!("Key: {:?}", kf.key());

    let result = match args.command {
        Command::Show => kf,
        Command::Sort { by } => {
            if by.is_empty() {
                kf.sort(config.sort_options())?
            } else {
                kf.sort_by(&by, config.sort_options())?
            }
        }
        Command::Unique { by } => {
            let by = if by.is_empty() { kf.key().to_vec() } else { by };
            kf.unique_with(&by, config.keep_strategy())?
        }
        Command::Head { n } => kf.head(n.unwrap_or(config.head_rows)),
        Command::Tail { n } => kf.tail(n.unwrap_or(config.head_rows)),
        Command::Join {
            other,
            kind,
            on,
            other_key,
        } => {
            let other_table = read_table(&other)?;
            let mut options = JoinOptions::new(kind);
            if !on.is_empty() {
                options = options.on(on);
            }
            if other_key.is_empty() {
                kf.join_with(&other_table, options)?
            } else {
                let other = KeyedFrame::new(other_table, other_key)?;
                kf.join_with(&other, options)?
            }
        }
        Command::Check => {
            let duplicates = kf.duplicated()?.into_iter().filter(|d| *d).count();
            let sorted = kf.is_sorted(config.sort_options())?;
            println!("key:        [{}]", kf.key().join(", "));
            println!("rows:       {}", kf.height());
            println!("duplicates: {}", duplicates);
            println!("sorted:     {}", sorted);
            return Ok(());
        }
    };

    info!("Result: {} rows, key {:?}", result.height(), result.key());
    emit(result, args.csv)
}
