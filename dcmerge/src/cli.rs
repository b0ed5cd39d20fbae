use std::{io, path::PathBuf};

use clap::{ArgAction, Parser};
use docker_compose_config::{Config, MergeStrategy};
use tracing::{debug, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use crate::{AppError, Source, load_all, serialize_yaml};

pub async fn main_entrypoint() -> Result<(), AppError> {
	Cli::parse().execute().await
}

#[derive(Parser, Debug, Clone)]
#[command(name = "dcmerge")]
#[command(version, about, long_about = None)]
pub struct Cli {
	/// The documents to merge, in order. Each one can be a local path, a `file://` url or an `http(s)://` url
	#[arg(required = true, value_name = "SOURCE")]
	pub sources: Vec<String>,

	/// Merges recursively, keeping the values that are already defined on conflict
	#[arg(short = 'f', long, conflicts_with = "last_win")]
	pub existing_win: bool,

	/// Merges recursively, letting the later documents override the values that are already defined
	#[arg(short, long)]
	pub last_win: bool,

	/// Writes the merged document to a file instead of stdout. Missing parent directories are created
	#[arg(short, long, value_name = "FILE")]
	pub output_file: Option<PathBuf>,

	/// Increases the verbosity of the logs, which are written to stderr. Can be repeated [default level: warn]
	#[arg(short, long, action = ArgAction::Count)]
	pub verbose: u8,
}

impl Cli {
	/// Without any flag, documents are merged additively.
	pub fn strategy(&self) -> Result<MergeStrategy, AppError> {
		match (self.existing_win, self.last_win) {
			(true, true) => Err(AppError::ConflictingPolicies),
			(true, false) => Ok(MergeStrategy::ExistingWin),
			(false, true) => Ok(MergeStrategy::LastWin),
			(false, false) => Ok(MergeStrategy::Additive),
		}
	}

	pub async fn execute(self) -> Result<(), AppError> {
		init_logging(self.verbose);

		let strategy = self.strategy()?;

		let sources = self
			.sources
			.iter()
			.map(|arg| Source::parse(arg))
			.collect::<Result<Vec<_>, _>>()?;

		let configs = load_all(&sources).await?;

		let merged = Config::merge_all(&configs, strategy);

		info!(%strategy, documents = configs.len(), "merged all documents");

		serialize_yaml(&merged, self.output_file.as_deref())
	}
}

/// Logs go to stderr, since stdout can hold the merged document. `RUST_LOG` takes precedence over `verbosity`.
fn init_logging(verbosity: u8) {
	let default_level = match verbosity {
		0 => LevelFilter::WARN,
		1 => LevelFilter::INFO,
		2 => LevelFilter::DEBUG,
		_ => LevelFilter::TRACE,
	};

	let filter = EnvFilter::builder()
		.with_default_directive(default_level.into())
		.from_env_lossy();

	if let Err(e) = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.try_init()
	{
		debug!("logging is already initialized: {e}");
	}
}
