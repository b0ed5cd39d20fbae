#![allow(clippy::result_large_err)]

use clap::{CommandFactory, error::ErrorKind};
use dcmerge::{AppError, cli::Cli};

#[tokio::main]
async fn main() {
	match dcmerge::cli::main_entrypoint().await {
		Ok(_) => {}
		Err(e) => {
			let kind = match e {
				AppError::ConflictingPolicies => ErrorKind::ArgumentConflict,
				AppError::InvalidSource { .. } => ErrorKind::InvalidValue,
				_ => ErrorKind::Io,
			};

			let mut cmd = Cli::command();
			cmd.error(kind, e).exit();
		}
	}
}
