use std::{io, path::PathBuf};

use thiserror::Error;

/// The kinds of errors that can occur while loading, merging and writing documents.
#[derive(Debug, Error)]
pub enum AppError {
	// Invalid values
	#[error("`{source_arg}` is not a valid path or http(s) url: {reason}")]
	InvalidSource { source_arg: String, reason: String },

	#[error("The options `--existing-win` and `--last-win` cannot be used together")]
	ConflictingPolicies,

	// I/O errors
	#[error("`{path}` is a directory")]
	PathIsDir { path: PathBuf },

	#[error("Could not read the contents of `{path}`: {source}")]
	ReadError { path: PathBuf, source: io::Error },

	#[error("Could not create the dir `{path}`: {source}")]
	DirCreation { path: PathBuf, source: io::Error },

	#[error("Failed to create or write to the file `{path}`: {source}")]
	WriteError { path: PathBuf, source: io::Error },

	// Remote sources
	#[error("The request to `{url}` failed: {source}")]
	HttpRequest { url: String, source: reqwest::Error },

	#[error("The request to `{url}` returned the status {status}")]
	HttpStatus {
		url: String,
		status: reqwest::StatusCode,
	},

	// Serde errors
	#[error("Error while serializing the merged document for `{target}`: {error}")]
	SerializationError { target: String, error: String },

	#[error("Error while deserializing the contents of `{file}`: {error}")]
	DeserializationError { file: String, error: String },
}
