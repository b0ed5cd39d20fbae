use std::{
	fs::{File, create_dir_all},
	io::{self, Write},
	path::Path,
};

use serde::Serialize;

use crate::AppError;

/// Serializes `item` as yaml to the given file, or to stdout if no file is given.
pub fn serialize_yaml<T: Serialize>(item: &T, output: Option<&Path>) -> Result<(), AppError> {
	let Some(path) = output else {
		let mut stdout = io::stdout().lock();

		serde_yaml_ng::to_writer(&mut stdout, item).map_err(|e| AppError::SerializationError {
			target: "stdout".to_string(),
			error: e.to_string(),
		})?;

		return stdout.flush().map_err(|e| AppError::SerializationError {
			target: "stdout".to_string(),
			error: e.to_string(),
		});
	};

	create_parent_dirs(path)?;

	let file = File::create(path).map_err(|e| AppError::WriteError {
		path: path.to_path_buf(),
		source: e,
	})?;

	serde_yaml_ng::to_writer(file, item).map_err(|e| AppError::SerializationError {
		target: path.display().to_string(),
		error: e.to_string(),
	})
}

pub(crate) fn create_parent_dirs(path: &Path) -> Result<(), AppError> {
	let Some(dirname) = path.parent() else {
		return Ok(());
	};

	if dirname.as_os_str().is_empty() {
		return Ok(());
	}

	create_dir_all(dirname).map_err(|e| AppError::DirCreation {
		path: dirname.to_path_buf(),
		source: e,
	})
}
