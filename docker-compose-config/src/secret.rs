#[cfg(feature = "schemars")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Merge, Winner};

/// A top-level secret.
///
/// See more: https://docs.docker.com/reference/compose-file/secrets/
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Secret {
	/// The path of the file containing the secret.
	#[serde(skip_serializing_if = "String::is_empty")]
	pub file: String,
}

impl Secret {
	pub fn new(file: impl Into<String>) -> Self {
		Self { file: file.into() }
	}
}

impl_equal!(Secret { file });

impl Merge for Secret {
	fn merge(&mut self, other: &Self, winner: Winner) {
		self.file.merge(&other.file, winner);
	}
}
