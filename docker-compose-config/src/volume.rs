#[cfg(feature = "schemars")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Merge, Winner, serde_utils::is_false};

/// A top-level named volume.
///
/// See more: https://docs.docker.com/reference/compose-file/volumes/
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Volume {
	/// If set to true, the volume is created outside of the application's lifecycle.
	#[serde(skip_serializing_if = "is_false")]
	pub external: bool,
}

impl_equal!(Volume { external });

impl Merge for Volume {
	fn merge(&mut self, other: &Self, winner: Winner) {
		self.external.merge(&other.external, winner);
	}
}
