//! Typed representations of docker compose documents, with the tools to merge several of them into one.
//!
//! Documents are merged with [`Config::merge`] (or [`Config::merge_all`]) under a [`MergeStrategy`]:
//!
//! - [`MergeStrategy::Additive`] only adds the networks, secrets, services and volumes that are not defined yet.
//! - [`MergeStrategy::ExistingWin`] merges every entity recursively, and keeps the existing values on conflict.
//! - [`MergeStrategy::LastWin`] merges every entity recursively, and lets the later document win conflicts.
//!
//! Sequences are merged as sets. The entries of `environment`, `labels`, `volumes` and `ports` are identified
//! by their key (the variable name, the label name, the destination path and the source binding, respectively),
//! so that a merged service never holds two entries for the same key.

#[macro_use]
mod macros;

use indexmap::IndexMap;
#[cfg(feature = "schemars")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

mod codecs;
mod depends_on;
mod equality;
mod merging_strategies;
mod network;
mod secret;
pub(crate) mod serde_utils;
mod service;
mod volume;

pub use codecs::*;
pub use depends_on::*;
pub use equality::*;
pub use merging_strategies::*;
pub use network::*;
pub use secret::*;
pub use service::*;
pub use volume::*;

/// A docker compose document.
///
/// Top-level entries may be null (such as `volumes: { data: }`), which is why they are optional.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Config {
	/// The version of the compose file format.
	#[serde(skip_serializing_if = "String::is_empty")]
	pub version: String,

	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	pub networks: IndexMap<String, Option<Network>>,

	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	pub secrets: IndexMap<String, Option<Secret>>,

	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	pub services: IndexMap<String, Option<Service>>,

	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	pub volumes: IndexMap<String, Option<Volume>>,
}

impl_equal!(Config {
	version,
	networks,
	secrets,
	services,
	volumes
});

impl Config {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn exists_network(&self, name: &str) -> bool {
		self.networks.contains_key(name)
	}

	pub fn exists_secret(&self, name: &str) -> bool {
		self.secrets.contains_key(name)
	}

	pub fn exists_service(&self, name: &str) -> bool {
		self.services.contains_key(name)
	}

	pub fn exists_volume(&self, name: &str) -> bool {
		self.volumes.contains_key(name)
	}

	/// Merges `other` into this document, using the given strategy. `other` is left untouched.
	pub fn merge(&mut self, other: &Self, strategy: MergeStrategy) {
		debug!(
			%strategy,
			networks = other.networks.len(),
			secrets = other.secrets.len(),
			services = other.services.len(),
			volumes = other.volumes.len(),
			"merging document"
		);

		match strategy.winner() {
			None => self.add_missing_entries(other),
			Some(winner) => Merge::merge(self, other, winner),
		}
	}

	/// Folds the documents, in order, into a new one.
	pub fn merge_all<'a>(
		configs: impl IntoIterator<Item = &'a Self>,
		strategy: MergeStrategy,
	) -> Self {
		configs
			.into_iter()
			.fold(Self::new(), |mut merged, config| {
				merged.merge(config, strategy);
				merged
			})
	}

	fn add_missing_entries(&mut self, other: &Self) {
		add_missing(&mut self.networks, &other.networks);
		add_missing(&mut self.secrets, &other.secrets);
		add_missing(&mut self.services, &other.services);
		add_missing(&mut self.volumes, &other.volumes);
	}
}

fn add_missing<T: Clone>(left: &mut IndexMap<String, T>, right: &IndexMap<String, T>) {
	for (key, value) in right {
		if left.contains_key(key) {
			trace!(key = %key, "skipping existing entry");
		} else {
			left.insert(key.clone(), value.clone());
		}
	}
}

impl Merge for Config {
	fn merge(&mut self, other: &Self, winner: Winner) {
		self.version.merge(&other.version, winner);
		self.networks.merge(&other.networks, winner);
		self.secrets.merge(&other.secrets, winner);

		for (name, service) in &other.services {
			match self.services.get_mut(name) {
				Some(existing) => {
					debug!(service = %name, ?winner, "merging service");
					existing.merge(service, winner);
				}
				None => {
					debug!(service = %name, "adding service");
					self.services.insert(name.clone(), service.clone());
				}
			}
		}

		self.volumes.merge(&other.volumes, winner);
	}
}
