use indexmap::IndexMap;
#[cfg(feature = "schemars")]
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Equal, Merge, Winner};

/// The dependencies of a service.
///
/// It can be defined as a list of service names or as a map of names to their settings.
/// Both shapes are normalized to the map form, where list entries get the default condition
/// (`service_started`). When serialized, the list form is used if every entry has the default settings.
///
/// See more: https://docs.docker.com/reference/compose-file/services/#depends_on
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub struct DependsOn(pub IndexMap<String, ServiceDependsOn>);

impl DependsOn {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn get(&self, name: &str) -> Option<&ServiceDependsOn> {
		self.0.get(name)
	}

	pub fn insert(&mut self, name: impl Into<String>, settings: ServiceDependsOn) {
		self.0.insert(name.into(), settings);
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Whether the dependencies can be written as a plain list of names.
	pub fn is_list(&self) -> bool {
		self.0.values().all(ServiceDependsOn::is_default)
	}
}

impl<S: Into<String>> FromIterator<S> for DependsOn {
	fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
		Self(
			iter.into_iter()
				.map(|name| (name.into(), ServiceDependsOn::default()))
				.collect(),
		)
	}
}

impl Equal for DependsOn {
	fn equal(&self, other: &Self) -> bool {
		self.0.equal(&other.0)
	}
}

impl Merge for DependsOn {
	fn merge(&mut self, other: &Self, winner: Winner) {
		self.0.merge(&other.0, winner);
	}
}

impl Serialize for DependsOn {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		if self.is_list() {
			serializer.collect_seq(self.0.keys())
		} else {
			self.0.serialize(serializer)
		}
	}
}

impl<'de> Deserialize<'de> for DependsOn {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum ListOrMap {
			List(Vec<String>),
			Map(IndexMap<String, ServiceDependsOn>),
		}

		Ok(match ListOrMap::deserialize(deserializer)? {
			ListOrMap::List(names) => names.into_iter().collect(),
			ListOrMap::Map(map) => Self(map),
		})
	}
}

/// The settings for a single dependency.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct ServiceDependsOn {
	/// The condition under which the dependency is considered satisfied.
	pub condition: DependsOnCondition,

	/// When set to true, Compose restarts this service after it updates the dependency service.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub restart: Option<bool>,
}

impl ServiceDependsOn {
	pub const fn new(condition: DependsOnCondition) -> Self {
		Self {
			condition,
			restart: None,
		}
	}

	pub fn is_default(&self) -> bool {
		self.condition == DependsOnCondition::ServiceStarted && self.restart.is_none()
	}
}

impl_equal!(ServiceDependsOn { condition, restart });

impl Merge for ServiceDependsOn {
	fn merge(&mut self, other: &Self, winner: Winner) {
		match winner {
			Winner::Existing => {
				if self.restart.is_none() {
					self.restart = other.restart;
				}
			}
			Winner::Last => self.clone_from(other),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum DependsOnCondition {
	/// The dependency has run to successful completion.
	ServiceCompletedSuccessfully,
	/// The dependency is "healthy", as defined by its healthcheck.
	ServiceHealthy,
	/// The dependency has been started.
	#[default]
	ServiceStarted,
}

impl_equal_via_eq!(DependsOnCondition);
