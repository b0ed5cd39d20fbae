#[cfg(feature = "schemars")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
	Merge, Winner, merge_set,
	serde_utils::{is_empty_list, is_false},
};

/// A top-level network.
///
/// See more: https://docs.docker.com/reference/compose-file/networks/
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Network {
	/// If set to true, the network is maintained outside of the application's lifecycle.
	#[serde(skip_serializing_if = "is_false")]
	pub external: bool,

	/// The driver used for this network.
	#[serde(skip_serializing_if = "String::is_empty")]
	pub driver: String,

	/// Custom IPAM configuration.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ipam: Option<NetworkIpam>,
}

impl Network {
	pub fn new() -> Self {
		Self {
			ipam: Some(NetworkIpam::new()),
			..Default::default()
		}
	}
}

impl_equal!(Network {
	external,
	driver,
	ipam
});

impl Merge for Network {
	fn merge(&mut self, other: &Self, winner: Winner) {
		self.external.merge(&other.external, winner);
		self.driver.merge(&other.driver, winner);
		self.ipam.merge(&other.ipam, winner);
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct NetworkIpam {
	/// A list of configuration elements, each containing a `subnet`.
	#[serde(skip_serializing_if = "is_empty_list")]
	pub config: Option<Vec<NetworkIpamConfig>>,
}

impl NetworkIpam {
	pub const fn new() -> Self {
		Self {
			config: Some(Vec::new()),
		}
	}
}

impl_equal!(NetworkIpam { config });

impl Merge for NetworkIpam {
	/// The configs form a set: the ones that are not present yet are appended, regardless of the winner.
	fn merge(&mut self, other: &Self, _: Winner) {
		merge_set(&mut self.config, &other.config, |config| {
			config.subnet.is_empty()
		});
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct NetworkIpamConfig {
	/// Subnet in CIDR format that represents a network segment.
	#[serde(skip_serializing_if = "String::is_empty")]
	pub subnet: String,
}

impl NetworkIpamConfig {
	pub fn new(subnet: impl Into<String>) -> Self {
		Self {
			subnet: subnet.into(),
		}
	}
}

impl_equal!(NetworkIpamConfig { subnet });
