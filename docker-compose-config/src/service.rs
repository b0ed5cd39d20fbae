use indexmap::IndexMap;
#[cfg(feature = "schemars")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
	BindMount, DependsOn, KeyValue, KeyedEntry, Merge, PortMapping, Winner, merge_keyed_set,
	merge_string_set,
	serde_utils::{
		deserialize_key_value_list, deserialize_service_networks, deserialize_string_list,
		deserialize_stringified, is_empty_list, is_empty_map, is_zero,
	},
	upsert_keyed,
};

/// A service of the compose application.
///
/// `environment` and `labels` are stored in the `KEY=VALUE` form, `volumes` in the `SRC:DEST[:PERM]` form,
/// and `ports` in the `[IP:]PORT:[IP:]PORT[/PROTOCOL]` form.
/// The helper methods of this type keep at most one entry per key in these lists.
///
/// See more: https://docs.docker.com/reference/compose-file/services/
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Service {
	/// Additional container capabilities.
	#[serde(skip_serializing_if = "is_empty_list")]
	pub cap_add: Option<Vec<String>>,

	/// Container capabilities to drop.
	#[serde(skip_serializing_if = "is_empty_list")]
	pub cap_drop: Option<Vec<String>>,

	/// Startup and shutdown dependencies between services.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub depends_on: Option<DependsOn>,

	/// Deployment and lifecycle settings.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deploy: Option<ServiceDeploy>,

	/// Environment variables set in the container.
	#[serde(
		skip_serializing_if = "is_empty_list",
		deserialize_with = "deserialize_key_value_list"
	)]
	pub environment: Option<Vec<String>>,

	/// Hostname mappings added to the container's network interface configuration.
	#[serde(skip_serializing_if = "is_empty_list")]
	pub extra_hosts: Option<Vec<String>>,

	/// The image to start the container from.
	#[serde(skip_serializing_if = "String::is_empty")]
	pub image: String,

	/// Metadata added to the container.
	#[serde(
		skip_serializing_if = "is_empty_list",
		deserialize_with = "deserialize_key_value_list"
	)]
	pub labels: Option<Vec<String>>,

	/// The networks that the service is attached to.
	#[serde(
		skip_serializing_if = "is_empty_map",
		deserialize_with = "deserialize_service_networks"
	)]
	pub networks: Option<IndexMap<String, Option<ServiceNetwork>>>,

	/// Port mappings between the host and the container.
	#[serde(
		skip_serializing_if = "is_empty_list",
		deserialize_with = "deserialize_string_list"
	)]
	pub ports: Option<Vec<String>>,

	/// The secrets that the service can access.
	#[serde(skip_serializing_if = "is_empty_list")]
	pub secrets: Option<Vec<String>>,

	/// Overrides the default ulimits of the container.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ulimits: Option<ServiceUlimits>,

	/// Mount host paths or named volumes.
	#[serde(skip_serializing_if = "is_empty_list")]
	pub volumes: Option<Vec<String>>,
}

impl_equal!(Service {
	cap_add,
	cap_drop,
	depends_on,
	deploy,
	environment,
	extra_hosts,
	image,
	labels,
	networks,
	ports,
	secrets,
	ulimits,
	volumes,
});

impl Merge for Service {
	fn merge(&mut self, other: &Self, winner: Winner) {
		merge_string_set(&mut self.cap_add, &other.cap_add);
		merge_string_set(&mut self.cap_drop, &other.cap_drop);
		self.depends_on.merge(&other.depends_on, winner);
		self.deploy.merge(&other.deploy, winner);
		merge_keyed_set::<KeyValue>(&mut self.environment, &other.environment, winner);
		merge_string_set(&mut self.extra_hosts, &other.extra_hosts);
		self.image.merge(&other.image, winner);
		merge_keyed_set::<KeyValue>(&mut self.labels, &other.labels, winner);
		self.networks.merge(&other.networks, winner);
		merge_keyed_set::<PortMapping>(&mut self.ports, &other.ports, winner);
		merge_string_set(&mut self.secrets, &other.secrets);
		self.ulimits.merge(&other.ulimits, winner);
		merge_keyed_set::<BindMount>(&mut self.volumes, &other.volumes, winner);
	}
}

fn parsed<K: KeyedEntry>(list: Option<&Vec<String>>) -> impl Iterator<Item = K> {
	list.into_iter().flatten().map(|entry| K::parse(entry))
}

fn remove_entries<K: KeyedEntry>(list: &mut Option<Vec<String>>, predicate: impl Fn(&K) -> bool) {
	if let Some(list) = list {
		list.retain(|entry| !predicate(&K::parse(entry)));
	}
}

impl Service {
	/// Creates a new service where all the collections are present but empty.
	pub fn new() -> Self {
		Self {
			cap_add: Some(Vec::new()),
			cap_drop: Some(Vec::new()),
			depends_on: None,
			deploy: Some(ServiceDeploy::default()),
			environment: Some(Vec::new()),
			extra_hosts: Some(Vec::new()),
			image: String::new(),
			labels: Some(Vec::new()),
			networks: Some(IndexMap::new()),
			ports: Some(Vec::new()),
			secrets: Some(Vec::new()),
			ulimits: Some(ServiceUlimits::default()),
			volumes: Some(Vec::new()),
		}
	}

	pub fn exists_environment(&self, name: &str) -> bool {
		parsed::<KeyValue>(self.environment.as_ref()).any(|entry| entry.key == name)
	}

	pub fn exists_label(&self, name: &str) -> bool {
		parsed::<KeyValue>(self.labels.as_ref()).any(|entry| entry.key == name)
	}

	/// Checks if the exact port mapping is present.
	pub fn exists_port(&self, port: &str) -> bool {
		self.ports
			.iter()
			.flatten()
			.any(|entry| entry == port)
	}

	pub fn exists_volume(&self, src: &str, dest: &str, perm: Option<&str>) -> bool {
		let volume = BindMount::new(src, dest, perm.map(str::to_string));

		parsed::<BindMount>(self.volumes.as_ref()).any(|entry| entry == volume)
	}

	pub fn exists_destination_volume(&self, dest: &str) -> bool {
		parsed::<BindMount>(self.volumes.as_ref()).any(|entry| entry.destination == dest)
	}

	pub fn exists_source_volume(&self, src: &str) -> bool {
		parsed::<BindMount>(self.volumes.as_ref()).any(|entry| entry.source == src)
	}

	/// Sets an environment variable, replacing any other definition of it.
	pub fn set_environment(&mut self, key: &str, value: &str) {
		upsert_keyed(
			self.environment.get_or_insert_default(),
			&KeyValue::new(key, value),
			Winner::Last,
		);
	}

	/// Sets a label, replacing any other definition of it.
	pub fn set_label(&mut self, key: &str, value: &str) {
		upsert_keyed(
			self.labels.get_or_insert_default(),
			&KeyValue::new(key, value),
			Winner::Last,
		);
	}

	/// Mounts a volume, replacing any other volume mounted at the same destination.
	pub fn set_volume(&mut self, src: &str, dest: &str, perm: Option<&str>) {
		upsert_keyed(
			self.volumes.get_or_insert_default(),
			&BindMount::new(src, dest, perm.map(str::to_string)),
			Winner::Last,
		);
	}

	/// Adds a port mapping, replacing the mappings that bind the same source.
	pub fn set_port(&mut self, port: &str) {
		upsert_keyed(
			self.ports.get_or_insert_default(),
			&PortMapping::parse(port),
			Winner::Last,
		);
	}

	pub fn remove_environment(&mut self, name: &str) {
		remove_entries::<KeyValue>(&mut self.environment, |entry| entry.key == name);
	}

	pub fn remove_label(&mut self, name: &str) {
		remove_entries::<KeyValue>(&mut self.labels, |entry| entry.key == name);
	}

	/// Removes the volumes mounted at `dest`.
	pub fn remove_volume(&mut self, dest: &str) {
		remove_entries::<BindMount>(&mut self.volumes, |entry| entry.destination == dest);
	}

	/// Removes the port mappings whose source (`IP:PORT` or `PORT`) is `src`.
	pub fn remove_port_by_src(&mut self, src: &str) {
		remove_entries::<PortMapping>(&mut self.ports, |entry| {
			entry.is_parsed() && entry.src() == src
		});
	}

	/// Removes the port mappings whose destination (`IP:PORT` or `PORT`) is `dst`.
	pub fn remove_port_by_dst(&mut self, dst: &str) {
		remove_entries::<PortMapping>(&mut self.ports, |entry| {
			entry.is_parsed() && entry.dst() == dst
		});
	}
}

/// The settings of a service for a specific network.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct ServiceNetwork {
	/// Alternative hostnames for the service on this network.
	#[serde(skip_serializing_if = "is_empty_list")]
	pub aliases: Option<Vec<String>>,
}

impl_equal!(ServiceNetwork { aliases });

impl Merge for ServiceNetwork {
	fn merge(&mut self, other: &Self, _: Winner) {
		merge_string_set(&mut self.aliases, &other.aliases);
	}
}

/// See more: https://docs.docker.com/reference/compose-file/deploy/
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct ServiceDeploy {
	/// Physical resource constraints for the container.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub resources: Option<ServiceDeployResources>,
}

impl_equal!(ServiceDeploy { resources });

impl Merge for ServiceDeploy {
	fn merge(&mut self, other: &Self, winner: Winner) {
		self.resources.merge(&other.resources, winner);
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct ServiceDeployResources {
	/// The upper bound of the resources that the container can use.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limits: Option<ServiceDeployResourcesLimits>,

	/// The resources that are reserved for the container.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reservations: Option<ServiceDeployResourcesLimits>,
}

impl_equal!(ServiceDeployResources {
	limits,
	reservations
});

impl Merge for ServiceDeployResources {
	fn merge(&mut self, other: &Self, winner: Winner) {
		self.limits.merge(&other.limits, winner);
		self.reservations.merge(&other.reservations, winner);
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct ServiceDeployResourcesLimits {
	/// The amount of cpus, such as `0.5`.
	#[serde(
		skip_serializing_if = "String::is_empty",
		deserialize_with = "deserialize_stringified"
	)]
	pub cpus: String,

	/// The amount of memory, such as `512M`.
	#[serde(
		skip_serializing_if = "String::is_empty",
		deserialize_with = "deserialize_stringified"
	)]
	pub memory: String,
}

impl_equal!(ServiceDeployResourcesLimits { cpus, memory });

impl Merge for ServiceDeployResourcesLimits {
	fn merge(&mut self, other: &Self, winner: Winner) {
		self.cpus.merge(&other.cpus, winner);
		self.memory.merge(&other.memory, winner);
	}
}

/// See more: https://docs.docker.com/reference/compose-file/services/#ulimits
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct ServiceUlimits {
	#[serde(skip_serializing_if = "is_zero")]
	pub nproc: u64,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub nofile: Option<ServiceUlimitsNoFile>,
}

impl_equal!(ServiceUlimits { nproc, nofile });

impl Merge for ServiceUlimits {
	fn merge(&mut self, other: &Self, winner: Winner) {
		self.nproc.merge(&other.nproc, winner);
		self.nofile.merge(&other.nofile, winner);
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct ServiceUlimitsNoFile {
	#[serde(skip_serializing_if = "is_zero")]
	pub hard: u64,

	#[serde(skip_serializing_if = "is_zero")]
	pub soft: u64,
}

impl_equal!(ServiceUlimitsNoFile { hard, soft });

impl Merge for ServiceUlimitsNoFile {
	fn merge(&mut self, other: &Self, winner: Winner) {
		self.hard.merge(&other.hard, winner);
		self.soft.merge(&other.soft, winner);
	}
}
