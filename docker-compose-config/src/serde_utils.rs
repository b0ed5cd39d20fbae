use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::{KEY_VALUE_DELIMITER, ServiceNetwork};

/// A scalar yaml value, of any type.
///
/// Floats are read as numbers, so their text is normalized: `1.10` becomes `1.1`.
/// Whole floats keep one decimal, so `1.0` stays `1.0` and is never confused with the integer `1`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SingleValue {
	String(String),
	Bool(bool),
	Int(i64),
	Float(f64),
}

impl Display for SingleValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::String(v) => write!(f, "{v}"),
			Self::Bool(v) => write!(f, "{v}"),
			Self::Int(v) => write!(f, "{v}"),
			Self::Float(v) => {
				let text = v.to_string();

				if v.is_finite() && !text.contains('.') {
					write!(f, "{text}.0")
				} else {
					write!(f, "{text}")
				}
			}
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrMap<T> {
	List(Vec<SingleValue>),
	Map(IndexMap<String, Option<T>>),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) const fn is_false(value: &bool) -> bool {
	!*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) const fn is_zero(value: &u64) -> bool {
	*value == 0
}

#[allow(clippy::ref_option)]
pub(crate) fn is_empty_list<T>(list: &Option<Vec<T>>) -> bool {
	list.as_ref().is_none_or(|list| list.is_empty())
}

#[allow(clippy::ref_option)]
pub(crate) fn is_empty_map<T>(map: &Option<IndexMap<String, T>>) -> bool {
	map.as_ref().is_none_or(|map| map.is_empty())
}

/// Deserializes `environment` or `labels`, which can be either a list of `KEY=VALUE` strings
/// or a map. Map entries are normalized to the list form, and entries with a null value to `KEY`.
pub(crate) fn deserialize_key_value_list<'de, D>(
	deserializer: D,
) -> Result<Option<Vec<String>>, D::Error>
where
	D: Deserializer<'de>,
{
	let Some(data) = Option::<ListOrMap<SingleValue>>::deserialize(deserializer)? else {
		return Ok(None);
	};

	let list: Vec<String> = match data {
		ListOrMap::List(list) => list.iter().map(ToString::to_string).collect(),
		ListOrMap::Map(map) => map
			.into_iter()
			.map(|(key, value)| match value {
				Some(value) => format!("{key}{KEY_VALUE_DELIMITER}{value}"),
				None => key,
			})
			.collect(),
	};

	Ok(Some(list))
}

/// Deserializes a list of scalars as strings. Used for `ports`, where plain numbers are allowed.
pub(crate) fn deserialize_string_list<'de, D>(
	deserializer: D,
) -> Result<Option<Vec<String>>, D::Error>
where
	D: Deserializer<'de>,
{
	let list = Option::<Vec<SingleValue>>::deserialize(deserializer)?;

	Ok(list.map(|list| list.iter().map(ToString::to_string).collect()))
}

/// Deserializes any scalar as a string, such as `cpus: 0.5` or `memory: 512M`.
pub(crate) fn deserialize_stringified<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<SingleValue>::deserialize(deserializer)?;

	Ok(value.map(|v| v.to_string()).unwrap_or_default())
}

/// Deserializes the `networks` of a service, which can be a list of names or a map of settings.
pub(crate) fn deserialize_service_networks<'de, D>(
	deserializer: D,
) -> Result<Option<IndexMap<String, Option<ServiceNetwork>>>, D::Error>
where
	D: Deserializer<'de>,
{
	let Some(data) = Option::<ListOrMap<ServiceNetwork>>::deserialize(deserializer)? else {
		return Ok(None);
	};

	let map: IndexMap<String, Option<ServiceNetwork>> = match data {
		ListOrMap::List(names) => names
			.iter()
			.map(|name| (name.to_string(), None))
			.collect(),
		ListOrMap::Map(map) => map,
	};

	Ok(Some(map))
}
