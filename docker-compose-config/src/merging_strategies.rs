use std::fmt::{self, Display};

use indexmap::IndexMap;
use tracing::trace;

use crate::{Equal, KeyedEntry, contains};

/// The policy used to combine several documents into one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeStrategy {
	/// Top-level entries (networks, secrets, services, volumes) are only added if they are not defined yet.
	/// Entries that are already present are never modified.
	#[default]
	Additive,
	/// Merges recursively, but the values that are already present are kept on conflict.
	ExistingWin,
	/// Merges recursively, and the values of the later document replace the existing ones on conflict.
	LastWin,
}

impl MergeStrategy {
	/// The side that wins conflicts, for the recursive strategies.
	pub const fn winner(self) -> Option<Winner> {
		match self {
			Self::Additive => None,
			Self::ExistingWin => Some(Winner::Existing),
			Self::LastWin => Some(Winner::Last),
		}
	}
}

impl Display for MergeStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Additive => "additive",
			Self::ExistingWin => "existing-win",
			Self::LastWin => "last-win",
		};

		f.write_str(name)
	}
}

/// Which side keeps its value when both sides of a recursive merge define it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
	/// The value of the target.
	Existing,
	/// The value of the source.
	Last,
}

/// A recursive merge of a source value into a target value.
///
/// Only `self` is modified. When `self` is absent and `other` is present, `other` is adopted as is.
pub trait Merge {
	fn merge(&mut self, other: &Self, winner: Winner);
}

/// Empty strings, `false` and `0` count as "not set": they never replace a value,
/// and they are always replaced by one.
pub(crate) fn merge_scalar<T: Clone + Default + PartialEq>(left: &mut T, right: &T, winner: Winner) {
	let zero = T::default();

	if *right == zero {
		return;
	}

	if *left == zero || winner == Winner::Last {
		left.clone_from(right);
	}
}

macro_rules! impl_merge_scalar {
	($($ty:ty),*) => {
		$(
			impl Merge for $ty {
				fn merge(&mut self, other: &Self, winner: Winner) {
					merge_scalar(self, other, winner);
				}
			}
		)*
	};
}

impl_merge_scalar!(String, bool, u64);

impl<T: Merge + Clone> Merge for Option<T> {
	fn merge(&mut self, other: &Self, winner: Winner) {
		let Some(other) = other else {
			return;
		};

		match self {
			Some(existing) => existing.merge(other, winner),
			None => *self = Some(other.clone()),
		}
	}
}

impl<T: Merge + Clone> Merge for IndexMap<String, T> {
	fn merge(&mut self, other: &Self, winner: Winner) {
		for (key, value) in other {
			if let Some(existing) = self.get_mut(key) {
				existing.merge(value, winner);
			} else {
				trace!(key = %key, "adding missing entry");
				self.insert(key.clone(), value.clone());
			}
		}
	}
}

/// Appends the elements of `right` that are not already contained in `left`.
///
/// Repeated elements already in `left` are dropped first, keeping the first occurrence.
/// Elements for which `is_blank` returns true are ignored.
/// An absent `left` becomes present if `right` is present.
#[allow(clippy::ref_option)]
pub(crate) fn merge_set<T: Equal + Clone>(
	left: &mut Option<Vec<T>>,
	right: &Option<Vec<T>>,
	is_blank: impl Fn(&T) -> bool,
) {
	if let Some(left) = left {
		dedup_set(left);
	}

	let Some(right) = right else {
		return;
	};

	let left = left.get_or_insert_default();

	for item in right {
		if !is_blank(item) && !contains(left, item) {
			left.push(item.clone());
		}
	}
}

/// [`merge_set`] for plain strings, ignoring empty ones.
#[allow(clippy::ref_option)]
pub(crate) fn merge_string_set(left: &mut Option<Vec<String>>, right: &Option<Vec<String>>) {
	merge_set(left, right, |item| item.is_empty());
}

/// Merges two sequences of entries that are identified by a key (see [`KeyedEntry`]).
///
/// Empty entries are ignored. The result holds at most one entry per key, even when either side
/// contained duplicate keys: the duplicates already in `left` are resolved with `winner` before
/// `right` is folded in.
#[allow(clippy::ref_option)]
pub(crate) fn merge_keyed_set<K: KeyedEntry>(
	left: &mut Option<Vec<String>>,
	right: &Option<Vec<String>>,
	winner: Winner,
) {
	if let Some(left) = left {
		dedup_keyed::<K>(left, winner);
	}

	let Some(right) = right else {
		return;
	};

	let left = left.get_or_insert_default();

	for entry in right.iter().filter(|entry| !entry.is_empty()) {
		upsert_keyed(left, &K::parse(entry), winner);
	}
}

fn dedup_set<T: Equal>(list: &mut Vec<T>) {
	let mut unique: Vec<T> = Vec::with_capacity(list.len());

	for item in list.drain(..) {
		if contains(&unique, &item) {
			trace!("dropping a repeated entry");
		} else {
			unique.push(item);
		}
	}

	*list = unique;
}

/// Keeps one entry per key: the first one with [`Winner::Existing`], the last one with [`Winner::Last`].
/// The kept entries retain their text and their position.
fn dedup_keyed<K: KeyedEntry>(list: &mut Vec<String>, winner: Winner) {
	let parsed: Vec<K> = list.iter().map(|entry| K::parse(entry)).collect();

	let superseded = |index: usize| {
		let entry = &parsed[index];
		let others = match winner {
			Winner::Existing => &parsed[..index],
			Winner::Last => &parsed[index + 1..],
		};

		others.iter().any(|other| other.collides_with(entry))
	};

	let mut index = 0;
	list.retain(|entry| {
		let keep = !superseded(index);
		if !keep {
			trace!(%entry, "dropping a duplicate key");
		}
		index += 1;
		keep
	});
}

/// Inserts a keyed entry in a sequence.
///
/// If an entry with the same key exists, [`Winner::Existing`] leaves the sequence untouched,
/// while [`Winner::Last`] removes all colliding entries and appends the new one.
pub(crate) fn upsert_keyed<K: KeyedEntry>(list: &mut Vec<String>, incoming: &K, winner: Winner) {
	let collides = |existing: &String| K::parse(existing).collides_with(incoming);

	match winner {
		Winner::Existing => {
			if list.iter().any(collides) {
				trace!(entry = %incoming, "keeping the existing entry");
			} else {
				list.push(incoming.to_string());
			}
		}
		Winner::Last => {
			list.retain(|existing| !collides(existing));
			list.push(incoming.to_string());
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::{BindMount, KeyValue, PortMapping};

	fn list(items: &[&str]) -> Option<Vec<String>> {
		Some(items.iter().map(|s| s.to_string()).collect())
	}

	#[test]
	fn scalars() {
		let mut target = "A".to_string();
		merge_scalar(&mut target, &"B".to_string(), Winner::Existing);
		assert_eq!(target, "A");

		merge_scalar(&mut target, &"B".to_string(), Winner::Last);
		assert_eq!(target, "B");

		merge_scalar(&mut target, &String::new(), Winner::Last);
		assert_eq!(target, "B");

		let mut empty = String::new();
		merge_scalar(&mut empty, &"C".to_string(), Winner::Existing);
		assert_eq!(empty, "C");

		let mut external = false;
		merge_scalar(&mut external, &true, Winner::Existing);
		assert!(external);
	}

	#[test]
	fn absent_target_adopts_source() {
		let mut target: Option<String> = None;
		target.merge(&Some("B".to_string()), Winner::Existing);
		assert_eq!(target.as_deref(), Some("B"));

		let mut present = Some("A".to_string());
		present.merge(&None, Winner::Last);
		assert_eq!(present.as_deref(), Some("A"));
	}

	#[test]
	fn string_sets_skip_blanks_and_duplicates() {
		let mut target = list(&["NET_RAW"]);
		merge_string_set(&mut target, &list(&["NET_RAW", "", "SYS_ADMIN"]));
		assert_eq!(target, list(&["NET_RAW", "SYS_ADMIN"]));

		let mut absent = None;
		merge_string_set(&mut absent, &None);
		assert_eq!(absent, None);

		merge_string_set(&mut absent, &list(&[""]));
		assert_eq!(absent, list(&[]));
	}

	#[test]
	fn keyed_sets() {
		let mut existing = list(&["A=1", "B=2"]);
		merge_keyed_set::<KeyValue>(&mut existing, &list(&["A=3", "C=4"]), Winner::Existing);
		assert_eq!(existing, list(&["A=1", "B=2", "C=4"]));

		let mut last = list(&["A=1", "B=2"]);
		merge_keyed_set::<KeyValue>(&mut last, &list(&["A=3", "C=4"]), Winner::Last);
		assert_eq!(last, list(&["B=2", "A=3", "C=4"]));
	}

	#[test]
	fn duplicates_in_the_target_are_resolved_by_the_winner() {
		let mut existing = list(&["A=1", "A=2", "B=1"]);
		merge_keyed_set::<KeyValue>(&mut existing, &list(&["C=1"]), Winner::Existing);
		assert_eq!(existing, list(&["A=1", "B=1", "C=1"]));

		let mut last = list(&["A=1", "B=1", "A=2"]);
		merge_keyed_set::<KeyValue>(&mut last, &list(&["C=1"]), Winner::Last);
		assert_eq!(last, list(&["B=1", "A=2", "C=1"]));

		let mut absent_source = list(&["A=1", "A=2"]);
		merge_keyed_set::<KeyValue>(&mut absent_source, &None, Winner::Last);
		assert_eq!(absent_source, list(&["A=2"]));

		let mut caps = list(&["NET_RAW", "NET_RAW"]);
		merge_string_set(&mut caps, &list(&["SYS_ADMIN"]));
		assert_eq!(caps, list(&["NET_RAW", "SYS_ADMIN"]));
	}

	#[test]
	fn bare_ports_share_a_slot() {
		let mut last = list(&["9000"]);
		merge_keyed_set::<PortMapping>(&mut last, &list(&["9001"]), Winner::Last);
		assert_eq!(last, list(&["9001"]));

		let mut existing = list(&["9000"]);
		merge_keyed_set::<PortMapping>(&mut existing, &list(&["9001"]), Winner::Existing);
		assert_eq!(existing, list(&["9000"]));
	}

	#[test]
	fn last_win_removes_every_colliding_entry() {
		let mut target = list(&["PROXY_HOST=u.example.com", "PROXY_HOST=u.example.de"]);
		merge_keyed_set::<KeyValue>(&mut target, &list(&["PROXY_HOST=u.example.local"]), Winner::Last);

		assert_eq!(target, list(&["PROXY_HOST=u.example.local"]));
	}

	#[test]
	fn absent_keyed_set_is_deduplicated() {
		let mut existing = None;
		merge_keyed_set::<BindMount>(
			&mut existing,
			&list(&["/a:/data", "", "/b:/data"]),
			Winner::Existing,
		);
		assert_eq!(existing, list(&["/a:/data"]));

		let mut last = None;
		merge_keyed_set::<BindMount>(&mut last, &list(&["/a:/data", "/b:/data"]), Winner::Last);
		assert_eq!(last, list(&["/b:/data"]));
	}

	#[test]
	fn ports_use_the_collision_table() {
		let mut target = list(&["0.0.0.0:8080:8080", "0.0.0.0:8443:8443"]);
		merge_keyed_set::<PortMapping>(&mut target, &list(&["8080:80"]), Winner::Last);

		assert_eq!(target, list(&["0.0.0.0:8443:8443", "8080:80"]));
	}

	#[test]
	fn maps_insert_missing_entries_and_recurse() {
		let mut target: IndexMap<String, Option<String>> =
			IndexMap::from([("a".to_string(), Some("1".to_string())), ("b".to_string(), None)]);

		let source = IndexMap::from([
			("a".to_string(), Some("2".to_string())),
			("b".to_string(), Some("3".to_string())),
			("c".to_string(), None),
		]);

		target.merge(&source, Winner::Existing);

		assert_eq!(
			target,
			IndexMap::from([
				("a".to_string(), Some("1".to_string())),
				("b".to_string(), Some("3".to_string())),
				("c".to_string(), None),
			])
		);
	}
}
