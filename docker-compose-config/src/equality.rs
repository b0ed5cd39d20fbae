use indexmap::IndexMap;

/// Structural equality used to decide whether an entry is already present in a collection.
///
/// It differs from [`PartialEq`] in how collections are compared: sequences and maps are
/// compared as sets, so the order of their elements is irrelevant.
/// An absent value is only ever equal to another absent value, and never to an empty one.
pub trait Equal {
	fn equal(&self, other: &Self) -> bool;
}

impl_equal_via_eq!(String, bool, u64);

impl<T: Equal> Equal for Option<T> {
	fn equal(&self, other: &Self) -> bool {
		match (self, other) {
			(None, None) => true,
			(Some(left), Some(right)) => left.equal(right),
			_ => false,
		}
	}
}

impl<T: Equal> Equal for Vec<T> {
	fn equal(&self, other: &Self) -> bool {
		equal_slices(self, other)
	}
}

impl<T: Equal> Equal for IndexMap<String, T> {
	fn equal(&self, other: &Self) -> bool {
		equal_maps(self, other)
	}
}

/// Returns true if any element of `haystack` is [`Equal`] to `needle`.
pub fn contains<T: Equal>(haystack: &[T], needle: &T) -> bool {
	haystack.iter().any(|item| item.equal(needle))
}

/// Compares two sequences as sets.
///
/// Every element of each side must be contained in the other. The lengths are compared as well,
/// because containment alone would consider `["A", "A"]` and `["A"]` to be equal.
pub fn equal_slices<T: Equal>(left: &[T], right: &[T]) -> bool {
	left.len() == right.len()
		&& left.iter().all(|item| contains(right, item))
		&& right.iter().all(|item| contains(left, item))
}

/// Compares two maps by bidirectional containment of their key/value pairs.
pub fn equal_maps<T: Equal>(left: &IndexMap<String, T>, right: &IndexMap<String, T>) -> bool {
	let is_subset = |a: &IndexMap<String, T>, b: &IndexMap<String, T>| {
		a.iter()
			.all(|(key, value)| b.get(key).is_some_and(|other| value.equal(other)))
	};

	left.len() == right.len() && is_subset(left, right) && is_subset(right, left)
}
