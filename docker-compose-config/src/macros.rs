/// Implements [`Equal`](crate::Equal) for a struct as the conjunction of its fields' equality.
macro_rules! impl_equal {
	($name:ident { $($field:ident),* $(,)? }) => {
		impl $crate::Equal for $name {
			fn equal(&self, other: &Self) -> bool {
				true $(&& $crate::Equal::equal(&self.$field, &other.$field))*
			}
		}
	};
}

/// Implements [`Equal`](crate::Equal) by delegating to [`PartialEq`].
macro_rules! impl_equal_via_eq {
	($($ty:ty),* $(,)?) => {
		$(
			impl $crate::Equal for $ty {
				fn equal(&self, other: &Self) -> bool {
					self == other
				}
			}
		)*
	};
}
