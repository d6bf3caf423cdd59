// This macro generates a struct which exposes a u32 API for an index type.
// Grammars in this crate are small enough that a single storage size is
// sufficient; the conversions are still checked.

macro_rules! IdxNewtype {
    ($(#[$attr:meta])* $n: ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $n(pub u32);

        impl From<$n> for usize {
            fn from(i: $n) -> Self {
                num_traits::cast(i.0).unwrap()
            }
        }

        impl From<usize> for $n {
            fn from(i: usize) -> Self {
                // Panics if `i` would lose precision when stored as a u32.
                $n(num_traits::cast(i).unwrap())
            }
        }
    }
}

IdxNewtype!(
    /// A type specifically for non-terminal indices.
    NIdx
);
IdxNewtype!(
    /// A type specifically for terminal indices.
    TIdx
);
