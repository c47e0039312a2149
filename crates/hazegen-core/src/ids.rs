//! Index newtypes for the description model.
//!
//! Units, reservations, instructions, and automata live in `Vec`s owned by
//! the checked description or the automaton graphs; these indices are the
//! only handles that cross module boundaries.

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Index of a functional unit in [`CheckedDescription::units`].
    ///
    /// [`CheckedDescription::units`]: crate::check::CheckedDescription::units
    UnitId
);

define_id!(
    /// Index of a named reservation in [`CheckedDescription::reservs`].
    ///
    /// [`CheckedDescription::reservs`]: crate::check::CheckedDescription::reservs
    ReservId
);

define_id!(
    /// Index of an instruction reservation. The synthetic advance-cycle
    /// instruction is always the last index.
    InsnId
);

define_id!(
    /// Index of an automaton (a partition of the unit set).
    AutomatonId
);
