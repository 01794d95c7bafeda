//! Host and worker identifiers.
//!
//! Both are dense indices: `HostId(i)` is slot `i` of the engine's host table
//! and `WorkerId(w)` is worker thread `w`.  Use `.index()` to index tables.

use std::fmt;

/// Declare a `u32` index newtype.  `$label` prefixes the `Display` form,
/// e.g. `host:7`.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident => $label:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Unassigned slot (`u32::MAX`).
            pub const INVALID: $name = $name(u32::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($label, ":{}"), self.0)
                } else {
                    f.write_str(concat!($label, ":-"))
                }
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Slot of a virtual host in the engine's host table.
    pub struct HostId => "host";
}

typed_id! {
    /// A worker thread.  Serial mode runs everything as `WorkerId(0)` on the
    /// calling thread.
    pub struct WorkerId => "worker";
}
