//! Component trait and the component bitset

use std::fmt;

/// Marker trait for components
pub trait Component: 'static + Send + Sync {}

/// Maximum number of distinct component types a single world can register
pub const MAX_COMPONENT_TYPES: usize = 64;

/// Bitset describing which component types an entity owns
///
/// Bit positions are assigned per world, in the order component types are
/// first seen.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComponentMask(u64);

impl ComponentMask {
    /// The empty mask
    pub const EMPTY: Self = Self(0);

    /// Mask with a single bit set
    pub(crate) fn bit(index: usize) -> Self {
        debug_assert!(index < MAX_COMPONENT_TYPES);
        Self(1 << index)
    }

    /// Whether every bit of `other` is also set here
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no bit is set
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of component types in the mask
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    pub(crate) fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub(crate) fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for ComponentMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentMask({:#066b})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_contains() {
        let mut mask = ComponentMask::EMPTY;
        assert!(mask.is_empty());

        mask.insert(ComponentMask::bit(0));
        mask.insert(ComponentMask::bit(3));

        assert!(mask.contains(ComponentMask::bit(0)));
        assert!(mask.contains(ComponentMask::bit(0) | ComponentMask::bit(3)));
        assert!(!mask.contains(ComponentMask::bit(1)));
        assert_eq!(mask.count(), 2);

        mask.remove(ComponentMask::bit(0));
        assert!(!mask.contains(ComponentMask::bit(0)));
        assert!(ComponentMask::EMPTY.is_empty());
    }
}
