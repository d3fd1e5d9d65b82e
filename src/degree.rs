use core::fmt;

/// The fan-out of a [`BPlusTree`](crate::BPlusTree): the maximum number of children of any node.
///
/// Every fill threshold of the tree is derived from the degree:
///
/// - a node holds at most [`max_keys`](Degree::max_keys) `= degree - 1` keys;
/// - a node other than the root holds at least [`min_keys`](Degree::min_keys)
///   `= ceil(degree / 2) - 1` keys.
///
/// # Examples
///
/// ```
/// use leaf_index::Degree;
///
/// let degree = Degree::new(4).unwrap();
/// assert_eq!(degree.max_keys(), 3);
/// assert_eq!(degree.min_keys(), 1);
///
/// assert!(Degree::new(2).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Degree(usize);

/// The error returned when constructing a [`Degree`] (or a tree) from an unusable value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum DegreeError {
    /// A node must be able to hold two children after a split, so the degree is at least 3.
    #[error("degree {degree} is below the minimum of {min}", min = Degree::MIN)]
    TooSmall {
        /// The rejected degree.
        degree: usize,
    },
    /// Nodes are scanned linearly, so the degree is bounded.
    #[error("degree {degree} exceeds the maximum of {max}", max = Degree::MAX)]
    TooLarge {
        /// The rejected degree.
        degree: usize,
    },
}

impl Degree {
    /// The smallest accepted degree.
    pub const MIN: usize = 3;
    /// The largest accepted degree.
    pub const MAX: usize = 1 << 16;
    /// The degree used by [`BPlusTree::default`](crate::BPlusTree::default) and by `collect()`.
    pub const DEFAULT: Self = Self(16);

    /// Validates `degree`.
    ///
    /// # Errors
    ///
    /// Returns [`DegreeError::TooSmall`] below [`Degree::MIN`] and [`DegreeError::TooLarge`]
    /// above [`Degree::MAX`].
    pub const fn new(degree: usize) -> Result<Self, DegreeError> {
        if degree < Self::MIN {
            Err(DegreeError::TooSmall { degree })
        } else if degree > Self::MAX {
            Err(DegreeError::TooLarge { degree })
        } else {
            Ok(Self(degree))
        }
    }

    /// Returns the degree as a plain integer.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// The most keys any node may hold.
    #[must_use]
    pub const fn max_keys(self) -> usize {
        self.0 - 1
    }

    /// The fewest keys a node other than the root may hold.
    #[must_use]
    pub const fn min_keys(self) -> usize {
        self.0.div_ceil(2) - 1
    }
}

impl Default for Degree {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for Degree {
    type Error = DegreeError;

    fn try_from(degree: usize) -> Result<Self, Self::Error> {
        Self::new(degree)
    }
}

impl From<Degree> for usize {
    fn from(degree: Degree) -> Self {
        degree.0
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
