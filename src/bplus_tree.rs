use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use crate::degree::{Degree, DegreeError};
use crate::raw::{Handle, RawBPlusTree};

mod levels;

pub use levels::Levels;

/// An ordered set of unique keys stored in a B+Tree.
///
/// Keys live in the leaves, which form a singly linked chain in ascending order; internal nodes
/// hold separator keys that route a descent. Every node other than the root holds between
/// [`Degree::min_keys`] and [`Degree::max_keys`] keys. Overfilled nodes are split and underfilled
/// nodes are merged with a sibling; there is no redistribution between siblings.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key, as determined by the [`Ord`] trait, changes while it is in the tree.
///
/// # Examples
///
/// ```
/// use leaf_index::BPlusTree;
///
/// let mut index = BPlusTree::new(4)?;
///
/// for key in [10, 20, 5, 6, 15, 30, 25, 35] {
///     index.insert(key);
/// }
/// assert!(index.search(&25));
/// assert!(!index.search(&99));
/// assert!(index.height() > 1);
///
/// assert!(index.delete(&25));
/// assert!(!index.delete(&25));
///
/// let keys: Vec<_> = index.iter().copied().collect();
/// assert_eq!(keys, [5, 6, 10, 15, 20, 30, 35]);
/// # Ok::<(), leaf_index::DegreeError>(())
/// ```
pub struct BPlusTree<T> {
    raw: RawBPlusTree<T>,
}

/// An iterator over the keys of a `BPlusTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`BPlusTree`]. It walks the leaf chain and
/// never revisits internal nodes.
///
/// [`iter`]: BPlusTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    raw: &'a RawBPlusTree<T>,
    leaf: Option<Handle>,
    index: usize,
    remaining: usize,
}

impl<T> BPlusTree<T> {
    /// Makes a new, empty `BPlusTree` whose nodes have at most `degree` children.
    ///
    /// # Errors
    ///
    /// Returns [`DegreeError`] if `degree` is below 3 or above [`Degree::MAX`].
    ///
    /// # Examples
    ///
    /// ```
    /// use leaf_index::{BPlusTree, DegreeError};
    ///
    /// let index: BPlusTree<u32> = BPlusTree::new(3)?;
    /// assert!(index.is_empty());
    ///
    /// assert_eq!(BPlusTree::<u32>::new(2).err(), Some(DegreeError::TooSmall { degree: 2 }));
    /// # Ok::<(), DegreeError>(())
    /// ```
    pub fn new(degree: usize) -> Result<Self, DegreeError> {
        Ok(Self::with_degree(Degree::new(degree)?))
    }

    /// Makes a new, empty `BPlusTree` with an already validated degree.
    #[must_use]
    pub fn with_degree(degree: Degree) -> Self {
        BPlusTree {
            raw: RawBPlusTree::new(degree),
        }
    }

    /// Makes a new, empty `BPlusTree` with node storage for at least `capacity` keys.
    ///
    /// # Errors
    ///
    /// Returns [`DegreeError`] if `degree` is below 3 or above [`Degree::MAX`].
    pub fn with_capacity(degree: usize, capacity: usize) -> Result<Self, DegreeError> {
        Ok(BPlusTree {
            raw: RawBPlusTree::with_capacity(Degree::new(degree)?, capacity),
        })
    }

    /// Returns the degree the tree was built with.
    #[must_use]
    pub const fn degree(&self) -> Degree {
        self.raw.degree()
    }

    /// Returns the number of keys in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of levels, counting the leaves. An empty tree has height 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use leaf_index::BPlusTree;
    ///
    /// let mut index: BPlusTree<i32> = BPlusTree::new(3)?;
    /// assert_eq!(index.height(), 1);
    /// index.extend([1, 2, 3]);
    /// assert_eq!(index.height(), 2);
    /// # Ok::<(), leaf_index::DegreeError>(())
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Removes every key, leaving an empty leaf as the root.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the smallest key, if any.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first()
    }

    /// Returns the largest key, if any.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last()
    }

    /// Gets an iterator that visits the keys in ascending order by following the leaf chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use leaf_index::BPlusTree;
    ///
    /// let index: BPlusTree<_> = [3, 1, 2].into_iter().collect();
    /// let mut iter = index.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), Some(&3));
    /// assert_eq!(iter.next(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; O(1) per step.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            raw: &self.raw,
            leaf: Some(self.raw.first_leaf()),
            index: 0,
            remaining: self.raw.len(),
        }
    }

    /// Renders the tree level by level, root first.
    ///
    /// The rendering is diagnostic only; its exact layout may change.
    ///
    /// # Examples
    ///
    /// ```
    /// use leaf_index::BPlusTree;
    ///
    /// let mut index: BPlusTree<i32> = BPlusTree::new(4)?;
    /// index.extend([10, 20, 5, 6]);
    ///
    /// assert_eq!(index.display().to_string(), "level 0: [10]\nlevel 1: [5 6 10] [20]\n");
    /// # Ok::<(), leaf_index::DegreeError>(())
    /// ```
    pub fn display(&self) -> Levels<'_, T>
    where
        T: fmt::Display,
    {
        Levels::new(&self.raw)
    }
}

impl<T: Ord> BPlusTree<T> {
    /// Returns `true` if the tree contains `key`.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering on the borrowed
    /// form *must* match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use leaf_index::BPlusTree;
    ///
    /// let index: BPlusTree<String> = ["b", "a"].map(String::from).into_iter().collect();
    /// assert!(index.search("a"));
    /// assert!(!index.search("c"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn search<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key)
    }

    /// Same as [`search`](BPlusTree::search), named after the standard collections.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key)
    }
}

impl<T: Ord + Clone> BPlusTree<T> {
    /// Adds `key` to the tree.
    ///
    /// Returns whether the key was newly inserted. Inserting a key that is already present
    /// leaves the tree unchanged and returns `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use leaf_index::BPlusTree;
    ///
    /// let mut index = BPlusTree::new(4)?;
    /// assert!(index.insert(10));
    /// assert!(!index.insert(10));
    /// assert_eq!(index.len(), 1);
    /// # Ok::<(), leaf_index::DegreeError>(())
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: T) -> bool {
        self.raw.insert(key)
    }

    /// Removes `key` from the tree. Returns whether it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use leaf_index::BPlusTree;
    ///
    /// let mut index = BPlusTree::new(3)?;
    /// assert!(!index.delete(&10));
    /// index.insert(10);
    /// assert!(index.delete(&10));
    /// assert!(index.is_empty());
    /// # Ok::<(), leaf_index::DegreeError>(())
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Same as [`delete`](BPlusTree::delete), named after the standard collections.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }
}

impl<T: Clone> Clone for BPlusTree<T> {
    fn clone(&self) -> Self {
        BPlusTree { raw: self.raw.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for BPlusTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Trees are equal when they hold the same keys, whatever their degree or shape.
impl<T: PartialEq> PartialEq for BPlusTree<T> {
    fn eq(&self, other: &BPlusTree<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for BPlusTree<T> {}

impl<T> Default for BPlusTree<T> {
    /// Creates an empty `BPlusTree` of [`Degree::DEFAULT`].
    fn default() -> BPlusTree<T> {
        BPlusTree::with_degree(Degree::DEFAULT)
    }
}

impl<T: Ord + Clone> FromIterator<T> for BPlusTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> BPlusTree<T> {
        let mut tree = BPlusTree::default();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord + Clone> Extend<T> for BPlusTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for BPlusTree<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, T> IntoIterator for &'a BPlusTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        while let Some(handle) = self.leaf {
            let keys = self.raw.node(handle).as_leaf().keys();
            if let Some(key) = keys.get(self.index) {
                self.index += 1;
                self.remaining -= 1;
                return Some(key);
            }
            self.leaf = self.raw.node(handle).as_leaf().next();
            self.index = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            leaf: self.leaf,
            index: self.index,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
