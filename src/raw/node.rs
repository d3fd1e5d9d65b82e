use core::borrow::Borrow;

use smallvec::SmallVec;

use super::handle::Handle;
use crate::degree::Degree;

// Nodes of the default degree keep their keys inline; larger degrees spill to the heap.
const INLINE_KEYS: usize = 16;

pub(crate) type Keys<T> = SmallVec<[T; INLINE_KEYS]>;
pub(crate) type Children = SmallVec<[Handle; INLINE_KEYS + 1]>;

#[derive(Clone)]
pub(crate) enum Node<T> {
    Internal(InternalNode<T>),
    Leaf(LeafNode<T>),
}

// Separator keys and child handles. For keys `k[i]` and children `c[i]`, every key in `c[i]` is
// `<= k[i]` and every key in `c[i + 1]` is `> k[i]`; `k[i]` is the largest key stored under `c[i]`.
#[derive(Clone)]
pub(crate) struct InternalNode<T> {
    parent: Option<Handle>,
    keys: Keys<T>,
    children: Children,
}

// Stored keys, plus the forward link of the leaf chain.
#[derive(Clone)]
pub(crate) struct LeafNode<T> {
    parent: Option<Handle>,
    next: Option<Handle>,
    keys: Keys<T>,
}

/// Result of searching for a key in a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted.
    NotFound(usize),
}

fn search_keys<T, Q>(keys: &[T], key: &Q) -> SearchResult
where
    T: Borrow<Q>,
    Q: ?Sized + Ord,
{
    match keys.binary_search_by(|k| k.borrow().cmp(key)) {
        Ok(index) => SearchResult::Found(index),
        Err(index) => SearchResult::NotFound(index),
    }
}

impl<T> Node<T> {
    pub(crate) fn new_leaf() -> Self {
        Node::Leaf(LeafNode::new())
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode<T> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<T> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node, panicking if this is not internal.
    pub(crate) fn as_internal(&self) -> &InternalNode<T> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<T> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    pub(crate) fn keys(&self) -> &[T] {
        match self {
            Node::Internal(internal) => &internal.keys,
            Node::Leaf(leaf) => &leaf.keys,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys().len()
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        match self {
            Node::Internal(internal) => internal.parent,
            Node::Leaf(leaf) => leaf.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        match self {
            Node::Internal(internal) => internal.parent = parent,
            Node::Leaf(leaf) => leaf.parent = parent,
        }
    }

    /// Child handles; empty for a leaf.
    pub(crate) fn children(&self) -> &[Handle] {
        match self {
            Node::Internal(internal) => internal.children(),
            Node::Leaf(_) => &[],
        }
    }

    /// True once the node holds `degree` keys and must be split.
    pub(crate) fn is_overfilled(&self, degree: Degree) -> bool {
        self.key_count() > degree.max_keys()
    }

    /// True once a non-root node has fewer than the minimum keys and must be merged.
    pub(crate) fn is_underfilled(&self, degree: Degree) -> bool {
        self.key_count() < degree.min_keys()
    }

    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        search_keys(self.keys(), key)
    }
}

impl<T> InternalNode<T> {
    /// Creates a root over two children separated by `separator`.
    pub(crate) fn new_root(left: Handle, separator: T, right: Handle) -> Self {
        let mut keys = Keys::new();
        keys.push(separator);
        let mut children = Children::new();
        children.push(left);
        children.push(right);
        Self {
            parent: None,
            keys,
            children,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn last_child(&self) -> Handle {
        *self.children.last().expect("internal node without children")
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Position of `child` among this node's children.
    pub(crate) fn position_of(&self, child: Handle) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    /// Inserts `key` at `index` and `right` as the child immediately after it.
    pub(crate) fn insert_child(&mut self, index: usize, key: T, right: Handle) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, right);
    }

    /// Removes the key at `index` together with the child to its right.
    pub(crate) fn remove_child(&mut self, index: usize) -> (T, Handle) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        (key, child)
    }

    pub(crate) fn set_key(&mut self, index: usize, key: T) {
        self.keys[index] = key;
    }

    /// Splits off `keys[mid + 1..]` and `children[mid + 1..]` into a new right sibling and returns
    /// the middle key, which belongs in the parent. The sibling's children still name this node as
    /// their parent until the caller reparents them.
    pub(crate) fn split(&mut self) -> (T, InternalNode<T>) {
        let mid = self.keys.len() / 2;

        let right = InternalNode {
            parent: self.parent,
            keys: self.keys.drain(mid + 1..).collect(),
            children: self.children.drain(mid + 1..).collect(),
        };
        let middle = self.keys.pop().expect("split of an internal node without keys");

        (middle, right)
    }

    /// Absorbs a right sibling, pulling `separator` down between the two halves.
    pub(crate) fn merge_with_right(&mut self, separator: T, right: InternalNode<T>) {
        self.keys.push(separator);
        self.keys.extend(right.keys);
        self.children.extend(right.children);
    }
}

impl<T> LeafNode<T> {
    pub(crate) fn new() -> Self {
        Self {
            parent: None,
            next: None,
            keys: Keys::new(),
        }
    }

    pub(crate) fn keys(&self) -> &[T] {
        &self.keys
    }

    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    pub(crate) fn first_key(&self) -> Option<&T> {
        self.keys.first()
    }

    pub(crate) fn last_key(&self) -> Option<&T> {
        self.keys.last()
    }

    pub(crate) fn insert(&mut self, index: usize, key: T) {
        self.keys.insert(index, key);
    }

    pub(crate) fn remove(&mut self, index: usize) -> T {
        self.keys.remove(index)
    }

    /// Splits off `keys[mid + 1..]` into a new right sibling that takes over this leaf's `next`
    /// link. Returns a copy of `keys[mid]`, which stays here as this leaf's largest key.
    pub(crate) fn split(&mut self) -> (T, LeafNode<T>)
    where
        T: Clone,
    {
        let mid = self.keys.len() / 2;

        let right = LeafNode {
            parent: self.parent,
            next: self.next.take(),
            keys: self.keys.drain(mid + 1..).collect(),
        };
        let separator = self.keys[mid].clone();

        (separator, right)
    }

    /// Absorbs a right sibling and takes over its place in the leaf chain.
    pub(crate) fn merge_with_right(&mut self, right: LeafNode<T>) {
        self.keys.extend(right.keys);
        self.next = right.next;
    }
}
