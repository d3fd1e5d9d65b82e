use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::raw::{Handle, RawBPlusTree};

/// A breadth-first rendering of a [`BPlusTree`](crate::BPlusTree), one line per level.
///
/// This `struct` is created by the [`display`](crate::BPlusTree::display) method. Each line reads
/// `level N:` followed by the nodes of that level from left to right, every node's keys enclosed
/// in brackets. Level 0 is the root; the last line is the leaf level.
#[must_use = "`Levels` renders nothing until it is formatted"]
pub struct Levels<'a, T> {
    raw: &'a RawBPlusTree<T>,
}

impl<'a, T> Levels<'a, T> {
    pub(crate) fn new(raw: &'a RawBPlusTree<T>) -> Self {
        Levels { raw }
    }
}

impl<T: fmt::Display> Levels<'_, T> {
    /// Returns the rendered levels, root first, without trailing newlines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.to_string().lines().map(String::from).collect()
    }
}

impl<T: fmt::Display> fmt::Display for Levels<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `None` marks the end of a level.
        let mut queue: VecDeque<Option<Handle>> = VecDeque::new();
        queue.push_back(Some(self.raw.root()));
        queue.push_back(None);

        let mut level = 0;
        write!(f, "level {level}:")?;
        while let Some(entry) = queue.pop_front() {
            match entry {
                Some(handle) => {
                    let node = self.raw.node(handle);
                    f.write_str(" [")?;
                    for (index, key) in node.keys().iter().enumerate() {
                        if index > 0 {
                            f.write_str(" ")?;
                        }
                        write!(f, "{key}")?;
                    }
                    f.write_str("]")?;
                    queue.extend(node.children().iter().copied().map(Some));
                }
                None => {
                    f.write_str("\n")?;
                    if !queue.is_empty() {
                        level += 1;
                        write!(f, "level {level}:")?;
                        queue.push_back(None);
                    }
                }
            }
        }
        Ok(())
    }
}

impl<T: fmt::Display> fmt::Debug for Levels<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lines()).finish()
    }
}
