//! Ordered map with positional queries.
//!
//! A treap whose nodes carry their subtree size, so the position of a key and
//! the key at a position are both found in one root-to-leaf walk. Priorities
//! come from a splitmix64 sequence; the expected height is logarithmic in the
//! number of entries.

use std::cmp::Ordering;

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    priority: u64,
    size: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn update(&mut self) {
        self.size = 1 + size(&self.left) + size(&self.right);
    }
}

fn size<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.size)
}

/// Splits into keys ordered before `key` (or equal to it, when `inclusive`)
/// and the rest.
fn split<K: Ord, V>(link: Link<K, V>, key: &K, inclusive: bool) -> (Link<K, V>, Link<K, V>) {
    let Some(mut node) = link else {
        return (None, None);
    };

    let goes_left = match node.key.cmp(key) {
        Ordering::Less => true,
        Ordering::Equal => inclusive,
        Ordering::Greater => false,
    };

    if goes_left {
        let (before, after) = split(node.right.take(), key, inclusive);
        node.right = before;
        node.update();
        (Some(node), after)
    } else {
        let (before, after) = split(node.left.take(), key, inclusive);
        node.left = after;
        node.update();
        (before, Some(node))
    }
}

/// Joins two treaps where every key of `a` orders before every key of `b`.
fn merge<K, V>(a: Link<K, V>, b: Link<K, V>) -> Link<K, V> {
    match (a, b) {
        (None, b) => b,
        (a, None) => a,
        (Some(mut a), Some(mut b)) => {
            if a.priority >= b.priority {
                a.right = merge(a.right.take(), Some(b));
                a.update();
                Some(a)
            } else {
                b.left = merge(Some(a), b.left.take());
                b.update();
                Some(b)
            }
        }
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[derive(Debug)]
pub struct OrderIndex<K, V> {
    root: Link<K, V>,
    seed: u64,
}

impl<K, V> Default for OrderIndex<K, V> {
    fn default() -> Self {
        Self {
            root: None,
            seed: 0,
        }
    }
}

impl<K: Ord, V> OrderIndex<K, V> {
    pub fn len(&self) -> usize {
        size(&self.root)
    }

    /// Inserts an entry, replacing the value of an equal key.
    pub fn insert(&mut self, key: K, value: V) {
        let (before, rest) = split(self.root.take(), &key, false);
        let (_, after) = split(rest, &key, true);
        let node = Box::new(Node {
            key,
            value,
            priority: splitmix64(&mut self.seed),
            size: 1,
            left: None,
            right: None,
        });
        self.root = merge(merge(before, Some(node)), after);
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (before, rest) = split(self.root.take(), key, false);
        let (found, after) = split(rest, key, true);
        self.root = merge(before, after);
        found.map(|node| node.value)
    }

    /// Number of keys ordered strictly before `key`.
    pub fn position(&self, key: &K) -> usize {
        let mut position = 0;
        let mut link = &self.root;
        while let Some(node) = link {
            if node.key < *key {
                position += size(&node.left) + 1;
                link = &node.right;
            } else {
                link = &node.left;
            }
        }
        position
    }

    /// In-order iterator starting at zero-based position `start`.
    pub fn iter_from(&self, start: usize) -> Iter<'_, K, V> {
        let mut stack = Vec::new();
        let mut skip = start;
        let mut link = &self.root;
        while let Some(node) = link {
            let left = size(&node.left);
            match skip.cmp(&left) {
                Ordering::Less => {
                    stack.push(node.as_ref());
                    link = &node.left;
                }
                Ordering::Equal => {
                    stack.push(node.as_ref());
                    break;
                }
                Ordering::Greater => {
                    skip -= left + 1;
                    link = &node.right;
                }
            }
        }
        Iter { stack }
    }

    pub fn clear(&mut self) {
        self.root = None;
    }

    #[cfg(test)]
    fn height(&self) -> usize {
        fn walk<K, V>(link: &Link<K, V>) -> usize {
            link.as_ref()
                .map_or(0, |node| 1 + walk(&node.left).max(walk(&node.right)))
        }
        walk(&self.root)
    }
}

pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let mut link = &node.right;
        while let Some(child) = link {
            self.stack.push(child.as_ref());
            link = &child.left;
        }
        Some((&node.key, &node.value))
    }
}
