//! Line Store
//!
//! An ordered map from 1-based line index to line payload, backed by an
//! arena-allocated red-black tree. Nodes reference each other by
//! [`NodeId`] (a slab index) rather than by pointer, so there is no shared
//! NIL sentinel: an absent child/parent is simply `None`.
//!
//! Lookup, insertion and removal are the textbook red-black tree
//! algorithms; renumbering (`shift_down`/`shift_up`) is a plain in-order
//! key rewrite, since shifting every key on one side of a threshold by a
//! constant preserves relative order and therefore never requires
//! rebalancing.

use slab::Slab;

type NodeId = usize;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

#[derive(Debug)]
struct Node {
    key: usize,
    payload: Box<str>,
    color: Color,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// Ordered store of line payloads keyed by 1-based line index.
#[derive(Debug, Default)]
pub struct LineStore {
    arena: Slab<Node>,
    root: Option<NodeId>,
}

impl LineStore {
    pub fn new() -> Self {
        Self {
            arena: Slab::new(),
            root: None,
        }
    }

    /// Current number of live lines.
    pub fn size(&self) -> usize {
        self.arena.len()
    }

    fn color_of(&self, id: Option<NodeId>) -> Color {
        id.map(|i| self.arena[i].color).unwrap_or(Color::Black)
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent
    }

    fn left_of(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].left
    }

    fn right_of(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].right
    }

    fn search(&self, key: usize) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node_key = self.arena[id].key;
            if key == node_key {
                return Some(id);
            }
            cur = if key < node_key {
                self.left_of(id)
            } else {
                self.right_of(id)
            };
        }
        None
    }

    /// Smallest live key `>= key`, or `None` if every live key is smaller.
    fn ceiling(&self, key: usize) -> Option<NodeId> {
        let mut cur = self.root;
        let mut candidate = None;
        while let Some(id) = cur {
            let node_key = self.arena[id].key;
            if node_key == key {
                return Some(id);
            } else if node_key > key {
                candidate = Some(id);
                cur = self.left_of(id);
            } else {
                cur = self.right_of(id);
            }
        }
        candidate
    }

    pub fn lookup(&self, key: usize) -> Option<&str> {
        self.search(key).map(|id| &*self.arena[id].payload)
    }

    /// Inserts or overwrites the line at `key`, returning the previous
    /// payload if one was present.
    pub fn upsert(&mut self, key: usize, payload: Box<str>) -> Option<Box<str>> {
        if let Some(id) = self.search(key) {
            return Some(std::mem::replace(&mut self.arena[id].payload, payload));
        }
        self.insert_node(key, payload);
        None
    }

    /// Removes the line at `key`, returning its payload if it was present.
    pub fn remove(&mut self, key: usize) -> Option<Box<str>> {
        let id = self.search(key)?;
        Some(self.delete_node(id))
    }

    /// For every live key `>= b + 1`, subtracts `b - a + 1`.
    pub fn shift_down(&mut self, a: usize, b: usize) {
        let delta = b - a + 1;
        let root = self.root;
        self.rewrite_keys(root, b + 1, delta, false);
    }

    /// For every live key `>= a`, adds `b - a + 1`.
    pub fn shift_up(&mut self, a: usize, b: usize) {
        let delta = b - a + 1;
        let root = self.root;
        self.rewrite_keys(root, a, delta, true);
    }

    /// Payloads for every live key in `[lo, hi]`, in key order.
    pub fn scan(&self, lo: usize, hi: usize) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cur = self.ceiling(lo);
        while let Some(id) = cur {
            let key = self.arena[id].key;
            if key > hi {
                break;
            }
            out.push(&*self.arena[id].payload);
            cur = self.successor(id);
        }
        out
    }

    fn rewrite_keys(&mut self, id: Option<NodeId>, threshold: usize, delta: usize, add: bool) {
        let Some(id) = id else { return };
        let (left, right) = (self.left_of(id), self.right_of(id));
        self.rewrite_keys(left, threshold, delta, add);
        if self.arena[id].key >= threshold {
            if add {
                self.arena[id].key += delta;
            } else {
                self.arena[id].key -= delta;
            }
        }
        self.rewrite_keys(right, threshold, delta, add);
    }

    fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(l) = self.left_of(id) {
            id = l;
        }
        id
    }

    fn maximum(&self, mut id: NodeId) -> NodeId {
        while let Some(r) = self.right_of(id) {
            id = r;
        }
        id
    }

    fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(l) = self.left_of(id) {
            return Some(self.maximum(l));
        }
        let mut x = id;
        let mut y = self.parent_of(x);
        while let Some(yy) = y {
            if self.left_of(yy) != Some(x) {
                break;
            }
            x = yy;
            y = self.parent_of(yy);
        }
        y
    }

    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(r) = self.right_of(id) {
            return Some(self.minimum(r));
        }
        let mut x = id;
        let mut y = self.parent_of(x);
        while let Some(yy) = y {
            if self.right_of(yy) != Some(x) {
                break;
            }
            x = yy;
            y = self.parent_of(yy);
        }
        y
    }

    fn insert_node(&mut self, key: usize, payload: Box<str>) -> NodeId {
        let mut parent = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            parent = Some(id);
            cur = if key < self.arena[id].key {
                self.left_of(id)
            } else {
                self.right_of(id)
            };
        }
        let id = self.arena.insert(Node {
            key,
            payload,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        });
        match parent {
            None => self.root = Some(id),
            Some(p) => {
                if key < self.arena[p].key {
                    self.arena[p].left = Some(id);
                } else {
                    self.arena[p].right = Some(id);
                }
            }
        }
        self.insert_fixup(id);
        id
    }

    fn left_rotate(&mut self, x: NodeId) {
        let y = self.right_of(x).expect("left_rotate requires a right child");
        let y_left = self.left_of(y);
        self.arena[x].right = y_left;
        if let Some(yl) = y_left {
            self.arena[yl].parent = Some(x);
        }
        let x_parent = self.parent_of(x);
        self.arena[y].parent = x_parent;
        match x_parent {
            None => self.root = Some(y),
            Some(p) => {
                if self.left_of(p) == Some(x) {
                    self.arena[p].left = Some(y);
                } else {
                    self.arena[p].right = Some(y);
                }
            }
        }
        self.arena[y].left = Some(x);
        self.arena[x].parent = Some(y);
    }

    fn right_rotate(&mut self, x: NodeId) {
        let y = self.left_of(x).expect("right_rotate requires a left child");
        let y_right = self.right_of(y);
        self.arena[x].left = y_right;
        if let Some(yr) = y_right {
            self.arena[yr].parent = Some(x);
        }
        let x_parent = self.parent_of(x);
        self.arena[y].parent = x_parent;
        match x_parent {
            None => self.root = Some(y),
            Some(p) => {
                if self.left_of(p) == Some(x) {
                    self.arena[p].left = Some(y);
                } else {
                    self.arena[p].right = Some(y);
                }
            }
        }
        self.arena[y].right = Some(x);
        self.arena[x].parent = Some(y);
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while let Some(p) = self.parent_of(z) {
            if self.color_of(Some(p)) != Color::Red {
                break;
            }
            let gp = self
                .parent_of(p)
                .expect("a red node's parent always has a parent (root is black)");
            if Some(p) == self.left_of(gp) {
                let uncle = self.right_of(gp);
                if self.color_of(uncle) == Color::Red {
                    self.arena[p].color = Color::Black;
                    if let Some(u) = uncle {
                        self.arena[u].color = Color::Black;
                    }
                    self.arena[gp].color = Color::Red;
                    z = gp;
                } else {
                    if Some(z) == self.right_of(p) {
                        z = p;
                        self.left_rotate(z);
                    }
                    let p2 = self.parent_of(z).unwrap();
                    let gp2 = self.parent_of(p2).unwrap();
                    self.arena[p2].color = Color::Black;
                    self.arena[gp2].color = Color::Red;
                    self.right_rotate(gp2);
                }
            } else {
                let uncle = self.left_of(gp);
                if self.color_of(uncle) == Color::Red {
                    self.arena[p].color = Color::Black;
                    if let Some(u) = uncle {
                        self.arena[u].color = Color::Black;
                    }
                    self.arena[gp].color = Color::Red;
                    z = gp;
                } else {
                    if Some(z) == self.left_of(p) {
                        z = p;
                        self.right_rotate(z);
                    }
                    let p2 = self.parent_of(z).unwrap();
                    let gp2 = self.parent_of(p2).unwrap();
                    self.arena[p2].color = Color::Black;
                    self.arena[gp2].color = Color::Red;
                    self.left_rotate(gp2);
                }
            }
        }
        if let Some(r) = self.root {
            self.arena[r].color = Color::Black;
        }
    }

    fn delete_node(&mut self, x: NodeId) -> Box<str> {
        let to_del = if self.left_of(x).is_none() || self.right_of(x).is_none() {
            x
        } else {
            self.predecessor(x)
                .expect("a node with two children always has a predecessor")
        };

        let subt = self.left_of(to_del).or_else(|| self.right_of(to_del));
        let to_del_parent = self.parent_of(to_del);

        if let Some(s) = subt {
            self.arena[s].parent = to_del_parent;
        }
        match to_del_parent {
            None => self.root = subt,
            Some(p) => {
                if self.left_of(p) == Some(to_del) {
                    self.arena[p].left = subt;
                } else {
                    self.arena[p].right = subt;
                }
            }
        }

        let removed = self.arena.remove(to_del);

        let result = if to_del != x {
            let old_payload_at_x = std::mem::replace(&mut self.arena[x].payload, removed.payload);
            self.arena[x].key = removed.key;
            old_payload_at_x
        } else {
            removed.payload
        };

        if removed.color == Color::Black {
            self.delete_fixup(subt, to_del_parent);
        }

        result
    }

    fn delete_fixup(&mut self, mut x: Option<NodeId>, mut x_parent: Option<NodeId>) {
        while x != self.root && self.color_of(x) == Color::Black {
            let Some(p) = x_parent else { break };
            if x == self.left_of(p) {
                let mut w = self
                    .right_of(p)
                    .expect("black x has a sibling by the black-height invariant");
                if self.color_of(Some(w)) == Color::Red {
                    self.arena[w].color = Color::Black;
                    self.arena[p].color = Color::Red;
                    self.left_rotate(p);
                    w = self.right_of(p).expect("sibling survives the rotation");
                }
                let (wl, wr) = (self.left_of(w), self.right_of(w));
                if self.color_of(wl) == Color::Black && self.color_of(wr) == Color::Black {
                    self.arena[w].color = Color::Red;
                    x_parent = self.parent_of(p);
                    x = Some(p);
                } else {
                    if self.color_of(wr) == Color::Black {
                        if let Some(l) = wl {
                            self.arena[l].color = Color::Black;
                        }
                        self.arena[w].color = Color::Red;
                        self.right_rotate(w);
                        w = self.right_of(p).expect("sibling survives the rotation");
                    }
                    self.arena[w].color = self.color_of(Some(p));
                    self.arena[p].color = Color::Black;
                    if let Some(r) = self.right_of(w) {
                        self.arena[r].color = Color::Black;
                    }
                    self.left_rotate(p);
                    x = self.root;
                    x_parent = None;
                }
            } else {
                let mut w = self
                    .left_of(p)
                    .expect("black x has a sibling by the black-height invariant");
                if self.color_of(Some(w)) == Color::Red {
                    self.arena[w].color = Color::Black;
                    self.arena[p].color = Color::Red;
                    self.right_rotate(p);
                    w = self.left_of(p).expect("sibling survives the rotation");
                }
                let (wl, wr) = (self.left_of(w), self.right_of(w));
                if self.color_of(wr) == Color::Black && self.color_of(wl) == Color::Black {
                    self.arena[w].color = Color::Red;
                    x_parent = self.parent_of(p);
                    x = Some(p);
                } else {
                    if self.color_of(wl) == Color::Black {
                        if let Some(r) = wr {
                            self.arena[r].color = Color::Black;
                        }
                        self.arena[w].color = Color::Red;
                        self.left_rotate(w);
                        w = self.left_of(p).expect("sibling survives the rotation");
                    }
                    self.arena[w].color = self.color_of(Some(p));
                    self.arena[p].color = Color::Black;
                    if let Some(l) = self.left_of(w) {
                        self.arena[l].color = Color::Black;
                    }
                    self.right_rotate(p);
                    x = self.root;
                    x_parent = None;
                }
            }
        }
        if let Some(xi) = x {
            self.arena[xi].color = Color::Black;
        }
    }

    #[cfg(test)]
    fn in_order_keys(&self) -> Vec<usize> {
        fn walk(store: &LineStore, id: Option<NodeId>, out: &mut Vec<usize>) {
            let Some(id) = id else { return };
            walk(store, store.left_of(id), out);
            out.push(store.arena[id].key);
            walk(store, store.right_of(id), out);
        }
        let mut out = Vec::new();
        walk(self, self.root, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(s: &str) -> Box<str> {
        s.into()
    }

    #[test]
    fn test_upsert_and_lookup() {
        let mut store = LineStore::new();
        assert!(store.upsert(1, payload("alpha")).is_none());
        assert!(store.upsert(2, payload("beta")).is_none());
        assert_eq!(store.lookup(1), Some("alpha"));
        assert_eq!(store.lookup(2), Some("beta"));
        assert_eq!(store.lookup(3), None);
        assert_eq!(store.size(), 2);

        let prev = store.upsert(1, payload("ALPHA"));
        assert_eq!(prev.as_deref(), Some("alpha"));
        assert_eq!(store.lookup(1), Some("ALPHA"));
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn test_remove() {
        let mut store = LineStore::new();
        store.upsert(1, payload("a"));
        store.upsert(2, payload("b"));
        store.upsert(3, payload("c"));

        let removed = store.remove(2);
        assert_eq!(removed.as_deref(), Some("b"));
        assert_eq!(store.lookup(2), None);
        assert_eq!(store.size(), 2);
        assert_eq!(store.remove(2), None);
    }

    #[test]
    fn test_shift_down_closes_gap() {
        let mut store = LineStore::new();
        for (k, s) in [(1, "A"), (2, "B"), (3, "C"), (4, "D"), (5, "E")] {
            store.upsert(k, payload(s));
        }
        store.remove(2);
        store.remove(3);
        store.shift_down(2, 3);

        assert_eq!(store.lookup(1), Some("A"));
        assert_eq!(store.lookup(2), Some("D"));
        assert_eq!(store.lookup(3), Some("E"));
        assert_eq!(store.lookup(4), None);
        assert_eq!(store.size(), 3);
    }

    #[test]
    fn test_shift_up_reopens_gap() {
        let mut store = LineStore::new();
        for (k, s) in [(1, "A"), (2, "D"), (3, "E")] {
            store.upsert(k, payload(s));
        }
        store.shift_up(2, 3);
        assert_eq!(store.lookup(1), Some("A"));
        assert_eq!(store.lookup(2), None);
        assert_eq!(store.lookup(3), None);
        assert_eq!(store.lookup(4), Some("D"));
        assert_eq!(store.lookup(5), Some("E"));
    }

    #[test]
    fn test_scan_in_order() {
        let mut store = LineStore::new();
        for k in (1..=20).rev() {
            store.upsert(k, payload(&k.to_string()));
        }
        let scanned = store.scan(5, 10);
        assert_eq!(scanned, vec!["5", "6", "7", "8", "9", "10"]);
    }

    #[test]
    fn test_scan_clamped_by_density() {
        let mut store = LineStore::new();
        for k in 1..=5 {
            store.upsert(k, payload(&k.to_string()));
        }
        assert_eq!(store.scan(3, 100), vec!["3", "4", "5"]);
        assert!(store.scan(100, 200).is_empty());
    }

    #[test]
    fn test_bulk_insert_remove_stays_ordered() {
        let mut store = LineStore::new();
        for k in 1..=200 {
            store.upsert(k, payload(&k.to_string()));
        }
        for k in (2..=200).step_by(2) {
            store.remove(k);
        }
        assert_eq!(store.size(), 100);
        let keys = store.in_order_keys();
        let expected: Vec<usize> = (1..=199).step_by(2).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_delete_node_with_two_children_copies_predecessor() {
        let mut store = LineStore::new();
        for k in 1..=7 {
            store.upsert(k, payload(&k.to_string()));
        }
        // Root has two children regardless of shape; remove an interior key.
        store.remove(4);
        assert_eq!(store.lookup(4), None);
        let keys = store.in_order_keys();
        assert_eq!(keys, vec![1, 2, 3, 5, 6, 7]);
    }
}
