//! Recency List Module
//!
//! Arena-backed doubly linked list that keeps cache entries in access order.

/// Sentinel slot index meaning "no node".
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<T> {
    item: T,
    prev: usize,
    next: usize,
}

// == Recency List ==
/// Tracks access order for LRU eviction.
///
/// Items live in a slot arena and are linked from most recently used (head)
/// to least recently used (tail). Slot indices stay stable until the item is
/// removed, so the store can keep them in its key index and promote, remove
/// or evict in constant time.
#[derive(Debug)]
pub struct RecencyList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an item as most recently used and returns its slot.
    pub fn push_front(&mut self, item: T) -> usize {
        let node = Node {
            item,
            prev: NIL,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.link_front(idx);
        self.len += 1;
        idx
    }

    // == Move To Front ==
    /// Marks the item in `idx` as most recently used.
    pub fn move_to_front(&mut self, idx: usize) {
        if idx == self.head || self.node(idx).is_none() {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Remove ==
    /// Removes the item in `idx`, freeing the slot for reuse.
    pub fn remove(&mut self, idx: usize) -> Option<T> {
        self.node(idx)?;
        self.unlink(idx);
        let node = self.slots[idx].take()?;
        self.free.push(idx);
        self.len -= 1;
        Some(node.item)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used item.
    pub fn pop_back(&mut self) -> Option<T> {
        self.remove(self.tail)
    }

    // == Back ==
    /// Returns the least recently used item without removing it.
    #[cfg(test)]
    pub(crate) fn back(&self) -> Option<&T> {
        self.get(self.tail)
    }

    /// Returns the item stored at `idx`, if the slot is live.
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.node(idx).map(|node| &node.item)
    }

    /// Mutable access to the item stored at `idx`.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.node_mut(idx).map(|node| &mut node.item)
    }

    /// Returns the number of items in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn node(&self, idx: usize) -> Option<&Node<T>> {
        self.slots.get(idx)?.as_ref()
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(idx)?.as_mut()
    }

    fn unlink(&mut self, idx: usize) {
        let Some((prev, next)) = self.node(idx).map(|node| (node.prev, node.next)) else {
            return;
        };
        match self.node_mut(prev) {
            Some(node) => node.next = next,
            None => self.head = next,
        }
        match self.node_mut(next) {
            Some(node) => node.prev = prev,
            None => self.tail = prev,
        }
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = NIL;
            node.next = old_head;
        }
        match self.node_mut(old_head) {
            Some(node) => node.prev = idx,
            None => self.tail = idx,
        }
        self.head = idx;
    }
}

/// Front-to-back iterator over a [`RecencyList`].
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor)?;
        self.cursor = node.next;
        Some(&node.item)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn order(list: &RecencyList<&'static str>) -> Vec<&'static str> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<&str> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = RecencyList::new();

        list.push_front("key1");
        list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.len(), 3);
        assert_eq!(list.back(), Some(&"key1"));
        assert_eq!(order(&list), vec!["key3", "key2", "key1"]);
    }

    #[test]
    fn test_move_to_front() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        list.move_to_front(a);

        assert_eq!(list.back(), Some(&"b"));
        assert_eq!(list.pop_back(), Some("b"));
        assert_eq!(list.pop_back(), Some("c"));
        assert_eq!(list.pop_back(), Some("a"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_move_head_to_front_is_noop() {
        let mut list = RecencyList::new();

        list.push_front("a");
        let b = list.push_front("b");
        list.move_to_front(b);

        assert_eq!(order(&list), vec!["b", "a"]);
    }

    #[test]
    fn test_pop_back_empty() {
        let mut list: RecencyList<&str> = RecencyList::new();
        assert_eq!(list.pop_back(), None);
    }

    #[test]
    fn test_remove_middle() {
        let mut list = RecencyList::new();

        list.push_front("key1");
        let middle = list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.remove(middle), Some("key2"));
        assert_eq!(list.len(), 2);
        assert_eq!(order(&list), vec!["key3", "key1"]);

        // A freed slot is no longer addressable
        assert_eq!(list.remove(middle), None);
        assert_eq!(list.get(middle), None);
    }

    #[test]
    fn test_remove_only_item_resets_ends() {
        let mut list = RecencyList::new();

        let only = list.push_front("solo");
        assert_eq!(list.remove(only), Some("solo"));
        assert!(list.is_empty());
        assert_eq!(list.back(), None);

        list.push_front("next");
        assert_eq!(order(&list), vec!["next"]);
    }

    #[test]
    fn test_slots_are_reused() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        list.remove(a);
        let b = list.push_front("b");

        assert_eq!(a, b);
        assert_eq!(list.get(b), Some(&"b"));
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        let b = list.push_front("b");
        let c = list.push_front("c");

        list.move_to_front(a);
        list.move_to_front(c);
        list.move_to_front(b);

        // front=[b, c, a]=back
        assert_eq!(list.pop_back(), Some("a"));
        assert_eq!(list.pop_back(), Some("c"));
        assert_eq!(list.pop_back(), Some("b"));
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut list = RecencyList::new();

        let idx = list.push_front(1);
        if let Some(item) = list.get_mut(idx) {
            *item = 42;
        }

        assert_eq!(list.get(idx), Some(&42));
    }
}
