#![forbid(unsafe_code)]

//! An in-memory page host.
//!
//! [`Page`] owns a node arena and implements the full capability surface:
//! class and attribute state, committed input values, tree shape, batched
//! mutation delivery, and the rejecting focus-loss slot registry.
//!
//! # Delivery model
//!
//! Mutations queue as records; nothing is delivered until [`flush`](Page::flush)
//! is called, which models one turn of the host event loop. A flush drains
//! the queue into a single batch and hands each subscription the ordered
//! subset matching its target and filter. Mutations performed *inside* a
//! sink queue for the next flush.
//!
//! # Invariants
//!
//! 1. Records are delivered in the order the mutations were applied.
//! 2. Subscriptions are serviced in registration order.
//! 3. A subscription disconnected mid-flush receives nothing further, even
//!    for the batch in flight.
//! 4. Class-list writes record only when membership actually changes;
//!    whole-attribute writes record unconditionally.
//!
//! # Panics
//!
//! Surface operations panic on a node id the page never created. Stale ids
//! are a host-usage error, not a detected condition.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use fdom_core::mutation::{CLASS_ATTRIBUTE, MutationFilter, MutationRecord};
use fdom_core::surface::{
    BindBlur, BlurListener, DomSurface, MutationSink, ObserveAttributes, SlotOccupied,
};

/// Identity of a node owned by a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Handle for a registered mutation subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    classes: Vec<String>,
    attributes: AHashMap<String, String>,
    value: String,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct ObserverEntry {
    id: ObserverId,
    target: NodeId,
    filter: MutationFilter,
    sink: MutationSink<NodeId>,
}

struct PageInner {
    nodes: AHashMap<NodeId, NodeData>,
    root: NodeId,
    next_node: u64,
    next_observer: u64,
    observers: Vec<ObserverEntry>,
    blur_slots: AHashMap<NodeId, BlurListener>,
    pending: Vec<MutationRecord<NodeId>>,
}

/// A cheap-clone handle to an in-memory page.
///
/// Cloning produces another handle to the **same** page; behaviors capture
/// clones in their sinks and listeners. Single-threaded only.
#[derive(Clone)]
pub struct Page {
    inner: Rc<RefCell<PageInner>>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Page")
            .field("nodes", &inner.nodes.len())
            .field("observers", &inner.observers.len())
            .field("blur_slots", &inner.blur_slots.len())
            .field("pending", &inner.pending.len())
            .finish()
    }
}

impl Page {
    /// Create an empty page with a `body` root node.
    #[must_use]
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = AHashMap::new();
        nodes.insert(
            root,
            NodeData {
                tag: "body".to_string(),
                ..NodeData::default()
            },
        );
        Self {
            inner: Rc::new(RefCell::new(PageInner {
                nodes,
                root,
                next_node: 1,
                next_observer: 0,
                observers: Vec::new(),
                blur_slots: AHashMap::new(),
                pending: Vec::new(),
            })),
        }
    }

    /// The page root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.inner.borrow().root
    }

    /// Set a node's committed input value. Host-side operation: like typing,
    /// it touches the value property only and queues no mutation record.
    pub fn set_value(&self, node: NodeId, value: &str) {
        self.with_node_mut(node, |data| data.value = value.to_string());
    }

    /// Fire the node's focus-loss listener, if any.
    pub fn blur(&self, node: NodeId) {
        let listener = self.inner.borrow().blur_slots.get(&node).cloned();
        if let Some(listener) = listener {
            listener();
        }
    }

    /// Deliver all queued mutation records as one batch: one turn of the
    /// host event loop. Records queued by sinks during delivery wait for
    /// the next flush.
    pub fn flush(&self) {
        let (batch, subscriptions) = {
            let mut inner = self.inner.borrow_mut();
            if inner.pending.is_empty() {
                return;
            }
            let batch = std::mem::take(&mut inner.pending);
            let subscriptions: Vec<(ObserverId, NodeId, MutationFilter, MutationSink<NodeId>)> =
                inner
                    .observers
                    .iter()
                    .map(|entry| (entry.id, entry.target, entry.filter, Rc::clone(&entry.sink)))
                    .collect();
            (batch, subscriptions)
        };

        for (id, target, filter, sink) in subscriptions {
            let records: Vec<MutationRecord<NodeId>> = batch
                .iter()
                .filter(|record| record.target == target && filter.accepts(record.kind))
                .cloned()
                .collect();
            if records.is_empty() {
                continue;
            }
            let still_registered = self
                .inner
                .borrow()
                .observers
                .iter()
                .any(|entry| entry.id == id);
            if still_registered {
                sink(&records);
            }
        }
    }

    /// Number of live mutation subscriptions.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Whether a focus-loss listener holds the node's slot.
    #[must_use]
    pub fn has_blur_listener(&self, node: NodeId) -> bool {
        self.inner.borrow().blur_slots.contains_key(&node)
    }

    /// Number of records queued for the next flush.
    #[must_use]
    pub fn pending_records(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// A node's children, in tree order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.with_node(node, |data| data.children.clone())
    }

    /// A node's last child.
    #[must_use]
    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.with_node(node, |data| data.children.last().copied())
    }

    /// A node's text content.
    #[must_use]
    pub fn text(&self, node: NodeId) -> String {
        self.with_node(node, |data| data.text.clone())
    }

    /// A node's tag name.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> String {
        self.with_node(node, |data| data.tag.clone())
    }

    /// A node's class list, in application order.
    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.with_node(node, |data| data.classes.clone())
    }

    fn with_node<R>(&self, node: NodeId, f: impl FnOnce(&NodeData) -> R) -> R {
        let inner = self.inner.borrow();
        f(inner.node(node))
    }

    fn with_node_mut<R>(&self, node: NodeId, f: impl FnOnce(&mut NodeData) -> R) -> R {
        let mut inner = self.inner.borrow_mut();
        f(inner.node_mut(node))
    }

    fn record(&self, record: MutationRecord<NodeId>) {
        self.inner.borrow_mut().pending.push(record);
    }

    fn class_snapshot(&self, node: NodeId) -> Option<String> {
        self.with_node(node, |data| {
            if data.classes.is_empty() {
                None
            } else {
                Some(data.classes.join(" "))
            }
        })
    }
}

impl PageInner {
    fn node(&self, id: NodeId) -> &NodeData {
        self.nodes.get(&id).expect("unknown node id")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        self.nodes.get_mut(&id).expect("unknown node id")
    }

    fn detach_internal(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(node).parent?;
        self.node_mut(parent).children.retain(|child| *child != node);
        self.node_mut(node).parent = None;
        Some(parent)
    }
}

impl DomSurface for Page {
    type Node = NodeId;

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.with_node(node, |data| data.classes.iter().any(|c| c == class))
    }

    fn add_classes(&self, node: NodeId, classes: &[String]) {
        let changed = self.with_node_mut(node, |data| {
            let mut changed = false;
            for class in classes {
                if !data.classes.iter().any(|c| c == class) {
                    data.classes.push(class.clone());
                    changed = true;
                }
            }
            changed
        });
        if changed {
            let snapshot = self.class_snapshot(node);
            self.record(MutationRecord::attribute(node, CLASS_ATTRIBUTE, snapshot));
        }
    }

    fn remove_classes(&self, node: NodeId, classes: &[String]) {
        let changed = self.with_node_mut(node, |data| {
            let before = data.classes.len();
            data.classes.retain(|c| !classes.iter().any(|removed| removed == c));
            data.classes.len() != before
        });
        if changed {
            let snapshot = self.class_snapshot(node);
            self.record(MutationRecord::attribute(node, CLASS_ATTRIBUTE, snapshot));
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        if name == CLASS_ATTRIBUTE {
            return self.class_snapshot(node);
        }
        self.with_node(node, |data| data.attributes.get(name).cloned())
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if name == CLASS_ATTRIBUTE {
            self.with_node_mut(node, |data| {
                data.classes = value.split_whitespace().map(str::to_string).collect();
            });
        } else {
            self.with_node_mut(node, |data| {
                data.attributes.insert(name.to_string(), value.to_string());
            });
        }
        // Whole-attribute writes always record, even when the value is
        // unchanged; observers are expected to coalesce.
        let snapshot = if name == CLASS_ATTRIBUTE {
            self.class_snapshot(node)
        } else {
            Some(value.to_string())
        };
        self.record(MutationRecord::attribute(node, name, snapshot));
    }

    fn remove_attribute(&self, node: NodeId, name: &str) {
        let removed = if name == CLASS_ATTRIBUTE {
            self.with_node_mut(node, |data| {
                let had = !data.classes.is_empty();
                data.classes.clear();
                had
            })
        } else {
            self.with_node_mut(node, |data| data.attributes.remove(name).is_some())
        };
        if removed {
            self.record(MutationRecord::attribute(node, name, None));
        }
    }

    fn value(&self, node: NodeId) -> String {
        self.with_node(node, |data| data.value.clone())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.with_node(node, |data| data.parent)
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        debug_assert_ne!(parent, child, "node cannot parent itself");
        let old_parent = {
            let mut inner = self.inner.borrow_mut();
            let old_parent = inner.detach_internal(child);
            inner.node_mut(parent).children.push(child);
            inner.node_mut(child).parent = Some(parent);
            old_parent
        };
        if let Some(old_parent) = old_parent
            && old_parent != parent
        {
            self.record(MutationRecord::child_list(old_parent));
        }
        self.record(MutationRecord::child_list(parent));
    }

    fn detach(&self, node: NodeId) {
        let old_parent = self.inner.borrow_mut().detach_internal(node);
        if let Some(old_parent) = old_parent {
            self.record(MutationRecord::child_list(old_parent));
        }
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let inner = self.inner.borrow();
        let mut current = node;
        loop {
            if current == inner.root {
                return true;
            }
            match inner.node(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn create_element(&self, tag: &str) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        let id = NodeId(inner.next_node);
        inner.next_node += 1;
        inner.nodes.insert(
            id,
            NodeData {
                tag: tag.to_string(),
                ..NodeData::default()
            },
        );
        id
    }

    fn set_text(&self, node: NodeId, text: &str) {
        self.with_node_mut(node, |data| data.text = text.to_string());
        self.record(MutationRecord::character_data(node));
    }
}

impl ObserveAttributes for Page {
    type ObserverId = ObserverId;

    fn observe(
        &self,
        node: NodeId,
        filter: MutationFilter,
        sink: MutationSink<NodeId>,
    ) -> ObserverId {
        let mut inner = self.inner.borrow_mut();
        let id = ObserverId(inner.next_observer);
        inner.next_observer += 1;
        inner.observers.push(ObserverEntry {
            id,
            target: node,
            filter,
            sink,
        });
        id
    }

    fn disconnect(&self, id: ObserverId) {
        self.inner
            .borrow_mut()
            .observers
            .retain(|entry| entry.id != id);
    }
}

impl BindBlur for Page {
    fn bind_blur(&self, node: NodeId, listener: BlurListener) -> Result<(), SlotOccupied> {
        let mut inner = self.inner.borrow_mut();
        if inner.blur_slots.contains_key(&node) {
            return Err(SlotOccupied);
        }
        inner.blur_slots.insert(node, listener);
        Ok(())
    }

    fn unbind_blur(&self, node: NodeId) {
        self.inner.borrow_mut().blur_slots.remove(&node);
    }
}
