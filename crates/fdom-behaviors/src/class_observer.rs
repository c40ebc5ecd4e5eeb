#![forbid(unsafe_code)]

//! Edge-triggered observation of one class on one node.
//!
//! [`ClassObserver`] subscribes to attribute mutations on a target node and
//! fires its callbacks only when membership in the watched class actually
//! changes. Membership is evaluated per record from the record's attribute
//! snapshot, so several transitions delivered in one batch each fire, and
//! redundant writes coalesce to nothing.
//!
//! # Invariants
//!
//! 1. Callbacks fire exactly once per genuine membership transition and
//!    never for no-op mutations.
//! 2. Records for attributes other than the class attribute, or for other
//!    nodes, are ignored.
//! 3. After [`disconnect`](ClassObserver::disconnect) no further callback
//!    fires, even for a batch in flight.

use std::cell::Cell;
use std::rc::Rc;

use fdom_core::mutation::{MutationFilter, MutationRecord};
use fdom_core::surface::{MutationSink, ObserveAttributes};
use tracing::{debug, trace};

use crate::membership::{ClassTransition, Membership};

struct ObserverShared {
    class: String,
    state: Cell<Membership>,
    on_added: Box<dyn Fn()>,
    on_removed: Box<dyn Fn()>,
}

impl ObserverShared {
    fn apply<N: Copy + Eq + std::fmt::Debug>(
        &self,
        target: N,
        records: &[MutationRecord<N>],
    ) {
        for record in records {
            if record.target != target || !record.is_class_change() {
                continue;
            }
            let present = record
                .value
                .as_deref()
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == self.class));
            let (next, edge) = self.state.get().observe(present);
            self.state.set(next);
            match edge {
                Some(ClassTransition::Added) => {
                    trace!(target: "fdom::class_observer", class = %self.class, node = ?target, "class added");
                    (self.on_added)();
                }
                Some(ClassTransition::Removed) => {
                    trace!(target: "fdom::class_observer", class = %self.class, node = ?target, "class removed");
                    (self.on_removed)();
                }
                None => {}
            }
        }
    }
}

/// Watches one class on one node and raises add/remove edges.
///
/// Inert until [`init`](ClassObserver::init). The target node is borrowed:
/// the host owns its lifetime, and the observer only ever reads delivered
/// snapshots. Dropping the observer disconnects it.
pub struct ClassObserver<S: ObserveAttributes> {
    surface: S,
    target: S::Node,
    shared: Rc<ObserverShared>,
    observer: Option<S::ObserverId>,
}

impl<S: ObserveAttributes> ClassObserver<S> {
    /// Create an inert observer for `class` on `target`.
    pub fn new(
        surface: S,
        target: S::Node,
        class: impl Into<String>,
        on_added: impl Fn() + 'static,
        on_removed: impl Fn() + 'static,
    ) -> Self {
        Self {
            surface,
            target,
            shared: Rc::new(ObserverShared {
                class: class.into(),
                state: Cell::new(Membership::Unknown),
                on_added: Box::new(on_added),
                on_removed: Box::new(on_removed),
            }),
            observer: None,
        }
    }

    /// Install the attribute-scoped subscription and begin observing.
    /// Calling `init` while already observing is a no-op.
    pub fn init(&mut self)
    where
        S::Node: 'static,
    {
        if self.observer.is_some() {
            return;
        }
        let shared = Rc::clone(&self.shared);
        let target = self.target;
        let sink: MutationSink<S::Node> =
            Rc::new(move |records| shared.apply(target, records));
        self.observer = Some(
            self.surface
                .observe(self.target, MutationFilter::ATTRIBUTES, sink),
        );
        debug!(target: "fdom::class_observer", class = %self.shared.class, "observing");
    }

    /// Cancel the subscription. Safe to call when never initialized.
    pub fn disconnect(&mut self) {
        if let Some(id) = self.observer.take() {
            self.surface.disconnect(id);
            debug!(target: "fdom::class_observer", class = %self.shared.class, "disconnected");
        }
    }

    /// Whether the subscription is currently installed.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    /// Last observed membership state.
    #[must_use]
    pub fn last_state(&self) -> Membership {
        self.shared.state.get()
    }

    /// The watched class name.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.shared.class
    }

    /// The observed node.
    #[must_use]
    pub fn target(&self) -> S::Node {
        self.target
    }
}

impl<S: ObserveAttributes> Drop for ClassObserver<S> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fdom_core::surface::DomSurface;
    use fdom_harness::Page;
    use std::cell::Cell;

    fn classes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    struct Fixture {
        page: Page,
        observer: ClassObserver<Page>,
        added: Rc<Cell<u32>>,
        removed: Rc<Cell<u32>>,
        el: <Page as DomSurface>::Node,
    }

    fn fixture(class: &str) -> Fixture {
        let page = Page::new();
        let el = page.create_element("div");
        let added = Rc::new(Cell::new(0));
        let removed = Rc::new(Cell::new(0));
        let added_cb = Rc::clone(&added);
        let removed_cb = Rc::clone(&removed);
        let observer = ClassObserver::new(
            page.clone(),
            el,
            class,
            move || added_cb.set(added_cb.get() + 1),
            move || removed_cb.set(removed_cb.get() + 1),
        );
        Fixture {
            page,
            observer,
            added,
            removed,
            el,
        }
    }

    #[test]
    fn add_then_redundant_add_then_remove() {
        let mut fx = fixture("active");
        fx.observer.init();

        fx.page.add_classes(fx.el, &classes(&["active"]));
        fx.page.flush();
        assert_eq!((fx.added.get(), fx.removed.get()), (1, 0));

        // Re-setting the class attribute with the class still present is a
        // delivered record but not a transition.
        fx.page.set_attribute(fx.el, "class", "active");
        fx.page.flush();
        assert_eq!((fx.added.get(), fx.removed.get()), (1, 0));

        fx.page.remove_classes(fx.el, &classes(&["active"]));
        fx.page.flush();
        assert_eq!((fx.added.get(), fx.removed.get()), (1, 1));
    }

    #[test]
    fn first_observed_state_fires_once_even_when_absent() {
        let mut fx = fixture("active");
        fx.observer.init();

        // A class mutation that never involves the watched class still
        // reveals "absent" as the first observed state.
        fx.page.add_classes(fx.el, &classes(&["other"]));
        fx.page.flush();
        assert_eq!((fx.added.get(), fx.removed.get()), (0, 1));
        assert_eq!(fx.observer.last_state(), Membership::Absent);

        fx.page.add_classes(fx.el, &classes(&["another"]));
        fx.page.flush();
        assert_eq!((fx.added.get(), fx.removed.get()), (0, 1));
    }

    #[test]
    fn inert_until_init() {
        let mut fx = fixture("active");
        fx.page.add_classes(fx.el, &classes(&["active"]));
        fx.page.flush();
        assert_eq!(fx.added.get(), 0);
        assert_eq!(fx.observer.last_state(), Membership::Unknown);

        fx.observer.init();
        assert!(fx.observer.is_observing());
        fx.page.remove_classes(fx.el, &classes(&["active"]));
        fx.page.flush();
        assert_eq!((fx.added.get(), fx.removed.get()), (0, 1));
    }

    #[test]
    fn disconnect_silences_and_is_safe_uninitialized() {
        let mut fx = fixture("active");

        // Never initialized: must not fail.
        fx.observer.disconnect();
        assert!(!fx.observer.is_observing());

        fx.observer.init();
        fx.page.add_classes(fx.el, &classes(&["active"]));
        fx.page.flush();
        assert_eq!(fx.added.get(), 1);

        fx.observer.disconnect();
        fx.page.remove_classes(fx.el, &classes(&["active"]));
        fx.page.flush();
        assert_eq!((fx.added.get(), fx.removed.get()), (1, 0));
    }

    #[test]
    fn reinit_while_observing_does_not_double_subscribe() {
        let mut fx = fixture("active");
        fx.observer.init();
        fx.observer.init();
        assert_eq!(fx.page.observer_count(), 1);

        fx.page.add_classes(fx.el, &classes(&["active"]));
        fx.page.flush();
        assert_eq!(fx.added.get(), 1);
    }

    #[test]
    fn non_class_attributes_are_ignored() {
        let mut fx = fixture("active");
        fx.observer.init();

        fx.page.set_attribute(fx.el, "title", "hello");
        fx.page.set_attribute(fx.el, "data-state", "active");
        fx.page.flush();
        assert_eq!((fx.added.get(), fx.removed.get()), (0, 0));
        assert_eq!(fx.observer.last_state(), Membership::Unknown);
    }

    #[test]
    fn multiple_transitions_in_one_batch_each_fire() {
        let mut fx = fixture("active");
        fx.observer.init();

        fx.page.add_classes(fx.el, &classes(&["active"]));
        fx.page.remove_classes(fx.el, &classes(&["active"]));
        fx.page.add_classes(fx.el, &classes(&["active"]));
        fx.page.flush();

        assert_eq!((fx.added.get(), fx.removed.get()), (2, 1));
        assert_eq!(fx.observer.last_state(), Membership::Present);
    }

    #[test]
    fn removing_the_whole_class_attribute_is_a_removal() {
        let mut fx = fixture("active");
        fx.observer.init();

        fx.page.add_classes(fx.el, &classes(&["active", "big"]));
        fx.page.flush();
        assert_eq!(fx.added.get(), 1);

        fx.page.remove_attribute(fx.el, "class");
        fx.page.flush();
        assert_eq!(fx.removed.get(), 1);
    }

    #[test]
    fn watched_class_matches_whole_names_only() {
        let mut fx = fixture("active");
        fx.observer.init();

        fx.page.set_attribute(fx.el, "class", "inactive activex");
        fx.page.flush();
        assert_eq!((fx.added.get(), fx.removed.get()), (0, 1));

        fx.page.set_attribute(fx.el, "class", "inactive active");
        fx.page.flush();
        assert_eq!((fx.added.get(), fx.removed.get()), (1, 1));
    }

    #[test]
    fn drop_disconnects() {
        let fx = fixture("active");
        let page = fx.page.clone();
        {
            let mut observer = fx.observer;
            observer.init();
            assert_eq!(page.observer_count(), 1);
        }
        assert_eq!(page.observer_count(), 0);
    }
}
