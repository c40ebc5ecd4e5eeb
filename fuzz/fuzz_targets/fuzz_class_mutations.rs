#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use fdom_behaviors::ClassObserver;
use fdom_core::surface::DomSurface;
use fdom_harness::Page;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    AddWatched,
    RemoveWatched,
    AddOther,
    RemoveOther,
    RewriteClassAttr { classes: Vec<u8> },
    RemoveClassAttr,
    SetUnrelatedAttr,
    Flush,
}

fuzz_target!(|ops: Vec<Op>| {
    let page = Page::new();
    let el = page.create_element("div");

    let edges = Rc::new(Cell::new(0u64));
    let added = Rc::clone(&edges);
    let removed = Rc::clone(&edges);
    let mut observer = ClassObserver::new(
        page.clone(),
        el,
        "active",
        move || added.set(added.get() + 1),
        move || removed.set(removed.get() + 1),
    );
    observer.init();

    // Reference model: edge count of the membership signal, evaluated per
    // class-attribute record.
    let mut previous: Option<bool> = None;
    let mut expected = 0u64;

    for op in ops {
        let before = page.pending_records();
        match op {
            Op::AddWatched => page.add_classes(el, &["active".to_string()]),
            Op::RemoveWatched => page.remove_classes(el, &["active".to_string()]),
            Op::AddOther => page.add_classes(el, &["other".to_string()]),
            Op::RemoveOther => page.remove_classes(el, &["other".to_string()]),
            Op::RewriteClassAttr { classes } => {
                let names: Vec<String> = classes
                    .iter()
                    .take(4)
                    .map(|b| match b % 3 {
                        0 => "active".to_string(),
                        1 => "other".to_string(),
                        _ => "third".to_string(),
                    })
                    .collect();
                page.set_attribute(el, "class", &names.join(" "));
            }
            Op::RemoveClassAttr => page.remove_attribute(el, "class"),
            Op::SetUnrelatedAttr => {
                page.set_attribute(el, "title", "t");
                continue;
            }
            Op::Flush => {
                page.flush();
                continue;
            }
        }
        if page.pending_records() > before {
            let current = page.has_class(el, "active");
            if previous != Some(current) {
                expected += 1;
            }
            previous = Some(current);
        }
    }
    page.flush();

    assert_eq!(edges.get(), expected);
});
