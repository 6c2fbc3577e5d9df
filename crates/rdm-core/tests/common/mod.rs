use std::sync::{Arc, Mutex};

use rdm_core::activity::{ListenerScope, Notification};
use rdm_core::ops::{content_ops, name_ops};
use rdm_core::schema::{slots, ElementKind, SlotId};
use rdm_core::{ElementId, Module};

/// Create an element, name it, and append it to `slot` of `container`
#[allow(dead_code)]
pub fn add_named(
    module: &mut Module,
    container: ElementId,
    slot: SlotId,
    kind: ElementKind,
    name: &str,
) -> ElementId {
    let id = module.create_element(kind).unwrap();
    name_ops::set_name(module, id, Some(name)).unwrap();
    content_ops::add(module, container, id, slot.into(), None).unwrap();
    id
}

/// Create an unnamed element and append it to `slot` of `container`
#[allow(dead_code)]
pub fn add_unnamed(module: &mut Module, container: ElementId, slot: SlotId, kind: ElementKind) -> ElementId {
    let id = module.create_element(kind).unwrap();
    content_ops::add(module, container, id, slot.into(), None).unwrap();
    id
}

/// Report design with the master page every design needs
#[allow(dead_code)]
pub fn report_with_page() -> Module {
    let mut module = Module::report_design().unwrap();
    let root = module.root();
    add_named(&mut module, root, slots::PAGES, ElementKind::SimpleMasterPage, "page");
    module
}

/// Shared log of every notification a module delivers
#[allow(dead_code)]
pub fn record_notifications(module: &mut Module) -> Arc<Mutex<Vec<Notification>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    module.add_listener(
        ListenerScope::All,
        Box::new(move |n: &Notification| sink.lock().unwrap().push(n.clone())),
    );
    seen
}

/// Ids held by `slot` of `container`
#[allow(dead_code)]
pub fn slot_contents(module: &Module, container: ElementId, slot: SlotId) -> Vec<ElementId> {
    module.element(container).unwrap().content(&slot.into()).to_vec()
}
