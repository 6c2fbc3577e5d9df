//! Apply API Demonstration
//!
//! Edits a report design through `apply()` and shows what each step leaves
//! behind.
#![allow(clippy::unwrap_used, clippy::expect_used)]
//!
//! Key concepts illustrated:
//! 1. Command-based editing with one transaction per command
//! 2. Rejected commands leave the design untouched
//! 3. Notifications fire once per committed transaction
//! 4. Undo and redo, with the post-commit semantic check

use rdm_core::activity::{ListenerScope, Notification};
use rdm_core::schema::{slots, ElementKind, SlotId};
use rdm_core::{apply, DesignCommand, ElementId, Module, RemoveStrategy};

fn create(module: &mut Module, kind: ElementKind) -> ElementId {
    apply(module, DesignCommand::CreateElement { kind })
        .unwrap()
        .element()
        .unwrap()
}

fn attach(module: &mut Module, content: ElementId, slot: SlotId) -> rdm_core::Result<()> {
    let container = module.root();
    apply(
        module,
        DesignCommand::AddContent {
            container,
            content,
            location: slot.into(),
            position: None,
        },
    )
    .map(|_| ())
}

fn rename(module: &mut Module, element: ElementId, name: &str) -> rdm_core::Result<()> {
    apply(
        module,
        DesignCommand::SetName {
            element,
            name: Some(name.to_string()),
        },
    )
    .map(|_| ())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Report Design Apply Demo ===\n");

    let mut module = Module::report_design()?;
    module.add_listener(
        ListenerScope::All,
        Box::new(|n: &Notification| {
            println!("  event {:?} on {} ({:?})", n.event, n.target, n.cause)
        }),
    );

    // ===== Part 1: Building =====
    println!("## Part 1: Building\n");

    let page = create(&mut module, ElementKind::SimpleMasterPage);
    rename(&mut module, page, "default")?;
    attach(&mut module, page, slots::PAGES)?;

    let style = create(&mut module, ElementKind::Style);
    rename(&mut module, style, "title")?;
    attach(&mut module, style, slots::STYLES)?;

    let label = create(&mut module, ElementKind::Label);
    attach(&mut module, label, slots::BODY)?;
    apply(
        &mut module,
        DesignCommand::SetStyle {
            element: label,
            style: Some(style),
        },
    )?;
    println!("✓ Page, style and styled label added\n");

    // ===== Part 2: Rejection =====
    println!("## Part 2: Rejected command\n");

    let twin = create(&mut module, ElementKind::Style);
    rename(&mut module, twin, "title")?;
    let before = module.state_digest()?;
    let err = attach(&mut module, twin, slots::STYLES).unwrap_err();
    assert_eq!(module.state_digest()?, before);
    println!("✓ Second 'title' style refused: {}\n", err);

    // ===== Part 3: Remove, undo, redo =====
    println!("## Part 3: Remove with reference cleanup\n");

    apply(
        &mut module,
        DesignCommand::RemoveContent {
            content: style,
            strategy: RemoveStrategy::Unresolve,
        },
    )?;
    println!("Errors after removing the style: {}", module.all_errors().len());
    for e in module.all_errors() {
        println!("  {}", e.message);
    }

    println!("\nUndo '{}'", module.stack().undo_label().unwrap_or("?"));
    apply(&mut module, DesignCommand::Undo)?;
    println!("Errors after undo: {}", module.all_errors().len());

    apply(&mut module, DesignCommand::Redo)?;
    println!("✓ Redo done, dirty = {}", module.is_dirty());

    println!("\n=== Demo Complete ===");
    Ok(())
}
