#![allow(clippy::float_cmp)]

use std::rc::Rc;

use markup::annotation::{AnnotationKind, Rect};
use markup::config::EditorConfig;
use markup::transform::Viewport;

use super::*;

fn engine() -> (EngineCore, ManualClock) {
    let clock = ManualClock::new(1_000);
    let core = EngineCore::new(Viewport::new(800.0, 1000.0, 1.0), EditorConfig::default(), Rc::new(clock.clone()));
    (core, clock)
}

// =============================================================
// Parsing
// =============================================================

#[test]
fn parses_tagged_events_with_defaults() {
    let events = parse(
        r#"[
            { "event": "tool", "tool": "rectangle" },
            { "event": "pointer_down", "x": 1, "y": 2 },
            { "event": "key", "key": "z", "modifiers": { "meta": true } },
            { "event": "wait", "ms": 500 },
            { "event": "undo" }
        ]"#,
    )
    .unwrap();
    assert_eq!(events.len(), 5);
    assert_eq!(events[0], ScriptEvent::Tool { tool: Tool::Rectangle });
    assert_eq!(
        events[1],
        ScriptEvent::PointerDown { x: 1.0, y: 2.0, button: Button::Primary, modifiers: Modifiers::default() }
    );
    let ScriptEvent::Key { modifiers, .. } = &events[2] else {
        panic!("expected key event");
    };
    assert!(modifiers.meta && !modifiers.shift);
}

#[test]
fn rejects_unknown_events() {
    assert!(parse(r#"[{ "event": "teleport" }]"#).is_err());
    assert!(parse(r#"{ "event": "undo" }"#).is_err());
}

// =============================================================
// Replay
// =============================================================

#[test]
fn replays_rectangle_drag() {
    let (mut core, clock) = engine();
    let events = parse(
        r#"[
            { "event": "tool", "tool": "rectangle" },
            { "event": "pointer_down", "x": 100, "y": 300 },
            { "event": "pointer_move", "x": 200, "y": 320 },
            { "event": "pointer_up", "x": 300, "y": 350 }
        ]"#,
    )
    .unwrap();
    let emitted = replay(&mut core, &clock, events);
    assert!(emitted > 0);
    let all = core.store.get_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].rect(), Some(Rect::new(100.0, 650.0, 200.0, 50.0)));
}

#[test]
fn replays_freetext_typing_as_one_entry() {
    let (mut core, clock) = engine();
    let events = parse(
        r#"[
            { "event": "tool", "tool": "free_text" },
            { "event": "pointer_down", "x": 100, "y": 300 },
            { "event": "pointer_up", "x": 100, "y": 300 },
            { "event": "set_text", "text": "H" },
            { "event": "wait", "ms": 200 },
            { "event": "set_text", "text": "Hi" },
            { "event": "end_text_edit" }
        ]"#,
    )
    .unwrap();
    replay(&mut core, &clock, events);
    assert_eq!(core.history.past_len(), 1);
    let all = core.store.get_all();
    let AnnotationKind::FreeText(text) = &all[0].kind else {
        panic!("expected freetext");
    };
    assert_eq!(text.text, "Hi");
}

#[test]
fn wait_advances_clock() {
    let (mut core, clock) = engine();
    apply(&mut core, &clock, ScriptEvent::Wait { ms: 250 });
    assert_eq!(core.store.now_ms(), 1_250);
}

#[test]
fn set_text_without_editor_is_ignored() {
    let (mut core, clock) = engine();
    assert!(apply(&mut core, &clock, ScriptEvent::SetText { text: "x".into() }).is_empty());
}

// =============================================================
// Summary
// =============================================================

#[test]
fn summarize_counts_per_page_and_kind() {
    let (mut core, clock) = engine();
    apply(&mut core, &clock, ScriptEvent::InsertImage { page: 2, data: String::new(), width: 10, height: 10 });
    apply(&mut core, &clock, ScriptEvent::InsertImage { page: 2, data: String::new(), width: 10, height: 10 });
    apply(&mut core, &clock, ScriptEvent::Tool { tool: Tool::StickyNote });
    apply(&mut core, &clock, ScriptEvent::PointerDown { x: 5.0, y: 5.0, button: Button::Primary, modifiers: Modifiers::default() });

    let annotations: Vec<Annotation> = core.store.get_all().into_iter().cloned().collect();
    let pages = summarize(&annotations);
    assert_eq!(pages[&2]["image"], 2);
    assert_eq!(pages[&1]["sticky_note"], 1);
    assert_eq!(pages.len(), 2);
}
