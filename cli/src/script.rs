//! Scripted gesture replay against a headless `EngineCore`.
//!
//! A script is a JSON array of events, each tagged by `"event"`:
//!
//! ```json
//! [
//!   { "event": "tool", "tool": "rectangle" },
//!   { "event": "pointer_down", "x": 100, "y": 300 },
//!   { "event": "pointer_up", "x": 300, "y": 350 },
//!   { "event": "key", "key": "z", "modifiers": { "meta": true } }
//! ]
//! ```
//!
//! Pointer coordinates are view pixels, exactly as a browser would report them.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::collections::BTreeMap;

use markup::annotation::{Annotation, AnnotationId, Point};
use markup::clock::{ManualClock, Millis};
use markup::engine::{Action, EngineCore};
use markup::input::{Button, Key, Modifiers, Tool};
use serde::Deserialize;

/// One scripted input event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Tool {
        tool: Tool,
    },
    Page {
        page: u32,
    },
    Select {
        id: Option<AnnotationId>,
    },
    Undo,
    Redo,
    EnterCrop {
        id: AnnotationId,
    },
    ConfirmCrop,
    CancelCrop,
    BeginTextEdit {
        id: AnnotationId,
    },
    /// Replace the text of the box currently open for editing.
    SetText {
        text: String,
    },
    EndTextEdit,
    InsertImage {
        page: u32,
        #[serde(default)]
        data: String,
        width: u32,
        height: u32,
    },
    /// Advance the replay clock.
    Wait {
        ms: Millis,
    },
    /// Next frame: lapses the post-gesture click suppression.
    Tick,
}

/// Parse a script document.
///
/// # Errors
///
/// Returns the parse error for anything that is not a JSON array of events.
pub fn parse(json: &str) -> Result<Vec<ScriptEvent>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Feed one event into the engine and return the actions it produced.
pub fn apply(core: &mut EngineCore, clock: &ManualClock, event: ScriptEvent) -> Vec<Action> {
    match event {
        ScriptEvent::PointerDown { x, y, button, modifiers } => core.on_pointer_down(Point::new(x, y), button, modifiers),
        ScriptEvent::PointerMove { x, y, modifiers } => core.on_pointer_move(Point::new(x, y), modifiers),
        ScriptEvent::PointerUp { x, y, button, modifiers } => core.on_pointer_up(Point::new(x, y), button, modifiers),
        ScriptEvent::Key { key, modifiers } => core.on_key_down(Key::new(key), modifiers),
        ScriptEvent::Tool { tool } => {
            core.set_tool(tool);
            Vec::new()
        }
        ScriptEvent::Page { page } => core.set_page(page),
        ScriptEvent::Select { id } => core.select(id),
        ScriptEvent::Undo => core.undo(),
        ScriptEvent::Redo => core.redo(),
        ScriptEvent::EnterCrop { id } => core.enter_crop_mode(id),
        ScriptEvent::ConfirmCrop => core.confirm_crop(),
        ScriptEvent::CancelCrop => core.cancel_crop(),
        ScriptEvent::BeginTextEdit { id } => core.begin_text_edit(id),
        ScriptEvent::SetText { text } => match core.ui.editing {
            Some(id) => core.set_text(id, &text),
            None => {
                tracing::warn!("set_text with no box open for editing");
                Vec::new()
            }
        },
        ScriptEvent::EndTextEdit => core.end_text_edit(),
        ScriptEvent::InsertImage { page, data, width, height } => core.insert_image(page, data, width, height),
        ScriptEvent::Wait { ms } => {
            clock.advance(ms);
            Vec::new()
        }
        ScriptEvent::Tick => {
            core.tick();
            Vec::new()
        }
    }
}

/// Replay every event in order. Returns the number of actions emitted.
pub fn replay(core: &mut EngineCore, clock: &ManualClock, events: Vec<ScriptEvent>) -> usize {
    let mut emitted = 0;
    for (index, event) in events.into_iter().enumerate() {
        let actions = apply(core, clock, event);
        tracing::debug!(index, actions = actions.len(), state = core.input.name(), "event replayed");
        emitted += actions.len();
    }
    emitted
}

/// Per-page annotation counts by variant name.
#[must_use]
pub fn summarize(annotations: &[Annotation]) -> BTreeMap<u32, BTreeMap<&'static str, usize>> {
    let mut pages: BTreeMap<u32, BTreeMap<&'static str, usize>> = BTreeMap::new();
    for annotation in annotations {
        *pages.entry(annotation.page).or_default().entry(annotation.kind_name()).or_default() += 1;
    }
    pages
}
