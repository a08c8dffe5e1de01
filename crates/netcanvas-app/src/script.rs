//! Event scripts: a recorded sequence of editor inputs, replayed headlessly.

use netcanvas_core::{ActiveFloor, Editor, HistoryError, Outcome, PointerInput, ToolKind, ViewKind, WheelInput};
use serde::Deserialize;

/// One scripted input.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    Down(PointerInput),
    Move(PointerInput),
    Up(PointerInput),
    Wheel(WheelInput),
    Tool { tool: ToolKind },
    View { view: ViewKind },
    #[serde(rename_all = "camelCase")]
    Floor { building_id: Option<String>, floor: Option<usize> },
    Cancel,
    Undo,
    Redo,
    /// Record any pending history snapshot.
    Flush,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Feed every step to the editor, returning the outcome of each pointer step.
pub fn replay(editor: &mut Editor, script: &Script) -> Result<Vec<Outcome>, HistoryError> {
    let mut outcomes = Vec::new();
    for (index, step) in script.steps.iter().enumerate() {
        log::debug!("Step {index}: {step:?}");
        let outcome = match step {
            Step::Down(input) => editor.on_pointer_down(input),
            Step::Move(input) => editor.on_pointer_move(input),
            Step::Up(input) => editor.on_pointer_up(input),
            Step::Wheel(input) => editor.on_wheel(input),
            Step::Tool { tool } => {
                editor.set_tool(*tool);
                continue;
            }
            Step::View { view } => {
                editor.set_view(*view);
                continue;
            }
            Step::Floor { building_id, floor } => {
                let active = building_id.clone().map(|building_id| ActiveFloor {
                    building_id,
                    floor: floor.unwrap_or(0),
                });
                editor.set_active_floor(active);
                continue;
            }
            Step::Cancel => {
                editor.cancel();
                continue;
            }
            Step::Undo => {
                editor.undo()?;
                continue;
            }
            Step::Redo => {
                editor.redo()?;
                continue;
            }
            Step::Flush => {
                editor.flush_history()?;
                continue;
            }
        };
        if outcome != Outcome::None {
            log::info!("Step {index}: {outcome:?}");
        }
        outcomes.push(outcome);
    }
    editor.flush_history()?;
    Ok(outcomes)
}
