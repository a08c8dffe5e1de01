//! Editor: the entry point tying canvas, interaction and history together.

use crate::canvas::{ActiveFloor, Canvas};
use crate::config::EngineConfig;
use crate::history::{HistoryError, HistoryManager};
use crate::id::{IdGenerator, UuidIdGenerator};
use crate::input::{PointerInput, WheelInput};
use crate::interaction::{InteractionHandler, Mode, Outcome};
use crate::model::{Diagram, ViewKind};
use crate::path::{PathResult, find_path_to_uplink};
use crate::selection::SelectionState;
use crate::tools::ToolKind;
use crate::viewport::Viewport;
use kurbo::Point;
use std::time::Instant;

/// Direction of a history step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Undo,
    Redo,
}

/// Owns the diagram being edited and everything needed to interact with it.
#[derive(Debug)]
pub struct Editor {
    canvas: Canvas,
    interaction: InteractionHandler,
    history: HistoryManager,
    ids: Box<dyn IdGenerator>,
}

impl Editor {
    /// Create an editor. The initial diagram is recorded as the first history entry.
    pub fn new(diagram: Diagram, config: EngineConfig) -> Result<Self, HistoryError> {
        let mut history = HistoryManager::new(config.history_capacity, config.debounce());
        history.capture(&diagram)?;
        Ok(Self {
            canvas: Canvas::new(diagram, config),
            interaction: InteractionHandler::new(),
            history,
            ids: Box::new(UuidIdGenerator),
        })
    }

    /// Use a different source of room/wall ids.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn diagram(&self) -> &Diagram {
        &self.canvas.diagram
    }

    /// Direct access for external editing. Call [`Editor::notify_changed`] afterwards.
    pub fn diagram_mut(&mut self) -> &mut Diagram {
        &mut self.canvas.diagram
    }

    /// The diagram was changed from outside the canvas.
    pub fn notify_changed(&mut self) {
        self.canvas.selection.retain_existing(&self.canvas.diagram);
        self.history.schedule(Instant::now());
    }

    pub fn selection(&self) -> &SelectionState {
        &self.canvas.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.canvas.viewport
    }

    pub fn mode(&self) -> &Mode {
        self.interaction.mode()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Screen point to diagram space.
    pub fn diagram_point(&self, screen: Point) -> Point {
        self.canvas.diagram_point(screen)
    }

    pub fn on_pointer_down(&mut self, input: &PointerInput) -> Outcome {
        let outcome = self.interaction.handle_pointer_down(&mut self.canvas, input);
        self.after(outcome)
    }

    pub fn on_pointer_move(&mut self, input: &PointerInput) -> Outcome {
        let outcome = self.interaction.handle_pointer_move(&mut self.canvas, input);
        self.after(outcome)
    }

    pub fn on_pointer_up(&mut self, input: &PointerInput) -> Outcome {
        let outcome = self
            .interaction
            .handle_pointer_up(&mut self.canvas, self.ids.as_mut(), input);
        self.after(outcome)
    }

    /// Zoom around the wheel position.
    pub fn on_wheel(&mut self, input: &WheelInput) -> Outcome {
        let sensitivity = self.canvas.config.wheel_sensitivity;
        self.canvas.viewport.apply_wheel(input.position, input.delta_y, sensitivity);
        Outcome::ViewChanged
    }

    fn after(&mut self, outcome: Outcome) -> Outcome {
        if outcome.mutates_diagram() {
            self.history.schedule(Instant::now());
        }
        outcome
    }

    /// Abort the current gesture (escape).
    pub fn cancel(&mut self) {
        self.interaction.cancel(&mut self.canvas);
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.cancel();
        if self.canvas.tool != tool {
            log::debug!("Tool: {:?} -> {:?}", self.canvas.tool, tool);
            self.canvas.tool = tool;
        }
    }

    pub fn set_view(&mut self, view: ViewKind) {
        self.cancel();
        self.canvas.view = view;
    }

    /// Show a floor plan. Returns false if the building or floor does not exist.
    pub fn set_active_floor(&mut self, active: Option<ActiveFloor>) -> bool {
        if let Some(floor) = &active {
            if self.canvas.diagram.floor(&floor.building_id, floor.floor).is_none() {
                log::warn!("No floor {} in building {}", floor.floor, floor.building_id);
                return false;
            }
        }
        self.cancel();
        self.canvas.active_floor = active;
        true
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.canvas.set_viewport_size(width, height);
    }

    pub fn fit_to_content(&mut self) {
        self.canvas.fit_to_content();
    }

    /// Record a pending snapshot once its debounce deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Result<bool, HistoryError> {
        self.history.poll(now, &self.canvas.diagram)
    }

    /// Record a pending snapshot right away.
    pub fn flush_history(&mut self) -> Result<bool, HistoryError> {
        self.history.flush(&self.canvas.diagram)
    }

    /// Restore the previous snapshot. Returns false at the oldest entry.
    pub fn undo(&mut self) -> Result<bool, HistoryError> {
        self.step(Step::Undo)
    }

    /// Restore the next snapshot. Returns false at the newest entry.
    pub fn redo(&mut self) -> Result<bool, HistoryError> {
        self.step(Step::Redo)
    }

    fn step(&mut self, step: Step) -> Result<bool, HistoryError> {
        self.cancel();
        self.history.flush(&self.canvas.diagram)?;

        let snapshot = match step {
            Step::Undo => self.history.undo(),
            Step::Redo => self.history.redo(),
        };
        let restored = match snapshot {
            Some(snapshot) => snapshot.restore(),
            None => return Ok(false),
        };

        let diagram = match restored {
            Ok(diagram) => diagram,
            Err(e) => {
                log::warn!("{step:?} rejected: {e}");
                match step {
                    Step::Undo => self.history.redo(),
                    Step::Redo => self.history.undo(),
                };
                return Err(e);
            }
        };

        self.canvas.diagram = diagram;
        self.canvas.selection.retain_existing(&self.canvas.diagram);
        if let Some(active) = &self.canvas.active_floor {
            if self.canvas.diagram.floor(&active.building_id, active.floor).is_none() {
                self.canvas.active_floor = None;
            }
        }
        log::info!(
            "{step:?}: restored snapshot {} of {}",
            self.history.cursor() + 1,
            self.history.len()
        );
        Ok(true)
    }

    /// Shortest path from a device to the nearest uplink.
    pub fn find_path_to_uplink(&self, device: &str) -> PathResult {
        find_path_to_uplink(&self.canvas.diagram, device)
    }
}
