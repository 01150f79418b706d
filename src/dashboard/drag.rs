use crate::dashboard::store::{LayoutError, LayoutStore};

/// Transient drag-gesture state. Exists only for the duration of one
/// gesture and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging { widget_id: String },
}

/// What a completed drop did to the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The dragged widget moved to the target's slot and the store was
    /// reordered (and its sink notified).
    Moved,
    /// Dropping a widget onto itself; no reorder, no persistence call.
    NoOp,
    /// Dragged or target widget vanished mid-gesture; treated as a cancel.
    Cancelled,
}

/// State machine for the dashboard drag gesture. At most one drag is
/// active at a time, which serializes all reorder mutations on the single
/// UI thread.
#[derive(Default)]
pub struct DragController {
    state: Option<String>,
    hover_target: Option<String>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        match &self.state {
            Some(id) => DragState::Dragging {
                widget_id: id.clone(),
            },
            None => DragState::Idle,
        }
    }

    pub fn dragging_id(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    /// Widget currently hovered as a drop target, for visual affordance.
    pub fn hover_target(&self) -> Option<&str> {
        self.hover_target.as_deref()
    }

    /// Begin dragging `widget_id`. Starting a new drag while one is active
    /// implicitly cancels the previous gesture (last writer wins; drags are
    /// never queued). Unknown ids degrade to a cancel.
    pub fn drag_start(&mut self, widget_id: &str, store: &LayoutStore) {
        self.hover_target = None;
        if !store.contains(widget_id) {
            self.state = None;
            return;
        }
        self.state = Some(widget_id.to_string());
    }

    /// Record the widget currently under the pointer. No state transition,
    /// only the hover affordance changes. Ignored while idle.
    pub fn drag_over(&mut self, target_id: &str) {
        if self.state.is_some() {
            self.hover_target = Some(target_id.to_string());
        }
    }

    /// Complete the gesture by dropping onto `target_id`. The dragged
    /// widget is spliced out of its position and re-inserted at the
    /// target's original index; everything between shifts by one. This is
    /// not a swap. Ends in `Idle` regardless of outcome.
    pub fn drop_on(
        &mut self,
        target_id: &str,
        store: &mut LayoutStore,
    ) -> Result<DropOutcome, LayoutError> {
        self.hover_target = None;
        let Some(dragged) = self.state.take() else {
            return Ok(DropOutcome::Cancelled);
        };
        if dragged == target_id {
            return Ok(DropOutcome::NoOp);
        }

        let mut order = store.ids();
        let Some(from) = order.iter().position(|id| *id == dragged) else {
            // Dragged widget was removed mid-gesture by a concurrent action.
            return Ok(DropOutcome::Cancelled);
        };
        let Some(to) = order.iter().position(|id| id == target_id) else {
            return Ok(DropOutcome::Cancelled);
        };
        let moved = order.remove(from);
        let to = to.min(order.len());
        order.insert(to, moved);

        store.reorder(&order)?;
        Ok(DropOutcome::Moved)
    }

    /// Abort the gesture (released outside any drop target). Never errors.
    pub fn cancel(&mut self) {
        self.state = None;
        self.hover_target = None;
    }
}
