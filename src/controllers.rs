use volumes::EntityId;

/// Minimum press duration on a sphere before it counts as a selection.
pub const MIN_HOLD_SECS: f32 = 0.2;

/// Left-button state for one frame, plus whatever sphere sits under the
/// cursor.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerFrame {
    pub hovered: Option<EntityId>,
    pub pressed: bool,
    pub down: bool,
    pub released: bool,
    pub moved: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    /// Click on empty floor.
    Place,
    Begin(EntityId),
    Change(EntityId),
    End(EntityId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum PointerState {
    Idle,
    Pressing { id: EntityId, held: f32 },
    Selecting(EntityId),
}

pub struct PointerController {
    state: PointerState,
    min_hold: f32,
}

impl PointerController {
    pub fn new() -> Self {
        Self {
            state: PointerState::Idle,
            min_hold: MIN_HOLD_SECS,
        }
    }

    pub fn selected(&self) -> Option<EntityId> {
        match self.state {
            PointerState::Selecting(id) => Some(id),
            _ => None,
        }
    }

    pub fn handle(&mut self, frame: PointerFrame, dt: f32) -> Option<PointerEvent> {
        if frame.pressed {
            match frame.hovered {
                Some(id) => self.state = PointerState::Pressing { id, held: 0.0 },
                None => {
                    self.state = PointerState::Idle;
                    return Some(PointerEvent::Place);
                }
            }
        }

        if frame.released {
            let previous = std::mem::replace(&mut self.state, PointerState::Idle);
            return match previous {
                PointerState::Selecting(id) => Some(PointerEvent::End(id)),
                _ => None,
            };
        }

        if !frame.down {
            return None;
        }

        match self.state {
            PointerState::Pressing { id, held } => {
                if frame.hovered != Some(id) {
                    self.state = PointerState::Idle;
                    return None;
                }
                let held = held + dt.max(0.0);
                if held >= self.min_hold {
                    self.state = PointerState::Selecting(id);
                    Some(PointerEvent::Begin(id))
                } else {
                    self.state = PointerState::Pressing { id, held };
                    None
                }
            }
            PointerState::Selecting(id) if frame.moved => Some(PointerEvent::Change(id)),
            _ => None,
        }
    }
}
