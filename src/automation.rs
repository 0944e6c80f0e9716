//! Frame-clocked parameter automation.
//!
//! Every running automation owns exactly one [`Slot`], a parameter on a
//! target. Starting a new automation on an occupied slot supersedes the old
//! one in the same call, so no two writers ever race on a value. The
//! scheduler is advanced once per clock tick from the control thread and
//! pushes each new value through a [`ParamSink`].

use std::collections::HashMap;

use log::debug;

use crate::registry::EntityId;
use crate::voice::VoiceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Voice(VoiceId),
    Entity(EntityId),
}

/// The value an automation writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    Volume,
    Emissive,
    Elevation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    pub target: Target,
    pub param: Param,
}

impl Slot {
    pub fn new(target: Target, param: Param) -> Self {
        Self { target, param }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Ambient,
    Gesture,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AutomationKind {
    FadeIn,
    FadeOut,
    Glow,
    Bob,
    HighlightAssert,
    HighlightRelease,
}

impl AutomationKind {
    pub fn label(&self) -> &'static str {
        match self {
            AutomationKind::FadeIn => "fade-in",
            AutomationKind::FadeOut => "fade-out",
            AutomationKind::Glow => "glow",
            AutomationKind::Bob => "bob",
            AutomationKind::HighlightAssert => "highlight",
            AutomationKind::HighlightRelease => "highlight-release",
        }
    }

    /// Idle animations yield to anything a gesture starts.
    pub fn priority(&self) -> Priority {
        match self {
            AutomationKind::Glow | AutomationKind::Bob => Priority::Ambient,
            _ => Priority::Gesture,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    /// Stops at the bound it is heading for.
    OneShot,
    /// Reflects off either bound forever.
    Oscillating,
}

/// A linear, fixed-increment ramp between two bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ramp {
    value: f32,
    step: f32,
    lo: f32,
    hi: f32,
    motion: Motion,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub value: f32,
    pub finished: bool,
}

impl Ramp {
    /// One-shot ramp from `from` to `to`, `increment` per tick.
    pub fn toward(from: f32, to: f32, increment: f32) -> Self {
        let increment = increment.abs();
        let (lo, hi) = if to >= from { (from, to) } else { (to, from) };
        let step = if to >= from { increment } else { -increment };
        Self {
            value: from,
            step,
            lo,
            hi,
            motion: Motion::OneShot,
        }
    }

    /// Endless ramp between `lo` and `hi`, starting at `from` (clamped into
    /// range) and initially rising when `rising` is set.
    pub fn oscillate(from: f32, lo: f32, hi: f32, increment: f32, rising: bool) -> Self {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let increment = increment.abs();
        Self {
            value: from.clamp(lo, hi),
            step: if rising { increment } else { -increment },
            lo,
            hi,
            motion: Motion::Oscillating,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_rising(&self) -> bool {
        self.step >= 0.0
    }

    /// Applies one tick. A value within half a step of a bound snaps onto
    /// it, so accumulated rounding never leaves a ramp one tick short.
    pub fn advance(&mut self) -> Step {
        let tolerance = self.step.abs() * 0.5;
        let next = self.value + self.step;
        let rising = self.is_rising();
        let hit_hi = rising && next >= self.hi - tolerance;
        let hit_lo = !rising && next <= self.lo + tolerance;
        if !(hit_hi || hit_lo) {
            self.value = next;
            return Step {
                value: self.value,
                finished: false,
            };
        }
        self.value = if hit_hi { self.hi } else { self.lo };
        match self.motion {
            Motion::OneShot => Step {
                value: self.value,
                finished: true,
            },
            Motion::Oscillating => {
                self.step = -self.step;
                Step {
                    value: self.value,
                    finished: false,
                }
            }
        }
    }
}

/// Lifecycle of one automation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutomationState {
    Running,
    /// Running with a zero step; resumes from the same value.
    Held,
    Completed,
    Superseded,
    Cancelled,
}

impl AutomationState {
    pub fn is_active(&self) -> bool {
        matches!(self, AutomationState::Running | AutomationState::Held)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AutomationId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AutomationHandle {
    pub id: AutomationId,
    pub slot: Slot,
    pub kind: AutomationKind,
}

/// Receives every value the scheduler produces.
pub trait ParamSink {
    fn apply(&mut self, slot: Slot, value: f32);
}

struct Automation {
    id: AutomationId,
    kind: AutomationKind,
    ramp: Ramp,
    held: bool,
}

#[derive(Default)]
pub struct Scheduler {
    next_id: u64,
    active: HashMap<Slot, Automation>,
    outcomes: HashMap<Slot, (AutomationId, AutomationState)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `ramp` on `slot`, superseding whatever runs there. Returns
    /// `None` when a higher-priority automation owns the slot.
    pub fn start(&mut self, slot: Slot, kind: AutomationKind, ramp: Ramp) -> Option<AutomationHandle> {
        if let Some(current) = self.active.get(&slot) {
            if current.kind.priority() > kind.priority() {
                debug!(
                    "{} refused on {:?}: {} owns the slot",
                    kind.label(),
                    slot,
                    current.kind.label()
                );
                return None;
            }
        }
        if let Some(previous) = self.active.remove(&slot) {
            debug!("{} supersedes {} on {:?}", kind.label(), previous.kind.label(), slot);
            self.outcomes
                .insert(slot, (previous.id, AutomationState::Superseded));
        }
        let id = AutomationId(self.next_id);
        self.next_id += 1;
        self.active.insert(
            slot,
            Automation {
                id,
                kind,
                ramp,
                held: false,
            },
        );
        Some(AutomationHandle { id, slot, kind })
    }

    /// Stops the automation on `slot`. The parameter keeps its last value.
    pub fn cancel(&mut self, slot: Slot) -> bool {
        match self.active.remove(&slot) {
            Some(automation) => {
                debug!("{} cancelled on {:?}", automation.kind.label(), slot);
                self.outcomes
                    .insert(slot, (automation.id, AutomationState::Cancelled));
                true
            }
            None => false,
        }
    }

    pub fn cancel_target(&mut self, target: Target) -> usize {
        let slots: Vec<Slot> = self
            .active
            .keys()
            .filter(|slot| slot.target == target)
            .copied()
            .collect();
        slots.into_iter().filter(|slot| self.cancel(*slot)).count()
    }

    pub fn cancel_all(&mut self) -> usize {
        let slots: Vec<Slot> = self.active.keys().copied().collect();
        slots.into_iter().filter(|slot| self.cancel(*slot)).count()
    }

    /// Freezes or releases the automation on `slot` without cancelling it.
    pub fn set_held(&mut self, slot: Slot, held: bool) -> bool {
        match self.active.get_mut(&slot) {
            Some(automation) => {
                automation.held = held;
                true
            }
            None => false,
        }
    }

    /// Advances every unheld automation by one step.
    pub fn tick(&mut self, sink: &mut impl ParamSink) {
        let mut completed = Vec::new();
        self.active.retain(|slot, automation| {
            if automation.held {
                return true;
            }
            let step = automation.ramp.advance();
            sink.apply(*slot, step.value);
            if step.finished {
                completed.push((*slot, automation.id, automation.kind));
            }
            !step.finished
        });
        for (slot, id, kind) in completed {
            debug!("{} completed on {:?}", kind.label(), slot);
            self.outcomes.insert(slot, (id, AutomationState::Completed));
        }
    }

    /// Current state of `handle`, or `None` once its record has been
    /// replaced by a later automation's outcome on the same slot.
    pub fn state(&self, handle: AutomationHandle) -> Option<AutomationState> {
        if let Some(automation) = self.active.get(&handle.slot) {
            if automation.id == handle.id {
                return Some(if automation.held {
                    AutomationState::Held
                } else {
                    AutomationState::Running
                });
            }
        }
        match self.outcomes.get(&handle.slot) {
            Some((id, state)) if *id == handle.id => Some(*state),
            _ => None,
        }
    }

    pub fn kind_at(&self, slot: Slot) -> Option<AutomationKind> {
        self.active.get(&slot).map(|automation| automation.kind)
    }

    pub fn is_active(&self, slot: Slot) -> bool {
        self.active.contains_key(&slot)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
