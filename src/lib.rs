//! Glowing spheres that sing when touched.
//!
//! The control side (session, scheduler, registry) runs on one frame-clocked
//! thread. The audio side (voices, send chains, mix bus) runs inside the
//! output device's callback and only ever reads scalar parameters the control
//! side publishes through atomics.

pub mod atomic;
pub mod automation;
pub mod clock;
pub mod config;
pub mod effects;
pub mod mixer;
pub mod notes;
pub mod oscillator;
pub mod output;
pub mod palette;
pub mod registry;
pub mod session;
pub mod voice;

pub use automation::{AutomationKind, AutomationState, Param, Ramp, Scheduler, Slot, Target};
pub use config::{AnimationConfig, SessionConfig, SynthConfig};
pub use output::{AudioGraph, AudioOutput, CpalOutput};
pub use registry::{EntityId, EntityRegistry, VisualHandle};
pub use session::{GestureSink, Location, SceneRenderer, Session};
pub use voice::{VoiceControl, VoiceId};
