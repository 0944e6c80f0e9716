use anyhow::Result;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;

use crate::automation::{AutomationKind, Param, ParamSink, Ramp, Scheduler, Slot, Target};
use crate::config::SessionConfig;
use crate::notes::{NoteEventGenerator, PitchPair};
use crate::output::{AudioGraph, AudioOutput};
use crate::palette::{Tint, random_tint};
use crate::registry::{EntityId, EntityRegistry, VisualHandle};
use crate::voice::{VoiceControl, VoiceId};

/// World-space position handed over by the renderer's hit test.
pub type Location = [f32; 3];

/// What the session needs from whoever draws the spheres.
pub trait SceneRenderer {
    fn create_visual(&mut self, id: EntityId, tint: Tint, location: Location) -> VisualHandle;
    fn set_emissive_intensity(&mut self, handle: VisualHandle, intensity: f32);
    fn set_vertical_offset(&mut self, handle: VisualHandle, offset: f32);
}

/// Selection lifecycle reported by the input side.
pub trait GestureSink {
    fn on_select_begin(&mut self, id: EntityId);
    fn on_select_change(&mut self, id: EntityId);
    fn on_select_end(&mut self, id: EntityId);
}

/// Routes scheduler output to voices and visuals.
struct SceneTargets<'a, R> {
    voices: &'a [VoiceControl; 2],
    registry: &'a mut EntityRegistry,
    renderer: &'a mut R,
}

impl<R: SceneRenderer> ParamSink for SceneTargets<'_, R> {
    fn apply(&mut self, slot: Slot, value: f32) {
        match (slot.target, slot.param) {
            (Target::Voice(voice), Param::Volume) => {
                self.voices[voice.index()].set_volume(value);
            }
            (Target::Entity(id), Param::Emissive) => {
                if let Some(record) = self.registry.lookup_mut(id) {
                    record.emissive = value;
                    self.renderer.set_emissive_intensity(record.handle, value);
                }
            }
            (Target::Entity(id), Param::Elevation) => {
                if let Some(record) = self.registry.lookup_mut(id) {
                    record.elevation = value;
                    self.renderer.set_vertical_offset(record.handle, value);
                }
            }
            (target, param) => debug!("no {param:?} parameter on {target:?}"),
        }
    }
}

/// Owns the voices, the scheduler and the entity registry, and is the only
/// piece that talks to the renderer and the audio device.
pub struct Session<R, O> {
    config: SessionConfig,
    renderer: R,
    output: O,
    voices: [VoiceControl; 2],
    scheduler: Scheduler,
    registry: EntityRegistry,
    notes: NoteEventGenerator,
    rng: StdRng,
    sample_rate_rx: watch::Receiver<f32>,
    pitch: PitchPair,
    next_entity: u64,
}

impl<R: SceneRenderer, O: AudioOutput> Session<R, O> {
    pub fn new(renderer: R, output: O, config: SessionConfig) -> Self {
        let voices = [
            VoiceControl::new(VoiceId::Treble, &config.synth.treble),
            VoiceControl::new(VoiceId::Bass, &config.synth.bass),
        ];
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let notes = NoteEventGenerator::default();
        let pitch = notes.next_pair(&mut rng);
        let sample_rate_rx = output.sample_rate_updates();
        let session = Self {
            config,
            renderer,
            output,
            voices,
            scheduler: Scheduler::new(),
            registry: EntityRegistry::new(),
            notes,
            rng,
            sample_rate_rx,
            pitch,
            next_entity: 1,
        };
        session.apply_pitch(pitch);
        session
    }

    /// Opens the audio device. On failure the session stays silent but
    /// fully usable, and calling this again retries.
    pub fn start_audio(&mut self) -> Result<()> {
        let rate = self.output.current_sample_rate().map_err(|err| {
            error!("failed to start audio engine: {err:#}");
            err
        })?;
        self.on_sample_rate_changed(rate);
        let graph = AudioGraph::from_controls(&self.voices, self.config.synth.master_level, rate);
        self.output.start(graph).map_err(|err| {
            error!("failed to start audio engine: {err:#}");
            err
        })?;
        self.sample_rate_rx.borrow_and_update();
        info!("audio started at {rate} Hz");
        Ok(())
    }

    pub fn is_audio_running(&self) -> bool {
        self.output.is_running()
    }

    pub fn on_sample_rate_changed(&mut self, hz: f32) {
        for voice in &self.voices {
            voice.oscillator().set_sample_rate(hz);
        }
        debug!("oscillators now at {hz} Hz");
    }

    /// Creates a visual at `location` and starts its idle animations.
    pub fn placement_requested(&mut self, location: Location) -> EntityId {
        let id = EntityId::new(self.next_entity);
        self.next_entity += 1;
        let tint = random_tint(&mut self.rng);
        let handle = self.renderer.create_visual(id, tint, location);
        debug!("{id} requested at {location:?}");
        self.on_entity_placed(id, handle);
        id
    }

    pub fn on_entity_placed(&mut self, id: EntityId, handle: VisualHandle) {
        let anim = self.config.animation;
        if self.registry.contains(id) {
            self.scheduler.cancel_target(Target::Entity(id));
        }
        self.next_entity = self.next_entity.max(id.raw() + 1);
        let record = self.registry.register(id, handle, anim.min_emissive);
        self.renderer.set_emissive_intensity(handle, anim.min_emissive);
        self.renderer.set_vertical_offset(handle, 0.0);

        let glow = Ramp::oscillate(
            anim.min_emissive,
            anim.min_emissive,
            anim.max_emissive,
            anim.emissive_increment,
            true,
        );
        // Rises from the placement height to the top of its travel and back.
        let bob = Ramp::oscillate(0.0, 0.0, anim.bob_amplitude, anim.bob_increment, true);
        let target = Target::Entity(id);
        if let Some(handle) = self
            .scheduler
            .start(Slot::new(target, Param::Emissive), AutomationKind::Glow, glow)
        {
            record.track(handle);
        }
        if let Some(handle) = self
            .scheduler
            .start(Slot::new(target, Param::Elevation), AutomationKind::Bob, bob)
        {
            record.track(handle);
        }
        info!("{id} placed, {} in scene", self.registry.len());
    }

    /// Advances every automation by one clock period.
    pub fn tick(&mut self) {
        if let Ok(true) = self.sample_rate_rx.has_changed() {
            let rate = *self.sample_rate_rx.borrow_and_update();
            self.on_sample_rate_changed(rate);
        }
        let mut targets = SceneTargets {
            voices: &self.voices,
            registry: &mut self.registry,
            renderer: &mut self.renderer,
        };
        self.scheduler.tick(&mut targets);
    }

    /// Cancels every automation where it stands and stops audio.
    pub fn teardown(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        self.output.stop();
        info!("scene torn down, {cancelled} automation(s) cancelled");
    }

    fn apply_pitch(&self, pitch: PitchPair) {
        self.voices[VoiceId::Treble.index()].set_frequency(pitch.treble);
        self.voices[VoiceId::Bass.index()].set_frequency(pitch.bass);
    }

    fn start_fade(&mut self, kind: AutomationKind, to: f32) {
        let increment = self.config.animation.fade_increment;
        for voice in &self.voices {
            let from = voice.volume();
            voice.set_target_level(to);
            let slot = Slot::new(Target::Voice(voice.id()), Param::Volume);
            self.scheduler.start(slot, kind, Ramp::toward(from, to, increment));
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn voice(&self, id: VoiceId) -> &VoiceControl {
        &self.voices[id.index()]
    }

    pub fn pitch(&self) -> PitchPair {
        self.pitch
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}

impl<R: SceneRenderer, O: AudioOutput> GestureSink for Session<R, O> {
    fn on_select_begin(&mut self, id: EntityId) {
        let anim = self.config.animation;
        let Some(record) = self.registry.lookup_mut(id) else {
            warn!("selection began on unknown {id}");
            return;
        };
        record.selected = true;
        let target = Target::Entity(id);
        let highlight = Ramp::toward(record.emissive, anim.max_emissive, anim.emissive_increment);
        if let Some(handle) = self.scheduler.start(
            Slot::new(target, Param::Emissive),
            AutomationKind::HighlightAssert,
            highlight,
        ) {
            record.track(handle);
        }
        self.scheduler
            .set_held(Slot::new(target, Param::Elevation), true);

        let pitch = self.notes.next_pair(&mut self.rng);
        self.pitch = pitch;
        self.apply_pitch(pitch);
        debug!("{id} selected, bass {} Hz treble {} Hz", pitch.bass, pitch.treble);
        self.start_fade(AutomationKind::FadeIn, 1.0);
    }

    fn on_select_change(&mut self, id: EntityId) {
        debug!("selection changed on {id}");
    }

    fn on_select_end(&mut self, id: EntityId) {
        let anim = self.config.animation;
        let Some(record) = self.registry.lookup_mut(id) else {
            warn!("selection ended on unknown {id}");
            return;
        };
        if !record.selected {
            debug!("{id} was not selected, ignoring release");
            return;
        }
        record.selected = false;
        let target = Target::Entity(id);
        let release = Ramp::toward(record.emissive, anim.min_emissive, anim.emissive_increment);
        if let Some(handle) = self.scheduler.start(
            Slot::new(target, Param::Emissive),
            AutomationKind::HighlightRelease,
            release,
        ) {
            record.track(handle);
        }
        self.scheduler
            .set_held(Slot::new(target, Param::Elevation), false);
        debug!("{id} released");
        self.start_fade(AutomationKind::FadeOut, 0.0);
    }
}
