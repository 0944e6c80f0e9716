#![allow(dead_code)]

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use tokio::sync::watch;
use volumes::palette::Tint;
use volumes::{AudioGraph, AudioOutput, EntityId, Location, SceneRenderer, VisualHandle};

#[derive(Clone, Debug)]
pub struct Visual {
    pub id: EntityId,
    pub tint: Tint,
    pub location: Location,
    pub emissive: f32,
    pub offset: f32,
}

#[derive(Default)]
pub struct FakeRenderer {
    pub visuals: HashMap<VisualHandle, Visual>,
    next_handle: u64,
}

impl FakeRenderer {
    pub fn visual_for(&self, id: EntityId) -> Option<&Visual> {
        self.visuals.values().find(|visual| visual.id == id)
    }
}

impl SceneRenderer for FakeRenderer {
    fn create_visual(&mut self, id: EntityId, tint: Tint, location: Location) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.visuals.insert(
            handle,
            Visual {
                id,
                tint,
                location,
                emissive: 0.0,
                offset: 0.0,
            },
        );
        handle
    }

    fn set_emissive_intensity(&mut self, handle: VisualHandle, intensity: f32) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.emissive = intensity;
        }
    }

    fn set_vertical_offset(&mut self, handle: VisualHandle, offset: f32) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.offset = offset;
        }
    }
}

/// Audio device double. Holds the graph it was given so tests can pull
/// samples the way a device callback would.
pub struct FakeOutput {
    pub device_available: bool,
    pub rate: f32,
    pub start_attempts: usize,
    graph: Option<AudioGraph>,
    sample_rate_tx: watch::Sender<f32>,
}

impl FakeOutput {
    pub fn new(rate: f32) -> Self {
        let (sample_rate_tx, _) = watch::channel(rate);
        Self {
            device_available: true,
            rate,
            start_attempts: 0,
            graph: None,
            sample_rate_tx,
        }
    }

    pub fn unavailable(rate: f32) -> Self {
        Self {
            device_available: false,
            ..Self::new(rate)
        }
    }

    pub fn change_sample_rate(&mut self, rate: f32) {
        self.rate = rate;
        self.sample_rate_tx.send_replace(rate);
    }

    pub fn pull(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        if let Some(graph) = self.graph.as_mut() {
            graph.render(&mut out);
        }
        out
    }
}

impl AudioOutput for FakeOutput {
    fn current_sample_rate(&mut self) -> Result<f32> {
        if self.device_available {
            Ok(self.rate)
        } else {
            Err(anyhow!("No default audio output"))
        }
    }

    fn start(&mut self, graph: AudioGraph) -> Result<()> {
        self.start_attempts += 1;
        if !self.device_available {
            return Err(anyhow!("device refused to start"));
        }
        self.graph = Some(graph);
        Ok(())
    }

    fn stop(&mut self) {
        self.graph = None;
    }

    fn is_running(&self) -> bool {
        self.graph.is_some()
    }

    fn sample_rate_updates(&self) -> watch::Receiver<f32> {
        self.sample_rate_tx.subscribe()
    }
}
