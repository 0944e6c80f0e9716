use anyhow::{Context, Result, anyhow};
use cpal::{
    SampleFormat, SizedSample, Stream, StreamError,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use log::{error, info, warn};
use tokio::sync::watch;

use crate::{
    config::FALLBACK_SAMPLE_RATE,
    mixer::MixBus,
    voice::{Voice, VoiceControl},
};

const OUTPUT_CEILING: f32 = 0.98;

/// Fixed topology: two voices, each through its own send chain, summed on
/// one bus. Only scalar parameters change once built.
pub struct AudioGraph {
    voices: [Voice; 2],
    bus: MixBus,
    voice_buffer: [f32; 2],
}

impl AudioGraph {
    pub fn new(voices: [Voice; 2], master_level: f32) -> Self {
        Self {
            voices,
            bus: MixBus::new(master_level),
            voice_buffer: [0.0; 2],
        }
    }

    pub fn from_controls(controls: &[VoiceControl; 2], master_level: f32, sample_rate: f32) -> Self {
        let voices = [
            controls[0].build_voice(sample_rate),
            controls[1].build_voice(sample_rate),
        ];
        Self::new(voices, master_level)
    }

    pub fn next_sample(&mut self) -> f32 {
        for (slot, voice) in self.voice_buffer.iter_mut().zip(self.voices.iter_mut()) {
            *slot = voice.next_sample();
        }
        self.bus.mix(&self.voice_buffer)
    }

    pub fn render(&mut self, out: &mut [f32]) {
        for slot in out.iter_mut() {
            *slot = self.next_sample();
        }
    }
}

/// The audio device seen from the session.
pub trait AudioOutput {
    /// Sample rate the device would open with right now.
    fn current_sample_rate(&mut self) -> Result<f32>;

    /// Hands the graph to the device and begins pulling samples.
    fn start(&mut self, graph: AudioGraph) -> Result<()>;

    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Notifies the control thread whenever the device's rate changes.
    fn sample_rate_updates(&self) -> watch::Receiver<f32>;
}

pub struct CpalOutput {
    stream: Option<Stream>,
    sample_rate_tx: watch::Sender<f32>,
}

impl CpalOutput {
    pub fn new() -> Self {
        let (sample_rate_tx, _) = watch::channel(FALLBACK_SAMPLE_RATE);
        Self {
            stream: None,
            sample_rate_tx,
        }
    }

    fn publish_sample_rate(&self, rate: f32) {
        self.sample_rate_tx.send_if_modified(|current| {
            if *current == rate {
                false
            } else {
                *current = rate;
                true
            }
        });
    }
}

impl Default for CpalOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn default_output() -> Result<(cpal::Device, cpal::SupportedStreamConfig)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No default audio output"))?;
    let supported = device
        .default_output_config()
        .context("querying default output config")?;
    Ok((device, supported))
}

impl AudioOutput for CpalOutput {
    fn current_sample_rate(&mut self) -> Result<f32> {
        let (_, supported) = default_output()?;
        let rate = supported.sample_rate().0 as f32;
        self.publish_sample_rate(rate);
        Ok(rate)
    }

    fn start(&mut self, graph: AudioGraph) -> Result<()> {
        if self.stream.is_some() {
            warn!("audio output already running, restarting");
            self.stop();
        }
        let (device, supported) = default_output()?;
        let config = supported.config();
        let stream = match supported.sample_format() {
            SampleFormat::F32 => build_stream(&device, &config, graph, |sample| sample)?,
            SampleFormat::F64 => build_stream(&device, &config, graph, |sample| sample as f64)?,
            SampleFormat::I16 => build_stream(&device, &config, graph, to_i16)?,
            SampleFormat::I32 => build_stream(&device, &config, graph, to_i32)?,
            SampleFormat::U16 => build_stream(&device, &config, graph, to_u16)?,
            SampleFormat::U8 => build_stream(&device, &config, graph, to_u8)?,
            other => {
                error!("output device wants {other} samples, which are not supported");
                return Err(anyhow!("unsupported sample format {other}"));
            }
        };
        stream.play().context("starting output stream")?;
        self.publish_sample_rate(config.sample_rate.0 as f32);
        info!(
            "audio output running at {} Hz, {} channel(s)",
            config.sample_rate.0, config.channels
        );
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.pause() {
                warn!("pausing output stream: {err}");
            }
            info!("audio output stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    fn sample_rate_updates(&self) -> watch::Receiver<f32> {
        self.sample_rate_tx.subscribe()
    }
}

fn build_stream<T, F>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut graph: AudioGraph,
    convert: F,
) -> Result<Stream>
where
    T: SizedSample + Send + 'static,
    F: Fn(f32) -> T + Send + 'static,
{
    let channels = config.channels as usize;
    let stream = device.build_output_stream(
        config,
        move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
            fill_output_buffer(output, channels, &mut graph, &convert);
        },
        |err: StreamError| error!("audio stream error: {err}"),
        None,
    )?;
    Ok(stream)
}

fn to_i16(sample: f32) -> i16 {
    (sample * i16::MAX as f32) as i16
}

fn to_i32(sample: f32) -> i32 {
    (sample as f64 * i32::MAX as f64) as i32
}

/// Unsigned formats centre silence at half scale.
fn to_u16(sample: f32) -> u16 {
    ((sample * 0.5 + 0.5).clamp(0.0, 1.0) * u16::MAX as f32) as u16
}

fn to_u8(sample: f32) -> u8 {
    ((sample * 0.5 + 0.5).clamp(0.0, 1.0) * u8::MAX as f32) as u8
}

fn fill_output_buffer<T, F>(output: &mut [T], channels: usize, graph: &mut AudioGraph, convert: &F)
where
    F: Fn(f32) -> T,
    T: Copy,
{
    for frame in output.chunks_mut(channels.max(1)) {
        let value = convert(graph.next_sample().clamp(-OUTPUT_CEILING, OUTPUT_CEILING));
        for channel in frame {
            *channel = value;
        }
    }
}
