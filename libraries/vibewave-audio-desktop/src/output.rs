//! CPAL-backed audio device
//!
//! Two worker threads sit behind [`CpalDevice`]:
//! - the audio thread owns the CPAL stream and all transport state
//! - the loader thread downloads, decodes and resamples media
//!
//! The caller talks to both through channels, so every `AudioDevice`
//! method returns immediately. Outcomes come back as [`DeviceEvent`]s on
//! the sender supplied at construction.

use crate::decode::{decode_bytes, extension_hint, resample};
use crate::error::{AudioError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use vibewave_playback::{AudioDevice, DeviceEvent, LoadTicket};

/// How often the audio thread reports the playhead while playing
const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Download timeouts for media files
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Commands sent to the audio thread
enum AudioCommand {
    /// Swap in freshly decoded media
    Install {
        ticket: LoadTicket,
        samples: Arc<Vec<f32>>,
        duration: f64,
    },
    /// The loader gave up on a request
    LoadFailed { ticket: LoadTicket, reason: String },
    Play,
    Pause,
    Seek(Duration),
    SetGain(f32),
    Unload,
    Shutdown,
}

/// Work item for the loader thread
struct LoadJob {
    ticket: LoadTicket,
    url: String,
}

/// Transport state seen by the output callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    Stopped,
    Playing,
    Paused,
}

/// Shared state between the audio thread, the loader and the callback
struct AudioState {
    /// Interleaved stereo samples at the device rate
    buffer: Mutex<Arc<Vec<f32>>>,
    /// Playhead in frames
    position: AtomicUsize,
    transport: Mutex<Transport>,
    /// Linear gain applied in the callback
    gain: Mutex<f32>,
    /// Set by the callback when it runs off the end of the buffer
    ended: AtomicBool,
    /// Latest load request (0 = none)
    requested: AtomicU64,
    /// Media currently in `buffer` (0 = none)
    installed: AtomicU64,
    sample_rate: u32,
}

impl AudioState {
    fn new(sample_rate: u32) -> Self {
        Self {
            buffer: Mutex::new(Arc::new(Vec::new())),
            position: AtomicUsize::new(0),
            transport: Mutex::new(Transport::Stopped),
            gain: Mutex::new(1.0),
            ended: AtomicBool::new(false),
            requested: AtomicU64::new(0),
            installed: AtomicU64::new(0),
            sample_rate,
        }
    }

    fn transport(&self) -> MutexGuard<'_, Transport> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current_request(&self, ticket: LoadTicket) -> bool {
        self.requested.load(Ordering::Acquire) == ticket.0
    }

    fn position_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.position.load(Ordering::Relaxed) as f64 / f64::from(self.sample_rate)
    }
}

/// CPAL audio device
///
/// Implements [`AudioDevice`] on the default output device. Media is
/// fetched over HTTP(S) or read from a local path, decoded with
/// symphonia and converted to the device rate with rubato. The previous
/// track keeps its state until the new one is fully decoded.
pub struct CpalDevice {
    command_tx: Sender<AudioCommand>,
    load_tx: Option<Sender<LoadJob>>,
    state: Arc<AudioState>,
    sample_rate: u32,
    audio_thread: Option<JoinHandle<()>>,
    loader_thread: Option<JoinHandle<()>>,
}

impl CpalDevice {
    /// Open the default output device.
    ///
    /// Fails when no device exists or the stream cannot be started.
    pub fn new(events: Sender<DeviceEvent>) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;

        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate();
        let config = config.config();

        Self::with_device_and_config(device, config, sample_rate, events)
    }

    fn with_device_and_config(
        device: Device,
        config: StreamConfig,
        sample_rate: u32,
        events: Sender<DeviceEvent>,
    ) -> Result<Self> {
        let state = Arc::new(AudioState::new(sample_rate));
        let (command_tx, command_rx) = bounded::<AudioCommand>(32);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let audio_state = Arc::clone(&state);
        let audio_thread = thread::Builder::new()
            .name("vibewave-audio".into())
            .spawn(move || {
                audio_thread_run(&device, &config, &audio_state, &command_rx, &events, &ready_tx);
            })?;

        ready_rx
            .recv()
            .map_err(|e| AudioError::WorkerGone(e.to_string()))??;

        let (load_tx, load_rx) = unbounded::<LoadJob>();
        let loader_state = Arc::clone(&state);
        let loader_commands = command_tx.clone();
        let loader_thread = thread::Builder::new()
            .name("vibewave-loader".into())
            .spawn(move || {
                loader_thread_run(&load_rx, &loader_commands, &loader_state, sample_rate);
            })?;

        tracing::info!("Audio output ready at {} Hz", sample_rate);

        Ok(Self {
            command_tx,
            load_tx: Some(load_tx),
            state,
            sample_rate,
            audio_thread: Some(audio_thread),
            loader_thread: Some(loader_thread),
        })
    }

    /// Output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Current playhead in seconds
    pub fn position(&self) -> f64 {
        self.state.position_secs()
    }

    fn send(&self, command: AudioCommand) -> vibewave_playback::Result<()> {
        self.command_tx
            .send(command)
            .map_err(|e| AudioError::WorkerGone(e.to_string()).into())
    }
}

impl AudioDevice for CpalDevice {
    fn load(&mut self, ticket: LoadTicket, url: &str) -> vibewave_playback::Result<()> {
        self.state.requested.store(ticket.0, Ordering::Release);
        let job = LoadJob {
            ticket,
            url: url.to_string(),
        };
        self.load_tx
            .as_ref()
            .ok_or_else(|| AudioError::WorkerGone("loader stopped".to_string()))?
            .send(job)
            .map_err(|e| AudioError::WorkerGone(e.to_string()))?;
        Ok(())
    }

    fn play(&mut self) -> vibewave_playback::Result<()> {
        self.send(AudioCommand::Play)
    }

    fn pause(&mut self) -> vibewave_playback::Result<()> {
        self.send(AudioCommand::Pause)
    }

    fn seek(&mut self, position: Duration) -> vibewave_playback::Result<()> {
        self.send(AudioCommand::Seek(position))
    }

    fn set_gain(&mut self, gain: f32) -> vibewave_playback::Result<()> {
        self.send(AudioCommand::SetGain(gain.clamp(0.0, 1.0)))
    }

    fn unload(&mut self) -> vibewave_playback::Result<()> {
        self.state.requested.store(0, Ordering::Release);
        self.send(AudioCommand::Unload)
    }
}

impl Drop for CpalDevice {
    fn drop(&mut self) {
        // Closing the job channel ends the loader loop
        self.load_tx.take();
        let _ = self.command_tx.send(AudioCommand::Shutdown);

        // The loader may be mid-download; let it finish detached
        self.loader_thread.take();
        if let Some(handle) = self.audio_thread.take() {
            let _ = handle.join();
        }
    }
}

/// Audio thread main loop
///
/// Owns the CPAL stream for its whole life. The stream runs continuously
/// and renders silence unless the transport is `Playing`.
fn audio_thread_run(
    device: &Device,
    config: &StreamConfig,
    state: &Arc<AudioState>,
    commands: &Receiver<AudioCommand>,
    events: &Sender<DeviceEvent>,
    ready: &Sender<Result<()>>,
) {
    let stream = match build_stream(device, config, state) {
        Ok(stream) => {
            let _ = ready.send(Ok(()));
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    let mut last_progress = Instant::now();

    loop {
        match commands.recv_timeout(PROGRESS_INTERVAL) {
            Ok(AudioCommand::Install {
                ticket,
                samples,
                duration,
            }) => {
                if !state.is_current_request(ticket) {
                    tracing::debug!("Dropping superseded media {}", ticket);
                    continue;
                }
                {
                    let mut buffer = state.buffer.lock().unwrap_or_else(PoisonError::into_inner);
                    *buffer = samples;
                }
                state.position.store(0, Ordering::Relaxed);
                state.ended.store(false, Ordering::Relaxed);
                state.installed.store(ticket.0, Ordering::Release);
                *state.transport() = Transport::Paused;
                let _ = events.send(DeviceEvent::Loaded { ticket, duration });
            }
            Ok(AudioCommand::LoadFailed { ticket, reason }) => {
                if state.is_current_request(ticket) {
                    let _ = events.send(DeviceEvent::Failed { ticket, reason });
                }
            }
            Ok(AudioCommand::Play) => {
                if state.installed.load(Ordering::Acquire) != 0 {
                    state.ended.store(false, Ordering::Relaxed);
                    *state.transport() = Transport::Playing;
                }
            }
            Ok(AudioCommand::Pause) => {
                let mut transport = state.transport();
                if *transport == Transport::Playing {
                    *transport = Transport::Paused;
                }
            }
            Ok(AudioCommand::Seek(to)) => {
                let frames = (to.as_secs_f64() * f64::from(state.sample_rate)) as usize;
                let len = state
                    .buffer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .len()
                    / 2;
                state.position.store(frames.min(len), Ordering::Relaxed);
            }
            Ok(AudioCommand::SetGain(gain)) => {
                *state.gain.lock().unwrap_or_else(PoisonError::into_inner) = gain;
            }
            Ok(AudioCommand::Unload) => {
                *state.transport() = Transport::Stopped;
                *state.buffer.lock().unwrap_or_else(PoisonError::into_inner) = Arc::new(Vec::new());
                state.position.store(0, Ordering::Relaxed);
                state.installed.store(0, Ordering::Release);
            }
            Ok(AudioCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let installed = LoadTicket(state.installed.load(Ordering::Acquire));
        if state.ended.swap(false, Ordering::AcqRel) && installed.0 != 0 {
            let _ = events.send(DeviceEvent::Ended { ticket: installed });
        } else if *state.transport() == Transport::Playing
            && last_progress.elapsed() >= PROGRESS_INTERVAL
        {
            last_progress = Instant::now();
            let _ = events.send(DeviceEvent::Progress {
                ticket: installed,
                position: state.position_secs(),
            });
        }
    }

    drop(stream);
    tracing::debug!("Audio thread stopped");
}

fn build_stream(device: &Device, config: &StreamConfig, state: &Arc<AudioState>) -> Result<Stream> {
    let channels = usize::from(config.channels);
    let callback_state = Arc::clone(state);
    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            audio_callback(data, channels, &callback_state);
        },
        |err| tracing::error!("Audio stream error: {}", err),
        None,
    )?;
    stream.play()?;
    Ok(stream)
}

/// Output callback (runs on the real-time audio thread)
fn audio_callback(output: &mut [f32], channels: usize, state: &AudioState) {
    if channels == 0 || *state.transport() != Transport::Playing {
        output.fill(0.0);
        return;
    }

    let gain = *state.gain.lock().unwrap_or_else(PoisonError::into_inner);
    let buffer = {
        let guard = state.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    };
    let total_frames = buffer.len() / 2;
    let mut frame = state.position.load(Ordering::Relaxed);

    for out in output.chunks_mut(channels) {
        if frame >= total_frames {
            out.fill(0.0);
            continue;
        }
        let left = buffer[frame * 2] * gain;
        let right = buffer[frame * 2 + 1] * gain;
        match out {
            [mono] => *mono = (left + right) * 0.5,
            [l, r, rest @ ..] => {
                *l = left;
                *r = right;
                rest.fill(0.0);
            }
            [] => {}
        }
        frame += 1;
    }

    state.position.store(frame.min(total_frames), Ordering::Relaxed);
    if frame >= total_frames {
        *state.transport() = Transport::Stopped;
        state.ended.store(true, Ordering::Release);
    }
}

/// Loader thread main loop
///
/// Handles one job at a time. Jobs superseded while queued are skipped
/// without any network traffic.
fn loader_thread_run(
    jobs: &Receiver<LoadJob>,
    commands: &Sender<AudioCommand>,
    state: &AudioState,
    target_rate: u32,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start loader runtime: {}", e);
            return;
        }
    };

    let client = match reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("VibeWave/", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to create HTTP client: {}", e);
            return;
        }
    };

    while let Ok(job) = jobs.recv() {
        if !state.is_current_request(job.ticket) {
            tracing::debug!("Skipping superseded load {}", job.ticket);
            continue;
        }

        tracing::debug!("Loading {} from {}", job.ticket, job.url);
        let outcome = runtime
            .block_on(fetch_media(&client, &job.url))
            .and_then(|bytes| decode_bytes(bytes, extension_hint(&job.url)))
            .and_then(|audio| resample(audio, target_rate));

        let command = match outcome {
            Ok(audio) => AudioCommand::Install {
                ticket: job.ticket,
                duration: audio.duration_secs(),
                samples: Arc::new(audio.samples),
            },
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", job.url, e);
                AudioCommand::LoadFailed {
                    ticket: job.ticket,
                    reason: e.to_string(),
                }
            }
        };

        if commands.send(command).is_err() {
            break;
        }
    }
}

/// Fetch the raw bytes behind a media reference.
///
/// `http(s)://` references are downloaded; `file://` and bare paths are
/// read from disk.
async fn fetch_media(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    if url.starts_with("http://") || url.starts_with("https://") {
        let response = client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        return Ok(bytes.to_vec());
    }

    let path = url.strip_prefix("file://").unwrap_or(url);
    Ok(tokio::fs::read(path).await?)
}
