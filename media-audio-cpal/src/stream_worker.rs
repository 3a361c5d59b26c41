//! One thread per open device, owning its cpal stream.
//!
//! cpal streams can not move between threads, so each stream is built and
//! dropped on its worker and controlled through a command channel. Audio
//! flows through a lock-free byte ring between the stream callback and the
//! subsystem:
//!
//! ```text
//! capture:  [input callback] → downmix → HeapProd<u8> ══ HeapCons<u8> → dequeue_audio
//! playback: queue_audio → HeapProd<u8> ══ HeapCons<u8> → [output callback] (silence on underrun)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, SampleFormat, SampleRate, Stream, StreamConfig};
use crossbeam_channel::{bounded, unbounded, Sender};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use media_audio_core::{AudioSpec, Direction};

use crate::convert;
use crate::error::BackendError;

/// Seconds of audio a device queue holds before new data is dropped.
const QUEUE_SECONDS: usize = 2;

/// The subsystem's end of a device's byte queue.
pub(crate) enum DeviceQueue {
    Capture(HeapCons<u8>),
    Playback(HeapProd<u8>),
}

/// The stream callback's end of the queue.
enum StreamEnd {
    Capture(HeapProd<u8>),
    Playback(HeapCons<u8>),
}

enum Command {
    Pause(bool),
    Close,
}

pub(crate) struct StreamWorker {
    commands: Sender<Command>,
    stopped: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl StreamWorker {
    /// Build a paused stream for `device` on a new worker thread.
    ///
    /// Returns once the stream exists, or with the error that prevented it.
    pub fn spawn(
        device: Device,
        name: &str,
        direction: Direction,
        spec: &AudioSpec,
    ) -> Result<(Self, DeviceQueue), BackendError> {
        let (config, sample_format) = choose_config(&device, name, direction, spec.clock_rate)?;

        let capacity = (spec.bytes_per_second() * QUEUE_SECONDS).max(4096);
        let (producer, consumer) = HeapRb::<u8>::new(capacity).split();
        let (queue, end) = match direction {
            Direction::Capture => (DeviceQueue::Capture(consumer), StreamEnd::Capture(producer)),
            Direction::Playback => (DeviceQueue::Playback(producer), StreamEnd::Playback(consumer)),
        };

        let stopped = Arc::new(AtomicBool::new(false));
        let (command_tx, command_rx) = unbounded::<Command>();
        let (ready_tx, ready_rx) = bounded::<Result<(), BackendError>>(1);

        let worker_stopped = Arc::clone(&stopped);
        let handle = thread::Builder::new()
            .name(format!("cpal-{}", direction))
            .spawn(move || {
                let stream = match build_stream(&device, &config, sample_format, end, Arc::clone(&worker_stopped)) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                if let Err(e) = stream.pause() {
                    log::debug!("Stream can not start paused: {}", e);
                }
                let _ = ready_tx.send(Ok(()));

                for command in command_rx {
                    match command {
                        Command::Pause(paused) => {
                            let result = if paused { stream.pause() } else { stream.play() };
                            if let Err(e) = result {
                                log::warn!("Failed to {} stream: {}", if paused { "pause" } else { "play" }, e);
                                worker_stopped.store(true, Ordering::SeqCst);
                            }
                        }
                        Command::Close => break,
                    }
                }
                drop(stream);
            })
            .map_err(|e| BackendError::Spawn(e.to_string()))?;

        let opened = ready_rx.recv().unwrap_or(Err(BackendError::WorkerGone));
        if let Err(e) = opened {
            let _ = handle.join();
            return Err(e);
        }

        log::debug!(
            "{} stream for [{}]: {} Hz, {} ch, {:?}",
            direction,
            name,
            config.sample_rate.0,
            config.channels,
            sample_format
        );
        let worker = Self {
            commands: command_tx,
            stopped,
            handle: Some(handle),
        };
        Ok((worker, queue))
    }

    pub fn pause(&self, paused: bool) {
        if self.commands.send(Command::Pause(paused)).is_err() {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    /// Set once the stream reported an error (typically the device going
    /// away) or the worker exited.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst) || self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for StreamWorker {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Close);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Audio stream worker panicked");
            }
        }
    }
}

/// Pick a mono-most i16/f32 configuration that runs at exactly `clock_rate`.
fn choose_config(
    device: &Device,
    name: &str,
    direction: Direction,
    clock_rate: u32,
) -> Result<(StreamConfig, SampleFormat), BackendError> {
    let ranges: Vec<_> = match direction {
        Direction::Capture => device.supported_input_configs()?.collect(),
        Direction::Playback => device.supported_output_configs()?.collect(),
    };

    let range = ranges
        .into_iter()
        .filter(|r| matches!(r.sample_format(), SampleFormat::I16 | SampleFormat::F32))
        .filter(|r| r.min_sample_rate().0 <= clock_rate && clock_rate <= r.max_sample_rate().0)
        .min_by_key(|r| (r.channels(), r.sample_format() != SampleFormat::I16))
        .ok_or_else(|| BackendError::UnsupportedRate {
            name: name.to_string(),
            clock_rate,
        })?;

    let sample_format = range.sample_format();
    let config = range.with_sample_rate(SampleRate(clock_rate)).config();
    Ok((config, sample_format))
}

fn build_stream(
    device: &Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    end: StreamEnd,
    stopped: Arc<AtomicBool>,
) -> Result<Stream, BackendError> {
    let channels = config.channels as usize;
    let on_error = move |err: cpal::StreamError| {
        log::error!("Audio stream error: {}", err);
        stopped.store(true, Ordering::SeqCst);
    };

    let stream = match (end, sample_format) {
        (StreamEnd::Capture(mut producer), SampleFormat::I16) => {
            let mut scratch = Vec::new();
            device.build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    convert::i16_frames_to_mono_bytes(data, channels, &mut scratch);
                    // Drops data when the queue is full.
                    let _ = producer.push_slice(&scratch);
                },
                on_error,
                None,
            )?
        }
        (StreamEnd::Capture(mut producer), _) => {
            let mut scratch = Vec::new();
            device.build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    convert::f32_frames_to_mono_bytes(data, channels, &mut scratch);
                    let _ = producer.push_slice(&scratch);
                },
                on_error,
                None,
            )?
        }
        (StreamEnd::Playback(mut consumer), SampleFormat::I16) => {
            let mut scratch = Vec::new();
            device.build_output_stream(
                config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len() / channels.max(1) * 2, 0u8);
                    let read = consumer.pop_slice(&mut scratch);
                    convert::mono_bytes_to_i16_frames(&scratch[..read], channels, data);
                },
                on_error,
                None,
            )?
        }
        (StreamEnd::Playback(mut consumer), _) => {
            let mut scratch = Vec::new();
            device.build_output_stream(
                config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len() / channels.max(1) * 2, 0u8);
                    let read = consumer.pop_slice(&mut scratch);
                    convert::mono_bytes_to_f32_frames(&scratch[..read], channels, data);
                },
                on_error,
                None,
            )?
        }
    };
    Ok(stream)
}
