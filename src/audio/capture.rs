use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, Stream};
use ringbuf::traits::{Producer, Split};
use ringbuf::{HeapCons, HeapRb};

use super::devices::input_stream_config;
use crate::config::CAPTURE_RING_CAPACITY;
use crate::error::Result;

/// A running cpal input stream feeding mono samples into a ring buffer.
pub struct LineCapture {
    _stream: Stream,
    sample_rate: u32,
    dropped: Arc<AtomicUsize>,
}

impl LineCapture {
    /// Start capturing. The consumer end goes to the board that reads it.
    pub fn start(device: &Device) -> Result<(Self, HeapCons<f32>)> {
        let config = input_stream_config(device)?;
        let channels = usize::from(config.channels.max(1));
        let sample_rate = config.sample_rate.0;

        let (mut producer, consumer) = HeapRb::<f32>::new(CAPTURE_RING_CAPACITY).split();
        let dropped = Arc::new(AtomicUsize::new(0));
        let dropped_cb = Arc::clone(&dropped);

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let lost = push_mono(data, channels, &mut producer);
                if lost > 0 {
                    dropped_cb.fetch_add(lost, Ordering::Relaxed);
                }
            },
            |err| log::error!("Input stream error: {err}"),
            None,
        )?;
        stream.play()?;

        log::info!(
            "Capturing '{}' @ {} Hz, {} channel(s)",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels
        );

        Ok((
            Self {
                _stream: stream,
                sample_rate,
                dropped,
            },
            consumer,
        ))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples thrown away because the controller fell behind.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Average interleaved frames down to mono and queue them. Returns how many
/// frames did not fit.
fn push_mono<P: Producer<Item = f32>>(data: &[f32], channels: usize, producer: &mut P) -> usize {
    let mut lost = 0;
    for frame in data.chunks(channels) {
        if frame.len() == channels {
            let sample = frame.iter().sum::<f32>() / channels as f32;
            if producer.try_push(sample).is_err() {
                lost += 1;
            }
        }
    }
    lost
}
