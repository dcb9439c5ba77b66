// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Voice mixer feeding the output stream.
//!
//! Voices are summed into the output buffer and clamped. Each voice steps
//! through its sample at `source_rate / output_rate` frames per output frame
//! (nearest-frame lookup). Finished voices are dropped on the next render.

use std::sync::Arc;

use super::DecodedSample;

/// Identifier of a queued voice
pub type VoiceId = u64;

/// One sample being played
#[derive(Debug, Clone)]
struct Voice {
    id: VoiceId,
    data: Arc<[f32]>,
    channels: usize,
    frames: usize,
    /// Position in source frames
    position: f64,
    /// Source frames per output frame
    step: f64,
}

impl Voice {
    fn is_finished(&self) -> bool {
        self.position as usize >= self.frames
    }

    /// Source sample for output channel `channel`
    fn sample(&self, frame: usize, channel: usize) -> f32 {
        let source_channel = channel % self.channels;
        self.data[frame * self.channels + source_channel]
    }
}

/// Sum of all active voices
#[derive(Debug, Default)]
pub struct Mixer {
    voices: Vec<Voice>,
    next_id: VoiceId,
}

impl Mixer {
    /// Create an empty mixer
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `sample` for playback at `output_rate` Hz
    pub fn add(&mut self, sample: &DecodedSample, output_rate: u32) -> VoiceId {
        let id = self.next_id;
        self.next_id += 1;

        let step = if output_rate == 0 {
            1.0
        } else {
            sample.sample_rate as f64 / output_rate as f64
        };

        self.voices.push(Voice {
            id,
            data: Arc::clone(&sample.data),
            channels: sample.channels.max(1) as usize,
            frames: sample.frames(),
            position: 0.0,
            step,
        });

        id
    }

    /// Whether voice `id` is still queued and unfinished
    pub fn is_playing(&self, id: VoiceId) -> bool {
        self.voices.iter().any(|v| v.id == id && !v.is_finished())
    }

    /// Drop the given voices, playing or not
    pub fn remove(&mut self, ids: &[VoiceId]) {
        self.voices.retain(|v| !ids.contains(&v.id));
    }

    /// Drop every voice
    pub fn clear(&mut self) {
        self.voices.clear();
    }

    /// Number of queued voices
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    /// Whether no voice is queued
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Mix every voice into `buffer` (interleaved, `channels` wide).
    ///
    /// The buffer is overwritten, not accumulated into. Returns the number of
    /// voices that finished and were dropped.
    pub fn render(&mut self, buffer: &mut [f32], channels: usize) -> usize {
        buffer.iter_mut().for_each(|s| *s = 0.0);
        if channels == 0 {
            return 0;
        }

        for voice in self.voices.iter_mut() {
            for frame in buffer.chunks_mut(channels) {
                if voice.is_finished() {
                    break;
                }
                let source_frame = voice.position as usize;
                for (channel, out) in frame.iter_mut().enumerate() {
                    *out += voice.sample(source_frame, channel);
                }
                voice.position += voice.step;
            }
        }

        buffer.iter_mut().for_each(|s| *s = s.clamp(-1.0, 1.0));

        let before = self.voices.len();
        self.voices.retain(|v| !v.is_finished());
        before - self.voices.len()
    }
}
