use rustc_hash::FxHashMap;

use crate::errors::{PoseError, Result};
use crate::scene::transform::Transform;

/// Seconds between two consecutive keyframes.
pub const FRAME_TIME: f32 = 0.02;

/// One keyframe sample of one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub scale: f32,
    pub transform: Transform,
}

impl Frame {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        transform: Transform::IDENTITY,
    };

    #[must_use]
    pub const fn new(scale: f32, transform: Transform) -> Self {
        Self { scale, transform }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A named keyframe animation.
///
/// Frames are stored frame-major: all channels of frame 0, then all
/// channels of frame 1, and so on. Channels are addressed by node name.
#[derive(Debug, Clone)]
pub struct Animation {
    name: String,
    length: usize,
    channels: Vec<String>,
    channel_index: FxHashMap<String, usize>,
    frames: Vec<Frame>,
}

impl Animation {
    /// Creates an animation with no channels and no frames.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length: 0,
            channels: Vec::new(),
            channel_index: FxHashMap::default(),
            frames: Vec::new(),
        }
    }

    /// The placeholder animation of a freshly created pose channel.
    #[must_use]
    pub fn empty() -> Self {
        Self::new("empty")
    }

    /// Builds an animation from a frame-major buffer of `channels.len() * length` frames.
    ///
    /// Duplicate channel names resolve to their first occurrence.
    pub fn from_frames(
        name: impl Into<String>,
        channels: Vec<String>,
        length: usize,
        frames: Vec<Frame>,
    ) -> Result<Self> {
        let expected = grid_size(channels.len(), length)?;
        if frames.len() != expected {
            return Err(PoseError::FrameGridMismatch {
                expected,
                actual: frames.len(),
            });
        }

        let mut channel_index = FxHashMap::default();
        for (i, channel) in channels.iter().enumerate() {
            channel_index.entry(channel.clone()).or_insert(i);
        }

        Ok(Self {
            name: name.into(),
            length,
            channels,
            channel_index,
            frames,
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of frames.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    #[inline]
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[inline]
    #[must_use]
    pub fn get_channel(&self, name: &str) -> Option<usize> {
        self.channel_index.get(name).copied()
    }

    /// Playback duration in seconds.
    ///
    /// Animations of zero or one frame report one second so that looping
    /// them still advances the repeat counter.
    #[must_use]
    pub fn duration(&self) -> f32 {
        if self.length > 1 {
            (self.length - 1) as f32 * FRAME_TIME
        } else {
            1.0
        }
    }

    #[inline]
    #[must_use]
    pub fn frame(&self, channel: usize, frame: usize) -> Option<&Frame> {
        if channel >= self.channels.len() || frame >= self.length {
            return None;
        }
        self.frames.get(frame * self.channels.len() + channel)
    }

    /// Samples the channel named `name` at `time` seconds.
    ///
    /// Times before the first frame clamp to it, times after the last
    /// frame clamp to the last one. Returns `None` when the channel does
    /// not exist or the animation has no frames.
    #[must_use]
    pub fn get_transform(&self, name: &str, time: f32) -> Option<Frame> {
        let channel = self.get_channel(name)?;
        if self.length == 0 {
            return None;
        }

        let position = time / FRAME_TIME;
        let last = self.length - 1;
        if position <= 0.0 {
            return self.frame(channel, 0).copied();
        }
        if position >= last as f32 {
            return self.frame(channel, last).copied();
        }

        let index = position.floor() as usize;
        let blend = position - index as f32;
        let f0 = self.frame(channel, index)?;
        let f1 = self.frame(channel, (index + 1).min(last))?;
        Some(Frame {
            scale: (1.0 - blend) * f0.scale + blend * f1.scale,
            transform: f0.transform.interpolate(&f1.transform, blend),
        })
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Adds a channel for `name`, filled with identity frames.
    ///
    /// Returns the channel index. An existing channel is left untouched.
    pub fn insert_channel(&mut self, name: &str) -> Result<usize> {
        if let Some(index) = self.get_channel(name) {
            return Ok(index);
        }

        let old_count = self.channels.len();
        let new_count = old_count + 1;
        let requested = grid_size(new_count, self.length)?;

        self.channels
            .try_reserve(1)
            .map_err(|e| PoseError::alloc("animation channels", new_count, e))?;
        self.channel_index
            .try_reserve(1)
            .map_err(|e| PoseError::alloc("animation channel index", new_count, e))?;

        if self.length > 0 {
            let mut frames = Vec::new();
            frames
                .try_reserve_exact(requested)
                .map_err(|e| PoseError::alloc("animation frames", requested, e))?;
            for frame in 0..self.length {
                let start = frame * old_count;
                let row = self.frames.get(start..start + old_count).unwrap_or_default();
                frames.extend_from_slice(row);
                frames.push(Frame::IDENTITY);
            }
            self.frames = frames;
        }

        self.channels.push(name.to_string());
        self.channel_index.insert(name.to_string(), old_count);
        Ok(old_count)
    }

    /// Resizes the animation to `length` frames.
    ///
    /// Shrinking drops trailing frames. Growing appends identity frames.
    pub fn set_length(&mut self, length: usize) -> Result<()> {
        if length == self.length {
            return Ok(());
        }

        let channel_count = self.channels.len();
        if channel_count > 0 {
            let requested = grid_size(channel_count, length)?;
            if requested > self.frames.len() {
                self.frames
                    .try_reserve_exact(requested - self.frames.len())
                    .map_err(|e| PoseError::alloc("animation frames", requested, e))?;
            }
            self.frames.resize(requested, Frame::IDENTITY);
            if length == 0 {
                self.frames.shrink_to_fit();
            }
        }

        log::trace!(
            "Animation '{}' length {} -> {}",
            self.name,
            self.length,
            length
        );
        self.length = length;
        Ok(())
    }

    /// Overwrites one keyframe of the channel named `name`.
    pub fn set_transform(
        &mut self,
        name: &str,
        frame: usize,
        scale: f32,
        transform: &Transform,
    ) -> Result<()> {
        if frame >= self.length {
            return Err(PoseError::FrameOutOfRange {
                frame,
                length: self.length,
            });
        }
        let channel = self
            .get_channel(name)
            .ok_or_else(|| PoseError::ChannelNotFound(name.to_string()))?;

        let index = frame * self.channels.len() + channel;
        if let Some(slot) = self.frames.get_mut(index) {
            *slot = Frame::new(scale, *transform);
        }
        Ok(())
    }
}

/// Number of frames in a `channels x length` grid.
fn grid_size(channels: usize, length: usize) -> Result<usize> {
    channels
        .checked_mul(length)
        .ok_or(PoseError::FrameGridOverflow { channels, length })
}

impl Default for Animation {
    fn default() -> Self {
        Self::empty()
    }
}
