//! Sample type and multichannel audio block

/// Type alias for audio samples (always f64 for maximum precision)
pub type Sample = f64;

/// Owned multichannel audio buffer, one contiguous `Vec` per channel
/// (non-interleaved).
///
/// All channels always hold the same number of frames. Processors mutate the
/// block in place; none of the accessors allocate.
#[derive(Debug, Clone, Default)]
pub struct AudioBlock {
    channels: Vec<Vec<Sample>>,
}

impl AudioBlock {
    /// Create a silent block with the given channel and frame counts.
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; channels],
        }
    }

    /// Build a block from per-channel sample vectors.
    ///
    /// All vectors must have equal length.
    pub fn from_channels(channels: Vec<Vec<Sample>>) -> Self {
        if let Some(first) = channels.first() {
            debug_assert!(channels.iter().all(|c| c.len() == first.len()));
        }
        Self { channels }
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    #[inline]
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    #[inline]
    pub fn channel(&self, index: usize) -> Option<&[Sample]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [Sample]> {
        self.channels.get_mut(index).map(Vec::as_mut_slice)
    }

    /// Iterate channels as immutable slices.
    #[inline]
    pub fn each_channel(&self) -> impl Iterator<Item = &[Sample]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Iterate channels as mutable slices.
    #[inline]
    pub fn each_channel_mut(&mut self) -> impl Iterator<Item = &mut [Sample]> {
        self.channels.iter_mut().map(Vec::as_mut_slice)
    }

    /// Split off the first two channels for stereo processing.
    ///
    /// Returns `None` for an empty block; a mono block yields `(left, None)`.
    /// Channels beyond the first two are not exposed here.
    #[inline]
    pub fn stereo_pair_mut(&mut self) -> Option<(&mut [Sample], Option<&mut [Sample]>)> {
        match self.channels.len() {
            0 => None,
            1 => Some((self.channels[0].as_mut_slice(), None)),
            _ => {
                let (left, rest) = self.channels.split_at_mut(1);
                Some((left[0].as_mut_slice(), Some(rest[0].as_mut_slice())))
            }
        }
    }

    /// Zero every sample, keeping the layout.
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }

    /// Reshape the block, zeroing all content. Allocates; never call from the
    /// audio thread.
    pub fn resize(&mut self, channels: usize, frames: usize) {
        self.channels.resize_with(channels, Vec::new);
        for channel in &mut self.channels {
            channel.clear();
            channel.resize(frames, 0.0);
        }
    }
}
