//! Oversampling stage contract
//!
//! The engine runs its band chain inside an [`Oversampler`]: the stage
//! upsamples the block, hands the band-rate block to the inner callback
//! exactly once, then decimates back. [`BypassOversampler`] is the identity
//! realization used until a polyphase stage lands; it reports zero latency
//! and runs the chain at the base rate.

use crest_core::AudioBlock;

/// Wraps the band chain in a rate-conversion stage.
///
/// Implementations must invoke `inner` exactly once per `process_block` call,
/// with a block at the oversampled rate. Latency is reported in samples at
/// the base rate.
pub trait Oversampler: Send {
    fn prepare(&mut self, sample_rate: f64, channels: usize, block_size: usize);

    fn reset(&mut self);

    /// Request an oversampling factor (1, 2, 4, ...). Implementations may
    /// round unsupported requests to the nearest supported factor.
    fn set_factor(&mut self, factor: usize);

    fn factor(&self) -> usize;

    fn latency(&self) -> usize {
        0
    }

    /// Run `inner` over the block at the oversampled rate.
    fn process_block(&mut self, block: &mut AudioBlock, inner: &mut dyn FnMut(&mut AudioBlock));
}

/// Identity oversampler: no rate change, no latency.
#[derive(Debug)]
pub struct BypassOversampler {
    factor: usize,
}

impl BypassOversampler {
    pub fn new() -> Self {
        Self { factor: 1 }
    }
}

impl Default for BypassOversampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Oversampler for BypassOversampler {
    fn prepare(&mut self, _sample_rate: f64, _channels: usize, _block_size: usize) {}

    fn reset(&mut self) {}

    fn set_factor(&mut self, factor: usize) {
        // Factor is remembered for when a real stage replaces this one;
        // processing stays at the base rate either way.
        self.factor = factor.max(1);
    }

    fn factor(&self) -> usize {
        self.factor
    }

    fn process_block(&mut self, block: &mut AudioBlock, inner: &mut dyn FnMut(&mut AudioBlock)) {
        inner(block);
    }
}
