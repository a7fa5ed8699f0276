//! Spectral dynamics contract
//!
//! Placeholder seam for an FFT-domain resonance suppressor. Hosts that carry
//! one run it per channel after the band chain; the passthrough realization
//! keeps the seam honest until the real stage exists.

use crest_core::Sample;

pub trait SpectralDynamics: Send {
    fn prepare(&mut self, sample_rate: f64, block_size: usize);

    fn reset(&mut self);

    /// Processing latency in samples.
    fn latency(&self) -> usize;

    fn process_channel(&mut self, channel: usize, samples: &mut [Sample]);
}

/// Identity spectral stage with zero latency.
#[derive(Debug, Default)]
pub struct PassthroughSpectralDynamics;

impl PassthroughSpectralDynamics {
    pub fn new() -> Self {
        Self
    }
}

impl SpectralDynamics for PassthroughSpectralDynamics {
    fn prepare(&mut self, _sample_rate: f64, _block_size: usize) {}

    fn reset(&mut self) {}

    fn latency(&self) -> usize {
        0
    }

    fn process_channel(&mut self, _channel: usize, _samples: &mut [Sample]) {}
}
