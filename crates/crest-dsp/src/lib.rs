//! crest-dsp: DSP processors for Crest
//!
//! A multiband dynamic equalizer and broadband compressor core.
//!
//! ## Modules
//! - `biquad` - TDF-II biquad filter and RBJ coefficient factory
//! - `eq` - Filter designs, band parameters, and the per-band processor
//! - `engine` - Serial multi-band engine with oversampler/analyzer hooks
//! - `dynamics` - Envelope follower, per-band dynamics, broadband compressor
//! - `oversampling` - Oversampler contract and bypass implementation
//! - `analysis` - Spectrum analyzer contract and null implementation
//! - `spectral` - Spectral dynamics contract and passthrough implementation
//! - `params` - Lock-free parameter update queues (control thread → audio thread)

pub mod analysis;
pub mod biquad;
pub mod dynamics;
pub mod engine;
pub mod eq;
pub mod oversampling;
pub mod params;
pub mod spectral;

use crest_core::{AudioBlock, Sample};

/// Trait for all DSP processors
///
/// `Send` only: processors that own a parameter-queue consumer endpoint have
/// a single-owner control surface and are moved to the audio thread, not
/// shared.
pub trait Processor: Send {
    /// Reset processor state
    fn reset(&mut self);

    /// Get latency in samples
    fn latency(&self) -> usize {
        0
    }
}

/// Mono processor trait
pub trait MonoProcessor: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: Sample) -> Sample;

    /// Process a block of samples
    fn process_block(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// Multichannel block processor trait
pub trait BlockProcessor: Processor {
    /// Process a block in place
    fn process_block(&mut self, block: &mut AudioBlock);
}
