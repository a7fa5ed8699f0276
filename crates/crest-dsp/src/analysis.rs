//! Spectrum analyzer contract
//!
//! The engine taps the processed output for visualization. Analyzers only
//! observe; they never write back into the audio path.

use crest_core::{AudioBlock, MIN_DB};

/// Post-processing spectrum tap.
pub trait SpectrumAnalyzer: Send {
    fn prepare(&mut self, sample_rate: f64);

    /// Observe a processed block. Read-only by contract.
    fn push_block(&mut self, block: &AudioBlock);

    /// Latest magnitude spectrum in dB, one entry per bin.
    fn magnitudes(&self) -> &[f64];
}

/// Analyzer stand-in that reports a silent spectrum.
#[derive(Debug)]
pub struct NullAnalyzer {
    bins: Vec<f64>,
}

/// Bin count matching the FFT size the visualization layer expects.
const NULL_ANALYZER_BINS: usize = 1024;

impl NullAnalyzer {
    pub fn new() -> Self {
        Self {
            bins: vec![MIN_DB; NULL_ANALYZER_BINS],
        }
    }
}

impl Default for NullAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer for NullAnalyzer {
    fn prepare(&mut self, _sample_rate: f64) {}

    fn push_block(&mut self, _block: &AudioBlock) {}

    fn magnitudes(&self) -> &[f64] {
        &self.bins
    }
}
