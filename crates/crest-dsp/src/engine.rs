//! Serial multiband dynamic EQ engine
//!
//! Eight [`EqBand`]s run back to back inside an [`Oversampler`] stage, with a
//! [`SpectrumAnalyzer`] tapping the processed output. Collaborators are
//! trait objects so hosts can swap in real oversampling and FFT stages
//! without touching the band chain.
//!
//! Control threads talk to a running engine through an [`EngineUpdate`]
//! queue; pending updates are applied at block boundaries before any sample
//! is processed.

use crest_core::{AudioBlock, CrestError, CrestResult};

use crate::analysis::{NullAnalyzer, SpectrumAnalyzer};
use crate::eq::{BandMode, BandParameters, EqBand};
use crate::oversampling::{BypassOversampler, Oversampler};
use crate::params::{EngineUpdate, ParamReceiver};
use crate::{BlockProcessor, Processor};

/// Number of bands in the chain
pub const MAX_BANDS: usize = 8;

const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Multiband dynamic EQ with serial band topology
pub struct EqEngine {
    bands: Vec<EqBand>,
    oversampler: Box<dyn Oversampler>,
    analyzer: Box<dyn SpectrumAnalyzer>,
    analyzer_enabled: bool,
    updates: Option<ParamReceiver<EngineUpdate>>,
    sample_rate: f64,
}

impl EqEngine {
    /// Engine with the identity oversampler and silent analyzer.
    pub fn new() -> Self {
        Self::with_collaborators(
            Box::new(BypassOversampler::new()),
            Box::new(NullAnalyzer::new()),
        )
    }

    /// Engine with host-supplied collaborator stages.
    pub fn with_collaborators(
        oversampler: Box<dyn Oversampler>,
        analyzer: Box<dyn SpectrumAnalyzer>,
    ) -> Self {
        Self {
            bands: (0..MAX_BANDS).map(|_| EqBand::new()).collect(),
            oversampler,
            analyzer,
            analyzer_enabled: true,
            updates: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Size every band and collaborator for the session format.
    ///
    /// Must be called off the audio thread before processing. Rejects
    /// non-positive or non-finite sample rates, zero channels and zero-length
    /// blocks instead of configuring a broken chain.
    pub fn prepare(
        &mut self,
        sample_rate: f64,
        block_size: usize,
        channels: usize,
    ) -> CrestResult<()> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(CrestError::InvalidSampleRate(sample_rate));
        }
        if channels == 0 {
            return Err(CrestError::InvalidChannelCount(channels));
        }
        if block_size == 0 {
            return Err(CrestError::InvalidBlockSize(block_size));
        }

        self.sample_rate = sample_rate;
        self.oversampler.prepare(sample_rate, channels, block_size);
        self.analyzer.prepare(sample_rate);
        for band in &mut self.bands {
            band.prepare(sample_rate, channels);
        }

        log::debug!(
            "EQ engine prepared: {sample_rate} Hz, {channels} ch, {block_size}-frame blocks"
        );
        Ok(())
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Replace one band's parameters. Out-of-range indices are ignored.
    pub fn set_band_parameters(&mut self, index: usize, params: BandParameters) {
        if let Some(band) = self.bands.get_mut(index) {
            band.set_parameters(params);
        }
    }

    /// Parameter snapshot for a band; defaults for out-of-range indices.
    pub fn band_parameters(&self, index: usize) -> BandParameters {
        self.bands
            .get(index)
            .map(EqBand::parameters)
            .unwrap_or_default()
    }

    pub fn band_mode(&self, index: usize) -> BandMode {
        self.bands
            .get(index)
            .map(EqBand::mode)
            .unwrap_or(BandMode::Inactive)
    }

    pub fn set_oversampling_factor(&mut self, factor: usize) {
        self.oversampler.set_factor(factor);
    }

    pub fn oversampling_factor(&self) -> usize {
        self.oversampler.factor()
    }

    pub fn set_analyzer_enabled(&mut self, enabled: bool) {
        self.analyzer_enabled = enabled;
    }

    pub fn analyzer_enabled(&self) -> bool {
        self.analyzer_enabled
    }

    pub fn analyzer(&self) -> &dyn SpectrumAnalyzer {
        self.analyzer.as_ref()
    }

    /// Attach the audio-thread endpoint of an update queue.
    pub fn attach_updates(&mut self, receiver: ParamReceiver<EngineUpdate>) {
        self.updates = Some(receiver);
    }

    /// Drain pending updates. Called at the top of every processed block, so
    /// a whole block always runs under one parameter set.
    pub fn apply_pending_updates(&mut self) {
        let Some(mut receiver) = self.updates.take() else {
            return;
        };
        while let Some(update) = receiver.pop() {
            match update {
                EngineUpdate::Band { index, params } => self.set_band_parameters(index, params),
                EngineUpdate::OversamplingFactor(factor) => self.set_oversampling_factor(factor),
                EngineUpdate::AnalyzerEnabled(enabled) => self.set_analyzer_enabled(enabled),
            }
        }
        self.updates = Some(receiver);
    }

    /// Combined frequency response of the band chain at `freq`.
    ///
    /// Magnitudes multiply and phases add across bands; inactive bands
    /// contribute unity.
    pub fn frequency_response(&self, freq: f64) -> (f64, f64) {
        let mut magnitude = 1.0;
        let mut phase = 0.0;
        for band in &self.bands {
            let (m, p) = band.frequency_response(freq);
            magnitude *= m;
            phase += p;
        }
        (magnitude, phase)
    }
}

impl Default for EqEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for EqEngine {
    /// Clear filter and envelope state. The analyzer keeps its display
    /// state; transport moves should not blank the spectrum view.
    fn reset(&mut self) {
        self.oversampler.reset();
        for band in &mut self.bands {
            band.reset();
        }
    }

    fn latency(&self) -> usize {
        self.oversampler.latency()
    }
}

impl BlockProcessor for EqEngine {
    fn process_block(&mut self, block: &mut AudioBlock) {
        self.apply_pending_updates();
        if block.frames() == 0 || block.num_channels() == 0 {
            return;
        }

        let Self {
            oversampler, bands, ..
        } = self;
        oversampler.process_block(block, &mut |inner| {
            for band in bands.iter_mut() {
                band.process_block(inner);
            }
        });

        if self.analyzer_enabled {
            self.analyzer.push_block(block);
        }
    }
}
