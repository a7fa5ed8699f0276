//! Dynamic EQ bands
//!
//! Each band owns one biquad filter and one dynamics section per channel and
//! runs in one of three modes:
//! - inactive: buffer untouched
//! - static: fixed coefficients
//! - level-dependent: coefficients regenerated from the envelope-driven gain
//!
//! Level-dependent block processing amortizes coefficient updates over
//! 32-sample chunks; the single-sample path uses a small dB deadband instead.

use crest_core::{AudioBlock, Sample};
use serde::{Deserialize, Serialize};

use crate::biquad::{Biquad, BiquadCoeffs, frequency_response};
use crate::dynamics::BandDynamics;
use crate::{MonoProcessor, Processor};

/// Default sample rate for fallback
const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Chunk length for level-dependent coefficient updates
const DYNAMIC_CHUNK: usize = 32;

/// Offsets at or below this magnitude keep the current coefficients on the
/// single-sample path.
const OFFSET_DEADBAND_DB: f64 = 0.01;

/// Fixed Q for the tilt shelf. The tilt renders as one wide low shelf rather
/// than a pivot-symmetric pair, so the band's Q parameter does not apply.
const TILT_SHELF_Q: f64 = 0.3;

/// Filter shape selector for a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterKind {
    #[default]
    Bell,
    LowShelf,
    HighShelf,
    LowCut,
    HighCut,
    Notch,
    BandPass,
    TiltShelf,
}

/// A fully-specified filter design, each shape carrying exactly the
/// parameters it uses.
///
/// Coefficient derivation is a pure function of the design and sample rate,
/// so equal designs always produce identical coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterDesign {
    Bell { frequency: f64, q: f64, gain_db: f64 },
    LowShelf { frequency: f64, q: f64, gain_db: f64 },
    HighShelf { frequency: f64, q: f64, gain_db: f64 },
    LowCut { frequency: f64, q: f64 },
    HighCut { frequency: f64, q: f64 },
    Notch { frequency: f64, q: f64 },
    BandPass { frequency: f64, q: f64 },
    TiltShelf { frequency: f64, gain_db: f64 },
}

impl FilterDesign {
    /// Build the design for a band's current settings. Shapes that do not use
    /// gain or Q drop them here.
    pub fn for_band(kind: FilterKind, frequency: f64, q: f64, gain_db: f64) -> Self {
        match kind {
            FilterKind::Bell => Self::Bell {
                frequency,
                q,
                gain_db,
            },
            FilterKind::LowShelf => Self::LowShelf {
                frequency,
                q,
                gain_db,
            },
            FilterKind::HighShelf => Self::HighShelf {
                frequency,
                q,
                gain_db,
            },
            FilterKind::LowCut => Self::LowCut { frequency, q },
            FilterKind::HighCut => Self::HighCut { frequency, q },
            FilterKind::Notch => Self::Notch { frequency, q },
            FilterKind::BandPass => Self::BandPass { frequency, q },
            FilterKind::TiltShelf => Self::TiltShelf { frequency, gain_db },
        }
    }

    /// Derive biquad coefficients at the given sample rate.
    ///
    /// No range checking happens here; the band parameter setter guarantees
    /// Q > 0 and 0 < frequency < Nyquist.
    pub fn coefficients(&self, sample_rate: f64) -> BiquadCoeffs {
        match *self {
            Self::Bell {
                frequency,
                q,
                gain_db,
            } => BiquadCoeffs::peaking(frequency, q, gain_db, sample_rate),
            Self::LowShelf {
                frequency,
                q,
                gain_db,
            } => BiquadCoeffs::low_shelf(frequency, q, gain_db, sample_rate),
            Self::HighShelf {
                frequency,
                q,
                gain_db,
            } => BiquadCoeffs::high_shelf(frequency, q, gain_db, sample_rate),
            Self::LowCut { frequency, q } => BiquadCoeffs::highpass(frequency, q, sample_rate),
            Self::HighCut { frequency, q } => BiquadCoeffs::lowpass(frequency, q, sample_rate),
            Self::Notch { frequency, q } => BiquadCoeffs::notch(frequency, q, sample_rate),
            Self::BandPass { frequency, q } => BiquadCoeffs::bandpass(frequency, q, sample_rate),
            Self::TiltShelf {
                frequency,
                gain_db,
            } => BiquadCoeffs::low_shelf(frequency, TILT_SHELF_Q, gain_db, sample_rate),
        }
    }
}

/// Per-band parameter snapshot
///
/// Plain value type: the control thread fills one in and ships it to the
/// audio thread whole. Serializable so the host's settings layer can persist
/// band state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandParameters {
    pub active: bool,
    pub kind: FilterKind,
    /// Center/corner frequency in Hz
    pub frequency: f64,
    pub q: f64,
    /// Static gain in dB
    pub gain_db: f64,
    /// Level-dependent mode flag
    pub dynamic_active: bool,
    /// Gain swing in dB on loud content; sign selects boost (+) or cut (−)
    pub dynamic_range_db: f64,
    /// Envelope threshold in dB
    pub threshold_db: f64,
    /// Stored for the attack/release setter; see `BandDynamics::set_attack_release`
    pub attack_ms: f64,
    pub release_ms: f64,
}

impl Default for BandParameters {
    fn default() -> Self {
        Self {
            active: false,
            kind: FilterKind::Bell,
            frequency: 1000.0,
            q: 0.707,
            gain_db: 0.0,
            dynamic_active: false,
            dynamic_range_db: 0.0,
            threshold_db: -20.0,
            attack_ms: 10.0,
            release_ms: 100.0,
        }
    }
}

/// Operating mode derived from the band's flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandMode {
    Inactive,
    Static,
    LevelDependent,
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Single EQ band with per-channel filter and dynamics arenas
///
/// The arenas are sized at [`prepare`](EqBand::prepare) and never reallocated
/// during processing. A block whose channel count differs from the prepared
/// count passes through untouched.
#[derive(Debug, Clone)]
pub struct EqBand {
    params: BandParameters,
    sample_rate: f64,

    // One entry per channel, sized at prepare time
    filters: Vec<Biquad>,
    dynamics: Vec<BandDynamics>,
}

impl EqBand {
    pub fn new() -> Self {
        Self {
            params: BandParameters::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            filters: Vec::new(),
            dynamics: Vec::new(),
        }
    }

    /// Rebuild the per-channel state for a sample rate and channel count.
    pub fn prepare(&mut self, sample_rate: f64, channels: usize) {
        let sample_rate = if sample_rate > 0.0 && sample_rate.is_finite() {
            sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };
        self.sample_rate = sample_rate;
        self.filters = vec![Biquad::new(); channels];
        self.dynamics = vec![BandDynamics::new(sample_rate); channels];
        // Re-clamp against the new Nyquist limit before deriving coefficients
        self.params = Self::sanitize(self.params, sample_rate);
        self.apply_params();
    }

    /// Number of prepared channels.
    pub fn channels(&self) -> usize {
        self.filters.len()
    }

    /// Replace the band's parameters, clamping out-of-range values.
    pub fn set_parameters(&mut self, params: BandParameters) {
        self.params = Self::sanitize(params, self.sample_rate);
        self.apply_params();
    }

    /// Current parameter snapshot.
    pub fn parameters(&self) -> BandParameters {
        self.params
    }

    pub fn mode(&self) -> BandMode {
        if !self.params.active {
            BandMode::Inactive
        } else if self.params.dynamic_active {
            BandMode::LevelDependent
        } else {
            BandMode::Static
        }
    }

    fn sanitize(mut params: BandParameters, sample_rate: f64) -> BandParameters {
        let max_frequency = (sample_rate * 0.49).min(20000.0);
        params.frequency = clamp_or(params.frequency, 20.0, max_frequency, 1000.0);
        params.q = clamp_or(params.q, 0.1, 30.0, 0.707);
        params.gain_db = clamp_or(params.gain_db, -30.0, 30.0, 0.0);
        params.dynamic_range_db = clamp_or(params.dynamic_range_db, -48.0, 48.0, 0.0);
        params.threshold_db = clamp_or(params.threshold_db, -60.0, 12.0, -20.0);
        params.attack_ms = clamp_or(params.attack_ms, 0.1, 500.0, 10.0);
        params.release_ms = clamp_or(params.release_ms, 10.0, 3000.0, 100.0);
        params
    }

    fn apply_params(&mut self) {
        for dynamics in &mut self.dynamics {
            dynamics.set_parameters(self.params.threshold_db, self.params.dynamic_range_db);
            dynamics.set_attack_release(self.params.attack_ms, self.params.release_ms);
        }
        self.update_coefficients();
    }

    fn design_at(&self, gain_db: f64) -> FilterDesign {
        FilterDesign::for_band(
            self.params.kind,
            self.params.frequency,
            self.params.q,
            gain_db,
        )
    }

    fn update_coefficients(&mut self) {
        let coeffs = self.design_at(self.params.gain_db).coefficients(self.sample_rate);
        for filter in &mut self.filters {
            filter.set_coeffs(coeffs);
        }
    }

    /// Process a block in place.
    ///
    /// No-ops when inactive or when the block's channel count does not match
    /// the prepared count.
    pub fn process_block(&mut self, block: &mut AudioBlock) {
        if !self.params.active {
            return;
        }
        if block.num_channels() != self.filters.len() {
            return;
        }

        if self.params.dynamic_active {
            self.process_block_dynamic(block);
        } else {
            for (filter, samples) in self.filters.iter_mut().zip(block.each_channel_mut()) {
                filter.process_block(samples);
            }
        }
    }

    fn process_block_dynamic(&mut self, block: &mut AudioBlock) {
        let params = self.params;
        let sample_rate = self.sample_rate;

        for (channel, samples) in block.each_channel_mut().enumerate() {
            let filter = &mut self.filters[channel];
            let dynamics = &mut self.dynamics[channel];

            let len = samples.len();
            let mut start = 0;
            while start < len {
                let chunk = DYNAMIC_CHUNK.min(len - start);

                // The chunk's first input sample decides the gain offset; the
                // rest still feed the envelope so it tracks every sample.
                let offset = dynamics.gain_offset(samples[start]);
                for &sample in &samples[start + 1..start + chunk] {
                    dynamics.gain_offset(sample);
                }

                let effective_gain = params.gain_db + offset;
                let coeffs =
                    FilterDesign::for_band(params.kind, params.frequency, params.q, effective_gain)
                        .coefficients(sample_rate);
                filter.set_coeffs(coeffs);
                filter.process_block(&mut samples[start..start + chunk]);

                start += chunk;
            }
        }
    }

    /// Process one sample on one channel (serial/mono entry point).
    ///
    /// Out-of-range channels pass the input through. In level-dependent mode
    /// the coefficients are regenerated only when the offset moves outside
    /// the deadband; near silence the last coefficients stay in effect.
    pub fn process_sample(&mut self, channel: usize, input: Sample) -> Sample {
        if !self.params.active {
            return input;
        }
        let Some(filter) = self.filters.get_mut(channel) else {
            return input;
        };

        if !self.params.dynamic_active {
            return filter.process_sample(input);
        }

        let Some(dynamics) = self.dynamics.get_mut(channel) else {
            return input;
        };
        let offset = dynamics.gain_offset(input);
        if offset.abs() > OFFSET_DEADBAND_DB {
            let effective_gain = self.params.gain_db + offset;
            let coeffs = FilterDesign::for_band(
                self.params.kind,
                self.params.frequency,
                self.params.q,
                effective_gain,
            )
            .coefficients(self.sample_rate);
            filter.set_coeffs(coeffs);
        }
        filter.process_sample(input)
    }

    /// Frequency response of the band's current coefficients at `freq`.
    ///
    /// Inactive bands report unity. In level-dependent mode this reflects the
    /// most recent envelope-driven coefficients.
    pub fn frequency_response(&self, freq: f64) -> (f64, f64) {
        if !self.params.active {
            return (1.0, 0.0);
        }
        match self.filters.first() {
            Some(filter) => frequency_response(filter.coeffs(), freq, self.sample_rate),
            None => {
                let coeffs = self.design_at(self.params.gain_db).coefficients(self.sample_rate);
                frequency_response(&coeffs, freq, self.sample_rate)
            }
        }
    }
}

impl Default for EqBand {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for EqBand {
    fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
        for dynamics in &mut self.dynamics {
            dynamics.reset();
        }
    }
}
