//! Dynamics processors: envelope follower, per-band dynamics, broadband compressor
//!
//! The envelope follower feeds both the dynamic-EQ bands (via [`BandDynamics`])
//! and the standalone [`Compressor`]. All smoothing is one-pole with separate
//! attack/release coefficients.

use crest_core::{AudioBlock, Sample, db_to_gain, gain_to_db};

use crate::params::{CompressorUpdate, ParamReceiver};
use crate::{BlockProcessor, Processor};

/// Envelope follower for dynamics processing
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    attack_coeff: f64,
    release_coeff: f64,
    envelope: f64,
    sample_rate: f64,
}

impl EnvelopeFollower {
    pub fn new(sample_rate: f64) -> Self {
        let mut follower = Self {
            attack_coeff: 0.0,
            release_coeff: 0.0,
            envelope: 0.0,
            sample_rate,
        };
        follower.set_times(10.0, 100.0);
        follower
    }

    /// Set attack and release times in milliseconds
    pub fn set_times(&mut self, attack_ms: f64, release_ms: f64) {
        self.attack_coeff = (-1.0 / (attack_ms * 0.001 * self.sample_rate)).exp();
        self.release_coeff = (-1.0 / (release_ms * 0.001 * self.sample_rate)).exp();
    }

    /// Change the sample rate. Callers must re-apply `set_times` afterwards;
    /// the stored coefficients are not recomputed here.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    #[inline(always)]
    pub fn process(&mut self, input: Sample) -> f64 {
        let abs_input = input.abs();
        let coeff = if abs_input > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = abs_input + coeff * (self.envelope - abs_input);
        self.envelope
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    pub fn current(&self) -> f64 {
        self.envelope
    }
}

/// Fixed envelope time constants for the band dynamics sections (ms).
const BAND_ATTACK_MS: f64 = 20.0;
const BAND_RELEASE_MS: f64 = 200.0;

/// Epsilon added before the dB conversion so a silent envelope converts to
/// the floor instead of −∞.
const ENV_DB_EPSILON: f64 = 1e-9;

/// Per-band envelope-to-gain-offset calculator for dynamic EQ.
///
/// Tracks the band's own input level and converts "level over threshold"
/// into a bounded gain offset: half the overshoot in dB, clamped to the
/// configured range. A positive range boosts on loud content, a negative
/// range cuts.
#[derive(Debug, Clone)]
pub struct BandDynamics {
    follower: EnvelopeFollower,
    threshold_db: f64,
    range_db: f64,
}

impl BandDynamics {
    pub fn new(sample_rate: f64) -> Self {
        let mut follower = EnvelopeFollower::new(sample_rate);
        follower.set_times(BAND_ATTACK_MS, BAND_RELEASE_MS);
        Self {
            follower,
            threshold_db: -20.0,
            range_db: 0.0,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.follower.set_sample_rate(sample_rate);
        self.follower.set_times(BAND_ATTACK_MS, BAND_RELEASE_MS);
        self.follower.reset();
    }

    /// Set threshold (dB) and range (± dB, sign selects boost vs. cut).
    pub fn set_parameters(&mut self, threshold_db: f64, range_db: f64) {
        self.threshold_db = threshold_db;
        self.range_db = range_db;
    }

    /// Set attack/release times.
    ///
    /// The arguments are currently ignored: the smoothing always runs at the
    /// fixed 20 ms / 200 ms constants, so calling this only reasserts them.
    // TODO: route BandParameters::{attack_ms, release_ms} through here once
    // the per-band envelope times are wired up to the control surface.
    pub fn set_attack_release(&mut self, _attack_ms: f64, _release_ms: f64) {
        self.follower.set_times(BAND_ATTACK_MS, BAND_RELEASE_MS);
    }

    /// Feed one control sample and return the gain offset in dB.
    ///
    /// The magnitude of the result never exceeds `|range|`.
    #[inline]
    pub fn gain_offset(&mut self, control: Sample) -> f64 {
        let envelope = self.follower.process(control);
        let env_db = gain_to_db(envelope + ENV_DB_EPSILON);

        if env_db <= self.threshold_db {
            return 0.0;
        }

        let over = env_db - self.threshold_db;
        let proposed = over * 0.5;
        if self.range_db > 0.0 {
            proposed.min(self.range_db)
        } else {
            (-proposed).max(self.range_db)
        }
    }

    /// Current envelope value (linear).
    pub fn envelope(&self) -> f64 {
        self.follower.current()
    }

    pub fn reset(&mut self) {
        self.follower.reset();
    }
}

/// Broadband compressor with stereo-linked detection and soft knee.
///
/// Detection runs one envelope follower per channel and links them with
/// `max`, so the louder channel drives the gain applied to both. Channels
/// beyond the first two pass through untouched. Delta monitoring outputs
/// `dry − wet` (wet including makeup) to audition what the stage removes.
#[derive(Debug)]
pub struct Compressor {
    // Parameters
    threshold_db: f64,
    ratio: f64,
    attack_ms: f64,
    release_ms: f64,
    makeup_db: f64,
    knee_db: f64,
    enabled: bool,
    delta_monitor: bool,

    // State
    envelope_left: EnvelopeFollower,
    envelope_right: EnvelopeFollower,
    gain_reduction: f64,

    // Dry scratch for delta monitoring; sized at prepare, grown only if the
    // host delivers more frames than it promised.
    dry_left: Vec<Sample>,
    dry_right: Vec<Sample>,

    updates: Option<ParamReceiver<CompressorUpdate>>,

    sample_rate: f64,
}

impl Compressor {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            threshold_db: -20.0,
            ratio: 4.0,
            attack_ms: 10.0,
            release_ms: 100.0,
            makeup_db: 0.0,
            knee_db: 6.0,
            enabled: true,
            delta_monitor: false,
            envelope_left: EnvelopeFollower::new(sample_rate),
            envelope_right: EnvelopeFollower::new(sample_rate),
            gain_reduction: 0.0,
            dry_left: Vec::new(),
            dry_right: Vec::new(),
            updates: None,
            sample_rate,
        }
    }

    /// Reconfigure for a sample rate and expected maximum block size.
    ///
    /// Allocates the delta scratch here so the audio thread normally never
    /// has to.
    pub fn prepare(&mut self, sample_rate: f64, block_size: usize) -> crest_core::CrestResult<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(crest_core::CrestError::InvalidSampleRate(sample_rate));
        }
        if block_size == 0 {
            return Err(crest_core::CrestError::InvalidBlockSize(block_size));
        }

        self.sample_rate = sample_rate;
        self.envelope_left.set_sample_rate(sample_rate);
        self.envelope_right.set_sample_rate(sample_rate);
        self.update_time_constants();
        self.dry_left.resize(block_size, 0.0);
        self.dry_right.resize(block_size, 0.0);
        self.reset();

        log::debug!("Compressor: prepared, sample_rate={sample_rate}, block_size={block_size}");
        Ok(())
    }

    fn update_time_constants(&mut self) {
        self.envelope_left.set_times(self.attack_ms, self.release_ms);
        self.envelope_right.set_times(self.attack_ms, self.release_ms);
    }

    /// Attach the control-thread update queue drained at block boundaries.
    pub fn attach_updates(&mut self, receiver: ParamReceiver<CompressorUpdate>) {
        self.updates = Some(receiver);
    }

    /// Drain and apply pending parameter updates. Called automatically at the
    /// start of every block.
    pub fn apply_pending_updates(&mut self) {
        let Some(mut updates) = self.updates.take() else {
            return;
        };
        while let Some(update) = updates.pop() {
            match update {
                CompressorUpdate::Enabled(on) => self.set_enabled(on),
                CompressorUpdate::DeltaMonitor(on) => self.set_delta_monitor(on),
                CompressorUpdate::ThresholdDb(db) => self.set_threshold(db),
                CompressorUpdate::Ratio(ratio) => self.set_ratio(ratio),
                CompressorUpdate::AttackMs(ms) => self.set_attack(ms),
                CompressorUpdate::ReleaseMs(ms) => self.set_release(ms),
                CompressorUpdate::MakeupDb(db) => self.set_makeup(db),
                CompressorUpdate::KneeDb(db) => self.set_knee(db),
            }
        }
        self.updates = Some(updates);
    }

    // Parameter setters
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_delta_monitor(&mut self, delta: bool) {
        self.delta_monitor = delta;
    }

    pub fn set_threshold(&mut self, db: f64) {
        self.threshold_db = db.clamp(-60.0, 0.0);
    }

    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = ratio.clamp(1.0, 100.0);
    }

    pub fn set_attack(&mut self, ms: f64) {
        self.attack_ms = ms.clamp(0.1, 500.0);
        self.update_time_constants();
    }

    pub fn set_release(&mut self, ms: f64) {
        self.release_ms = ms.clamp(10.0, 3000.0);
        self.update_time_constants();
    }

    pub fn set_makeup(&mut self, db: f64) {
        self.makeup_db = db.clamp(-12.0, 24.0);
    }

    pub fn set_knee(&mut self, db: f64) {
        self.knee_db = db.clamp(0.0, 24.0);
    }

    // Parameter getters (UI readback)
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn delta_monitor(&self) -> bool {
        self.delta_monitor
    }

    pub fn threshold_db(&self) -> f64 {
        self.threshold_db
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn attack_ms(&self) -> f64 {
        self.attack_ms
    }

    pub fn release_ms(&self) -> f64 {
        self.release_ms
    }

    pub fn makeup_db(&self) -> f64 {
        self.makeup_db
    }

    pub fn knee_db(&self) -> f64 {
        self.knee_db
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Maximum gain reduction of the last processed block, in dB (≥ 0).
    pub fn gain_reduction_db(&self) -> f64 {
        self.gain_reduction
    }

    /// Calculate gain reduction using soft-knee
    #[inline]
    fn calculate_gain_reduction(&self, input_db: f64) -> f64 {
        let half_knee = self.knee_db / 2.0;
        let knee_start = self.threshold_db - half_knee;
        let knee_end = self.threshold_db + half_knee;

        if input_db < knee_start {
            0.0
        } else if self.knee_db > 0.0 && input_db < knee_end {
            let x = input_db - knee_start;
            let slope = 1.0 - 1.0 / self.ratio;
            ((slope * x * x) / (2.0 * self.knee_db)).max(0.0)
        } else {
            ((input_db - self.threshold_db) * (1.0 - 1.0 / self.ratio)).max(0.0)
        }
    }
}

impl Processor for Compressor {
    fn reset(&mut self) {
        self.envelope_left.reset();
        self.envelope_right.reset();
        self.gain_reduction = 0.0;
    }
}

impl BlockProcessor for Compressor {
    fn process_block(&mut self, block: &mut AudioBlock) {
        self.apply_pending_updates();

        if !self.enabled {
            return;
        }

        let frames = block.frames();
        if frames == 0 || block.num_channels() == 0 {
            return;
        }

        if self.delta_monitor {
            if self.dry_left.len() < frames {
                self.dry_left.resize(frames, 0.0);
                self.dry_right.resize(frames, 0.0);
            }
            if let Some(left) = block.channel(0) {
                self.dry_left[..frames].copy_from_slice(left);
            }
            if let Some(right) = block.channel(1) {
                self.dry_right[..frames].copy_from_slice(right);
            }
        }

        let Some((left, mut right)) = block.stereo_pair_mut() else {
            return;
        };

        let mut max_reduction = 0.0_f64;

        for i in 0..frames {
            let input_left = left[i].abs();
            let input_right = match right.as_ref() {
                Some(right) => right[i].abs(),
                None => input_left,
            };

            let env_left = self.envelope_left.process(input_left);
            let env_right = self.envelope_right.process(input_right);

            // Linked detection: the louder channel drives both
            let envelope = env_left.max(env_right);
            let env_db = gain_to_db(envelope);

            let reduction_db = self.calculate_gain_reduction(env_db);
            max_reduction = max_reduction.max(reduction_db);

            let gain = db_to_gain(-reduction_db + self.makeup_db);
            left[i] *= gain;
            if let Some(right) = right.as_deref_mut() {
                right[i] *= gain;
            }
        }

        self.gain_reduction = max_reduction;

        if self.delta_monitor {
            for (out, &dry) in left.iter_mut().zip(&self.dry_left[..frames]) {
                *out = dry - *out;
            }
            if let Some(right) = right.as_deref_mut() {
                for (out, &dry) in right.iter_mut().zip(&self.dry_right[..frames]) {
                    *out = dry - *out;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn constant_block(channels: usize, frames: usize, value: Sample) -> AudioBlock {
        AudioBlock::from_channels(vec![vec![value; frames]; channels])
    }

    #[test]
    fn test_envelope_converges_to_constant_input() {
        let mut follower = EnvelopeFollower::new(48000.0);
        follower.set_times(10.0, 100.0);

        let mut env = 0.0;
        for _ in 0..48000 {
            env = follower.process(0.5);
            assert!(env >= 0.0);
        }
        assert_relative_eq!(env, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_envelope_attack_faster_than_release() {
        let mut follower = EnvelopeFollower::new(48000.0);
        follower.set_times(10.0, 100.0);

        // 20 ms of full-scale input
        for _ in 0..960 {
            follower.process(1.0);
        }
        let after_attack = follower.current();

        // 20 ms of silence
        for _ in 0..960 {
            follower.process(0.0);
        }
        let after_release = follower.current();

        let rise = after_attack;
        let fall = after_attack - after_release;
        assert!(rise > fall, "rise {rise} should outpace fall {fall}");
    }

    #[test]
    fn test_gain_offset_zero_below_threshold() {
        let mut dynamics = BandDynamics::new(48000.0);
        dynamics.set_parameters(-20.0, 6.0);

        // -40 dB input never crosses a -20 dB threshold
        let input = db_to_gain(-40.0);
        for _ in 0..48000 {
            assert_eq!(dynamics.gain_offset(input), 0.0);
        }
    }

    #[test]
    fn test_gain_offset_clamps_to_positive_range() {
        let mut dynamics = BandDynamics::new(44100.0);
        dynamics.set_parameters(-20.0, 6.0);

        // Full-scale input: 20 dB over threshold, proposed +10 dB, clamped
        let mut offset = 0.0;
        for _ in 0..44100 {
            offset = dynamics.gain_offset(1.0);
        }
        assert_eq!(offset, 6.0);
    }

    #[test]
    fn test_gain_offset_clamps_to_negative_range() {
        let mut dynamics = BandDynamics::new(44100.0);
        dynamics.set_parameters(-20.0, -6.0);

        let mut offset = 0.0;
        for _ in 0..44100 {
            offset = dynamics.gain_offset(1.0);
        }
        assert_eq!(offset, -6.0);
    }

    #[test]
    fn test_gain_offset_half_overshoot_scale() {
        let mut dynamics = BandDynamics::new(44100.0);
        dynamics.set_parameters(-20.0, 24.0);

        // Envelope settles at -10 dB: 10 dB over, scaled by 0.5, unclamped
        let input = db_to_gain(-10.0);
        let mut offset = 0.0;
        for _ in 0..88200 {
            offset = dynamics.gain_offset(input);
        }
        assert_abs_diff_eq!(offset, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gain_offset_zero_range_is_inert() {
        let mut dynamics = BandDynamics::new(44100.0);
        dynamics.set_parameters(-20.0, 0.0);

        for _ in 0..4410 {
            assert_eq!(dynamics.gain_offset(1.0), 0.0);
        }
    }

    #[test]
    fn test_gain_offset_never_exceeds_range() {
        let mut dynamics = BandDynamics::new(44100.0);
        dynamics.set_parameters(-30.0, 4.5);

        for n in 0..44100 {
            let input = (n as f64 * 0.013).sin() * (1.0 + (n as f64 * 0.0007).cos());
            let offset = dynamics.gain_offset(input);
            assert!(offset.abs() <= 4.5 + 1e-12);
        }
    }

    #[test]
    fn test_attack_release_setter_keeps_fixed_times() {
        let mut reference = BandDynamics::new(48000.0);
        reference.set_parameters(-20.0, -12.0);

        let mut adjusted = BandDynamics::new(48000.0);
        adjusted.set_parameters(-20.0, -12.0);
        adjusted.set_attack_release(1.0, 5.0);

        for n in 0..9600 {
            let input = (n as f64 * 0.02).sin() * 0.8;
            assert_eq!(reference.gain_offset(input), adjusted.gain_offset(input));
        }
    }

    #[test]
    fn test_band_dynamics_reset_keeps_parameters() {
        let mut dynamics = BandDynamics::new(44100.0);
        dynamics.set_parameters(-20.0, 6.0);

        for _ in 0..4410 {
            dynamics.gain_offset(1.0);
        }
        assert!(dynamics.envelope() > 0.0);

        dynamics.reset();
        assert_eq!(dynamics.envelope(), 0.0);

        // Same parameters still in force: a fresh instance must agree
        let mut fresh = BandDynamics::new(44100.0);
        fresh.set_parameters(-20.0, 6.0);
        for _ in 0..100 {
            assert_eq!(dynamics.gain_offset(0.9), fresh.gain_offset(0.9));
        }
    }

    #[test]
    fn test_compressor_static_transfer() {
        let mut comp = Compressor::new(44100.0);
        comp.prepare(44100.0, 512).unwrap();
        comp.set_threshold(-20.0);
        comp.set_ratio(4.0);
        comp.set_knee(0.0);
        comp.set_makeup(0.0);

        // Steady -10 dB input: 10 dB over threshold at 4:1 -> 7.5 dB reduction
        let input = db_to_gain(-10.0);
        let mut block = constant_block(2, 441, input);
        for _ in 0..200 {
            for channel in block.each_channel_mut() {
                channel.fill(input);
            }
            comp.process_block(&mut block);
        }

        assert_relative_eq!(comp.gain_reduction_db(), 7.5, epsilon = 1e-3);
        let out = block.channel(0).unwrap()[440];
        assert_relative_eq!(gain_to_db(out.abs()), -17.5, epsilon = 1e-2);
    }

    #[test]
    fn test_knee_curve_continuous_and_monotonic() {
        let mut comp = Compressor::new(48000.0);
        comp.set_threshold(-20.0);
        comp.set_ratio(4.0);
        comp.set_knee(12.0);

        // Continuity at the knee boundaries
        let eps = 1e-7;
        let lower = comp.calculate_gain_reduction(-26.0 - eps);
        let lower_in = comp.calculate_gain_reduction(-26.0 + eps);
        assert_abs_diff_eq!(lower, lower_in, epsilon = 1e-5);

        let upper_in = comp.calculate_gain_reduction(-14.0 - eps);
        let upper = comp.calculate_gain_reduction(-14.0 + eps);
        assert_abs_diff_eq!(upper_in, upper, epsilon = 1e-5);

        // Monotonically non-decreasing over the whole input range
        let mut previous = 0.0;
        let mut input_db = -60.0;
        while input_db <= 0.0 {
            let reduction = comp.calculate_gain_reduction(input_db);
            assert!(reduction >= previous - 1e-12);
            previous = reduction;
            input_db += 0.25;
        }
    }

    #[test]
    fn test_delta_is_dry_minus_wet() {
        let make = || {
            let mut comp = Compressor::new(48000.0);
            comp.prepare(48000.0, 256).unwrap();
            comp.set_threshold(-30.0);
            comp.set_ratio(8.0);
            comp.set_makeup(3.0);
            comp
        };
        let mut wet_comp = make();
        let mut delta_comp = make();
        delta_comp.set_delta_monitor(true);

        let dry: Vec<Sample> = (0..256).map(|n| (n as f64 * 0.05).sin() * 0.9).collect();
        let mut wet_block = AudioBlock::from_channels(vec![dry.clone(), dry.clone()]);
        let mut delta_block = AudioBlock::from_channels(vec![dry.clone(), dry.clone()]);

        wet_comp.process_block(&mut wet_block);
        delta_comp.process_block(&mut delta_block);

        for ch in 0..2 {
            let wet = wet_block.channel(ch).unwrap();
            let delta = delta_block.channel(ch).unwrap();
            for i in 0..256 {
                assert_eq!(delta[i], dry[i] - wet[i]);
            }
        }
    }

    #[test]
    fn test_disabled_compressor_is_bit_transparent() {
        let mut comp = Compressor::new(48000.0);
        comp.prepare(48000.0, 128).unwrap();
        comp.set_enabled(false);

        let dry: Vec<Sample> = (0..128).map(|n| (n as f64 * 0.3).sin()).collect();
        let mut block = AudioBlock::from_channels(vec![dry.clone(), dry.clone()]);
        comp.process_block(&mut block);

        assert_eq!(block.channel(0).unwrap(), dry.as_slice());
        assert_eq!(block.channel(1).unwrap(), dry.as_slice());
    }

    #[test]
    fn test_below_threshold_is_unity_gain() {
        let mut comp = Compressor::new(48000.0);
        comp.prepare(48000.0, 128).unwrap();
        comp.set_threshold(-20.0);
        comp.set_knee(6.0);
        comp.set_makeup(0.0);

        // -60 dB stays far below the knee start at -23 dB
        let dry: Vec<Sample> = (0..128).map(|n| (n as f64 * 0.1).sin() * 0.001).collect();
        let mut block = AudioBlock::from_channels(vec![dry.clone(), dry.clone()]);
        comp.process_block(&mut block);

        assert_eq!(comp.gain_reduction_db(), 0.0);
        assert_eq!(block.channel(0).unwrap(), dry.as_slice());
    }

    #[test]
    fn test_mono_duplicates_detection() {
        let mut mono_comp = Compressor::new(48000.0);
        mono_comp.prepare(48000.0, 512).unwrap();
        let mut stereo_comp = Compressor::new(48000.0);
        stereo_comp.prepare(48000.0, 512).unwrap();

        let signal: Vec<Sample> = (0..512).map(|n| (n as f64 * 0.07).sin() * 0.7).collect();
        let mut mono = AudioBlock::from_channels(vec![signal.clone()]);
        let mut stereo = AudioBlock::from_channels(vec![signal.clone(), signal.clone()]);

        mono_comp.process_block(&mut mono);
        stereo_comp.process_block(&mut stereo);

        assert_eq!(mono.channel(0).unwrap(), stereo.channel(0).unwrap());
    }

    #[test]
    fn test_linked_detection_applies_same_gain() {
        let mut comp = Compressor::new(44100.0);
        comp.prepare(44100.0, 441).unwrap();
        comp.set_threshold(-20.0);
        comp.set_ratio(4.0);
        comp.set_knee(0.0);

        // Loud left, quiet right: the right channel rides the left's gain
        let mut block = AudioBlock::new(2, 441);
        for _ in 0..100 {
            block.channel_mut(0).unwrap().fill(0.5);
            block.channel_mut(1).unwrap().fill(0.01);
            comp.process_block(&mut block);
        }

        let gain_left = block.channel(0).unwrap()[440] / 0.5;
        let gain_right = block.channel(1).unwrap()[440] / 0.01;
        assert_relative_eq!(gain_left, gain_right, epsilon = 1e-9);
        assert!(gain_left < 1.0);
    }

    #[test]
    fn test_setter_clamps() {
        let mut comp = Compressor::new(48000.0);
        comp.set_threshold(-200.0);
        comp.set_ratio(1000.0);
        comp.set_attack(0.0);
        comp.set_release(1.0);
        comp.set_makeup(100.0);
        comp.set_knee(-5.0);

        assert_eq!(comp.threshold_db(), -60.0);
        assert_eq!(comp.ratio(), 100.0);
        assert_eq!(comp.attack_ms(), 0.1);
        assert_eq!(comp.release_ms(), 10.0);
        assert_eq!(comp.makeup_db(), 24.0);
        assert_eq!(comp.knee_db(), 0.0);
    }

    #[test]
    fn test_reset_clears_meter_and_envelopes() {
        let mut comp = Compressor::new(48000.0);
        comp.prepare(48000.0, 512).unwrap();
        comp.set_threshold(-30.0);

        let mut block = constant_block(2, 512, 0.8);
        comp.process_block(&mut block);
        assert!(comp.gain_reduction_db() > 0.0);

        comp.reset();
        assert_eq!(comp.gain_reduction_db(), 0.0);
        assert_eq!(comp.envelope_left.current(), 0.0);
        assert_eq!(comp.envelope_right.current(), 0.0);
    }

    #[test]
    fn test_prepare_rejects_bad_config() {
        let mut comp = Compressor::new(48000.0);
        assert!(comp.prepare(0.0, 512).is_err());
        assert!(comp.prepare(f64::NAN, 512).is_err());
        assert!(comp.prepare(-44100.0, 512).is_err());
        assert!(comp.prepare(44100.0, 0).is_err());
        assert!(comp.prepare(44100.0, 512).is_ok());
        assert_eq!(comp.sample_rate(), 44100.0);
    }

    #[test]
    fn test_extra_channels_untouched() {
        let mut comp = Compressor::new(48000.0);
        comp.prepare(48000.0, 64).unwrap();
        comp.set_threshold(-40.0);

        let third: Vec<Sample> = (0..64).map(|n| n as f64 * 0.01).collect();
        let mut block =
            AudioBlock::from_channels(vec![vec![0.9; 64], vec![0.9; 64], third.clone()]);
        comp.process_block(&mut block);

        assert!(block.channel(0).unwrap()[63] < 0.9);
        assert_eq!(block.channel(2).unwrap(), third.as_slice());
    }
}
