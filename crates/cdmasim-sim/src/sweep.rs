//! BER vs Noise Sweep
//!
//! Repeats the two-user simulation over a list of channel noise levels and
//! accumulates per-user error counts into a BER curve.
//!
//! Levels run in parallel on the rayon pool. Level `i` draws from its own
//! `StdRng` seeded with `base_seed + i`, so a curve depends only on its
//! parameters and not on thread scheduling.
//!
//! `trials` caps the runs per level. With a [`BerTarget`], a level stops
//! as soon as both users have reached it, so noisy levels finish early
//! while clean ones keep going up to the cap.

use crate::cdma::{CdmaParams, CdmaSimulator};
use cdmasim_core::ber::{theoretical_spread_ber, BerTarget, BerTester};
use cdmasim_core::{SimError, SimResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Sweep settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepParams {
    /// Noise standard deviations to visit
    pub noise_levels: Vec<f64>,
    /// Maximum runs per level
    pub trials: usize,
    /// Stop a level early once both users reach this; `None` always runs
    /// `trials` times
    pub target: Option<BerTarget>,
    /// Seed of the first level; level `i` uses `base_seed + i`
    pub base_seed: u64,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            noise_levels: vec![0.0, 5.0, 10.0, 20.0, 30.0, 40.0],
            trials: 10,
            target: Some(BerTarget::default()),
            base_seed: 42,
        }
    }
}

/// One measured point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Channel noise standard deviation
    pub noise_std: f64,
    /// Runs performed
    pub trials: usize,
    /// Measured BER of user A
    pub ber_a: f64,
    /// Measured BER of user B
    pub ber_b: f64,
    /// Bits of user A tested
    pub bits_a: u64,
    /// Bits of user B tested
    pub bits_b: u64,
    /// Errors of user A
    pub errors_a: u64,
    /// Errors of user B
    pub errors_b: u64,
    /// Single-user theoretical BER at this noise level
    pub theoretical: f64,
}

/// BER vs noise curve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BerCurve {
    points: Vec<SweepPoint>,
}

impl BerCurve {
    /// All points, in noise-level order.
    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    /// Export as CSV.
    pub fn to_csv(&self) -> String {
        let mut csv =
            String::from("noise_std,trials,ber_a,ber_b,bits_a,bits_b,errors_a,errors_b,theoretical\n");
        for p in &self.points {
            csv.push_str(&format!(
                "{:.4},{},{:.10},{:.10},{},{},{},{},{:.10}\n",
                p.noise_std,
                p.trials,
                p.ber_a,
                p.ber_b,
                p.bits_a,
                p.bits_b,
                p.errors_a,
                p.errors_b,
                p.theoretical
            ));
        }
        csv
    }
}

/// Prepared noise sweep.
#[derive(Debug, Clone)]
pub struct NoiseSweep {
    levels: Vec<CdmaSimulator>,
    params: SweepParams,
}

impl NoiseSweep {
    /// Validate the template and every noise level.
    ///
    /// The codes are generated once and shared by all levels. The
    /// template's own `noise_std` is ignored.
    pub fn new(template: &CdmaParams, params: SweepParams) -> SimResult<Self> {
        if params.noise_levels.is_empty() {
            return Err(SimError::DegenerateInput("sweep has no noise levels".to_string()));
        }
        if params.trials == 0 {
            return Err(SimError::DegenerateInput("sweep has zero trials".to_string()));
        }
        let base = CdmaSimulator::new(template.clone())?;
        let levels = params
            .noise_levels
            .iter()
            .map(|&noise_std| base.with_noise(noise_std))
            .collect::<SimResult<Vec<_>>>()?;
        Ok(Self { levels, params })
    }

    /// Sweep settings.
    pub fn params(&self) -> &SweepParams {
        &self.params
    }

    /// Run every level.
    pub fn run(&self) -> SimResult<BerCurve> {
        tracing::info!(
            levels = self.levels.len(),
            trials = self.params.trials,
            base_seed = self.params.base_seed,
            "starting noise sweep"
        );
        let points = self
            .levels
            .par_iter()
            .enumerate()
            .map(|(i, sim)| {
                let mut rng = StdRng::seed_from_u64(self.params.base_seed.wrapping_add(i as u64));
                measure_level(sim, self.params.trials, self.params.target, &mut rng)
            })
            .collect::<SimResult<Vec<_>>>()?;
        Ok(BerCurve { points })
    }
}

fn measure_level(
    sim: &CdmaSimulator,
    max_trials: usize,
    target: Option<BerTarget>,
    rng: &mut StdRng,
) -> SimResult<SweepPoint> {
    let mut tester_a = BerTester::new();
    let mut tester_b = BerTester::new();
    let mut trials = 0;
    while trials < max_trials {
        let result = sim.run(rng)?;
        tester_a.update(&result.user_a.original, &result.user_a.decoded)?;
        tester_b.update(&result.user_b.original, &result.user_b.decoded)?;
        trials += 1;
        if target.is_some_and(|t| t.is_met(&tester_a) && t.is_met(&tester_b)) {
            break;
        }
    }

    let noise_std = sim.params().noise_std;
    tracing::debug!(
        noise_std,
        trials,
        ber_a = tester_a.ber(),
        ber_b = tester_b.ber(),
        "sweep level done"
    );

    Ok(SweepPoint {
        noise_std,
        trials,
        ber_a: tester_a.ber(),
        ber_b: tester_b.ber(),
        bits_a: tester_a.total_bits(),
        bits_b: tester_b.total_bits(),
        errors_a: tester_a.error_bits(),
        errors_b: tester_b.error_bits(),
        theoretical: theoretical_spread_ber(sim.metrics().code_length, noise_std),
    })
}
