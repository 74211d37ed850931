//! # cdmasim-sim
//!
//! Channel simulators built on `cdmasim-core`.
//!
//! - [`cdma`]: two users sharing a Gold code family over a noisy channel
//! - [`link`]: one user through the bit-domain XOR chain with error injection
//! - [`sweep`]: BER vs channel noise, in parallel
//! - [`report`]: plain-text reports of a run
//! - [`config`]: YAML configuration with search path
//!
//! ## Example
//!
//! ```rust
//! use cdmasim_sim::{CdmaParams, CdmaSimulator};
//! use rand::SeedableRng;
//!
//! let sim = CdmaSimulator::new(CdmaParams::default()).unwrap();
//! let result = sim.run(&mut rand::rngs::StdRng::seed_from_u64(3)).unwrap();
//! assert_eq!(result.code_length(), 1023);
//! println!("{}", result);
//! ```

pub mod cdma;
pub mod channel;
pub mod config;
pub mod link;
pub mod report;
pub mod sweep;

pub use cdma::{
    separate_seeds, CdmaParams, CdmaResult, CdmaSimulator, CodeMetrics, DataSource, UserParams,
    UserResult,
};
pub use channel::AwgnChannel;
pub use config::{ConfigError, ConfigOrigin, OutputConfig, SimConfig};
pub use link::{LinkParams, LinkResult, LinkSimulator};
pub use sweep::{BerCurve, NoiseSweep, SweepParams, SweepPoint};
