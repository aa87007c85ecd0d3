//! bcryptx-core: bcrypt cost tiers tuned to the host machine
//!
//! Picking a bcrypt cost by hand means guessing how fast the production
//! hardware is. This crate measures it instead: it times a few cheap hashes,
//! extrapolates the rest of the cost range, and derives two costs from two
//! latency budgets:
//!
//! - **Quick**: the highest cost that hashes within `quick_max_latency`
//!   (default 500ms), for interactive paths
//! - **Strong**: the highest cost that hashes within `strong_max_latency`
//!   (default 2000ms), for credentials worth the wait
//!
//! ## Lifecycle
//!
//! | Step | What happens |
//! |------|--------------|
//! | `Bcrypter::new` | config stored, no hashing yet |
//! | first cost read | tuning runs once, concurrent readers wait for it |
//! | `Bcrypter::tune` | tuning runs again, replacing both costs |
//!
//! Tuned costs live in memory only; a restarted process tunes again.
//!
//! ## Failure policy
//!
//! A budget that no cost can meet is a configuration error and surfaces as
//! [`Error::TuningInfeasible`]. An unusable cost is never handed to bcrypt.
//!
//! ```no_run
//! use bcryptx_core::{Bcrypter, TunerConfig};
//! use std::time::Duration;
//!
//! let bcx = Bcrypter::new(
//!     TunerConfig::new()
//!         .with_quick_max_latency(Duration::from_millis(400))
//!         .with_strong_max_latency(Duration::from_millis(1600)),
//! );
//! bcx.tune()?;
//!
//! let hash = bcx.generate_quick("12345")?;
//! assert!(bcx.compare(&hash, "spaceballs").is_err());
//! assert!(bcx.is_cost_strong(&hash).is_err());
//! # Ok::<(), bcryptx_core::Error>(())
//! ```

#[cfg(feature = "tokio")]
mod async_bcrypter;
mod bcrypter;
mod config;
mod error;
pub mod estimator;
pub mod gate;
mod primitive;
mod state;
mod tier;

#[cfg(feature = "tokio")]
pub use async_bcrypter::AsyncBcrypter;
pub use bcrypter::Bcrypter;
pub use config::{
    TunerConfig, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_QUICK_MAX_LATENCY, DEFAULT_STRONG_MAX_LATENCY,
};
pub use error::Error;
pub use estimator::{LatencyTable, TunedCosts, TuningReport};
pub use primitive::{Bcrypt, HashPrimitive};
pub use state::TunedState;
pub use tier::Tier;

pub type Result<T> = std::result::Result<T, Error>;
