//! Hashing facade over tuned quick and strong costs

use std::fmt;

use crate::estimator::estimate;
use crate::gate::Gate;
use crate::state::TunedState;
use crate::{Bcrypt, Error, HashPrimitive, Result, Tier, TunedCosts, TunerConfig, TuningReport};

/// Generates and checks password hashes at host-tuned costs
///
/// Costs are tuned on first use unless [`tune`](Self::tune) is called
/// beforehand. Hash generation is limited to
/// [`TunerConfig::concurrency_limit`] calls at a time; comparison and
/// inspection are not limited.
pub struct Bcrypter<P = Bcrypt> {
    config: TunerConfig,
    primitive: P,
    state: TunedState,
    gate: Gate,
}

impl Bcrypter<Bcrypt> {
    /// Create a bcrypt-backed instance; unset config fields take defaults
    pub fn new(config: TunerConfig) -> Self {
        Self::with_primitive(config, Bcrypt)
    }
}

impl Default for Bcrypter<Bcrypt> {
    fn default() -> Self {
        Self::new(TunerConfig::default())
    }
}

impl<P: HashPrimitive> Bcrypter<P> {
    pub fn with_primitive(config: TunerConfig, primitive: P) -> Self {
        let config = config.normalized();
        Self {
            gate: Gate::new(config.concurrency_limit),
            config,
            primitive,
            state: TunedState::new(),
        }
    }

    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// Free hash generation slots right now
    pub fn available_slots(&self) -> usize {
        self.gate.available()
    }

    /// Tune both costs now, replacing any previous result
    ///
    /// Waits for an in-flight run to finish first. On error the previous
    /// costs (if any) stay in place.
    pub fn tune(&self) -> Result<TuningReport> {
        self.state.retune(|| self.estimate())
    }

    /// Current cost pair, tuning first if unset
    pub fn current_costs(&self) -> Result<TunedCosts> {
        self.state.current(|| self.estimate())
    }

    pub fn current_cost(&self, tier: Tier) -> Result<u32> {
        self.current_costs().map(|costs| costs.cost(tier))
    }

    pub fn current_quick_cost(&self) -> Result<u32> {
        self.current_cost(Tier::Quick)
    }

    pub fn current_strong_cost(&self) -> Result<u32> {
        self.current_cost(Tier::Strong)
    }

    /// Hash `password` at the tier's cost
    pub fn generate(&self, tier: Tier, password: &str) -> Result<String> {
        let _permit = self.gate.acquire();
        let cost = self.current_cost(tier)?;
        tracing::trace!(%tier, cost, "Generating hash");
        self.primitive.generate(password.as_bytes(), cost)
    }

    pub fn generate_quick(&self, password: &str) -> Result<String> {
        self.generate(Tier::Quick, password)
    }

    pub fn generate_strong(&self, password: &str) -> Result<String> {
        self.generate(Tier::Strong, password)
    }

    /// Check `password` against `hash`
    pub fn compare(&self, hash: &str, password: &str) -> Result<()> {
        self.primitive.compare(hash, password.as_bytes())
    }

    /// Succeeds if `hash` was generated at or above the tier's cost
    ///
    /// Returns [`Error::CostBelowThreshold`] for cheaper hashes and
    /// [`Error::MalformedHash`] for anything that is not a hash.
    pub fn is_cost(&self, tier: Tier, hash: &str) -> Result<()> {
        let cost = self.primitive.extract_cost(hash)?;
        let threshold = self.current_cost(tier)?;
        if cost < threshold {
            return Err(Error::CostBelowThreshold {
                tier,
                cost,
                threshold,
            });
        }
        Ok(())
    }

    pub fn is_cost_quick(&self, hash: &str) -> Result<()> {
        self.is_cost(Tier::Quick, hash)
    }

    pub fn is_cost_strong(&self, hash: &str) -> Result<()> {
        self.is_cost(Tier::Strong, hash)
    }

    /// Cost encoded in `hash`, whatever it is
    pub fn validate_hash(&self, hash: &str) -> Result<u32> {
        self.primitive.extract_cost(hash)
    }

    /// Highest tier `hash` satisfies, or `None` if it is below both
    pub fn tier_of(&self, hash: &str) -> Result<Option<Tier>> {
        let cost = self.primitive.extract_cost(hash)?;
        let costs = self.current_costs()?;
        Ok(Tier::ALL
            .into_iter()
            .rev()
            .find(|tier| cost >= costs.cost(*tier)))
    }

    fn estimate(&self) -> Result<TuningReport> {
        estimate(&self.primitive, &self.config)
    }
}

impl<P> fmt::Debug for Bcrypter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bcrypter")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
