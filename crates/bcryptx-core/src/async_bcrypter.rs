//! Async facade
//!
//! Hashing and tuning block for tens of milliseconds to seconds, so every
//! call is moved onto tokio's blocking pool. The wrapped [`Bcrypter`] is
//! shared, which keeps tuned costs and the concurrency gate common to all
//! clones.
//!
//! Generation first waits on an async semaphore sized to the concurrency
//! limit, so queued requests park as tasks and only requests that can run
//! occupy a blocking thread.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::{Bcrypt, Bcrypter, Error, HashPrimitive, Result, Tier, TunedCosts, TuningReport};

pub struct AsyncBcrypter<P = Bcrypt> {
    inner: Arc<Bcrypter<P>>,
    slots: Arc<Semaphore>,
}

impl<P> Clone for AsyncBcrypter<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<P: HashPrimitive + 'static> AsyncBcrypter<P> {
    pub fn new(inner: Bcrypter<P>) -> Self {
        Self::from_arc(Arc::new(inner))
    }

    pub fn from_arc(inner: Arc<Bcrypter<P>>) -> Self {
        let slots = Arc::new(Semaphore::new(inner.config().concurrency_limit.max(1)));
        Self { inner, slots }
    }

    /// The shared blocking facade
    pub fn blocking(&self) -> &Arc<Bcrypter<P>> {
        &self.inner
    }

    pub async fn tune(&self) -> Result<TuningReport> {
        self.run(|bcx| bcx.tune()).await
    }

    pub async fn current_costs(&self) -> Result<TunedCosts> {
        self.run(|bcx| bcx.current_costs()).await
    }

    pub async fn generate(&self, tier: Tier, password: impl Into<String>) -> Result<String> {
        let password = password.into();
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|e| Error::Internal(format!("generation slots closed: {e}")))?;
        self.run(move |bcx| {
            let _permit = permit;
            bcx.generate(tier, &password)
        })
        .await
    }

    pub async fn generate_quick(&self, password: impl Into<String>) -> Result<String> {
        self.generate(Tier::Quick, password).await
    }

    pub async fn generate_strong(&self, password: impl Into<String>) -> Result<String> {
        self.generate(Tier::Strong, password).await
    }

    pub async fn compare(&self, hash: impl Into<String>, password: impl Into<String>) -> Result<()> {
        let (hash, password) = (hash.into(), password.into());
        self.run(move |bcx| bcx.compare(&hash, &password)).await
    }

    pub async fn is_cost(&self, tier: Tier, hash: impl Into<String>) -> Result<()> {
        let hash = hash.into();
        self.run(move |bcx| bcx.is_cost(tier, &hash)).await
    }

    pub async fn is_cost_quick(&self, hash: impl Into<String>) -> Result<()> {
        self.is_cost(Tier::Quick, hash).await
    }

    pub async fn is_cost_strong(&self, hash: impl Into<String>) -> Result<()> {
        self.is_cost(Tier::Strong, hash).await
    }

    /// Parsing is cheap, so this one runs inline
    pub fn validate_hash(&self, hash: &str) -> Result<u32> {
        self.inner.validate_hash(hash)
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Bcrypter<P>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(inner.as_ref()))
            .await
            .map_err(|e| Error::Internal(format!("blocking hash task failed: {e}")))?
    }
}

impl<P: HashPrimitive + 'static> From<Bcrypter<P>> for AsyncBcrypter<P> {
    fn from(inner: Bcrypter<P>) -> Self {
        Self::new(inner)
    }
}
