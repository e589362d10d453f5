//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use mcommon::{Deadline, GenerationOptions, MetadataMap, RequestId};
//!
//! let request = RequestId::from("req-1");
//! let deadline = Deadline::after(Duration::from_secs(15));
//! let mut metadata = MetadataMap::new();
//! metadata.insert("client".to_string(), "web".to_string());
//!
//! let options = GenerationOptions::default().with_temperature(0.3);
//! assert_eq!(request.as_str(), "req-1");
//! assert!(!deadline.is_expired());
//! assert_eq!(options.temperature, Some(0.3));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use mcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Shared metadata and request correlation identifiers.
    //!
    //! ```rust
    //! use mcommon::{MetadataMap, RequestId};
    //!
    //! let request = RequestId::new("req-42");
    //! let mut metadata = MetadataMap::new();
    //! metadata.insert("env".to_string(), "test".to_string());
    //!
    //! assert_eq!(request.to_string(), "req-42");
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub type MetadataMap = HashMap<String, String>;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct RequestId(String);

    impl RequestId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        /// Builds a process-unique id from the wall clock and a counter.
        pub fn generate() -> Self {
            static COUNTER: AtomicU64 = AtomicU64::new(0);

            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_millis())
                .unwrap_or_default();
            let sequence = COUNTER.fetch_add(1, Ordering::Relaxed);
            Self(format!("req-{millis:x}-{sequence}"))
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for RequestId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for RequestId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for RequestId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod model {
    //! Shared generation settings used by request types.
    //!
    //! ```rust
    //! use mcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128);
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(128));
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }
    }
}

pub mod deadline {
    //! Wall-clock budgets threaded through network calls.
    //!
    //! ```rust
    //! use std::time::Duration;
    //!
    //! use mcommon::Deadline;
    //!
    //! let outer = Deadline::after(Duration::from_secs(30));
    //! let inner = outer.tighten(Duration::from_secs(15));
    //! assert!(inner.remaining() <= Duration::from_secs(15));
    //! ```

    use std::time::{Duration, Instant};

    /// Cap for budgets the clock cannot represent.
    const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

    pub(crate) fn saturating_after(now: Instant, budget: Duration) -> Instant {
        now.checked_add(budget)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now)
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    pub struct Deadline {
        expires_at: Instant,
    }

    impl Deadline {
        pub fn at(expires_at: Instant) -> Self {
            Self { expires_at }
        }

        /// Saturates to a far-future deadline when `budget` overflows the clock.
        pub fn after(budget: Duration) -> Self {
            Self::at(saturating_after(Instant::now(), budget))
        }

        pub fn expires_at(&self) -> Instant {
            self.expires_at
        }

        /// Time left before expiry, zero once expired.
        pub fn remaining(&self) -> Duration {
            self.expires_at.saturating_duration_since(Instant::now())
        }

        pub fn is_expired(&self) -> bool {
            self.remaining().is_zero()
        }

        /// Returns whichever is sooner: this deadline or `budget` from now.
        pub fn tighten(&self, budget: Duration) -> Self {
            (*self).min(Self::after(budget))
        }
    }
}

pub mod cache {
    //! Expiring single-value cache for lazily refreshed credentials.
    //!
    //! Readers check expiry under a read lock; on a miss the refresh runs
    //! without holding any lock and the result is written back. Concurrent
    //! misses may refresh redundantly, the last writer wins.
    //!
    //! ```rust
    //! use std::time::Duration;
    //!
    //! use mcommon::TokenCache;
    //!
    //! let cache = TokenCache::<String>::new(Duration::from_secs(30));
    //! assert_eq!(cache.get(), None);
    //!
    //! cache.store("abc".to_string(), Duration::from_secs(3600));
    //! assert_eq!(cache.get().as_deref(), Some("abc"));
    //! ```

    use std::future::Future;
    use std::sync::RwLock;
    use std::time::{Duration, Instant};

    #[derive(Debug)]
    struct CachedValue<T> {
        value: T,
        expires_at: Instant,
    }

    #[derive(Debug)]
    pub struct TokenCache<T> {
        slot: RwLock<Option<CachedValue<T>>>,
        refresh_margin: Duration,
    }

    impl<T> TokenCache<T>
    where
        T: Clone,
    {
        /// `refresh_margin` treats values as expired slightly early.
        pub fn new(refresh_margin: Duration) -> Self {
            Self {
                slot: RwLock::new(None),
                refresh_margin,
            }
        }

        pub fn get(&self) -> Option<T> {
            let slot = self.slot.read().ok()?;
            let cached = slot.as_ref()?;
            let refresh_at = crate::deadline::saturating_after(Instant::now(), self.refresh_margin);
            if refresh_at >= cached.expires_at {
                return None;
            }

            Some(cached.value.clone())
        }

        pub fn store(&self, value: T, ttl: Duration) {
            let cached = CachedValue {
                value,
                expires_at: crate::deadline::saturating_after(Instant::now(), ttl),
            };

            // A poisoned slot only holds a cache entry, so overwrite it.
            match self.slot.write() {
                Ok(mut slot) => *slot = Some(cached),
                Err(poisoned) => *poisoned.into_inner() = Some(cached),
            }
        }

        pub fn invalidate(&self) {
            match self.slot.write() {
                Ok(mut slot) => *slot = None,
                Err(poisoned) => *poisoned.into_inner() = None,
            }
        }

        /// Returns the cached value or runs `refresh`, which yields the new
        /// value and its time-to-live.
        pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<T, E>
        where
            F: FnOnce() -> Fut,
            Fut: Future<Output = Result<(T, Duration), E>>,
        {
            if let Some(value) = self.get() {
                return Ok(value);
            }

            let (value, ttl) = refresh().await?;
            self.store(value.clone(), ttl);
            Ok(value)
        }
    }
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! ```rust
    //! use mcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use cache::TokenCache;
pub use context::{MetadataMap, RequestId};
pub use deadline::Deadline;
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;
