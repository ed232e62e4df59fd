//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use gcommon::{GenerationOptions, SessionId};
//!
//! let session = SessionId::from("session-1");
//! let options = GenerationOptions::default().with_temperature(0.3).with_top_p(0.9);
//!
//! assert_eq!(session.as_str(), "session-1");
//! assert_eq!(options.top_p, Some(0.9));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use gcommon::BoxFuture;
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
    //! Session key newtype used to partition conversation state.
    //!
    //! ```rust
    //! use gcommon::SessionId;
    //!
    //! let session = SessionId::new("session-42");
    //! assert_eq!(session.to_string(), "session-42");
    //! assert_eq!(SessionId::default().as_str(), "default");
    //! ```

    use std::fmt::{Display, Formatter};

    pub const DEFAULT_SESSION: &str = "default";

    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct SessionId(String);

    impl SessionId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Default for SessionId {
        fn default() -> Self {
            Self(DEFAULT_SESSION.to_string())
        }
    }

    impl Display for SessionId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for SessionId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for SessionId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod model {
    //! Fixed generation settings applied to every provider call.
    //!
    //! ```rust
    //! use gcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_output_tokens(128)
    //!     .with_top_p(0.95);
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_output_tokens, Some(128));
    //! assert_eq!(options.top_p, Some(0.95));
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_output_tokens: Option<u32>,
        /// Nucleus-sampling cutoff.
        pub top_p: Option<f32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
            self.max_output_tokens = Some(max_output_tokens);
            self
        }

        pub fn with_top_p(mut self, top_p: f32) -> Self {
            self.top_p = Some(top_p);
            self
        }
    }
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! ```rust
    //! use gcommon::Registry;
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

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{DEFAULT_SESSION, SessionId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;
