//! Concurrent name → upstream store.
//!
//! # Responsibilities
//! - Own the name → callback map
//! - Atomic insert-or-replace under arbitrary concurrent callers
//! - Hand out owned point-in-time snapshots for dispatch jobs
//!
//! # Design Decisions
//! - Sharded concurrent map (dashmap); no lock is ever held across I/O
//! - Replacement is a single atomic insert, so the new/replaced distinction
//!   reported to the caller can never be torn by a concurrent register
//! - A snapshot never observes a half-replaced entry for a name

use dashmap::DashMap;
use url::Url;

use crate::registry::upstream::Upstream;

/// Result of a register call, used for logging which case occurred.
#[derive(Debug)]
pub enum Registration {
    /// The name was not known before.
    New,
    /// The name was already registered; carries the callback it replaced.
    Replaced(Url),
}

/// The name → upstream map. Shared via `Arc` between the registration
/// handler and the dispatcher; the dispatcher only ever reads snapshots.
#[derive(Debug, Default)]
pub struct Registry {
    upstreams: DashMap<String, Upstream>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` under `callback`, replacing any previous callback
    /// for that name.
    pub fn register(&self, name: impl Into<String>, callback: Url) -> Registration {
        let name = name.into();
        let entry = Upstream::new(name.clone(), callback);
        match self.upstreams.insert(name, entry) {
            Some(previous) => Registration::Replaced(previous.callback),
            None => Registration::New,
        }
    }

    /// Owned point-in-time copy of the current upstream set. Registrations
    /// arriving after this call do not affect the returned set.
    pub fn snapshot(&self) -> Vec<Upstream> {
        self.upstreams.iter().map(|e| e.value().clone()).collect()
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.upstreams.len()
    }

    /// True if nothing has registered yet.
    pub fn is_empty(&self) -> bool {
        self.upstreams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn register_then_snapshot() {
        let registry = Registry::new();
        registry.register("a", url("http://h1:1"));

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "a");
        assert_eq!(snapshot[0].callback.as_str(), "http://h1:1/");
    }

    #[test]
    fn reregister_replaces_callback() {
        let registry = Registry::new();
        registry.register("a", url("http://h1:1"));
        let outcome = registry.register("a", url("http://h2:2"));

        match outcome {
            Registration::Replaced(old) => assert_eq!(old.as_str(), "http://h1:1/"),
            Registration::New => panic!("expected replacement"),
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].callback.as_str(), "http://h2:2/");
    }

    #[test]
    fn snapshot_is_isolated_from_later_registers() {
        let registry = Registry::new();
        registry.register("a", url("http://h1:1"));

        let snapshot = registry.snapshot();
        registry.register("b", url("http://h2:2"));
        registry.register("a", url("http://h3:3"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].callback.as_str(), "http://h1:1/");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn concurrent_registers_last_writer_wins_per_name() {
        let registry = Arc::new(Registry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for n in 0..100 {
                        let port = i * 100 + n + 1;
                        registry.register("app", url(&format!("http://h:{}", port)));
                        registry.register(format!("worker-{}", i), url("http://w:1"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // One entry per distinct name, each with exactly one callback.
        assert_eq!(registry.len(), 9);
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.iter().filter(|u| u.name == "app").count(), 1);
    }
}
