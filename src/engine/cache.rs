use ahash::AHashSet;
use std::sync::Mutex;

/// Record types whose mapping was already pushed by this engine.
///
/// Append-only during normal use; `clear` exists for tests and for callers
/// that recreate indexes.
#[derive(Debug, Default)]
pub struct MappingCache {
    updated: Mutex<AHashSet<String>>,
}

impl MappingCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `type_name`; false when it was already present.
    pub fn mark(&self, type_name: &str) -> bool {
        self.lock().insert(type_name.to_string())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.lock().contains(type_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AHashSet<String>> {
        self.updated.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_is_once_per_type() {
        let cache = MappingCache::new();
        assert!(cache.mark("book"));
        assert!(!cache.mark("book"));
        assert!(cache.mark("author"));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("book"));

        cache.clear();
        assert!(cache.is_empty());
    }
}
