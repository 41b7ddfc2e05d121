use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local cache of resolved role display names, keyed by the full
/// role-definition identifier.
///
/// Populated lazily, never invalidated within a run. A poisoned lock
/// degrades to a cache miss rather than failing the caller.
#[derive(Debug, Default)]
pub struct RoleNameCache {
    entries: Mutex<HashMap<String, String>>,
}

impl RoleNameCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached display name for a role-definition identifier.
    #[must_use]
    pub fn get(&self, role_definition_id: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(role_definition_id).cloned())
    }

    /// Stores a resolved display name.
    pub fn insert(&self, role_definition_id: &str, role_name: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(role_definition_id.to_owned(), role_name.to_owned());
        }
    }
}

/// Process-local cache of subscription display names, keyed by subscription
/// id.
#[derive(Debug, Default)]
pub struct SubscriptionNameCache {
    entries: Mutex<HashMap<String, String>>,
}

impl SubscriptionNameCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached display name for a subscription id.
    #[must_use]
    pub fn get(&self, subscription_id: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(subscription_id).cloned())
    }

    /// Stores a resolved display name.
    pub fn insert(&self, subscription_id: &str, display_name: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(subscription_id.to_owned(), display_name.to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RoleNameCache;

    #[test]
    fn cache_returns_inserted_values() {
        let cache = RoleNameCache::new();
        assert_eq!(cache.get("/roleDefinitions/abc"), None);

        cache.insert("/roleDefinitions/abc", "Contributor");
        assert_eq!(
            cache.get("/roleDefinitions/abc").as_deref(),
            Some("Contributor")
        );
    }
}
