use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::error;

use ghost_utils::formatting::{fallback_display_name, format_display_name};

use crate::network::{ChatNetwork, UserLookup};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub display_name: String,
}

impl UserProfile {
    pub fn from_lookup(id: u64, lookup: UserLookup) -> Self {
        let display_name =
            format_display_name(&lookup.first_name, &lookup.last_name, &lookup.username);
        Self {
            id,
            first_name: lookup.first_name,
            last_name: lookup.last_name,
            username: lookup.username,
            display_name,
        }
    }

    /// Placeholder returned when the network lookup fails.
    pub fn unresolved(id: u64) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            username: String::new(),
            display_name: fallback_display_name(id),
        }
    }
}

/// Sender id to profile cache. Entries live for the whole process and are never
/// refreshed; failed lookups are not cached.
#[derive(Clone)]
pub struct UserDirectory {
    network: Arc<dyn ChatNetwork>,
    cache: Arc<RwLock<HashMap<u64, UserProfile>>>,
}

impl UserDirectory {
    pub fn new(network: Arc<dyn ChatNetwork>) -> Self {
        Self {
            network,
            cache: Arc::default(),
        }
    }

    pub async fn resolve(&self, user_id: u64) -> UserProfile {
        if let Some(profile) = self.cache.read().await.get(&user_id) {
            return profile.clone();
        }

        match self.network.lookup_user(user_id).await {
            Ok(lookup) => {
                let profile = UserProfile::from_lookup(user_id, lookup);
                self.cache
                    .write()
                    .await
                    .entry(user_id)
                    .or_insert(profile)
                    .clone()
            }
            Err(err) => {
                error!(?err, user_id, "failed to fetch user info");
                UserProfile::unresolved(user_id)
            }
        }
    }

    /// Cached display name, without touching the network.
    pub async fn cached_display_name(&self, user_id: u64) -> Option<String> {
        self.cache
            .read()
            .await
            .get(&user_id)
            .map(|profile| profile.display_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::{UserDirectory, UserProfile};
    use crate::network::{ChatNetwork, SelfIdentity, UpdateSink, UserLookup, WireMessage};

    #[derive(Default)]
    struct LookupOnly {
        failing: AtomicBool,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl ChatNetwork for LookupOnly {
        async fn login(&self, _updates: UpdateSink) -> anyhow::Result<SelfIdentity> {
            anyhow::bail!("unused")
        }

        async fn disconnect(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn send_message(&self, _user_id: u64, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn lookup_user(&self, user_id: u64) -> anyhow::Result<UserLookup> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                anyhow::bail!("flood wait");
            }
            Ok(UserLookup {
                first_name: "Ada".to_owned(),
                last_name: "Lovelace".to_owned(),
                username: format!("ada{user_id}"),
            })
        }

        async fn fetch_messages(
            &self,
            _user_id: u64,
            _offset_id: u64,
            _limit: u8,
        ) -> anyhow::Result<Vec<WireMessage>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn resolves_and_formats_profile() {
        let directory = UserDirectory::new(Arc::new(LookupOnly::default()));
        let profile = directory.resolve(3).await;

        assert_eq!(profile.id, 3);
        assert_eq!(profile.display_name, "Ada Lovelace (ada3)");
        assert_eq!(
            directory.cached_display_name(3).await.as_deref(),
            Some("Ada Lovelace (ada3)")
        );
    }

    #[tokio::test]
    async fn cached_profile_survives_later_lookup_failures() {
        let network = Arc::new(LookupOnly::default());
        let directory = UserDirectory::new(network.clone());

        let first = directory.resolve(8).await;
        network.failing.store(true, Ordering::SeqCst);
        let second = directory.resolve(8).await;

        assert_eq!(first, second);
        assert_eq!(network.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_lookup_yields_placeholder_and_is_retried() {
        let network = Arc::new(LookupOnly::default());
        network.failing.store(true, Ordering::SeqCst);
        let directory = UserDirectory::new(network.clone());

        let profile = directory.resolve(77).await;
        assert_eq!(profile, UserProfile::unresolved(77));
        assert_eq!(profile.display_name, "User 77");
        assert!(profile.username.is_empty());
        assert_eq!(directory.cached_display_name(77).await, None);

        network.failing.store(false, Ordering::SeqCst);
        assert_eq!(directory.resolve(77).await.display_name, "Ada Lovelace (ada77)");
        assert_eq!(network.lookups.load(Ordering::SeqCst), 2);
    }
}
