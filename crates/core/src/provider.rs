//! Capability contract shared by every image provider.

use std::sync::Arc;

use async_trait::async_trait;

use crate::image::SearchOutcome;

/// An upstream image search API.
///
/// Implementations fetch one native page at a time; the aggregation engine
/// decides which pages to ask for and which slice of each page to keep.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Fetch one native page (1-based) for a query.
    async fn search(&self, page: u64, query: &str) -> SearchOutcome;

    /// Short provider name, also used as the id namespace.
    fn name(&self) -> &'static str;

    /// Declared cache lifetime for this provider's responses, in seconds.
    ///
    /// Reported for completeness; the response cache uses one fixed TTL.
    fn ttl_seconds(&self) -> i64;

    /// Number of items in one native page.
    fn page_size(&self) -> usize;
}

/// A provider together with its interleave position.
#[derive(Clone)]
pub struct ProviderRegistration {
    pub provider: Arc<dyn ImageProvider>,
    pub index: usize,
}

impl std::fmt::Debug for ProviderRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistration")
            .field("provider", &self.provider.name())
            .field("index", &self.index)
            .finish()
    }
}

/// Assign interleave positions in the given order.
pub fn register(providers: Vec<Arc<dyn ImageProvider>>) -> Vec<ProviderRegistration> {
    providers
        .into_iter()
        .enumerate()
        .map(|(index, provider)| ProviderRegistration { provider, index })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl ImageProvider for Named {
        async fn search(&self, _page: u64, _query: &str) -> SearchOutcome {
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            self.0
        }

        fn ttl_seconds(&self) -> i64 {
            86_400
        }

        fn page_size(&self) -> usize {
            10
        }
    }

    #[test]
    fn test_register_preserves_order() {
        let registrations = register(vec![Arc::new(Named("a")), Arc::new(Named("b")), Arc::new(Named("c"))]);

        let names: Vec<_> = registrations.iter().map(|r| (r.index, r.provider.name())).collect();
        assert_eq!(names, vec![(0, "a"), (1, "b"), (2, "c")]);
    }
}
