//! Concurrent fan-out over providers and round-robin merge.
//!
//! Every `(provider, fetch plan)` pair becomes one task. Each task knows where
//! its items land in the output before it starts, so the merged buffer does
//! not depend on the order in which tasks finish.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;

use crate::Error;
use crate::image::NormalizedImage;
use crate::paging::{FetchPlan, UNIFIED_PAGE_SIZE, translate};
use crate::provider::{ImageProvider, ProviderRegistration, register};

/// Items from one native-page fetch, already clamped to its plan.
#[derive(Debug, Clone)]
pub struct Placement {
    pub provider_index: usize,
    /// Position of the first item within this provider's share of the page.
    pub local_start: usize,
    pub items: Vec<NormalizedImage>,
    pub succeeded: bool,
}

/// Fixed-size output buffer interleaving providers round-robin.
///
/// Item `i` of a placement lands at `(local_start + i) * providers + provider_index`.
/// Slots nobody fills keep the zero value.
#[derive(Debug)]
pub struct MergeBuffer {
    slots: Vec<NormalizedImage>,
    providers: usize,
    reported: usize,
    succeeded: usize,
}

impl MergeBuffer {
    pub fn new(page_size: usize, providers: usize) -> Self {
        Self { slots: vec![NormalizedImage::default(); page_size * providers], providers, reported: 0, succeeded: 0 }
    }

    /// Write one placement into its slots.
    pub fn place(&mut self, placement: Placement) {
        self.reported += 1;
        if placement.succeeded {
            self.succeeded += 1;
        }

        for (offset, item) in placement.items.into_iter().enumerate() {
            let index = (placement.local_start + offset) * self.providers + placement.provider_index;
            if let Some(slot) = self.slots.get_mut(index) {
                *slot = item;
            }
        }
    }

    /// Count a task that never produced a placement (it panicked).
    pub fn record_lost(&mut self) {
        self.reported += 1;
    }

    pub fn reported(&self) -> usize {
        self.reported
    }

    /// The merged page, or `Unavailable` if no fetch succeeded.
    pub fn finish(self) -> Result<Vec<NormalizedImage>, Error> {
        if self.succeeded == 0 {
            return Err(Error::Unavailable(format!("all {} upstream fetches failed", self.reported)));
        }
        Ok(self.slots)
    }
}

/// Keep the plan's slice of a native page, bounded by what was actually returned.
pub fn clamp_to_plan(items: Vec<NormalizedImage>, plan: &FetchPlan) -> Vec<NormalizedImage> {
    let first = plan.first_index.min(items.len());
    let last = plan.last_index.min(items.len());
    items.into_iter().skip(first).take(last - first).collect()
}

/// Fans a unified-page search out over the registered providers.
#[derive(Debug, Clone)]
pub struct Aggregator {
    registrations: Arc<[ProviderRegistration]>,
    page_size: usize,
}

impl Aggregator {
    /// Register providers in order; that order is the interleave order.
    pub fn new(providers: Vec<Arc<dyn ImageProvider>>) -> Self {
        Self { registrations: register(providers).into(), page_size: UNIFIED_PAGE_SIZE }
    }

    /// Override the per-provider unified page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn provider_count(&self) -> usize {
        self.registrations.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn registrations(&self) -> &[ProviderRegistration] {
        &self.registrations
    }

    /// Search one unified page across every provider.
    ///
    /// Returns `page_size * providers` images in interleaved order. Waits for
    /// every fetch task; a provider failure only leaves its slots empty.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unavailable` if every fetch failed (or no provider is
    /// registered).
    pub async fn search(&self, page: u32, query: &str) -> Result<Vec<NormalizedImage>, Error> {
        let start = Instant::now();
        let query: Arc<str> = Arc::from(query);
        let mut tasks = JoinSet::new();
        let mut expected = 0usize;

        for registration in self.registrations.iter() {
            let plans = translate(page, self.page_size, registration.provider.page_size());
            let mut local_start = 0usize;

            for plan in plans {
                let provider = Arc::clone(&registration.provider);
                let provider_index = registration.index;
                let query = Arc::clone(&query);
                let task_start = local_start;

                tracing::debug!(provider = provider.name(), plan = %plan, local_start, "dispatching fetch");

                tasks.spawn(async move {
                    match provider.search(plan.native_page, &query).await {
                        Ok(items) => Placement {
                            provider_index,
                            local_start: task_start,
                            items: clamp_to_plan(items, &plan),
                            succeeded: true,
                        },
                        Err(e) => {
                            tracing::warn!(provider = provider.name(), page = plan.native_page, error = %e, "provider fetch failed");
                            Placement { provider_index, local_start: task_start, items: Vec::new(), succeeded: false }
                        }
                    }
                });

                expected += 1;
                local_start += plan.len();
            }
        }

        let mut merged = MergeBuffer::new(self.page_size, self.registrations.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(placement) => merged.place(placement),
                Err(e) => {
                    tracing::error!(error = %e, "fetch task did not complete");
                    merged.record_lost();
                }
            }
        }
        debug_assert_eq!(merged.reported(), expected);

        let result = merged.finish();
        tracing::info!(
            query = %query,
            page,
            providers = self.registrations.len(),
            fetches = expected,
            ok = result.is_ok(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::SearchOutcome;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves a synthetic corpus of `total` items, `page_size` per page.
    struct FakeProvider {
        name: &'static str,
        page_size: usize,
        total: usize,
        fail: bool,
        delay_ms: u64,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, page_size: usize) -> Self {
            Self { name, page_size, total: usize::MAX, fail: false, delay_ms: 0, calls: AtomicUsize::new(0) }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn with_total(mut self, total: usize) -> Self {
            self.total = total;
            self
        }

        fn with_delay(mut self, delay_ms: u64) -> Self {
            self.delay_ms = delay_ms;
            self
        }
    }

    #[async_trait]
    impl ImageProvider for FakeProvider {
        async fn search(&self, page: u64, _query: &str) -> SearchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                // later pages finish first
                tokio::time::sleep(Duration::from_millis(self.delay_ms / page)).await;
            }
            if self.fail {
                return Err(Error::ProviderTransport("connection refused".into()));
            }
            let origin = (page as usize - 1) * self.page_size;
            let end = (origin + self.page_size).min(self.total);
            Ok((origin..end.max(origin))
                .map(|n| NormalizedImage {
                    id: NormalizedImage::namespaced_id(self.name, n),
                    source_name: self.name.into(),
                    ..Default::default()
                })
                .collect())
        }

        fn name(&self) -> &'static str {
            self.name
        }

        fn ttl_seconds(&self) -> i64 {
            86_400
        }

        fn page_size(&self) -> usize {
            self.page_size
        }
    }

    fn image(id: &str) -> NormalizedImage {
        NormalizedImage { id: id.into(), ..Default::default() }
    }

    fn ids(images: &[NormalizedImage]) -> Vec<&str> {
        images.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_clamp_to_plan() {
        let items: Vec<_> = (0..30).map(|n| image(&n.to_string())).collect();
        let clamped = clamp_to_plan(items, &FetchPlan { native_page: 1, first_index: 25, last_index: 30 });
        assert_eq!(ids(&clamped), vec!["25", "26", "27", "28", "29"]);
    }

    #[test]
    fn test_clamp_short_page() {
        let items: Vec<_> = (0..10).map(|n| image(&n.to_string())).collect();
        let plan = FetchPlan { native_page: 1, first_index: 5, last_index: 20 };
        assert_eq!(clamp_to_plan(items.clone(), &plan).len(), 5);

        let past_end = FetchPlan { native_page: 1, first_index: 15, last_index: 20 };
        assert!(clamp_to_plan(items, &past_end).is_empty());
    }

    #[test]
    fn test_merge_interleaves_round_robin() {
        let mut buffer = MergeBuffer::new(2, 3);
        for provider in 0..3 {
            buffer.place(Placement {
                provider_index: provider,
                local_start: 0,
                items: vec![image(&format!("p{provider}-0")), image(&format!("p{provider}-1"))],
                succeeded: true,
            });
        }

        let merged = buffer.finish().unwrap();
        assert_eq!(ids(&merged), vec!["p0-0", "p1-0", "p2-0", "p0-1", "p1-1", "p2-1"]);
    }

    #[test]
    fn test_merge_independent_of_arrival_order() {
        let placements = vec![
            Placement { provider_index: 0, local_start: 0, items: vec![image("a0"), image("a1")], succeeded: true },
            Placement { provider_index: 0, local_start: 2, items: vec![image("a2")], succeeded: true },
            Placement { provider_index: 1, local_start: 0, items: vec![image("b0")], succeeded: true },
            Placement { provider_index: 1, local_start: 1, items: vec![image("b1"), image("b2")], succeeded: true },
            Placement { provider_index: 2, local_start: 0, items: vec![], succeeded: false },
        ];

        let merge = |order: &[usize]| {
            let mut buffer = MergeBuffer::new(3, 3);
            for &i in order {
                buffer.place(placements[i].clone());
            }
            buffer.finish().unwrap()
        };

        let reference = merge(&[0, 1, 2, 3, 4]);
        for order in [[4, 3, 2, 1, 0], [2, 0, 4, 1, 3], [1, 3, 0, 4, 2], [3, 4, 1, 2, 0]] {
            assert_eq!(merge(&order), reference);
        }
        assert_eq!(ids(&reference), vec!["a0", "b0", "", "a1", "b1", "", "a2", "b2", ""]);
    }

    #[test]
    fn test_merge_all_failed_is_unavailable() {
        let mut buffer = MergeBuffer::new(2, 2);
        buffer.place(Placement { provider_index: 0, local_start: 0, items: vec![], succeeded: false });
        buffer.record_lost();
        assert!(matches!(buffer.finish(), Err(Error::Unavailable(_))));
    }

    #[test]
    fn test_merge_ignores_out_of_range_items() {
        let mut buffer = MergeBuffer::new(1, 2);
        buffer.place(Placement {
            provider_index: 1,
            local_start: 0,
            items: vec![image("x"), image("overflow")],
            succeeded: true,
        });
        assert_eq!(ids(&buffer.finish().unwrap()), vec!["", "x"]);
    }

    #[tokio::test]
    async fn test_search_interleaves_providers() {
        let aggregator = Aggregator::new(vec![
            Arc::new(FakeProvider::new("pixabay", 100)),
            Arc::new(FakeProvider::new("pexels", 80)),
            Arc::new(FakeProvider::new("unsplash", 30)),
        ]);

        let page = aggregator.search(2, "cats").await.unwrap();

        assert_eq!(page.len(), UNIFIED_PAGE_SIZE * 3);
        assert_eq!(ids(&page[..6]), vec!["pixabay/25", "pexels/25", "unsplash/25", "pixabay/26", "pexels/26", "unsplash/26"]);
        assert_eq!(ids(&page[page.len() - 3..]), vec!["pixabay/49", "pexels/49", "unsplash/49"]);
    }

    #[tokio::test]
    async fn test_search_spawns_one_task_per_plan() {
        let unsplash = Arc::new(FakeProvider::new("unsplash", 30));
        let aggregator = Aggregator::new(vec![unsplash.clone()]).with_page_size(100);

        let page = aggregator.search(1, "dogs").await.unwrap();

        assert_eq!(unsplash.calls.load(Ordering::SeqCst), 4);
        let expected: Vec<String> = (0..100).map(|n| format!("unsplash/{n}")).collect();
        assert_eq!(page.iter().map(|i| i.id.clone()).collect::<Vec<_>>(), expected);
    }

    #[tokio::test]
    async fn test_search_completion_order_does_not_matter() {
        let aggregator =
            Aggregator::new(vec![Arc::new(FakeProvider::new("slow", 7).with_delay(60)), Arc::new(FakeProvider::new("fast", 30))]);

        let page = aggregator.search(3, "birds").await.unwrap();

        for (i, pair) in page.chunks(2).enumerate() {
            assert_eq!(pair[0].id, format!("slow/{}", 50 + i));
            assert_eq!(pair[1].id, format!("fast/{}", 50 + i));
        }
    }

    #[tokio::test]
    async fn test_one_failed_provider_leaves_empty_slots() {
        let aggregator = Aggregator::new(vec![
            Arc::new(FakeProvider::new("a", 30)),
            Arc::new(FakeProvider::new("b", 30).failing()),
            Arc::new(FakeProvider::new("c", 30)),
        ]);

        let page = aggregator.search(1, "trees").await.unwrap();

        assert_eq!(page.len(), 75);
        for (i, chunk) in page.chunks(3).enumerate() {
            assert_eq!(chunk[0].id, format!("a/{i}"));
            assert!(chunk[1].is_empty());
            assert_eq!(chunk[2].id, format!("c/{i}"));
        }
    }

    #[tokio::test]
    async fn test_all_providers_failed() {
        let aggregator = Aggregator::new(vec![
            Arc::new(FakeProvider::new("a", 30).failing()),
            Arc::new(FakeProvider::new("b", 80).failing()),
        ]);

        let result = aggregator.search(2, "rocks").await;
        assert!(matches!(result, Err(Error::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_no_providers_is_unavailable() {
        let aggregator = Aggregator::new(Vec::new());
        assert!(matches!(aggregator.search(1, "anything").await, Err(Error::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_short_corpus_is_clamped() {
        let aggregator = Aggregator::new(vec![
            Arc::new(FakeProvider::new("big", 30)),
            Arc::new(FakeProvider::new("small", 30).with_total(32)),
        ]);

        let page = aggregator.search(2, "rare").await.unwrap();

        assert_eq!(page.len(), 50);
        assert_eq!(page[0].id, "big/25");
        assert_eq!(page[1].id, "small/25");
        assert_eq!(page[13].id, "small/31");
        assert!(page[15].is_empty());
        assert!(page[49].is_empty());
        assert_eq!(page[48].id, "big/49");
    }
}
