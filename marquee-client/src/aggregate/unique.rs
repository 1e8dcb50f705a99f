use log::{debug, warn};
use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;

use marquee_model::{EntityKey, Identified, Page, PageRequest};

/// Upper bound on pages walked by one search, for backends that never
/// return a short page.
pub const MAX_SEARCH_PAGES: u32 = 1000;

/// Ordered items with at most one item per key.
///
/// Items without a key cannot be compared and are always admitted.
#[derive(Debug, Clone)]
pub struct UniqueAccumulator<T> {
    items: Vec<T>,
    seen: HashSet<EntityKey>,
}

impl<T: Identified> UniqueAccumulator<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Admit `item` unless its key was already admitted. Returns whether it was.
    pub fn push(&mut self, item: T) -> bool {
        if let Some(key) = item.entity_key()
            && !self.seen.insert(key)
        {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Admit items in order; returns how many were new.
    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) -> usize {
        items.into_iter().filter_map(|item| self.push(item).then_some(())).count()
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T: Identified> Default for UniqueAccumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a deduplicating search.
///
/// A failed page does not discard what came before it: `items` holds what was
/// collected and `failure` the error that stopped the walk.
#[derive(Debug)]
pub struct SearchOutcome<T, E> {
    pub items: Vec<T>,
    /// Page requests issued, including a failed one.
    pub requests: u32,
    pub failure: Option<E>,
}

impl<T, E> SearchOutcome<T, E> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            requests: 0,
            failure: None,
        }
    }

    /// True when the walk ended without a page failure.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Drop the failure, keeping the partial items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Collect up to `desired_total` unique items, one page at a time.
///
/// After each page the walk stops when the page is empty, when enough unique
/// items have been gathered, or when the page came back shorter than
/// `page_size`. The first occurrence of a key wins. A failing page ends the walk
/// and is reported on the outcome instead of being returned as an error.
pub async fn collect_unique<T, E, F, Fut>(
    fetch_page: F,
    desired_total: u32,
    page_size: u32,
) -> SearchOutcome<T, E>
where
    T: Identified,
    E: Display,
    F: Fn(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut outcome = SearchOutcome::empty();
    if desired_total == 0 {
        return outcome;
    }
    let page_size = page_size.max(1);
    let desired = desired_total as usize;
    let mut accumulator = UniqueAccumulator::new();

    if desired_total <= page_size {
        outcome.requests = 1;
        match fetch_page(PageRequest::new(1, desired_total)).await {
            Ok(page) => {
                accumulator.extend(page.into_items());
            }
            Err(e) => {
                warn!("[Aggregate] Search page 1 failed: {}", e);
                outcome.failure = Some(e);
            }
        }
    } else {
        for page_number in 1..=MAX_SEARCH_PAGES {
            outcome.requests += 1;
            let page = match fetch_page(PageRequest::new(page_number, page_size)).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "[Aggregate] Search page {} failed, keeping {} results: {}",
                        page_number,
                        accumulator.len(),
                        e
                    );
                    outcome.failure = Some(e);
                    break;
                }
            };

            let received = page.len();
            if received == 0 {
                break;
            }
            let admitted = accumulator.extend(page.into_items());
            debug!(
                "[Aggregate] Search page {}: {} received, {} new, {} total",
                page_number,
                received,
                admitted,
                accumulator.len()
            );
            if accumulator.len() >= desired || received < page_size as usize {
                break;
            }
            if page_number == MAX_SEARCH_PAGES {
                warn!(
                    "[Aggregate] Search stopped after {} pages without exhausting the backend",
                    MAX_SEARCH_PAGES
                );
            }
        }
    }

    let mut items = accumulator.into_items();
    items.truncate(desired);
    outcome.items = items;
    outcome
}
