use futures::future::try_join_all;
use log::debug;
use std::future::Future;

use marquee_model::{Page, PageRequest};

/// Fetch `desired_total` items from a paged listing.
///
/// When the total fits in one page a single request with `limit =
/// desired_total` is made. Otherwise `ceil(desired_total / page_size)` requests
/// are issued at once and joined; the first failure fails the whole call.
/// Items come back in page order, then in-page order, truncated to
/// `desired_total`. Short pages are not compensated for.
pub async fn fan_out<T, E, F, Fut>(
    fetch_page: F,
    desired_total: u32,
    page_size: u32,
) -> Result<Vec<T>, E>
where
    F: Fn(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    if desired_total == 0 {
        return Ok(Vec::new());
    }
    let page_size = page_size.max(1);
    let desired = desired_total as usize;

    if desired_total <= page_size {
        let mut items = fetch_page(PageRequest::new(1, desired_total))
            .await?
            .into_items();
        items.truncate(desired);
        return Ok(items);
    }

    let total_pages = desired_total.div_ceil(page_size);
    debug!(
        "[Aggregate] Fanning out {} page requests for {} items",
        total_pages, desired_total
    );

    let pages = try_join_all(
        (1..=total_pages).map(|page| fetch_page(PageRequest::new(page, page_size))),
    )
    .await?;

    let mut items: Vec<T> = pages.into_iter().flat_map(Page::into_items).collect();
    items.truncate(desired);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Deterministic backend over ids `1..=available`.
    fn numbered(request: PageRequest, available: u32) -> Page<u32> {
        let start = (request.page - 1) * request.limit + 1;
        let end = (start + request.limit - 1).min(available);
        Page::new((start..=end).collect())
    }

    #[tokio::test]
    async fn small_totals_use_a_single_request() {
        let seen = Mutex::new(Vec::new());
        let items = fan_out(
            |req| {
                seen.lock().push(req);
                async move { Ok::<_, String>(numbered(req, 100)) }
            },
            7,
            10,
        )
        .await
        .unwrap();

        assert_eq!(items, (1..=7).collect::<Vec<_>>());
        assert_eq!(*seen.lock(), vec![PageRequest::new(1, 7)]);
    }

    #[tokio::test]
    async fn large_totals_fan_out_and_truncate() {
        let seen = Mutex::new(Vec::new());
        let items = fan_out(
            |req| {
                seen.lock().push(req);
                async move { Ok::<_, String>(numbered(req, 30)) }
            },
            25,
            10,
        )
        .await
        .unwrap();

        assert_eq!(items, (1..=25).collect::<Vec<_>>());
        let mut pages: Vec<u32> = seen.lock().iter().map(|r| r.page).collect();
        pages.sort_unstable();
        assert_eq!(pages, vec![1, 2, 3]);
        assert!(seen.lock().iter().all(|r| r.limit == 10));
    }

    #[tokio::test]
    async fn result_follows_page_order_not_completion_order() {
        let items = fan_out(
            |req| async move {
                // Earlier pages finish last.
                tokio::time::sleep(Duration::from_millis(u64::from(5 - req.page) * 10)).await;
                Ok::<_, String>(numbered(req, 100))
            },
            40,
            10,
        )
        .await
        .unwrap();

        assert_eq!(items, (1..=40).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn short_backend_returns_what_exists() {
        let items = fan_out(
            |req| async move { Ok::<_, String>(numbered(req, 13)) },
            30,
            10,
        )
        .await
        .unwrap();
        assert_eq!(items, (1..=13).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn any_page_failure_fails_the_whole_call() {
        let result = fan_out(
            |req| async move {
                if req.page == 2 {
                    Err(format!("page {} failed", req.page))
                } else {
                    Ok(numbered(req, 100))
                }
            },
            30,
            10,
        )
        .await;
        assert_eq!(result.unwrap_err(), "page 2 failed");
    }

    #[tokio::test]
    async fn zero_total_makes_no_request() {
        let calls = Mutex::new(0);
        let items = fan_out(
            |_req| {
                *calls.lock() += 1;
                async move { Ok::<Page<u32>, String>(Page::default()) }
            },
            0,
            10,
        )
        .await
        .unwrap();
        assert!(items.is_empty());
        assert_eq!(*calls.lock(), 0);
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let fetch = |req| async move { Ok::<_, String>(numbered(req, 45)) };
        let first = fan_out(fetch, 35, 10).await.unwrap();
        let second = fan_out(fetch, 35, 10).await.unwrap();
        assert_eq!(first, second);
    }
}
