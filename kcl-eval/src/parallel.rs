//! Bounded concurrent map that returns results in input order.

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Run `f` over `items` with at most `concurrency` futures in flight.
///
/// Futures complete in any order; results are collected with their input
/// position and sorted back before returning, so `output[i]` always belongs
/// to `items[i]`. A `concurrency` of zero is treated as one.
pub async fn ordered_parallel_map<T, R, F, Fut>(items: Vec<T>, concurrency: usize, f: F) -> Vec<R>
where
    F: Fn(usize, T) -> Fut,
    Fut: Future<Output = R>,
{
    let mut indexed: Vec<(usize, R)> = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| {
            let fut = f(index, item);
            async move { (index, fut.await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}
