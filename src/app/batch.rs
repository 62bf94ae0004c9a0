// Bounded fan-out for per-file and per-group work

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::domain::errors::DomainError;

/// Run `work` for every item with at most `jobs` in flight.
///
/// Results come back in input order. A task that panics yields an
/// `InvocationFailure` for its slot instead of aborting the batch.
pub async fn run_bounded<T, R, F, Fut>(
    items: Vec<T>,
    jobs: usize,
    work: F,
) -> Vec<Result<R, DomainError>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let work = Arc::new(work);
    let mut set = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let work = Arc::clone(&work);
        set.spawn(async move {
            // the semaphore is never closed
            let _permit = semaphore.acquire_owned().await.ok();
            (index, work(item).await)
        });
    }

    let mut slots: Vec<Option<Result<R, DomainError>>> = (0..total).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(Ok(result)),
            Err(e) => tracing::error!("Worker task failed: {}", e),
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(DomainError::InvocationFailure(
                    "Worker task did not complete".to_string(),
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let results = run_bounded(vec![30u64, 10, 20], 3, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            delay
        })
        .await;
        let values: Vec<u64> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (a, p) = (Arc::clone(&active), Arc::clone(&peak));

        run_bounded((0..8).collect::<Vec<u32>>(), 2, move |_| {
            let active = Arc::clone(&a);
            let peak = Arc::clone(&p);
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_error() {
        let results = run_bounded(vec![1, 2], 2, |n| async move {
            if n == 2 {
                panic!("boom");
            }
            n
        })
        .await;
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
