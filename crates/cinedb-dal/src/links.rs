//! Concurrent writes of movie-genre association rows.
//!
//! Every association is written by its own task, but no more than
//! `max_in_flight` writes run at once regardless of how many genres a movie
//! has. All writes are awaited before returning, and every failure is kept.

use std::{collections::HashSet, future::Future, sync::Arc};

use tokio::{sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::{Error, Pool, error::Result};

pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

const INSERT_LINK: &str = "INSERT INTO movies_genres (movie_id, genre_id) VALUES ($1, $2)";

/// Writes `movies_genres` rows for one movie over the shared pool.
#[derive(Clone)]
pub struct GenreLinkWriter {
    pool: Pool,
    max_in_flight: usize,
}

impl GenreLinkWriter {
    pub fn new(pool: Pool, max_in_flight: usize) -> Self {
        Self {
            pool,
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Links `movie_id` to each genre. Fails with [`Error::GenreLinks`]
    /// holding every individual failure.
    pub async fn link_all(
        &self,
        movie_id: Uuid,
        genre_ids: &[Uuid],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let pool = self.pool.clone();
        let failures = fan_out(genre_ids, self.max_in_flight, cancel, move |genre_id| {
            let pool = pool.clone();
            async move {
                sqlx::query(INSERT_LINK)
                    .bind(movie_id)
                    .bind(genre_id)
                    .execute(&pool)
                    .await
                    .map(|_| ())
                    .map_err(|e| {
                        debug!(%movie_id, %genre_id, error = %e, "Genre link failed");
                        Error::from(e)
                    })
            }
        })
        .await;

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::GenreLinks { movie_id, failures })
        }
    }
}

/// Distinct keys, first occurrence wins.
pub(crate) fn distinct(keys: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter().copied().filter(|k| seen.insert(*k)).collect()
}

/// Runs `write` once per key with at most `max_in_flight` running at a time
/// and returns failures in completion order. Cancellation is checked while
/// waiting for a slot and right before the write is issued; an issued write
/// runs to completion.
pub(crate) async fn fan_out<F, Fut>(
    keys: &[Uuid],
    max_in_flight: usize,
    cancel: &CancellationToken,
    write: F,
) -> Vec<Error>
where
    F: Fn(Uuid) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let slots = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut tasks = JoinSet::new();

    for &key in keys {
        let slots = slots.clone();
        let cancel = cancel.clone();
        let write = write.clone();
        tasks.spawn(async move {
            let _permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                permit = slots.acquire_owned() => permit
                    .map_err(|_| Error::TaskFailed("link worker pool closed".to_string()))?,
            };
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            write(key).await
        });
    }

    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => failures.push(e),
            Err(e) => failures.push(Error::TaskFailed(e.to_string())),
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;
    use crate::{ErrorKind, error::tests::db_error};

    #[derive(Default)]
    struct Probe {
        running: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl Probe {
        async fn write(&self, delay: Duration) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn keys(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let probe = Arc::new(Probe::default());
        let keys = keys(20);
        let p = probe.clone();
        let failures = fan_out(&keys, 3, &CancellationToken::new(), move |_| {
            let p = p.clone();
            async move {
                p.write(Duration::from_millis(20)).await;
                Ok::<_, Error>(())
            }
        })
        .await;

        assert!(failures.is_empty());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 20);
        assert!(probe.peak.load(Ordering::SeqCst) <= 3);
        assert!(probe.peak.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_all_writes_run_despite_failures() {
        let probe = Arc::new(Probe::default());
        let keys = keys(6);
        let bad: HashSet<Uuid> = [keys[1], keys[4]].into_iter().collect();
        let p = probe.clone();
        let failures = fan_out(&keys, 2, &CancellationToken::new(), move |key| {
            let p = p.clone();
            let fails = bad.contains(&key);
            async move {
                p.write(Duration::from_millis(5)).await;
                if fails {
                    Err(Error::from(db_error(Some("23503"), "genre missing")))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(probe.calls.load(Ordering::SeqCst), 6);
        assert_eq!(failures.len(), 2);
        assert!(
            failures
                .iter()
                .all(|e| e.kind() == ErrorKind::ConstraintViolation)
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let probe = Arc::new(Probe::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let p = probe.clone();
        let failures = fan_out(&keys(4), 2, &cancel, move |_| {
            let p = p.clone();
            async move {
                p.write(Duration::from_millis(1)).await;
                Ok::<_, Error>(())
            }
        })
        .await;

        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        assert_eq!(failures.len(), 4);
        assert!(failures.iter().all(|e| matches!(e, Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_slot() {
        let probe = Arc::new(Probe::default());
        let cancel = CancellationToken::new();
        let p = probe.clone();
        let trigger = cancel.clone();
        let failures = fan_out(&keys(5), 1, &cancel, move |_| {
            let p = p.clone();
            let trigger = trigger.clone();
            async move {
                p.write(Duration::from_millis(10)).await;
                // the first write to finish cancels everyone still waiting
                trigger.cancel();
                Ok::<_, Error>(())
            }
        })
        .await;

        // issued writes complete, waiting ones give up
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        assert_eq!(failures.len(), 4);
        assert!(failures.iter().all(|e| matches!(e, Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_empty_fan_out() {
        let failures = fan_out(&[], 4, &CancellationToken::new(), |_| async {
            Ok::<_, Error>(())
        })
        .await;
        assert!(failures.is_empty());
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(distinct(&[a, b, a, a, b]), vec![a, b]);
        assert!(distinct(&[]).is_empty());
    }
}
