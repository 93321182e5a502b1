use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use types::GroupId;

type Key = (GroupId, NaiveDate);

/// One async mutex per `(group, week)`; unrelated weeks never contend.
#[derive(Default)]
pub(crate) struct WeekLocks {
    inner: Mutex<HashMap<Key, Arc<AsyncMutex<()>>>>,
}

impl WeekLocks {
    pub(crate) async fn acquire(&self, group: &GroupId, week: NaiveDate) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock();
            map.retain(|_, l| Arc::strong_count(l) > 1);
            map.entry((group.clone(), week))
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_week_is_serialized() {
        let locks = Arc::new(WeekLocks::default());
        let week = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
        let g = GroupId::from("g1");

        let held = locks.acquire(&g, week).await;
        let contender = {
            let locks = locks.clone();
            let g = g.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&g, week).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());
        drop(held);
        contender.await.expect("contender finishes");
    }

    #[tokio::test]
    async fn other_weeks_do_not_wait() {
        let locks = WeekLocks::default();
        let g = GroupId::from("g1");
        let _a = locks
            .acquire(&g, NaiveDate::from_ymd_opt(2026, 11, 2).unwrap())
            .await;
        let _b = locks
            .acquire(&g, NaiveDate::from_ymd_opt(2026, 11, 9).unwrap())
            .await;
    }
}
