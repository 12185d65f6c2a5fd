use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::cmp::Ordering;
use std::time::Duration;

use crate::model::queue::QueuedTechnician;

/// Sorted ready queue per store. Short TTL: the queue board is the
/// hottest read in the shop and tolerates a few seconds of staleness,
/// but every queue mutation also invalidates its store eagerly.
pub static QUEUE_CACHE: Lazy<Cache<u64, Vec<QueuedTechnician>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(5))
        .build()
});

pub async fn invalidate(store_id: u64) {
    QUEUE_CACHE.invalidate(&store_id).await;
}

/// Serving order: fewest tickets taken first, ties broken by who has
/// waited longest.
pub fn queue_order(a: &QueuedTechnician, b: &QueuedTechnician) -> Ordering {
    a.tickets_taken
        .cmp(&b.tickets_taken)
        .then_with(|| a.joined_at.cmp(&b.joined_at))
}

pub async fn load_sorted(pool: &MySqlPool, store_id: u64) -> Result<Vec<QueuedTechnician>, sqlx::Error> {
    if let Some(hit) = QUEUE_CACHE.get(&store_id).await {
        return Ok(hit);
    }

    let rows = fetch_sorted(pool, store_id).await?;
    QUEUE_CACHE.insert(store_id, rows.clone()).await;
    Ok(rows)
}

async fn fetch_sorted(
    pool: &MySqlPool,
    store_id: u64,
) -> Result<Vec<QueuedTechnician>, sqlx::Error> {
    let mut rows = sqlx::query_as::<_, QueuedTechnician>(
        r#"
        SELECT rq.employee_id, e.first_name, e.last_name, rq.tickets_taken, rq.joined_at
        FROM ready_queue rq
        JOIN employees e ON e.id = rq.employee_id
        WHERE rq.store_id = ? AND e.status = 'active'
        "#,
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    rows.sort_by(queue_order);
    Ok(rows)
}

/// Preload the queue board for every store with technicians waiting.
pub async fn warmup_queue_cache(pool: &MySqlPool) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64,)>(
        r#"
        SELECT DISTINCT store_id
        FROM ready_queue
        "#,
    )
    .fetch(pool);

    let mut stores = 0usize;

    while let Some(row) = stream.next().await {
        let (store_id,) = row?;
        let rows = fetch_sorted(pool, store_id).await?;
        QUEUE_CACHE.insert(store_id, rows).await;
        stores += 1;
    }

    log::info!("Queue cache warmup complete: {} stores", stores);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tech(employee_id: u64, tickets_taken: u32, joined_minute: u32) -> QueuedTechnician {
        QueuedTechnician {
            employee_id,
            first_name: format!("Tech{}", employee_id),
            last_name: "Nguyen".to_string(),
            tickets_taken,
            joined_at: Utc.with_ymd_and_hms(2026, 1, 1, 9, joined_minute, 0).unwrap(),
        }
    }

    #[test]
    fn fewest_tickets_serve_first() {
        let mut queue = vec![tech(1, 3, 0), tech(2, 0, 30), tech(3, 1, 15)];
        queue.sort_by(queue_order);

        let order: Vec<u64> = queue.iter().map(|t| t.employee_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn ties_go_to_the_earliest_join() {
        let mut queue = vec![tech(1, 2, 45), tech(2, 2, 5), tech(3, 2, 20)];
        queue.sort_by(queue_order);

        let order: Vec<u64> = queue.iter().map(|t| t.employee_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }
}
