// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{Duration, NaiveDate, TimeZone};
use mg_core::{Priority, Stage, TraySize};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap()
}

fn task(id: &str, owner: &str, kind: TaskType, offset: u32) -> ProductionTask {
    ProductionTask::for_stage(
        TaskId::from(id),
        OwnerRef::order(owner),
        "pea",
        &Stage::new(kind, offset),
        now(),
        2,
        Priority::Medium,
        now(),
    )
}

fn window() -> GrowWindow {
    GrowWindow::ending(NaiveDate::from_ymd_opt(2026, 10, 24).unwrap(), 10)
}

fn reservation(owner: &str, slots: u32) -> Reservation {
    let owner = OwnerRef::order(owner);
    Reservation {
        id: ReservationId::for_line(&owner, "pea"),
        owner,
        product_id: "pea".to_string(),
        tray_size: TraySize::Large,
        quantity: slots,
        rack: RackId::new("main"),
        slots,
        window: window(),
        status: ReservationStatus::Reserved,
        created_at: now(),
        updated_at: now(),
    }
}

#[tokio::test]
async fn insert_if_absent_keeps_first_task() {
    let store = Store::in_memory();
    let first = store
        .insert_if_absent(task("t-1", "o-1", TaskType::Pack, 0))
        .await
        .unwrap();
    let second = store
        .insert_if_absent(task("t-2", "o-1", TaskType::Pack, 0))
        .await
        .unwrap();

    assert!(first.was_inserted());
    assert_eq!(second, TaskInsert::Existing(first.task().clone()));
}

#[tokio::test]
async fn insert_all_absent_skips_taken_keys() {
    let store = Store::in_memory();
    store
        .insert_if_absent(task("t-1", "o-1", TaskType::Light, 3))
        .await
        .unwrap();

    let created = store
        .insert_all_absent(vec![
            task("t-2", "o-1", TaskType::Germinate, 1),
            task("t-3", "o-1", TaskType::Light, 3),
        ])
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].id, TaskId::from("t-2"));

    let again = store
        .insert_all_absent(vec![task("t-4", "o-1", TaskType::Germinate, 1)])
        .await
        .unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn completion_happens_once() {
    let store = Store::in_memory();
    store
        .insert_if_absent(task("t-1", "o-1", TaskType::Harvest, 0))
        .await
        .unwrap();

    let first = store.complete(&TaskId::from("t-1"), "", now()).await.unwrap();
    let second = store.complete(&TaskId::from("t-1"), "", now()).await.unwrap();

    assert!(matches!(first, Completion::Completed { ref effects, .. } if effects.len() == 2));
    assert!(matches!(second, Completion::AlreadyDone(_)));
    assert_eq!(
        store.complete(&TaskId::from("t-9"), "", now()).await.unwrap(),
        Completion::NotFound
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_yield_one_winner() {
    let store = Store::in_memory();
    store
        .insert_if_absent(task("t-1", "o-1", TaskType::Harvest, 0))
        .await
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.complete(&TaskId::from("t-1"), "", now()).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if matches!(handle.await.unwrap().unwrap(), Completion::Completed { .. }) {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn promote_due_skips_future_and_cancelled() {
    let store = Store::in_memory();
    store
        .insert_if_absent(task("t-1", "o-1", TaskType::Germinate, 1))
        .await
        .unwrap();
    store
        .insert_if_absent(task("t-2", "o-1", TaskType::Light, 4))
        .await
        .unwrap();
    store
        .insert_if_absent(task("t-3", "o-2", TaskType::Germinate, 1))
        .await
        .unwrap();
    store
        .cancel_owner(&OwnerRef::order("o-2"), now())
        .await
        .unwrap();

    let cutoff = now() + Duration::days(2);
    let promoted = store.promote_due(cutoff, cutoff).await.unwrap();

    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].0.id, TaskId::from("t-1"));
    assert_eq!(promoted[0].0.status, TaskStatus::Ready);
    assert_eq!(promoted[0].1.len(), 1);
    assert!(store.promote_due(cutoff, cutoff).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_filters_and_orders_by_run_at() {
    let store = Store::in_memory();
    for (id, kind, offset) in [
        ("t-3", TaskType::Harvest, 9),
        ("t-1", TaskType::Seed, 0),
        ("t-2", TaskType::Light, 3),
    ] {
        store
            .insert_if_absent(task(id, "o-1", kind, offset))
            .await
            .unwrap();
    }

    let all = store.list(&TaskFilter::default()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|t| t.id.0.as_str()).collect();
    assert_eq!(ids, vec!["t-1", "t-2", "t-3"]);

    let pending = store
        .list(&TaskFilter {
            status: Some(TaskStatus::Pending),
            until: Some(now() + Duration::days(5)),
            ..TaskFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, TaskId::from("t-2"));
}

#[tokio::test]
async fn reserve_within_respects_ceiling() {
    let store = Store::in_memory();
    let first = store.reserve_within(reservation("o-1", 15), 20).await.unwrap();
    assert!(matches!(first, ReserveOutcome::Reserved(_)));

    let denied = store.reserve_within(reservation("o-2", 6), 20).await.unwrap();
    assert_eq!(denied, ReserveOutcome::Denied { available: 5 });

    let fits = store.reserve_within(reservation("o-3", 5), 20).await.unwrap();
    assert!(matches!(fits, ReserveOutcome::Reserved(_)));
    assert_eq!(
        store.peak_usage(&RackId::new("main"), window()).await.unwrap(),
        20
    );
}

#[tokio::test]
async fn reserving_same_line_twice_returns_existing() {
    let store = Store::in_memory();
    store.reserve_within(reservation("o-1", 2), 20).await.unwrap();
    let again = store.reserve_within(reservation("o-1", 2), 20).await.unwrap();
    assert!(matches!(again, ReserveOutcome::Existing(_)));
    assert_eq!(
        store.peak_usage(&RackId::new("main"), window()).await.unwrap(),
        2
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_reservations_never_exceed_pool() {
    let store = Store::in_memory();
    let handles: Vec<_> = (0..64)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .reserve_within(reservation(&format!("o-{}", i), 1 + i % 3), 20)
                    .await
            })
        })
        .collect();

    let mut reserved = 0;
    for handle in handles {
        if let ReserveOutcome::Reserved(r) = handle.await.unwrap().unwrap() {
            reserved += r.slots;
        }
    }
    assert!(reserved <= 20);
    assert_eq!(
        store.peak_usage(&RackId::new("main"), window()).await.unwrap(),
        reserved
    );
}

#[tokio::test]
async fn release_is_idempotent() {
    let store = Store::in_memory();
    let id = ReservationId::for_line(&OwnerRef::order("o-1"), "pea");
    store.reserve_within(reservation("o-1", 4), 20).await.unwrap();

    let first = store
        .set_status(&id, ReservationStatus::Fulfilled, now())
        .await
        .unwrap();
    let second = store
        .set_status(&id, ReservationStatus::Fulfilled, now())
        .await
        .unwrap();

    assert_eq!(first.map(|r| r.status), Some(ReservationStatus::Fulfilled));
    assert_eq!(second, None);
    assert_eq!(
        store.peak_usage(&RackId::new("main"), window()).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn cancel_owner_releases_and_blocks_new_reservations() {
    let store = Store::in_memory();
    let owner = OwnerRef::order("o-1");
    store.reserve_within(reservation("o-1", 4), 20).await.unwrap();

    let released = store.cancel_owner(&owner, now()).await.unwrap();
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].status, ReservationStatus::Cancelled);
    assert!(store.cancel_owner(&owner, now()).await.unwrap().is_empty());
    assert!(store.is_cancelled(&owner).await.unwrap());

    let mut retry = reservation("o-1", 1);
    retry.product_id = "radish".to_string();
    retry.id = ReservationId::for_line(&owner, "radish");
    assert_eq!(
        store.reserve_within(retry, 20).await.unwrap(),
        ReserveOutcome::OwnerCancelled
    );
}

#[tokio::test]
async fn insert_for_cancelled_owner_writes_nothing() {
    let store = Store::in_memory();
    store.cancel_owner(&OwnerRef::order("o-1"), now()).await.unwrap();

    let seed = task("t-1", "o-1", TaskType::Seed, 0);
    assert_eq!(
        store.insert_if_absent(seed.clone()).await.unwrap(),
        TaskInsert::OwnerCancelled(seed)
    );
    assert!(store.get("t-1").await.unwrap().is_none());
    assert!(store
        .insert_if_absent(task("t-2", "o-2", TaskType::Seed, 0))
        .await
        .unwrap()
        .was_inserted());
}

#[tokio::test]
async fn open_replays_log() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = Store::open(dir.path()).unwrap();
        store
            .insert_if_absent(task("t-1", "o-1", TaskType::Seed, 0))
            .await
            .unwrap();
        store.reserve_within(reservation("o-1", 3), 20).await.unwrap();
        store.complete(&TaskId::from("t-1"), "sown", now()).await.unwrap();
    }

    let store = Store::open(dir.path()).unwrap();
    let seed = store.get("t-1").await.unwrap().unwrap();
    assert!(seed.is_done());
    assert_eq!(seed.notes, "sown");
    assert_eq!(
        store.peak_usage(&RackId::new("main"), window()).await.unwrap(),
        3
    );
    assert!(dir.path().join(WAL_FILE).exists());
}

#[tokio::test]
async fn second_open_waits_for_the_lock_and_sees_prior_reservations() {
    let dir = tempfile::tempdir().unwrap();
    let first = Store::open(dir.path()).unwrap();
    assert_eq!(
        first.reserve_within(reservation("o-1", 15), 20).await.unwrap(),
        ReserveOutcome::Reserved(reservation("o-1", 15))
    );

    let (tx, rx) = std::sync::mpsc::channel();
    let path = dir.path().to_path_buf();
    let opener = std::thread::spawn(move || {
        let store = Store::open(&path);
        let _ = tx.send(());
        store
    });

    assert!(
        rx.recv_timeout(std::time::Duration::from_millis(200)).is_err(),
        "second store opened while the first held the lock"
    );
    drop(first);
    rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
    let second = opener.join().unwrap().unwrap();

    assert_eq!(
        second.reserve_within(reservation("o-2", 15), 20).await.unwrap(),
        ReserveOutcome::Denied { available: 5 }
    );
    assert_eq!(
        second.peak_usage(&RackId::new("main"), window()).await.unwrap(),
        15
    );
    assert!(dir.path().join(LOCK_FILE).exists());
}
