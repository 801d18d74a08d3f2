//! Reconciler pass semantics.

use super::{ids, reconciler, seed};
use crate::test_support::{memory_store, TestBudget, TestPeriod};
use crate::{Scope, SyncErrorKind};

#[tokio::test]
async fn reconciling_the_same_set_twice_is_idempotent() {
    let store = memory_store().await;
    let budgets = reconciler::<TestBudget>(&store);
    let fetched = vec![
        TestBudget::new(1, "MERCHANT"),
        TestBudget::new(2, "MERCHANT"),
        TestBudget::new(3, "BUDGET_CATEGORY"),
    ];

    let first = budgets.reconcile(fetched.clone(), &Scope::all()).await.unwrap();
    let after_first: Vec<TestBudget> = store.fetch(&Scope::all()).await.unwrap();

    let second = budgets.reconcile(fetched, &Scope::all()).await.unwrap();
    let after_second: Vec<TestBudget> = store.fetch(&Scope::all()).await.unwrap();

    assert_eq!(first.upserted, 3);
    assert!(second.deleted.is_empty());
    assert!(second.cascaded.is_empty());
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn scoped_ids_equal_fetched_ids_after_a_pass() {
    let store = memory_store().await;
    seed(
        &store,
        &(1..=5).map(|id| TestBudget::new(id, "MERCHANT")).collect::<Vec<_>>(),
    )
    .await;

    let outcome = reconciler::<TestBudget>(&store)
        .reconcile(
            vec![TestBudget::new(2, "MERCHANT"), TestBudget::new(4, "MERCHANT")],
            &Scope::all(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.deleted, vec![1, 3, 5]);
    assert_eq!(ids::<TestBudget>(&store, &Scope::all()).await, vec![2, 4]);
}

#[tokio::test]
async fn empty_fetch_clears_the_scope_only() {
    let store = memory_store().await;
    seed(
        &store,
        &[
            TestBudget::new(1, "MERCHANT"),
            TestBudget::new(2, "BUDGET_CATEGORY"),
        ],
    )
    .await;

    let scope = Scope::all().eq("budget_type", "budget_type", "MERCHANT");
    let outcome = reconciler::<TestBudget>(&store)
        .reconcile(vec![], &scope)
        .await
        .unwrap();

    assert_eq!(outcome.deleted, vec![1]);
    assert_eq!(ids::<TestBudget>(&store, &Scope::all()).await, vec![2]);
}

#[tokio::test]
async fn refresh_of_one_budget_type_leaves_other_types_alone() {
    let store = memory_store().await;
    seed(
        &store,
        &[
            TestBudget::new(85, "MERCHANT"),
            TestBudget::new(6, "MERCHANT"),
            TestBudget::new(200, "BUDGET_CATEGORY"),
            TestBudget::new(201, "BUDGET_CATEGORY"),
        ],
    )
    .await;

    let scope = Scope::all().eq("budget_type", "budget_type", "BUDGET_CATEGORY");
    let outcome = reconciler::<TestBudget>(&store)
        .reconcile(
            vec![
                TestBudget::new(200, "BUDGET_CATEGORY"),
                TestBudget::new(300, "BUDGET_CATEGORY"),
                TestBudget::new(301, "BUDGET_CATEGORY"),
            ],
            &scope,
        )
        .await
        .unwrap();

    assert_eq!(outcome.deleted, vec![201]);
    let all = ids::<TestBudget>(&store, &Scope::all()).await;
    assert_eq!(all, vec![6, 85, 200, 300, 301]);
    assert_eq!(ids::<TestBudget>(&store, &scope).await, vec![200, 300, 301]);
}

#[tokio::test]
async fn retyped_merchant_joins_the_refreshed_type() {
    let store = memory_store().await;
    seed(
        &store,
        &[
            TestBudget::new(85, "MERCHANT"),
            TestBudget::new(6, "MERCHANT"),
            TestBudget::new(200, "BUDGET_CATEGORY"),
            TestBudget::new(201, "BUDGET_CATEGORY"),
        ],
    )
    .await;

    let scope = Scope::all().eq("budget_type", "budget_type", "BUDGET_CATEGORY");
    let outcome = reconciler::<TestBudget>(&store)
        .reconcile(
            vec![
                TestBudget::new(6, "BUDGET_CATEGORY"),
                TestBudget::new(200, "BUDGET_CATEGORY"),
                TestBudget::new(300, "BUDGET_CATEGORY"),
            ],
            &scope,
        )
        .await
        .unwrap();

    assert_eq!(outcome.deleted, vec![201]);
    let all = ids::<TestBudget>(&store, &Scope::all()).await;
    assert_eq!(all.len(), 4);
    assert_eq!(all, vec![6, 85, 200, 300]);
    let merchants = Scope::all().eq("budget_type", "budget_type", "MERCHANT");
    assert_eq!(ids::<TestBudget>(&store, &merchants).await, vec![85]);
}

#[tokio::test]
async fn stale_parent_takes_its_periods_along() {
    let store = memory_store().await;
    seed(
        &store,
        &[TestBudget::new(7, "MERCHANT"), TestBudget::new(8, "MERCHANT")],
    )
    .await;
    seed(
        &store,
        &[
            TestPeriod::new(456, 7),
            TestPeriod::new(457, 7),
            TestPeriod::new(458, 8),
        ],
    )
    .await;

    let outcome = reconciler::<TestBudget>(&store)
        .reconcile(vec![TestBudget::new(8, "MERCHANT")], &Scope::all())
        .await
        .unwrap();

    assert_eq!(outcome.deleted, vec![7]);
    assert_eq!(outcome.cascaded, vec![("budget_periods", 2)]);
    assert_eq!(ids::<TestPeriod>(&store, &Scope::all()).await, vec![458]);
}

#[tokio::test]
async fn failing_cascade_rolls_back_the_whole_pass() {
    let store = memory_store().await;
    let mut modified = TestBudget::new(2, "MERCHANT");
    modified.status = "COMPLETED".into();
    seed(
        &store,
        &[
            TestBudget::new(1, "MERCHANT"),
            TestBudget::new(2, "MERCHANT"),
            TestBudget::new(3, "MERCHANT"),
        ],
    )
    .await;
    let before: Vec<TestBudget> = store.fetch(&Scope::all()).await.unwrap();

    // The cascade from the stale budget 3 has nowhere to go.
    store
        .db()
        .call_sqlite(|conn| conn.execute_batch("DROP TABLE budget_periods"))
        .await
        .unwrap();
    let mut changes = store.hub().subscribe(&["budgets"]);

    let err = reconciler::<TestBudget>(&store)
        .reconcile(
            vec![
                TestBudget::new(1, "MERCHANT"),
                modified,
                TestBudget::new(4, "MERCHANT"),
            ],
            &Scope::all(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), SyncErrorKind::Storage);
    let after: Vec<TestBudget> = store.fetch(&Scope::all()).await.unwrap();
    assert_eq!(before, after);
    assert!(changes.try_changed().is_none());
}

#[tokio::test]
async fn moved_period_is_updated_in_place() {
    let store = memory_store().await;
    seed(&store, &[TestPeriod::new(10, 100)]).await;

    let scope = Scope::all().path_eq("budget_id", 6);
    reconciler::<TestPeriod>(&store)
        .reconcile(vec![TestPeriod::new(10, 6)], &scope)
        .await
        .unwrap();

    let periods: Vec<TestPeriod> = store.fetch(&Scope::all()).await.unwrap();
    assert_eq!(periods, vec![TestPeriod::new(10, 6)]);
    assert!(ids::<TestPeriod>(&store, &Scope::all().path_eq("budget_id", 100))
        .await
        .is_empty());
}

#[tokio::test]
async fn duplicate_ids_in_one_fetch_keep_the_last_copy() {
    let store = memory_store().await;
    let mut second = TestBudget::new(5, "MERCHANT");
    second.frequency = "MONTHLY".into();

    reconciler::<TestBudget>(&store)
        .reconcile(vec![TestBudget::new(5, "MERCHANT"), second.clone()], &Scope::all())
        .await
        .unwrap();

    let stored: Vec<TestBudget> = store.fetch(&Scope::all()).await.unwrap();
    assert_eq!(stored, vec![second]);
}

#[tokio::test]
async fn explicit_delete_cascades_and_skips_unknown_ids() {
    let store = memory_store().await;
    seed(
        &store,
        &[TestBudget::new(7, "MERCHANT"), TestBudget::new(8, "MERCHANT")],
    )
    .await;
    seed(&store, &[TestPeriod::new(456, 7), TestPeriod::new(458, 8)]).await;

    let outcome = reconciler::<TestBudget>(&store)
        .delete(vec![7, 7, 999])
        .await
        .unwrap();

    assert_eq!(outcome.deleted, vec![7]);
    assert_eq!(outcome.cascaded, vec![("budget_periods", 1)]);
    assert_eq!(ids::<TestBudget>(&store, &Scope::all()).await, vec![8]);
    assert_eq!(ids::<TestPeriod>(&store, &Scope::all()).await, vec![458]);
}

#[tokio::test]
async fn invalid_scope_fails_before_touching_the_cache() {
    let store = memory_store().await;
    seed(&store, &[TestBudget::new(1, "MERCHANT")]).await;

    let err = reconciler::<TestBudget>(&store)
        .reconcile(vec![], &Scope::all().eq("merchant_id", "merchant_id", 3))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), SyncErrorKind::Validation);
    assert_eq!(ids::<TestBudget>(&store, &Scope::all()).await, vec![1]);
}

#[tokio::test]
async fn committed_pass_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.sqlite3");

    {
        let db = cache_database::AsyncDatabase::open(&path).await.unwrap();
        let store = crate::CacheStore::new(db, cache_database::ChangeHub::new());
        reconciler::<TestBudget>(&store)
            .reconcile(
                vec![TestBudget::new(1, "MERCHANT"), TestBudget::new(2, "TAG")],
                &Scope::all(),
            )
            .await
            .unwrap();
        store.db().clone().close().await.unwrap();
    }

    let db = cache_database::AsyncDatabase::open(&path).await.unwrap();
    let store = crate::CacheStore::new(db, cache_database::ChangeHub::new());
    assert_eq!(ids::<TestBudget>(&store, &Scope::all()).await, vec![1, 2]);
}
