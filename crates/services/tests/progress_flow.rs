use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use progress_core::model::{
    Language, Progress, ProgressPatch, ProgressPatchDraft, ProgressTotals, UserId,
};
use progress_core::time::fixed_now;
use services::{Clock, ProgressService, ProgressServiceError, StatsService, StatsServiceError};
use storage::repository::{
    InMemoryRepository, MergeReceipt, ProgressRepository, ProgressStatsRepository, StorageError,
};

/// Backend that is never reachable.
struct DownRepository;

fn down() -> StorageError {
    StorageError::Connection("pool timed out while waiting for an open connection".into())
}

#[async_trait]
impl ProgressRepository for DownRepository {
    async fn get_progress(&self, _user_id: &UserId) -> Result<Option<Progress>, StorageError> {
        Err(down())
    }

    async fn merge_progress(
        &self,
        _user_id: &UserId,
        _patch: &ProgressPatch,
        _at: DateTime<Utc>,
    ) -> Result<MergeReceipt, StorageError> {
        Err(down())
    }

    async fn delete_progress(&self, _user_id: &UserId) -> Result<bool, StorageError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Err(down())
    }
}

#[async_trait]
impl ProgressStatsRepository for DownRepository {
    async fn progress_totals(&self) -> Result<ProgressTotals, StorageError> {
        Err(down())
    }
}

fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

#[tokio::test]
async fn learner_journey_merges_partial_updates() {
    let repo = InMemoryRepository::new();
    let service = ProgressService::new(Clock::fixed(fixed_now()), Arc::new(repo.clone()));
    let id = user("learner-1");

    let draft = ProgressPatchDraft {
        stars: Some(1),
        letters_completed: Some(vec!["A".into()]),
        language: Some("shona".into()),
        ..ProgressPatchDraft::new()
    };
    let created = service.upsert(&id, draft).await.unwrap();
    assert!(!created.modified);

    let draft = ProgressPatchDraft {
        stars: Some(3),
        math_completed: Some(vec![7, 7, 2]),
        ..ProgressPatchDraft::new()
    };
    let updated = service.upsert(&id, draft).await.unwrap();
    assert!(updated.modified);

    let progress = service.get(&id).await.unwrap();
    assert_eq!(progress.stars(), 3);
    assert_eq!(progress.level(), 1);
    assert!(progress.letters_completed().contains("A"));
    assert_eq!(progress.math_completed().len(), 2);
    assert_eq!(progress.language(), Language::Shona);
    assert_eq!(progress.updated_at(), Some(fixed_now()));

    service.reset(&id).await.unwrap();
    let after_reset = service.get(&id).await.unwrap();
    assert_eq!(after_reset, Progress::virtual_default(id));

    let stats = StatsService::new(Arc::new(repo)).compute().await.unwrap();
    assert_eq!(stats.total_users, 0);
}

#[tokio::test]
async fn updated_at_is_non_decreasing_with_system_clock() {
    let service = ProgressService::new(Clock::default(), Arc::new(InMemoryRepository::new()));
    let id = user("clocked");

    let mut previous = None;
    for stars in 0..5 {
        let outcome = service
            .save(&id, &ProgressPatch::new().with_stars(stars))
            .await
            .unwrap();
        if let Some(prev) = previous {
            assert!(outcome.updated_at >= prev);
        }
        previous = Some(outcome.updated_at);
    }
}

#[tokio::test]
async fn concurrent_first_writes_create_exactly_once() {
    let service = Arc::new(ProgressService::new(
        Clock::fixed(fixed_now()),
        Arc::new(InMemoryRepository::new()),
    ));
    let id = user("racer");

    let mut handles = Vec::new();
    for stars in 0..16 {
        let service = Arc::clone(&service);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            service
                .save(&id, &ProgressPatch::new().with_stars(stars))
                .await
                .unwrap()
                .modified
        }));
    }

    let mut created = 0;
    for handle in handles {
        if !handle.await.unwrap() {
            created += 1;
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test]
async fn unreachable_store_surfaces_storage_unavailable() {
    let service = ProgressService::new(Clock::fixed(fixed_now()), Arc::new(DownRepository));
    let id = user("offline");

    let err = service.get(&id).await.unwrap_err();
    assert!(matches!(err, ProgressServiceError::StorageUnavailable(_)));
    assert!(err.is_retryable());

    let err = service
        .save(&id, &ProgressPatch::new().with_language(Language::English))
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressServiceError::StorageUnavailable(_)));

    let err = service.reset(&id).await.unwrap_err();
    assert!(matches!(err, ProgressServiceError::StorageUnavailable(_)));

    assert!(!service.storage_available().await);

    let err = StatsService::new(Arc::new(DownRepository))
        .compute()
        .await
        .unwrap_err();
    assert!(matches!(err, StatsServiceError::StorageUnavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn validation_runs_before_the_store_is_touched() {
    let service = ProgressService::new(Clock::fixed(fixed_now()), Arc::new(DownRepository));
    let draft = ProgressPatchDraft {
        stars: Some(-3),
        ..ProgressPatchDraft::new()
    };

    let err = service.upsert(&user("offline"), draft).await.unwrap_err();
    assert!(matches!(err, ProgressServiceError::InvalidInput(_)));
}
