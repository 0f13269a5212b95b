use chrono::Duration;
use progress_core::model::{Language, ProgressPatch, UserId};
use progress_core::time::fixed_now;
use storage::repository::{MergeOutcome, ProgressRepository, ProgressStatsRepository};
use storage::sqlite::SqliteRepository;

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

#[tokio::test]
async fn sqlite_get_returns_none_for_unknown_user() {
    let repo = repo("memdb_unknown").await;
    assert!(repo.get_progress(&user("nobody")).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_merge_keeps_unsupplied_fields() {
    let repo = repo("memdb_merge").await;
    let id = user("chipo");

    let first = ProgressPatch::new()
        .with_stars(5)
        .with_level(2)
        .unwrap()
        .with_letters_completed(["A", "B"])
        .with_math_completed([3, 1])
        .with_language(Language::Shona);
    let receipt = repo.merge_progress(&id, &first, fixed_now()).await.unwrap();
    assert_eq!(receipt.outcome, MergeOutcome::Created);
    assert_eq!(receipt.updated_at, fixed_now());

    let later = fixed_now() + Duration::seconds(30);
    let receipt = repo
        .merge_progress(&id, &ProgressPatch::new().with_stars(10), later)
        .await
        .unwrap();
    assert_eq!(receipt.outcome, MergeOutcome::Updated);

    let stored = repo.get_progress(&id).await.unwrap().expect("stored");
    assert_eq!(stored.stars(), 10);
    assert_eq!(stored.level(), 2);
    assert_eq!(
        stored.letters_completed().iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["A", "B"]
    );
    assert_eq!(stored.math_completed().iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    assert!(stored.words_completed().is_empty());
    assert_eq!(stored.language(), Language::Shona);
    assert_eq!(stored.updated_at(), Some(later));
}

#[tokio::test]
async fn sqlite_insert_uses_defaults_for_missing_fields() {
    let repo = repo("memdb_defaults").await;
    let id = user("farai");

    repo.merge_progress(&id, &ProgressPatch::new(), fixed_now())
        .await
        .unwrap();

    let stored = repo.get_progress(&id).await.unwrap().expect("stored");
    assert_eq!(stored.stars(), 0);
    assert_eq!(stored.level(), 1);
    assert_eq!(stored.language(), Language::Both);
    assert!(stored.tracing_completed().is_empty());
}

#[tokio::test]
async fn sqlite_updated_at_is_non_decreasing() {
    let repo = repo("memdb_monotonic").await;
    let id = user("nyasha");
    let later = fixed_now() + Duration::minutes(10);

    repo.merge_progress(&id, &ProgressPatch::new(), later)
        .await
        .unwrap();
    let receipt = repo
        .merge_progress(&id, &ProgressPatch::new().with_stars(1), fixed_now())
        .await
        .unwrap();

    assert_eq!(receipt.updated_at, later);
    let stored = repo.get_progress(&id).await.unwrap().unwrap();
    assert_eq!(stored.stars(), 1);
    assert_eq!(stored.updated_at(), Some(later));
}

#[tokio::test]
async fn sqlite_delete_is_idempotent() {
    let repo = repo("memdb_delete").await;
    let id = user("tatenda");

    repo.merge_progress(&id, &ProgressPatch::new().with_stars(4), fixed_now())
        .await
        .unwrap();
    assert!(repo.delete_progress(&id).await.unwrap());
    assert!(!repo.delete_progress(&id).await.unwrap());
    assert!(repo.get_progress(&id).await.unwrap().is_none());

    let receipt = repo
        .merge_progress(&id, &ProgressPatch::new(), fixed_now())
        .await
        .unwrap();
    assert_eq!(receipt.outcome, MergeOutcome::Created);
}

#[tokio::test]
async fn sqlite_totals_scan_all_records() {
    let repo = repo("memdb_totals").await;

    let empty = repo.progress_totals().await.unwrap();
    assert_eq!(empty.users, 0);
    assert_eq!(empty.stars, 0);
    assert_eq!(empty.max_level, None);

    for (name, stars, level) in [("a", 3, 2), ("b", 7, 4)] {
        let patch = ProgressPatch::new()
            .with_stars(stars)
            .with_level(level)
            .unwrap();
        repo.merge_progress(&user(name), &patch, fixed_now())
            .await
            .unwrap();
    }

    let totals = repo.progress_totals().await.unwrap();
    assert_eq!(totals.users, 2);
    assert_eq!(totals.stars, 10);
    assert_eq!(totals.level_sum, 6);
    assert_eq!(totals.max_level, Some(4));
}

#[tokio::test]
async fn sqlite_ping_succeeds_on_open_pool() {
    let repo = repo("memdb_ping").await;
    repo.ping().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_first_writes_create_once() {
    let path = std::env::temp_dir().join(format!(
        "kudzidza-concurrent-{}.sqlite3",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite:{}?mode=rwc", path.display());
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    let id = user("rudo");

    let writers: Vec<_> = (0..32u32)
        .map(|n| {
            let repo = repo.clone();
            let id = id.clone();
            tokio::spawn(async move {
                repo.merge_progress(&id, &ProgressPatch::new().with_stars(n), fixed_now())
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for writer in writers {
        let receipt = writer.await.expect("join").expect("merge");
        if receipt.outcome == MergeOutcome::Created {
            created += 1;
        }
    }
    assert_eq!(created, 1);

    let totals = repo.progress_totals().await.unwrap();
    assert_eq!(totals.users, 1);

    repo.pool().close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
