mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{page_of, post_with, FakeApi};
use postdesk::cache::{CacheError, CacheKey, CacheValue, QueryCache};
use postdesk::model::{NewPost, PostPatch, PostsPage, Reactions, Sort, SortBy, SortOrder};
use postdesk::mutation::{MutationCoordinator, MutationError};

fn list_key() -> CacheKey {
    CacheKey::PostList {
        limit: 10,
        skip: 0,
        sort: Sort::default(),
    }
}

fn setup(api: FakeApi) -> (Arc<FakeApi>, MutationCoordinator) {
    let api = Arc::new(api);
    let cache = QueryCache::new(api.clone());
    (api.clone(), MutationCoordinator::new(api, cache))
}

fn posts_at(coordinator: &MutationCoordinator, key: &CacheKey) -> PostsPage {
    coordinator
        .cache()
        .read(key)
        .and_then(CacheValue::into_posts)
        .expect("posts cached")
}

fn new_post() -> NewPost {
    NewPost {
        title: "T".to_string(),
        body: "B".to_string(),
        user_id: 1,
    }
}

#[tokio::test]
async fn create_post_shows_placeholder_until_server_confirms() {
    let (api, coordinator) = setup(FakeApi::new());
    let key = list_key();
    coordinator
        .cache()
        .write(&key, CacheValue::Posts(PostsPage::default()));

    api.pause();
    let task = {
        let coordinator = coordinator.clone();
        let key = key.clone();
        tokio::spawn(async move { coordinator.create_post(&key, new_post()).await })
    };
    api.wait_for_calls("create_post", 1).await;

    let pending = posts_at(&coordinator, &key);
    assert_eq!(pending.posts.len(), 1);
    assert_eq!(pending.total, 1);
    let placeholder = &pending.posts[0];
    assert!(placeholder.id < 0);
    assert!(placeholder.is_provisional());
    assert_eq!(
        placeholder.reactions,
        Some(Reactions {
            likes: 0,
            dislikes: 0
        })
    );

    api.release(1);
    let created = task.await.unwrap().unwrap();
    assert_eq!(created.id, 101);

    let settled = posts_at(&coordinator, &key);
    assert_eq!(settled.posts.len(), 1);
    assert_eq!(settled.posts[0].id, 101);
    assert!(settled.posts.iter().all(|p| p.id > 0));
    // Server omitted reactions; the placeholder's zeros are kept
    assert_eq!(settled.posts[0].likes(), 0);
    assert!(settled.posts[0].reactions.is_some());
}

#[tokio::test]
async fn created_post_goes_to_the_head_of_the_list() {
    let (_api, coordinator) = setup(FakeApi::new());
    let key = list_key();
    let before = page_of(vec![post_with(1, "a", 1), post_with(2, "b", 1)]);
    coordinator.cache().write(&key, CacheValue::Posts(before));

    coordinator.create_post(&key, new_post()).await.unwrap();

    let after = posts_at(&coordinator, &key);
    let ids: Vec<i64> = after.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![101, 1, 2]);
    assert_eq!(after.total, 3);
}

#[tokio::test]
async fn failed_create_restores_snapshot() {
    let (api, coordinator) = setup(FakeApi::new());
    let key = list_key();
    let before = page_of(vec![post_with(5, "five", 1)]);
    coordinator
        .cache()
        .write(&key, CacheValue::Posts(before.clone()));

    api.fail_next(500);
    let err = coordinator.create_post(&key, new_post()).await.unwrap_err();

    assert!(matches!(err, MutationError::Remote(ref e) if e.status() == Some(500)));
    assert_eq!(posts_at(&coordinator, &key), before);
}

#[tokio::test]
async fn failed_create_on_empty_key_removes_speculative_value() {
    let (api, coordinator) = setup(FakeApi::new());
    let key = list_key();

    api.fail_next(503);
    assert!(coordinator.create_post(&key, new_post()).await.is_err());
    assert_eq!(coordinator.cache().read(&key), None);
}

#[tokio::test]
async fn failed_delete_restores_list() {
    let (api, coordinator) = setup(FakeApi::new());
    let key = list_key();
    let before = page_of(vec![post_with(5, "five", 1), post_with(6, "six", 1)]);
    coordinator
        .cache()
        .write(&key, CacheValue::Posts(before.clone()));

    api.pause();
    api.fail_next(500);
    let task = {
        let coordinator = coordinator.clone();
        let key = key.clone();
        tokio::spawn(async move { coordinator.delete_post(&key, 5).await })
    };
    api.wait_for_calls("delete_post", 1).await;

    let pending = posts_at(&coordinator, &key);
    assert_eq!(pending.posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![6]);
    assert_eq!(pending.total, 1);

    api.release(1);
    assert!(task.await.unwrap().is_err());
    assert_eq!(posts_at(&coordinator, &key), before);
}

#[tokio::test]
async fn successful_delete_marks_every_post_list_stale() {
    let (_api, coordinator) = setup(FakeApi::new());
    let key = list_key();
    let search = CacheKey::PostSearch {
        query: "five".to_string(),
        sort: Sort::default(),
    };
    let comments = CacheKey::Comments { post_id: 5 };
    let cache = coordinator.cache();
    cache.write(
        &key,
        CacheValue::Posts(page_of(vec![post_with(5, "five", 1), post_with(6, "six", 1)])),
    );
    cache.write(&search, CacheValue::Posts(page_of(vec![post_with(5, "five", 1)])));
    cache.write(&comments, CacheValue::Comments(Default::default()));

    coordinator.delete_post(&key, 5).await.unwrap();

    assert!(cache.is_stale(&key));
    assert!(cache.is_stale(&search));
    assert!(!cache.is_stale(&comments));
    // Nobody observes the list, so the speculative value stays readable
    assert_eq!(posts_at(&coordinator, &key).posts.len(), 1);
}

#[tokio::test]
async fn update_merges_changed_fields_only() {
    let (api, coordinator) = setup(FakeApi::new());
    let key = list_key();
    let original = post_with(5, "old title", 3);
    coordinator
        .cache()
        .write(&key, CacheValue::Posts(page_of(vec![original.clone()])));

    api.pause();
    let task = {
        let coordinator = coordinator.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let patch = PostPatch {
                title: Some("new title".to_string()),
                body: None,
            };
            coordinator.update_post(&key, 5, patch).await
        })
    };
    api.wait_for_calls("update_post", 1).await;

    let pending = posts_at(&coordinator, &key);
    assert_eq!(pending.posts[0].title, "new title");
    assert_eq!(pending.posts[0].body, original.body);
    assert_eq!(pending.posts[0].user_id, 3);

    api.release(1);
    task.await.unwrap().unwrap();
    assert!(coordinator.cache().is_stale(&key));
}

#[tokio::test]
async fn failed_update_restores_snapshot() {
    let (api, coordinator) = setup(FakeApi::new());
    let key = list_key();
    let before = page_of(vec![post_with(5, "five", 1)]);
    coordinator
        .cache()
        .write(&key, CacheValue::Posts(before.clone()));

    api.fail_next(404);
    let patch = PostPatch {
        title: None,
        body: Some("changed".to_string()),
    };
    assert!(coordinator.update_post(&key, 5, patch).await.is_err());
    assert_eq!(posts_at(&coordinator, &key), before);
}

#[tokio::test]
async fn invalid_requests_never_touch_cache_or_network() {
    let (api, coordinator) = setup(FakeApi::new());
    let key = list_key();
    let before = page_of(vec![post_with(5, "five", 1), post_with(-42, "pending", 1)]);
    coordinator
        .cache()
        .write(&key, CacheValue::Posts(before.clone()));

    let blank_title = NewPost {
        title: "  ".to_string(),
        ..new_post()
    };
    let no_user = NewPost {
        user_id: 0,
        ..new_post()
    };
    let rename = || PostPatch {
        title: Some("x".to_string()),
        body: None,
    };

    let results = vec![
        coordinator.create_post(&key, blank_title).await.map(|_| ()),
        coordinator.create_post(&key, no_user).await.map(|_| ()),
        coordinator
            .update_post(&key, 5, PostPatch::default())
            .await
            .map(|_| ()),
        coordinator.update_post(&key, 77, rename()).await.map(|_| ()),
        coordinator.update_post(&key, -42, rename()).await.map(|_| ()),
        coordinator.delete_post(&key, -42).await,
        coordinator.delete_post(&key, 77).await,
        coordinator
            .delete_post(&CacheKey::Comments { post_id: 5 }, 5)
            .await,
    ];

    for result in results {
        assert!(result.unwrap_err().is_validation());
    }
    assert!(api.calls().is_empty());
    assert_eq!(posts_at(&coordinator, &key), before);
}

#[tokio::test]
async fn mutations_on_one_key_run_one_at_a_time() {
    let (api, coordinator) = setup(FakeApi::new());
    let key = list_key();
    coordinator.cache().write(
        &key,
        CacheValue::Posts(page_of(vec![post_with(5, "five", 1), post_with(6, "six", 1)])),
    );

    api.pause();
    let first = {
        let coordinator = coordinator.clone();
        let key = key.clone();
        tokio::spawn(async move { coordinator.delete_post(&key, 5).await })
    };
    api.wait_for_calls("delete_post", 1).await;
    let second = {
        let coordinator = coordinator.clone();
        let key = key.clone();
        tokio::spawn(async move { coordinator.delete_post(&key, 6).await })
    };

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(api.call_count("delete_post"), 1);
    assert_eq!(posts_at(&coordinator, &key).posts.len(), 1);

    api.release(2);
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    assert!(posts_at(&coordinator, &key).posts.is_empty());
}

#[tokio::test]
async fn pre_commit_cancels_competing_fetch() {
    let (api, coordinator) = setup(FakeApi::new().with_posts(vec![post_with(1, "server", 1)]));
    let key = CacheKey::PostList {
        limit: 10,
        skip: 0,
        sort: Sort::new(SortBy::Title, SortOrder::Desc),
    };

    api.pause();
    let fetch = {
        let cache = coordinator.cache().clone();
        let key = key.clone();
        tokio::spawn(async move { cache.fetch(&key).await })
    };
    api.wait_for_calls("posts", 1).await;

    let create = {
        let coordinator = coordinator.clone();
        let key = key.clone();
        tokio::spawn(async move { coordinator.create_post(&key, new_post()).await })
    };

    let fetched = fetch.await.unwrap();
    assert!(matches!(fetched, Err(CacheError::Cancelled { .. })));

    api.wait_for_calls("create_post", 1).await;
    api.release(1);
    create.await.unwrap().unwrap();

    let ids: Vec<i64> = posts_at(&coordinator, &key).posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![101]);
}
