mod common;

use common::FakeApi;
use postdesk::manager::PostsManager;
use postdesk::model::{SortBy, SortOrder};
use postdesk::state::{FilterIntent, FilterState};
use postdesk::sync::{with_page_size, AddressBar, MemoryHistory, SyncPhase};

fn manager(query: &str) -> PostsManager<MemoryHistory> {
    PostsManager::new(FakeApi::shared(), MemoryHistory::new(query), "username,image")
}

#[test]
fn mount_reads_url_without_rewriting_it() {
    let mut manager = manager("?tag=love&skip=0&sortBy=title");
    assert_eq!(manager.sync_phase(), SyncPhase::Uninitialized);

    let filters = manager.mount();

    assert_eq!(manager.sync_phase(), SyncPhase::Synced);
    assert_eq!(filters.tag, "love");
    assert_eq!(filters.sort_by, SortBy::Title);
    // The URL is left as the user typed it
    assert_eq!(manager.address_bar().query(), "tag=love&skip=0&sortBy=title");
    assert_eq!(manager.address_bar().len(), 1);
}

#[test]
fn filter_changes_replace_the_query() {
    let mut manager = manager("");
    manager.mount();

    assert!(manager.dispatch(FilterIntent::SetSortBy(SortBy::Reactions)));
    assert!(manager.dispatch(FilterIntent::SetOrder(SortOrder::Desc)));
    assert!(manager.dispatch(FilterIntent::NextPage { total: 100 }));

    assert_eq!(
        manager.address_bar().query(),
        "skip=10&sortBy=reactions&order=desc"
    );
    assert_eq!(manager.address_bar().len(), 1);
}

#[test]
fn unchanged_filters_do_not_touch_the_url() {
    let mut manager = manager("search=foo");
    manager.mount();
    assert!(!manager.dispatch(FilterIntent::SetSearch("foo".to_string())));
    assert_eq!(manager.address_bar().query(), "search=foo");
}

#[test]
fn back_navigation_restores_filters() {
    let mut manager = manager("");
    manager.mount();
    manager.address_bar_mut().push("search=history&limit=20");
    assert!(manager.navigated());
    assert_eq!(manager.store().filters().search, "history");
    assert_eq!(manager.store().filters().limit, 20);

    manager.address_bar_mut().back();
    assert!(manager.navigated());
    assert_eq!(manager.store().filters(), FilterState::default());
    assert_eq!(manager.address_bar().query(), "");

    // Re-reading the same URL changes nothing
    assert!(!manager.navigated());
}

#[test]
fn navigation_result_is_not_echoed_back() {
    let mut manager = manager("");
    manager.mount();
    manager.address_bar_mut().push("?tag=all&skip=0");
    manager.navigated();

    // Applying the parsed state must not rewrite the entry the user navigated to
    assert_eq!(manager.address_bar().query(), "tag=all&skip=0");
    assert!(manager.dispatch(FilterIntent::SetTag("love".to_string())));
    assert_eq!(manager.address_bar().query(), "tag=love");
}

#[test]
fn dispatch_before_mount_leaves_url_alone() {
    let mut manager = manager("skip=30");
    assert!(manager.dispatch(FilterIntent::SetSearch("foo".to_string())));
    assert_eq!(manager.address_bar().query(), "skip=30");
}

#[test]
fn configured_page_size_keeps_requested_skip() {
    let mut manager = manager(&with_page_size("skip=20", 20));
    let filters = manager.mount();
    assert_eq!(filters.skip, 20);
    assert_eq!(filters.limit, 20);

    let mut manager = self::manager(&with_page_size("skip=20&limit=10", 20));
    let filters = manager.mount();
    assert_eq!(filters.skip, 20);
    assert_eq!(filters.limit, 10);
}
