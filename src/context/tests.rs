//! Wishlist Context Scenarios
//!
//! End-to-end flows through the composition root with a scripted remote store.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ItemId, UserId, WishlistError, WishlistState};
use crate::membership::Affordance;
use crate::mutation::ToggleOutcome;
use crate::session::LoadOutcome;
use crate::test_support::{entry, item, network_error, Release, ScriptedRemote};

use super::WishlistContext;

fn setup() -> (Arc<ScriptedRemote>, WishlistContext) {
    let remote = ScriptedRemote::new();
    let ctx = WishlistContext::with_timeout(remote.clone(), Duration::from_secs(5));
    (remote, ctx)
}

fn user() -> UserId {
    UserId::from("u1")
}

#[tokio::test]
async fn test_scenario_toggle_into_empty_wishlist() {
    let (remote, ctx) = setup();
    ctx.login(user()).await.expect("login failed");

    assert_eq!(ctx.toggle(&item("x1")).await, Ok(ToggleOutcome::Added));

    let state = ctx.get();
    let wishlist = state.wishlist().expect("wishlist not loaded");
    assert_eq!(wishlist.count(), 1);
    assert_eq!(wishlist.entries()[0].item_id, ItemId::from("x1"));
    assert!(ctx.is_member(&ItemId::from("x1")));
    assert_eq!(remote.inner.stored_ids(&user()).await, vec![ItemId::from("x1")]);
}

#[tokio::test]
async fn test_scenario_failed_remove_rolls_back() {
    let (remote, ctx) = setup();
    remote.inner.seed_wishlist(&user(), vec![entry("x1")]).await;
    ctx.login(user()).await.unwrap();
    let before = ctx.get();
    remote.hold("remove#1").send(Release::Fail(network_error())).unwrap();

    let err = ctx.toggle(&item("x1")).await.unwrap_err();

    assert_eq!(err, WishlistError::Remote(network_error()));
    assert_eq!(ctx.get(), before);
    assert!(ctx.is_member(&ItemId::from("x1")));
    let notice = ctx.notice().expect("failure not reported");
    assert!(notice.retryable);
}

#[tokio::test]
async fn test_scenario_logout_clears_to_not_loaded() {
    let (remote, ctx) = setup();
    remote.inner.seed_wishlist(&user(), vec![entry("x1"), entry("x2")]).await;

    assert_eq!(ctx.login(user()).await, Ok(LoadOutcome::Applied));
    assert_eq!(ctx.count(), 2);

    ctx.logout();

    let state = ctx.get();
    assert_eq!(state, WishlistState::SignedOut);
    assert!(state.wishlist().is_none());
    assert_eq!(ctx.count(), 0);
    assert!(!ctx.is_member(&ItemId::from("x1")));
}

#[tokio::test]
async fn test_membership_during_and_after_failed_add() {
    let (remote, ctx) = setup();
    ctx.login(user()).await.unwrap();
    let gate = remote.hold("add#1");
    let id = ItemId::from("x1");
    let x1 = item("x1");

    let (result, ()) = tokio::join!(ctx.toggle(&x1), async {
        assert!(ctx.is_member(&id));
        assert_eq!(ctx.affordance(&id), Affordance::Pending);
        gate.send(Release::Fail(network_error())).unwrap();
    });

    assert!(result.is_err());
    assert!(!ctx.is_member(&id));
    assert_eq!(ctx.affordance(&id), Affordance::Add);
}

#[tokio::test]
async fn test_reload_does_not_overwrite_newer_toggle() {
    let (remote, ctx) = setup();
    remote.inner.seed_wishlist(&user(), vec![entry("a")]).await;
    ctx.login(user()).await.unwrap();
    let fetch = remote.hold("fetch#2");
    let b = item("b");

    let (reloaded, toggled, ()) = tokio::join!(ctx.reload(), ctx.toggle(&b), async {
        fetch.send(Release::Respond(vec![entry("a")])).unwrap();
    });

    assert_eq!(toggled, Ok(ToggleOutcome::Added));
    assert_eq!(reloaded, Ok(LoadOutcome::Superseded));
    assert!(ctx.is_member(&ItemId::from("b")));
    assert_eq!(ctx.count(), 2);
}

#[tokio::test]
async fn test_reload_during_inflight_add_keeps_item() {
    let (remote, ctx) = setup();
    remote.inner.seed_wishlist(&user(), vec![entry("a")]).await;
    ctx.login(user()).await.unwrap();
    let gate = remote.hold("add#1");
    let b = item("b");

    let (toggled, reloaded) = tokio::join!(ctx.toggle(&b), async {
        let reloaded = ctx.reload().await;
        assert!(ctx.is_member(&ItemId::from("b")));
        gate.send(Release::Proceed).unwrap();
        reloaded
    });

    assert_eq!(toggled, Ok(ToggleOutcome::Added));
    assert_eq!(reloaded, Ok(LoadOutcome::Applied));
    assert!(ctx.is_member(&ItemId::from("b")));
    assert_eq!(ctx.count(), 2);
    assert_eq!(
        remote.inner.stored_ids(&user()).await,
        vec![ItemId::from("a"), ItemId::from("b")]
    );
}

#[tokio::test]
async fn test_reload_during_inflight_remove_keeps_it_removed() {
    let (remote, ctx) = setup();
    remote.inner.seed_wishlist(&user(), vec![entry("a"), entry("b")]).await;
    ctx.login(user()).await.unwrap();
    let gate = remote.hold("remove#1");
    let a = item("a");

    let (toggled, reloaded) = tokio::join!(ctx.toggle(&a), async {
        let reloaded = ctx.reload().await;
        assert!(!ctx.is_member(&ItemId::from("a")));
        gate.send(Release::Proceed).unwrap();
        reloaded
    });

    assert_eq!(toggled, Ok(ToggleOutcome::Removed));
    assert_eq!(reloaded, Ok(LoadOutcome::Applied));
    assert!(!ctx.is_member(&ItemId::from("a")));
    assert_eq!(ctx.count(), 1);
    assert_eq!(remote.inner.stored_ids(&user()).await, vec![ItemId::from("b")]);
}

#[tokio::test]
async fn test_failed_add_after_reload_still_rolls_back() {
    let (remote, ctx) = setup();
    remote.inner.seed_wishlist(&user(), vec![entry("a")]).await;
    ctx.login(user()).await.unwrap();
    let gate = remote.hold("add#1");
    let b = item("b");

    let (toggled, reloaded) = tokio::join!(ctx.toggle(&b), async {
        let reloaded = ctx.reload().await;
        gate.send(Release::Fail(network_error())).unwrap();
        reloaded
    });

    assert_eq!(reloaded, Ok(LoadOutcome::Applied));
    assert!(toggled.is_err());
    assert!(!ctx.is_member(&ItemId::from("b")));
    assert_eq!(ctx.count(), 1);
}

#[tokio::test]
async fn test_restore_retries_failed_load() {
    let (remote, ctx) = setup();
    remote.inner.seed_wishlist(&user(), vec![entry("x1")]).await;
    remote.hold("fetch#1").send(Release::Fail(network_error())).unwrap();

    assert!(ctx.login(user()).await.is_err());
    assert!(matches!(ctx.get(), WishlistState::Failed { .. }));

    assert_eq!(ctx.restore(&Some(user())).await, Ok(Some(LoadOutcome::Applied)));
    assert_eq!(ctx.count(), 1);
    assert_eq!(remote.calls("fetch"), 2);
}

#[tokio::test]
async fn test_restore_from_persisted_session() {
    let (remote, ctx) = setup();
    remote.inner.seed_wishlist(&user(), vec![entry("x1")]).await;

    assert_eq!(ctx.affordance(&ItemId::from("x1")), Affordance::Hidden);
    assert_eq!(ctx.restore(&Some(user())).await, Ok(Some(LoadOutcome::Applied)));
    assert_eq!(ctx.affordance(&ItemId::from("x1")), Affordance::Remove);

    assert_eq!(ctx.restore(&None::<UserId>).await, Ok(None));
    assert_eq!(ctx.get(), WishlistState::SignedOut);
}

#[tokio::test]
async fn test_failed_login_reports_and_retry_clears() {
    let (remote, ctx) = setup();
    remote.inner.set_offline(true);

    assert!(ctx.login(user()).await.is_err());
    assert!(matches!(ctx.get(), WishlistState::Failed { .. }));
    assert_eq!(ctx.affordance(&ItemId::from("x1")), Affordance::Loading);
    assert!(ctx.notice().is_some());

    ctx.dismiss_notice();
    assert!(ctx.notice().is_none());

    remote.inner.set_offline(false);
    assert_eq!(ctx.reload().await, Ok(LoadOutcome::Applied));
    assert!(ctx.get().is_loaded());
}

#[tokio::test]
async fn test_observer_sees_optimistic_state() {
    let (_, ctx) = setup();
    ctx.login(user()).await.unwrap();
    let mut rx = ctx.subscribe();
    rx.mark_unchanged();

    ctx.toggle(&item("x1")).await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().count(), 1);
}

#[tokio::test]
async fn test_item_details_through_context() {
    let (remote, ctx) = setup();
    remote.inner.insert_item(item("x1")).await;

    let details = ctx.item_details(&ItemId::from("x1")).await.unwrap();
    assert_eq!(details.item.id, ItemId::from("x1"));
    assert!(details.seller.is_none());
}
