mod common;

use serde_json::json;
use test_context::test_context;

use common::TestHarness;
use server_core::domains::notifications::{ChannelKeys, Subscription, SubscriptionKind};

#[test_context(TestHarness)]
#[tokio::test]
async fn resubscribing_updates_the_row_in_place(ctx: &mut TestHarness) {
    let endpoint = "https://push.example.org/send/resub-1";

    let first = Subscription::upsert(
        endpoint,
        SubscriptionKind::Web,
        json!({"auth": "a1", "p256dh": "p1"}),
        Some("10.0.0.1"),
        &ctx.db_pool,
    )
    .await
    .unwrap();

    let second = Subscription::upsert(
        endpoint,
        SubscriptionKind::Web,
        json!({"auth": "a2", "p256dh": "p2"}),
        Some("10.0.0.2"),
        &ctx.db_pool,
    )
    .await
    .unwrap();

    assert_eq!(first.id, second.id);
    match second.channel_keys().unwrap() {
        ChannelKeys::Web { auth, p256dh } => {
            assert_eq!(auth, "a2");
            assert_eq!(p256dh, "p2");
        }
        other => panic!("expected web keys, got {:?}", other),
    }

    let found = Subscription::find_by_endpoint(endpoint, SubscriptionKind::Web, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, first.id);
    assert_eq!(found.ip_address.as_deref(), Some("10.0.0.2"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn web_and_fcm_rows_with_the_same_endpoint_are_distinct(ctx: &mut TestHarness) {
    let endpoint = "https://push.example.org/send/dual-1";

    let web = Subscription::upsert(
        endpoint,
        SubscriptionKind::Web,
        json!({"auth": "a", "p256dh": "p"}),
        None,
        &ctx.db_pool,
    )
    .await
    .unwrap();
    let fcm = Subscription::upsert(
        endpoint,
        SubscriptionKind::Fcm,
        json!({"token": "device-token"}),
        None,
        &ctx.db_pool,
    )
    .await
    .unwrap();

    assert_ne!(web.id, fcm.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn keys_are_validated_against_the_channel(ctx: &mut TestHarness) {
    let result = Subscription::upsert(
        "https://push.example.org/send/invalid-1",
        SubscriptionKind::Web,
        json!({"token": "wrong-shape"}),
        None,
        &ctx.db_pool,
    )
    .await;
    assert!(result.is_err());

    assert!(Subscription::find_by_endpoint(
        "https://push.example.org/send/invalid-1",
        SubscriptionKind::Web,
        &ctx.db_pool
    )
    .await
    .unwrap()
    .is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn deleted_subscriptions_are_gone(ctx: &mut TestHarness) {
    let endpoint = "https://push.example.org/send/delete-1";
    let sub = Subscription::upsert(
        endpoint,
        SubscriptionKind::Fcm,
        json!({"token": "t"}),
        None,
        &ctx.db_pool,
    )
    .await
    .unwrap();

    let before = Subscription::count(&ctx.db_pool).await.unwrap();
    assert!(before >= 1);

    Subscription::delete(sub.id, &ctx.db_pool).await.unwrap();

    assert!(
        Subscription::find_by_endpoint(endpoint, SubscriptionKind::Fcm, &ctx.db_pool)
            .await
            .unwrap()
            .is_none()
    );
}
