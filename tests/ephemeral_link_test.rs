// Ephemeral link lifecycle: creation, resolution, view consumption and expiry

mod common;

use chrono::{Duration, Utc};
use cheddar_backend_core::{
    models::{CreateEphemeralLinkRequest, LinkValidity},
    services::{EphemeralLinkService, PayPage, ProviderType},
    ServiceError,
};
use common::setup_test_app;
use std::sync::Arc;
use uuid::Uuid;

fn request(ids: Vec<Uuid>) -> CreateEphemeralLinkRequest {
    CreateEphemeralLinkRequest {
        payment_method_ids: ids,
        amount_cents: Some(2500),
        memo: Some("Dinner".to_string()),
    }
}

#[tokio::test]
async fn test_created_slug_resolves_with_zero_views() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let venmo = app.add_method(user.id, ProviderType::Venmo, "alice").await;

    let link = app
        .state
        .links
        .create(user.id, request(vec![venmo.id]))
        .await
        .unwrap();

    let resolved = app.state.links.resolve(user.id, &link.slug).await.unwrap();
    assert_eq!(resolved.id, link.id);
    assert_eq!(resolved.view_count, 0);
    assert_eq!(resolved.max_views, 3);
    assert_eq!(
        EphemeralLinkService::check_validity(&resolved, Utc::now()),
        LinkValidity::Valid
    );
    assert_eq!(resolved.expires_at - resolved.created_at, Duration::hours(24));
}

#[tokio::test]
async fn test_three_views_then_expired_presentation() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let venmo = app.add_method(user.id, ProviderType::Venmo, "alice").await;
    let zelle = app
        .add_method(user.id, ProviderType::Zelle, "alice@example.com")
        .await;

    let link = app
        .state
        .links
        .create(user.id, request(vec![venmo.id, zelle.id]))
        .await
        .unwrap();

    for expected_remaining in [2, 1, 0] {
        match app
            .state
            .pay_pages
            .ephemeral("alice", &link.slug, Utc::now())
            .await
            .unwrap()
        {
            PayPage::Ephemeral(page) => {
                assert_eq!(page.views_remaining, expected_remaining);
                assert_eq!(page.options.len(), 2);
                assert_eq!(page.amount.as_deref(), Some("25"));
            },
            other => panic!("expected ephemeral page, got {:?}", other),
        }
    }

    match app
        .state
        .pay_pages
        .ephemeral("alice", &link.slug, Utc::now())
        .await
        .unwrap()
    {
        PayPage::Expired(page) => assert_eq!(page.reason, LinkValidity::ViewLimitReached),
        other => panic!("expected expired page, got {:?}", other),
    }

    let stored = app.state.links.resolve(user.id, &link.slug).await.unwrap();
    assert_eq!(stored.view_count, 3);
}

#[tokio::test]
async fn test_link_created_in_the_past_is_immediately_expired() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let venmo = app.add_method(user.id, ProviderType::Venmo, "alice").await;

    let link = app
        .state
        .links
        .create_at(
            user.id,
            request(vec![venmo.id]),
            Utc::now() - Duration::hours(25),
        )
        .await
        .unwrap();
    assert_eq!(link.view_count, 0);

    let resolved = app.state.links.resolve(user.id, &link.slug).await.unwrap();
    assert_eq!(
        EphemeralLinkService::check_validity(&resolved, Utc::now()),
        LinkValidity::Expired
    );

    let err = app
        .state
        .links
        .record_view(&resolved, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Expired(LinkValidity::Expired)));

    match app
        .state
        .pay_pages
        .ephemeral("alice", &link.slug, Utc::now())
        .await
        .unwrap()
    {
        PayPage::Expired(page) => assert_eq!(page.reason, LinkValidity::Expired),
        other => panic!("expected expired page, got {:?}", other),
    }

    // Expired links never consume views
    let stored = app.state.links.resolve(user.id, &link.slug).await.unwrap();
    assert_eq!(stored.view_count, 0);
}

#[tokio::test]
async fn test_expiry_wins_over_remaining_views() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let venmo = app.add_method(user.id, ProviderType::Venmo, "alice").await;
    let link = app
        .state
        .links
        .create(user.id, request(vec![venmo.id]))
        .await
        .unwrap();

    let expiry = Utc::now() - Duration::seconds(1);
    app.store.set_link_expiry(link.id, expiry).unwrap();

    let resolved = app.state.links.resolve(user.id, &link.slug).await.unwrap();
    assert_eq!(
        EphemeralLinkService::check_validity(&resolved, expiry),
        LinkValidity::Expired
    );
    assert_eq!(
        EphemeralLinkService::check_validity(&resolved, expiry - Duration::milliseconds(1)),
        LinkValidity::Valid
    );
}

#[tokio::test]
async fn test_empty_method_list_is_rejected() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    app.add_method(user.id, ProviderType::Venmo, "alice").await;

    let err = app
        .state
        .links
        .create(user.id, request(vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
    assert_eq!(app.store.ephemeral_link_count(), 0);
    assert_eq!(app.store.link_method_count(), 0);
}

#[tokio::test]
async fn test_foreign_method_is_rejected() {
    let app = setup_test_app();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let bobs_venmo = app.add_method(bob.id, ProviderType::Venmo, "bob").await;

    let err = app
        .state
        .links
        .create(alice.id, request(vec![bobs_venmo.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
    assert_eq!(app.store.ephemeral_link_count(), 0);
}

#[tokio::test]
async fn test_duplicate_method_ids_collapse() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let venmo = app.add_method(user.id, ProviderType::Venmo, "alice").await;

    let link = app
        .state
        .links
        .create(user.id, request(vec![venmo.id, venmo.id]))
        .await
        .unwrap();

    let methods = app.state.links.linked_methods(&link).await.unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(app.store.link_method_count(), 1);
}

#[tokio::test]
async fn test_unknown_slug_is_not_found() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;

    let err = app
        .state
        .links
        .resolve(user.id, "nosuchslug")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));

    let err = app
        .state
        .pay_pages
        .ephemeral("alice", "nosuchslug", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));
}

#[tokio::test]
async fn test_slug_is_scoped_to_owner() {
    let app = setup_test_app();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let venmo = app.add_method(alice.id, ProviderType::Venmo, "alice").await;

    let link = app
        .state
        .links
        .create(alice.id, request(vec![venmo.id]))
        .await
        .unwrap();

    assert!(matches!(
        app.state.links.resolve(bob.id, &link.slug).await,
        Err(ServiceError::NotFound)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_visitors_never_exceed_cap() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let venmo = app.add_method(user.id, ProviderType::Venmo, "alice").await;
    let link = app
        .state
        .links
        .create(user.id, request(vec![venmo.id]))
        .await
        .unwrap();

    let pay_pages = Arc::new(app.state.pay_pages.clone());
    let mut handles = Vec::new();
    for _ in 0..10 {
        let pay_pages = pay_pages.clone();
        let slug = link.slug.clone();
        handles.push(tokio::spawn(async move {
            pay_pages.ephemeral("alice", &slug, Utc::now()).await
        }));
    }

    let mut rendered = 0;
    let mut expired = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            PayPage::Ephemeral(_) => rendered += 1,
            PayPage::Expired(page) => {
                assert_eq!(page.reason, LinkValidity::ViewLimitReached);
                expired += 1;
            },
            PayPage::Persistent(_) => panic!("unexpected persistent page"),
        }
    }

    assert_eq!(rendered, 3);
    assert_eq!(expired, 7);
    let stored = app.state.links.resolve(user.id, &link.slug).await.unwrap();
    assert_eq!(stored.view_count, 3);
}

#[tokio::test]
async fn test_removed_method_disappears_from_link() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let venmo = app.add_method(user.id, ProviderType::Venmo, "alice").await;
    let cashapp = app.add_method(user.id, ProviderType::Cashapp, "alice").await;

    let link = app
        .state
        .links
        .create(user.id, request(vec![venmo.id, cashapp.id]))
        .await
        .unwrap();

    app.state
        .payment_methods
        .remove(user.id, venmo.id)
        .await
        .unwrap();

    let methods = app.state.links.linked_methods(&link).await.unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].id, cashapp.id);
}

#[tokio::test]
async fn test_recent_links_newest_first() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let venmo = app.add_method(user.id, ProviderType::Venmo, "alice").await;

    let older = app
        .state
        .links
        .create_at(
            user.id,
            request(vec![venmo.id]),
            Utc::now() - Duration::minutes(5),
        )
        .await
        .unwrap();
    let newer = app
        .state
        .links
        .create(user.id, request(vec![venmo.id]))
        .await
        .unwrap();

    let recent = app
        .state
        .links
        .list_recent(user.id, Some("alice"))
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, newer.id);
    assert_eq!(recent[1].id, older.id);
    assert_eq!(
        recent[0].share_url,
        format!("https://cheddarl.ink/alice/{}", newer.slug)
    );
    assert_eq!(recent[0].views, "0/3");
}
