// Payment methods, visibility on each page type, referrals and username setup

mod common;

use chrono::Utc;
use cheddar_backend_core::{
    models::{
        CreateEphemeralLinkRequest, NewPaymentMethod, SetupUsernameRequest,
        UpdateReferralRequest,
    },
    services::{PayPage, ProviderType, ReferralKind},
    store::PaylinkStore,
    ServiceError,
};
use common::setup_test_app;
use uuid::Uuid;

#[tokio::test]
async fn test_zelle_is_pii_and_hidden_from_persistent_page() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let venmo = app.add_method(user.id, ProviderType::Venmo, "alice").await;
    let zelle = app
        .add_method(user.id, ProviderType::Zelle, "alice@example.com")
        .await;

    assert!(zelle.is_pii);
    assert!(!venmo.is_pii);

    match app.state.pay_pages.persistent("alice").await.unwrap() {
        PayPage::Persistent(page) => {
            let providers: Vec<&str> = page.options.iter().map(|o| o.provider.as_str()).collect();
            assert_eq!(providers, vec!["venmo"]);
        },
        other => panic!("expected persistent page, got {:?}", other),
    }

    let link = app
        .state
        .links
        .create(
            user.id,
            CreateEphemeralLinkRequest {
                payment_method_ids: vec![zelle.id],
                amount_cents: None,
                memo: None,
            },
        )
        .await
        .unwrap();

    match app
        .state
        .pay_pages
        .ephemeral("alice", &link.slug, Utc::now())
        .await
        .unwrap()
    {
        PayPage::Ephemeral(page) => {
            assert_eq!(page.options.len(), 1);
            let option = &page.options[0];
            assert_eq!(option.provider, "zelle");
            assert!(option.is_pii);
            assert!(option.url.is_none());
            assert_eq!(option.display_handle, "alice@example.com");
        },
        other => panic!("expected ephemeral page, got {:?}", other),
    }

    // Linking never leaks PII onto the public page
    match app.state.pay_pages.persistent("alice").await.unwrap() {
        PayPage::Persistent(page) => assert!(page.options.iter().all(|o| !o.is_pii)),
        other => panic!("expected persistent page, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stored_pii_flag_wins_over_registry() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;

    // Rows whose flag disagrees with the current provider registry
    let rows = [("venmo", true), ("zelle", false)];
    for (order, (provider, is_pii)) in rows.into_iter().enumerate() {
        app.store
            .insert_payment_method(NewPaymentMethod {
                id: Uuid::new_v4(),
                user_id: user.id,
                provider: provider.to_string(),
                handle: format!("alice-{}", provider),
                display_order: order as i32,
                is_pii,
                referral_code: None,
                referral_enabled: false,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    match app.state.pay_pages.persistent("alice").await.unwrap() {
        PayPage::Persistent(page) => {
            let providers: Vec<&str> = page.options.iter().map(|o| o.provider.as_str()).collect();
            assert_eq!(providers, vec!["zelle"]);
        },
        other => panic!("expected persistent page, got {:?}", other),
    }

    let response = app.get("/alice").send().await;
    let body = response.text().await;
    assert!(!body.contains("alice-venmo"));
    assert!(body.contains("alice-zelle"));
}

#[tokio::test]
async fn test_ephemeral_page_shows_only_linked_methods() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let venmo = app.add_method(user.id, ProviderType::Venmo, "alice").await;
    app.add_method(user.id, ProviderType::Cashapp, "$alice").await;
    let zelle = app
        .add_method(user.id, ProviderType::Zelle, "alice@example.com")
        .await;

    let link = app
        .state
        .links
        .create(
            user.id,
            CreateEphemeralLinkRequest {
                payment_method_ids: vec![zelle.id, venmo.id],
                amount_cents: Some(1250),
                memo: Some("Lunch".to_string()),
            },
        )
        .await
        .unwrap();

    match app
        .state
        .pay_pages
        .ephemeral("alice", &link.slug, Utc::now())
        .await
        .unwrap()
    {
        PayPage::Ephemeral(page) => {
            // Display order, not selection order
            let providers: Vec<&str> = page.options.iter().map(|o| o.provider.as_str()).collect();
            assert_eq!(providers, vec!["venmo", "zelle"]);
            assert_eq!(
                page.options[0].url.as_deref(),
                Some("venmo://paycharge?txn=pay&recipients=alice&amount=12.50&note=Lunch")
            );
            assert_eq!(page.amount.as_deref(), Some("12.50"));
            assert_eq!(page.memo.as_deref(), Some("Lunch"));
        },
        other => panic!("expected ephemeral page, got {:?}", other),
    }
}

#[tokio::test]
async fn test_display_order_follows_insertion() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    app.add_method(user.id, ProviderType::Github, "alice").await;
    app.add_method(user.id, ProviderType::Venmo, "alice").await;
    app.add_method(user.id, ProviderType::Kofi, "alice").await;

    let methods = app.state.payment_methods.list(user.id).await.unwrap();
    let orders: Vec<i32> = methods.iter().map(|m| m.display_order).collect();
    let providers: Vec<&str> = methods.iter().map(|m| m.provider.as_str()).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert_eq!(providers, vec!["github", "venmo", "kofi"]);
}

#[tokio::test]
async fn test_duplicate_provider_conflicts() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    app.add_method(user.id, ProviderType::Venmo, "alice").await;

    let err = app
        .state
        .payment_methods
        .add(
            user.id,
            cheddar_backend_core::models::AddPaymentMethodRequest {
                provider: ProviderType::Venmo,
                handle: "alice-2".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_blank_handle_rejected() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;

    let err = app
        .state
        .payment_methods
        .add(
            user.id,
            cheddar_backend_core::models::AddPaymentMethodRequest {
                provider: ProviderType::Kofi,
                handle: "   ".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn test_remove_unknown_method_is_not_found() {
    let app = setup_test_app();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let bobs = app.add_method(bob.id, ProviderType::Venmo, "bob").await;

    let err = app
        .state
        .payment_methods
        .remove(alice.id, bobs.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));
    assert_eq!(app.state.payment_methods.list(bob.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_referral_requires_code_when_enabled() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let cashapp = app.add_method(user.id, ProviderType::Cashapp, "$alice").await;

    let err = app
        .state
        .payment_methods
        .update_referral(
            user.id,
            cashapp.id,
            UpdateReferralRequest {
                referral_code: Some("   ".to_string()),
                referral_enabled: true,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let updated = app
        .state
        .payment_methods
        .update_referral(
            user.id,
            cashapp.id,
            UpdateReferralRequest {
                referral_code: Some("ALICE5".to_string()),
                referral_enabled: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.referral_code.as_deref(), Some("ALICE5"));
    assert!(updated.referral_enabled);

    let cta = updated.referral_cta().unwrap();
    assert_eq!(cta.kind, ReferralKind::Code);
    assert_eq!(cta.code, "ALICE5");
}

#[tokio::test]
async fn test_referral_rejected_without_program() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let kofi = app.add_method(user.id, ProviderType::Kofi, "alice").await;

    let err = app
        .state
        .payment_methods
        .update_referral(
            user.id,
            kofi.id,
            UpdateReferralRequest {
                referral_code: Some("CODE".to_string()),
                referral_enabled: false,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn test_disabled_referral_is_not_rendered() {
    let app = setup_test_app();
    let user = app.create_user("alice").await;
    let cashapp = app.add_method(user.id, ProviderType::Cashapp, "$alice").await;

    app.state
        .payment_methods
        .update_referral(
            user.id,
            cashapp.id,
            UpdateReferralRequest {
                referral_code: Some("ALICE5".to_string()),
                referral_enabled: false,
            },
        )
        .await
        .unwrap();

    match app.state.pay_pages.persistent("alice").await.unwrap() {
        PayPage::Persistent(page) => assert!(page.options[0].referral.is_none()),
        other => panic!("expected persistent page, got {:?}", other),
    }
}

#[tokio::test]
async fn test_username_setup_once_and_unique() {
    let app = setup_test_app();
    let alice = app.create_user("alice").await;
    assert_eq!(alice.display_name.as_deref(), Some("alice"));

    let err = app
        .state
        .users
        .setup_username(
            alice.id,
            SetupUsernameRequest {
                username: "alice-two".to_string(),
                display_name: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let newcomer = Uuid::new_v4();
    app.state.users.ensure_user(newcomer, None).await.unwrap();
    let err = app
        .state
        .users
        .setup_username(
            newcomer,
            SetupUsernameRequest {
                username: "alice".to_string(),
                display_name: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let availability = app.state.users.check_availability("alice").await.unwrap();
    assert!(!availability.available);
    let availability = app.state.users.check_availability("fresh-name").await.unwrap();
    assert!(availability.available);
    let availability = app.state.users.check_availability("admin").await.unwrap();
    assert!(!availability.available);
}

#[tokio::test]
async fn test_unknown_username_has_no_page() {
    let app = setup_test_app();
    let err = app.state.pay_pages.persistent("nobody").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));
}
