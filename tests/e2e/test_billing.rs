use crate::e2e::helpers;

use chrono::{Duration, Utc};
use helpers::{api_client::ApiResponse, TestContext, TEST_WEBHOOK_SECRET};
use hyper::StatusCode;
use luira_chat_backend::domain::{billing::compute_signature, user::AccountTier};
use serde_json::{json, Value};
use test_context::test_context;

async fn send_signed(ctx: &TestContext, event: &Value) -> ApiResponse {
    let payload = serde_json::to_vec(event).unwrap();
    let timestamp = Utc::now().timestamp();
    let header = format!(
        "t={},v1={}",
        timestamp,
        compute_signature(&payload, timestamp, TEST_WEBHOOK_SECRET)
    );

    ctx.client
        .post_raw(
            "/stripe/webhook",
            &payload,
            &[("Content-Type", "application/json"), ("Stripe-Signature", header.as_str())],
        )
        .await
        .unwrap()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_upgrade_plan_on_checkout(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("buyer@example.com").await.unwrap();

    let response = send_signed(
        ctx,
        &json!({
            "type": "checkout.session.completed",
            "data": { "object": {
                "client_reference_id": user.id,
                "customer": "cus_123",
                "subscription": "sub_123",
                "metadata": { "plan": "pro" }
            }}
        }),
    )
    .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body, Some(json!({ "received": true })));

    let stored = ctx.fixtures.get_user(user.id).await.unwrap();
    assert_eq!(stored.account_type, AccountTier::Pro);
    assert_eq!(stored.stripe_customer_id.as_deref(), Some("cus_123"));
    assert_eq!(stored.stripe_subscription_id.as_deref(), Some("sub_123"));
    assert!(stored.subscription_ends_at.is_none());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_default_checkout_plan_to_advanced(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("buyer@example.com").await.unwrap();

    let response = send_signed(
        ctx,
        &json!({
            "type": "checkout.session.completed",
            "data": { "object": {
                "client_reference_id": user.id,
                "customer": "cus_456",
                "subscription": "sub_456"
            }}
        }),
    )
    .await;

    response.assert_status(StatusCode::OK);
    let stored = ctx.fixtures.get_user(user.id).await.unwrap();
    assert_eq!(stored.account_type, AccountTier::Advanced);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_keep_paid_access_until_period_end_after_cancellation(ctx: &TestContext) {
    let user = ctx
        .fixtures
        .create_user_with_tier("leaver@example.com", AccountTier::Pro)
        .await
        .unwrap();
    ctx.fixtures.set_stripe_customer(user.id, "cus_leaver").await.unwrap();
    let period_end = (Utc::now() + Duration::days(10)).timestamp();

    let response = send_signed(
        ctx,
        &json!({
            "type": "customer.subscription.deleted",
            "data": { "object": {
                "customer": "cus_leaver",
                "items": { "data": [{ "current_period_end": period_end }] }
            }}
        }),
    )
    .await;

    response.assert_status(StatusCode::OK);
    let stored = ctx.fixtures.get_user(user.id).await.unwrap();
    assert_eq!(stored.account_type, AccountTier::Pro);
    assert_eq!(
        stored.subscription_ends_at.map(|t| t.timestamp()),
        Some(period_end)
    );
    assert_eq!(stored.effective_tier(), AccountTier::Pro);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_downgrade_immediately_on_final_payment_failure(ctx: &TestContext) {
    let user = ctx
        .fixtures
        .create_user_with_tier("broke@example.com", AccountTier::Advanced)
        .await
        .unwrap();
    ctx.fixtures.set_stripe_customer(user.id, "cus_broke").await.unwrap();

    // A retry is still scheduled: nothing changes yet
    let response = send_signed(
        ctx,
        &json!({
            "type": "invoice.payment_failed",
            "data": { "object": { "customer": "cus_broke", "next_payment_attempt": 1900000000 } }
        }),
    )
    .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(
        ctx.fixtures.get_user(user.id).await.unwrap().account_type,
        AccountTier::Advanced
    );

    let response = send_signed(
        ctx,
        &json!({
            "type": "invoice.payment_failed",
            "data": { "object": { "customer": "cus_broke", "next_payment_attempt": null } }
        }),
    )
    .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(
        ctx.fixtures.get_user(user.id).await.unwrap().account_type,
        AccountTier::Free
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_acknowledge_unrelated_events(ctx: &TestContext) {
    let response = send_signed(
        ctx,
        &json!({ "type": "customer.created", "data": { "object": { "id": "cus_new" } } }),
    )
    .await;

    response.assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_bad_or_missing_signature(ctx: &TestContext) {
    let payload = br#"{"type":"checkout.session.completed","data":{"object":{}}}"#;

    let response = ctx
        .client
        .post_raw("/stripe/webhook", payload, &[("Content-Type", "application/json")])
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);

    let timestamp = Utc::now().timestamp();
    let forged = format!(
        "t={},v1={}",
        timestamp,
        compute_signature(payload, timestamp, "whsec_someone_else")
    );
    let response = ctx
        .client
        .post_raw(
            "/stripe/webhook",
            payload,
            &[("Content-Type", "application/json"), ("Stripe-Signature", forged.as_str())],
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
}
