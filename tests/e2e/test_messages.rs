use crate::e2e::helpers;

use helpers::{
    api_client::ApiResponse, assertions::parse_sse, cookie_pair, session_cookie, TestContext,
};
use hyper::StatusCode;
use serial_test::serial;
use luira_chat_backend::domain::{chat::MessageRole, user::AccountTier};
use test_context::test_context;

/// Stream the reply for a message response and return the SSE events
async fn stream_reply(ctx: &TestContext, response: &ApiResponse, cookie: &str) -> Vec<(String, String)> {
    let response_id = response
        .header("x-response-id")
        .expect("Missing x-response-id header");

    let stream = ctx
        .client
        .get_with_session(&format!("/chat/stream/{}", response_id), cookie)
        .await
        .unwrap();
    stream.assert_status(StatusCode::OK);
    assert!(stream
        .header("content-type")
        .is_some_and(|v| v.starts_with("text/event-stream")));

    parse_sse(&stream.text())
}

fn reply_text(events: &[(String, String)]) -> String {
    events
        .iter()
        .filter(|(event, _)| event == "message")
        .map(|(_, data)| data.as_str())
        .collect()
}

#[test_context(TestContext)]
#[tokio::test]
#[serial]
async fn it_should_accept_message_and_stream_rendered_reply(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("chat@example.com").await.unwrap();
    let cookie = session_cookie(user.id);

    let response = ctx
        .client
        .post_form_with_session("/chat/messages", &[("message", "Hi <there>")], &cookie)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert!(response
        .header("content-type")
        .is_some_and(|v| v.starts_with("text/html")));

    let fragment = response.text();
    let response_id = response.header("x-response-id").unwrap().clone();
    assert!(response_id.starts_with("ai-response-"));
    assert!(fragment.contains("Hi &lt;there&gt;"));
    assert!(fragment.contains(&format!("startAIStream('', '{}', '{}-content')", response_id, response_id)));

    let events = stream_reply(ctx, &response, &cookie).await;
    assert_eq!(
        events.last(),
        Some(&("complete".to_string(), "done".to_string()))
    );
    assert!(reply_text(&events).contains("<p>Hello <strong>world</strong></p>"));

    // Default model, routed to the hosted backend
    let calls = ctx.hosted.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "z-ai/glm-5");
    assert_eq!(calls[0].message, "Hi <there>");
    assert_eq!(calls[0].history_len, 0);
    assert!(ctx.agent.calls().is_empty());

    // Both sides of the exchange are persisted, the reply as raw markdown
    assert_eq!(ctx.fixtures.count_chats(user.id).await.unwrap(), 1);
    let stored = ctx.fixtures.get_user(user.id).await.unwrap();
    assert_eq!(stored.request_count, 1);
}

#[test_context(TestContext)]
#[tokio::test]
#[serial]
async fn it_should_continue_active_chat_with_history(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("history@example.com").await.unwrap();
    let cookie = session_cookie(user.id);

    let first = ctx
        .client
        .post_form_with_session("/chat/messages", &[("message", "First question")], &cookie)
        .await
        .unwrap();
    first.assert_status(StatusCode::OK);
    // The re-issued cookie points at the new chat
    let cookie = cookie_pair(first.header("set-cookie").expect("Missing session cookie"));
    stream_reply(ctx, &first, &cookie).await;

    let second = ctx
        .client
        .post_form_with_session("/chat/messages", &[("message", "Follow up")], &cookie)
        .await
        .unwrap();
    second.assert_status(StatusCode::OK);
    stream_reply(ctx, &second, &cookie).await;

    assert_eq!(ctx.fixtures.count_chats(user.id).await.unwrap(), 1);

    let calls = ctx.hosted.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].history_len, 2);

    let history = ctx
        .client
        .get_with_session("/chat/history", &cookie)
        .await
        .unwrap();
    let today = history.body.as_ref().unwrap().get("today").unwrap().as_array().unwrap().clone();
    assert_eq!(today.len(), 1);
    // Title follows the latest message
    assert_eq!(today[0].get("title").and_then(|v| v.as_str()), Some("Follow up"));

    let chat_id = today[0].get("id").and_then(|v| v.as_str()).unwrap();
    let messages = ctx
        .fixtures
        .messages_in_chat(chat_id.parse().unwrap())
        .await
        .unwrap();
    let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::Assistant
        ]
    );
    assert_eq!(messages[1].text(), "Hello **world**");
}

#[test_context(TestContext)]
#[tokio::test]
#[serial]
async fn it_should_reject_pro_model_for_free_user_without_persisting(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("free@example.com").await.unwrap();
    let cookie = session_cookie(user.id);

    let response = ctx
        .client
        .post_form_with_session(
            "/chat/messages",
            &[("message", "Write me a poem"), ("model", "claude-opus-4-6")],
            &cookie,
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::FORBIDDEN);
    response.assert_error_message("upgrade");

    assert_eq!(ctx.fixtures.count_messages_for_user(user.id).await.unwrap(), 0);
    assert_eq!(ctx.fixtures.count_chats(user.id).await.unwrap(), 0);
    assert_eq!(ctx.fixtures.get_user(user.id).await.unwrap().request_count, 0);
    assert!(ctx.hosted.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
#[serial]
async fn it_should_reject_when_monthly_quota_is_spent(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("spent@example.com").await.unwrap();
    ctx.fixtures.set_request_count(user.id, 50).await.unwrap();
    let cookie = session_cookie(user.id);

    let response = ctx
        .client
        .post_form_with_session("/chat/messages", &[("message", "One more?")], &cookie)
        .await
        .unwrap();

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    response.assert_error_message("Not enough requests remaining");
    assert_eq!(
        response.body.as_ref().unwrap().get("remaining").and_then(|v| v.as_i64()),
        Some(0)
    );
    assert_eq!(ctx.fixtures.count_messages_for_user(user.id).await.unwrap(), 0);
    assert_eq!(ctx.fixtures.get_user(user.id).await.unwrap().request_count, 50);
}

#[test_context(TestContext)]
#[tokio::test]
#[serial]
async fn it_should_route_capmap_to_agent_and_charge_its_cost(ctx: &TestContext) {
    let user = ctx
        .fixtures
        .create_user_with_tier("advanced@example.com", AccountTier::Advanced)
        .await
        .unwrap();
    let cookie = session_cookie(user.id);

    let response = ctx
        .client
        .post_form_with_session(
            "/chat/messages",
            &[("message", "Map the market"), ("model", "capmap")],
            &cookie,
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert!(response.text().contains("/logo.svg"));

    let events = stream_reply(ctx, &response, &cookie).await;
    assert!(reply_text(&events).contains("Capmap says hi"));

    assert_eq!(ctx.agent.calls().len(), 1);
    assert!(ctx.hosted.calls().is_empty());
    assert_eq!(ctx.fixtures.get_user(user.id).await.unwrap().request_count, 3);
}

#[test_context(TestContext)]
#[tokio::test]
#[serial]
async fn it_should_reject_blank_message(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("blank@example.com").await.unwrap();
    let cookie = session_cookie(user.id);

    let response = ctx
        .client
        .post_form_with_session("/chat/messages", &[("message", "   ")], &cookie)
        .await
        .unwrap();

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(ctx.fixtures.get_user(user.id).await.unwrap().request_count, 0);
}

#[test_context(TestContext)]
#[tokio::test]
#[serial]
async fn it_should_fail_stream_for_unknown_response(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("unknown@example.com").await.unwrap();
    let cookie = session_cookie(user.id);

    let stream = ctx
        .client
        .get_with_session("/chat/stream/ai-response-doesnotexist", &cookie)
        .await
        .unwrap();

    stream.assert_status(StatusCode::OK);
    let events = parse_sse(&stream.text());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "error");
}
