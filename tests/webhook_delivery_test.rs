use contest_notifier::domain::ports::Channel;
use contest_notifier::utils::error::DeliveryError;
use contest_notifier::{Message, WebhookChannel, WebhookStyle};
use httpmock::prelude::*;

fn list_message() -> Message {
    Message::new("🏆 Upcoming Contests", 0x00ff00)
        .with_description("Here are the next 1 upcoming contests:")
        .with_field("AtCoder Beginner Contest 408", "**Duration:** 1h 40m")
        .with_footer("Updated every 10m")
}

#[tokio::test]
async fn test_content_style_posts_plain_text() {
    let server = MockServer::start_async().await;
    let hook = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/webhooks/1/token")
                .header("content-type", "application/json")
                .json_body(serde_json::json!({ "content": list_message().to_plain_text() }));
            then.status(204);
        })
        .await;

    let channel = WebhookChannel::new(server.url("/api/webhooks/1/token"), WebhookStyle::Content);
    channel.deliver(&list_message()).await.unwrap();
    hook.assert_async().await;
}

#[tokio::test]
async fn test_embed_style_posts_discord_embed() {
    let server = MockServer::start_async().await;
    let hook = server
        .mock_async(|when, then| {
            when.method(POST).path("/hook").json_body(serde_json::json!({
                "embeds": [{
                    "title": "🏆 Upcoming Contests",
                    "description": "Here are the next 1 upcoming contests:",
                    "color": 65280,
                    "fields": [{
                        "name": "AtCoder Beginner Contest 408",
                        "value": "**Duration:** 1h 40m",
                        "inline": false
                    }],
                    "footer": { "text": "Updated every 10m" }
                }]
            }));
            then.status(200).body("{}");
        })
        .await;

    let channel = WebhookChannel::new(server.url("/hook"), WebhookStyle::Embed);
    channel.deliver(&list_message()).await.unwrap();
    hook.assert_async().await;
}

#[tokio::test]
async fn test_rejected_post_reports_status_and_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/hook");
            then.status(400).body(r#"{"message":"Cannot send an empty message","code":50006}"#);
        })
        .await;

    let channel = WebhookChannel::new(server.url("/hook"), WebhookStyle::Content);
    let err = channel.deliver(&list_message()).await.unwrap_err();
    match err {
        DeliveryError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("50006"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_webhook_is_transport_error() {
    let channel = WebhookChannel::new("http://127.0.0.1:1/hook", WebhookStyle::Content);
    let err = channel.deliver(&list_message()).await.unwrap_err();
    assert!(matches!(err, DeliveryError::Transport(_)));
}
