use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, Form, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use standup_slack::commands::{CommandRouter, SlashCommandPayload};
use standup_slack::events::{EventsApiHandler, HandlerResult};
use tracing::warn;

use crate::bootstrap::Application;
use crate::health;

#[derive(Clone)]
pub struct IngressState {
    events: Arc<EventsApiHandler>,
    commands: Arc<CommandRouter>,
}

pub fn router(app: &Application) -> Router {
    Router::new()
        .route("/slack-events", post(slack_events))
        .route("/slash-config", post(slash_config))
        .with_state(IngressState { events: app.events.clone(), commands: app.commands.clone() })
        .merge(health::router(app.dispatcher.clone()))
}

/// Always acknowledges with 200 so Slack does not redeliver.
async fn slack_events(State(state): State<IngressState>, body: Bytes) -> Response {
    match state.events.handle(&body).await {
        HandlerResult::Challenge(challenge) => challenge.into_response(),
        HandlerResult::Dispatched(_) | HandlerResult::Ignored => StatusCode::OK.into_response(),
    }
}

/// Always answers 200. An unreadable form is routed as an empty command,
/// which gets the usage reply.
async fn slash_config(
    State(state): State<IngressState>,
    form: Result<Form<SlashCommandPayload>, FormRejection>,
) -> String {
    let payload = match form {
        Ok(Form(payload)) => payload,
        Err(rejection) => {
            warn!(
                event_name = "ingress.slash_command.decode_failed",
                error = %rejection,
                "failed to decode slash command form"
            );
            SlashCommandPayload::default()
        }
    };
    state.commands.route(&payload).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use standup_core::config::AppConfig;
    use standup_core::InMemoryMessageSender;
    use tower::ServiceExt;

    use crate::bootstrap::Application;
    use crate::routes::router;

    fn app() -> (Router, Application, InMemoryMessageSender) {
        let sender = InMemoryMessageSender::new();
        let app = Application::assemble(AppConfig::default(), Arc::new(sender.clone()));
        (router(&app), app, sender)
    }

    fn message_event(user: &str, channel: &str, text: &str) -> Request<Body> {
        let body = json!({
            "type": "event_callback",
            "event_id": "Ev1",
            "event": {"type": "message", "user": user, "channel": channel, "text": text}
        });
        Request::post("/slack-events")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn slash_command(text: &str, channel: &str) -> Request<Body> {
        let body = format!("command=%2Fstandup&text={text}&channel_id={channel}&user_id=U-ADMIN");
        Request::post("/slash-config")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request")
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    #[tokio::test]
    async fn url_verification_echoes_challenge_as_plain_text() {
        let (router, _, _) = app();
        let request = Request::post("/slack-events")
            .body(Body::from(json!({"type": "url_verification", "challenge": "c-42"}).to_string()))
            .expect("request");

        let response = router.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().expect("header");
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body_text(response).await, "c-42");
    }

    #[tokio::test]
    async fn message_event_is_acknowledged_and_dispatched() {
        let (router, app, sender) = app();

        let response = router.oneshot(message_event("U1", "D1", "start")).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.dispatcher.active_interviews().await.expect("count"), 1);
        assert_eq!(sender.sent_to("D1"), vec!["What did you accomplish yesterday?".to_owned()]);
    }

    #[tokio::test]
    async fn garbage_body_is_still_acknowledged() {
        let (router, app, sender) = app();
        let request = Request::post("/slack-events").body(Body::from("not json")).expect("request");

        let response = router.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.dispatcher.active_interviews().await.expect("count"), 0);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn report_here_routes_completed_reports_to_the_channel() {
        let (router, app, sender) = app();

        let response =
            router.clone().oneshot(slash_command("report+here", "C-TEAM")).await.expect("response");
        assert_eq!(body_text(response).await, "Thanks! I'll ask to report to that channel");
        assert_eq!(app.report_channel.get().await.as_deref(), Some("C-TEAM"));

        for text in ["start", "Fixed the build", "Write docs", "None"] {
            let response =
                router.clone().oneshot(message_event("U1", "D1", text)).await.expect("response");
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(
            sender.sent_to("C-TEAM"),
            vec![
                "<@U1>\n1. What did you accomplish yesterday?\nFixed the build\n\
                 2. What are you working on today?\nWrite docs\n\
                 3. Is anything standing in your way?\nNone"
                    .to_owned()
            ]
        );
    }

    #[tokio::test]
    async fn unknown_slash_command_gets_usage_reply() {
        let (router, app, _) = app();

        let response = router.oneshot(slash_command("help", "C-TEAM")).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "Sorry, I don't know this command. Please use `report here` command"
        );
        assert!(!app.report_channel.is_configured().await);
    }

    #[tokio::test]
    async fn slash_command_without_form_content_type_gets_usage_reply() {
        let (router, app, _) = app();
        let request = Request::post("/slash-config")
            .body(Body::from("text=report+here&channel_id=C1"))
            .expect("request");

        let response = router.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "Sorry, I don't know this command. Please use `report here` command"
        );
        assert!(!app.report_channel.is_configured().await);
    }

    #[tokio::test]
    async fn health_reports_runtime_state() {
        let (router, _, _) = app();

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let payload: Value = serde_json::from_str(&body_text(response).await).expect("json");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["active_interviews"], 0);
        assert_eq!(payload["report_channel_configured"], false);
    }
}
