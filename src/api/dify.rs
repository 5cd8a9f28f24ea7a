//! Dify agent client.
//!
//! Sends the user's message text to the Dify chat endpoint and decodes the
//! agent's `answer` string into an [`Action`]. The agent is supposed to
//! answer with a JSON object, but occasionally replies with plain prose;
//! that case decodes to [`Action::NotUnderstood`] instead of failing.

use crate::{config::AppConfig, core::action::Action};
use serde_json::{Value, json};
use tracing::{error, info, warn};

/// Parses the agent's `answer` payload into an [`Action`].
///
/// Plain-text answers (anything that is not a JSON object with an `action`
/// tag) are treated as not understood.
#[must_use]
pub fn parse_agent_answer(answer: &str) -> Action {
    match serde_json::from_str::<Value>(answer) {
        Ok(value) => Action::from_agent_value(value),
        Err(_) => {
            warn!("Agent returned plain text instead of JSON: '{answer}'. Treating as not understood.");
            Action::NotUnderstood
        }
    }
}

/// Sends `text` to the Dify agent on behalf of `user_id` and returns the
/// decoded action, or `None` when the agent call itself fails.
pub async fn decode_message(
    client: &reqwest::Client,
    config: &AppConfig,
    user_id: &str,
    text: &str,
) -> Option<Action> {
    let payload = json!({
        "inputs": { "query": text },
        "query": text,
        "user": user_id,
        "response_mode": "blocking",
    });

    info!("Sending query to the agent for user {user_id}");
    let response = client
        .post(format!("{}/chat-messages", config.dify_api_url))
        .header("Authorization", &config.dify_api_key)
        .json(&payload)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status);

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            error!("Agent API call failed: {e}");
            return None;
        }
    };

    let body: Value = match response.json().await {
        Ok(body) => body,
        Err(e) => {
            error!("Agent API returned an unreadable body: {e}");
            return None;
        }
    };

    let answer = body.get("answer").and_then(Value::as_str).unwrap_or("");
    Some(parse_agent_answer(answer))
}
