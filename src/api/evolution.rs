//! Evolution API client - outbound WhatsApp text messages.
//!
//! Sending is fire-and-forget from the core's perspective: failures are
//! logged and never retried or propagated, so a broken messaging service
//! cannot take the webhook handler down with it.

use crate::config::AppConfig;
use serde_json::json;
use tracing::{error, info};

/// Sends a WhatsApp text message to `recipient_jid` (the `@`-suffixed JID
/// from the webhook; anything after `@` is stripped before sending).
pub async fn send_text(
    client: &reqwest::Client,
    config: &AppConfig,
    recipient_jid: &str,
    message: &str,
) {
    let number = recipient_jid.split('@').next().unwrap_or(recipient_jid);
    let url = format!(
        "{}/message/sendText/{}",
        config.evolution_api_url, config.evolution_instance_name
    );
    let payload = json!({
        "number": number,
        "options": { "delay": 1200 },
        "text": message,
    });

    info!("Sending message to {number}");
    let result = client
        .post(url)
        .header("apikey", &config.evolution_api_key)
        .json(&payload)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status);

    if let Err(e) = result {
        error!("Failed to send WhatsApp message: {e}");
    }
}
