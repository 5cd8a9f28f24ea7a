//! Evolution webhook handler - the inbound path for WhatsApp messages.
//!
//! Filters the webhook event stream down to fresh inbound text messages,
//! hands the text to the agent for decoding, dispatches the resulting
//! action, and sends the reply. Audio messages are acknowledged but not
//! processed; transcription is owned by an external pipeline.

use crate::{
    api::{dify, evolution},
    core::{action, ledger},
    web::AppState,
};
use axum::{Json, extract::State};
use chrono::Utc;
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing::{info, warn};

#[allow(clippy::expect_used)]
static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\D").expect("pattern is valid"));

fn status(value: &str) -> Json<Value> {
    Json(json!({ "status": value }))
}

/// Receives Evolution webhook events and drives one full
/// message-in/message-out cycle for each inbound text.
pub async fn evolution_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    if payload.get("event").and_then(Value::as_str) != Some("messages.upsert") {
        return status("evento_ignorado");
    }

    let data = payload.get("data").cloned().unwrap_or_default();
    if data
        .pointer("/key/fromMe")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return status("mensagem_propria_ignorada");
    }

    let Some(sender_jid) = data
        .pointer("/key/remoteJid")
        .and_then(Value::as_str)
        .map(String::from)
    else {
        return status("dados_insuficientes");
    };
    let Some(message) = data.get("message") else {
        return status("dados_insuficientes");
    };

    let text = message.get("conversation").and_then(Value::as_str);
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        if message.get("audioMessage").is_some() {
            info!("Audio message from {sender_jid}; transcription is handled externally");
            return status("tipo_nao_suportado");
        }
        info!("Unsupported message type from {sender_jid}");
        return status("tipo_nao_suportado");
    };

    info!(">>> Processing text from [{sender_jid}]");
    let agent_user_id = NON_DIGITS.replace_all(&sender_jid, "").to_string();
    let Some(decoded) =
        dify::decode_message(&state.http, &state.config, &agent_user_id, text).await
    else {
        warn!("No result from the agent. Aborting.");
        return status("falha_dify");
    };

    let user = match ledger::get_or_create_user(&state.db, &sender_jid).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Could not load or create user {sender_jid}: {e}");
            return status("falha_usuario");
        }
    };

    let reply = action::dispatch(&state.db, &state.config, &user, decoded, Utc::now()).await;
    evolution::send_text(&state.http, &state.config, &sender_jid, &reply).await;

    status("processado")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Result;
    use crate::test_utils::*;
    use std::sync::Arc;

    async fn test_state() -> Result<AppState> {
        let db = setup_test_db().await?;
        Ok(AppState::new(db, Arc::new(test_config(None))))
    }

    fn status_of(response: &Json<Value>) -> &str {
        response.0.get("status").and_then(Value::as_str).unwrap_or("")
    }

    async fn call(state: AppState, payload: Value) -> Json<Value> {
        evolution_webhook(axum::extract::State(state), Json(payload)).await
    }

    #[tokio::test]
    async fn test_webhook_ignores_other_events() -> Result<()> {
        let state = test_state().await?;
        let response = call(state, json!({ "event": "connection.update" })).await;
        assert_eq!(status_of(&response), "evento_ignorado");
        Ok(())
    }

    #[tokio::test]
    async fn test_webhook_ignores_payload_without_event() -> Result<()> {
        let state = test_state().await?;
        let response = call(state, json!({ "data": {} })).await;
        assert_eq!(status_of(&response), "evento_ignorado");
        Ok(())
    }

    #[tokio::test]
    async fn test_webhook_ignores_own_messages() -> Result<()> {
        let state = test_state().await?;
        let payload = json!({
            "event": "messages.upsert",
            "data": {
                "key": {
                    "fromMe": true,
                    "remoteJid": "5511999990000@s.whatsapp.net",
                },
                "message": { "conversation": "gastei 50 no mercado" },
            },
        });
        let response = call(state, payload).await;
        assert_eq!(status_of(&response), "mensagem_propria_ignorada");
        Ok(())
    }

    #[tokio::test]
    async fn test_webhook_rejects_missing_sender() -> Result<()> {
        let state = test_state().await?;
        let payload = json!({
            "event": "messages.upsert",
            "data": {
                "key": { "fromMe": false },
                "message": { "conversation": "olá" },
            },
        });
        let response = call(state, payload).await;
        assert_eq!(status_of(&response), "dados_insuficientes");
        Ok(())
    }

    #[tokio::test]
    async fn test_webhook_rejects_missing_message() -> Result<()> {
        let state = test_state().await?;
        let payload = json!({
            "event": "messages.upsert",
            "data": {
                "key": {
                    "fromMe": false,
                    "remoteJid": "5511999990000@s.whatsapp.net",
                },
            },
        });
        let response = call(state, payload).await;
        assert_eq!(status_of(&response), "dados_insuficientes");
        Ok(())
    }

    #[tokio::test]
    async fn test_webhook_acknowledges_audio_without_processing() -> Result<()> {
        let state = test_state().await?;
        let payload = json!({
            "event": "messages.upsert",
            "data": {
                "key": {
                    "fromMe": false,
                    "remoteJid": "5511999990000@s.whatsapp.net",
                },
                "message": {
                    "audioMessage": { "url": "https://media.example/audio.ogg" },
                },
            },
        });
        let response = call(state, payload).await;
        assert_eq!(status_of(&response), "tipo_nao_suportado");
        Ok(())
    }

    #[tokio::test]
    async fn test_webhook_rejects_unsupported_message_type() -> Result<()> {
        let state = test_state().await?;
        let payload = json!({
            "event": "messages.upsert",
            "data": {
                "key": {
                    "fromMe": false,
                    "remoteJid": "5511999990000@s.whatsapp.net",
                },
                "message": {
                    "imageMessage": { "url": "https://media.example/photo.jpg" },
                },
            },
        });
        let response = call(state, payload).await;
        assert_eq!(status_of(&response), "tipo_nao_suportado");
        Ok(())
    }

    #[tokio::test]
    async fn test_webhook_treats_empty_conversation_as_unsupported() -> Result<()> {
        let state = test_state().await?;
        let payload = json!({
            "event": "messages.upsert",
            "data": {
                "key": {
                    "fromMe": false,
                    "remoteJid": "5511999990000@s.whatsapp.net",
                },
                "message": { "conversation": "" },
            },
        });
        let response = call(state, payload).await;
        assert_eq!(status_of(&response), "tipo_nao_suportado");
        Ok(())
    }
}
