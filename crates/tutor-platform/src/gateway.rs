//! REST adapter for conversation persistence.
//!
//! Uses browser `fetch()` via gloo-net. Every endpoint answers with a JSON
//! envelope `{ "success": bool, "error"?: string, ...payload }`; a
//! `success: false` envelope or a non-2xx status becomes an `Err`.
//! Calls are single-attempt.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use tutor_core::ports::{ConversationGateway, PostedExchange};
use tutor_types::{
    Result, TutorError,
    config::TutorConfig,
    conversation::Conversation,
    message::Message,
};

pub struct HttpConversationGateway {
    base_url: String,
    user_ref: String,
    course_ref: String,
}

impl HttpConversationGateway {
    pub fn new(config: &TutorConfig) -> Self {
        Self {
            base_url: config.api_base_trimmed().to_string(),
            user_ref: config.user_ref.clone(),
            course_ref: config.course_ref.clone(),
        }
    }

    fn conversations_url(&self) -> String {
        format!("{}/conversations", self.base_url)
    }

    fn conversation_url(&self, conversation_id: &str, suffix: &str) -> String {
        let id: String = js_sys::encode_uri_component(conversation_id).into();
        format!("{}/conversations/{}{}", self.base_url, id, suffix)
    }
}

#[async_trait(?Send)]
impl ConversationGateway for HttpConversationGateway {
    async fn create_conversation(&self, course_ref: &str) -> Result<Conversation> {
        let response = Request::post(&self.conversations_url())
            .json(&json!({ "userRef": self.user_ref, "courseRef": course_ref }))
            .map_err(|e| TutorError::Serialization(e.to_string()))?
            .send()
            .await
            .map_err(|e| TutorError::Network(e.to_string()))?;
        wire::decode_conversation(&read_body(response).await?)
    }

    async fn post_message(&self, conversation_id: &str, text: &str) -> Result<PostedExchange> {
        let body = json!({
            "message": text,
            "authorRef": self.user_ref,
            "courseRef": self.course_ref,
        });
        let response = Request::post(&self.conversation_url(conversation_id, "/messages"))
            .json(&body)
            .map_err(|e| TutorError::Serialization(e.to_string()))?
            .send()
            .await
            .map_err(|e| TutorError::Network(e.to_string()))?;
        wire::decode_exchange(&read_body(response).await?)
    }

    async fn set_pin_status(&self, conversation_id: &str, pinned: bool) -> Result<()> {
        let response = Request::patch(&self.conversation_url(conversation_id, "/pin"))
            .json(&json!({ "pinned": pinned }))
            .map_err(|e| TutorError::Serialization(e.to_string()))?
            .send()
            .await
            .map_err(|e| TutorError::Network(e.to_string()))?;
        wire::decode_ack(&read_body(response).await?)
    }

    async fn set_pinned_message(
        &self,
        conversation_id: &str,
        message_id: Option<&str>,
    ) -> Result<()> {
        let response = Request::patch(&self.conversation_url(conversation_id, "/pinned-message"))
            .json(&json!({ "messageId": message_id }))
            .map_err(|e| TutorError::Serialization(e.to_string()))?
            .send()
            .await
            .map_err(|e| TutorError::Network(e.to_string()))?;
        wire::decode_ack(&read_body(response).await?)
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        let response = Request::delete(&self.conversation_url(conversation_id, ""))
            .send()
            .await
            .map_err(|e| TutorError::Network(e.to_string()))?;
        wire::decode_ack(&read_body(response).await?)
    }

    async fn list_conversations(&self, user_ref: &str, course_ref: &str) -> Result<Vec<Conversation>> {
        let response = Request::get(&self.conversations_url())
            .query([("userRef", user_ref), ("courseRef", course_ref)])
            .send()
            .await
            .map_err(|e| TutorError::Network(e.to_string()))?;
        wire::decode_conversations(&read_body(response).await?)
    }
}

/// Read the body, turning a non-2xx status into a network error.
async fn read_body(response: Response) -> Result<String> {
    let status = response.status();
    let ok = response.ok();
    let text = response
        .text()
        .await
        .map_err(|e| TutorError::Network(e.to_string()))?;
    if !ok {
        let detail = wire::envelope_error(&text).unwrap_or_else(|| "request failed".to_string());
        return Err(TutorError::Network(format!("HTTP {}: {}", status, detail)));
    }
    Ok(text)
}

// ─── Wire format ─────────────────────────────────────────────

/// Envelope decoding, kept free of fetch so it can be tested natively.
pub mod wire {
    use super::*;

    #[derive(Deserialize)]
    struct Envelope<T> {
        success: bool,
        #[serde(default)]
        error: Option<String>,
        #[serde(flatten)]
        payload: T,
    }

    #[derive(Deserialize)]
    struct Ack {}

    #[derive(Deserialize)]
    struct ConversationPayload {
        #[serde(default)]
        conversation: Option<Conversation>,
    }

    #[derive(Deserialize)]
    struct ListPayload {
        #[serde(default)]
        conversations: Option<Vec<Conversation>>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ExchangePayload {
        #[serde(default)]
        user_message: Option<Message>,
        #[serde(default)]
        assistant_message: Option<Message>,
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
        let envelope: Envelope<T> = serde_json::from_str(body)?;
        if !envelope.success {
            return Err(TutorError::Server(
                envelope.error.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        Ok(envelope.payload)
    }

    fn missing(field: &str) -> TutorError {
        TutorError::Server(format!("response missing {}", field))
    }

    /// The `error` field of an envelope, if the body is one
    pub fn envelope_error(body: &str) -> Option<String> {
        serde_json::from_str::<Envelope<Ack>>(body).ok()?.error
    }

    pub fn decode_ack(body: &str) -> Result<()> {
        decode::<Ack>(body).map(|_| ())
    }

    pub fn decode_conversation(body: &str) -> Result<Conversation> {
        decode::<ConversationPayload>(body)?
            .conversation
            .ok_or_else(|| missing("conversation"))
    }

    /// A successful listing without a `conversations` field means "none yet".
    pub fn decode_conversations(body: &str) -> Result<Vec<Conversation>> {
        Ok(decode::<ListPayload>(body)?.conversations.unwrap_or_default())
    }

    pub fn decode_exchange(body: &str) -> Result<PostedExchange> {
        let payload = decode::<ExchangePayload>(body)?;
        Ok(PostedExchange {
            user_message: payload.user_message.ok_or_else(|| missing("userMessage"))?,
            assistant_message: payload
                .assistant_message
                .ok_or_else(|| missing("assistantMessage"))?,
        })
    }
}
