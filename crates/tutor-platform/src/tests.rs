#[cfg(test)]
mod tests {
    use crate::gateway::wire;
    use crate::page_config::parse_page_config;
    use tutor_types::config::{ChatMode, TutorConfig};
    use tutor_types::message::Role;
    use tutor_types::TutorError;

    // ─── Wire Decoding Tests ─────────────────────────────────

    #[test]
    fn decode_listing_with_legacy_ids() {
        let body = r#"{
            "success": true,
            "conversations": [
                {
                    "_id": "c1",
                    "title": "Recursion",
                    "pinned": true,
                    "pinnedMessageId": "m2",
                    "messages": [
                        { "_id": "m1", "role": "user", "authorRef": "u1", "content": "what is recursion?" },
                        { "_id": "m2", "role": "assistant", "content": "A function calling itself.", "timestamp": 1700000000000 }
                    ]
                },
                { "id": "c2" }
            ]
        }"#;
        let conversations = wire::decode_conversations(body).unwrap();
        assert_eq!(conversations.len(), 2);

        let first = &conversations[0];
        assert_eq!(first.id, "c1");
        assert!(first.pinned);
        assert_eq!(first.pinned_message_id.as_deref(), Some("m2"));
        assert_eq!(first.messages[0].role, Role::User);
        assert_eq!(first.messages[0].text, "what is recursion?");
        assert_eq!(first.messages[1].created_at_epoch_ms, 1_700_000_000_000);

        let second = &conversations[1];
        assert_eq!(second.id, "c2");
        assert!(!second.pinned);
        assert!(second.messages.is_empty());
    }

    #[test]
    fn decode_listing_without_field_is_empty() {
        let conversations = wire::decode_conversations(r#"{"success": true}"#).unwrap();
        assert!(conversations.is_empty());
    }

    #[test]
    fn decode_failure_envelope_carries_server_error() {
        let err = wire::decode_conversations(r#"{"success": false, "error": "course not found"}"#)
            .unwrap_err();
        assert_eq!(err, TutorError::Server("course not found".to_string()));

        let err = wire::decode_ack(r#"{"success": false}"#).unwrap_err();
        assert_eq!(err, TutorError::Server("request failed".to_string()));
    }

    #[test]
    fn decode_malformed_body_is_serialization_error() {
        assert!(matches!(
            wire::decode_ack("<html>502</html>"),
            Err(TutorError::Serialization(_))
        ));
        // Envelope without a success flag is not an envelope
        assert!(matches!(
            wire::decode_ack(r#"{"ok": true}"#),
            Err(TutorError::Serialization(_))
        ));
    }

    #[test]
    fn decode_ack_ignores_extra_fields() {
        assert!(wire::decode_ack(r#"{"success": true, "pinned": true}"#).is_ok());
    }

    #[test]
    fn decode_exchange_pair() {
        let body = r#"{
            "success": true,
            "userMessage": { "id": "m10", "role": "user", "authorRef": "u1", "text": "hello" },
            "assistantMessage": { "id": "m11", "role": "assistant", "text": "Hi! <mermaid>graph TD; A-->B</mermaid>" }
        }"#;
        let exchange = wire::decode_exchange(body).unwrap();
        assert_eq!(exchange.user_message.id, "m10");
        assert_eq!(exchange.user_message.author_ref, "u1");
        assert_eq!(exchange.assistant_message.role, Role::Assistant);
        assert!(exchange.assistant_message.text.contains("<mermaid>"));
    }

    #[test]
    fn decode_exchange_missing_half_is_server_error() {
        let body = r#"{ "success": true, "userMessage": { "id": "m10", "role": "user", "text": "x" } }"#;
        assert_eq!(
            wire::decode_exchange(body).unwrap_err(),
            TutorError::Server("response missing assistantMessage".to_string())
        );
    }

    #[test]
    fn decode_created_conversation() {
        let body = r#"{ "success": true, "conversation": { "_id": "c9", "title": "New Conversation" } }"#;
        let conversation = wire::decode_conversation(body).unwrap();
        assert_eq!(conversation.id, "c9");
        assert_eq!(conversation.title, "New Conversation");
        assert!(conversation.pinned_message_id.is_none());

        assert_eq!(
            wire::decode_conversation(r#"{"success": true}"#).unwrap_err(),
            TutorError::Server("response missing conversation".to_string())
        );
    }

    #[test]
    fn envelope_error_only_for_envelopes() {
        assert_eq!(
            wire::envelope_error(r#"{"success": false, "error": "forbidden"}"#),
            Some("forbidden".to_string())
        );
        assert_eq!(wire::envelope_error("Bad Gateway"), None);
        assert_eq!(wire::envelope_error(r#"{"success": false}"#), None);
    }

    // ─── Page Config Tests ───────────────────────────────────

    #[test]
    fn page_config_partial_overlay() {
        let config = parse_page_config(
            r#"{ "userRef": "u42", "courseRef": "CPSC110", "mode": "instructor", "anchors": { "input": "msg-box" } }"#,
        );
        assert_eq!(config.user_ref, "u42");
        assert_eq!(config.course_ref, "CPSC110");
        assert_eq!(config.mode, ChatMode::Instructor);
        assert_eq!(config.anchors.input, "msg-box");
        // Untouched fields keep their defaults
        assert_eq!(config.anchors.messages, "chat-messages");
        assert_eq!(config.api_base, "/api");
    }

    #[test]
    fn page_config_blank_or_malformed_falls_back() {
        assert_eq!(parse_page_config(""), TutorConfig::default());
        assert_eq!(parse_page_config("  \n"), TutorConfig::default());
        assert_eq!(parse_page_config("{not json"), TutorConfig::default());
    }

    #[test]
    fn page_config_rejects_bad_delimiters() {
        let config = parse_page_config(
            r#"{ "userRef": "u1", "artefact": { "open": "@@", "close": "@@" } }"#,
        );
        // The whole block is discarded, not just the artefact section
        assert_eq!(config, TutorConfig::default());
    }
}
