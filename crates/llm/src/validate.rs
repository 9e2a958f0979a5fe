use gateway_core::GatewayError;

use crate::chat_types::ChatMessage;

/// At most one system message is allowed per request.
pub fn validate_messages(messages: &[ChatMessage]) -> Result<(), GatewayError> {
    let system_count = messages.iter().filter(|m| m.is_system()).count();
    if system_count > 1 {
        return Err(GatewayError::Validation(format!(
            "Only one system role is allowed in messages, got {system_count}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_multiple_system_messages() {
        let messages = vec![
            ChatMessage::System { content: "a".to_string() },
            ChatMessage::System { content: "b".to_string() },
        ];
        assert!(validate_messages(&messages).is_err());
    }

    #[test]
    fn accepts_single_system_message() {
        let messages = vec![
            ChatMessage::System { content: "a".to_string() },
            ChatMessage::User { content: "hi".to_string() },
        ];
        assert!(validate_messages(&messages).is_ok());
    }
}
