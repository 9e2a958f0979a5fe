//! TTS guidance injection: ensures a voice-synthesis-friendly system prompt is
//! present whenever the caller asked for audio output.

use crate::chat_types::ChatMessage;

pub const LLM_TTS_PROMPT: &str = "You are a voice assistant generating text for audio synthesis. Write exclusively in plain, spoken English. \n\nStrictly avoid Markdown, bolding, lists, code blocks, URLs, emojis, and special characters. \n\nSpell out numbers, symbols, and abbreviations to ensure correct pronunciation (e.g., write \"twenty percent\" instead of \"20%\"). Use commas and periods to create natural pauses for the speaker.";

/// Insert or extend the system message with TTS guidance when audio output is
/// requested. Leaves the message list untouched when no system prompt would
/// result (no existing system message and no default prompt configured).
pub fn include_system_if_needed(
    mut messages: Vec<ChatMessage>,
    needs_tts: bool,
    default_prompt: Option<&str>,
) -> Vec<ChatMessage> {
    if let Some(pos) = messages.iter().position(ChatMessage::is_system) {
        if needs_tts {
            if let ChatMessage::System { content } = &mut messages[pos] {
                if !content.contains(LLM_TTS_PROMPT) {
                    let prefix = if content.is_empty() { "" } else { "\n\n" };
                    content.push_str(prefix);
                    content.push_str(LLM_TTS_PROMPT);
                }
            }
        }
        return messages;
    }

    let base_content = default_prompt.unwrap_or("");
    let final_content = if needs_tts {
        let separator = if base_content.is_empty() { "" } else { "\n\n" };
        format!("{base_content}{separator}{LLM_TTS_PROMPT}")
    } else {
        base_content.to_string()
    };

    if !final_content.is_empty() {
        messages.insert(0, ChatMessage::System { content: final_content });
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(content: &str) -> ChatMessage {
        ChatMessage::User { content: content.to_string() }
    }

    #[test]
    fn inserts_new_system_message_when_none_present() {
        let messages = include_system_if_needed(vec![user("hi")], true, Some("Be nice."));
        assert!(messages[0].is_system());
        assert!(messages[0].content().contains(LLM_TTS_PROMPT));
        assert!(messages[0].content().contains("Be nice."));
    }

    #[test]
    fn leaves_messages_untouched_without_tts_or_default_prompt() {
        let messages = include_system_if_needed(vec![user("hi")], false, None);
        assert_eq!(messages.len(), 1);
        assert!(!messages[0].is_system());
    }

    #[test]
    fn appends_guidance_to_existing_system_message_once() {
        let messages = vec![ChatMessage::System { content: "Be terse.".to_string() }, user("hi")];
        let once = include_system_if_needed(messages, true, None);
        let twice = include_system_if_needed(once.clone(), true, None);
        assert_eq!(once[0].content(), twice[0].content());
    }
}
