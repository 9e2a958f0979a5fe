//! Message-history limiting: trims the oldest non-system messages until the
//! transcript fits the model's context budget.

use crate::chat_types::ChatMessage;

/// Rough token estimate: one token per four characters.
pub fn count_tokens(content: &str) -> usize {
    content.chars().count() / 4
}

/// Keep every system message unconditionally; walk the rest from newest to
/// oldest, accumulating an estimated token count, and stop before the total
/// would exceed `0.95 * context_size`. Idempotent: re-running on an
/// already-limited list is a no-op.
pub fn limit_messages(messages: Vec<ChatMessage>, context_size: usize) -> Vec<ChatMessage> {
    let budget = (context_size as f64 * 0.95) as usize;

    let system_tokens: usize =
        messages.iter().filter(|m| m.is_system()).map(|m| count_tokens(m.content())).sum();

    let mut kept = Vec::with_capacity(messages.len());
    let mut tok_count = system_tokens;
    let mut budget_exhausted = false;

    for message in messages.into_iter().rev() {
        if message.is_system() {
            kept.push(message);
            continue;
        }

        if budget_exhausted {
            continue;
        }

        let m_tokens = count_tokens(message.content());
        if tok_count + m_tokens > budget {
            budget_exhausted = true;
            continue;
        }
        tok_count += m_tokens;
        kept.push(message);
    }

    kept.reverse();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(content: &str) -> ChatMessage {
        ChatMessage::User { content: content.to_string() }
    }

    fn system(content: &str) -> ChatMessage {
        ChatMessage::System { content: content.to_string() }
    }

    #[test]
    fn keeps_system_messages_unconditionally() {
        let messages = vec![system("you are helpful"), user(&"x".repeat(10_000))];
        let limited = limit_messages(messages, 16);
        assert!(limited[0].is_system());
    }

    #[test]
    fn drops_oldest_non_system_messages_over_budget() {
        let messages = vec![user("oldest message here"), user("middle"), user("newest one")];
        let limited = limit_messages(messages, 4);
        assert!(limited.len() < 3);
        assert_eq!(limited.last().unwrap().content(), "newest one");
    }

    #[test]
    fn is_idempotent() {
        let messages = vec![system("sys"), user("a"), user("b"), user("c")];
        let once = limit_messages(messages, 64);
        let twice = limit_messages(once.clone(), 64);
        assert_eq!(once.len(), twice.len());
    }
}
