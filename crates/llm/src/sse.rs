//! SSE consumption of the upstream LLM's chat-completions stream, parsing
//! `data:` lines into streaming chat-completion chunks.

use futures::Stream;

use crate::chat_types::{ChatCompletionsResponseStreaming, ChatPost};
use crate::error::LlmError;

/// POST `post` (which must have `stream: true`) to `url` and yield each
/// decoded `data: {json}` frame. Stops at `data: [DONE]` or end of body.
pub fn stream_chat(
    client: reqwest::Client,
    url: String,
    post: ChatPost,
) -> impl Stream<Item = Result<ChatCompletionsResponseStreaming, LlmError>> {
    async_stream::stream! {
        let response = match client.post(&url).json(&post).send().await {
            Ok(r) => r,
            Err(e) => {
                yield Err(LlmError::Network(e));
                return;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            yield Err(LlmError::Api { status: status.as_u16(), message: body });
            return;
        }

        use futures::StreamExt;
        let mut bytes_stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk) = bytes_stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    yield Err(LlmError::Network(e));
                    return;
                }
            };
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].trim().to_string();
                buffer.drain(..=line_end);

                if line.is_empty() || line == "data: [DONE]" {
                    continue;
                }

                let Some(json_str) = line.strip_prefix("data: ") else { continue };
                match serde_json::from_str::<ChatCompletionsResponseStreaming>(json_str) {
                    Ok(parsed) => yield Ok(parsed),
                    Err(e) => yield Err(LlmError::InvalidResponse(e.to_string())),
                }
            }
        }
    }
}
