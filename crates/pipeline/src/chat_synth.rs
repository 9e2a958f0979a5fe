//! Couples an upstream LLM token stream to a TTS byte stream, producing an
//! interleaved `Text`/`Audio` sequence: one batch of audio per text marker.

use std::time::Duration;

use futures::Stream;
use gateway_core::StreamItem;
use gateway_grpc::TtsClient;
use gateway_llm::{ChatCompletionsResponseStreaming, LlmError};
use tokio::sync::mpsc;

use crate::sentence_batcher::SentenceBatcher;
use crate::sentence_collector::SentenceCollector;

const LLM_CHUNK_TIMEOUT: Duration = Duration::from_secs(30);
const TTS_CHUNK_TIMEOUT: Duration = Duration::from_secs(10);
const SENTENCE_QUEUE_CAPACITY: usize = 256;

pub struct ChatSynthConfig {
    pub tts_model: String,
    pub voice: String,
    pub speed: f32,
    pub tts_context_size: usize,
}

enum QueueItem {
    Sentence(String),
    Sentinel,
}

/// Aborts the spawned producer task if the consumer stream is dropped before
/// the sentinel is observed.
struct AbortOnDrop(tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub fn chat_synth(
    llm_stream: impl Stream<Item = Result<ChatCompletionsResponseStreaming, LlmError>> + Send + 'static,
    mut tts: TtsClient,
    config: ChatSynthConfig,
) -> impl Stream<Item = StreamItem> {
    let (tx, mut rx) = mpsc::channel::<QueueItem>(SENTENCE_QUEUE_CAPACITY);

    let producer = tokio::spawn(async move {
        futures::pin_mut!(llm_stream);
        let mut collector = SentenceCollector::default();

        loop {
            let next = tokio::time::timeout(LLM_CHUNK_TIMEOUT, futures::StreamExt::next(&mut llm_stream)).await;
            match next {
                Ok(Some(Ok(chunk))) => {
                    let Some(choice) = chunk.choices.first() else { continue };
                    let Some(content) = choice.delta.content.as_deref() else { continue };
                    for sentence in collector.put(content) {
                        if tx.send(QueueItem::Sentence(sentence)).await.is_err() {
                            return;
                        }
                    }
                }
                Ok(Some(Err(e))) => {
                    tracing::warn!(error = %e, "LLM stream producer error, ending stream");
                    break;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!("LLM chunk read timed out, ending stream");
                    break;
                }
            }
        }

        for sentence in collector.flush() {
            if tx.send(QueueItem::Sentence(sentence)).await.is_err() {
                return;
            }
        }
        let _ = tx.send(QueueItem::Sentinel).await;
    });
    let _guard = AbortOnDrop(producer);

    async_stream::stream! {
        let _guard = _guard;
        let mut batcher = SentenceBatcher::new(config.tts_context_size);
        let mut stop = false;

        while !stop {
            let item = match rx.recv().await {
                Some(item) => item,
                None => QueueItem::Sentinel,
            };

            match item {
                QueueItem::Sentinel => stop = true,
                QueueItem::Sentence(sentence) => {
                    if let Some(batch) = batcher.push(sentence) {
                        for item in synthesize_batch(&mut tts, &config, batch).await {
                            yield item;
                        }
                    }

                    // Greedily drain whatever is already queued without blocking.
                    loop {
                        match rx.try_recv() {
                            Ok(QueueItem::Sentence(s2)) => {
                                if let Some(batch) = batcher.push(s2) {
                                    for item in synthesize_batch(&mut tts, &config, batch).await {
                                        yield item;
                                    }
                                }
                            }
                            Ok(QueueItem::Sentinel) => {
                                stop = true;
                                break;
                            }
                            Err(_) => break,
                        }
                    }
                }
            }
        }

        if let Some(batch) = batcher.finish() {
            for item in synthesize_batch(&mut tts, &config, batch).await {
                yield item;
            }
        }
    }
}

/// Yield `Text(batch)` followed by every PCM chunk the TTS model produces for
/// it. Per-chunk audio errors are tolerated: the batch's audio is dropped but
/// the pipeline continues.
async fn synthesize_batch(tts: &mut TtsClient, config: &ChatSynthConfig, batch: String) -> Vec<StreamItem> {
    let mut items = vec![StreamItem::text(batch.clone())];

    let stream = match tts.stream_audio(&config.tts_model, &batch, &config.voice, config.speed).await {
        Ok(stream) => stream,
        Err(e) => {
            let preview: String = batch.chars().take(30).collect();
            tracing::warn!(error = %e, "failed to open TTS stream for batch '{preview}...'");
            return items;
        }
    };

    futures::pin_mut!(stream);
    loop {
        match tokio::time::timeout(TTS_CHUNK_TIMEOUT, futures::StreamExt::next(&mut stream)).await {
            Ok(Some(Ok(pcm))) => items.push(StreamItem::audio(pcm)),
            Ok(Some(Err(e))) => {
                tracing::warn!(error = %e, "error streaming audio for batch, skipping remainder");
                break;
            }
            Ok(None) => break,
            Err(_) => {
                tracing::warn!("TTS chunk read timed out, skipping remainder of batch");
                break;
            }
        }
    }

    items
}
