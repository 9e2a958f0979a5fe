//! Encode pipeline: consumes the Chat-Synth `StreamItem` sequence and
//! produces `EncodedItem`s, preserving the `Text`/`Audio` interleaving order
//! across codec batch restarts.

use futures::Stream;
use gateway_core::{EncodedItem, OutputFormat, StreamItem};
use tokio::sync::mpsc;

use super::ffmpeg;
use super::wav;

const RESULT_QUEUE_CAPACITY: usize = 64;
const PCM_QUEUE_CAPACITY: usize = 64;

pub fn encode_pipeline(
    input: impl Stream<Item = StreamItem> + Send + 'static,
    format: OutputFormat,
    sample_rate: u32,
    channels: u16,
) -> impl Stream<Item = EncodedItem> {
    let (result_tx, result_rx) = mpsc::channel::<EncodedItem>(RESULT_QUEUE_CAPACITY);

    let processor = tokio::spawn(async move {
        futures::pin_mut!(input);

        if format.is_shortcut() {
            run_shortcut(input, format, sample_rate, channels, result_tx).await;
        } else {
            run_transcode(input, format, sample_rate, channels, result_tx).await;
        }
    });

    async_stream::stream! {
        let _guard = AbortOnDrop(processor);
        let mut result_rx = result_rx;
        while let Some(item) = result_rx.recv().await {
            yield item;
        }
    }
}

struct AbortOnDrop(tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn run_shortcut(
    mut input: std::pin::Pin<&mut (impl Stream<Item = StreamItem> + ?Sized)>,
    format: OutputFormat,
    sample_rate: u32,
    channels: u16,
    result_tx: mpsc::Sender<EncodedItem>,
) {
    let mut header_sent = false;

    while let Some(item) = futures::StreamExt::next(&mut input).await {
        let encoded = match item {
            StreamItem::Text(t) => EncodedItem::Text(t),
            StreamItem::Audio(pcm) => {
                if format == OutputFormat::Wav && !header_sent {
                    header_sent = true;
                    let header = wav::streaming_header(sample_rate, channels);
                    if result_tx.send(EncodedItem::Encoded(header.to_vec().into())).await.is_err() {
                        return;
                    }
                }
                EncodedItem::Encoded(pcm)
            }
        };

        if result_tx.send(encoded).await.is_err() {
            return;
        }
    }
}

async fn run_transcode(
    mut input: std::pin::Pin<&mut (impl Stream<Item = StreamItem> + ?Sized)>,
    format: OutputFormat,
    sample_rate: u32,
    channels: u16,
    result_tx: mpsc::Sender<EncodedItem>,
) {
    let mut current: Option<Batch> = None;

    while let Some(item) = futures::StreamExt::next(&mut input).await {
        match item {
            StreamItem::Text(t) => {
                if let Some(batch) = current.take() {
                    batch.finish().await;
                }
                if result_tx.send(EncodedItem::Text(t)).await.is_err() {
                    return;
                }
            }
            StreamItem::Audio(pcm) => {
                if current.is_none() {
                    current = Some(spawn_encoder(format, sample_rate, channels, result_tx.clone()));
                }
                let batch = current.as_mut().expect("just inserted");
                batch.had_audio = true;
                if batch.pcm_tx.send(pcm.to_vec()).await.is_err() {
                    tracing::warn!("encoder pcm channel closed early, dropping batch's remaining audio");
                    current = None;
                }
            }
        }
    }

    if let Some(batch) = current.take() {
        batch.finish().await;
    }
}

struct Batch {
    pcm_tx: mpsc::Sender<Vec<u8>>,
    handle: tokio::task::JoinHandle<()>,
    cancel_tx: tokio::sync::oneshot::Sender<()>,
    had_audio: bool,
}

impl Batch {
    /// Closes the PCM feed and lets the encoder drain to EOF if it ever
    /// received audio; otherwise cancels it so the ffmpeg child is
    /// terminated rather than left to idle out on an empty input.
    async fn finish(self) {
        drop(self.pcm_tx);
        if self.had_audio {
            let _ = self.handle.await;
        } else {
            let _ = self.cancel_tx.send(());
            let _ = self.handle.await;
        }
    }
}

fn spawn_encoder(format: OutputFormat, sample_rate: u32, channels: u16, result_tx: mpsc::Sender<EncodedItem>) -> Batch {
    let (pcm_tx, pcm_rx) = mpsc::channel::<Vec<u8>>(PCM_QUEUE_CAPACITY);
    let (enc_tx, mut enc_rx) = mpsc::channel::<Vec<u8>>(PCM_QUEUE_CAPACITY);
    let (cancel_tx, cancel_rx) = tokio::sync::oneshot::channel();

    let forwarder = tokio::spawn(async move {
        while let Some(bytes) = enc_rx.recv().await {
            if result_tx.send(EncodedItem::Encoded(bytes.into())).await.is_err() {
                break;
            }
        }
    });

    let handle = tokio::spawn(async move {
        if let Err(e) = ffmpeg::run_encoder(format, sample_rate, channels, pcm_rx, enc_tx, cancel_rx).await {
            tracing::warn!(error = %e, "encoder runner failed for this batch, audio dropped");
        }
        let _ = forwarder.await;
    });

    Batch { pcm_tx, handle, cancel_tx, had_audio: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn pcm_shortcut_is_identity_passthrough() {
        let items = vec![StreamItem::text("hi"), StreamItem::audio(vec![1u8, 2, 3])];
        let input = tokio_stream::iter(items);
        let output: Vec<_> = encode_pipeline(input, OutputFormat::Pcm, 24_000, 1).collect().await;

        assert_eq!(output.len(), 2);
        assert!(matches!(&output[0], EncodedItem::Text(t) if &**t == "hi"));
        assert!(matches!(&output[1], EncodedItem::Encoded(b) if **b == [1, 2, 3]));
    }

    #[tokio::test]
    async fn wav_shortcut_prepends_header_once() {
        let items =
            vec![StreamItem::text("a"), StreamItem::audio(vec![0u8; 4]), StreamItem::audio(vec![1u8; 4])];
        let input = tokio_stream::iter(items);
        let output: Vec<_> = encode_pipeline(input, OutputFormat::Wav, 24_000, 1).collect().await;

        // Text, then a 44-byte header, then two 4-byte PCM chunks.
        assert_eq!(output.len(), 4);
        assert!(matches!(&output[1], EncodedItem::Encoded(b) if b.len() == 44));
    }
}
