//! Client for the upstream STT service's `ProtoTranscribe` bidi-streaming contract.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::Channel;

use crate::error::GrpcError;
use crate::generated::stt::proto_transcribe_client::ProtoTranscribeClient;
use crate::generated::stt::transcribe_post::Payload;
use crate::generated::stt::transcribe_resp::Event;
use crate::generated::stt::{TranscribeConfig, TranscribePost};

/// One event decoded from the upstream transcription stream.
#[derive(Debug, Clone)]
pub enum SttEvent {
    SpeechStart { timestamp: f64 },
    SpeechStop { timestamp: f64 },
    Transcription { text: String, timestamp: f64 },
}

/// The outbound half of a session: push PCM frames in via `send_audio`.
/// Dropping it closes the gRPC request stream, letting the upstream service
/// flush its final transcription.
pub struct SttSender {
    outbound: mpsc::Sender<TranscribePost>,
}

impl SttSender {
    pub async fn send_audio(&self, pcm: Vec<u8>) -> Result<(), GrpcError> {
        self.outbound
            .send(TranscribePost { payload: Some(Payload::Audio(pcm)) })
            .await
            .map_err(|_| GrpcError::Connect("stt outbound channel closed".to_string()))
    }
}

/// A live bidi session: push PCM frames in via `send_audio`, receive decoded
/// events out of `events`.
pub struct SttSession {
    outbound: mpsc::Sender<TranscribePost>,
    pub events: mpsc::Receiver<Result<SttEvent, GrpcError>>,
}

impl SttSession {
    pub async fn send_audio(&self, pcm: Vec<u8>) -> Result<(), GrpcError> {
        self.outbound
            .send(TranscribePost { payload: Some(Payload::Audio(pcm)) })
            .await
            .map_err(|_| GrpcError::Connect("stt outbound channel closed".to_string()))
    }

    /// Split into an independently-droppable sender and the event receiver,
    /// so the caller can close the outbound half (by dropping `SttSender`)
    /// while still draining `events` for the upstream's final transcription.
    pub fn split(self) -> (SttSender, mpsc::Receiver<Result<SttEvent, GrpcError>>) {
        (SttSender { outbound: self.outbound }, self.events)
    }
}

pub struct SttClient {
    inner: ProtoTranscribeClient<Channel>,
}

impl SttClient {
    pub async fn connect(endpoint: &str) -> Result<Self, GrpcError> {
        let channel = Channel::from_shared(endpoint.to_string())
            .map_err(|e| GrpcError::Connect(e.to_string()))?
            .connect()
            .await
            .map_err(|e| GrpcError::Connect(e.to_string()))?;
        Ok(Self { inner: ProtoTranscribeClient::new(channel) })
    }

    /// Open a transcription session for `model`. The config frame is sent
    /// first, matching the upstream's expectation that the first message on
    /// the stream carries the model selection.
    pub async fn transcribe(&mut self, model: &str) -> Result<SttSession, GrpcError> {
        let (outbound_tx, outbound_rx) = mpsc::channel::<TranscribePost>(32);
        outbound_tx
            .send(TranscribePost { payload: Some(Payload::Config(TranscribeConfig { model: model.to_string() })) })
            .await
            .map_err(|_| GrpcError::Connect("stt outbound channel closed immediately".to_string()))?;

        let request = ReceiverStream::new(outbound_rx);
        let response = self.inner.transcribe(request).await?;
        let mut inbound = response.into_inner();

        let (events_tx, events_rx) = mpsc::channel(32);
        tokio::spawn(async move {
            loop {
                match inbound.message().await {
                    Ok(Some(resp)) => {
                        let event = match resp.event {
                            Some(Event::SpeechStart(e)) => SttEvent::SpeechStart { timestamp: e.timestamp },
                            Some(Event::SpeechStop(e)) => SttEvent::SpeechStop { timestamp: e.timestamp },
                            Some(Event::SpeechTranscription(e)) => {
                                SttEvent::Transcription { text: e.text, timestamp: e.timestamp }
                            }
                            None => continue,
                        };
                        if events_tx.send(Ok(event)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(status) => {
                        let _ = events_tx.send(Err(GrpcError::Call(status))).await;
                        break;
                    }
                }
            }
        });

        Ok(SttSession { outbound: outbound_tx, events: events_rx })
    }
}
