//! Client for the upstream TTS service's `ProtoAudioStream` gRPC contract.

use std::time::Duration;

use futures::Stream;
use tonic::transport::Channel;

use crate::error::GrpcError;
use crate::generated::tts::proto_audio_stream_client::ProtoAudioStreamClient;
use crate::generated::tts::{PingRequest, ProtoPost};

const PING_TIMEOUT: Duration = Duration::from_secs(3);

pub struct TtsClient {
    inner: ProtoAudioStreamClient<Channel>,
}

impl TtsClient {
    pub async fn connect(endpoint: &str) -> Result<Self, GrpcError> {
        let channel = Channel::from_shared(endpoint.to_string())
            .map_err(|e| GrpcError::Connect(e.to_string()))?
            .connect()
            .await
            .map_err(|e| GrpcError::Connect(e.to_string()))?;
        Ok(Self { inner: ProtoAudioStreamClient::new(channel) })
    }

    /// Open a synthesis stream for `text`. The returned stream yields raw PCM
    /// chunks as they arrive from the upstream model.
    pub async fn stream_audio(
        &mut self,
        model: &str,
        text: &str,
        voice: &str,
        speed: f32,
    ) -> Result<impl Stream<Item = Result<Vec<u8>, GrpcError>>, GrpcError> {
        let request = ProtoPost {
            model: model.to_string(),
            text: text.to_string(),
            voice: voice.to_string(),
            speed,
        };

        let response = self.inner.stream_audio(request).await?;
        let stream = response.into_inner();

        Ok(async_stream::stream! {
            futures::pin_mut!(stream);
            while let Some(item) = futures::StreamExt::next(&mut stream).await {
                match item {
                    Ok(resp) => yield Ok(resp.data),
                    Err(status) => {
                        yield Err(GrpcError::Call(status));
                        break;
                    }
                }
            }
        })
    }

    /// Health-check ping used by the health worker.
    pub async fn ping(&mut self) -> Result<bool, GrpcError> {
        let result = tokio::time::timeout(PING_TIMEOUT, self.inner.ping(PingRequest {})).await;
        match result {
            Ok(Ok(resp)) => Ok(resp.into_inner().status == "ok"),
            Ok(Err(status)) => Err(GrpcError::Call(status)),
            Err(_) => Err(GrpcError::Timeout),
        }
    }
}
