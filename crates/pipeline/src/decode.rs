//! One-shot container-to-PCM decode for bounded-size uploads (the
//! `audio/transcriptions` upload, as opposed to the streaming encoders in
//! `encode::ffmpeg`), and a persistent streaming variant for continuous mic
//! input. The one-shot path is a single write-then-read-to-completion pass
//! since the whole file is already in memory.

use std::process::Stdio;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::encode::ffmpeg::EncoderError;

/// Decode an arbitrary container (webm, mp3, wav, ...) into raw 32-bit float
/// PCM at `sample_rate`/`channels`, letting FFmpeg sniff the input format.
pub async fn decode_to_pcm(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<Vec<u8>, EncoderError> {
    let mut child = Command::new("ffmpeg")
        .args([
            "-i", "pipe:0",
            "-f", "f32le",
            "-ar", &sample_rate.to_string(),
            "-ac", &channels.to_string(),
            "-loglevel", "error",
            "pipe:1",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(EncoderError::Spawn)?;

    let mut stdin = child.stdin.take().expect("piped stdin");
    let input = bytes.to_vec();
    let writer = tokio::spawn(async move {
        let _ = stdin.write_all(&input).await;
        let _ = stdin.shutdown().await;
    });

    let mut stdout = child.stdout.take().expect("piped stdout");
    let mut pcm = Vec::new();
    let reader = stdout.read_to_end(&mut pcm);

    let (_, read_result) = tokio::join!(writer, reader);
    read_result.map_err(|e| EncoderError::Process(e.to_string()))?;

    let status = child.wait().await.map_err(|e| EncoderError::Process(e.to_string()))?;
    if !status.success() {
        let mut stderr_buf = Vec::new();
        if let Some(mut stderr) = child.stderr.take() {
            let _ = stderr.read_to_end(&mut stderr_buf).await;
        }
        return Err(EncoderError::Process(String::from_utf8_lossy(&stderr_buf).trim().to_string()));
    }

    Ok(pcm)
}

/// Persistent decoder for the Realtime Voice Loop's microphone input: feeds
/// container chunks in as they arrive over the WebSocket and streams decoded
/// PCM out, for the life of one session. FFmpeg sniffs the container from the
/// first bytes written to stdin.
pub async fn run_decoder(
    sample_rate: u32,
    channels: u16,
    mut input_rx: mpsc::Receiver<Vec<u8>>,
    output_tx: mpsc::Sender<Vec<u8>>,
) -> Result<(), EncoderError> {
    let mut child = Command::new("ffmpeg")
        .args([
            "-i", "pipe:0",
            "-f", "f32le",
            "-ar", &sample_rate.to_string(),
            "-ac", &channels.to_string(),
            "-loglevel", "error",
            "pipe:1",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(EncoderError::Spawn)?;

    let mut stdin = child.stdin.take().expect("piped stdin");
    let writer = tokio::spawn(async move {
        while let Some(chunk) = input_rx.recv().await {
            if stdin.write_all(&chunk).await.is_err() {
                break;
            }
        }
        let _ = stdin.shutdown().await;
    });

    let mut stdout = child.stdout.take().expect("piped stdout");
    let reader = tokio::spawn(async move {
        let mut buf = [0u8; 8192];
        loop {
            match stdout.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    if output_tx.send(buf[..n].to_vec()).await.is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let _ = writer.await;
    let _ = reader.await;

    let status = child.wait().await.map_err(|e| EncoderError::Process(e.to_string()))?;
    if !status.success() {
        let mut stderr_buf = Vec::new();
        if let Some(mut stderr) = child.stderr.take() {
            let _ = stderr.read_to_end(&mut stderr_buf).await;
        }
        return Err(EncoderError::Process(String::from_utf8_lossy(&stderr_buf).trim().to_string()));
    }

    Ok(())
}
