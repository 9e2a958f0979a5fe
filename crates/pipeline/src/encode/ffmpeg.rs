//! Scoped FFmpeg subprocess wrapper: one instance per synth batch, torn down
//! cleanly (terminate, then kill after a grace period) on every exit path.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use gateway_core::OutputFormat;

const KILL_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    #[error("failed to spawn ffmpeg: {0}")]
    Spawn(std::io::Error),
    #[error("ffmpeg exited with an error: {0}")]
    Process(String),
}

fn codec_args(format: OutputFormat, sample_rate: u32, channels: u16) -> Vec<String> {
    let mut args = vec![
        "-f".into(),
        "f32le".into(),
        "-ar".into(),
        sample_rate.to_string(),
        "-ac".into(),
        channels.to_string(),
        "-i".into(),
        "pipe:0".into(),
        "-loglevel".into(),
        "error".into(),
    ];

    match format {
        OutputFormat::Mp3 => {
            args.extend(["-f".into(), "mp3".into(), "-b:a".into(), "128k".into()]);
        }
        OutputFormat::Ogg => {
            args.extend(["-f".into(), "ogg".into(), "-c:a".into(), "libopus".into(), "-b:a".into(), "32k".into()]);
        }
        OutputFormat::Pcm | OutputFormat::Wav => unreachable!("pcm/wav never reach the ffmpeg encoder"),
    }

    args.push("pipe:1".into());
    args
}

/// Runs one FFmpeg transcode for a single synth batch. PCM fed via `pcm_rx`
/// until it closes (end-of-batch); encoded bytes pushed into `out_tx` as they
/// arrive. If `cancel` fires first, the child is torn down via [`terminate`]
/// instead of being left to exit on its own.
pub async fn run_encoder(
    format: OutputFormat,
    sample_rate: u32,
    channels: u16,
    mut pcm_rx: mpsc::Receiver<Vec<u8>>,
    out_tx: mpsc::Sender<Vec<u8>>,
    cancel: tokio::sync::oneshot::Receiver<()>,
) -> Result<(), EncoderError> {
    let mut child = spawn(format, sample_rate, channels)?;

    let mut stdin = child.stdin.take().expect("piped stdin");
    let mut stdout = child.stdout.take().expect("piped stdout");

    let writer = tokio::spawn(async move {
        while let Some(chunk) = pcm_rx.recv().await {
            if stdin.write_all(&chunk).await.is_err() {
                break;
            }
        }
        let _ = stdin.shutdown().await;
    });

    let reader = tokio::spawn(async move {
        let mut buf = [0u8; 8192];
        loop {
            match stdout.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    if out_tx.send(buf[..n].to_vec()).await.is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let drained = async {
        let _ = writer.await;
        let _ = reader.await;
    };

    tokio::select! {
        _ = drained => {}
        _ = cancel => {
            terminate(child).await;
            return Ok(());
        }
    }

    let status = match child.wait().await {
        Ok(status) => status,
        Err(e) => return Err(EncoderError::Process(e.to_string())),
    };

    if !status.success() {
        let mut stderr_buf = Vec::new();
        if let Some(mut stderr) = child.stderr.take() {
            let _ = stderr.read_to_end(&mut stderr_buf).await;
        }
        return Err(EncoderError::Process(String::from_utf8_lossy(&stderr_buf).trim().to_string()));
    }

    Ok(())
}

fn spawn(format: OutputFormat, sample_rate: u32, channels: u16) -> Result<Child, EncoderError> {
    Command::new("ffmpeg")
        .args(codec_args(format, sample_rate, channels))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(EncoderError::Spawn)
}

/// Terminate `child`, escalating to a kill if it hasn't exited within the
/// grace period. Used when the pipeline is cancelled mid-batch rather than
/// closed cleanly.
pub async fn terminate(mut child: Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: sending SIGTERM to our own child process.
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
    }

    if tokio::time::timeout(KILL_GRACE, child.wait()).await.is_err() {
        let _ = child.kill().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp3_args_include_bitrate() {
        let args = codec_args(OutputFormat::Mp3, 24_000, 1);
        assert!(args.contains(&"128k".to_string()));
        assert!(args.contains(&"mp3".to_string()));
    }

    #[test]
    fn ogg_args_use_libopus() {
        let args = codec_args(OutputFormat::Ogg, 24_000, 1);
        assert!(args.contains(&"libopus".to_string()));
        assert!(args.contains(&"32k".to_string()));
    }
}
