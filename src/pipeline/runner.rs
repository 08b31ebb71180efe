use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

/// Runs an external media tool against an input file, producing one derived
/// output file in `output_dir`.
///
/// The returned path is where the tool is expected to have written its
/// output. Callers verify existence: a clean exit does not guarantee the
/// tool used the expected naming convention.
#[async_trait::async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, input: &Path, output_dir: &Path) -> Result<PathBuf>;
}

fn file_stem(input: &Path) -> Result<&str> {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Input path has no usable file stem: {}", input.display()))
}

async fn run_command(mut command: Command, timeout: Duration) -> Result<()> {
    command.stdout(Stdio::null()).stderr(Stdio::piped());

    debug!("Running external tool: {:?}", command);

    let mut child = command.spawn().context("Failed to spawn external tool")?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .context("Failed to open tool stderr")?;

    // Drain stderr concurrently so a chatty tool can't fill the pipe and
    // stall before exiting.
    let stderr_task = tokio::spawn(async move {
        let mut buf = String::new();
        let _ = stderr_pipe.read_to_string(&mut buf).await;
        buf
    });

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => status.context("Failed to wait for external tool")?,
        Err(_) => {
            child.kill().await.ok();
            anyhow::bail!("External tool timed out after {:?}", timeout);
        }
    };

    if !status.success() {
        let stderr_output = stderr_task.await.unwrap_or_default();
        anyhow::bail!(
            "External tool exited with {}: {}",
            status,
            stderr_output.trim()
        );
    }

    Ok(())
}

/// Extracts the audio track from a recording container into an mp3 file
/// named after the input.
pub struct FfmpegRunner {
    binary: PathBuf,
    timeout: Duration,
}

impl FfmpegRunner {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl ToolRunner for FfmpegRunner {
    async fn run(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let output = output_dir.join(format!("{}.mp3", file_stem(input)?));

        let mut command = Command::new(&self.binary);
        command
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-vn", "-acodec", "libmp3lame"])
            .arg(&output);

        run_command(command, self.timeout).await?;

        Ok(output)
    }
}

/// Runs a whisper-style speech-to-text CLI, producing `<input stem>.txt` in
/// the output directory.
pub struct WhisperRunner {
    binary: PathBuf,
    model: String,
    language: String,
    timeout: Duration,
}

impl WhisperRunner {
    pub fn new(
        binary: impl Into<PathBuf>,
        model: &str,
        language: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            binary: binary.into(),
            model: model.to_string(),
            language: language.to_string(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl ToolRunner for WhisperRunner {
    async fn run(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let output = output_dir.join(format!("{}.txt", file_stem(input)?));

        let mut command = Command::new(&self.binary);
        command
            .arg(input)
            .args(["--model", &self.model])
            .arg("--output_dir")
            .arg(output_dir)
            .args(["--language", &self.language])
            .args(["--output_format", "txt"])
            .args(["--fp16", "False"]);

        run_command(command, self.timeout).await?;

        Ok(output)
    }
}
