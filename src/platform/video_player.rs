use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::VideoConfig;
use crate::error::{Error, Result};

/// Plays a video to completion.
pub trait VideoPlayer {
    /// Resolves once playback has finished. Dropping the future must stop
    /// playback.
    fn play(&mut self, path: &Path) -> impl Future<Output = Result<()>>;
}

/// Runs an external player process per video, e.g. `omxplayer -o hdmi <file>`.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    cleanup: Option<Vec<String>>,
}

impl CommandPlayer {
    pub fn new(command: &[String], cleanup: Option<&[String]>) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::Config("video player command is empty".to_string()))?;
        ensure_not_blank(program, "video player program")?;
        if let Some(cmd) = cleanup {
            let first = cmd
                .first()
                .ok_or_else(|| Error::Config("cleanup command is empty".to_string()))?;
            ensure_not_blank(first, "cleanup program")?;
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            cleanup: cleanup.map(<[String]>::to_vec),
        })
    }

    pub fn from_config(cfg: &VideoConfig) -> Result<Self> {
        Self::new(&cfg.player, cfg.cleanup.as_deref())
    }

    async fn run_player(&self, path: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|err| {
                Error::ExternalProcess(format!("failed to spawn {}: {err}", self.program))
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::ExternalProcess(format!(
                "{} exited with status {} for {}",
                self.program,
                status.code().unwrap_or(-1),
                path.display()
            )))
        }
    }

    /// Best-effort removal of player processes left behind by the last run.
    async fn run_cleanup(&self) {
        let Some((program, args)) = self.cleanup.as_deref().and_then(|c| c.split_first()) else {
            return;
        };
        match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
        {
            // killall reports failure when nothing was left to kill
            Ok(status) => debug!(program, code = status.code(), "player cleanup finished"),
            Err(err) => warn!(program, "player cleanup failed to start: {err}"),
        }
    }
}

impl VideoPlayer for CommandPlayer {
    async fn play(&mut self, path: &Path) -> Result<()> {
        info!(path = %path.display(), program = %self.program, "starting video");
        let result = self.run_player(path).await;
        self.run_cleanup().await;
        result
    }
}

fn ensure_not_blank(value: &str, label: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::Config(format!("{label} must not be blank")))
    } else {
        Ok(())
    }
}
