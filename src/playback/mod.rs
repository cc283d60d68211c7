//! 播放分发模块：按操作系统与文件扩展名选择播放方式，失败只记录日志。
//!
//! Playback dispatcher.
//!
//! Given a finished audio file and the host OS, pick a playback strategy and
//! run it. Playback is a convenience: [`Player::play`] never fails, any error
//! is logged and swallowed.
//!
//! | OS | extension | strategy |
//! |----|-----------|----------|
//! | macOS | any | `afplay`, blocking |
//! | Windows | `.wav` | `Media.SoundPlayer.PlaySync()`, blocking |
//! | Windows | other | `start` with the associated app, detached |
//! | Linux | any | `aplay`, blocking (compressed formats may not play) |
//! | other | any | nothing |

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Host operating system family, as far as playback cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsKind {
    MacOs,
    Windows,
    Linux,
    Other(String),
}

impl OsKind {
    pub fn current() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Accepts both `std::env::consts::OS` values and `uname`-style names.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "macos" | "darwin" => Self::MacOs,
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            other => Self::Other(other.to_string()),
        }
    }
}

/// How a file gets played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackStrategy {
    /// Dedicated command-line player, waits for it to finish.
    SyncDedicatedPlayer { program: &'static str },
    /// The OS's built-in sound player, waits for it to finish.
    SyncSystemPlayer,
    /// Hand the file to the default associated application and return.
    DetachedDefaultApp,
    Unsupported,
}

/// Maps (OS, extension) to a [`PlaybackStrategy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackPolicy;

impl PlaybackPolicy {
    pub fn strategy(&self, os: &OsKind, path: &Path) -> PlaybackStrategy {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match os {
            OsKind::MacOs => PlaybackStrategy::SyncDedicatedPlayer { program: "afplay" },
            OsKind::Windows if ext == "wav" => PlaybackStrategy::SyncSystemPlayer,
            OsKind::Windows => PlaybackStrategy::DetachedDefaultApp,
            OsKind::Linux => PlaybackStrategy::SyncDedicatedPlayer { program: "aplay" },
            OsKind::Other(_) => PlaybackStrategy::Unsupported,
        }
    }
}

/// Best-effort playback of a written audio file.
pub trait Player {
    /// Must not panic or fail; problems are logged.
    fn play(&self, path: &Path, os: &OsKind);
}

/// Plays files by spawning the OS-appropriate external program.
#[derive(Debug, Clone, Default)]
pub struct SystemPlayer {
    policy: PlaybackPolicy,
}

impl SystemPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&self, strategy: &PlaybackStrategy, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy().to_string();
        match strategy {
            PlaybackStrategy::SyncDedicatedPlayer { program } => {
                wait_for(Command::new(program).arg(&path_str), program)
            }
            PlaybackStrategy::SyncSystemPlayer => {
                let script = format!(
                    "(New-Object Media.SoundPlayer '{}').PlaySync();",
                    path_str.replace('\'', "''")
                );
                wait_for(
                    Command::new("powershell").args(["-NoProfile", "-c", &script]),
                    "powershell",
                )
            }
            PlaybackStrategy::DetachedDefaultApp => {
                // The empty title keeps `start` from treating a quoted path as the window title.
                Command::new("cmd")
                    .args(["/c", "start", ""])
                    .arg(&path_str)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .map(drop)
                    .map_err(|e| Error::Playback {
                        program: "cmd".to_string(),
                        message: e.to_string(),
                    })
            }
            PlaybackStrategy::Unsupported => Ok(()),
        }
    }
}

fn wait_for(command: &mut Command, program: &str) -> Result<()> {
    let status = command.status().map_err(|e| Error::Playback {
        program: program.to_string(),
        message: e.to_string(),
    })?;
    if !status.success() {
        return Err(Error::Playback {
            program: program.to_string(),
            message: format!("exited with {}", status),
        });
    }
    Ok(())
}

impl Player for SystemPlayer {
    fn play(&self, path: &Path, os: &OsKind) {
        let strategy = self.policy.strategy(os, path);
        if strategy == PlaybackStrategy::Unsupported {
            debug!(os = ?os, "no playback mechanism for this OS");
            return;
        }

        let target = absolute(path);
        info!(strategy = ?strategy, path = %target.display(), "playing audio");
        if let Err(e) = self.run(&strategy, &target) {
            warn!(error = %e, "an error occurred while trying to play the audio");
        }
    }
}

/// Does nothing. For tests and `--no-play`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPlayer;

impl Player for NoopPlayer {
    fn play(&self, _path: &Path, _os: &OsKind) {}
}

impl<P: Player + ?Sized> Player for &P {
    fn play(&self, path: &Path, os: &OsKind) {
        (**self).play(path, os)
    }
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn play(&self, path: &Path, os: &OsKind) {
        (**self).play(path, os)
    }
}

/// Anchors a relative path at the working directory. `canonicalize` is avoided:
/// its `\\?\` verbatim prefix on Windows confuses `start` and `SoundPlayer`.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
