use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde_json::json;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{AppError, Result};

/// A single audio element: one source, playing or not.
pub trait AudioOutput {
    /// Replaces the source. Stops whatever was playing.
    fn load(&mut self, src: &str);
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    /// Stops playback and forgets the source.
    fn stop(&mut self);
    fn is_playing(&mut self) -> bool;
}

impl<T: AudioOutput + ?Sized> AudioOutput for Box<T> {
    fn load(&mut self, src: &str) {
        (**self).load(src)
    }

    fn play(&mut self) -> Result<()> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_playing(&mut self) -> bool {
        (**self).is_playing()
    }
}

/// Tracks play state without producing sound.
#[derive(Debug, Default)]
pub struct SilentAudio {
    src: Option<String>,
    playing: bool,
}

impl SilentAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }
}

impl AudioOutput for SilentAudio {
    fn load(&mut self, src: &str) {
        self.src = Some(src.to_string());
        self.playing = false;
    }

    fn play(&mut self) -> Result<()> {
        if self.src.is_some() {
            self.playing = true;
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.src = None;
        self.playing = false;
    }

    fn is_playing(&mut self) -> bool {
        self.playing
    }
}

/// Plays previews through an external command such as `mpv`.
///
/// When the player exposes an mpv JSON IPC socket, pause and resume are sent
/// over it and the clip continues where it stopped. Without one, pausing ends
/// the process and playing again restarts the clip.
#[derive(Debug)]
pub struct CommandAudio {
    program: String,
    args: Vec<String>,
    ipc_socket: Option<PathBuf>,
    src: Option<String>,
    child: Option<Child>,
    ipc: Option<UnixStream>,
    paused: bool,
}

impl CommandAudio {
    /// Splits `command` on whitespace. mpv gets an IPC socket automatically.
    pub fn new(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AppError::Config("player command is empty".into()))?;

        let audio = Self::from_parts(program, parts.collect());
        if is_mpv(&audio.program) {
            let socket = std::env::temp_dir()
                .join(format!("songscout-mpv-{}.sock", std::process::id()));
            return Ok(audio.with_ipc_socket(socket));
        }
        Ok(audio)
    }

    fn from_parts(program: String, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            ipc_socket: None,
            src: None,
            child: None,
            ipc: None,
            paused: false,
        }
    }

    /// Passes `--input-ipc-server=<path>` to the player and controls pause
    /// through that socket.
    pub fn with_ipc_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.ipc_socket = Some(path.into());
        self
    }

    fn spawn(&mut self) -> Result<()> {
        let Some(src) = self.src.as_deref() else {
            return Ok(());
        };

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(socket) = &self.ipc_socket {
            command.arg(format!("--input-ipc-server={}", socket.display()));
        }

        let child = command
            .arg(src)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                warn!("Failed to start {}: {}", self.program, e);
                AppError::Io(e)
            })?;

        debug!("Started {} (pid {:?})", self.program, child.id());
        self.child = Some(child);
        self.paused = false;
        Ok(())
    }

    fn child_alive(&mut self) -> bool {
        match self.child.as_mut().map(|c| c.try_wait()) {
            Some(Ok(None)) => true,
            Some(_) => {
                self.kill_child();
                false
            }
            None => false,
        }
    }

    fn kill_child(&mut self) {
        self.ipc = None;
        self.paused = false;
        if let Some(mut child) = self.child.take() {
            // Reaped by tokio in the background.
            if let Err(e) = child.start_kill() {
                debug!("Player process already gone: {}", e);
            }
        }
    }

    /// Sends `set_property pause` to the player. False when there is no
    /// usable IPC connection.
    fn set_paused(&mut self, paused: bool) -> bool {
        let Some(path) = self.ipc_socket.as_deref() else {
            return false;
        };

        if self.ipc.is_none() {
            let connected =
                UnixStream::connect(path).and_then(|s| s.set_nonblocking(true).map(|_| s));
            match connected {
                Ok(stream) => self.ipc = Some(stream),
                Err(e) => {
                    debug!("Player IPC unavailable at {}: {}", path.display(), e);
                    return false;
                }
            }
        }
        let Some(stream) = self.ipc.as_mut() else {
            return false;
        };

        drain_replies(stream);
        let mut line = json!({ "command": ["set_property", "pause", paused] }).to_string();
        line.push('\n');

        match stream.write_all(line.as_bytes()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Player IPC write failed: {}", e);
                self.ipc = None;
                false
            }
        }
    }
}

fn is_mpv(program: &str) -> bool {
    Path::new(program)
        .file_stem()
        .is_some_and(|stem| stem == "mpv")
}

/// Discards replies and events mpv pushes to the socket so its buffer never
/// fills up.
fn drain_replies(stream: &mut UnixStream) {
    let mut buf = [0u8; 4096];
    while let Ok(n) = stream.read(&mut buf) {
        if n == 0 {
            break;
        }
    }
}

impl AudioOutput for CommandAudio {
    fn load(&mut self, src: &str) {
        self.kill_child();
        self.src = Some(src.to_string());
    }

    fn play(&mut self) -> Result<()> {
        if self.child_alive() {
            if !self.paused {
                return Ok(());
            }
            if self.set_paused(false) {
                self.paused = false;
                return Ok(());
            }
            self.kill_child();
        }
        self.spawn()
    }

    fn pause(&mut self) {
        if !self.child_alive() || self.paused {
            return;
        }
        if self.set_paused(true) {
            self.paused = true;
        } else {
            self.kill_child();
        }
    }

    fn stop(&mut self) {
        self.kill_child();
        self.src = None;
    }

    fn is_playing(&mut self) -> bool {
        self.child_alive() && !self.paused
    }
}

impl Drop for CommandAudio {
    fn drop(&mut self) {
        self.kill_child();
        if let Some(socket) = &self.ipc_socket {
            let _ = std::fs::remove_file(socket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::storage::scratch_dir;
    use serde_json::Value;
    use std::io::{BufRead, BufReader};
    use std::os::unix::net::UnixListener;
    use std::time::Duration;

    #[test]
    fn test_silent_audio_needs_a_source() {
        let mut audio = SilentAudio::new();
        audio.play().unwrap();
        assert!(!audio.is_playing());

        audio.load("https://p.example/1.mp3");
        audio.play().unwrap();
        assert!(audio.is_playing());
        audio.pause();
        assert!(!audio.is_playing());
        assert_eq!(audio.src(), Some("https://p.example/1.mp3"));

        audio.stop();
        assert_eq!(audio.src(), None);
    }

    #[test]
    fn test_command_audio_parses_command() {
        let audio = CommandAudio::new("mpv --no-video  --really-quiet").unwrap();
        assert_eq!(audio.program, "mpv");
        assert_eq!(audio.args, vec!["--no-video", "--really-quiet"]);

        assert!(matches!(CommandAudio::new("   "), Err(AppError::Config(_))));
    }

    #[test]
    fn test_only_mpv_gets_an_ipc_socket() {
        let mpv = CommandAudio::new("/usr/bin/mpv --no-video").unwrap();
        assert!(mpv.ipc_socket.is_some());

        let other = CommandAudio::new("ffplay -nodisp").unwrap();
        assert!(other.ipc_socket.is_none());
    }

    /// A stand-in player that logs each start and then idles.
    fn logging_player(log: &Path) -> CommandAudio {
        let script = format!("echo \"start $*\" >> '{}'; exec sleep 30", log.display());
        CommandAudio::from_parts("sh".into(), vec!["-c".into(), script, "player".into()])
    }

    fn starts(log: &Path) -> Vec<String> {
        std::fs::read_to_string(log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_pause_and_resume_over_ipc_keep_the_clip() {
        let dir = scratch_dir("player-ipc");
        std::fs::create_dir_all(&dir).unwrap();
        let log = dir.join("player.log");
        let socket = dir.join("mpv.sock");
        let listener = UnixListener::bind(&socket).unwrap();

        let mut audio = logging_player(&log).with_ipc_socket(&socket);
        audio.load("clip.mp3");
        audio.play().unwrap();
        assert!(audio.is_playing());

        audio.pause();
        assert!(!audio.is_playing());
        audio.play().unwrap();
        assert!(audio.is_playing());

        let (stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut lines = BufReader::new(stream).lines();
        let first: Value = serde_json::from_str(&lines.next().unwrap().unwrap()).unwrap();
        let second: Value = serde_json::from_str(&lines.next().unwrap().unwrap()).unwrap();
        assert_eq!(first, json!({"command": ["set_property", "pause", true]}));
        assert_eq!(second, json!({"command": ["set_property", "pause", false]}));

        tokio::time::sleep(Duration::from_millis(300)).await;
        let started = starts(&log);
        assert_eq!(started.len(), 1, "player restarted: {:?}", started);
        assert!(started[0].contains("--input-ipc-server="));
        assert!(started[0].ends_with("clip.mp3"));

        drop(audio);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_pause_without_ipc_restarts_on_play() {
        let dir = scratch_dir("player-plain");
        std::fs::create_dir_all(&dir).unwrap();
        let log = dir.join("player.log");

        let mut audio = logging_player(&log);
        audio.load("clip.mp3");
        audio.play().unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        audio.pause();
        assert!(!audio.is_playing());
        audio.play().unwrap();
        assert!(audio.is_playing());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(starts(&log).len(), 2);

        drop(audio);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_command_audio_missing_binary_is_error() {
        let mut audio = CommandAudio::new("songscout-no-such-player-binary").unwrap();
        audio.load("https://p.example/1.mp3");

        assert!(audio.play().is_err());
        assert!(!audio.is_playing());
    }

    #[tokio::test]
    async fn test_command_audio_without_source_is_noop() {
        let mut audio = CommandAudio::new("songscout-no-such-player-binary").unwrap();
        assert!(audio.play().is_ok());
        assert!(!audio.is_playing());
    }
}
