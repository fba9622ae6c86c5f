use crate::error::{ReleaseError, Result};
use std::collections::HashMap;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use tracing::{info, warn};

/// Which outcome a notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

impl NotificationKind {
    pub fn name(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Failure => "failure",
        }
    }
}

/// A rendered notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub body: String,
    /// Release metadata handed to the transport (version, tag, branch)
    pub metadata: HashMap<String, String>,
}

impl Notification {
    pub fn new(kind: NotificationKind, body: impl Into<String>) -> Self {
        Notification {
            kind,
            body: body.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Map the notification to GITRELEASE_* environment variables
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert(
            "GITRELEASE_NOTIFICATION".to_string(),
            self.kind.name().to_string(),
        );
        for (key, value) in &self.metadata {
            env.insert(format!("GITRELEASE_{}", key.to_uppercase()), value.clone());
        }
        env
    }
}

/// Transport that delivers rendered notifications
pub trait Dispatcher: Send + Sync {
    fn name(&self) -> &str;

    fn dispatch(&self, notification: &Notification) -> Result<()>;
}

/// Prints notifications to stdout
#[derive(Debug, Default)]
pub struct StdoutDispatcher;

impl Dispatcher for StdoutDispatcher {
    fn name(&self) -> &str {
        "stdout"
    }

    fn dispatch(&self, notification: &Notification) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", notification.body)?;
        Ok(())
    }
}

/// Runs an external command with the body on stdin.
///
/// Any non-zero exit code is a dispatch failure.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    program: String,
    args: Vec<String>,
}

impl CommandDispatcher {
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ReleaseError::notification("Notification command is empty"))?;
        Ok(CommandDispatcher {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Dispatcher for CommandDispatcher {
    fn name(&self) -> &str {
        &self.program
    }

    fn dispatch(&self, notification: &Notification) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .envs(notification.to_env_vars())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReleaseError::notification(format!("Failed to run {}: {}", self.program, e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // Commands may exit without reading their input
            if let Err(e) = stdin.write_all(notification.body.as_bytes()) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::notification(format!(
                "{} failed with exit code {}\nStderr: {}",
                self.program,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Keeps every notification in memory; used by tests and dry runs
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn name(&self) -> &str {
        "recording"
    }

    fn dispatch(&self, notification: &Notification) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| ReleaseError::notification("recording dispatcher poisoned"))?
            .push(notification.clone());
        Ok(())
    }
}

/// Fire-and-forget delivery: failures are logged, never returned.
/// Returns whether the notification went out.
pub fn dispatch_permissive(dispatcher: &dyn Dispatcher, notification: &Notification) -> bool {
    match dispatcher.dispatch(notification) {
        Ok(()) => {
            info!(
                transport = dispatcher.name(),
                kind = notification.kind.name(),
                "notification dispatched"
            );
            true
        }
        Err(e) => {
            warn!(
                transport = dispatcher.name(),
                kind = notification.kind.name(),
                error = %e,
                "notification dispatch failed"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_vars() {
        let notification = Notification::new(NotificationKind::Success, "released")
            .with_metadata("version", "1.3.0")
            .with_metadata("git_tag", "v1.3.0");
        let env = notification.to_env_vars();
        assert_eq!(
            env.get("GITRELEASE_NOTIFICATION"),
            Some(&"success".to_string())
        );
        assert_eq!(env.get("GITRELEASE_VERSION"), Some(&"1.3.0".to_string()));
        assert_eq!(env.get("GITRELEASE_GIT_TAG"), Some(&"v1.3.0".to_string()));
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(CommandDispatcher::new(&[]).is_err());
    }

    #[test]
    fn test_missing_program_is_swallowed() {
        let dispatcher =
            CommandDispatcher::new(&["/nonexistent/path/to/notifier".to_string()]).unwrap();
        let notification = Notification::new(NotificationKind::Failure, "boom");
        assert!(dispatcher.dispatch(&notification).is_err());
        assert!(!dispatch_permissive(&dispatcher, &notification));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_receives_body() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("body.txt");
        let command = vec![
            "sh".to_string(),
            "-c".to_string(),
            format!("cat > '{}'", out.display()),
        ];
        let dispatcher = CommandDispatcher::new(&command).unwrap();
        let notification = Notification::new(NotificationKind::Success, "released 1.3.0");

        assert!(dispatch_permissive(&dispatcher, &notification));
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "released 1.3.0");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_reported() {
        let command = vec!["sh".to_string(), "-c".to_string(), "exit 3".to_string()];
        let dispatcher = CommandDispatcher::new(&command).unwrap();
        let err = dispatcher
            .dispatch(&Notification::new(NotificationKind::Success, ""))
            .unwrap_err();
        assert!(err.to_string().contains("exit code 3"));
    }

    #[test]
    fn test_recording_dispatcher() {
        let dispatcher = RecordingDispatcher::new();
        dispatcher
            .dispatch(&Notification::new(NotificationKind::Success, "one"))
            .unwrap();
        assert_eq!(dispatcher.sent().len(), 1);
        assert_eq!(dispatcher.sent()[0].body, "one");
    }
}
