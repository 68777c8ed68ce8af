//! External compositor invocation.
//!
//! The screenlist image itself is drawn by ImageMagick. [`Compositor`] runs
//! the configured program once, synchronously, with the argument list built
//! by [`compose`](crate::compose), and turns a launch failure or a non-zero
//! exit into a [`ScreengenError`].

use std::{ffi::OsString, process::Command};

use crate::error::ScreengenError;

/// Default compositor program (ImageMagick 6 `convert`).
pub const DEFAULT_COMPOSITOR: &str = "convert";

/// An external image compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compositor {
    program: OsString,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPOSITOR)
    }
}

impl Compositor {
    /// Use `program` (looked up on `PATH` unless it contains a separator).
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The program that will be executed.
    pub fn program(&self) -> &OsString {
        &self.program
    }

    /// Run the compositor to completion.
    ///
    /// Standard output and error are captured; stderr is attached to the
    /// error on failure. No timeout is applied.
    ///
    /// # Errors
    ///
    /// - [`ScreengenError::CompositorLaunch`] if the process cannot be
    ///   started.
    /// - [`ScreengenError::CompositionFailed`] if it exits unsuccessfully.
    pub fn run(&self, arguments: &[String]) -> Result<(), ScreengenError> {
        let program = self.program.to_string_lossy().into_owned();
        log::debug!("Running {program} with {} arguments", arguments.len());

        let output = Command::new(&self.program)
            .args(arguments)
            .output()
            .map_err(|source| ScreengenError::CompositorLaunch {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::debug!("{program} exited with {}: {stderr}", output.status);
            return Err(ScreengenError::CompositionFailed {
                status: output.status,
                stderr,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_convert() {
        assert_eq!(Compositor::default().program(), "convert");
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let compositor = Compositor::new("screengen-no-such-compositor");
        let error = compositor.run(&[]).unwrap_err();
        assert!(matches!(error, ScreengenError::CompositorLaunch { .. }));
        assert!(error.to_string().contains("screengen-no-such-compositor"));
    }

    #[cfg(unix)]
    #[test]
    fn successful_exit() {
        Compositor::new("true").run(&["ignored".to_string()]).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn failing_exit_carries_stderr() {
        let arguments = [
            "-c".to_string(),
            "echo 'no decode delegate' >&2; exit 3".to_string(),
        ];
        let error = Compositor::new("sh").run(&arguments).unwrap_err();
        match error {
            ScreengenError::CompositionFailed { status, stderr } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "no decode delegate");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
