//! Error policy applied to finished results.

use serde::{Deserialize, Serialize};

use crate::error::ShellResultError;
use crate::result::StreamingResult;
use crate::Result;

/// Decides whether a finished command counts as a failure.
///
/// Results themselves never fail on exit codes or stderr content; a shell
/// applies this policy after draining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckPolicy {
    /// Fail on a non-zero exit code.
    pub check_xc: bool,
    /// Fail when anything was written to stderr.
    pub check_err: bool,
}

impl CheckPolicy {
    /// Create a new policy.
    pub fn new(check_xc: bool, check_err: bool) -> Self {
        Self {
            check_xc,
            check_err,
        }
    }

    /// Apply per-call overrides. `None` keeps this policy's setting.
    pub fn merge(self, check_xc: Option<bool>, check_err: Option<bool>) -> Self {
        Self {
            check_xc: check_xc.unwrap_or(self.check_xc),
            check_err: check_err.unwrap_or(self.check_err),
        }
    }

    /// Check a result, draining it if needed.
    ///
    /// The exit code is checked before stderr.
    pub fn check(&self, result: &mut StreamingResult) -> Result<()> {
        if self.check_xc {
            let code = result.exit_code()?;
            if code != 0 {
                return Err(ShellResultError::NonZeroExit {
                    command: result.command().to_owned(),
                    code,
                });
            }
        }

        if self.check_err {
            let lines = result.stderr()?;
            if !lines.is_empty() {
                return Err(ShellResultError::UnexpectedStderr {
                    command: result.command().to_owned(),
                    lines,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Event, Stream};

    fn finished(stderr: &[&str], code: i32) -> StreamingResult {
        let mut events: Vec<Event> = stderr.iter().map(|l| Event::stderr(*l)).collect();
        events.extend([
            Event::End(Stream::Stdout),
            Event::End(Stream::Stderr),
            Event::Exit(code),
        ]);
        StreamingResult::new("cmd", events.into_iter()).unwrap()
    }

    #[test]
    fn test_default_accepts_everything() {
        let policy = CheckPolicy::default();
        assert!(policy.check(&mut finished(&["error"], 33)).is_ok());
    }

    #[test]
    fn test_check_xc() {
        let policy = CheckPolicy::new(true, false);
        assert!(policy.check(&mut finished(&[], 0)).is_ok());

        let err = policy.check(&mut finished(&[], 33)).unwrap_err();
        assert!(matches!(err, ShellResultError::NonZeroExit { code: 33, .. }));
    }

    #[test]
    fn test_check_err() {
        let policy = CheckPolicy::new(false, true);
        assert!(policy.check(&mut finished(&[], 1)).is_ok());

        let err = policy.check(&mut finished(&["error"], 0)).unwrap_err();
        match err {
            ShellResultError::UnexpectedStderr { lines, .. } => assert_eq!(lines, vec!["error"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_merge_overrides() {
        let global = CheckPolicy::new(true, false);
        assert_eq!(global.merge(None, None), global);
        assert_eq!(global.merge(Some(false), None), CheckPolicy::new(false, false));
        assert_eq!(global.merge(None, Some(true)), CheckPolicy::new(true, true));

        let off = CheckPolicy::default();
        assert_eq!(off.merge(Some(true), Some(true)), CheckPolicy::new(true, true));
    }
}
