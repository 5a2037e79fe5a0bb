//! Running executables.

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::process::Command;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_status_impl(&self, program: &Path, args: &[String]) -> Result<Option<i32>> {
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("Failed to execute {}", program.display()))?;
        debug!("{} exited with {}", program.display(), status);
        Ok(status.code())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use std::path::Path;

    #[test]
    fn test_run_status_reports_exit_code() {
        let runtime = RealRuntime;
        let sh = Path::new("/bin/sh");

        let ok = runtime
            .run_status(sh, &["-c".to_string(), "exit 0".to_string()])
            .unwrap();
        assert_eq!(ok, Some(0));

        let failed = runtime
            .run_status(sh, &["-c".to_string(), "exit 3".to_string()])
            .unwrap();
        assert_eq!(failed, Some(3));
    }

    #[test]
    fn test_run_status_missing_program() {
        let runtime = RealRuntime;
        let result = runtime.run_status(Path::new("/nonexistent/sticks"), &[]);
        assert!(result.is_err());
    }
}
