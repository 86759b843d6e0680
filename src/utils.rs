use std::ffi::OsString;
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

/// Run `argv` followed by `extra` to completion with output discarded.
///
/// Blocks with no timeout; an editor waiting on a human may take minutes.
pub fn run_quiet(argv: &[String], extra: &[OsString]) -> std::io::Result<ExitStatus> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line")
    })?;
    debug!(program = %program, ?args, ?extra, "spawning");
    Command::new(program)
        .args(args)
        .args(extra)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_invalid() {
        let err = run_quiet(&[], &[]).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_reported() {
        assert!(run_quiet(&["true".to_string()], &[]).unwrap().success());
        assert!(!run_quiet(&["false".to_string()], &[]).unwrap().success());
    }
}
