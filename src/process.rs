//! Child process invocation
//!
//! Every external tool the installer touches (venv python, pip, apt-get,
//! brew, cmake, make) goes through `run`: stdout and stderr are captured
//! and combined into one log, and a non-zero exit becomes an
//! `InstallError::Process` carrying that log. Privileged commands are
//! prefixed with `sudo -S` and receive the captured credential on stdin.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::credential::SudoCredential;
use crate::error::{InstallError, Result};
use crate::signal;

/// Run a prepared command, capturing combined stdout/stderr.
pub fn run(command: &mut Command) -> Result<String> {
    run_with_stdin(command, None)
}

/// Run a command with `sudo -S`, feeding the credential over stdin.
///
/// With no credential the command runs unprefixed; callers only take that
/// path when already running as root.
pub fn run_elevated(
    credential: Option<&SudoCredential>,
    program: &str,
    args: &[&str],
) -> Result<String> {
    match credential {
        Some(cred) => {
            let mut command = Command::new("sudo");
            command.arg("-S").arg("-p").arg("").arg(program).args(args);
            run_with_stdin(&mut command, Some(cred.reveal().as_bytes()))
        }
        None => run(Command::new(program).args(args)),
    }
}

/// Effective-uid root check; privileged commands skip the sudo prefix when
/// this holds.
#[cfg(unix)]
pub fn is_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}

#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}

fn run_with_stdin(command: &mut Command, stdin_data: Option<&[u8]>) -> Result<String> {
    let program = command.get_program().to_string_lossy().into_owned();

    command
        .stdin(if stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            InstallError::MissingTool {
                program: program.clone(),
            }
        } else {
            InstallError::Io {
                message: format!("Failed to spawn {program}: {err}"),
            }
        }
    })?;

    if let (Some(data), Some(mut stdin)) = (stdin_data, child.stdin.take()) {
        // sudo may exit before reading the whole password; a broken pipe
        // here is reported through the exit status instead.
        let _ = stdin.write_all(data);
        let _ = stdin.write_all(b"\n");
    }

    let output = child.wait_with_output()?;

    let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
    log.push_str(&String::from_utf8_lossy(&output.stderr));

    // A Ctrl-C kills the child alongside us; report the interrupt, not the
    // child's signal death.
    signal::check()?;

    if !output.status.success() {
        return Err(InstallError::Process {
            program,
            code: output.status.code().unwrap_or(-1),
            log,
        });
    }

    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_combined_output() {
        let log = run(Command::new("sh").args(["-c", "echo out; echo err >&2"])).unwrap();
        assert!(log.contains("out"));
        assert!(log.contains("err"));
    }

    #[test]
    fn test_run_nonzero_is_process_error() {
        let err = run(Command::new("sh").args(["-c", "echo boom; exit 3"])).unwrap_err();
        match err {
            InstallError::Process { program, code, log } => {
                assert_eq!(program, "sh");
                assert_eq!(code, 3);
                assert!(log.contains("boom"));
            }
            other => panic!("expected Process error, got {other:?}"),
        }
    }

    #[test]
    fn test_run_missing_program() {
        let err = run(&mut Command::new("definitely-not-a-real-tool-xyz")).unwrap_err();
        assert!(matches!(err, InstallError::MissingTool { .. }));
    }

    #[test]
    fn test_run_elevated_without_credential_runs_plain() {
        let log = run_elevated(None, "sh", &["-c", "echo direct"]).unwrap();
        assert!(log.contains("direct"));
    }
}
