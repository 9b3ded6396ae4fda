//! Running the target command

use envlift_core::{Error, Result};
use indexmap::IndexMap;
use std::ffi::OsString;
use std::process::{Command, ExitStatus, Stdio};

/// Run `command` with exactly `env` and wait for it.
///
/// Stdin is always inherited. With `inherit_output` false the child's stdout
/// and stderr are discarded. Returns the child's exit code; a child killed by
/// a signal reports `128 + signal`.
pub fn execute_command(
    command: &str,
    args: &[String],
    env: &IndexMap<OsString, OsString>,
    inherit_output: bool,
) -> Result<i32> {
    let output = || {
        if inherit_output {
            Stdio::inherit()
        } else {
            Stdio::null()
        }
    };

    let mut cmd = Command::new(command);
    cmd.args(args)
        .env_clear()
        .envs(env)
        .stdin(Stdio::inherit())
        .stdout(output())
        .stderr(output());

    tracing::debug!(command, ?args, vars = env.len(), "spawning command");

    let mut child = cmd.spawn().map_err(|e| {
        Error::command_execution(command, args.to_vec(), format!("failed to spawn command: {e}"), None)
    })?;

    let status = child.wait().map_err(|e| {
        Error::command_execution(command, args.to_vec(), format!("failed to wait for command: {e}"), None)
    })?;

    let code = exit_code(status);
    tracing::debug!(command, code, "command finished");
    Ok(code)
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
