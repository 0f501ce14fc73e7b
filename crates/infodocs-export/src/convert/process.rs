//! Locating and running backend executables.

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::backend::BackendError;

/// Find an executable: an explicit path in `env_var` wins, otherwise the
/// first `program` on `PATH`.
pub fn locate(env_var: &str, program: &str) -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(env_var).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
        tracing::warn!(env_var, path = %path.display(), "configured backend executable not found");
        return None;
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Run `program <arg>` and return the first non-empty line it prints. Used
/// as the availability check: `None` means the backend is unusable.
pub fn detect_version(program: &Path, arg: &str) -> Option<String> {
    let output = Command::new(program)
        .arg(arg)
        .stdin(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    // Some tools (pdftoppm) print their version on stderr.
    let text = if output.stdout.is_empty() {
        &output.stderr
    } else {
        &output.stdout
    };
    let version = String::from_utf8_lossy(text)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();
    Some(version)
}

/// Run `program` with `args`, feeding `stdin` and returning stdout, which
/// may be empty. A non-zero exit carries the captured stderr.
pub fn run<I, S>(program: &Path, args: I, stdin: Option<&[u8]>) -> Result<Vec<u8>, BackendError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| BackendError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    // Feed stdin from a separate thread; writing it inline can deadlock once
    // the child fills its stdout pipe.
    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => {
            let input = input.to_vec();
            Some(std::thread::spawn(move || pipe.write_all(&input)))
        }
        _ => None,
    };

    let output = child.wait_with_output()?;
    if let Some(writer) = writer {
        let written = writer
            .join()
            .map_err(|_| std::io::Error::other("stdin writer panicked"))?;
        // A child that exits early closes its stdin; report the exit instead.
        if output.status.success() {
            written?;
        }
    }

    if !output.status.success() {
        return Err(BackendError::Exit {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}
