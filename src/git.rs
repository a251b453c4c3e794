//! Read-only `git` queries against checked-out working copies.
//!
//! Every function here shells out to the system `git` binary with `-C <repo>`
//! so that the query is scoped to one repository. None of them fetch, clone
//! or write anything.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run `git -C <repo> <args>` and return the raw output.
fn run_git(repo: &Path, args: &[&str]) -> Result<Output> {
    debug!("git -C {} {}", repo.display(), args.join(" "));
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            repo: repo.display().to_string(),
            stderr: e.to_string(),
        })
}

/// Run a query and return its trimmed stdout, failing on a non-zero exit.
fn query(repo: &Path, args: &[&str]) -> Result<String> {
    let output = run_git(repo, args)?;
    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            repo: repo.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// List tags whose name matches `name` exactly.
pub fn list_tags(repo: &Path, name: &str) -> Result<String> {
    query(repo, &["tag", "--list", name])
}

/// List local (or remote-tracking, with `remote`) branches containing `fragment`.
pub fn list_branches(repo: &Path, fragment: &str, remote: bool) -> Result<String> {
    let pattern = format!("*{}*", fragment);
    if remote {
        query(repo, &["branch", "--remotes", "--list", &pattern])
    } else {
        query(repo, &["branch", "--list", &pattern])
    }
}

/// The type (`commit`, `tree`, `blob`, `tag`) of an object.
pub fn object_type(repo: &Path, object: &str) -> Result<String> {
    query(repo, &["cat-file", "-t", object])
}

/// Whether an object such as `<ref>:<path>` exists.
///
/// A missing object is `Ok(false)`; only a failure to run `git` is an error.
pub fn object_exists(repo: &Path, object: &str) -> Result<bool> {
    let output = run_git(repo, &["cat-file", "-e", object])?;
    Ok(output.status.success())
}

/// The root of the working copy enclosing `dir`, bounded by `timeout`.
///
/// Expiry kills the child and is reported as [`Error::Timeout`].
pub fn show_toplevel(dir: &Path, timeout: Duration) -> Result<PathBuf> {
    let command = "rev-parse --show-toplevel";
    let mut child = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["rev-parse", "--show-toplevel"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::GitCommand {
            command: command.to_string(),
            repo: dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            // The child may have exited between the poll and the kill
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout {
                command: command.to_string(),
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    let mut stdout = String::new();
    let mut stderr = String::new();
    if let Some(mut pipe) = child.stdout.take() {
        pipe.read_to_string(&mut stdout)?;
    }
    if let Some(mut pipe) = child.stderr.take() {
        pipe.read_to_string(&mut stderr)?;
    }

    if !status.success() {
        return Err(Error::GitCommand {
            command: command.to_string(),
            repo: dir.display().to_string(),
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(PathBuf::from(stdout.trim()))
}
