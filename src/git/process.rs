//! `git log` subprocess used by the `git-log` history strategy.

use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

use crate::models::ObjectId;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git log exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("unexpected git log output line {0:?}")]
    Output(String),

    #[error("refusing start point that looks like an option: {0}")]
    OptionLikeStart(String),
}

/// Run `git log <start> --format=%H -<limit> --` in `dir` and parse the ids,
/// keeping git's output order. The trailing `--` keeps git from reading
/// `start` as a path when a file of the same name exists.
pub async fn log_ids(
    program: &Path,
    dir: &Path,
    start: &str,
    limit: usize,
) -> Result<Vec<ObjectId>, ProcessError> {
    if start.starts_with('-') {
        return Err(ProcessError::OptionLikeStart(start.to_string()));
    }

    let output = Command::new(program)
        .arg("log")
        .arg(start)
        .arg("--format=%H")
        .arg(format!("-{}", limit))
        .arg("--")
        .current_dir(dir)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ProcessError::Spawn {
            program: program.display().to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ProcessError::Exit {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_ids(&String::from_utf8_lossy(&output.stdout))
}

fn parse_ids(stdout: &str) -> Result<Vec<ObjectId>, ProcessError> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| ObjectId::new(line).map_err(|_| ProcessError::Output(line.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hash_lines_in_order() {
        let out = "944c4597de42dfbbcd9643bd52082b7f00930039\n\
                   8d63f002287d1361877222c62083b79b04310678\n\n";
        let ids = parse_ids(out).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].as_str(), "944c4597de42dfbbcd9643bd52082b7f00930039");
        assert_eq!(ids[1].as_str(), "8d63f002287d1361877222c62083b79b04310678");
    }

    #[test]
    fn rejects_garbage_output() {
        assert!(matches!(
            parse_ids("fatal: not a hash\n"),
            Err(ProcessError::Output(_))
        ));
    }

    #[tokio::test]
    async fn option_like_start_is_refused() {
        let err = log_ids(Path::new("git"), Path::new("."), "--all", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::OptionLikeStart(_)));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = log_ids(
            Path::new("/nonexistent/definitely-not-git"),
            Path::new("."),
            "HEAD",
            5,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
