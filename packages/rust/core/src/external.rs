//! External processor execution.
//!
//! An external processor is an executable invoked with no arguments. It
//! receives the full file content as raw bytes on stdin and must write
//! UTF-8 replacement content to stdout, exiting zero on success. The exit
//! status is the sole success signal; stderr is only surfaced on failure.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use markpress_shared::{MarkpressError, Result};

/// Run `processor` over `input`, returning its stdout decoded as UTF-8.
///
/// Blocks until the subprocess exits. No timeout is enforced: a hung
/// processor stalls the build, which is acceptable for a local, trusted
/// build tool.
pub fn run_external(processor: &Path, input: &[u8]) -> Result<String> {
    let mut child = Command::new(processor)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| MarkpressError::ExternalProcessor {
            path: processor.to_path_buf(),
            message: format!("failed to start: {e}"),
        })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| MarkpressError::ExternalProcessor {
            path: processor.to_path_buf(),
            message: "failed to capture stdin".into(),
        })?;

    // Feed stdin from a separate thread so a processor that emits output
    // before draining its input cannot deadlock against us. Write errors
    // are ignored: a processor is free to exit without reading stdin, and
    // its exit status alone decides success.
    let owned_input = input.to_vec();
    let writer = std::thread::spawn(move || {
        let _ = stdin.write_all(&owned_input);
    });

    let output = child
        .wait_with_output()
        .map_err(|e| MarkpressError::ExternalProcessor {
            path: processor.to_path_buf(),
            message: format!("failed to wait for exit: {e}"),
        })?;
    let _ = writer.join();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MarkpressError::ExternalProcessor {
            path: processor.to_path_buf(),
            message: format!("{}: {}", output.status, stderr.trim()),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| MarkpressError::Encoding {
        path: processor.to_path_buf(),
        message: format!("processor output: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_script;

    #[cfg(unix)]
    #[test]
    fn captures_stdout_of_successful_processor() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let script = write_script(tmp.path(), "upper.sh", "#!/bin/sh\ntr a-z A-Z\n");

        let result = run_external(&script, b"hello").expect("run");
        assert_eq!(result, "HELLO");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_an_error_with_stderr_context() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let script = write_script(
            tmp.path(),
            "fail.sh",
            "#!/bin/sh\necho 'bad input' >&2\nexit 1\n",
        );

        let err = run_external(&script, b"hello").unwrap_err();
        match err {
            MarkpressError::ExternalProcessor { message, .. } => {
                assert!(message.contains("bad input"), "message: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_executable_fails_to_start() {
        let err = run_external(Path::new("/no/such/processor"), b"x").unwrap_err();
        assert!(matches!(err, MarkpressError::ExternalProcessor { .. }));
        assert!(err.to_string().contains("failed to start"));
    }

    #[cfg(unix)]
    #[test]
    fn processor_may_ignore_stdin() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let script = write_script(tmp.path(), "static.sh", "#!/bin/sh\nprintf 'fixed'\n");

        let result = run_external(&script, b"ignored input").expect("run");
        assert_eq!(result, "fixed");
    }

    #[cfg(unix)]
    #[test]
    fn binary_input_passes_through_stdin() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let script = write_script(tmp.path(), "count.sh", "#!/bin/sh\nwc -c | tr -d ' \\n'\n");

        let input = [0u8, 159, 146, 150, 255];
        let result = run_external(&script, &input).expect("run");
        assert_eq!(result, "5");
    }
}
