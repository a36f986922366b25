//! Interpretation of yt-dlp exit codes and printed output

use crate::error::{DownloadError, Error, ResolutionError};
use crate::types::ResolvedChannel;

/// Exit status of a yt-dlp invocation, mapped to its documented meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Exit code 0
    Success,
    /// Exit code 1: at least one item failed to download
    DownloadFailed,
    /// Exit code 101: stopped early by a download limit, or nothing matched
    StoppedEarly,
    /// Any other exit code (2 is a usage error, 100 an update request)
    Other(i32),
    /// Killed by a signal
    Signaled,
}

impl ExitStatus {
    /// Map a raw exit code (`None` when killed by a signal)
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => Self::Success,
            Some(1) => Self::DownloadFailed,
            Some(101) => Self::StoppedEarly,
            Some(other) => Self::Other(other),
            None => Self::Signaled,
        }
    }

    /// Whether the invocation completed without failure
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::StoppedEarly)
    }
}

/// Parse the output of a metadata probe
///
/// The probe prints the channel id on the first non-empty line and the channel
/// name on the second.
///
/// # Errors
///
/// - [`ResolutionError::ToolFailed`] for exit statuses other than success or
///   stopped-early
/// - [`ResolutionError::MissingOutput`] if id or name is missing
pub fn parse_probe_output(
    url: &str,
    stdout: &[u8],
    stderr: &[u8],
    code: Option<i32>,
) -> crate::Result<ResolvedChannel> {
    if !ExitStatus::from_code(code).is_success() {
        return Err(ResolutionError::ToolFailed {
            url: url.to_string(),
            code,
            stderr: last_error_line(stderr),
        }
        .into());
    }

    let output = String::from_utf8_lossy(stdout);
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());

    match (lines.next(), lines.next()) {
        (Some(id), Some(name)) if id != "NA" && name != "NA" => Ok(ResolvedChannel {
            id: id.to_string(),
            name: name.to_string(),
        }),
        _ => Err(ResolutionError::MissingOutput {
            url: url.to_string(),
            output: output.to_string(),
        }
        .into()),
    }
}

/// Classify the outcome of a download invocation
///
/// # Errors
///
/// - [`DownloadError::ItemFailed`] when yt-dlp reports a download failure
/// - [`Error::ExternalTool`] for usage errors, update requests and signals
pub fn check_download_status(url: &str, stderr: &[u8], code: Option<i32>) -> crate::Result<()> {
    match ExitStatus::from_code(code) {
        ExitStatus::Success | ExitStatus::StoppedEarly => Ok(()),
        ExitStatus::DownloadFailed => Err(DownloadError::ItemFailed {
            url: url.to_string(),
            code,
            reason: last_error_line(stderr),
        }
        .into()),
        ExitStatus::Other(code) => Err(Error::ExternalTool(format!(
            "yt-dlp exited with code {} for {}: {}",
            code,
            url,
            last_error_line(stderr)
        ))),
        ExitStatus::Signaled => Err(Error::ExternalTool(format!(
            "yt-dlp was terminated by a signal while retrieving {}",
            url
        ))),
    }
}

/// Last line yt-dlp marked as an error, or the last non-empty line of stderr
fn last_error_line(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    lines
        .clone()
        .rfind(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.next_back())
        .unwrap_or("no error output")
        .to_string()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.youtube.com/@example";

    #[test]
    fn exit_codes_map_to_statuses() {
        assert_eq!(ExitStatus::from_code(Some(0)), ExitStatus::Success);
        assert_eq!(ExitStatus::from_code(Some(1)), ExitStatus::DownloadFailed);
        assert_eq!(ExitStatus::from_code(Some(101)), ExitStatus::StoppedEarly);
        assert_eq!(ExitStatus::from_code(Some(2)), ExitStatus::Other(2));
        assert_eq!(ExitStatus::from_code(None), ExitStatus::Signaled);
        assert!(ExitStatus::StoppedEarly.is_success());
        assert!(!ExitStatus::DownloadFailed.is_success());
    }

    #[test]
    fn probe_output_yields_id_and_name() {
        let channel =
            parse_probe_output(URL, b"UCabc123\nSome Channel\n", b"", Some(0)).unwrap();
        assert_eq!(channel.id, "UCabc123");
        assert_eq!(channel.name, "Some Channel");
    }

    #[test]
    fn probe_stopped_early_is_accepted() {
        let channel = parse_probe_output(URL, b"\nUCabc123\nSome Channel\n", b"", Some(101)).unwrap();
        assert_eq!(channel.id, "UCabc123");
    }

    #[test]
    fn probe_with_missing_name_is_missing_output() {
        let err = parse_probe_output(URL, b"UCabc123\n", b"", Some(0)).unwrap_err();
        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::MissingOutput { .. })
        ));

        let err = parse_probe_output(URL, b"NA\nNA\n", b"", Some(0)).unwrap_err();
        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::MissingOutput { .. })
        ));
    }

    #[test]
    fn probe_failure_reports_stderr() {
        let stderr = b"WARNING: something\nERROR: [youtube] Unable to resolve\n";
        let err = parse_probe_output(URL, b"", stderr, Some(1)).unwrap_err();
        match err {
            Error::Resolution(ResolutionError::ToolFailed { code, stderr, .. }) => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "ERROR: [youtube] Unable to resolve");
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[test]
    fn download_failure_is_item_error() {
        let err = check_download_status(
            "https://www.youtube.com/watch?v=vid1",
            b"ERROR: [youtube] vid1: Video unavailable\n",
            Some(1),
        )
        .unwrap_err();

        match err {
            Error::Download(DownloadError::ItemFailed { url, reason, .. }) => {
                assert!(url.ends_with("vid1"));
                assert!(reason.contains("Video unavailable"));
            }
            other => panic!("expected ItemFailed, got {:?}", other),
        }
    }

    #[test]
    fn usage_error_and_signal_are_tool_errors() {
        let err = check_download_status("u", b"yt-dlp: error: no such option\n", Some(2)).unwrap_err();
        assert!(matches!(err, Error::ExternalTool(ref msg) if msg.contains("no such option")));

        let err = check_download_status("u", b"", None).unwrap_err();
        assert!(matches!(err, Error::ExternalTool(_)));
    }

    #[test]
    fn success_and_stopped_early_are_ok() {
        assert!(check_download_status("u", b"", Some(0)).is_ok());
        assert!(check_download_status("u", b"", Some(101)).is_ok());
    }

    #[test]
    fn invalid_utf8_in_stderr_keeps_the_error_line() {
        let err = check_download_status(
            "u",
            b"ERROR: [youtube] abc: Video unavailable \xff\n",
            Some(1),
        )
        .unwrap_err();

        match err {
            Error::Download(DownloadError::ItemFailed { reason, .. }) => {
                assert!(reason.starts_with("ERROR: [youtube] abc: Video unavailable"));
            }
            other => panic!("expected ItemFailed, got {:?}", other),
        }
        assert_eq!(last_error_line(b"caf\xe9 broke\n"), "caf\u{fffd} broke");
    }

    #[test]
    fn last_error_line_falls_back_to_last_line() {
        assert_eq!(last_error_line(b"first\nsecond\n\n"), "second");
        assert_eq!(last_error_line(b""), "no error output");
    }
}
