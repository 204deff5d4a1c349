use std::string::FromUtf8Error;

/// Failure to extract a record block from ciao-cli output.
///
/// The CLI's text format is an unstable integration contract; a truncated
/// or malformed block is always an error, never a partially-filled record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {entity} output at line {line}: {detail}")]
pub struct ParseError {
    pub entity: &'static str,
    /// 1-based line number within the captured stdout.
    pub line: usize,
    pub detail: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("ciao-cli failed to start ({command}): {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("ciao-cli did not exit within {timeout_secs}s ({command})")]
    Timeout { command: String, timeout_secs: u64 },
    #[error("ciao-cli exited with status {status:?} ({command})")]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
    #[error("ciao-cli output was not valid UTF-8 ({command}, {stream}): {source}")]
    NonUtf8Output {
        command: String,
        stream: &'static str,
        #[source]
        source: FromUtf8Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}
