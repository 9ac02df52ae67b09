use std::io;
use std::string::FromUtf8Error;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, TagError>;

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} did not finish within {}s and was killed", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
    #[error("{program} produced output that is not valid UTF-8: {source}")]
    Decode {
        program: String,
        #[source]
        source: FromUtf8Error,
    },
    #[error("invalid command: {0}")]
    Command(String),
    #[error("invalid symbol pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
