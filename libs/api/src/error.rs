use std::io;

/// Category of a link error. Lets the loops decide whether a failure
/// ends the process or only the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid configuration — permanent, fail at startup.
    Config,
    /// Socket error on an established or attempted connection.
    Io,
    /// Payload that is not a well-formed record.
    Format,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Config => f.write_str("config"),
            ErrorKind::Io => f.write_str("io"),
            ErrorKind::Format => f.write_str("format"),
        }
    }
}

/// Шаг отправки, на котором упало соединение.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Write,
    Read,
    Shutdown,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Connect => f.write_str("connect"),
            Stage::Write => f.write_str("write"),
            Stage::Read => f.write_str("read"),
            Stage::Shutdown => f.write_str("shutdown"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("{stage}: {source}")]
    Transport { stage: Stage, source: io::Error },

    #[error("bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("accept: {0}")]
    Accept(#[source] io::Error),

    #[error("read: {0}")]
    Read(#[source] io::Error),

    #[error("record is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("record decode: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("record encode: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("record filled the {size}-byte receive buffer and did not decode (truncated)")]
    Truncated { size: usize },

    #[error("bad timestamp '{value}': {source}")]
    Time { value: String, source: chrono::ParseError },

    #[error("config: {0}")]
    Config(String),
}

impl LinkError {
    pub fn transport(stage: Stage, source: io::Error) -> Self {
        Self::Transport { stage, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkError::Config(_) => ErrorKind::Config,
            LinkError::Transport { .. }
            | LinkError::Bind { .. }
            | LinkError::Accept(_)
            | LinkError::Read(_) => ErrorKind::Io,
            LinkError::Utf8(_)
            | LinkError::Decode(_)
            | LinkError::Encode(_)
            | LinkError::Truncated { .. }
            | LinkError::Time { .. } => ErrorKind::Format,
        }
    }

    /// Ошибка относится к одному принятому соединению, а не к listener'у.
    /// Такие ошибки можно пропустить и принимать следующее соединение.
    pub fn is_per_connection(&self) -> bool {
        matches!(
            self,
            LinkError::Read(_) | LinkError::Utf8(_) | LinkError::Decode(_) | LinkError::Truncated { .. }
        )
    }
}
