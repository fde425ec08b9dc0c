use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Malformed environment entry '{0}': expected NAME=value")]
    MalformedEnvironmentEntry(String),

    #[error("Kernel release segment '{segment}' is not a decimal integer")]
    VersionParse { segment: String },

    #[error("Expected numeric command output, got '{output}'")]
    IntegerParse { output: String },

    #[error("Architecture string matched no known pattern: {0}")]
    UnclassifiedArchitecture(String),

    #[error("Launch context carries no home directory")]
    HomeDirectoryUnavailable,

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
