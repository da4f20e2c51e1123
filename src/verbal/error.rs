use thiserror::Error;

/// Errors that escape an execution.
///
/// Structural problems with the command line never show up here: they are
/// reported to the user together with usage help and the run ends normally.
#[derive(Error, Debug)]
pub enum VerbalError {
    #[error("Handler error: {0}")]
    Handler(#[source] anyhow::Error),

    #[error("Render error: {0}")]
    Render(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, VerbalError>;

/// Errors raised while tokenizing or rebuilding a command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Short option cluster `-{cluster}` cannot take a value")]
    ClusteredShortValue { cluster: String },

    #[error("Argument `{argument}` ends in `\\` and cannot be quoted")]
    UnrepresentableArgument { argument: String },
}

/// Structural failures while resolving or binding a command line.
///
/// Every variant triggers help rendering for the verb or command it was
/// raised in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BadCommandKind {
    #[error("Malformed command")]
    MalformedCommand,

    #[error("Unknown verb `{0}`")]
    UnknownVerb(String),

    #[error("Unknown command `{0}`")]
    UnknownCommand(String),

    #[error("Unexpected option `{0}`")]
    UnexpectedOption(String),

    #[error("Unknown option `{0}`")]
    UnknownOption(String),

    #[error("Option `{0}` can only be given once")]
    OptionRepeatedNotArray(String),

    #[error("Too many values, `{0}` was not expected")]
    TooManyValues(String),

    #[error("Invalid value `{value}` for {key}, expected {expected}")]
    InvalidValueFormat {
        key: String,
        value: String,
        expected: String,
    },

    #[error("Option `{0}` requires a value")]
    MissingOptionValue(String),

    #[error(transparent)]
    AmbiguousShortOption(#[from] ParseError),
}
