use thiserror::Error;

/// An option value outside its documented range. Always fatal to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("maximum value exceeded for option \"{name}\" ({value} > {max})")]
    AboveMax {
        name: &'static str,
        value: String,
        max: String,
    },

    #[error("minimum value exceeded for option \"{name}\" ({value} < {min})")]
    BelowMin {
        name: &'static str,
        value: String,
        min: String,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed DIMACS input at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The worker pool could not be brought up; nothing computed on it can be trusted.
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
