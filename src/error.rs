use std::{
    error::Error,
    fmt::{Display, Formatter},
};

/// Everything that can go wrong while loading, analyzing, or reporting fire data.
///
/// None of these are recovered from. They all propagate up to `main` and end the run.
#[derive(Debug)]
pub enum FireSpotsError {
    /// Reading input or writing output failed.
    Io(std::io::Error),
    /// A CSV file could not be read or written.
    Csv(csv::Error),
    /// A zip archive could not be opened or an entry in it could not be read.
    Zip(zip::result::ZipError),
    /// A field in the input data was malformed.
    Parse(String),
    /// The requested analysis does not make sense, e.g. an unknown column name.
    Config(String),
    /// The logger could not be installed.
    Logger(log::SetLoggerError),
}

/// Shorthand used everywhere in this crate.
pub type FireSpotsResult<T> = Result<T, FireSpotsError>;

impl Display for FireSpotsError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        use FireSpotsError::*;

        match self {
            Io(err) => write!(f, "i/o error: {}", err),
            Csv(err) => write!(f, "csv error: {}", err),
            Zip(err) => write!(f, "zip error: {}", err),
            Parse(msg) => write!(f, "parse error: {}", msg),
            Config(msg) => write!(f, "configuration error: {}", msg),
            Logger(err) => write!(f, "logger error: {}", err),
        }
    }
}

impl Error for FireSpotsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use FireSpotsError::*;

        match self {
            Io(err) => Some(err),
            Csv(err) => Some(err),
            Zip(err) => Some(err),
            Logger(err) => Some(err),
            Parse(_) | Config(_) => None,
        }
    }
}

impl From<std::io::Error> for FireSpotsError {
    fn from(err: std::io::Error) -> Self {
        FireSpotsError::Io(err)
    }
}

impl From<csv::Error> for FireSpotsError {
    fn from(err: csv::Error) -> Self {
        FireSpotsError::Csv(err)
    }
}

impl From<zip::result::ZipError> for FireSpotsError {
    fn from(err: zip::result::ZipError) -> Self {
        FireSpotsError::Zip(err)
    }
}

impl From<walkdir::Error> for FireSpotsError {
    fn from(err: walkdir::Error) -> Self {
        FireSpotsError::Io(err.into())
    }
}

impl From<log::SetLoggerError> for FireSpotsError {
    fn from(err: log::SetLoggerError) -> Self {
        FireSpotsError::Logger(err)
    }
}
