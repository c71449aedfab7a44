// One error type for the whole sketch.
// Every variant states *where* things went wrong.
use std::fmt::{self, Display};

#[derive(Debug)]
pub enum Error {
    WindowInit(String),   // Creating the window failed
    WindowUpdate(String), // Updating the window buffer failed
    CameraInit(String),   // Opening/starting the camera failed
    CameraFrame(String),  // Grabbing/decoding a frame failed
    ConfigRead { path: String, source: std::io::Error },
    ConfigParse { path: String, source: toml::de::Error },
    ConfigWrite(String),
    InvalidConfig(String), // Parsed fine but the values make no sense
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WindowInit(s) => write!(f, "Window init error: {s}"),
            Error::WindowUpdate(s) => write!(f, "Window update error: {s}"),
            Error::CameraInit(s) => write!(f, "Camera init error: {s}"),
            Error::CameraFrame(s) => write!(f, "Camera frame error: {s}"),
            Error::ConfigRead { path, source } => write!(f, "Config read error ({path}): {source}"),
            Error::ConfigParse { path, source } => write!(f, "Config parse error ({path}): {source}"),
            Error::ConfigWrite(s) => write!(f, "Config write error: {s}"),
            Error::InvalidConfig(s) => write!(f, "Invalid config: {s}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ConfigRead { source, .. } => Some(source),
            Error::ConfigParse { source, .. } => Some(source),
            _ => None,
        }
    }
}
