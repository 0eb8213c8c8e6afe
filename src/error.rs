// One error type for the whole app.
// Every variant states *where* things went wrong.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed (treated as "no surface": we log and quit quietly).
    #[error("Window init error: {0}")]
    WindowInit(String),

    /// Pushing a frame to an already-open window failed.
    #[error("Window update error: {0}")]
    WindowUpdate(String),

    /// Reading or decoding one of the background pictures failed.
    #[error("Image load error for {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// fluid-reveal.yaml could not be read, parsed or holds invalid values.
    #[error("Config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_stage() {
        assert_eq!(
            Error::WindowInit("no display".into()).to_string(),
            "Window init error: no display"
        );
        assert_eq!(
            Error::Config("decay must be in (0, 1]".into()).to_string(),
            "Config error: decay must be in (0, 1]"
        );
    }
}
