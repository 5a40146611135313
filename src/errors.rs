use thiserror::Error;

pub type Result<T> = std::result::Result<T, StudioError>;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("image generation failed: {0}")]
    Generation(String),

    #[error("could not parse model response: {0}")]
    Parse(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("remote model returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Other(String),
}

impl StudioError {
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Message shown to the visitor. Internal detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            StudioError::MissingConfig(_) => {
                "AI service not configured. Please add GOOGLE_AI_API_KEY to your environment."
                    .to_string()
            }
            StudioError::Parse(_) => "Could not read the designer's answer. Please try again.".to_string(),
            StudioError::InvalidImage(detail) => format!("That image can't be used: {detail}"),
            StudioError::InvalidRequest(detail) => format!("Invalid request: {detail}"),
            StudioError::UnknownPreset(name) => format!("There is no preset called {name:?}."),
            StudioError::Generation(_)
            | StudioError::Upstream { .. }
            | StudioError::Reqwest(_)
            | StudioError::SerdeJson(_)
            | StudioError::Io(_)
            | StudioError::Other(_) => "Could not generate image. Please try again.".to_string(),
        }
    }
}

impl From<anyhow::Error> for StudioError {
    fn from(value: anyhow::Error) -> Self {
        Self::Other(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_gets_setup_message() {
        let message = StudioError::MissingConfig("gemini.api_key").user_message();
        assert!(message.contains("GOOGLE_AI_API_KEY"));
    }

    #[test]
    fn remote_failures_share_one_message() {
        let upstream = StudioError::Upstream {
            status: 429,
            body: "quota".into(),
        };
        assert_eq!(
            upstream.user_message(),
            StudioError::generation("no image").user_message()
        );
    }
}
