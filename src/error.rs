use thiserror::Error;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Please select at least one parameter.")]
    EmptySelection,
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("{0}")]
    Transport(String),
    #[error("response page carries no chart data")]
    MissingHydration,
    #[error("malformed chart data: {0}")]
    Hydration(String),
    #[error("missing render target #{0}")]
    MissingTarget(&'static str),
    #[error("chart backend: {0}")]
    Chart(String),
    #[error("page rendering: {0}")]
    Render(String),
}

impl From<reqwest::Error> for WizardError {
    fn from(e: reqwest::Error) -> Self {
        WizardError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for WizardError {
    fn from(e: serde_json::Error) -> Self {
        WizardError::Hydration(e.to_string())
    }
}

impl From<askama::Error> for WizardError {
    fn from(e: askama::Error) -> Self {
        WizardError::Render(e.to_string())
    }
}
