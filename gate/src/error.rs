use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("config error: {0}")]
    Config(String),
}
