use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown log target: {0}")]
    UnknownLogTarget(String),

    #[error("Unknown traffic kind: {0}")]
    UnknownTrafficKind(String),

    #[error("Unknown toggle action: {0} (expected on/off)")]
    UnknownToggle(String),
}
