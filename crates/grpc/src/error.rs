use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrpcError {
    #[error("failed to connect to {0}")]
    Connect(String),

    #[error("upstream call failed: {0}")]
    Call(#[from] tonic::Status),

    #[error("upstream call timed out")]
    Timeout,
}
