use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("points must be positive")]
    NonPositivePoints,

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
