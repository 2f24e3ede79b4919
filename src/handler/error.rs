// Handler failures and the status each one maps to

use hyper::StatusCode;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Failed to read request body: {0}")]
    Body(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HandlerError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) | Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to return to the caller
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "Invalid JSON body",
            Self::Body(_) => "Invalid request body",
            Self::Store(_) => "Spreadsheet unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(HandlerError::from(json_err).status(), StatusCode::BAD_REQUEST);
        let store_err = StoreError::Config("x".into());
        let err = HandlerError::from(store_err);
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.public_message(), "Spreadsheet unavailable");
    }
}
