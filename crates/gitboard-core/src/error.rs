use thiserror::Error;

/// Core error types shared across Gitboard crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid category key: {0}")]
    InvalidCategory(String),
}

impl CoreError {
    pub fn invalid_category(key: impl Into<String>) -> Self {
        Self::InvalidCategory(key.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_category_message_names_the_key() {
        let err = CoreError::invalid_category("Bad Key");
        assert_eq!(err.to_string(), "invalid category key: Bad Key");
    }
}
