use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapmError {
    /// Series share no usable dates, or a table's shape is inconsistent.
    #[error("Data alignment error: {0}")]
    DataAlignment(String),

    /// A price is non-positive or non-finite where a ratio is required.
    #[error("Data validity error: {0}")]
    DataValidity(String),

    /// Beta is undefined for the given sample.
    #[error("Degenerate regression: {0}")]
    DegenerateRegression(String),

    #[error("Missing stock: {0}")]
    MissingStock(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The price source could not deliver a series.
    #[error("Data source error: {0}")]
    DataSource(String),
}

pub type Result<T> = std::result::Result<T, CapmError>;

impl CapmError {
    /// Prefix the message with the name of the series or stock involved.
    pub fn context(self, subject: &str) -> Self {
        match self {
            CapmError::DataAlignment(m) => CapmError::DataAlignment(format!("{subject}: {m}")),
            CapmError::DataValidity(m) => CapmError::DataValidity(format!("{subject}: {m}")),
            CapmError::DegenerateRegression(m) => {
                CapmError::DegenerateRegression(format!("{subject}: {m}"))
            }
            CapmError::InvalidConfig(m) => CapmError::InvalidConfig(format!("{subject}: {m}")),
            CapmError::DataSource(m) => CapmError::DataSource(format!("{subject}: {m}")),
            missing @ CapmError::MissingStock(_) => missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_kind() {
        let err = CapmError::DegenerateRegression("zero variance".to_string()).context("AAPL");
        assert_eq!(
            err,
            CapmError::DegenerateRegression("AAPL: zero variance".to_string())
        );
        assert_eq!(err.to_string(), "Degenerate regression: AAPL: zero variance");
    }

    #[test]
    fn test_context_leaves_missing_stock_alone() {
        let err = CapmError::MissingStock("TSLA".to_string()).context("TSLA");
        assert_eq!(err, CapmError::MissingStock("TSLA".to_string()));
    }
}
