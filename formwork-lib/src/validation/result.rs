/// Verdict of evaluating one rule against a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValidationResult {
    /// The rule passed.
    #[default]
    Valid,
    /// The rule failed; carries the rule key (e.g. `"required"`).
    Invalid(String),
}

impl ValidationResult {
    /// Creates a failing verdict for the given rule key.
    pub fn invalid(key: impl Into<String>) -> Self {
        Self::Invalid(key.into())
    }

    /// Check if the rule passed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Check if the rule failed.
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Get the failing rule key (if any).
    pub fn error_key(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(key) => Some(key),
        }
    }
}
