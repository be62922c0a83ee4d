//! CG-000: Crate error type.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// All failures surfaced by the library.
///
/// Schema violations are not errors in this sense: the validator collects
/// them as [`crate::core::parser::ValidationError`] lists.
#[derive(Debug)]
pub enum CfnError {
    /// Filesystem failure, with the path involved.
    Io(String),
    /// Template text could not be parsed (YAML/JSON syntax or shape).
    Parse(String),
    /// A value could not be rendered into CloudFormation JSON.
    Render(String),
    /// The template is structurally unusable (bad id, duplicate, etc.).
    Template(String),
    /// An `AWS::Glue::*` type this crate does not model.
    UnsupportedType(String),
    /// Resources depend on each other in a loop.
    Cycle(Vec<String>),
    /// Settings file could not be read.
    Config(String),
}

impl Display for CfnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CfnError::Io(desc) => write!(f, "I/O error: {}", desc),
            CfnError::Parse(desc) => write!(f, "parse error: {}", desc),
            CfnError::Render(desc) => write!(f, "render error: {}", desc),
            CfnError::Template(desc) => write!(f, "template error: {}", desc),
            CfnError::UnsupportedType(t) => write!(f, "unsupported Glue resource type: {}", t),
            CfnError::Cycle(members) => write!(
                f,
                "dependency cycle detected involving: {}",
                members.join(", ")
            ),
            CfnError::Config(desc) => write!(f, "config error: {}", desc),
        }
    }
}

impl Error for CfnError {}

impl From<serde_json::Error> for CfnError {
    fn from(error: serde_json::Error) -> Self {
        CfnError::Parse(error.to_string())
    }
}

impl From<serde_yaml_ng::Error> for CfnError {
    fn from(error: serde_yaml_ng::Error) -> Self {
        CfnError::Parse(error.to_string())
    }
}

/// Result type for operations that can fail with a [`CfnError`].
pub type Result<T> = std::result::Result<T, CfnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cg000_cycle_display() {
        let e = CfnError::Cycle(vec!["A".to_string(), "B".to_string()]);
        assert_eq!(e.to_string(), "dependency cycle detected involving: A, B");
    }

    #[test]
    fn test_cg000_from_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: CfnError = err.into();
        assert!(matches!(e, CfnError::Parse(_)));
    }

    #[test]
    fn test_cg000_unsupported_display() {
        let e = CfnError::UnsupportedType("AWS::Glue::Nope".to_string());
        assert!(e.to_string().contains("AWS::Glue::Nope"));
    }
}
