use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidPhoneNumber { input: String },
    InvalidCode { input: String },
    MissingEnv { var: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::InvalidCode { input } => write!(f, "invalid registration code: {input}"),
            Self::MissingEnv { var } => write!(f, "environment variable {var} is required"),
        }
    }
}

impl std::error::Error for ValidationError {}
