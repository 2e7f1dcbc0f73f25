//! Validation trait definition

/// Validation trait for configuration structures
pub trait Validate {
    /// Describe the first problem found, if any
    fn validate(&self) -> Result<(), String>;
}
