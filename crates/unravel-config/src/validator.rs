//! Configuration validation.

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_engine(config, &mut result);
        Self::validate_oracle(config, &mut result);

        result
    }

    fn validate_engine(config: &Config, result: &mut ValidationResult) {
        let engine = &config.engine;

        if engine.timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "engine.timeout_ms",
                "Timeout must be greater than 0",
            ));
        }

        if engine.optimizer_iterations == 0 {
            result.add_error(ValidationError::new(
                "engine.optimizer_iterations",
                "Optimizer needs at least one iteration",
            ));
        } else if engine.optimizer_iterations > 10 {
            result.add_warning(ValidationWarning::new(
                "engine.optimizer_iterations",
                "More than 10 iterations rarely simplifies further and slows large inputs",
            ));
        }

        if engine.oracle_snippet_limit == 0 {
            result.add_error(ValidationError::new(
                "engine.oracle_snippet_limit",
                "Snippet limit must be greater than 0",
            ));
        }
    }

    fn validate_oracle(config: &Config, result: &mut ValidationResult) {
        let oracle = &config.oracle;
        if !oracle.enabled {
            return;
        }

        if oracle.model.trim().is_empty() {
            result.add_error(ValidationError::new(
                "oracle.model",
                "Oracle is enabled but no model is configured",
            ));
        }

        if oracle.api_key.as_deref().is_none_or(str::is_empty) {
            result.add_warning(ValidationWarning::new(
                "oracle.api_key",
                "Oracle is enabled without an API key",
            ));
        }

        if !oracle.base_url.starts_with("http://") && !oracle.base_url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "oracle.base_url",
                format!("Invalid URL: {}", oracle.base_url),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
