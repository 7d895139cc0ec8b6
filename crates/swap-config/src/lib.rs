//! Configuration loading with environment variable substitution.

use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

mod types;
pub use types::{ChainConfig, Config};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution.
///
/// `${VAR_NAME}` occurrences in the file body are replaced with the value of
/// the named environment variable before parsing, so credentials stay out of
/// checked-in files.
#[derive(Default)]
pub struct ConfigLoader {
	file_path: Option<String>,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub async fn load(&self) -> Result<Config, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;

		let config = self.load_from_file(file_path).await?;
		self.validate_config(&config)?;

		debug!(file = %file_path, "loaded configuration");
		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<Config, ConfigError> {
		let content = tokio::fs::read_to_string(file_path).await?;

		let substituted_content = self.substitute_env_vars(&content)?;

		let config: Config = toml::from_str(&substituted_content)
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn validate_config(&self, config: &Config) -> Result<(), ConfigError> {
		if config.chain.rpc_url.is_empty() {
			return Err(ConfigError::ValidationError(
				"chain.rpc_url must not be empty".to_string(),
			));
		}

		if config.chain.swap_code_hash.is_empty() {
			return Err(ConfigError::ValidationError(
				"chain.swap_code_hash must not be empty".to_string(),
			));
		}

		if config.chain.default_fee_per_byte.value() == 0 {
			return Err(ConfigError::ValidationError(
				"chain.default_fee_per_byte must be positive".to_string(),
			));
		}

		Ok(())
	}
}
