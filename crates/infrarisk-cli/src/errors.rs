use console::style;
use infrarisk_core::InfraRiskError;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), context: None, suggestions: Vec::new(), help_command: None }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for a missing catalog API key
pub fn api_key_missing() -> CliError {
    CliError::new("Catalog API key not configured")
        .with_context("Fetching from the catalog requires an API key.")
        .with_suggestion("Pass it directly: infrarisk fetch --api-key <KEY> ...")
        .with_suggestion("Or set INFRARISK_API_KEY in the environment")
        .with_suggestion("Or add `api_key = \"...\"` to infrarisk.toml")
        .with_suggestion("Or try the offline sample catalog: infrarisk fetch --sample ...")
        .with_help("Run: infrarisk fetch --help")
}

/// Create error for a dataset preset that needs a search term
pub fn term_required(dataset: &str) -> CliError {
    CliError::new(format!("A search term is required for {}", dataset))
        .with_context(format!(
            "The {} preset searches one catalog dataset for a region name.",
            dataset
        ))
        .with_suggestion(format!("Name a region: infrarisk fetch --dataset {} --term 広島県", dataset))
        .with_help("Run: infrarisk fetch --help")
}

/// Create error for a missing entity file
pub fn entity_file_not_found(path: &str) -> CliError {
    CliError::new("Entity file not found")
        .with_context(format!("The specified entity file does not exist.\n\nPath: {}", path))
        .with_suggestion("Fetch a dataset first: infrarisk fetch --dataset bridge --term <region>")
        .with_suggestion("Or write the sample datasets: infrarisk sample")
        .with_help("Run: infrarisk analyze --help")
}

/// Create error for an unreadable entity file
pub fn entity_file_invalid(path: &str, reason: &str) -> CliError {
    CliError::new("Entity file could not be read")
        .with_context(format!("Path: {}\nReason: {}", path, reason))
        .with_suggestion("Entity files hold a JSON array of entities or the output of `infrarisk fetch`")
        .with_help("Run: infrarisk analyze --help")
}

/// Create error for invalid configuration
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check infrarisk.toml and INFRARISK_* environment variables")
        .with_help("Run: infrarisk config")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    let error = match error.downcast::<CliError>() {
        Ok(cli_error) => return cli_error,
        Err(error) => error,
    };

    if let Some(core_error) = error.chain().find_map(|e| e.downcast_ref::<InfraRiskError>()) {
        match core_error {
            InfraRiskError::ConfigMissing { key } if key == "api_key" => return api_key_missing(),
            InfraRiskError::ConfigInvalid { key, reason } => return invalid_config(key, reason),
            _ => {}
        }
    }

    let message = format!("{:#}", error);
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("Permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(message)
    }
}
