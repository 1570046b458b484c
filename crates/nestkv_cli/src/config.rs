//! Interpreter configuration.

/// Prompt used for interactive sessions when none is given.
pub const DEFAULT_PROMPT: &str = "> ";

/// How the read-eval-print loop presents itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplConfig {
    /// Printed before each request is read (`None` = no prompt).
    pub prompt: Option<String>,

    /// Whether to print the banner and command list on start.
    pub banner: bool,

    /// Whether to write every request line back to the output.
    pub echo: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: None,
            banner: true,
            echo: false,
        }
    }
}

impl ReplConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prompt.
    #[must_use]
    pub fn prompt(mut self, prompt: Option<String>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Sets whether to print the banner on start.
    #[must_use]
    pub const fn banner(mut self, value: bool) -> Self {
        self.banner = value;
        self
    }

    /// Sets whether to echo request lines.
    #[must_use]
    pub const fn echo(mut self, value: bool) -> Self {
        self.echo = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ReplConfig::default();
        assert_eq!(config.prompt, None);
        assert!(config.banner);
        assert!(!config.echo);
    }

    #[test]
    fn builder_pattern() {
        let config = ReplConfig::new()
            .prompt(Some(DEFAULT_PROMPT.to_string()))
            .banner(false)
            .echo(true);

        assert_eq!(config.prompt.as_deref(), Some("> "));
        assert!(!config.banner);
        assert!(config.echo);
    }
}
