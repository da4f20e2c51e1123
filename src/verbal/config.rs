use crate::error::{Result, VerbalError};
use crate::model::same_name;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "verbal.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

/// Executor settings, stored in verbal.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutorOptions {
    /// Short form of the help flag
    pub help_short_form: char,

    /// Long form of the help flag, matched case-insensitively
    pub help_long_form: String,

    pub version_short_form: char,

    pub version_long_form: String,

    /// Show positional values before `[Options]` in command usage lines
    pub values_first: bool,

    /// Program name used in usage lines; the executable's file stem when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,

    pub color: ColorChoice,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            help_short_form: 'h',
            help_long_form: "help".to_string(),
            version_short_form: 'v',
            version_long_form: "version".to_string(),
            values_first: true,
            program_name: None,
            color: ColorChoice::Auto,
        }
    }
}

impl ExecutorOptions {
    /// Load options from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let options: ExecutorOptions = serde_json::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Rejects flag forms the tokenizer could never produce.
    pub fn validate(&self) -> Result<()> {
        for (what, c) in [
            ("help", self.help_short_form),
            ("version", self.version_short_form),
        ] {
            if c == '-' || c.is_whitespace() {
                return Err(VerbalError::Config(format!(
                    "Invalid short form `{}` for the {} flag",
                    c, what
                )));
            }
        }
        for (what, long) in [
            ("help", &self.help_long_form),
            ("version", &self.version_long_form),
        ] {
            if long.is_empty() || long.contains(['=', '"', '\'']) || long.contains(char::is_whitespace) {
                return Err(VerbalError::Config(format!(
                    "Invalid long form `{}` for the {} flag",
                    long, what
                )));
            }
        }
        if self.help_short_form == self.version_short_form
            || same_name(&self.help_long_form, &self.version_long_form)
        {
            return Err(VerbalError::Config(
                "Help and version flags must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_program_name(mut self, name: &str) -> Self {
        self.program_name = Some(name.to_string());
        self
    }

    pub fn program_name(&self) -> String {
        self.program_name.clone().unwrap_or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
                .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
        })
    }
}
