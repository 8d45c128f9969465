//! Runtime settings
//!
//! Settings are layered: built-in defaults, then an optional `team-quiz`
//! file (TOML, JSON or YAML) in the working directory, then environment
//! variables prefixed with `TEAM_QUIZ__`, e.g. `TEAM_QUIZ__DEFAULT_TEAM_COUNT=3`.

use std::path::PathBuf;

use config::{Config, Environment, File, builder::DefaultState};
use garde::Validate;
use serde::Deserialize;
use thiserror::Error;

use crate::constants;

/// Base name of the optional settings file
const FILE_NAME: &str = "team-quiz";
/// Prefix of settings environment variables
const ENV_PREFIX: &str = "TEAM_QUIZ";

/// Errors that can occur while loading settings
#[derive(Error, Debug)]
pub enum Error {
    /// A settings source could not be read or deserialized
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    /// A setting is out of range
    #[error("invalid settings: {0}")]
    Invalid(#[from] garde::Report),
}

/// Settings of the quiz process
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// Location of the student list
    #[garde(skip)]
    pub students_path: PathBuf,
    /// Location of the question bank
    #[garde(skip)]
    pub questions_path: PathBuf,
    /// Team count proposed by the setup flow
    #[garde(range(min = crate::constants::teams::MIN_COUNT))]
    pub default_team_count: usize,
    /// `tracing` filter directive, e.g. `info` or `team_quiz=debug`
    #[garde(length(min = 1))]
    pub log_filter: String,
}

impl Settings {
    /// Loads settings from the defaults, the settings file and the environment
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] if a source is malformed and
    /// [`Error::Invalid`] if a value is out of range.
    pub fn load() -> Result<Self, Error> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(FILE_NAME).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .prefix_separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(builder: config::ConfigBuilder<DefaultState>) -> Result<Self, Error> {
        let settings: Self = builder
            .set_default("students_path", constants::data::STUDENTS_PATH)?
            .set_default("questions_path", constants::data::QUESTIONS_PATH)?
            .set_default("default_team_count", constants::teams::DEFAULT_COUNT as u64)?
            .set_default("log_filter", "info")?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}
