use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use survey_schema::QuestionnaireSchema;

use crate::state::QuestionnaireState;

pub mod navigate;
pub mod path;
pub mod status;
pub mod validate;

/// Schema and state files shared by every subcommand that routes.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    #[arg(long = "schema", value_name = "schema.json")]
    pub schema: PathBuf,
    /// Answers, lists, progress and metadata; an empty state when omitted
    #[arg(long = "state", value_name = "state.json")]
    pub state: Option<PathBuf>,
}

impl InputArgs {
    pub fn load(&self) -> Result<(QuestionnaireSchema, QuestionnaireState)> {
        let schema = load_schema(&self.schema)?;
        let state = match &self.state {
            Some(path) => load_state(path)?,
            None => QuestionnaireState::default(),
        };
        Ok((schema, state))
    }
}

pub fn load_schema(path: &Path) -> Result<QuestionnaireSchema> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    QuestionnaireSchema::from_json_str(&raw)
        .with_context(|| format!("invalid schema {}", path.display()))
}

pub fn load_state(path: &Path) -> Result<QuestionnaireState> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read state {}", path.display()))?;
    QuestionnaireState::from_json_str(&raw)
        .with_context(|| format!("invalid state {}", path.display()))
}

pub(crate) fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
