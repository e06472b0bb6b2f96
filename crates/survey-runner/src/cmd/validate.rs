use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::{load_schema, print_json};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(long = "schema", value_name = "schema.json")]
    pub schema: PathBuf,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ValidateOutput<'a> {
    survey_id: &'a str,
    sections: usize,
    blocks: usize,
    lists: Vec<&'a str>,
    hub: bool,
}

pub fn run(args: &ValidateArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let output = ValidateOutput {
        survey_id: &schema.survey_id,
        sections: schema.sections.len(),
        blocks: schema
            .sections
            .iter()
            .map(|section| section.all_blocks().count())
            .sum(),
        lists: schema.list_names().into_iter().collect(),
        hub: schema.is_hub_enabled(),
    };
    if args.json {
        return print_json(&output);
    }
    println!(
        "{}: ok ({} sections, {} blocks)",
        output.survey_id, output.sections, output.blocks
    );
    Ok(())
}
