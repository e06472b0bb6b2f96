use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{InputArgs, print_json};
use crate::progress_store::CompletionStatus;

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct SectionStatus {
    section_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    list_item_id: Option<String>,
    status: CompletionStatus,
    locations: usize,
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    resume_at: Option<String>,
    hub_accessible: bool,
    sections: Vec<SectionStatus>,
}

pub fn run(args: &StatusArgs) -> Result<()> {
    let (schema, state) = args.input.load()?;
    let router = state.router(&schema);

    let sections = router
        .enabled_section_instances()
        .into_iter()
        .map(|key| SectionStatus {
            status: router.section_status(&key.section_id, key.list_item_id()),
            locations: router.instance_path(&key).len(),
            section_id: key.section_id,
            list_item_id: key.list_item_id,
        })
        .collect();
    let output = StatusOutput {
        complete: router.is_survey_complete(),
        resume_at: router
            .get_first_incomplete_location_in_survey()
            .map(|location| location.url()),
        hub_accessible: router.can_access_hub(),
        sections,
    };

    if args.json {
        return print_json(&output);
    }
    for section in &output.sections {
        let label = match &section.list_item_id {
            Some(item) => format!("{} [{item}]", section.section_id),
            None => section.section_id.clone(),
        };
        println!("{label}: {:?} ({} locations)", section.status, section.locations);
    }
    println!("complete: {}", output.complete);
    if let Some(url) = &output.resume_at {
        println!("resume at: {url}");
    }
    Ok(())
}
