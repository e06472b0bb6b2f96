use anyhow::Result;
use clap::Args;

use super::{InputArgs, print_json};
use crate::location::Location;

#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Section to route; the whole questionnaire when omitted
    #[arg(long = "section", value_name = "SECTION_ID")]
    pub section: Option<String>,
    #[arg(long = "list-item", value_name = "LIST_ITEM_ID", requires = "section")]
    pub list_item: Option<String>,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: &PathArgs) -> Result<()> {
    let (schema, state) = args.input.load()?;
    let router = state.router(&schema);
    let path = match &args.section {
        Some(section_id) => router.routing_path(section_id, args.list_item.as_deref())?,
        None => router.full_routing_path(),
    };
    if args.json {
        let urls: Vec<String> = path.iter().map(Location::url).collect();
        return print_json(&urls);
    }
    for location in &path {
        println!("{location}");
    }
    Ok(())
}
