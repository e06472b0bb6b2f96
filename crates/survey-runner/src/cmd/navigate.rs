use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{InputArgs, print_json};
use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Args, Debug, Clone)]
pub struct NavigateArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Current location, e.g. /questionnaire/default-section/name-block/
    #[arg(long = "location", value_name = "URL")]
    pub location: Location,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct NavigateOutput {
    from: String,
    to: Option<String>,
    accessible: bool,
}

pub fn run(args: &NavigateArgs, direction: Direction) -> Result<()> {
    let (schema, state) = args.input.load()?;
    let router = state.router(&schema);
    let key = router.section_key_for(&args.location);
    let path = router.routing_path(&key.section_id, key.list_item_id())?;
    let accessible = router.can_access_location(&args.location, &path);

    let target = match direction {
        Direction::Next => Some(router.get_next_location_url(&args.location, &path)?),
        Direction::Previous => router.get_previous_location_url(&args.location, &path)?,
    };
    if args.json {
        return print_json(&NavigateOutput {
            from: args.location.url(),
            to: target,
            accessible,
        });
    }
    match target {
        Some(url) => println!("{url}"),
        None => println!("(start of questionnaire)"),
    }
    Ok(())
}
