//! Implementation of the 'plan' subcommand: probe, plan and synthesize, but
//! never encode.

use std::path::Path;

use serde_json::json;

use crate::cli::PlanArgs;
use crate::commands::{build_orchestrator, default_scratch_dir, load_config, resolve_input};
use crate::error::CliResult;
use crate::output;

pub fn run_plan(args: PlanArgs, config_path: Option<&Path>, json: bool) -> CliResult<bool> {
    let input = resolve_input(&args.input)?;
    let config = load_config(config_path, &args.encoder)?;
    let ffmpeg = config.tools.ffmpeg.clone();
    let scratch_dir = args.scratch_dir.unwrap_or_else(default_scratch_dir);

    let orchestrator = build_orchestrator(config, false)?;
    let (plan, instructions) = orchestrator.plan_only(&input, &scratch_dir)?;

    if json {
        output::print_json(&json!({
            "source": input,
            "plan": plan,
            "output": instructions.output_path,
            "command": instructions.command_line(&ffmpeg),
            "args": instructions.args,
        }))?;
    } else {
        output::print_info("Source", input.display());
        output::print_plan(&plan, &instructions, &ffmpeg);
    }
    Ok(true)
}
