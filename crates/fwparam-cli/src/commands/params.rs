//! Parameter listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use std::path::PathBuf;

use clap::Args;
use fwparam_codegen::c_type;
use fwparam_config::{ModuleDefs, ParamDef, ParamSpace};
use fwparam_core::SystemConstants;

use super::common::{Project, describe_legal, short_num};

#[derive(Args)]
pub struct ParamsArgs {
    /// Module name (e.g. WDRC)
    #[arg(value_name = "MODULE")]
    module: String,

    /// Directory of *_ParamDef.json files (default: from project config)
    #[arg(long, value_name = "DIR")]
    defs: Option<PathBuf>,

    /// Print the parameters as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ParamsArgs, project: &Project) -> anyhow::Result<()> {
    let defs = ModuleDefs::load(&project.defs_dir(args.defs), &args.module, &project.constants)?;

    if args.json {
        let report = serde_json::json!({
            "module": defs.name,
            "spaces": defs
                .spaces
                .iter()
                .map(|space| space_json(space, &project.constants))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", defs.name);
    println!("{}", "=".repeat(defs.name.len()));
    for space in &defs.spaces {
        println!();
        println!("{} ({} parameters):", space.space, space.params.len());
        println!();
        println!(
            "  {:16}  {:9}  {:8}  {:18}  {:14}  {:12}  {}",
            "Name", "Type", "Elements", "Range", "Legal", "Conversion", "FW limits"
        );
        println!(
            "  {:16}  {:9}  {:8}  {:18}  {:14}  {:12}  {}",
            "----", "----", "--------", "-----", "-----", "----------", "---------"
        );
        for param in &space.params {
            let row = Row::new(param, &project.constants);
            println!(
                "  {:16}  {:9}  {:8}  {:18}  {:14}  {:12}  {}",
                param.name, row.c_type, row.elements, row.range, row.legal, row.conversion, row.limits
            );
        }
    }
    Ok(())
}

/// Display columns of one parameter.
struct Row {
    c_type: String,
    elements: String,
    range: String,
    legal: String,
    conversion: String,
    limits: String,
}

impl Row {
    fn new(param: &ParamDef, constants: &SystemConstants) -> Self {
        let desc = &param.descriptor;
        let limits = desc.firmware_limits(constants);
        Self {
            c_type: c_type(desc.format),
            elements: param.elements.to_string(),
            range: desc.user_range.map_or_else(
                || "-".to_string(),
                |r| format!("[{}, {}]", short_num(r.min), short_num(r.max)),
            ),
            legal: describe_legal(desc.legal.as_ref()),
            conversion: desc.conversion.to_string(),
            limits: format!("[{}, {}]", short_num(limits.min), short_num(limits.max)),
        }
    }
}

fn space_json(space: &ParamSpace, constants: &SystemConstants) -> serde_json::Value {
    let params: Vec<_> = space
        .params
        .iter()
        .map(|param| {
            let desc = &param.descriptor;
            let limits = desc.firmware_limits(constants);
            serde_json::json!({
                "name": param.name,
                "type": c_type(desc.format),
                "fract_bits": desc.format.fract_bits(),
                "elements": param.elements.to_string(),
                "user_range": desc.user_range.map(|r| [r.min, r.max]),
                "legal": describe_legal(desc.legal.as_ref()),
                "conversion": desc.conversion.to_string(),
                "limits": [limits.min, limits.max],
            })
        })
        .collect();
    serde_json::json!({ "space": space.space.as_str(), "params": params })
}
