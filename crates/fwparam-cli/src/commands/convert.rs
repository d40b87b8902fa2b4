//! Single-value conversion command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use fwparam_codegen::{c_literal, c_type};
use fwparam_config::{MemorySpace, ModuleDefs, ParamDef, RoundingMode};
use fwparam_core::{ConversionResult, Converter, IntegerRounding};

use super::common::{Project, RoundingArg, SpaceArg, describe_legal, short_num};

#[derive(Args)]
pub struct ConvertArgs {
    /// Module name (e.g. WDRC)
    #[arg(value_name = "MODULE")]
    module: String,

    /// Parameter name, with an index for array parameters (e.g. Gain[2])
    #[arg(value_name = "PARAM")]
    param: String,

    /// Value in user units
    #[arg(value_name = "VALUE", allow_negative_numbers = true)]
    value: f64,

    /// Memory space to look in (default: whichever declares the parameter)
    #[arg(long, value_enum)]
    space: Option<SpaceArg>,

    /// Directory of *_ParamDef.json files (default: from project config)
    #[arg(long, value_name = "DIR")]
    defs: Option<PathBuf>,

    /// Integer rounding (default: from project config, else truncate)
    #[arg(long, value_enum)]
    rounding: Option<RoundingArg>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ConvertArgs, project: &Project) -> anyhow::Result<()> {
    let defs = ModuleDefs::load(&project.defs_dir(args.defs.clone()), &args.module, &project.constants)?;
    let base = args.param.split('[').next().unwrap_or(&args.param).trim();
    let (space, param) = find_param(&defs, base, args.space.map(MemorySpace::from))?;

    let rounding: IntegerRounding = args
        .rounding
        .map_or(project.config.integer_rounding, RoundingMode::from)
        .into();
    let converter = Converter::new(&project.constants).with_rounding(rounding);
    let name = format!("{}.{}", args.module, args.param);
    let result = converter
        .convert(args.value, &param.descriptor, &name)
        .with_context(|| format!("cannot convert {name}"))?;

    if result.value.is_invalid() {
        anyhow::bail!(
            "{name}: {} is not a legal value ({})",
            args.value,
            describe_legal(param.descriptor.legal.as_ref())
        );
    }

    if args.json {
        print_json(&args, space, param, &result)?;
    } else {
        print_text(&args, space, param, &result);
    }
    Ok(())
}

fn find_param<'a>(
    defs: &'a ModuleDefs,
    name: &str,
    space: Option<MemorySpace>,
) -> anyhow::Result<(MemorySpace, &'a ParamDef)> {
    let spaces: Vec<MemorySpace> = match space {
        Some(space) => vec![space],
        None => MemorySpace::ALL.to_vec(),
    };
    let mut found = spaces
        .into_iter()
        .filter_map(|space| defs.param(space, name).map(|p| (space, p)));
    let first = found
        .next()
        .ok_or_else(|| anyhow::anyhow!("{}: no parameter named {name}", defs.name))?;
    if found.next().is_some() {
        anyhow::bail!(
            "{}: {name} is declared in both memory spaces, pass --space",
            defs.name
        );
    }
    Ok(first)
}

/// 24-bit two's complement word for the converted value.
fn raw_word(param: &ParamDef, result: &ConversionResult) -> Option<u32> {
    let value = result.value.as_f64()?;
    let raw = param.descriptor.format.to_raw(value)?;
    Some(raw as u32 & 0x00FF_FFFF)
}

fn print_text(args: &ConvertArgs, space: MemorySpace, param: &ParamDef, result: &ConversionResult) {
    let desc = &param.descriptor;
    let range = desc
        .user_range
        .map_or_else(|| "-".to_string(), |r| format!("[{}, {}]", short_num(r.min), short_num(r.max)));

    println!("{}.{} ({space})", args.module, param.name);
    println!("  Type:       {} (F = {})", c_type(desc.format), desc.format.fract_bits());
    println!("  Elements:   {}", param.elements);
    println!("  Conversion: {}", desc.conversion);
    println!("  User range: {range}");
    println!("  Legal:      {}", describe_legal(desc.legal.as_ref()));
    println!(
        "  FW limits:  [{}, {}]",
        short_num(result.limits.min),
        short_num(result.limits.max)
    );
    println!();
    println!("  Input:      {}", args.value);
    println!("  Firmware:   {}", result.value);
    if let Some(raw) = raw_word(param, result) {
        println!("  Raw word:   0x{raw:06X}");
    }
    if let Some(literal) = c_literal(result.value, desc.format) {
        println!("  C literal:  {literal}");
    }
    if let Some(violation) = result.range {
        println!("  Note:       value was {violation}, limited");
    }
}

fn print_json(
    args: &ConvertArgs,
    space: MemorySpace,
    param: &ParamDef,
    result: &ConversionResult,
) -> anyhow::Result<()> {
    let desc = &param.descriptor;
    let report = serde_json::json!({
        "module": args.module,
        "param": param.name,
        "space": space.as_str(),
        "type": c_type(desc.format),
        "fract_bits": desc.format.fract_bits(),
        "conversion": desc.conversion.to_string(),
        "user_range": desc.user_range.map(|r| [r.min, r.max]),
        "legal": describe_legal(desc.legal.as_ref()),
        "limits": [result.limits.min, result.limits.max],
        "input": args.value,
        "value": result.value.as_f64(),
        "raw": raw_word(param, result).map(|raw| format!("0x{raw:06X}")),
        "literal": c_literal(result.value, desc.format),
        "clamped": result.range.map(|v| v.describe()),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
