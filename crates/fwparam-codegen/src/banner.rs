//! File banner for generated C.

const RULE: &str = "//++++++++++++++++++++++++++++++++++++++++++++++++++++++++++";

/// Banner comment block: a title line, indented detail lines, and a
/// do-not-edit notice, followed by one blank line.
///
/// No timestamp is included, so regenerating from unchanged inputs gives
/// identical output.
///
/// ```rust
/// use fwparam_codegen::banner;
///
/// let text = banner("WDRC Parameter Structures", &["Created from WDRC_ParamDef.json"]);
/// assert!(text.starts_with("//+++"));
/// assert!(text.contains("// WDRC Parameter Structures\n//   Created from WDRC_ParamDef.json\n"));
/// assert!(text.ends_with("+\n\n"));
/// ```
pub fn banner(title: &str, details: &[&str]) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push_str("\n//\n");
    out.push_str(&format!("// {title}\n"));
    for line in details {
        out.push_str(&format!("//   {line}\n"));
    }
    out.push_str("//\n");
    out.push_str("// Generated by fwparam. Do not edit by hand.\n");
    out.push_str("//\n");
    out.push_str(RULE);
    out.push_str("\n\n");
    out
}
