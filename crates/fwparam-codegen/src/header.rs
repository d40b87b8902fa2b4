//! Parameter struct headers (`<Module>_ParamStruct.h`).
//!
//! One header per module: a struct per declared space, then the module's
//! top-level `strParams_<Module>` typedef holding them.
//!
//! ```c
//! struct Persist_WDRC
//! {
//!     frac24_t    AtkTC;
//! };
//!
//! typedef struct _Params_WDRC
//! {
//!     struct Persist_WDRC    Persist;
//!
//! } strParams_WDRC;
//! ```

use std::path::{Path, PathBuf};

use fwparam_config::paths::{ensure_dir, struct_header_name};
use fwparam_config::{ConfigError, DefFile, ModuleDefs};

use crate::banner::banner;
use crate::literal::c_type;

/// A generated header, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFile {
    /// Module the header declares.
    pub module: String,
    /// File name (`<Module>_ParamStruct.h`).
    pub file_name: String,
    /// Header text.
    pub contents: String,
}

/// Render the struct header for `module`. `source_name` is quoted in the
/// banner.
pub fn struct_header(module: &ModuleDefs, source_name: &str) -> String {
    let name = &module.name;
    let created_from = format!("Created from {source_name}");
    let mut out = banner(&format!("{name} Parameter Structures"), &[&created_from]);

    for space in &module.spaces {
        out.push_str(&format!("struct {}_{name}\n{{\n", space.space));
        for param in &space.params {
            let ty = c_type(param.descriptor.format);
            let suffix = param.elements.declarator_suffix();
            out.push_str(&format!("    {ty:<8}    {}{suffix};\n", param.name));
        }
        out.push_str("};\n\n");
    }

    out.push_str(&format!("typedef struct _Params_{name}\n{{\n"));
    for space in &module.spaces {
        let kind = space.space;
        out.push_str(&format!("    struct {kind}_{name}    {kind};\n"));
    }
    out.push_str(&format!("\n}} strParams_{name};\n"));
    out
}

/// Render one header per module of every file, in file then module order.
pub fn struct_headers(files: &[DefFile]) -> Vec<HeaderFile> {
    files
        .iter()
        .flat_map(|file| {
            let source_name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            file.modules.iter().map(move |module| HeaderFile {
                module: module.name.clone(),
                file_name: struct_header_name(&module.name),
                contents: struct_header(module, &source_name),
            })
        })
        .collect()
}

/// Write headers into `out_dir`, creating it if needed.
///
/// Returns the paths written, in order.
pub fn write_headers(headers: &[HeaderFile], out_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    ensure_dir(out_dir)?;
    headers
        .iter()
        .map(|header| {
            let path = out_dir.join(&header.file_name);
            std::fs::write(&path, &header.contents)
                .map_err(|e| ConfigError::write_file(&path, e))?;
            tracing::info!(module = %header.module, path = %path.display(), "wrote struct header");
            Ok(path)
        })
        .collect()
}
