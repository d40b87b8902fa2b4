//! Golden-output tests for fwparam-codegen.
//!
//! Definitions and values are written to a temp directory and the generated
//! C is compared in full.

use std::path::Path;

use fwparam_codegen::{InitGenerator, struct_headers, write_headers};
use fwparam_config::{DefFile, ValueFile};
use fwparam_core::SystemConstants;
use tempfile::TempDir;

const SYS_DEFS: &str = r#"{
  "SYS": {
    "Persist": {
      "GlobalA": { "FractBits": 0, "UserMax": "", "UserMin": "", "List": "", "DSPConvert": "" }
    },
    "Profile": {
      "ArrayParam": { "FractBits": 23, "UserMax": "", "UserMin": "", "List": "",
                      "DSPConvert": 0.5, "Elements": 2 }
    }
  }
}"#;

const WDRC_DEFS: &str = r#"{
  "WDRC": {
    "Persist": {
      "AtkTC": { "FractBits": 23, "UserMax": 1000, "UserMin": 0, "List": "",
                 "DSPConvert": "WdrcTC", "Elements": 1 }
    },
    "Profile": {
      "Enable": { "FractBits": 0, "UserMax": 1, "UserMin": 0, "List": ["0=Off", "1=On"],
                  "DSPConvert": "" },
      "Gain":   { "FractBits": 16, "UserMax": "", "UserMin": "", "List": "",
                  "DSPConvert": "", "Elements": "NUM_CH" },
      "Knee":   { "FractBits": 20, "UserMax": "", "UserMin": "", "List": "",
                  "DSPConvert": "" }
    }
  }
}"#;

const VALUES: &str = r#"{
  "SYS":  { "0": { "GlobalA": 15 },
            "1": { "ArrayParam[0]": 1, "ArrayParam[1]": -0.5 } },
  "WDRC": { "0": { "AtkTC": 0 },
            "1": { "Enable": 1, "Gain[0]": 0.0, "Gain[1]": 2.5, "Knee": 9.2 },
            "2": { "Enable": 0 } }
}"#;

const EXPECTED_INIT: &str = "\
//++++++++++++++++++++++++++++++++++++++++++++++++++++++++++
//
// Parameter initialization code
//   Created from input file: ParamVals.json
//   Uses Profile 1
//
// Generated by fwparam. Do not edit by hand.
//
//++++++++++++++++++++++++++++++++++++++++++++++++++++++++++

#include \"Common.h\"

void FW_Param_Init()
{
// SYS Parameters

    SYS_Params.Persist.GlobalA = (15);

    SYS_Params.Profile.ArrayParam[0] = to_frac24(0.5);
    SYS_Params.Profile.ArrayParam[1] = to_frac24(-0.25);

// WDRC Parameters

    WDRC_Params.Persist.AtkTC = to_frac24(1.0);

    WDRC_Params.Profile.Enable = (1);
    WDRC_Params.Profile.Gain[0] = to_frac16(0.0);
    WDRC_Params.Profile.Gain[1] = to_frac16(2.5);
    WDRC_Params.Profile.Knee = 7.999999046325684;

}
";

const EXPECTED_WDRC_HEADER: &str = "\
//++++++++++++++++++++++++++++++++++++++++++++++++++++++++++
//
// WDRC Parameter Structures
//   Created from WDRC_ParamDef.json
//
// Generated by fwparam. Do not edit by hand.
//
//++++++++++++++++++++++++++++++++++++++++++++++++++++++++++

struct Persist_WDRC
{
    frac24_t    AtkTC;
};

struct Profile_WDRC
{
    int24_t     Enable;
    frac16_t    Gain[NUM_CH];
    frac20_t    Knee;
};

typedef struct _Params_WDRC
{
    struct Persist_WDRC    Persist;
    struct Profile_WDRC    Profile;

} strParams_WDRC;
";

fn setup() -> TempDir {
    let temp = TempDir::new().unwrap();
    let defs = temp.path().join("ParamDefs");
    std::fs::create_dir(&defs).unwrap();
    std::fs::write(defs.join("SYS_ParamDef.json"), SYS_DEFS).unwrap();
    std::fs::write(defs.join("WDRC_ParamDef.json"), WDRC_DEFS).unwrap();
    std::fs::write(temp.path().join("ParamVals.json"), VALUES).unwrap();
    temp
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn init_code_matches_golden() {
    let temp = setup();
    let sys = SystemConstants::DEFAULT;
    let values = ValueFile::load(temp.path().join("ParamVals.json")).unwrap();

    let mut generator = InitGenerator::new(&sys).with_defs_dir(temp.path().join("ParamDefs"));
    let output = generator.generate(&values).unwrap();

    assert_eq!(output.code, EXPECTED_INIT);
    assert_eq!(output.assignments, 8);
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].param, "Knee");
}

#[test]
fn other_profile_selects_other_memory() {
    let temp = setup();
    let sys = SystemConstants::DEFAULT;
    let values = ValueFile::load(temp.path().join("ParamVals.json")).unwrap();

    let output = InitGenerator::new(&sys)
        .with_defs_dir(temp.path().join("ParamDefs"))
        .with_profile(2)
        .generate(&values)
        .unwrap();

    assert!(output.code.contains("//   Uses Profile 2\n"));
    assert!(output.code.contains("    WDRC_Params.Profile.Enable = (0);\n"));
    assert!(!output.code.contains("ArrayParam"));
    assert!(output.code.contains("    WDRC_Params.Persist.AtkTC = to_frac24(1.0);\n"));
}

#[test]
fn generation_is_reproducible() {
    let temp = setup();
    let sys = SystemConstants::DEFAULT;
    let values = ValueFile::load(temp.path().join("ParamVals.json")).unwrap();
    let dir = temp.path().join("ParamDefs");

    let first = InitGenerator::new(&sys).with_defs_dir(&dir).generate(&values).unwrap();
    let second = InitGenerator::new(&sys).with_defs_dir(&dir).generate(&values).unwrap();
    assert_eq!(first, second);
}

#[test]
fn headers_match_golden_and_are_written() {
    let temp = setup();
    let sys = SystemConstants::DEFAULT;
    let files = DefFile::load_dir(&temp.path().join("ParamDefs"), &sys).unwrap();
    let headers = struct_headers(&files);

    assert_eq!(headers.len(), 2);
    assert_eq!(headers[1].file_name, "WDRC_ParamStruct.h");
    assert_eq!(headers[1].contents, EXPECTED_WDRC_HEADER);

    let out_dir = temp.path().join("Shared").join("include");
    let written = write_headers(&headers, &out_dir).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(read(&out_dir.join("WDRC_ParamStruct.h")), EXPECTED_WDRC_HEADER);
    assert!(read(&out_dir.join("SYS_ParamStruct.h")).contains("    frac24_t    ArrayParam[2];\n"));
}
