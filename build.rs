use std::env;
use std::fs;
use std::path::PathBuf;

/// Build-time report layout, overridable from the environment
const LAYOUT_VARS: &[(&str, usize)] = &[("JOYSTICK_AXIS_COUNT", 6), ("JOYSTICK_BUTTON_COUNT", 16)];

fn main() {
    let mut out = String::from("// Generated by build.rs from the environment. Do not edit.\n");

    for &(name, default) in LAYOUT_VARS {
        println!("cargo:rerun-if-env-changed={name}");
        let value = match env::var(name) {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .unwrap_or_else(|_| panic!("{name} must be a non-negative integer, got {raw:?}")),
            Err(_) => default,
        };
        out.push_str(&format!("pub const {name}: usize = {value};\n"));
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out_dir.join("layout.rs"), out).expect("failed to write layout.rs");
    println!("cargo:rerun-if-changed=build.rs");
}
