// build.rs
//
// Stamps the binary with its build time and profile.

use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("build_info.rs");

    let build_date = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    fs::write(
        &dest_path,
        format!(
            "pub const BUILD_DATE: &str = \"{build_date}\";\n\
             pub const BUILD_PROFILE: &str = \"{profile}\";\n"
        ),
    )
    .expect("writing build_info.rs");

    // only re-run when the script changes, so the stamp is the last real build
    println!("cargo:rerun-if-changed=build.rs");
}
