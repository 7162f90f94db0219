//! Build script for web-embed
//!
//! Copies viewer.json to OUT_DIR so the bundle ships with its configuration.

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest_path = Path::new(&out_dir).join("viewer.json");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let src_path = Path::new(&manifest_dir).join("viewer.json");

    if src_path.exists() {
        fs::copy(&src_path, &dest_path).expect("Failed to copy viewer.json");
        println!("cargo:rerun-if-changed={}", src_path.display());
    } else {
        // Every field has a default, so an empty object is a full config.
        fs::write(&dest_path, "{}").expect("Failed to write default viewer.json");
    }

    println!("cargo:rerun-if-changed=viewer.json");
}
