//! Write `include/colorbar.h` for the C ABI.

use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| crate_dir.join("include").join("colorbar.h"));
    if let Some(dir) = out.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("COLORBAR_H")
        .with_cpp_compat(true)
        .generate()?;
    if !bindings.write_to_file(&out) {
        println!("{} is up to date", out.display());
    } else {
        println!("wrote {}", out.display());
    }
    Ok(())
}
