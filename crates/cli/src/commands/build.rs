use std::path::PathBuf;
use std::process::Command;

use mcengine_shared::config::NATIVE_LIB_ENV;

const KERNEL_PACKAGE: &str = "mc-core";

fn library_file_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "libmc_core.dylib"
    } else if cfg!(target_os = "windows") {
        "mc_core.dll"
    } else {
        "libmc_core.so"
    }
}

pub fn run(release: bool) -> anyhow::Result<()> {
    println!("Building native kernel ({})...", KERNEL_PACKAGE);
    let mut cmd = Command::new("cargo");
    cmd.arg("build").arg("-p").arg(KERNEL_PACKAGE);
    if release {
        cmd.arg("--release");
    }
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("Native build failed");
    }

    let target_dir = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("target"));
    let lib = target_dir
        .join(if release { "release" } else { "debug" })
        .join(library_file_name());
    if !lib.exists() {
        anyhow::bail!("Build succeeded but {} was not found", lib.display());
    }
    let lib = lib.canonicalize()?;

    println!("  Native: {}", lib.display());
    println!("\nUse it:");
    println!("  mcengine validate {}", lib.display());
    println!("  {}={} mcengine price --backend accelerated", NATIVE_LIB_ENV, lib.display());
    Ok(())
}
