//! Build script - embeds the source revision for the startup log

use std::process::Command;

fn main() {
    println!("cargo:rustc-env=BUILD_REV={}", build_rev());
    println!("cargo:rerun-if-changed=.git/HEAD");
}

/// Short describe of the working tree (`--dirty` marks local edits),
/// or "unknown" outside a git checkout
fn build_rev() -> String {
    Command::new("git")
        .args(["describe", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
