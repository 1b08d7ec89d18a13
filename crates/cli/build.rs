use std::env;
use std::process::Command;

/// Build metadata for `sheetsync --version`: commit and target triple.
fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/heads");
    // Source tarballs have no .git; packagers pass the commit instead.
    println!("cargo:rerun-if-env-changed=SHEETSYNC_GIT_HASH");

    let commit = env::var("SHEETSYNC_GIT_HASH")
        .ok()
        .filter(|hash| !hash.trim().is_empty())
        .or_else(git_short_hash)
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_COMMIT_HASH={}", commit.trim());

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=TARGET={}", target);
}

fn git_short_hash() -> Option<String> {
    let output = Command::new("git").args(["rev-parse", "--short=7", "HEAD"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}
