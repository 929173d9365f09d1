use std::process::Command;

/// Trimmed stdout of a command, or `fallback` when it cannot run
fn command_output(program: &str, args: &[&str], fallback: &str) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn main() {
    let built_at = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let build_info = [
        ("GIT_HASH", command_output("git", &["rev-parse", "HEAD"], "")),
        (
            "GIT_BRANCH",
            command_output("git", &["rev-parse", "--abbrev-ref", "HEAD"], ""),
        ),
        (
            "RUSTC_VERSION",
            command_output("rustc", &["--version"], "unknown"),
        ),
        (
            "PROFILE",
            std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
        ),
        ("BUILD_TIME", built_at),
    ];
    for (key, value) in build_info {
        println!("cargo:rustc-env={}={}", key, value);
    }
}
