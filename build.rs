use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output();

    let fallback = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    let version = match output {
        Ok(o) if o.status.success() => {
            let git_output = String::from_utf8(o.stdout)
                .unwrap_or_default()
                .trim()
                .to_string();

            // "v0.3.6" -> "0.3.6"
            let version = git_output.strip_prefix('v').unwrap_or(&git_output);

            if version.is_empty() {
                fallback
            } else if !version.starts_with(|c: char| c.is_ascii_digit()) {
                // Untagged checkout: describe yields a bare commit hash
                format!("{}+{}", fallback, version)
            } else {
                version.to_string()
            }
        }
        _ => fallback,
    };

    println!("cargo:rustc-env=STICKS_INSTALLER_VERSION={}", version);
}
