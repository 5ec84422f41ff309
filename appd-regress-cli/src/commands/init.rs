//! `appd-regress init` command implementation.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use appd_regress::config::DEFAULT_USERNAME;
use appd_regress::paths::{DEFAULT_CUSTOM_METRIC_PATH, DEFAULT_THRESHOLD_METRIC};

use super::EXIT_SUCCESS;

/// Execute the `init` command.
///
/// Writes a starter configuration with the default thresholds. Refuses to
/// replace an existing file unless `force` is set.
pub fn execute(config_path: &Path, force: bool) -> Result<ExitCode> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}\n\
             Use `--force` to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(config_path, starter_config())?;
    eprintln!("Created {}", config_path.display());
    eprintln!("Set controller.uri and controller.application, and provide the password via APPD_PASSWORD.");

    Ok(ExitCode::from(EXIT_SUCCESS))
}

fn starter_config() -> String {
    format!(
        r#"# AppDynamics build regression gate

[controller]
# Controller base URI; /controller/rest/applications is appended when missing.
uri = "http://controller.example.com:8090"
# A username without "@tenant" is qualified with "@customer1".
username = "{DEFAULT_USERNAME}"
# Prefer the APPD_PASSWORD environment variable over storing the password here.
# password = ""
application = "My Application"

[gate]
# Scores below these percentages of the historical average mark the build
# unstable or failed. Both are clamped to [0, 100].
unstable_threshold = 80
failed_threshold = 65
# Shortest window fetched per build, clamped to [10, 1440] minutes.
minimum_duration_minutes = 10
# true for metrics like response times, false for throughput.
lower_is_better = true
# One of the paths listed by `appd-regress paths`, or "Custom metric path".
threshold_metric = "{DEFAULT_THRESHOLD_METRIC}"
custom_metric_path = "{DEFAULT_CUSTOM_METRIC_PATH}"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use appd_regress::{GateConfig, GateSettings};

    #[test]
    fn test_starter_config_parses_with_defaults() {
        let config = GateConfig::from_toml(&starter_config()).unwrap();
        assert_eq!(config.gate, GateSettings::default());
        assert_eq!(config.controller.username, DEFAULT_USERNAME);
        assert!(config.controller.password.is_empty());
    }
}
