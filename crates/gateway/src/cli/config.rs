use cadence_domain::config::{Config, ConfigSeverity};

/// Parse and validate the config, printing every finding.
///
/// Returns `false` when at least one error-severity finding exists, so
/// `main` can exit nonzero.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();
    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    for issue in &issues {
        println!("{issue}");
    }

    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    println!(
        "\n{config_path}: {error_count} error(s), {} warning(s)",
        issues.len() - error_count
    );

    error_count == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
