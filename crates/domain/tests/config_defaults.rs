use cadence_domain::config::{Config, ConfigSeverity};

#[test]
fn default_host_binds_all_interfaces() {
    let config = Config::default();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3000);
}

#[test]
fn explicit_localhost_host_parses() {
    let toml_str = r#"
[server]
host = "127.0.0.1"
port = 8080
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn default_dag_dir_is_dagu_home() {
    let config = Config::default();
    assert_eq!(
        config.store.dag_dir,
        std::path::PathBuf::from("/home/dagu/dags")
    );
}

#[test]
fn default_matcher_targets_cluster_service() {
    let config = Config::default();
    assert!(config.matcher.host.ends_with("svc.cluster.local"));
    assert_eq!(config.matcher.port, 50051);
}

#[test]
fn default_scheduling_values() {
    let config = Config::default();
    assert_eq!(config.scheduling.default_timezone, "UTC");
    assert_eq!(config.scheduling.default_schedule, "0 */5 * * *");
}

#[test]
fn default_config_validates_with_only_cors_warning() {
    let config = Config::default();
    let issues = config.validate();
    assert!(issues
        .iter()
        .all(|i| i.severity == ConfigSeverity::Warning));
    assert!(issues
        .iter()
        .any(|i| i.field == "server.cors.allowed_origins"));
}

#[test]
fn zero_port_is_a_validation_error() {
    let toml_str = r#"
[server]
port = 0
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.severity == ConfigSeverity::Error && i.field == "server.port"));
}

#[test]
fn unknown_default_timezone_is_a_warning() {
    let toml_str = r#"
[scheduling]
default_timezone = "Mars/Olympus_Mons"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues.iter().any(|i| {
        i.severity == ConfigSeverity::Warning && i.field == "scheduling.default_timezone"
    }));
}

#[test]
fn config_error_display_carries_severity_tag() {
    let config: Config = toml::from_str("[server]\nport = 0\n").unwrap();
    let issues = config.validate();
    let rendered = issues
        .iter()
        .find(|i| i.field == "server.port")
        .unwrap()
        .to_string();
    assert!(rendered.starts_with("[ERROR] server.port:"));
}
