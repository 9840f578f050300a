//! Layered configuration: compiled defaults, then an optional TOML file,
//! then environment variables (§6). Mirrors the teacher's own practice of
//! letting env vars override a file which overrides hardcoded defaults.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use serde::Deserialize;
use terra_core::{Configuration, Money};

/// Compiled-in defaults for a fresh build's [`Configuration`]. Every field is
/// hand-built since `Configuration` carries no `Default` impl of its own —
/// these values are reasonable starting variances, not ones observed in any
/// real book of business.
pub fn default_configuration() -> Configuration {
    Configuration {
        customer_target_arr: Money::coerce(500_000.0),
        customer_max_arr: Money::coerce(750_000.0),
        prospect_target_arr: Money::coerce(250_000.0),
        cre_variance: 0.15,
        atr_variance: 0.15,
        tier1_variance: 0.15,
        tier2_variance: 0.15,
        renewal_concentration_max: 0.35,
        capacity_variance_percent: 0.20,
        score_weight_continuity: 0.4,
        score_weight_geography: 0.35,
        score_weight_team_tier: 0.25,
        cre_count_threshold: 2,
        renewal_soon_window_days: 90,
        recent_change_window_days: 60,
        territory_mappings: HashMap::new(),
        thresholds: None,
    }
}

/// Subset of [`Configuration`] that a TOML file may override. Fields absent
/// from the file fall back to the compiled default.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    customer_target_arr: Option<f64>,
    customer_max_arr: Option<f64>,
    prospect_target_arr: Option<f64>,
    cre_variance: Option<f64>,
    atr_variance: Option<f64>,
    tier1_variance: Option<f64>,
    tier2_variance: Option<f64>,
    renewal_concentration_max: Option<f64>,
    capacity_variance_percent: Option<f64>,
    score_weight_continuity: Option<f64>,
    score_weight_geography: Option<f64>,
    score_weight_team_tier: Option<f64>,
    cre_count_threshold: Option<u32>,
    renewal_soon_window_days: Option<i64>,
    recent_change_window_days: Option<i64>,
    territory_mappings: Option<HashMap<String, String>>,
}

/// Loads a build [`Configuration`] from compiled defaults, optionally
/// overlaid with a TOML file at `path`. Thresholds are never read from the
/// file; they're always recalculated by the orchestrator on the first run
/// that finds them stale (§4.8 step 2).
pub fn load_configuration(path: Option<&Path>) -> anyhow::Result<Configuration> {
    let mut config = default_configuration();
    let Some(path) = path else {
        return Ok(config);
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading config file '{}': {e}", path.display()))?;
    let file: ConfigFile = toml::from_str(&text)
        .map_err(|e| anyhow::anyhow!("parsing config file '{}': {e}", path.display()))?;

    if let Some(v) = file.customer_target_arr {
        config.customer_target_arr = Money::coerce(v);
    }
    if let Some(v) = file.customer_max_arr {
        config.customer_max_arr = Money::coerce(v);
    }
    if let Some(v) = file.prospect_target_arr {
        config.prospect_target_arr = Money::coerce(v);
    }
    if let Some(v) = file.cre_variance {
        config.cre_variance = v;
    }
    if let Some(v) = file.atr_variance {
        config.atr_variance = v;
    }
    if let Some(v) = file.tier1_variance {
        config.tier1_variance = v;
    }
    if let Some(v) = file.tier2_variance {
        config.tier2_variance = v;
    }
    if let Some(v) = file.renewal_concentration_max {
        config.renewal_concentration_max = v;
    }
    if let Some(v) = file.capacity_variance_percent {
        config.capacity_variance_percent = v;
    }
    if let Some(v) = file.score_weight_continuity {
        config.score_weight_continuity = v;
    }
    if let Some(v) = file.score_weight_geography {
        config.score_weight_geography = v;
    }
    if let Some(v) = file.score_weight_team_tier {
        config.score_weight_team_tier = v;
    }
    if let Some(v) = file.cre_count_threshold {
        config.cre_count_threshold = v;
    }
    if let Some(v) = file.renewal_soon_window_days {
        config.renewal_soon_window_days = v;
    }
    if let Some(v) = file.recent_change_window_days {
        config.recent_change_window_days = v;
    }
    if let Some(v) = file.territory_mappings {
        config.territory_mappings = v;
    }
    config.validate()?;
    Ok(config)
}

/// Builds the layered solver [`terra_algo::DispatchConfig`] from environment
/// variables (§6): `REMOTE_SOLVER_URL`, `USE_REMOTE_FOR_LARGE`,
/// `ALWAYS_USE_REMOTE`. Unset booleans fall back to
/// [`terra_algo::DispatchConfig::default`]'s values.
pub fn dispatch_config_from_env() -> terra_algo::DispatchConfig {
    let default = terra_algo::DispatchConfig::default();
    terra_algo::DispatchConfig {
        remote_solver_url: env::var("REMOTE_SOLVER_URL").ok(),
        use_remote_for_large: env_bool("USE_REMOTE_FOR_LARGE").unwrap_or(default.use_remote_for_large),
        always_use_remote: env_bool("ALWAYS_USE_REMOTE").unwrap_or(default.always_use_remote),
    }
}

fn env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|v| match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_has_no_thresholds_yet() {
        let config = default_configuration();
        assert!(config.thresholds.is_none());
        assert!(config.thresholds_stale());
    }

    #[test]
    fn load_configuration_without_path_returns_defaults() {
        let config = load_configuration(None).unwrap();
        assert_eq!(config.customer_target_arr.value(), 500_000.0);
    }

    #[test]
    fn load_configuration_overlays_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "customer_target_arr = 900000.0\ncre_variance = 0.3\n").unwrap();
        let config = load_configuration(Some(&path)).unwrap();
        assert_eq!(config.customer_target_arr.value(), 900_000.0);
        assert_eq!(config.cre_variance, 0.3);
        assert_eq!(config.atr_variance, 0.15);
    }

    #[test]
    fn env_bool_parses_common_truthy_falsy_values() {
        assert_eq!(env_bool("TERRA_CLI_TEST_NONEXISTENT_VAR"), None);

        env::set_var("TERRA_CLI_TEST_BOOL_VAR", "Yes");
        assert_eq!(env_bool("TERRA_CLI_TEST_BOOL_VAR"), Some(true));
        env::set_var("TERRA_CLI_TEST_BOOL_VAR", "0");
        assert_eq!(env_bool("TERRA_CLI_TEST_BOOL_VAR"), Some(false));
        env::set_var("TERRA_CLI_TEST_BOOL_VAR", "maybe");
        assert_eq!(env_bool("TERRA_CLI_TEST_BOOL_VAR"), None);
        env::remove_var("TERRA_CLI_TEST_BOOL_VAR");
    }
}
