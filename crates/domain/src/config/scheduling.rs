use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scheduling defaults
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Timezone assumed when a request carries none that parses.
    #[serde(default = "d_utc")]
    pub default_timezone: String,
    /// Cron expression used when a request supplies no schedule.
    #[serde(default = "d_schedule")]
    pub default_schedule: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            default_timezone: d_utc(),
            default_schedule: d_schedule(),
        }
    }
}

fn d_utc() -> String {
    "UTC".into()
}
fn d_schedule() -> String {
    "0 */5 * * *".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduling_defaults() {
        let cfg = SchedulingConfig::default();
        assert_eq!(cfg.default_timezone, "UTC");
        assert_eq!(cfg.default_schedule, "0 */5 * * *");
    }
}
