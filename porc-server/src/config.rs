//! Server configuration

use std::path::PathBuf;
use std::time::Duration;

/// Simulation tuning
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Days per run (env: SIM_DAYS)
    pub days: u32,
    /// Pause between animation steps (env: STEP_DELAY_MS)
    pub step_delay: Duration,
    /// Pause after loading at a farm (env: LOAD_PAUSE_MS)
    pub load_pause: Duration,
    /// Pause between truck waves (env: WAVE_PAUSE_MS)
    pub wave_pause: Duration,
    /// Pause between days (env: DAY_PAUSE_MS)
    pub day_pause: Duration,
    /// Sale price of live weight, €/kg (env: PRICE_PER_KG)
    pub price_per_kg: f64,
    /// Interpolated positions per route leg
    pub steps_per_leg: u32,
    /// Load limit used while filling a truck
    pub truck_capacity_kg: f64,
    /// Farms visited by one truck at most
    pub max_stops: usize,
    /// Days before a farm can be visited again
    pub revisit_days: i64,
    /// Daily mean-weight gain of a stocked farm
    pub daily_growth_kg: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: 15,
            step_delay: Duration::from_millis(50),
            load_pause: Duration::from_millis(200),
            wave_pause: Duration::from_millis(500),
            day_pause: Duration::from_millis(2000),
            price_per_kg: 1.56,
            steps_per_leg: 20,
            truck_capacity_kg: 20_000.0,
            max_stops: 3,
            revisit_days: 7,
            daily_growth_kg: 0.71,
        }
    }
}

impl SimulationConfig {
    /// No pauses at all, for tests and batch runs
    pub fn instant() -> Self {
        Self {
            step_delay: Duration::ZERO,
            load_pause: Duration::ZERO,
            wave_pause: Duration::ZERO,
            day_pause: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            days: env_parse("SIM_DAYS").unwrap_or(defaults.days),
            step_delay: env_millis("STEP_DELAY_MS").unwrap_or(defaults.step_delay),
            load_pause: env_millis("LOAD_PAUSE_MS").unwrap_or(defaults.load_pause),
            wave_pause: env_millis("WAVE_PAUSE_MS").unwrap_or(defaults.wave_pause),
            day_pause: env_millis("DAY_PAUSE_MS").unwrap_or(defaults.day_pause),
            price_per_kg: env_parse("PRICE_PER_KG").unwrap_or(defaults.price_per_kg),
            ..defaults
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP/WebSocket port (env: HTTP_PORT)
    pub http_port: u16,
    /// Directory holding the static dataset (env: DATA_DIR)
    pub data_dir: PathBuf,
    /// Daily rolling log files go here when set (env: LOG_DIR)
    pub log_dir: Option<PathBuf>,
    /// Environment: development | production (env: ENVIRONMENT)
    pub environment: String,
    pub simulation: SimulationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8000,
            data_dir: PathBuf::from("Dades"),
            log_dir: None,
            environment: "development".to_string(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            http_port: env_parse("HTTP_PORT").unwrap_or(8000),
            data_dir: std::env::var("DATA_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("Dades")),
            log_dir: std::env::var("LOG_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            simulation: SimulationConfig::from_env(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_millis(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.days, 15);
        assert_eq!(config.price_per_kg, 1.56);
        assert_eq!(config.steps_per_leg, 20);
        assert_eq!(config.max_stops, 3);
    }

    #[test]
    fn test_instant_keeps_model_constants() {
        let config = SimulationConfig::instant();
        assert_eq!(config.step_delay, Duration::ZERO);
        assert_eq!(config.day_pause, Duration::ZERO);
        assert_eq!(config.truck_capacity_kg, 20_000.0);
        assert_eq!(config.revisit_days, 7);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.data_dir, PathBuf::from("Dades"));
        assert!(config.log_dir.is_none());
        assert!(!config.is_production());
    }
}
