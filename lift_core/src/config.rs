//! Configuration file support for Liftlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftlog/config.toml`.

use crate::types::{ExerciseSpec, Workout};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Custom workouts, taking precedence over the built-in catalog.
    #[serde(default)]
    pub workouts: Vec<WorkoutConfig>,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Persistence behavior configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Retries per exercise state commit before the failure is reported.
    #[serde(default = "default_commit_retries")]
    pub commit_retries: u32,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            commit_retries: default_commit_retries(),
        }
    }
}

/// Custom workout definition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<ExerciseConfig>,
}

/// Custom exercise definition
///
/// `deload_percentage` is deliberately required: guessing a deload fraction
/// for an exercise that never declared one would silently change how much
/// weight comes off the bar.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseConfig {
    pub id: String,
    pub name: String,
    #[serde(default = "default_target_sets")]
    pub target_sets: u32,
    #[serde(default = "default_target_reps")]
    pub target_reps: u32,
    #[serde(default = "default_start_weight")]
    pub start_weight: f64,
    #[serde(default = "default_weight_increment")]
    pub weight_increment: f64,
    pub deload_percentage: f64,
}

impl From<&WorkoutConfig> for Workout {
    fn from(config: &WorkoutConfig) -> Self {
        Workout {
            id: config.id.clone(),
            name: config.name.clone(),
            description: config.description.clone(),
            exercises: config
                .exercises
                .iter()
                .map(|e| ExerciseSpec {
                    id: e.id.clone(),
                    name: e.name.clone(),
                    target_sets: e.target_sets,
                    target_reps: e.target_reps,
                    start_weight: e.start_weight,
                    weight_increment: e.weight_increment,
                    deload_percentage: e.deload_percentage,
                })
                .collect(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("liftlog")
}

fn default_commit_retries() -> u32 {
    3
}

fn default_target_sets() -> u32 {
    5
}

fn default_target_reps() -> u32 {
    5
}

fn default_start_weight() -> f64 {
    45.0
}

fn default_weight_increment() -> f64 {
    5.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("liftlog").join("config.toml")
    }

    /// Custom workouts converted to their domain representation
    pub fn custom_workouts(&self) -> Vec<Workout> {
        self.workouts.iter().map(Workout::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.persistence.commit_retries, 3);
        assert!(config.workouts.is_empty());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[persistence]
commit_retries = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.persistence.commit_retries, 5);
        assert_eq!(config.data.data_dir, default_data_dir()); // default
    }

    #[test]
    fn test_custom_workout_parses() {
        let toml_str = r#"
[[workouts]]
id = "press_day"
name = "Press Day"

[[workouts.exercises]]
id = "overhead_press"
name = "Overhead Press"
start_weight = 65.0
weight_increment = 2.5
deload_percentage = 15.0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let workouts = config.custom_workouts();
        assert_eq!(workouts.len(), 1);

        let press = &workouts[0].exercises[0];
        assert_eq!(press.target_sets, 5); // default
        assert_eq!(press.weight_increment, 2.5);
        assert_eq!(press.deload_percentage, 15.0);
    }

    #[test]
    fn test_missing_deload_percentage_is_rejected() {
        let toml_str = r#"
[[workouts]]
id = "press_day"
name = "Press Day"

[[workouts.exercises]]
id = "overhead_press"
name = "Overhead Press"
"#;
        let result = toml::from_str::<Config>(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let toml_str = r#"
[[workouts]]
id = "press_day"
name = "Press Day"

[[workouts.exercises]]
id = "overhead_press"
name = "Overhead Press"
deload_percentage = 10.0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.workouts.len(), 1);
        assert_eq!(parsed.workouts[0].exercises[0].deload_percentage, 10.0);
    }
}
