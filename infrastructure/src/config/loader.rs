//! Configuration file loader with multi-source merging

use super::ConfigurationError;
use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "policy-agents";
const PROJECT_FILES: [&str; 2] = ["policy-agents.toml", ".policy-agents.toml"];
const ENV_PREFIX: &str = "POLICY_AGENTS_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `POLICY_AGENTS_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./policy-agents.toml` or `./.policy-agents.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/policy-agents/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, ConfigurationError> {
        Self::figment(config_path)?
            .extract()
            .map_err(|e| ConfigurationError::Load(Box::new(e)))
    }

    fn figment(config_path: Option<&PathBuf>) -> Result<Figment, ConfigurationError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Merging global config {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            debug!("Merging project config {}", path.display());
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            // Toml::file silently skips missing files; an explicit path must exist
            if !path.exists() {
                return Err(ConfigurationError::NotFound(path.clone()));
            }
            debug!("Merging explicit config {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/policy-agents/config.toml if set,
    /// otherwise falls back to ~/.config/policy-agents/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&Path>) {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Env:     {}*", ENV_PREFIX);

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./{} or ./{}", PROJECT_FILES[0], PROJECT_FILES[1]);
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.chunking.max_tokens, 400);
        assert!(config.rule_graph.path.is_none());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("policy-agents"));
    }

    #[test]
    fn test_project_file_and_env_merge() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "policy-agents.toml",
                r#"
[chunking]
max_tokens = 250

[evaluation]
task_timeout_secs = 200
"#,
            )?;
            jail.set_env("POLICY_AGENTS_EVALUATION__TASK_TIMEOUT_SECS", "45");

            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.chunking.max_tokens, 250);
            // Env wins over the project file
            assert_eq!(config.evaluation.task_timeout_secs, 45);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file(".policy-agents.toml", "[report]\nmax_recommendations = 3\n")?;
            jail.create_file("custom.toml", "[report]\nmax_recommendations = 7\n")?;

            let explicit = PathBuf::from("custom.toml");
            let config = ConfigLoader::load(Some(&explicit)).map_err(|e| e.to_string())?;
            assert_eq!(config.report.max_recommendations, 7);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let explicit = PathBuf::from("does-not-exist.toml");
            let err = ConfigLoader::load(Some(&explicit)).unwrap_err();
            assert!(matches!(err, ConfigurationError::NotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value_is_a_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file("policy-agents.toml", "[chunking]\nmax_tokens = \"lots\"\n")?;
            let err = ConfigLoader::load(None).unwrap_err();
            assert!(matches!(err, ConfigurationError::Load(_)));
            Ok(())
        });
    }
}
