//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILE: &str = "sabha.toml";
const ENV_PREFIX: &str = "SABHA_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. `SABHA_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project: `./sabha.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/sabha/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path().filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(global_path));
        }
        if let Some(project_path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(project_path));
        }
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/sabha/config.toml`, or the platform equivalent
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sabha").join("config.toml"))
    }

    /// The project config file, if present in the working directory
    pub fn project_config_path() -> Option<PathBuf> {
        let path = PathBuf::from(PROJECT_FILE);
        path.exists().then_some(path)
    }

    /// Human-readable list of the sources and whether each was found
    pub fn describe_sources(config_path: Option<&Path>) -> Vec<(String, Option<PathBuf>)> {
        let mut sources = Vec::new();
        if let Some(path) = config_path {
            sources.push(("Explicit".to_string(), path.exists().then(|| path.to_path_buf())));
        }
        sources.push(("Project".to_string(), Self::project_config_path()));
        sources.push((
            "Global".to_string(),
            Self::global_config_path().filter(|p| p.exists()),
        ));
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use sabha_domain::ProviderKind;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.meeting.vote_history, 20);
        assert!(config.providers.openrouter.streaming);
    }

    #[test]
    fn test_global_config_path_names_app() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.ends_with("sabha/config.toml"));
        }
    }

    #[test]
    fn test_project_file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "sabha.toml",
                r#"
[providers]
default = "gemini"
max_tokens = 512

[meeting]
tools = "full"
"#,
            )?;
            jail.set_env("SABHA_PROVIDERS__DEFAULT", "ollama");
            jail.set_env("SABHA_MEETING__VOTE_HISTORY", "5");

            let config = ConfigLoader::load(None).map_err(|e| *e)?;

            assert_eq!(config.providers.parse_default().0, ProviderKind::Ollama);
            assert_eq!(config.providers.max_tokens, 512);
            assert_eq!(config.meeting.tools, "full");
            assert_eq!(config.meeting.vote_history, 5);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project() {
        Jail::expect_with(|jail| {
            jail.create_file("sabha.toml", "[meeting]\nend_rule = \"unanimous\"\n")?;
            jail.create_file("custom.toml", "[meeting]\nend_rule = \"atleast:2\"\n")?;

            let config = ConfigLoader::load(Some(Path::new("custom.toml"))).map_err(|e| *e)?;

            assert_eq!(config.meeting.end_rule, "atleast:2");
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_error() {
        Jail::expect_with(|jail| {
            jail.create_file("sabha.toml", "[meeting\ntools = ")?;
            assert!(ConfigLoader::load(None).is_err());
            Ok(())
        });
    }
}
