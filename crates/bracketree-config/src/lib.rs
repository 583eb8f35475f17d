use bracketree_engine::{BracketPair, BracketPairsOptions, LanguageConfigurationSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Language whose brackets apply to languages without their own entry.
pub const DEFAULT_LANGUAGE: &str = "default";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid include pattern {pattern:?} in {config_path}: {source}")]
    IncludePatternError {
        config_path: PathBuf,
        pattern: String,
        source: glob::PatternError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    pub tab_size: u32,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            tab_size: BracketPairsOptions::default().tab_size,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// `[open, close]` pairs, in the order the language defines them.
    #[serde(default)]
    pub brackets: Vec<[String; 2]>,
}

impl LanguageConfig {
    pub fn new(brackets: &[(&str, &str)]) -> Self {
        Self {
            brackets: brackets
                .iter()
                .map(|(open, close)| [open.to_string(), close.to_string()])
                .collect(),
        }
    }
}

/// Only the language tables of an included file are read.
#[derive(Debug, Default, Deserialize)]
struct LanguagesFile {
    #[serde(default)]
    languages: BTreeMap<String, LanguageConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub options: OptionsConfig,
    /// Glob patterns of further files with `[languages.*]` tables. Shell
    /// variables and `~` are expanded.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    pub languages: BTreeMap<String, LanguageConfig>,
}

impl Config {
    /// Bracket pairs for a handful of common languages.
    pub fn builtin() -> Self {
        let c_like = [("{", "}"), ("[", "]"), ("(", ")")];
        let mut languages = BTreeMap::new();
        for language in [
            DEFAULT_LANGUAGE,
            "c",
            "cpp",
            "csharp",
            "go",
            "java",
            "javascript",
            "json",
            "rust",
            "typescript",
        ] {
            languages.insert(language.to_string(), LanguageConfig::new(&c_like));
        }
        languages.insert(
            "python".to_string(),
            LanguageConfig::new(&[("{", "}"), ("[", "]"), ("(", ")")]),
        );
        languages.insert(
            "ruby".to_string(),
            LanguageConfig::new(&[
                ("{", "}"),
                ("[", "]"),
                ("(", ")"),
                ("begin", "end"),
                ("do", "end"),
                ("def", "end"),
                ("class", "end"),
                ("module", "end"),
            ]),
        );
        languages.insert(
            "pascal".to_string(),
            LanguageConfig::new(&[("begin", "end"), ("(", ")"), ("[", "]")]),
        );
        languages.insert("html".to_string(), LanguageConfig::new(&[("<!--", "-->"), ("<", ">")]));

        Self {
            options: OptionsConfig::default(),
            include: Vec::new(),
            languages,
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = read(config_path)?;
        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        for path in config.include_paths(config_path)? {
            let content = read(&path)?;
            let included: LanguagesFile =
                toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                    config_path: path.clone(),
                    source,
                })?;
            // Entries in the main file win over included ones.
            for (language, brackets) in included.languages {
                config.languages.entry(language).or_insert(brackets);
            }
        }

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// The user's configuration on top of [`Config::builtin`].
    pub fn load_or_builtin() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default().with_builtin_languages())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/bracketree");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Adds the built-in languages this config does not define itself.
    pub fn with_builtin_languages(mut self) -> Self {
        for (language, brackets) in Self::builtin().languages {
            self.languages.entry(language).or_insert(brackets);
        }
        self
    }

    pub fn options(&self) -> BracketPairsOptions {
        BracketPairsOptions {
            tab_size: self.options.tab_size.max(1),
        }
    }

    /// Brackets of `language`, falling back to the default language.
    pub fn language(&self, language: &str) -> Option<&LanguageConfig> {
        self.languages
            .get(language)
            .or_else(|| self.languages.get(DEFAULT_LANGUAGE))
    }

    /// Files matched by the include patterns, relative patterns resolved
    /// against the directory of `config_path`.
    fn include_paths(&self, config_path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        let base = config_path.parent().unwrap_or(Path::new("."));
        let mut paths = Vec::new();
        for pattern in &self.include {
            let expanded =
                Self::expand_path(Path::new(pattern)).unwrap_or_else(|| PathBuf::from(pattern));
            let full = if expanded.is_absolute() {
                expanded
            } else {
                base.join(expanded)
            };
            let matches = glob::glob(&full.to_string_lossy()).map_err(|source| {
                ConfigError::IncludePatternError {
                    config_path: config_path.to_path_buf(),
                    pattern: pattern.clone(),
                    source,
                }
            })?;
            let mut matched: Vec<PathBuf> = matches.filter_map(Result::ok).collect();
            matched.sort();
            paths.extend(matched);
        }
        Ok(paths)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

impl LanguageConfigurationSource for Config {
    fn bracket_pairs(&self, language: &str) -> Vec<BracketPair> {
        self.language(language)
            .map(|config| {
                config
                    .brackets
                    .iter()
                    .map(|[open, close]| BracketPair::new(open.as_str(), close.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn read(config_path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(config_path).map_err(|source| ConfigError::ConfigReadError {
        config_path: config_path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/bracketree/config.toml"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config::builtin();

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[languages.lisp]
brackets = [["(", ")"]]
"#,
        )
        .unwrap();

        assert_eq!(config.options.tab_size, 4);
        assert_eq!(config.bracket_pairs("lisp"), vec![BracketPair::new("(", ")")]);
        assert!(config.bracket_pairs("c").is_empty());
        assert_eq!(config.with_builtin_languages().bracket_pairs("c").len(), 3);
    }

    #[test]
    fn test_unknown_language_falls_back_to_default() {
        let config = Config::builtin();
        assert_eq!(config.bracket_pairs("brainfuck"), config.bracket_pairs("c"));
        assert_eq!(
            config.bracket_pairs("ruby")[3],
            BracketPair::new("begin", "end")
        );
    }

    #[test]
    fn test_options_convert_to_engine_options() {
        let mut config = Config::default();
        config.options.tab_size = 0;
        assert_eq!(config.options().tab_size, 1);
        config.options.tab_size = 2;
        assert_eq!(config.options(), BracketPairsOptions { tab_size: 2 });
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("BRACKETREE_TEST_VAR", "/test/env/path");
        }

        let path = PathBuf::from("$BRACKETREE_TEST_VAR/subdir");
        let expanded = Config::expand_path(&path);

        assert_eq!(expanded, Some(PathBuf::from("/test/env/path/subdir")));

        unsafe {
            env::remove_var("BRACKETREE_TEST_VAR");
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_config_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[options]\ntab_size = \"wide\"\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut test_config = Config::default();
        test_config.options.tab_size = 8;
        test_config
            .languages
            .insert("lua".to_string(), LanguageConfig::new(&[("do", "end")]));

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_included_language_files() {
        let temp_dir = TempDir::new().unwrap();
        let languages_dir = temp_dir.path().join("languages");
        std::fs::create_dir_all(&languages_dir).unwrap();
        std::fs::write(
            languages_dir.join("lua.toml"),
            "[languages.lua]\nbrackets = [[\"do\", \"end\"]]\n",
        )
        .unwrap();
        std::fs::write(
            languages_dir.join("c.toml"),
            "[languages.c]\nbrackets = [[\"<\", \">\"]]\n",
        )
        .unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "include = [\"languages/*.toml\"]\n\n[languages.c]\nbrackets = [[\"(\", \")\"]]\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.bracket_pairs("lua"), vec![BracketPair::new("do", "end")]);
        assert_eq!(config.bracket_pairs("c"), vec![BracketPair::new("(", ")")]);
    }

    #[test]
    fn test_invalid_include_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "include = [\"[\"]\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::IncludePatternError { .. }));
    }
}
