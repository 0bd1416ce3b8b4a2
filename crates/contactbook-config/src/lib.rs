use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "contactbook";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub source: SourceConfig,
}

/// Where contacts come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Macos { group: Option<String> },
    Vcf { path: PathBuf },
    Json { path: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Macos { group: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Macos,
    Vcf,
    Json,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Macos => "macos",
            SourceKind::Vcf => "vcf",
            SourceKind::Json => "json",
        }
    }

    /// Guesses the kind of a contacts file from its extension.
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "vcf" | "vcard" => Some(SourceKind::Vcf),
            "json" => Some(SourceKind::Json),
            _ => None,
        }
    }
}

impl SourceConfig {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceConfig::Macos { .. } => SourceKind::Macos,
            SourceConfig::Vcf { .. } => SourceKind::Vcf,
            SourceConfig::Json { .. } => SourceKind::Json,
        }
    }

    /// Builds a file-backed source config from a path, using its extension.
    pub fn from_file(path: PathBuf) -> Result<Self> {
        match SourceKind::for_path(&path) {
            Some(SourceKind::Vcf) => Ok(SourceConfig::Vcf { path }),
            Some(SourceKind::Json) => Ok(SourceConfig::Json { path }),
            _ => Err(ConfigError::UnknownSourceFileKind(path)),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("source kind {0} requires a path")]
    MissingSourcePath(&'static str),
    #[error("invalid source path: {0}")]
    InvalidSourcePath(PathBuf),
    #[error("source kind {kind} does not accept field {field}")]
    InvalidSourceField { kind: &'static str, field: &'static str },
    #[error("cannot infer source kind from file name: {0}")]
    UnknownSourceFileKind(PathBuf),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    source: Option<SourceFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceFile {
    kind: Option<SourceKind>,
    path: Option<PathBuf>,
    group: Option<String>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(source) = parsed.source {
        config.source = parse_source(source)?;
    }

    Ok(config)
}

fn parse_source(file: SourceFile) -> Result<SourceConfig> {
    let kind = file.kind.unwrap_or(SourceKind::Macos);
    match kind {
        SourceKind::Macos => {
            if file.path.is_some() {
                return Err(ConfigError::InvalidSourceField {
                    kind: kind.as_str(),
                    field: "path",
                });
            }
            let group = file
                .group
                .map(|group| group.trim().to_string())
                .filter(|group| !group.is_empty());
            Ok(SourceConfig::Macos { group })
        }
        SourceKind::Vcf | SourceKind::Json => {
            if file.group.is_some() {
                return Err(ConfigError::InvalidSourceField {
                    kind: kind.as_str(),
                    field: "group",
                });
            }
            let path = file
                .path
                .ok_or(ConfigError::MissingSourcePath(kind.as_str()))?;
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidSourcePath(path));
            }
            if kind == SourceKind::Vcf {
                Ok(SourceConfig::Vcf { path })
            } else {
                Ok(SourceConfig::Json { path })
            }
        }
    }
}
