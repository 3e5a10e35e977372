//! CLI Configuration

use formkit::{FormsConfig, OrgUnitRef};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    pub store_dir: Option<PathBuf>,
    #[serde(default)]
    pub org_units: Vec<OrgUnitRef>,
    #[serde(default)]
    pub forms: FormsConfig,
}

impl Config {
    /// Starting point written by `config init`
    pub fn initial() -> Self {
        Self {
            store_dir: None,
            org_units: vec![OrgUnitRef::new("general").with_name("General")],
            forms: FormsConfig::default(),
        }
    }

    pub fn load(profile: Option<&str>) -> Result<Self, String> {
        let path = Self::config_path(profile)?;
        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| e.to_string())?;
            toml::from_str(&content).map_err(|e| format!("{}: {}", path.display(), e))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf, String> {
        let path = Self::config_path(profile)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(&path, content).map_err(|e| e.to_string())?;
        Ok(path)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store_dir
            .clone()
            .or_else(|| Self::home().ok().map(|h| h.join("store")))
            .unwrap_or_else(|| PathBuf::from(".formkit"))
    }

    pub fn config_path(profile: Option<&str>) -> Result<PathBuf, String> {
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(Self::home()?.join(filename))
    }

    fn home() -> Result<PathBuf, String> {
        let home = dirs::home_dir().ok_or("Cannot find home directory")?;
        Ok(home.join(".formkit"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_file_name() {
        let default = Config::config_path(None).unwrap();
        let staging = Config::config_path(Some("staging")).unwrap();
        assert!(default.ends_with(".formkit/config.toml"));
        assert!(staging.ends_with(".formkit/config.staging.toml"));
    }

    #[test]
    fn test_parses_nested_forms_section() {
        let config: Config = toml::from_str(
            r#"
            store_dir = "/tmp/forms"

            [[org_units]]
            id = "hr"
            name = "Human Resources"

            [forms.validation]
            unique_field_names = true

            [forms.export]
            delimiter = ";"
            "#,
        )
        .unwrap();

        assert_eq!(config.store_dir(), PathBuf::from("/tmp/forms"));
        assert_eq!(config.org_units[0].id, "hr");
        assert!(config.forms.validation.unique_field_names);
        assert_eq!(config.forms.export.delimiter, ';');
        assert_eq!(config.forms.log_level, "info");
    }

    #[test]
    fn test_initial_config_round_trips() {
        let text = toml::to_string_pretty(&Config::initial()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.org_units, Config::initial().org_units);
        assert_eq!(parsed.forms, FormsConfig::default());
    }
}
