use anyhow::{Context, Result, bail};
use glitch_effect::{DisplacementMode, Parameters};
use log::debug;
use once_cell::sync::Lazy;
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

const APP_NAME: &str = env!("CARGO_PKG_NAME");
static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::default()));

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(skip)]
    pub is_first_run: bool,

    /// Slider values used when the app starts
    #[serde(default = "Parameters::ui_defaults")]
    #[derivative(Default(value = "Parameters::ui_defaults()"))]
    pub params: Parameters,

    #[serde(default)]
    pub render: Render,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Render {
    #[serde(default)]
    pub displacement_mode: DisplacementMode,

    /// Fixed seed for reproducible renders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Config {
    /// Resolve the config file and load it, writing defaults on first run.
    ///
    /// `path` overrides `<config_dir>/glitch-preview/glitch-preview.toml`.
    pub fn init(&mut self, path: Option<&Path>) -> Result<()> {
        self.config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let app_dirs = AppDirs::new(Some(APP_NAME), true)
                    .with_context(|| "no config directory on this platform")?;
                app_dirs.config_dir.join(format!("{APP_NAME}.toml"))
            }
        };

        if let Some(dir) = self.config_path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("create config dir {} failed", dir.display()))?;
        }

        self.load().with_context(|| "load config file failed")?;
        debug!("{:?}", self);
        Ok(())
    }

    fn load(&mut self) -> Result<()> {
        match fs::read_to_string(&self.config_path) {
            Ok(text) => match toml::from_str::<Config>(&text) {
                Ok(mut c) => {
                    c.config_path = self.config_path.clone();
                    c.is_first_run = self.is_first_run;
                    *self = c;

                    Ok(())
                }
                Err(e) => {
                    log::warn!("bad config {}: {e}", self.config_path.display());
                    self.is_first_run = true;

                    let mut bak_file = self.config_path.clone().into_os_string();
                    bak_file.push(".bak");
                    _ = fs::copy(&self.config_path, bak_file);

                    self.save()
                }
            },
            Err(_) => {
                self.is_first_run = true;
                self.save()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        match toml::to_string_pretty(self) {
            Ok(text) => Ok(fs::write(&self.config_path, text)
                .with_context(|| "save config failed".to_string())?),
            Err(e) => bail!(format!("convert config to toml format failed. {e:?}")),
        }
    }
}

/// Load the global configuration. Call once at startup.
pub fn init(path: Option<&Path>) -> Result<()> {
    CONFIG.lock().unwrap().init(path)
}

pub fn all() -> Config {
    CONFIG.lock().unwrap().clone()
}

pub fn save(conf: Config) -> Result<()> {
    let mut config = CONFIG.lock().unwrap();
    *config = conf;
    config.save()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("glitch-preview.toml");

        let mut config = Config::default();
        config.init(Some(&path)).unwrap();

        assert!(config.is_first_run);
        assert!(path.exists());
        assert_eq!(config.params, Parameters::ui_defaults());
        assert_eq!(config.render.displacement_mode, DisplacementMode::Blocks);
        assert_eq!(config.render.seed, None);
    }

    #[test]
    fn test_load_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glitch-preview.toml");
        fs::write(
            &path,
            r#"
[params]
displacement = 40.0
rgbShift = -3.0

[render]
displacement_mode = "rows"
seed = 7
"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.init(Some(&path)).unwrap();

        assert!(!config.is_first_run);
        assert_eq!(config.params.displacement, 40.0);
        assert_eq!(config.params.rgb_shift, -3.0);
        assert_eq!(config.params.scanlines, 0.0);
        assert_eq!(config.render.displacement_mode, DisplacementMode::Rows);
        assert_eq!(config.render.seed, Some(7));
        assert_eq!(config.config_path, path);
    }

    #[test]
    fn test_bad_config_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glitch-preview.toml");
        fs::write(&path, "[render]\ndisplacement_mode = \"diagonal\"\n").unwrap();

        let mut config = Config::default();
        config.init(Some(&path)).unwrap();

        assert!(config.is_first_run);
        assert_eq!(config.render.displacement_mode, DisplacementMode::Blocks);
        assert!(dir.path().join("glitch-preview.toml.bak").exists());

        let text = fs::read_to_string(&path).unwrap();
        assert!(toml::from_str::<Config>(&text).is_ok());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glitch-preview.toml");

        let mut config = Config::default();
        config.init(Some(&path)).unwrap();
        config.params.noise = 55.0;
        config.render.displacement_mode = DisplacementMode::Columns;
        config.save().unwrap();

        let mut reloaded = Config::default();
        reloaded.init(Some(&path)).unwrap();
        assert_eq!(reloaded.params.noise, 55.0);
        assert_eq!(reloaded.render.displacement_mode, DisplacementMode::Columns);
    }
}
