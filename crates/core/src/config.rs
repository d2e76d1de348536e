//! Runtime configuration for overlay styling, display precision and view limits.
//!
//! Configuration is layered: built-in defaults, then an optional JSON file,
//! then environment variables. Missing keys in the file keep their defaults.

use crate::area::DEFAULT_AREA_DECIMALS;
use crate::error::ConfigError;
use crate::layer::{Color, OverlayStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the accent color (`#rrggbb`)
pub const ENV_ACCENT: &str = "PLANIMETER_ACCENT";
/// Environment variable overriding the default reference image
pub const ENV_DEFAULT_IMAGE: &str = "PLANIMETER_DEFAULT_IMAGE";
/// Environment variable overriding the number of displayed decimals
pub const ENV_AREA_DECIMALS: &str = "PLANIMETER_AREA_DECIMALS";

/// User-configurable settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanimeterConfig {
    /// Color of vertices, edges and outlines
    pub accent: Color,
    /// Vertex marker radius in screen pixels
    pub marker_radius: f32,
    /// Edge and outline stroke width in screen pixels
    pub edge_width: f32,
    /// Dash pattern for in-progress edges
    pub edge_dash: Vec<f32>,
    /// Fill opacity of closed polygons (0.0 to 1.0)
    pub fill_opacity: f32,
    /// Opacity of the plate behind area labels (0.0 to 1.0)
    pub label_opacity: f32,
    /// Decimal places for displayed areas
    pub area_decimals: usize,
    /// Lowest zoom level the view may use
    pub min_zoom: i32,
    /// Highest zoom level the view may use
    pub max_zoom: i32,
    /// Viewport size used when fitting the view to an image
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Image loaded when no other image is given
    pub default_image: Option<PathBuf>,
}

impl Default for PlanimeterConfig {
    fn default() -> Self {
        Self {
            accent: Color::ACCENT,
            marker_radius: 4.0,
            edge_width: 2.0,
            edge_dash: vec![5.0, 5.0],
            fill_opacity: 0.3,
            label_opacity: 0.5,
            area_decimals: DEFAULT_AREA_DECIMALS,
            min_zoom: -2,
            max_zoom: 2,
            viewport_width: 1280,
            viewport_height: 800,
            default_image: None,
        }
    }
}

impl PlanimeterConfig {
    /// Sets the accent color.
    pub fn with_accent(mut self, accent: Color) -> Self {
        self.accent = accent;
        self
    }

    /// Sets the number of displayed decimals.
    pub fn with_area_decimals(mut self, decimals: usize) -> Self {
        self.area_decimals = decimals;
        self
    }

    /// Sets the default reference image.
    pub fn with_default_image<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.default_image = Some(path.as_ref().to_path_buf());
        self
    }

    /// Returns the default config file location for the current platform.
    ///
    /// - Linux: ~/.config/planimeter/config.json
    /// - macOS: ~/Library/Application Support/planimeter/config.json
    /// - Windows: %APPDATA%\planimeter\config.json
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("planimeter").join("config.json"))
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit `path` must exist. Without one, the platform default file is
    /// read when present. Environment overrides are applied last.
    ///
    /// # Errors
    /// Returns an error if a file cannot be read or parsed, or if a value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(default) => Self::from_file(default)?,
                None => Self::default(),
            },
        };
        config.apply_env()
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let bytes = fs::read(path.as_ref())?;
        let config: Self = serde_json::from_slice(&bytes)?;
        config.validate()
    }

    /// Saves configuration to a JSON file, creating parent directories.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Loads configuration from defaults plus environment variables.
    ///
    /// Environment variables:
    /// - `PLANIMETER_ACCENT`: accent color as `#rrggbb`
    /// - `PLANIMETER_DEFAULT_IMAGE`: path of the default reference image
    /// - `PLANIMETER_AREA_DECIMALS`: decimals shown for areas
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(val) = std::env::var(ENV_ACCENT) {
            self.accent = Color::from_hex(&val)
                .ok_or_else(|| ConfigError::InvalidValue(ENV_ACCENT.to_string()))?;
        }

        if let Ok(val) = std::env::var(ENV_DEFAULT_IMAGE) {
            self.default_image = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var(ENV_AREA_DECIMALS) {
            self.area_decimals = val
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue(ENV_AREA_DECIMALS.to_string()))?;
        }

        self.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&self.fill_opacity) {
            return Err(ConfigError::InvalidValue("fill_opacity".to_string()));
        }
        if !(0.0..=1.0).contains(&self.label_opacity) {
            return Err(ConfigError::InvalidValue("label_opacity".to_string()));
        }
        if self.marker_radius < 0.0 || self.edge_width < 0.0 {
            return Err(ConfigError::InvalidValue("marker_radius/edge_width".to_string()));
        }
        if self.edge_dash.iter().any(|d| *d < 0.0) {
            return Err(ConfigError::InvalidValue("edge_dash".to_string()));
        }
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::InvalidValue("min_zoom".to_string()));
        }
        if self.area_decimals > 10 {
            return Err(ConfigError::InvalidValue("area_decimals".to_string()));
        }
        Ok(self)
    }

    /// Overlay styles derived from this configuration
    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle::from_accent(
            self.accent,
            self.marker_radius,
            self.edge_width,
            self.edge_dash.clone(),
            self.fill_opacity,
            self.label_opacity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    struct EnvGuard {
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn new(keys: &[&'static str]) -> Self {
            let saved = keys.iter().map(|k| (*k, env::var(k).ok())).collect();
            for key in keys {
                env::remove_var(key);
            }
            Self { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    const KEYS: [&str; 3] = [ENV_ACCENT, ENV_DEFAULT_IMAGE, ENV_AREA_DECIMALS];

    #[test]
    fn test_default_config() {
        let config = PlanimeterConfig::default();
        assert_eq!(config.accent, Color::ACCENT);
        assert_eq!(config.area_decimals, 2);
        assert_eq!((config.min_zoom, config.max_zoom), (-2, 2));
        assert_eq!(config.overlay_style(), OverlayStyle::default());
    }

    #[test]
    fn test_builder_methods() {
        let config = PlanimeterConfig::default()
            .with_accent(Color::rgb(255, 0, 0))
            .with_area_decimals(3)
            .with_default_image("/plans/floor.png");

        assert_eq!(config.accent, Color::rgb(255, 0, 0));
        assert_eq!(config.area_decimals, 3);
        assert_eq!(config.default_image, Some(PathBuf::from("/plans/floor.png")));
    }

    #[test]
    fn test_file_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("nested").join("config.json");

        let config = PlanimeterConfig::default().with_accent(Color::rgb(1, 2, 3));
        config.save_to_file(&path).expect("save should succeed");

        let loaded = PlanimeterConfig::from_file(&path).expect("load should succeed");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("config.json");
        fs::write(&path, r##"{ "accent": "#ff8800", "fill_opacity": 0.5 }"##).unwrap();

        let loaded = PlanimeterConfig::from_file(&path).unwrap();
        assert_eq!(loaded.accent, Color::rgb(0xff, 0x88, 0x00));
        assert_eq!(loaded.fill_opacity, 0.5);
        assert_eq!(loaded.marker_radius, 4.0);
    }

    #[test]
    fn test_invalid_file_values() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("config.json");

        fs::write(&path, r#"{ "fill_opacity": 3.0 }"#).unwrap();
        assert!(matches!(
            PlanimeterConfig::from_file(&path),
            Err(ConfigError::InvalidValue(key)) if key == "fill_opacity"
        ));

        fs::write(&path, r#"{ "accent": "blue" }"#).unwrap();
        assert!(matches!(PlanimeterConfig::from_file(&path), Err(ConfigError::Serde(_))));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let _guard = EnvGuard::new(&KEYS);

        env::set_var(ENV_ACCENT, "#112233");
        env::set_var(ENV_DEFAULT_IMAGE, "/tmp/plan.png");
        env::set_var(ENV_AREA_DECIMALS, "4");

        let config = PlanimeterConfig::from_env().unwrap();
        assert_eq!(config.accent, Color::rgb(0x11, 0x22, 0x33));
        assert_eq!(config.default_image, Some(PathBuf::from("/tmp/plan.png")));
        assert_eq!(config.area_decimals, 4);
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_value() {
        let _guard = EnvGuard::new(&KEYS);

        env::set_var(ENV_AREA_DECIMALS, "two");

        assert!(matches!(
            PlanimeterConfig::from_env(),
            Err(ConfigError::InvalidValue(key)) if key == ENV_AREA_DECIMALS
        ));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let _guard = EnvGuard::new(&KEYS);
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "area_decimals": 1 }"#).unwrap();

        env::set_var(ENV_AREA_DECIMALS, "3");

        let config = PlanimeterConfig::load(Some(&path)).unwrap();
        assert_eq!(config.area_decimals, 3);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = PlanimeterConfig::load(Some(Path::new("/nonexistent/planimeter.json")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
