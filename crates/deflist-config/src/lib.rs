use deflist_engine::Style;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides the settings file location. Tilde and `$VAR` references expand.
pub const CONFIG_ENV_VAR: &str = "DEFLIST_CONFIG";

/// Largest accepted definition indent, in pixels.
pub const MAX_DEFINITION_INDENT_PX: u32 = 400;

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

    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// How definition lists look. Only styling reads these; classification never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Term text color, as `#rgb`, `#rrggbb` or a CSS color name.
    pub term_color: Option<String>,
    pub term_bold: bool,
    pub term_italic: bool,
    pub definition_indent_px: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            term_color: None,
            term_bold: true,
            term_italic: false,
            definition_indent_px: 30,
        }
    }
}

impl Settings {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let settings: Settings =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        settings.validate()?;

        Ok(Some(settings))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Loads the settings file, falling back to defaults when there is none.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        self.validate()?;
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

    /// `$DEFLIST_CONFIG` when set, `~/.config/deflist/config.toml` otherwise.
    pub fn config_path() -> PathBuf {
        if let Some(custom) = std::env::var_os(CONFIG_ENV_VAR) {
            let custom = PathBuf::from(custom);
            return Self::expand_path(&custom).unwrap_or(custom);
        }
        let config_dir = shellexpand::tilde("~/.config/deflist");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(color) = &self.term_color {
            if !is_css_color(color) {
                return Err(ConfigError::Invalid {
                    field: "term_color",
                    reason: format!("`{color}` is not #rgb, #rrggbb or a color name"),
                });
            }
        }
        if self.definition_indent_px > MAX_DEFINITION_INDENT_PX {
            return Err(ConfigError::Invalid {
                field: "definition_indent_px",
                reason: format!(
                    "{} is above the maximum of {MAX_DEFINITION_INDENT_PX}",
                    self.definition_indent_px
                ),
            });
        }
        Ok(())
    }

    /// CSS custom properties carrying these settings, one declaration per line.
    pub fn to_css_variables(&self) -> String {
        let color = self.term_color.as_deref().unwrap_or("inherit");
        let weight = if self.term_bold { "bold" } else { "normal" };
        let style = if self.term_italic { "italic" } else { "normal" };
        format!(
            "--deflist-term-color: {color};\n\
             --deflist-term-weight: {weight};\n\
             --deflist-term-style: {style};\n\
             --deflist-definition-indent: {}px;\n",
            self.definition_indent_px
        )
    }

    /// A stylesheet for both the editor decorations and rendered `<dl>` lists.
    pub fn stylesheet(&self) -> String {
        let mut css = String::from(":root {\n");
        for line in self.to_css_variables().lines() {
            let _ = writeln!(css, "  {line}");
        }
        css.push_str("}\n");

        let term = Style::Term.class_name();
        let definition = Style::Definition.class_name();
        let list_item = Style::DefinitionListItem.class_name();
        let marker = Style::Marker.class_name();
        let _ = write!(
            css,
            ".{term}, dt {{\n  \
             color: var(--deflist-term-color);\n  \
             font-weight: var(--deflist-term-weight);\n  \
             font-style: var(--deflist-term-style);\n}}\n\
             .{definition}, .{list_item}, dd {{\n  \
             margin-left: var(--deflist-definition-indent);\n}}\n\
             .{marker} {{\n  opacity: 0.5;\n}}\n"
        );
        css
    }
}

fn is_css_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic()),
    }
}
