use std::fmt;

use search_client::RepositoryConfig;
use search_model::query::DEFAULT_PAGE_SIZE;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    #[default]
    Disabled,
    Push,
    Replace,
}

impl HistoryMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "false" | "off" | "disabled" | "none" => Some(Self::Disabled),
            "true" | "push" => Some(Self::Push),
            "replace" => Some(Self::Replace),
            _ => None,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != Self::Disabled
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Push => "push",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HistoryMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HistoryMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Mode(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => Ok(Self::Disabled),
            Raw::Flag(true) => Ok(Self::Push),
            Raw::Mode(mode) => Self::parse(&mode).ok_or_else(|| {
                de::Error::custom(format!(
                    "unknown history mode '{mode}', expected false, \"push\" or \"replace\""
                ))
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiOptions {
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            locale: None,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Configuration pushed into every widget through `Widget::with_config`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiConfig {
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub history: HistoryMode,
    #[serde(default)]
    pub options: UiOptions,
}
