//! Configuration module

use crate::io::{charset_for_name, Charset, FastStringWriter};
use crate::{Error, Result};
use dirs::config_dir;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Stream utility settings
    #[serde(default)]
    pub io: IoConfig,
    /// HTTP helper settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// Stream utility configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    /// Working buffer size for copies, in bytes
    #[serde(deserialize_with = "deserialize_size")]
    pub buffer_size: u64,
    /// Scratch buffer size for skips, in bytes
    #[serde(deserialize_with = "deserialize_size")]
    pub skip_buffer_size: u64,
    /// Initial capacity of text buffers, in characters
    pub writer_capacity: i64,
    /// Charset used when a conversion does not name one
    pub default_charset: String,
}

/// HTTP helper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout in seconds
    pub connect_timeout: u64,
    /// Whole-request timeout in seconds (0 = none)
    pub timeout: u64,
    /// User agent sent with every request
    pub user_agent: String,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            buffer_size: crate::io::DEFAULT_BUFFER_SIZE as u64,
            skip_buffer_size: crate::io::SKIP_BUFFER_SIZE as u64,
            writer_capacity: crate::io::fast_string_writer::DEFAULT_INITIAL_CAPACITY as i64,
            default_charset: "UTF-8".to_string(),
        }
    }
}

impl IoConfig {
    /// The configured default charset
    pub fn charset(&self) -> Result<&'static Charset> {
        charset_for_name(&self.default_charset)
    }

    /// A text buffer with the configured initial capacity
    pub fn new_writer(&self) -> Result<FastStringWriter> {
        FastStringWriter::with_initial_size(self.writer_capacity)
    }

    /// Working buffer size as a usize, rejecting zero
    pub fn buffer_size(&self) -> Result<usize> {
        positive_size("buffer size", self.buffer_size)
    }

    /// Skip scratch buffer size as a usize, rejecting zero
    pub fn skip_buffer_size(&self) -> Result<usize> {
        positive_size("skip buffer size", self.skip_buffer_size)
    }
}

fn positive_size(name: &str, value: u64) -> Result<usize> {
    match usize::try_from(value) {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(Error::Config(format!("Invalid {}: {}", name, value))),
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: 10,
            timeout: 30,
            user_agent: crate::http::DEFAULT_USER_AGENT.to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Bytes(u64),
    Text(String),
}

/// Accept either a plain byte count or a string such as `"64KiB"`
fn deserialize_size<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match SizeValue::deserialize(deserializer)? {
        SizeValue::Bytes(bytes) => Ok(bytes),
        SizeValue::Text(text) => {
            parse_size(&text).map_err(|e| D::Error::custom(format!("Failed to parse size: {}", e)))
        }
    }
}

/// Parse size string like "64KiB" to bytes
pub fn parse_size(size_str: &str) -> Result<u64> {
    let size_str = size_str.trim();

    if let Ok(bytes) = size_str.parse::<u64>() {
        return Ok(bytes);
    }

    let split_pos = size_str
        .chars()
        .position(|c| !c.is_ascii_digit() && c != '.')
        .unwrap_or(size_str.len());

    if split_pos == 0 {
        return Err(Error::Config(format!("Invalid size format: {}", size_str)));
    }

    let (number_part, unit_part) = size_str.split_at(split_pos);
    let number: f64 = number_part
        .parse()
        .map_err(|_| Error::Config(format!("Invalid number in size: {}", number_part)))?;

    let multiplier: u64 = match unit_part.trim().to_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => 1_000,
        "m" | "mb" => 1_000_000,
        "g" | "gb" => 1_000_000_000,
        "ki" | "kib" => 1_024,
        "mi" | "mib" => 1_048_576,
        "gi" | "gib" => 1_073_741_824,
        _ => return Err(Error::Config(format!("Unknown size unit: {}", unit_part))),
    };

    Ok((number * multiplier as f64) as u64)
}

impl Config {
    /// Get the configuration file path. Nothing is created on disk.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| Error::Config("Unable to determine config directory".to_string()))?;

        Ok(config_dir.join("chaos").join("config.toml"))
    }

    /// Get default configuration content with comments
    pub fn default_config_content() -> String {
        r#"# Chaos Configuration File

[io]
# Working buffer for copies (bytes or a size such as "4KiB")
buffer_size = "4KiB"
# Scratch buffer for skips
skip_buffer_size = "2KiB"
# Initial capacity of in-memory text buffers, in characters
writer_capacity = 64
# Charset used when none is given
default_charset = "UTF-8"

[http]
# Connect timeout in seconds
connect_timeout = 10
# Whole-request timeout in seconds (0 = none)
timeout = 30
user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_4) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.129 Safari/537.36"

# Extra headers sent with every request
# [http.headers]
# X-Request-Source = "chaos"
"#
        .to_string()
    }

    /// Load configuration from the default location, writing the commented
    /// default file on first use
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            create_parent_dir(&path)?;
            fs::write(&path, Self::default_config_content())?;
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        create_parent_dir(path)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Load configuration or use defaults if loading fails
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

fn create_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}
