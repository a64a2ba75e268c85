use charlcd::config::{CustomChar, DisplayConfig, HexByte};
use dotenv::var;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub display: DisplayConfig,
    /// Format of the clock line, in `time` format description syntax.
    #[serde(default = "default_clock_format")]
    pub clock_format: String,
}

fn default_clock_format() -> String {
    "[hour]:[minute]:[second]".to_string()
}

fn config_path() -> PathBuf {
    PathBuf::from(var("CONFIG_FILE").unwrap_or_else(|_| "lcd.json".to_string()))
}

impl Config {
    /// Loads the config from `CONFIG_FILE`, or `lcd.json` if that's not set.
    ///
    /// Returns `None` only if the file doesn't exist. A file that can't be read or parsed is an error,
    /// so it never gets overwritten by the default.
    pub fn try_load() -> eyre::Result<Option<Self>> {
        Self::load_from(&config_path())
    }

    fn load_from(config_path: &Path) -> eyre::Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)
            .wrap_err_with(|| format!("Can't open {}", config_path.display()))?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .wrap_err_with(|| format!("Invalid config in {}", config_path.display()))?;
        Ok(Some(config))
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&config_path())
    }

    fn save_to(&self, config_path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(config_path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut display = DisplayConfig::new(20, 4);
        display.custom_chars.push(CustomChar {
            character: "°".to_string(),
            pixel_data: [0x0C, 0x12, 0x12, 0x0C, 0x00, 0x00, 0x00, 0x00]
                .into_iter()
                .map(HexByte)
                .collect(),
        });
        Config {
            display,
            clock_format: default_clock_format(),
        }
    }
}
