//! CLI 配置文件
//!
//! 查找顺序：`--config` 指定的路径 → `<config_dir>/fleet-cli/config.toml` → 内置默认值。
//! 命令行参数覆盖文件中的值。

use anyhow::{Context, Result, bail};
use fleet_sdk::bus::BusConfig;
use fleet_sdk::driver::FleetConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Unable to determine config directory")?;
    path.push("fleet-cli");
    path.push("config.toml");
    Ok(path)
}

/// 模拟器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// 收到目标到发布结果之间的延迟（毫秒）
    pub result_delay_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            result_delay_ms: 500,
        }
    }
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub fleet: FleetConfig,
    pub bus: BusConfig,
    pub simulator: SimulatorConfig,
}

impl CliConfig {
    /// 从文件解析
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// 加载配置
    ///
    /// 显式指定的路径必须存在；默认路径不存在时使用内置默认值。
    /// 返回配置和实际读取的文件（如果有）。
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        let path = default_config_file()?;
        if path.exists() {
            let config = Self::from_file(&path)?;
            Ok((config, Some(path)))
        } else {
            Ok((Self::default(), None))
        }
    }

    /// 应用命令行覆盖并校验
    pub fn with_overrides(mut self, count: Option<usize>) -> Result<Self> {
        if let Some(count) = count {
            self.fleet.count = count;
        }
        self.fleet.validate().context("Invalid fleet configuration")?;
        Ok(self)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// 写入文件（父目录不存在时创建）
    pub fn save(&self, path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!(
                "Config file {} already exists (use --force to overwrite)",
                path.display()
            );
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = format!("# Fleet CLI Configuration\n\n{}", self.to_toml()?);
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CliConfig::default();
        config.fleet.count = 3;
        config.bus.queue_size = 4;
        config.save(&path, false).unwrap();

        let (loaded, source) = CliConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_save_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        CliConfig::default().save(&path, false).unwrap();
        assert!(CliConfig::default().save(&path, false).is_err());
        assert!(CliConfig::default().save(&path, true).is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[fleet]
name_prefix = "tb3"

[fleet.topics]
movement_topic = "mobile_base/cmd_vel"
"#,
        )
        .unwrap();

        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.fleet.name_prefix, "tb3");
        assert_eq!(config.fleet.count, 5);
        assert_eq!(config.fleet.topics.movement_topic, "mobile_base/cmd_vel");
        assert_eq!(config.fleet.topics.odom_topic, "odom");
        assert_eq!(config.bus, BusConfig::default());
        assert_eq!(config.simulator.result_delay_ms, 500);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CliConfig::load(Some(dir.path().join("absent.toml").as_path())).is_err());
    }

    #[test]
    fn test_count_override() {
        let config = CliConfig::default().with_overrides(Some(2)).unwrap();
        assert_eq!(config.fleet.count, 2);
        assert!(CliConfig::default().with_overrides(Some(0)).is_err());
    }
}
