//! 配置管理命令

use anyhow::Result;
use clap::Subcommand;
use std::path::Path;

use crate::config::{CliConfig, default_config_file};

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印生效的配置（文件 + 命令行覆盖）
    Show,

    /// 写入默认配置文件
    Init {
        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(&self, explicit: Option<&Path>, count: Option<usize>) -> Result<()> {
        match self {
            ConfigCommand::Show => Self::show(explicit, count),
            ConfigCommand::Init { force } => Self::init(explicit, *force),
        }
    }

    fn show(explicit: Option<&Path>, count: Option<usize>) -> Result<()> {
        let (config, source) = CliConfig::load(explicit)?;
        let config = config.with_overrides(count)?;

        match source {
            Some(path) => println!("# source: {}", path.display()),
            None => println!("# source: built-in defaults"),
        }
        print!("{}", config.to_toml()?);
        Ok(())
    }

    fn init(explicit: Option<&Path>, force: bool) -> Result<()> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => default_config_file()?,
        };

        CliConfig::default().save(&path, force)?;
        println!("✅ Wrote default config to {}", path.display());
        Ok(())
    }
}
