//! 容器配置加载
//!
//! 来源按优先级从低到高：内置默认值、配置文件（格式由扩展名决定）、带前缀的环境变量。

use di_abstractions::ContainerConfig;
use infrastructure_common::{BeanError, BeanResult};
use std::path::PathBuf;
use tracing::{debug, error};

/// 默认环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "IOC";

/// 容器配置加载器
#[derive(Debug, Clone)]
pub struct ContainerConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ContainerConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerConfigLoader {
    /// 只使用默认值和环境变量
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// 追加配置文件，文件必须存在
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// 自定义环境变量前缀，如 `IOC_MAX_RESOLUTION_DEPTH`
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// 加载配置
    pub fn load(&self) -> BeanResult<ContainerConfig> {
        let mut builder = config::Config::builder();
        if let Some(file) = &self.file {
            debug!("加载容器配置文件: {}", file.display());
            builder = builder.add_source(config::File::from(file.as_path()).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("inferred_destroy_methods"),
        );

        let settings = builder.build().map_err(|e| {
            error!("容器配置构建失败: {}", e);
            BeanError::Configuration {
                message: e.to_string(),
            }
        })?;
        let loaded: ContainerConfig = settings.try_deserialize().map_err(|e| {
            error!("容器配置解析失败: {}", e);
            BeanError::Configuration {
                message: e.to_string(),
            }
        })?;
        debug!("容器配置: {:?}", loaded);
        Ok(loaded)
    }
}
