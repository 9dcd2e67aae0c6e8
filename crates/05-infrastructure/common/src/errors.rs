//! 错误类型定义

use thiserror::Error;

/// Bean 代码（构造函数、工厂方法、初始化/销毁方法等）抛出的错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 容器错误类型
#[derive(Error, Debug)]
pub enum BeanError {
    #[error("没有名为 '{name}' 的 Bean 定义")]
    NoSuchBeanDefinition { name: String },

    #[error("没有类型为 {type_name} 的可用 Bean")]
    NoSuchBeanOfType { type_name: String },

    #[error("类型 {type_name} 存在多个候选 Bean 且没有唯一的 primary: {candidates:?}")]
    NoUniqueBeanDefinition {
        type_name: String,
        candidates: Vec<String>,
    },

    #[error("创建 Bean '{bean_name}' 失败: {message}: {source}")]
    BeanCreation {
        bean_name: String,
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("容器正在销毁单例，不允许创建 Bean '{bean_name}'")]
    BeanCreationNotAllowed { bean_name: String },

    #[error("检测到循环引用: {chain}")]
    CircularReference { bean_name: String, chain: String },

    #[error("无法加载 Bean '{bean_name}' 的类 '{class_name}'")]
    CannotLoadBeanClass {
        bean_name: String,
        class_name: String,
    },

    #[error("Bean 定义重复: '{name}'")]
    DuplicateDefinition { name: String },

    #[error("Bean '{bean_name}' 是抽象定义，不能实例化")]
    BeanIsAbstract { bean_name: String },

    #[error("Bean 定义无效: '{name}', 原因: {message}")]
    InvalidBeanDefinition { name: String, message: String },

    #[error("Bean '{bean_name}' 的类型不匹配: 期望 {required}, 实际 {actual}")]
    BeanNotOfRequiredType {
        bean_name: String,
        required: String,
        actual: String,
    },

    #[error("Bean '{bean_name}' 的依赖 '{injection_point}' 无法满足: {message}")]
    UnsatisfiedDependency {
        bean_name: String,
        injection_point: String,
        message: String,
    },

    #[error("Bean 上不存在方法: {method}")]
    NoSuchMethod { method: String },

    #[error("解析深度超过上限 {max_depth}: {chain}")]
    ResolutionDepthExceeded { max_depth: usize, chain: String },

    #[error("容器配置错误: {message}")]
    Configuration { message: String },
}

impl BeanError {
    /// 创建未找到定义错误
    pub fn no_such_bean(name: impl Into<String>) -> Self {
        Self::NoSuchBeanDefinition { name: name.into() }
    }

    /// 包装 Bean 代码抛出的错误
    pub fn creation(
        bean_name: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::BeanCreation {
            bean_name: bean_name.into(),
            message: message.into(),
            source: source.into(),
        }
    }

    /// 创建无效定义错误
    pub fn invalid_definition(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidBeanDefinition {
            name: name.into(),
            message: message.into(),
        }
    }

    /// 是否为"未找到"类错误（按名称或按类型）
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoSuchBeanDefinition { .. } | Self::NoSuchBeanOfType { .. }
        )
    }
}

/// 结果类型别名
pub type BeanResult<T> = Result<T, BeanError>;
