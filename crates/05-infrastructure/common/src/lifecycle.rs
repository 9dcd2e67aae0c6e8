//! Bean 作用域、自动装配模式与生命周期状态

use serde::{Deserialize, Serialize};

/// Bean 作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeanScope {
    /// 单例 - 容器内只创建一个实例
    #[default]
    Singleton,
    /// 原型 - 每次请求都创建新实例，容器不缓存
    Prototype,
}

impl BeanScope {
    /// 作用域名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::Prototype => "prototype",
        }
    }
}

impl std::fmt::Display for BeanScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 自动装配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutowireMode {
    /// 不自动装配
    #[default]
    No,
    /// 按属性名称装配
    ByName,
    /// 按属性类型装配
    ByType,
}

/// Bean 生命周期状态
///
/// 构造路径: `Created -> PropertiesPopulated -> PreInit -> Initialized -> PostInit -> Active`，
/// `Destroyed` 只能通过显式销毁到达。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// 原始实例已创建
    #[default]
    Created,
    /// 属性已填充
    PropertiesPopulated,
    /// 正在执行初始化前钩子
    PreInit,
    /// 初始化方法已执行
    Initialized,
    /// 正在执行初始化后钩子
    PostInit,
    /// 可用
    Active,
    /// 已销毁
    Destroyed,
}

impl LifecycleState {
    /// 构造路径上的下一个状态
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::PropertiesPopulated),
            Self::PropertiesPopulated => Some(Self::PreInit),
            Self::PreInit => Some(Self::Initialized),
            Self::Initialized => Some(Self::PostInit),
            Self::PostInit => Some(Self::Active),
            Self::Active | Self::Destroyed => None,
        }
    }

    /// 是否允许迁移到目标状态
    pub fn can_transition_to(self, target: Self) -> bool {
        match target {
            Self::Destroyed => self == Self::Active,
            _ => self.next() == Some(target),
        }
    }

    /// 是否为终止状态
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Active | Self::Destroyed)
    }
}
