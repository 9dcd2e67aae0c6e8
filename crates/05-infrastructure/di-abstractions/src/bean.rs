//! Bean 能力接口
//!
//! 容器不做运行时反射，所有 Bean 都通过 [`Bean`] trait 暴露属性写入和方法调用。
//! 方法覆盖与代理都实现同一个 trait，调用方无需区分原始实例和包装实例。

use crate::interception::MethodReplacer;
use infrastructure_common::{BeanError, BoxError};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 共享的 Bean 实例
pub type BeanRef = Arc<dyn Bean>;

/// 向下转型支持
///
/// 对所有 `Any + Send + Sync` 类型自动实现。
pub trait AsAny: Any + Send + Sync {
    /// 以 `&dyn Any` 访问
    fn as_any(&self) -> &dyn Any;

    /// 转换为 `Arc<dyn Any>`，用于 `Arc::downcast`
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// 容器管理的对象
pub trait Bean: AsAny {
    /// 写入属性，只在实例共享之前（属性填充阶段）调用
    fn set_property(&mut self, name: &str, value: BeanValue) -> Result<(), BoxError> {
        let _ = value;
        Err(format!("属性不可写: {name}").into())
    }

    /// 按名称调用方法
    fn invoke(&self, method: &str, args: &[BeanValue]) -> Result<BeanValue, BoxError> {
        let _ = args;
        Err(BeanError::NoSuchMethod {
            method: method.to_string(),
        }
        .into())
    }

    /// 被包装的目标实例（代理和方法覆盖包装器返回 `Some`）
    fn target(&self) -> Option<&dyn Bean> {
        None
    }

    /// 作为方法替换器使用
    fn as_method_replacer(&self) -> Option<&dyn MethodReplacer> {
        None
    }
}

impl fmt::Debug for dyn Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bean@{:p}", self as *const dyn Bean as *const ())
    }
}

/// 向下转型到具体类型，必要时穿透代理
pub fn downcast_bean<T: Any>(bean: &dyn Bean) -> Option<&T> {
    let mut current = bean;
    loop {
        if let Some(found) = current.as_any().downcast_ref::<T>() {
            return Some(found);
        }
        current = current.target()?;
    }
}

/// 最内层的目标实例
pub fn ultimate_target(bean: &dyn Bean) -> &dyn Bean {
    let mut current = bean;
    while let Some(inner) = current.target() {
        current = inner;
    }
    current
}

/// 穿过 Bean 能力接口传递的值
#[derive(Clone, Default)]
pub enum BeanValue {
    /// 空值 / 无返回值
    #[default]
    Null,
    /// 字面量
    Value(serde_json::Value),
    /// Bean 引用
    Bean(BeanRef),
}

impl BeanValue {
    /// 是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 获取字面量
    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// 获取字符串字面量
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(serde_json::Value::as_str)
    }

    /// 获取整数字面量
    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(serde_json::Value::as_i64)
    }

    /// 获取 Bean 引用
    pub fn as_bean(&self) -> Option<&BeanRef> {
        match self {
            Self::Bean(bean) => Some(bean),
            _ => None,
        }
    }

    /// 取出 Bean 引用
    pub fn into_bean(self) -> Option<BeanRef> {
        match self {
            Self::Bean(bean) => Some(bean),
            _ => None,
        }
    }
}

impl fmt::Debug for BeanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Value(value) => write!(f, "Value({value})"),
            Self::Bean(bean) => write!(f, "Bean({:?})", bean.as_ref()),
        }
    }
}

impl From<serde_json::Value> for BeanValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Value(value)
    }
}

impl From<BeanRef> for BeanValue {
    fn from(bean: BeanRef) -> Self {
        Self::Bean(bean)
    }
}

impl From<&str> for BeanValue {
    fn from(value: &str) -> Self {
        Self::Value(serde_json::Value::String(value.to_string()))
    }
}

impl From<String> for BeanValue {
    fn from(value: String) -> Self {
        Self::Value(serde_json::Value::String(value))
    }
}

impl From<i64> for BeanValue {
    fn from(value: i64) -> Self {
        Self::Value(serde_json::Value::from(value))
    }
}

impl From<bool> for BeanValue {
    fn from(value: bool) -> Self {
        Self::Value(serde_json::Value::Bool(value))
    }
}
