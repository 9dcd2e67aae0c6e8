//! # Infrastructure Common
//!
//! Bean 容器各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`BeanError`] - 容器错误
//! - [`BeanScope`] - Bean 作用域
//! - [`AutowireMode`] - 自动装配模式
//! - [`LifecycleState`] - Bean 生命周期状态
//! - [`TypeInfo`] - 类型身份信息

pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
