//! # Dependency Injection Abstractions
//!
//! Bean 容器抽象层，定义 Bean 能力接口、定义模型和容器各扩展点。
//!
//! ## 核心接口
//!
//! - [`Bean`] - 容器管理对象的能力接口
//! - [`BeanDefinition`] / [`MergedBeanDefinition`] - Bean 定义及合并视图
//! - [`BeanClass`] - 类元数据
//! - [`BeanDefinitionRegistry`] - 定义注册表接口
//! - [`BeanFactory`] - Bean 获取接口
//! - [`InstancePostProcessor`] / [`FactoryPostProcessor`] - 后处理器接口
//! - [`DependencyResolver`] / [`AutowireCandidateResolver`] - 依赖解析接口
//! - [`MethodReplacer`] / [`MethodInterceptor`] - 方法拦截接口

pub mod bean;
pub mod class;
pub mod container;
pub mod definition;
pub mod factory;
pub mod interception;
pub mod processor;
pub mod registry;
pub mod resolver;

pub use bean::*;
pub use class::*;
pub use container::*;
pub use definition::*;
pub use factory::*;
pub use interception::*;
pub use processor::*;
pub use registry::*;
pub use resolver::*;
