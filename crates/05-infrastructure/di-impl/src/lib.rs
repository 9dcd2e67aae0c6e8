//! # 依赖注入具体实现
//!
//! 提供默认的 Bean 容器 [`DefaultBeanFactory`]：定义注册与别名、父子定义合并、单例 / 原型
//! 作用域、构造与工厂方法实例化、自动装配、生命周期回调、方法覆盖和代理。
//!
//! ```no_run
//! use di_abstractions::{BeanClassRegistry, BeanDefinition, BeanDefinitionRegistry, BeanFactory};
//! use di_impl::DefaultBeanFactory;
//!
//! # fn register(factory: &DefaultBeanFactory) -> infrastructure_common::BeanResult<()> {
//! factory.register_bean_definition("service", BeanDefinition::of_class("Service"))?;
//! factory.pre_instantiate_singletons()?;
//! let service = factory.get_bean("service")?;
//! # let _ = service;
//! # Ok(())
//! # }
//! ```

mod autowire;
mod creation;

pub mod config;
pub mod factory;
pub mod lifecycle;
pub mod merger;
pub mod override_proxy;
pub mod processors;
pub mod proxy;
pub mod registry;
pub mod singleton;

pub use config::{ContainerConfigLoader, DEFAULT_ENV_PREFIX};
pub use factory::DefaultBeanFactory;
pub use override_proxy::{MethodOverrideBean, ResolvedOverride};
pub use processors::{
    AutowiredMarkerPostProcessor, DeprecatedBeanWarner, InitDestroyMarkerPostProcessor,
    AUTOWIRED_MARKER, POST_CONSTRUCT_MARKER, PRE_DESTROY_MARKER,
};
pub use proxy::{
    Advisor, AutoProxyPostProcessor, FixedValueInterceptor, MethodMatcher, ProxyBean,
    ProxyFactory,
};
