//! Bean 工厂抽象接口
//!
//! 提供按名称、按类型获取 Bean 的能力。

use crate::bean::{Bean, BeanRef, BeanValue};
use crate::class::BeanClass;
use crate::definition::MergedBeanDefinition;
use crate::registry::{BeanClassRegistry, BeanDefinitionRegistry};
use infrastructure_common::{BeanError, BeanResult, TypeInfo};
use std::sync::Arc;

/// Bean 工厂 trait
pub trait BeanFactory: Send + Sync {
    /// 按名称（或别名）获取 Bean
    fn get_bean(&self, name: &str) -> BeanResult<BeanRef>;

    /// 按名称获取 Bean，显式指定构造参数
    ///
    /// 已缓存的单例忽略参数。
    fn get_bean_with_args(&self, name: &str, args: &[BeanValue]) -> BeanResult<BeanRef>;

    /// 按类型获取唯一 Bean
    fn get_bean_of_type(&self, required_type: &TypeInfo) -> BeanResult<BeanRef>;

    /// 按名称获取 Bean 并校验类型
    fn get_bean_checked(&self, name: &str, required_type: &TypeInfo) -> BeanResult<BeanRef>;

    /// 是否存在该名称（或别名）的定义
    fn contains_bean(&self, name: &str) -> bool;

    /// 是否为单例
    fn is_singleton(&self, name: &str) -> BeanResult<bool>;

    /// 是否为原型
    fn is_prototype(&self, name: &str) -> BeanResult<bool>;

    /// Bean 的类型（无法确定时为 `None`）
    fn get_type(&self, name: &str) -> BeanResult<Option<TypeInfo>>;
}

/// 类型化访问的扩展方法
pub trait BeanFactoryExt: BeanFactory {
    /// 按名称获取 Bean 并转换为具体类型
    ///
    /// 只转换最外层实例，被代理的 Bean 请使用 [`crate::downcast_bean`]。
    fn get_bean_as<T: Bean>(&self, name: &str) -> BeanResult<Arc<T>> {
        let bean = self.get_bean(name)?;
        bean.into_any_arc()
            .downcast::<T>()
            .map_err(|_| BeanError::BeanNotOfRequiredType {
                bean_name: name.to_string(),
                required: std::any::type_name::<T>().to_string(),
                actual: "其他类型".to_string(),
            })
    }

    /// 按类型 `T`（可为 `dyn Trait`）获取唯一 Bean
    fn get_bean_by<T: ?Sized + 'static>(&self) -> BeanResult<BeanRef> {
        self.get_bean_of_type(&TypeInfo::of::<T>())
    }
}

impl<F: BeanFactory + ?Sized> BeanFactoryExt for F {}

/// 可配置的 Bean 工厂
///
/// 工厂级后处理器通过它读写所有定义。
pub trait ConfigurableBeanFactory: BeanFactory + BeanDefinitionRegistry + BeanClassRegistry {
    /// 获取合并后的定义（抽象定义报错）
    fn merged_bean_definition(&self, name: &str) -> BeanResult<MergedBeanDefinition>;

    /// 解析定义最终产出的 Bean 类
    fn resolve_bean_class(&self, name: &str) -> BeanResult<Option<Arc<BeanClass>>>;
}
