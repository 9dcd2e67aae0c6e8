//! 后处理器抽象接口
//!
//! - [`FactoryPostProcessor`] - 工厂级，在任何 Bean 实例化之前运行一次
//! - [`InstancePostProcessor`] - 实例级，包裹每一个 Bean 的初始化过程

use crate::bean::{Bean, BeanRef};
use crate::class::BeanClass;
use crate::definition::MergedBeanDefinition;
use crate::factory::ConfigurableBeanFactory;
use crate::resolver::DependencyResolver;
use infrastructure_common::BeanResult;

/// 后处理器看到的 Bean 上下文
#[derive(Debug, Clone, Copy)]
pub struct ProcessingContext<'a> {
    /// Bean 名称
    pub bean_name: &'a str,
    /// 合并后的定义
    pub definition: &'a MergedBeanDefinition,
    /// 产出实例的类（实例工厂方法未声明返回类时为空）
    pub bean_class: Option<&'a BeanClass>,
}

/// 实例级后处理器
///
/// 所有钩子默认不做任何事；初始化前后钩子可以返回替换对象。
pub trait InstancePostProcessor: Send + Sync {
    /// 处理器名称
    fn name(&self) -> &str;

    /// 属性填充阶段，在自动装配之后、显式属性值之前运行
    fn post_process_properties(
        &self,
        _bean: &mut dyn Bean,
        _context: &ProcessingContext<'_>,
        _resolver: &dyn DependencyResolver,
    ) -> BeanResult<()> {
        Ok(())
    }

    /// 初始化方法之前运行
    fn post_process_before_initialization(
        &self,
        bean: BeanRef,
        _context: &ProcessingContext<'_>,
    ) -> BeanResult<BeanRef> {
        Ok(bean)
    }

    /// 初始化方法之后运行，返回值即对外可见的 Bean
    fn post_process_after_initialization(
        &self,
        bean: BeanRef,
        _context: &ProcessingContext<'_>,
    ) -> BeanResult<BeanRef> {
        Ok(bean)
    }

    /// 销毁方法之前运行
    fn post_process_before_destruction(
        &self,
        _bean: &BeanRef,
        _context: &ProcessingContext<'_>,
    ) -> BeanResult<()> {
        Ok(())
    }
}

/// 工厂级后处理器
pub trait FactoryPostProcessor: Send + Sync {
    /// 处理器名称
    fn name(&self) -> &str;

    /// 读写所有已注册的定义
    fn post_process_bean_factory(&self, factory: &dyn ConfigurableBeanFactory) -> BeanResult<()>;
}
