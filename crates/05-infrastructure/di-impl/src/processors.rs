//! 内置后处理器
//!
//! 基于类元数据中的方法 / 属性标记驱动初始化、销毁和属性注入，以及废弃类告警。

use crate::autowire::write_property;
use di_abstractions::{
    Bean, BeanRef, BeanValue, ConfigurableBeanFactory, DependencyDescriptor, DependencyResolver,
    FactoryPostProcessor, InstancePostProcessor, ProcessingContext,
};
use infrastructure_common::{BeanError, BeanResult};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

/// 初始化标记
pub const POST_CONSTRUCT_MARKER: &str = "post_construct";
/// 销毁标记
pub const PRE_DESTROY_MARKER: &str = "pre_destroy";
/// 自动注入标记
pub const AUTOWIRED_MARKER: &str = "autowired";

/// 按方法标记调用初始化 / 销毁方法
#[derive(Debug, Clone)]
pub struct InitDestroyMarkerPostProcessor {
    init_marker: String,
    destroy_marker: String,
}

impl Default for InitDestroyMarkerPostProcessor {
    fn default() -> Self {
        Self::new(POST_CONSTRUCT_MARKER, PRE_DESTROY_MARKER)
    }
}

impl InitDestroyMarkerPostProcessor {
    /// 使用自定义标记
    pub fn new(init_marker: impl Into<String>, destroy_marker: impl Into<String>) -> Self {
        Self {
            init_marker: init_marker.into(),
            destroy_marker: destroy_marker.into(),
        }
    }

    fn invoke_marked(
        bean: &BeanRef,
        context: &ProcessingContext<'_>,
        marker: &str,
    ) -> BeanResult<()> {
        let Some(class) = context.bean_class else {
            return Ok(());
        };
        for method in class.methods_with_marker(marker) {
            debug!("调用标记方法 [{}]: {}.{}", marker, context.bean_name, method.name);
            bean.invoke(&method.name, &[]).map_err(|e| {
                BeanError::creation(
                    context.bean_name,
                    format!("标记方法 '{}' 执行失败", method.name),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

impl InstancePostProcessor for InitDestroyMarkerPostProcessor {
    fn name(&self) -> &str {
        "init-destroy-marker"
    }

    fn post_process_before_initialization(
        &self,
        bean: BeanRef,
        context: &ProcessingContext<'_>,
    ) -> BeanResult<BeanRef> {
        Self::invoke_marked(&bean, context, &self.init_marker)?;
        Ok(bean)
    }

    fn post_process_before_destruction(
        &self,
        bean: &BeanRef,
        context: &ProcessingContext<'_>,
    ) -> BeanResult<()> {
        Self::invoke_marked(bean, context, &self.destroy_marker)
    }
}

/// 按属性标记注入依赖，与定义的装配模式无关
#[derive(Debug, Clone)]
pub struct AutowiredMarkerPostProcessor {
    marker: String,
}

impl Default for AutowiredMarkerPostProcessor {
    fn default() -> Self {
        Self::new(AUTOWIRED_MARKER)
    }
}

impl AutowiredMarkerPostProcessor {
    /// 使用自定义标记
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl InstancePostProcessor for AutowiredMarkerPostProcessor {
    fn name(&self) -> &str {
        "autowired-marker"
    }

    fn post_process_properties(
        &self,
        bean: &mut dyn Bean,
        context: &ProcessingContext<'_>,
        resolver: &dyn DependencyResolver,
    ) -> BeanResult<()> {
        let Some(class) = context.bean_class else {
            return Ok(());
        };
        for property in class
            .properties
            .iter()
            .filter(|p| p.has_marker(&self.marker))
        {
            if context.definition.property_value(&property.name).is_some() {
                continue;
            }
            let Some(required_type) = property.kind.bean_type() else {
                warn!(
                    "属性 '{}.{}' 带有注入标记但不是 Bean 类型，忽略",
                    context.bean_name, property.name
                );
                continue;
            };
            let descriptor = DependencyDescriptor::new(property.name.clone(), required_type.clone())
                .with_qualifier(property.qualifier.clone())
                .required(property.required);
            if let Some(dependency) = resolver.resolve_dependency(&descriptor)? {
                trace!("标记注入: {}.{}", context.bean_name, property.name);
                write_property(
                    bean,
                    context.bean_name,
                    &property.name,
                    BeanValue::Bean(dependency),
                )?;
            }
        }
        Ok(())
    }
}

/// 为使用废弃类的定义输出告警
#[derive(Debug, Default)]
pub struct DeprecatedBeanWarner {
    warned: Mutex<Vec<String>>,
}

impl DeprecatedBeanWarner {
    /// 创建告警器
    pub fn new() -> Self {
        Self::default()
    }

    /// 已告警的 Bean 名称
    pub fn warned_beans(&self) -> Vec<String> {
        self.warned.lock().clone()
    }
}

impl FactoryPostProcessor for DeprecatedBeanWarner {
    fn name(&self) -> &str {
        "deprecated-bean-warner"
    }

    fn post_process_bean_factory(&self, factory: &dyn ConfigurableBeanFactory) -> BeanResult<()> {
        for name in factory.bean_definition_names() {
            let class = match factory.resolve_bean_class(&name) {
                Ok(Some(class)) => class,
                Ok(None) => continue,
                Err(e) => {
                    debug!("检查废弃类时跳过 '{}': {}", name, e);
                    continue;
                }
            };
            if class.deprecated {
                warn!("Bean '{}' 使用了已废弃的类 '{}'", name, class.name);
                self.warned.lock().push(name);
            }
        }
        Ok(())
    }
}
