//! 方法覆盖包装器
//!
//! 带有方法覆盖指令的 Bean 在实例化时被包装：被覆盖的方法按 Lookup / Replace 语义分派，
//! 其余调用和属性写入原样委托给内部实例。

use di_abstractions::{
    Bean, BeanFactory, BeanValue, MethodDescriptor, MethodOverride, MethodOverrideKind,
    MethodReplacer,
};
use infrastructure_common::{BeanError, BoxError};
use std::sync::Weak;
use tracing::trace;

/// 已解析的覆盖指令
#[derive(Debug, Clone)]
pub struct ResolvedOverride {
    /// 覆盖指令
    pub directive: MethodOverride,
    /// 被覆盖方法的描述
    pub method: MethodDescriptor,
}

/// 方法覆盖包装器
pub struct MethodOverrideBean {
    inner: Box<dyn Bean>,
    overrides: Vec<ResolvedOverride>,
    factory: Weak<dyn BeanFactory>,
}

impl MethodOverrideBean {
    /// 包装实例
    pub fn new(
        inner: Box<dyn Bean>,
        overrides: Vec<ResolvedOverride>,
        factory: Weak<dyn BeanFactory>,
    ) -> Self {
        Self {
            inner,
            overrides,
            factory,
        }
    }

    fn factory(&self) -> Result<std::sync::Arc<dyn BeanFactory>, BoxError> {
        self.factory
            .upgrade()
            .ok_or_else(|| BoxError::from("容器已释放，无法分派被覆盖的方法"))
    }

    fn dispatch(
        &self,
        resolved: &ResolvedOverride,
        args: &[BeanValue],
    ) -> Result<BeanValue, BoxError> {
        let factory = self.factory()?;
        match resolved.directive.kind {
            MethodOverrideKind::Lookup => {
                trace!(
                    "Lookup 覆盖: {} -> {}",
                    resolved.method.name,
                    resolved.directive.reference_name
                );
                let bean = factory.get_bean(&resolved.directive.reference_name)?;
                Ok(BeanValue::Bean(bean))
            }
            MethodOverrideKind::Replace => {
                trace!(
                    "Replace 覆盖: {} -> {}",
                    resolved.method.name,
                    resolved.directive.reference_name
                );
                let replacer_bean = factory.get_bean(&resolved.directive.reference_name)?;
                let replacer = find_replacer(replacer_bean.as_ref()).ok_or_else(|| {
                    BeanError::BeanNotOfRequiredType {
                        bean_name: resolved.directive.reference_name.clone(),
                        required: "MethodReplacer".to_string(),
                        actual: "Bean".to_string(),
                    }
                })?;
                replacer.reimplement(self.inner.as_ref(), &resolved.method, args)
            }
        }
    }
}

/// 在代理链上查找替换器能力
fn find_replacer(bean: &dyn Bean) -> Option<&dyn MethodReplacer> {
    let mut current = bean;
    loop {
        if let Some(replacer) = current.as_method_replacer() {
            return Some(replacer);
        }
        current = current.target()?;
    }
}

impl Bean for MethodOverrideBean {
    fn set_property(&mut self, name: &str, value: BeanValue) -> Result<(), BoxError> {
        self.inner.set_property(name, value)
    }

    fn invoke(&self, method: &str, args: &[BeanValue]) -> Result<BeanValue, BoxError> {
        match self.overrides.iter().find(|o| o.method.name == method) {
            Some(resolved) => self.dispatch(resolved, args),
            None => self.inner.invoke(method, args),
        }
    }

    fn target(&self) -> Option<&dyn Bean> {
        Some(self.inner.as_ref())
    }
}
