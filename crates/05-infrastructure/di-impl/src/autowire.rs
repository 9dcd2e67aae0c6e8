//! 自动装配
//!
//! 候选查找、primary 选择，以及按名称 / 按类型的属性装配。

use crate::factory::DefaultBeanFactory;
use di_abstractions::{
    Bean, BeanClass, BeanFactory, BeanRef, BeanValue, DependencyDescriptor, DependencyResolver,
    MergedBeanDefinition, PropertyDescriptor, ResolveContext,
};
use infrastructure_common::{AutowireMode, BeanError, BeanResult, TypeInfo};
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// 候选集合中恰好一个 primary 时返回它
pub(crate) fn determine_primary(
    candidates: &[(String, Arc<MergedBeanDefinition>)],
) -> Option<String> {
    let mut primaries = candidates.iter().filter(|(_, definition)| definition.primary);
    match (primaries.next(), primaries.next()) {
        (Some((name, _)), None) => Some(name.clone()),
        _ => None,
    }
}

/// 写入属性，失败时附带 Bean 名称
pub(crate) fn write_property(
    bean: &mut dyn Bean,
    bean_name: &str,
    property: &str,
    value: BeanValue,
) -> BeanResult<()> {
    trace!("设置属性: {}.{}", bean_name, property);
    bean.set_property(property, value).map_err(|e| {
        BeanError::creation(bean_name, format!("设置属性 '{property}' 失败"), e)
    })
}

impl DefaultBeanFactory {
    /// 查找类型匹配的候选定义
    ///
    /// 跳过抽象定义和 `autowire_candidate = false` 的定义；无法合并或无法解析类的定义
    /// 不参与匹配。传入依赖描述时再经过候选过滤策略。
    pub(crate) fn find_candidates(
        &self,
        required_type: &TypeInfo,
        exclude: Option<&str>,
        descriptor: Option<&DependencyDescriptor>,
    ) -> Vec<(String, Arc<MergedBeanDefinition>)> {
        let resolver = self.candidate_resolver.read().clone();
        let mut found = Vec::new();
        for name in self.registry.names() {
            if exclude == Some(name.as_str()) {
                continue;
            }
            let merged = match self.merger.merge_unchecked(&self.registry, &name) {
                Ok(merged) => merged,
                Err(e) => {
                    debug!("跳过无法合并的定义 '{}': {}", name, e);
                    continue;
                }
            };
            if merged.is_abstract || !merged.autowire_candidate {
                continue;
            }
            let class = match self.effective_class(&merged) {
                Ok(Some(class)) => class,
                Ok(None) => continue,
                Err(e) => {
                    debug!("跳过无法解析类的定义 '{}': {}", name, e);
                    continue;
                }
            };
            if !class.is_assignable_to(required_type) {
                continue;
            }
            if let Some(descriptor) = descriptor {
                if !resolver.is_autowire_candidate(&name, &merged, descriptor) {
                    continue;
                }
            }
            found.push((name, merged));
        }
        found
    }

    /// 为 `requesting` 解析一个依赖
    ///
    /// 多个候选时使用唯一的 primary；必需依赖无法满足时报错，可选依赖返回 `None`。
    pub(crate) fn resolve_dependency_for(
        &self,
        requesting: &str,
        descriptor: &DependencyDescriptor,
        context: &mut ResolveContext,
    ) -> BeanResult<Option<BeanRef>> {
        let candidates =
            self.find_candidates(&descriptor.required_type, Some(requesting), Some(descriptor));
        let chosen = match candidates.as_slice() {
            [] if descriptor.required => {
                return Err(BeanError::UnsatisfiedDependency {
                    bean_name: requesting.to_string(),
                    injection_point: descriptor.name.clone(),
                    message: format!("没有类型为 {} 的候选 Bean", descriptor.required_type),
                });
            }
            [] => {
                trace!("可选依赖没有候选: {}.{}", requesting, descriptor.name);
                return Ok(None);
            }
            [(name, _)] => name.clone(),
            _ => match determine_primary(&candidates) {
                Some(name) => name,
                None => {
                    let names: Vec<String> = candidates.iter().map(|(n, _)| n.clone()).collect();
                    if descriptor.required {
                        return Err(BeanError::NoUniqueBeanDefinition {
                            type_name: descriptor.required_type.to_string(),
                            candidates: names,
                        });
                    }
                    warn!(
                        "注入点 '{}.{}' 有多个候选且没有唯一的 primary，保持未设置: {:?}",
                        requesting, descriptor.name, names
                    );
                    return Ok(None);
                }
            },
        };

        debug!("为 '{}.{}' 注入 Bean '{}'", requesting, descriptor.name, chosen);
        self.do_get_bean(&chosen, None, context).map(Some)
    }

    /// 按定义的装配模式填充未显式赋值的 Bean 属性
    pub(crate) fn autowire_properties(
        &self,
        name: &str,
        merged: &MergedBeanDefinition,
        class: &BeanClass,
        bean: &mut dyn Bean,
        context: &mut ResolveContext,
    ) -> BeanResult<()> {
        if merged.autowire_mode == AutowireMode::No {
            return Ok(());
        }
        let properties: Vec<&PropertyDescriptor> = class
            .properties
            .iter()
            .filter(|p| p.kind.bean_type().is_some() && merged.property_value(&p.name).is_none())
            .collect();

        for property in properties {
            let dependency = match merged.autowire_mode {
                AutowireMode::ByName => {
                    if property.name == name || !self.contains_bean(&property.name) {
                        trace!("按名称装配跳过: {}.{}", name, property.name);
                        continue;
                    }
                    Some(self.do_get_bean(&property.name, None, context)?)
                }
                AutowireMode::ByType => {
                    let Some(required_type) = property.kind.bean_type() else {
                        continue;
                    };
                    let descriptor =
                        DependencyDescriptor::new(property.name.clone(), required_type.clone())
                            .with_qualifier(property.qualifier.clone())
                            .required(property.required);
                    self.resolve_dependency_for(name, &descriptor, context)?
                }
                AutowireMode::No => None,
            };
            if let Some(dependency) = dependency {
                write_property(bean, name, &property.name, BeanValue::Bean(dependency))?;
            }
        }
        Ok(())
    }
}

/// 创建过程中交给后处理器的依赖解析器
///
/// 持有当前的解析上下文，后处理器触发的依赖创建同样受循环检测和深度限制约束。
pub(crate) struct BeanCreationResolver<'a> {
    factory: &'a DefaultBeanFactory,
    bean_name: &'a str,
    context: RefCell<&'a mut ResolveContext>,
}

impl<'a> BeanCreationResolver<'a> {
    pub(crate) fn new(
        factory: &'a DefaultBeanFactory,
        bean_name: &'a str,
        context: &'a mut ResolveContext,
    ) -> Self {
        Self {
            factory,
            bean_name,
            context: RefCell::new(context),
        }
    }
}

impl DependencyResolver for BeanCreationResolver<'_> {
    fn resolve_dependency(&self, descriptor: &DependencyDescriptor) -> BeanResult<Option<BeanRef>> {
        let mut context = self.context.borrow_mut();
        self.factory
            .resolve_dependency_for(self.bean_name, descriptor, &mut context)
    }

    fn resolve_by_name(&self, name: &str) -> BeanResult<Option<BeanRef>> {
        if name == self.bean_name || !self.factory.contains_bean(name) {
            return Ok(None);
        }
        let mut context = self.context.borrow_mut();
        self.factory.do_get_bean(name, None, &mut context).map(Some)
    }
}
