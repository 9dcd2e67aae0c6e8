//! 实例化引擎
//!
//! 依赖顺序 -> 原始实例（工厂方法 / 构造函数 / 方法覆盖包装）-> 属性填充 -> 生命周期。

use crate::autowire::{write_property, BeanCreationResolver};
use crate::factory::DefaultBeanFactory;
use crate::lifecycle;
use crate::override_proxy::{MethodOverrideBean, ResolvedOverride};
use crate::singleton::DisposableInfo;
use di_abstractions::{
    Bean, BeanClass, BeanRef, BeanValue, ConstructorDescriptor, DependencyDescriptor,
    MergedBeanDefinition, ParameterDescriptor, ProcessingContext, PropertyKind, PropertyValue,
    ResolveContext,
};
use infrastructure_common::{BeanError, BeanResult, LifecycleState};
use std::sync::Arc;
use tracing::{debug, trace};

/// 原始实例
enum RawBean {
    /// 容器独占，可直接填充属性
    Owned(Box<dyn Bean>),
    /// 实例工厂方法返回的共享实例
    Shared(BeanRef),
}

impl DefaultBeanFactory {
    /// 创建 Bean（不含缓存逻辑）
    pub(crate) fn create_bean(
        &self,
        name: &str,
        merged: &Arc<MergedBeanDefinition>,
        args: Option<&[BeanValue]>,
        context: &mut ResolveContext,
    ) -> BeanResult<(BeanRef, DisposableInfo)> {
        debug!("创建 Bean: {} (作用域: {})", name, merged.scope);
        for dependency in &merged.depends_on {
            trace!("Bean '{}' 依赖于 '{}'，先行创建", name, dependency);
            self.do_get_bean(dependency, None, context)?;
        }

        let bean_class = self.effective_class(merged)?;
        let raw = self.instantiate(name, merged, args, context)?;
        let bean: BeanRef = match raw {
            RawBean::Owned(mut owned) => {
                self.populate(name, merged, bean_class.as_deref(), owned.as_mut(), context)?;
                Arc::from(owned)
            }
            RawBean::Shared(mut shared) => {
                match Arc::get_mut(&mut shared) {
                    Some(exclusive) => {
                        self.populate(name, merged, bean_class.as_deref(), exclusive, context)?;
                    }
                    None if merged.property_values.is_empty() => {
                        debug!("实例工厂方法返回共享实例，跳过属性填充: {}", name);
                    }
                    None => {
                        return Err(BeanError::creation(
                            name,
                            "无法为共享实例设置属性",
                            "实例工厂方法返回的实例已被其他对象持有",
                        ));
                    }
                }
                shared
            }
        };
        self.track_state(name, merged, LifecycleState::PropertiesPopulated);

        let processors = self.instance_processors.read().clone();
        let processing = ProcessingContext {
            bean_name: name,
            definition: merged,
            bean_class: bean_class.as_deref(),
        };
        let bean = lifecycle::initialize(bean, &processing, &processors, |state| {
            self.track_state(name, merged, state);
        })?;

        self.stats.record_created();
        Ok((
            bean,
            DisposableInfo {
                definition: merged.clone(),
                bean_class,
            },
        ))
    }

    /// 解析定义最终产出的类
    pub(crate) fn effective_class(
        &self,
        merged: &MergedBeanDefinition,
    ) -> BeanResult<Option<Arc<BeanClass>>> {
        self.effective_class_guarded(merged, &mut Vec::new())
    }

    fn effective_class_guarded(
        &self,
        merged: &MergedBeanDefinition,
        visited: &mut Vec<String>,
    ) -> BeanResult<Option<Arc<BeanClass>>> {
        if visited.contains(&merged.name) {
            return Err(BeanError::invalid_definition(
                &merged.name,
                format!("工厂 Bean 引用存在循环: {}", visited.join(" -> ")),
            ));
        }
        visited.push(merged.name.clone());

        if let Some(factory_bean) = &merged.factory_bean_name {
            let method = merged.factory_method_name.as_deref().ok_or_else(|| {
                BeanError::invalid_definition(&merged.name, "指定了工厂 Bean 但缺少工厂方法")
            })?;
            let factory_definition = self.merger.merge_unchecked(&self.registry, factory_bean)?;
            let Some(factory_class) = self.effective_class_guarded(&factory_definition, visited)?
            else {
                return Ok(None);
            };
            return match factory_class.find_method(method).and_then(|m| m.returns.as_deref()) {
                Some(product) => self.load_class(&merged.name, product).map(Some),
                None => Ok(None),
            };
        }

        let Some(class_name) = &merged.bean_class_name else {
            return Ok(None);
        };
        let class = self.load_class(&merged.name, class_name)?;
        if let Some(method) = &merged.factory_method_name {
            let factory_method = class.find_factory_method(method).ok_or_else(|| {
                BeanError::invalid_definition(
                    &merged.name,
                    format!("类 '{class_name}' 没有静态工厂方法 '{method}'"),
                )
            })?;
            if let Some(product) = &factory_method.product_class {
                return self.load_class(&merged.name, product).map(Some);
            }
        }
        Ok(Some(class))
    }

    /// 按类名加载类元数据
    pub(crate) fn load_class(&self, bean_name: &str, class_name: &str) -> BeanResult<Arc<BeanClass>> {
        self.classes
            .get(class_name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BeanError::CannotLoadBeanClass {
                bean_name: bean_name.to_string(),
                class_name: class_name.to_string(),
            })
    }

    /// 解析属性值 / 构造参数
    pub(crate) fn resolve_value(
        &self,
        value: &PropertyValue,
        context: &mut ResolveContext,
    ) -> BeanResult<BeanValue> {
        match value {
            PropertyValue::Literal(literal) => Ok(BeanValue::Value(literal.clone())),
            PropertyValue::Reference(reference) => {
                Ok(BeanValue::Bean(self.do_get_bean(reference, None, context)?))
            }
        }
    }

    fn track_state(&self, name: &str, merged: &MergedBeanDefinition, state: LifecycleState) {
        if merged.is_singleton() {
            self.singletons.transition(name, state);
        } else {
            trace!("原型 Bean '{}' 状态: {:?}", name, state);
        }
    }

    fn instantiate(
        &self,
        name: &str,
        merged: &MergedBeanDefinition,
        args: Option<&[BeanValue]>,
        context: &mut ResolveContext,
    ) -> BeanResult<RawBean> {
        if let Some(method) = &merged.factory_method_name {
            if merged.has_method_overrides() {
                return Err(BeanError::invalid_definition(
                    name,
                    "工厂方法创建的 Bean 不支持方法覆盖",
                ));
            }
            return match &merged.factory_bean_name {
                Some(factory_bean) => {
                    self.instantiate_with_instance_factory(name, merged, factory_bean, method, args, context)
                }
                None => self
                    .instantiate_with_static_factory(name, merged, method, args, context)
                    .map(RawBean::Owned),
            };
        }

        let class_name = merged
            .bean_class_name
            .as_deref()
            .ok_or_else(|| BeanError::invalid_definition(name, "缺少 Bean 类"))?;
        let class = self.load_class(name, class_name)?;
        let overrides = self.resolve_overrides(name, merged, &class)?;
        let raw = self.instantiate_with_constructor(name, merged, &class, args, context)?;
        if overrides.is_empty() {
            return Ok(RawBean::Owned(raw));
        }
        debug!("Bean '{}' 带有 {} 个方法覆盖，创建包装器", name, overrides.len());
        Ok(RawBean::Owned(Box::new(MethodOverrideBean::new(
            raw,
            overrides,
            self.self_ref.clone(),
        ))))
    }

    fn resolve_overrides(
        &self,
        name: &str,
        merged: &MergedBeanDefinition,
        class: &BeanClass,
    ) -> BeanResult<Vec<ResolvedOverride>> {
        merged
            .method_overrides
            .iter()
            .map(|directive| {
                let method = class.find_method(&directive.method_name).ok_or_else(|| {
                    BeanError::invalid_definition(
                        name,
                        format!(
                            "方法覆盖引用了类 '{}' 未声明的方法 '{}'",
                            class.name, directive.method_name
                        ),
                    )
                })?;
                Ok(ResolvedOverride {
                    directive: directive.clone(),
                    method: method.clone(),
                })
            })
            .collect()
    }

    fn instantiate_with_constructor(
        &self,
        name: &str,
        merged: &MergedBeanDefinition,
        class: &BeanClass,
        args: Option<&[BeanValue]>,
        context: &mut ResolveContext,
    ) -> BeanResult<Box<dyn Bean>> {
        let (constructor, values) =
            if let Some(values) = self.explicit_arguments(merged, args, context)? {
                let constructor = class.constructor_with_arity(values.len()).ok_or_else(|| {
                    BeanError::invalid_definition(
                        name,
                        format!("类 '{}' 没有 {} 个参数的构造函数", class.name, values.len()),
                    )
                })?;
                (constructor, values)
            } else if let Some(constructor) = class.default_constructor() {
                (constructor, Vec::new())
            } else {
                self.autowire_constructor(name, class, context)?
            };

        trace!("调用构造函数: {} (参数 {} 个)", class.name, values.len());
        (constructor.create)(&values).map_err(|e| BeanError::creation(name, "构造函数执行失败", e))
    }

    /// 选择参数全部可满足的、参数最多的构造函数
    fn autowire_constructor<'c>(
        &self,
        name: &str,
        class: &'c BeanClass,
        context: &mut ResolveContext,
    ) -> BeanResult<(&'c ConstructorDescriptor, Vec<BeanValue>)> {
        let mut constructors: Vec<&ConstructorDescriptor> = class
            .constructors
            .iter()
            .filter(|c| c.is_autowirable())
            .collect();
        constructors.sort_by(|a, b| b.arity().cmp(&a.arity()));

        for constructor in constructors {
            let satisfiable = constructor.parameters.iter().all(|p| {
                p.kind
                    .bean_type()
                    .is_some_and(|t| !self.find_candidates(t, Some(name), None).is_empty())
            });
            if !satisfiable {
                continue;
            }
            let values = constructor
                .parameters
                .iter()
                .map(|p| self.resolve_parameter(name, p, context))
                .collect::<BeanResult<Vec<_>>>()?;
            return Ok((constructor, values));
        }

        Err(BeanError::invalid_definition(
            name,
            format!("类 '{}' 没有可用的构造函数", class.name),
        ))
    }

    fn instantiate_with_static_factory(
        &self,
        name: &str,
        merged: &MergedBeanDefinition,
        method: &str,
        args: Option<&[BeanValue]>,
        context: &mut ResolveContext,
    ) -> BeanResult<Box<dyn Bean>> {
        let class_name = merged
            .bean_class_name
            .as_deref()
            .ok_or_else(|| BeanError::invalid_definition(name, "静态工厂方法缺少声明类"))?;
        let declaring = self.load_class(name, class_name)?;
        let factory_method = declaring.find_factory_method(method).ok_or_else(|| {
            BeanError::invalid_definition(
                name,
                format!("类 '{class_name}' 没有静态工厂方法 '{method}'"),
            )
        })?;

        let values = match self.explicit_arguments(merged, args, context)? {
            Some(values) if values.len() == factory_method.parameters.len() => values,
            Some(values) => {
                return Err(BeanError::invalid_definition(
                    name,
                    format!(
                        "工厂方法 '{method}' 需要 {} 个参数，实际提供 {} 个",
                        factory_method.parameters.len(),
                        values.len()
                    ),
                ));
            }
            None => factory_method
                .parameters
                .iter()
                .map(|p| self.resolve_parameter(name, p, context))
                .collect::<BeanResult<Vec<_>>>()?,
        };

        debug!("调用静态工厂方法: {}.{}", class_name, method);
        (factory_method.create)(&values)
            .map_err(|e| BeanError::creation(name, format!("静态工厂方法 '{method}' 执行失败"), e))
    }

    fn instantiate_with_instance_factory(
        &self,
        name: &str,
        merged: &MergedBeanDefinition,
        factory_bean: &str,
        method: &str,
        args: Option<&[BeanValue]>,
        context: &mut ResolveContext,
    ) -> BeanResult<RawBean> {
        let factory = self.do_get_bean(factory_bean, None, context)?;
        let values = self
            .explicit_arguments(merged, args, context)?
            .unwrap_or_default();

        debug!("调用实例工厂方法: {}.{}", factory_bean, method);
        let produced = factory.invoke(method, &values).map_err(|e| {
            BeanError::creation(
                name,
                format!("实例工厂方法 '{factory_bean}.{method}' 执行失败"),
                e,
            )
        })?;
        match produced {
            BeanValue::Bean(bean) => Ok(RawBean::Shared(bean)),
            other => Err(BeanError::creation(
                name,
                format!("实例工厂方法 '{factory_bean}.{method}' 没有返回 Bean"),
                format!("返回值: {other:?}"),
            )),
        }
    }

    /// 调用参数优先，其次是定义中的构造参数
    fn explicit_arguments(
        &self,
        merged: &MergedBeanDefinition,
        args: Option<&[BeanValue]>,
        context: &mut ResolveContext,
    ) -> BeanResult<Option<Vec<BeanValue>>> {
        if let Some(args) = args {
            return Ok(Some(args.to_vec()));
        }
        if merged.constructor_args.is_empty() {
            return Ok(None);
        }
        merged
            .constructor_args
            .iter()
            .map(|value| self.resolve_value(value, context))
            .collect::<BeanResult<Vec<_>>>()
            .map(Some)
    }

    /// 按类型解析必需的参数
    fn resolve_parameter(
        &self,
        name: &str,
        parameter: &ParameterDescriptor,
        context: &mut ResolveContext,
    ) -> BeanResult<BeanValue> {
        let PropertyKind::Bean(required_type) = &parameter.kind else {
            return Err(BeanError::UnsatisfiedDependency {
                bean_name: name.to_string(),
                injection_point: parameter.name.clone(),
                message: "简单类型参数必须显式提供".to_string(),
            });
        };
        let descriptor =
            DependencyDescriptor::new(parameter.name.clone(), required_type.clone()).required(true);
        match self.resolve_dependency_for(name, &descriptor, context)? {
            Some(bean) => Ok(BeanValue::Bean(bean)),
            None => Err(BeanError::UnsatisfiedDependency {
                bean_name: name.to_string(),
                injection_point: parameter.name.clone(),
                message: format!("没有类型为 {required_type} 的候选 Bean"),
            }),
        }
    }

    /// 属性填充：自动装配 -> 后处理器属性钩子 -> 显式属性值
    fn populate(
        &self,
        name: &str,
        merged: &MergedBeanDefinition,
        class: Option<&BeanClass>,
        bean: &mut dyn Bean,
        context: &mut ResolveContext,
    ) -> BeanResult<()> {
        if let Some(class) = class {
            self.autowire_properties(name, merged, class, bean, context)?;
        }

        let processors = self.instance_processors.read().clone();
        if !processors.is_empty() {
            let processing = ProcessingContext {
                bean_name: name,
                definition: merged,
                bean_class: class,
            };
            let resolver = BeanCreationResolver::new(self, name, context);
            for processor in &processors {
                processor.post_process_properties(bean, &processing, &resolver)?;
            }
        }

        for (property, value) in &merged.property_values {
            let value = self.resolve_value(value, context)?;
            write_property(bean, name, property, value)?;
        }
        Ok(())
    }
}
