//! 生命周期管理
//!
//! 初始化路径: `PreInit`（初始化前钩子）-> `Initialized`（初始化方法）-> `PostInit`
//! （初始化后钩子）-> `Active`。销毁路径: 销毁前钩子 -> 销毁方法（显式或推断）。

use di_abstractions::{BeanRef, DestroyMethod, InstancePostProcessor, ProcessingContext};
use infrastructure_common::{BeanError, BeanResult, LifecycleState};
use std::sync::Arc;
use tracing::debug;

/// 执行初始化阶段，返回对外可见的 Bean
pub fn initialize(
    bean: BeanRef,
    context: &ProcessingContext<'_>,
    processors: &[Arc<dyn InstancePostProcessor>],
    mut on_state: impl FnMut(LifecycleState),
) -> BeanResult<BeanRef> {
    on_state(LifecycleState::PreInit);
    let mut current = bean;
    for processor in processors {
        current = processor.post_process_before_initialization(current, context)?;
    }

    if let Some(init) = &context.definition.init_method_name {
        debug!("调用初始化方法: {}.{}", context.bean_name, init);
        current.invoke(init, &[]).map_err(|e| {
            BeanError::creation(
                context.bean_name,
                format!("初始化方法 '{init}' 执行失败"),
                e,
            )
        })?;
    }
    on_state(LifecycleState::Initialized);

    on_state(LifecycleState::PostInit);
    for processor in processors {
        current = processor.post_process_after_initialization(current, context)?;
    }
    on_state(LifecycleState::Active);
    Ok(current)
}

/// 销毁单个 Bean，返回实际调用的销毁方法
pub fn destroy(
    bean: &BeanRef,
    context: &ProcessingContext<'_>,
    processors: &[Arc<dyn InstancePostProcessor>],
    inferred_methods: &[String],
) -> BeanResult<Option<String>> {
    for processor in processors {
        processor.post_process_before_destruction(bean, context)?;
    }

    let method = match &context.definition.destroy_method {
        None => return Ok(None),
        Some(DestroyMethod::Named(method)) => method.clone(),
        Some(DestroyMethod::Infer) => {
            let Some(class) = context.bean_class else {
                return Ok(None);
            };
            let found = inferred_methods.iter().find(|candidate| {
                class
                    .find_method(candidate)
                    .is_some_and(|m| m.parameter_count == 0)
            });
            match found {
                Some(method) => method.clone(),
                None => {
                    debug!("Bean '{}' 没有可推断的销毁方法", context.bean_name);
                    return Ok(None);
                }
            }
        }
    };

    debug!("调用销毁方法: {}.{}", context.bean_name, method);
    bean.invoke(&method, &[]).map_err(|e| {
        BeanError::creation(
            context.bean_name,
            format!("销毁方法 '{method}' 执行失败"),
            e,
        )
    })?;
    Ok(Some(method))
}
