//! 定义合并
//!
//! 沿 `parent_name` 链把子定义折叠成扁平的 [`MergedBeanDefinition`]，结果按名称缓存，
//! 注册表任何变更后需调用 [`DefinitionMerger::invalidate`]。

use crate::registry::DefinitionRegistry;
use di_abstractions::{BeanDefinition, MergedBeanDefinition};
use infrastructure_common::{BeanError, BeanResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// 定义合并器
#[derive(Debug, Default)]
pub struct DefinitionMerger {
    cache: RwLock<MergeCache>,
}

/// 合并缓存，每次失效递增代数
#[derive(Debug, Default)]
struct MergeCache {
    entries: HashMap<String, Arc<MergedBeanDefinition>>,
    generation: u64,
}

impl DefinitionMerger {
    /// 创建合并器
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并定义，结果为抽象定义时报错
    pub fn merge(
        &self,
        registry: &DefinitionRegistry,
        name: &str,
    ) -> BeanResult<Arc<MergedBeanDefinition>> {
        let merged = self.merge_unchecked(registry, name)?;
        if merged.is_abstract {
            return Err(BeanError::BeanIsAbstract {
                bean_name: merged.name.clone(),
            });
        }
        Ok(merged)
    }

    /// 合并定义，允许抽象定义
    pub fn merge_unchecked(
        &self,
        registry: &DefinitionRegistry,
        name: &str,
    ) -> BeanResult<Arc<MergedBeanDefinition>> {
        let canonical = registry.canonical_name(name)?;
        let generation = {
            let cache = self.cache.read();
            if let Some(cached) = cache.entries.get(&canonical) {
                return Ok(cached.clone());
            }
            cache.generation
        };

        let chain = Self::collect_chain(registry, &canonical)?;
        let mut levels = chain.iter().rev();
        let Some((root_name, root)) = levels.next() else {
            return Err(BeanError::no_such_bean(canonical));
        };
        let mut merged = MergedBeanDefinition::from_root(root_name.clone(), root);
        for (level_name, definition) in levels {
            merged.override_from(level_name.clone(), definition);
        }

        if merged.bean_class_name.is_none()
            && merged.factory_method_name.is_none()
            && !merged.is_abstract
        {
            return Err(BeanError::invalid_definition(
                canonical,
                "合并后的定义既没有类也没有工厂方法",
            ));
        }

        trace!("合并 Bean 定义: {} (层级: {})", canonical, chain.len());
        let merged = Arc::new(merged);
        self.store(canonical, merged.clone(), generation);
        Ok(merged)
    }

    /// 清空缓存
    pub fn invalidate(&self) {
        let mut cache = self.cache.write();
        cache.entries.clear();
        cache.generation += 1;
    }

    #[cfg(test)]
    fn generation(&self) -> u64 {
        self.cache.read().generation
    }

    /// 仅当合并期间缓存未失效时写入
    fn store(&self, name: String, merged: Arc<MergedBeanDefinition>, generation: u64) -> bool {
        let mut cache = self.cache.write();
        if cache.generation != generation {
            trace!("合并期间缓存已失效，不缓存: {}", name);
            return false;
        }
        cache.entries.insert(name, merged);
        true
    }

    /// 从子定义到根定义的链
    fn collect_chain(
        registry: &DefinitionRegistry,
        name: &str,
    ) -> BeanResult<Vec<(String, BeanDefinition)>> {
        let mut chain: Vec<(String, BeanDefinition)> = Vec::new();
        let mut current = name.to_string();
        loop {
            let definition = registry.get(&current)?;
            let parent = definition.parent_name.clone();
            chain.push((current, definition));

            let Some(parent) = parent else {
                return Ok(chain);
            };
            let parent = registry.canonical_name(&parent)?;
            if chain.iter().any(|(n, _)| *n == parent) {
                let path: Vec<&str> = chain.iter().map(|(n, _)| n.as_str()).collect();
                return Err(BeanError::invalid_definition(
                    name,
                    format!("父定义存在循环: {} -> {}", path.join(" -> "), parent),
                ));
            }
            if !registry.contains(&parent) {
                return Err(BeanError::invalid_definition(
                    name,
                    format!("父定义不存在: {parent}"),
                ));
            }
            current = parent;
        }
    }
}
