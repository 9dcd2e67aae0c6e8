//! 默认 Bean 工厂
//!
//! 注册表、合并器、单例注册表和后处理器管道的组合点。单例创建由容器级可重入锁保护，
//! 已缓存的单例不经过该锁。

use crate::merger::DefinitionMerger;
use crate::registry::DefinitionRegistry;
use crate::singleton::SingletonRegistry;
use dashmap::DashMap;
use di_abstractions::{
    AliasRegistry, AutowireCandidateResolver, BeanClass, BeanClassRegistry, BeanDefinition,
    BeanDefinitionRegistry, BeanFactory, BeanRef, BeanValue, ConfigurableBeanFactory,
    ContainerConfig, ContainerStats, CreationRecord, DestructionReport, FactoryPostProcessor,
    InstancePostProcessor, MergedBeanDefinition, ProcessingContext,
    QualifierAutowireCandidateResolver, ResolveContext, StatsSnapshot,
};
use infrastructure_common::{BeanError, BeanResult, LifecycleState, TypeInfo};
use parking_lot::{ReentrantMutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, info};
use uuid::Uuid;

/// 默认 Bean 工厂
pub struct DefaultBeanFactory {
    pub(crate) id: Uuid,
    pub(crate) config: ContainerConfig,
    pub(crate) registry: DefinitionRegistry,
    pub(crate) merger: DefinitionMerger,
    pub(crate) classes: DashMap<String, Arc<BeanClass>>,
    pub(crate) singletons: SingletonRegistry,
    pub(crate) creation_lock: ReentrantMutex<()>,
    pub(crate) instance_processors: RwLock<Vec<Arc<dyn InstancePostProcessor>>>,
    pub(crate) factory_processors: RwLock<Vec<Arc<dyn FactoryPostProcessor>>>,
    pub(crate) factory_processors_applied: AtomicBool,
    /// 仅在持有 `creation_lock` 时读写，只有执行中的线程能观察到 true
    pub(crate) factory_processors_running: AtomicBool,
    pub(crate) next_factory_processor: AtomicUsize,
    pub(crate) destroying: AtomicBool,
    pub(crate) candidate_resolver: RwLock<Arc<dyn AutowireCandidateResolver>>,
    pub(crate) stats: ContainerStats,
    pub(crate) self_ref: Weak<DefaultBeanFactory>,
}

impl std::fmt::Debug for DefaultBeanFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultBeanFactory")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("definitions", &self.registry.count())
            .field("classes", &self.classes.len())
            .field("singletons", &self.singletons.count())
            .field("instance_processors", &self.instance_processors.read().len())
            .field("factory_processors", &self.factory_processors.read().len())
            .finish()
    }
}

impl DefaultBeanFactory {
    /// 使用默认配置创建容器
    pub fn new() -> Arc<Self> {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Arc<Self> {
        let factory = Arc::new_cyclic(|self_ref| Self {
            id: Uuid::new_v4(),
            registry: DefinitionRegistry::new(
                config.allow_bean_definition_overriding,
                config.allow_alias_overriding,
            ),
            config,
            merger: DefinitionMerger::new(),
            classes: DashMap::new(),
            singletons: SingletonRegistry::new(),
            creation_lock: ReentrantMutex::new(()),
            instance_processors: RwLock::new(Vec::new()),
            factory_processors: RwLock::new(Vec::new()),
            factory_processors_applied: AtomicBool::new(false),
            factory_processors_running: AtomicBool::new(false),
            next_factory_processor: AtomicUsize::new(0),
            destroying: AtomicBool::new(false),
            candidate_resolver: RwLock::new(Arc::new(QualifierAutowireCandidateResolver)),
            stats: ContainerStats::default(),
            self_ref: self_ref.clone(),
        });
        info!("创建 Bean 容器: {}", factory.id);
        factory
    }

    /// 容器标识
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 添加实例级后处理器（按添加顺序执行）
    pub fn add_instance_post_processor(&self, processor: Arc<dyn InstancePostProcessor>) {
        info!("添加实例后处理器: {}", processor.name());
        self.instance_processors.write().push(processor);
    }

    /// 添加工厂级后处理器（按添加顺序执行）
    pub fn add_factory_post_processor(&self, processor: Arc<dyn FactoryPostProcessor>) {
        info!("添加工厂后处理器: {}", processor.name());
        self.factory_processors.write().push(processor);
    }

    /// 替换自动装配候选过滤策略
    pub fn set_autowire_candidate_resolver(&self, resolver: Arc<dyn AutowireCandidateResolver>) {
        *self.candidate_resolver.write() = resolver;
    }

    /// 执行工厂级后处理器（成功后只执行一次）
    ///
    /// 全部处理器成功后才标记为已执行，其他线程在此之前阻塞在创建锁上。
    /// 某个处理器失败时，下一次调用从失败的处理器继续。
    /// 处理器内部调用 `get_bean` 不会重入这一轮执行。
    pub fn invoke_factory_post_processors(&self) -> BeanResult<()> {
        if self.factory_processors_applied.load(Ordering::Acquire) {
            return Ok(());
        }
        let _guard = self.creation_lock.lock();
        if self.factory_processors_applied.load(Ordering::Acquire)
            || self.factory_processors_running.load(Ordering::Acquire)
        {
            return Ok(());
        }

        self.factory_processors_running.store(true, Ordering::Release);
        let result = self.run_factory_processors();
        self.factory_processors_running.store(false, Ordering::Release);
        if result.is_ok() {
            self.factory_processors_applied.store(true, Ordering::Release);
        }
        result
    }

    fn run_factory_processors(&self) -> BeanResult<()> {
        let processors = self.factory_processors.read().clone();
        let start = self.next_factory_processor.load(Ordering::Acquire);
        for (index, processor) in processors.iter().enumerate().skip(start) {
            info!("执行工厂后处理器: {}", processor.name());
            if let Err(e) = processor.post_process_bean_factory(self) {
                error!("工厂后处理器 {} 失败: {}", processor.name(), e);
                return Err(e);
            }
            self.next_factory_processor.store(index + 1, Ordering::Release);
        }
        Ok(())
    }

    /// 预实例化所有非延迟单例，遇到第一个失败即中止
    pub fn pre_instantiate_singletons(&self) -> BeanResult<()> {
        self.invoke_factory_post_processors()?;
        info!("预实例化单例: 容器 {}", self.id);
        for name in self.registry.names() {
            let merged = self.merger.merge_unchecked(&self.registry, &name)?;
            if merged.is_abstract || !merged.is_singleton() || merged.lazy_init {
                continue;
            }
            self.get_bean(&name)?;
        }
        Ok(())
    }

    /// 按创建逆序销毁所有单例
    ///
    /// 单个 Bean 销毁失败会被记录，不影响其余 Bean。
    pub fn destroy_singletons(&self) -> DestructionReport {
        let _guard = self.creation_lock.lock();
        self.destroying.store(true, Ordering::Release);
        let disposables = self.singletons.drain_for_destruction();
        info!("销毁单例: 容器 {}，数量 {}", self.id, disposables.len());

        let processors = self.instance_processors.read().clone();
        let mut report = DestructionReport::default();
        for disposable in disposables {
            let context = ProcessingContext {
                bean_name: &disposable.name,
                definition: &disposable.info.definition,
                bean_class: disposable.info.bean_class.as_deref(),
            };
            match crate::lifecycle::destroy(
                &disposable.bean,
                &context,
                &processors,
                &self.config.inferred_destroy_methods,
            ) {
                Ok(method) => {
                    debug!("已销毁 Bean: {} (方法: {:?})", disposable.name, method);
                    self.singletons
                        .transition(&disposable.name, LifecycleState::Destroyed);
                    self.stats.record_destroyed();
                    report.destroyed.push(disposable.name);
                }
                Err(e) => {
                    error!("销毁 Bean '{}' 失败: {}", disposable.name, e);
                    report.failures.push((disposable.name, e));
                }
            }
        }
        self.destroying.store(false, Ordering::Release);
        report
    }

    /// 单例的生命周期状态
    pub fn bean_state(&self, name: &str) -> Option<LifecycleState> {
        let canonical = self.registry.canonical_name(name).ok()?;
        self.singletons.lifecycle_state(&canonical)
    }

    /// 单例创建日志（按完成顺序）
    pub fn creation_log(&self) -> Vec<CreationRecord> {
        self.singletons.creation_log()
    }

    /// 统计信息
    pub fn stats(&self) -> StatsSnapshot {
        self.stats
            .snapshot(self.registry.count(), self.singletons.count())
    }

    pub(crate) fn new_context(&self) -> ResolveContext {
        ResolveContext::new(self.config.max_resolution_depth)
    }

    /// 获取 Bean 的核心流程
    pub(crate) fn do_get_bean(
        &self,
        name: &str,
        args: Option<&[BeanValue]>,
        context: &mut ResolveContext,
    ) -> BeanResult<BeanRef> {
        self.invoke_factory_post_processors()?;
        let canonical = self.registry.canonical_name(name)?;
        if let Some(bean) = self.singletons.get(&canonical) {
            return Ok(bean);
        }

        let merged = self.merger.merge(&self.registry, &canonical)?;
        let result = if merged.is_singleton() {
            self.get_or_create_singleton(&canonical, &merged, args, context)
        } else {
            context.push(&canonical)?;
            let created = self.create_bean(&canonical, &merged, args, context);
            context.pop();
            created.map(|(bean, _)| bean)
        };

        if let Err(e) = &result {
            if context.depth() == 0 {
                self.stats.record_failed();
                debug!("获取 Bean '{}' 失败: {}", canonical, e);
            }
        }
        result
    }

    fn get_or_create_singleton(
        &self,
        name: &str,
        merged: &Arc<MergedBeanDefinition>,
        args: Option<&[BeanValue]>,
        context: &mut ResolveContext,
    ) -> BeanResult<BeanRef> {
        let _guard = self.creation_lock.lock();
        if let Some(bean) = self.singletons.get(name) {
            return Ok(bean);
        }
        if self.destroying.load(Ordering::Acquire) {
            return Err(BeanError::BeanCreationNotAllowed {
                bean_name: name.to_string(),
            });
        }

        self.singletons
            .begin_creation(name, || context.describe_with(name))?;
        if let Err(e) = context.push(name) {
            self.singletons.end_creation(name);
            self.singletons.discard(name);
            return Err(e);
        }
        let created = self.create_bean(name, merged, args, context);
        context.pop();
        self.singletons.end_creation(name);

        match created {
            Ok((bean, info)) => {
                let record = self.singletons.register_singleton(name, bean.clone(), info);
                debug!("单例已缓存: {} (序号 {})", name, record.sequence);
                Ok(bean)
            }
            Err(e) => {
                self.singletons.discard(name);
                Err(e)
            }
        }
    }

    fn definitions_changed(&self, name: &str) {
        self.merger.invalidate();
        if self.singletons.remove(name).is_some() {
            debug!("定义变更，丢弃已缓存的单例: {}", name);
        }
    }

    fn choose_unique(
        &self,
        required_type: &TypeInfo,
        candidates: &[(String, Arc<MergedBeanDefinition>)],
    ) -> BeanResult<String> {
        match candidates {
            [] => Err(BeanError::NoSuchBeanOfType {
                type_name: required_type.to_string(),
            }),
            [(name, _)] => Ok(name.clone()),
            _ => crate::autowire::determine_primary(candidates).ok_or_else(|| {
                BeanError::NoUniqueBeanDefinition {
                    type_name: required_type.to_string(),
                    candidates: candidates.iter().map(|(n, _)| n.clone()).collect(),
                }
            }),
        }
    }
}

impl AliasRegistry for DefaultBeanFactory {
    fn register_alias(&self, alias: &str, name: &str) -> BeanResult<()> {
        self.registry.register_alias(alias, name)?;
        self.merger.invalidate();
        Ok(())
    }

    fn remove_alias(&self, alias: &str) -> BeanResult<()> {
        self.registry.remove_alias(alias)?;
        self.merger.invalidate();
        Ok(())
    }

    fn is_alias(&self, name: &str) -> bool {
        self.registry.is_alias(name)
    }

    fn aliases(&self, name: &str) -> Vec<String> {
        self.registry.aliases_of(name)
    }

    fn canonical_name(&self, name: &str) -> BeanResult<String> {
        self.registry.canonical_name(name)
    }
}

impl BeanDefinitionRegistry for DefaultBeanFactory {
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> BeanResult<()> {
        let replaced = self.registry.register(name, definition)?;
        if replaced {
            self.definitions_changed(name);
        } else {
            self.merger.invalidate();
        }
        info!("注册 Bean: {}", name);
        Ok(())
    }

    fn remove_bean_definition(&self, name: &str) -> BeanResult<BeanDefinition> {
        let canonical = self.registry.canonical_name(name)?;
        let removed = self.registry.remove(&canonical)?;
        self.definitions_changed(&canonical);
        Ok(removed)
    }

    fn bean_definition(&self, name: &str) -> BeanResult<BeanDefinition> {
        self.registry.get(&self.registry.canonical_name(name)?)
    }

    fn contains_bean_definition(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    fn bean_definition_names(&self) -> Vec<String> {
        self.registry.names()
    }

    fn bean_definition_count(&self) -> usize {
        self.registry.count()
    }

    fn update_bean_definition(
        &self,
        name: &str,
        mutator: &mut dyn FnMut(&mut BeanDefinition),
    ) -> BeanResult<()> {
        let canonical = self.registry.canonical_name(name)?;
        self.registry.update(&canonical, mutator)?;
        self.definitions_changed(&canonical);
        Ok(())
    }
}

impl BeanClassRegistry for DefaultBeanFactory {
    fn register_class(&self, class: BeanClass) {
        debug!("注册 Bean 类: {} ({})", class.name, class.type_info);
        self.classes.insert(class.name.clone(), Arc::new(class));
    }

    fn bean_class(&self, class_name: &str) -> Option<Arc<BeanClass>> {
        self.classes.get(class_name).map(|entry| entry.value().clone())
    }
}

impl BeanFactory for DefaultBeanFactory {
    fn get_bean(&self, name: &str) -> BeanResult<BeanRef> {
        self.do_get_bean(name, None, &mut self.new_context())
    }

    fn get_bean_with_args(&self, name: &str, args: &[BeanValue]) -> BeanResult<BeanRef> {
        self.do_get_bean(name, Some(args), &mut self.new_context())
    }

    fn get_bean_of_type(&self, required_type: &TypeInfo) -> BeanResult<BeanRef> {
        self.invoke_factory_post_processors()?;
        let candidates = self.find_candidates(required_type, None, None);
        let name = self.choose_unique(required_type, &candidates)?;
        self.get_bean(&name)
    }

    fn get_bean_checked(&self, name: &str, required_type: &TypeInfo) -> BeanResult<BeanRef> {
        self.invoke_factory_post_processors()?;
        let canonical = self.registry.canonical_name(name)?;
        let merged = self.merger.merge(&self.registry, &canonical)?;
        let class = self.effective_class(&merged)?;
        match class {
            Some(class) if class.is_assignable_to(required_type) => self.get_bean(&canonical),
            other => Err(BeanError::BeanNotOfRequiredType {
                bean_name: canonical,
                required: required_type.to_string(),
                actual: other.map_or_else(|| "未知".to_string(), |c| c.type_info.to_string()),
            }),
        }
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.registry
            .canonical_name(name)
            .is_ok_and(|canonical| self.registry.contains(&canonical))
    }

    fn is_singleton(&self, name: &str) -> BeanResult<bool> {
        Ok(self
            .merger
            .merge_unchecked(&self.registry, name)?
            .is_singleton())
    }

    fn is_prototype(&self, name: &str) -> BeanResult<bool> {
        Ok(self
            .merger
            .merge_unchecked(&self.registry, name)?
            .is_prototype())
    }

    fn get_type(&self, name: &str) -> BeanResult<Option<TypeInfo>> {
        let merged = self.merger.merge_unchecked(&self.registry, name)?;
        Ok(self
            .effective_class(&merged)?
            .map(|class| class.type_info.clone()))
    }
}

impl ConfigurableBeanFactory for DefaultBeanFactory {
    fn merged_bean_definition(&self, name: &str) -> BeanResult<MergedBeanDefinition> {
        Ok(self.merger.merge(&self.registry, name)?.as_ref().clone())
    }

    fn resolve_bean_class(&self, name: &str) -> BeanResult<Option<Arc<BeanClass>>> {
        let merged = self.merger.merge_unchecked(&self.registry, name)?;
        self.effective_class(&merged)
    }
}
