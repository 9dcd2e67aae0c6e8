//! 单例注册表
//!
//! 缓存、创建日志和生命周期状态放在同一把锁后面，缓存写入与日志追加是同一个临界区。

use chrono::Utc;
use di_abstractions::{BeanClass, BeanRef, CreationRecord, MergedBeanDefinition};
use infrastructure_common::{BeanError, BeanResult, LifecycleState};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{trace, warn};

/// 销毁单例时需要的定义信息
#[derive(Debug, Clone)]
pub struct DisposableInfo {
    /// 创建时使用的合并定义
    pub definition: Arc<MergedBeanDefinition>,
    /// 产出实例的类
    pub bean_class: Option<Arc<BeanClass>>,
}

/// 等待销毁的单例
#[derive(Debug)]
pub struct DisposableSingleton {
    /// Bean 名称
    pub name: String,
    /// 实例
    pub bean: BeanRef,
    /// 定义信息
    pub info: DisposableInfo,
}

#[derive(Default)]
struct SingletonState {
    instances: HashMap<String, (BeanRef, DisposableInfo)>,
    log: Vec<CreationRecord>,
    states: HashMap<String, LifecycleState>,
    sequence: u64,
}

/// 单例注册表
#[derive(Default)]
pub struct SingletonRegistry {
    state: Mutex<SingletonState>,
    in_creation: Mutex<HashSet<String>>,
}

impl std::fmt::Debug for SingletonRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SingletonRegistry")
            .field("singletons", &state.instances.len())
            .field("log", &state.log)
            .field("in_creation", &*self.in_creation.lock())
            .finish()
    }
}

impl SingletonRegistry {
    /// 创建注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取已缓存的单例
    pub fn get(&self, name: &str) -> Option<BeanRef> {
        self.state
            .lock()
            .instances
            .get(name)
            .map(|(bean, _)| bean.clone())
    }

    /// 是否已缓存
    pub fn contains(&self, name: &str) -> bool {
        self.state.lock().instances.contains_key(name)
    }

    /// 标记开始创建，已在创建中时报循环引用
    pub fn begin_creation(&self, name: &str, chain: impl FnOnce() -> String) -> BeanResult<()> {
        if !self.in_creation.lock().insert(name.to_string()) {
            return Err(BeanError::CircularReference {
                bean_name: name.to_string(),
                chain: chain(),
            });
        }
        self.state
            .lock()
            .states
            .insert(name.to_string(), LifecycleState::Created);
        trace!("Bean '{}' 状态: {:?}", name, LifecycleState::Created);
        Ok(())
    }

    /// 结束创建（成功或失败）
    pub fn end_creation(&self, name: &str) {
        self.in_creation.lock().remove(name);
    }

    /// 是否正在创建
    pub fn is_in_creation(&self, name: &str) -> bool {
        self.in_creation.lock().contains(name)
    }

    /// 推进生命周期状态
    pub fn transition(&self, name: &str, target: LifecycleState) {
        let mut state = self.state.lock();
        let current = state.states.get(name).copied();
        if let Some(current) = current {
            if !current.can_transition_to(target) {
                warn!(
                    "Bean '{}' 非法的状态迁移: {:?} -> {:?}",
                    name, current, target
                );
            }
        }
        state.states.insert(name.to_string(), target);
        trace!("Bean '{}' 状态: {:?}", name, target);
    }

    /// 创建失败，丢弃状态
    pub fn discard(&self, name: &str) {
        self.state.lock().states.remove(name);
    }

    /// 当前生命周期状态
    pub fn lifecycle_state(&self, name: &str) -> Option<LifecycleState> {
        self.state.lock().states.get(name).copied()
    }

    /// 缓存单例并追加创建记录
    pub fn register_singleton(
        &self,
        name: &str,
        bean: BeanRef,
        info: DisposableInfo,
    ) -> CreationRecord {
        let mut state = self.state.lock();
        state.sequence += 1;
        let record = CreationRecord {
            bean_name: name.to_string(),
            sequence: state.sequence,
            created_at: Utc::now(),
        };
        state.instances.insert(name.to_string(), (bean, info));
        state.log.push(record.clone());
        record
    }

    /// 移除单例（定义被替换或删除时），不执行销毁回调
    pub fn remove(&self, name: &str) -> Option<BeanRef> {
        let mut state = self.state.lock();
        state.log.retain(|r| r.bean_name != name);
        state.states.remove(name);
        state.instances.remove(name).map(|(bean, _)| bean)
    }

    /// 创建日志
    pub fn creation_log(&self) -> Vec<CreationRecord> {
        self.state.lock().log.clone()
    }

    /// 单例数量
    pub fn count(&self) -> usize {
        self.state.lock().instances.len()
    }

    /// 按创建逆序取出所有单例，清空缓存和日志
    pub fn drain_for_destruction(&self) -> Vec<DisposableSingleton> {
        let mut state = self.state.lock();
        let log = std::mem::take(&mut state.log);
        let mut instances = std::mem::take(&mut state.instances);
        log.into_iter()
            .rev()
            .filter_map(|record| {
                instances
                    .remove(&record.bean_name)
                    .map(|(bean, info)| DisposableSingleton {
                        name: record.bean_name,
                        bean,
                        info,
                    })
            })
            .collect()
    }
}
