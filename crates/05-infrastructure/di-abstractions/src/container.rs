//! 容器配置、统计与运行记录

use chrono::{DateTime, Utc};
use infrastructure_common::BeanError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否允许同名定义覆盖
    pub allow_bean_definition_overriding: bool,
    /// 是否允许别名重新指向其他名称
    pub allow_alias_overriding: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 推断销毁方法时按顺序探测的方法名
    pub inferred_destroy_methods: Vec<String>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            allow_bean_definition_overriding: false,
            allow_alias_overriding: true,
            max_resolution_depth: 100,
            inferred_destroy_methods: vec!["close".to_string(), "shutdown".to_string()],
        }
    }
}

/// 容器统计信息
#[derive(Debug, Default)]
pub struct ContainerStats {
    created: AtomicUsize,
    failed: AtomicUsize,
    destroyed: AtomicUsize,
}

impl ContainerStats {
    /// 记录一次成功创建
    pub fn record_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一次创建失败
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一次销毁
    pub fn record_destroyed(&self) {
        self.destroyed.fetch_add(1, Ordering::Relaxed);
    }

    /// 生成快照
    pub fn snapshot(&self, registered_definitions: usize, active_singletons: usize) -> StatsSnapshot {
        StatsSnapshot {
            registered_definitions,
            active_singletons,
            beans_created: self.created.load(Ordering::Relaxed),
            creation_failures: self.failed.load(Ordering::Relaxed),
            beans_destroyed: self.destroyed.load(Ordering::Relaxed),
        }
    }
}

/// 统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// 已注册定义数量
    pub registered_definitions: usize,
    /// 活跃单例数量
    pub active_singletons: usize,
    /// 已创建 Bean 总数（含原型）
    pub beans_created: usize,
    /// 创建失败次数
    pub creation_failures: usize,
    /// 已销毁 Bean 数量
    pub beans_destroyed: usize,
}

/// 单例创建记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreationRecord {
    /// Bean 名称
    pub bean_name: String,
    /// 创建序号（严格递增）
    pub sequence: u64,
    /// 创建完成时间
    pub created_at: DateTime<Utc>,
}

/// 销毁报告
#[derive(Debug, Default)]
pub struct DestructionReport {
    /// 按销毁顺序排列的 Bean 名称
    pub destroyed: Vec<String>,
    /// 销毁失败的 Bean 及原因
    pub failures: Vec<(String, BeanError)>,
}

impl DestructionReport {
    /// 是否全部成功
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
