//! 定义注册表抽象接口
//!
//! 定义来源（扫描器、配置解析器等外部协作方）只通过这些接口与容器交互。

use crate::class::BeanClass;
use crate::definition::BeanDefinition;
use infrastructure_common::BeanResult;
use std::sync::Arc;

/// 别名注册表
pub trait AliasRegistry: Send + Sync {
    /// 为 `name` 注册别名 `alias`
    ///
    /// `alias == name` 时移除已有别名；形成环的别名在注册时即被拒绝。
    fn register_alias(&self, alias: &str, name: &str) -> BeanResult<()>;

    /// 移除别名
    fn remove_alias(&self, alias: &str) -> BeanResult<()>;

    /// 是否为别名
    fn is_alias(&self, name: &str) -> bool;

    /// 所有（直接或间接）指向 `name` 的别名
    fn aliases(&self, name: &str) -> Vec<String>;

    /// 沿别名链解析出规范名称
    fn canonical_name(&self, name: &str) -> BeanResult<String>;
}

/// Bean 定义注册表
pub trait BeanDefinitionRegistry: AliasRegistry {
    /// 注册定义，未允许覆盖时重名失败
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> BeanResult<()>;

    /// 移除定义
    fn remove_bean_definition(&self, name: &str) -> BeanResult<BeanDefinition>;

    /// 获取定义（名称可为别名）
    fn bean_definition(&self, name: &str) -> BeanResult<BeanDefinition>;

    /// 是否包含定义
    fn contains_bean_definition(&self, name: &str) -> bool;

    /// 按注册顺序返回所有定义名称
    fn bean_definition_names(&self) -> Vec<String>;

    /// 定义数量
    fn bean_definition_count(&self) -> usize;

    /// 原地修改定义
    fn update_bean_definition(
        &self,
        name: &str,
        mutator: &mut dyn FnMut(&mut BeanDefinition),
    ) -> BeanResult<()>;
}

/// Bean 类注册表
pub trait BeanClassRegistry: Send + Sync {
    /// 注册类元数据（同名覆盖）
    fn register_class(&self, class: BeanClass);

    /// 按类名查找
    fn bean_class(&self, class_name: &str) -> Option<Arc<BeanClass>>;
}
