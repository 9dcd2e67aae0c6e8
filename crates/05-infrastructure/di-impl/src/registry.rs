//! 定义注册表实现
//!
//! 保存 Bean 定义（保持注册顺序）和别名表。

use di_abstractions::BeanDefinition;
use infrastructure_common::{BeanError, BeanResult};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct Definitions {
    by_name: HashMap<String, BeanDefinition>,
    order: Vec<String>,
}

/// Bean 定义注册表
#[derive(Debug)]
pub struct DefinitionRegistry {
    definitions: RwLock<Definitions>,
    aliases: RwLock<HashMap<String, String>>,
    allow_definition_overriding: bool,
    allow_alias_overriding: bool,
}

impl DefinitionRegistry {
    /// 创建注册表
    pub fn new(allow_definition_overriding: bool, allow_alias_overriding: bool) -> Self {
        Self {
            definitions: RwLock::new(Definitions::default()),
            aliases: RwLock::new(HashMap::new()),
            allow_definition_overriding,
            allow_alias_overriding,
        }
    }

    /// 注册定义，返回是否覆盖了已有定义
    pub fn register(&self, name: &str, definition: BeanDefinition) -> BeanResult<bool> {
        if name.trim().is_empty() {
            return Err(BeanError::invalid_definition(name, "Bean 名称不能为空"));
        }
        if !definition.has_instance_source() && !definition.is_abstract {
            return Err(BeanError::invalid_definition(
                name,
                "缺少类、父定义或工厂方法",
            ));
        }
        if self.aliases.read().contains_key(name) {
            return Err(BeanError::DuplicateDefinition {
                name: name.to_string(),
            });
        }

        let mut definitions = self.definitions.write();
        let replaced = definitions.by_name.contains_key(name);
        if replaced {
            if !self.allow_definition_overriding {
                return Err(BeanError::DuplicateDefinition {
                    name: name.to_string(),
                });
            }
            warn!("覆盖 Bean 定义: {}", name);
        } else {
            definitions.order.push(name.to_string());
        }
        definitions.by_name.insert(name.to_string(), definition);
        debug!("注册 Bean 定义: {}", name);
        Ok(replaced)
    }

    /// 移除定义
    pub fn remove(&self, name: &str) -> BeanResult<BeanDefinition> {
        let mut definitions = self.definitions.write();
        let removed = definitions
            .by_name
            .remove(name)
            .ok_or_else(|| BeanError::no_such_bean(name))?;
        definitions.order.retain(|n| n != name);
        info!("移除 Bean 定义: {}", name);
        Ok(removed)
    }

    /// 获取定义副本
    pub fn get(&self, name: &str) -> BeanResult<BeanDefinition> {
        self.definitions
            .read()
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| BeanError::no_such_bean(name))
    }

    /// 是否包含定义
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.read().by_name.contains_key(name)
    }

    /// 按注册顺序返回定义名称
    pub fn names(&self) -> Vec<String> {
        self.definitions.read().order.clone()
    }

    /// 定义数量
    pub fn count(&self) -> usize {
        self.definitions.read().order.len()
    }

    /// 原地修改定义
    pub fn update(&self, name: &str, mutator: &mut dyn FnMut(&mut BeanDefinition)) -> BeanResult<()> {
        let mut definitions = self.definitions.write();
        let definition = definitions
            .by_name
            .get_mut(name)
            .ok_or_else(|| BeanError::no_such_bean(name))?;
        mutator(definition);
        debug!("更新 Bean 定义: {}", name);
        Ok(())
    }

    /// 注册别名
    pub fn register_alias(&self, alias: &str, name: &str) -> BeanResult<()> {
        let mut aliases = self.aliases.write();
        if alias == name {
            if aliases.remove(alias).is_some() {
                debug!("别名与名称相同，移除别名: {}", alias);
            }
            return Ok(());
        }
        if self.contains(alias) {
            return Err(BeanError::DuplicateDefinition {
                name: alias.to_string(),
            });
        }
        if let Some(existing) = aliases.get(alias) {
            if existing == name {
                return Ok(());
            }
            if !self.allow_alias_overriding {
                return Err(BeanError::DuplicateDefinition {
                    name: alias.to_string(),
                });
            }
            info!("别名 '{}' 从 '{}' 改为指向 '{}'", alias, existing, name);
        }

        let mut current = name;
        while let Some(next) = aliases.get(current) {
            if next == alias {
                return Err(BeanError::invalid_definition(
                    alias,
                    format!("别名 '{alias}' -> '{name}' 会形成循环"),
                ));
            }
            current = next;
        }

        aliases.insert(alias.to_string(), name.to_string());
        debug!("注册别名: {} -> {}", alias, name);
        Ok(())
    }

    /// 移除别名
    pub fn remove_alias(&self, alias: &str) -> BeanResult<()> {
        match self.aliases.write().remove(alias) {
            Some(_) => Ok(()),
            None => Err(BeanError::no_such_bean(alias)),
        }
    }

    /// 是否为别名
    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.read().contains_key(name)
    }

    /// 沿别名链解析规范名称
    pub fn canonical_name(&self, name: &str) -> BeanResult<String> {
        let aliases = self.aliases.read();
        let mut visited = HashSet::new();
        let mut current = name;
        while let Some(next) = aliases.get(current) {
            if !visited.insert(current) {
                return Err(BeanError::invalid_definition(name, "别名链存在循环"));
            }
            current = next;
        }
        Ok(current.to_string())
    }

    /// 所有直接或间接指向 `name` 的别名
    pub fn aliases_of(&self, name: &str) -> Vec<String> {
        let aliases = self.aliases.read();
        let mut found: Vec<String> = aliases
            .keys()
            .filter(|alias| {
                let mut current = alias.as_str();
                let mut steps = 0;
                while let Some(next) = aliases.get(current) {
                    if next == name {
                        return true;
                    }
                    steps += 1;
                    if steps > aliases.len() {
                        return false;
                    }
                    current = next;
                }
                false
            })
            .cloned()
            .collect();
        found.sort();
        found
    }
}
