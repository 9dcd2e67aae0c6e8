//! Bean 定义模型
//!
//! [`BeanDefinition`] 是注册到容器中的声明式配方；[`MergedBeanDefinition`] 是沿父定义链
//! 合并后的扁平视图，实例化引擎只使用后者。

use infrastructure_common::{AutowireMode, BeanScope};
use std::collections::BTreeSet;

/// 销毁方法配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyMethod {
    /// 显式指定的方法名
    Named(String),
    /// 按约定方法名推断（见 `ContainerConfig::inferred_destroy_methods`）
    Infer,
}

/// 属性值
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// 字面量
    Literal(serde_json::Value),
    /// 引用另一个 Bean
    Reference(String),
}

impl PropertyValue {
    /// 创建字面量
    pub fn literal(value: impl Into<serde_json::Value>) -> Self {
        Self::Literal(value.into())
    }

    /// 创建 Bean 引用
    pub fn reference(bean_name: impl Into<String>) -> Self {
        Self::Reference(bean_name.into())
    }
}

/// 方法覆盖类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodOverrideKind {
    /// 每次调用都返回对目标 Bean 的一次新查找
    Lookup,
    /// 整个调用委托给替换器
    Replace,
}

/// 方法覆盖指令
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodOverride {
    /// 覆盖类型
    pub kind: MethodOverrideKind,
    /// 被拦截的方法名
    pub method_name: String,
    /// Lookup 的目标 Bean / Replace 的替换器 Bean
    pub reference_name: String,
}

impl MethodOverride {
    /// 创建 Lookup 覆盖
    pub fn lookup(method_name: impl Into<String>, bean_name: impl Into<String>) -> Self {
        Self {
            kind: MethodOverrideKind::Lookup,
            method_name: method_name.into(),
            reference_name: bean_name.into(),
        }
    }

    /// 创建 Replace 覆盖
    pub fn replace(method_name: impl Into<String>, replacer_name: impl Into<String>) -> Self {
        Self {
            kind: MethodOverrideKind::Replace,
            method_name: method_name.into(),
            reference_name: replacer_name.into(),
        }
    }
}

/// Bean 定义
///
/// `Option` 字段未设置时从父定义继承。
#[derive(Debug, Clone)]
pub struct BeanDefinition {
    /// 目标类名（在容器中注册的 [`crate::BeanClass`]）
    pub bean_class_name: Option<String>,
    /// 实例工厂 Bean 名称
    pub factory_bean_name: Option<String>,
    /// 工厂方法名（静态或实例方法）
    pub factory_method_name: Option<String>,
    /// 作用域
    pub scope: Option<BeanScope>,
    /// 是否延迟初始化
    pub lazy_init: Option<bool>,
    /// 是否为 primary
    pub primary: bool,
    /// 是否参与按类型装配
    pub autowire_candidate: bool,
    /// 自动装配模式
    pub autowire_mode: Option<AutowireMode>,
    /// 必须先创建的 Bean
    pub depends_on: Vec<String>,
    /// 父定义名称
    pub parent_name: Option<String>,
    /// 是否为抽象模板
    pub is_abstract: bool,
    /// 初始化方法
    pub init_method_name: Option<String>,
    /// 销毁方法
    pub destroy_method: Option<DestroyMethod>,
    /// 限定符
    pub qualifiers: BTreeSet<String>,
    /// 方法覆盖
    pub method_overrides: Vec<MethodOverride>,
    /// 显式属性值
    pub property_values: Vec<(String, PropertyValue)>,
    /// 显式构造参数
    pub constructor_args: Vec<PropertyValue>,
    /// 描述
    pub description: Option<String>,
}

impl Default for BeanDefinition {
    fn default() -> Self {
        Self {
            bean_class_name: None,
            factory_bean_name: None,
            factory_method_name: None,
            scope: None,
            lazy_init: None,
            primary: false,
            autowire_candidate: true,
            autowire_mode: None,
            depends_on: Vec::new(),
            parent_name: None,
            is_abstract: false,
            init_method_name: None,
            destroy_method: None,
            qualifiers: BTreeSet::new(),
            method_overrides: Vec::new(),
            property_values: Vec::new(),
            constructor_args: Vec::new(),
            description: None,
        }
    }
}

impl BeanDefinition {
    /// 创建空定义
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建指向指定类的定义
    pub fn of_class(class_name: impl Into<String>) -> Self {
        Self::new().with_class(class_name)
    }

    /// 创建继承父定义的子定义
    pub fn child_of(parent_name: impl Into<String>) -> Self {
        Self {
            parent_name: Some(parent_name.into()),
            ..Self::default()
        }
    }

    /// 设置类名
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.bean_class_name = Some(class_name.into());
        self
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: BeanScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// 设置为原型作用域
    pub fn prototype(self) -> Self {
        self.with_scope(BeanScope::Prototype)
    }

    /// 设置延迟初始化
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy_init = Some(lazy);
        self
    }

    /// 设置 primary
    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// 设置是否参与按类型装配
    pub fn autowire_candidate(mut self, candidate: bool) -> Self {
        self.autowire_candidate = candidate;
        self
    }

    /// 设置自动装配模式
    pub fn with_autowire(mut self, mode: AutowireMode) -> Self {
        self.autowire_mode = Some(mode);
        self
    }

    /// 添加前置依赖
    pub fn depends_on(mut self, bean_name: impl Into<String>) -> Self {
        self.depends_on.push(bean_name.into());
        self
    }

    /// 设置父定义
    pub fn with_parent(mut self, parent_name: impl Into<String>) -> Self {
        self.parent_name = Some(parent_name.into());
        self
    }

    /// 设置为抽象模板
    pub fn abstract_template(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    /// 设置初始化方法
    pub fn with_init_method(mut self, method: impl Into<String>) -> Self {
        self.init_method_name = Some(method.into());
        self
    }

    /// 设置销毁方法
    pub fn with_destroy_method(mut self, method: impl Into<String>) -> Self {
        self.destroy_method = Some(DestroyMethod::Named(method.into()));
        self
    }

    /// 按约定推断销毁方法
    pub fn infer_destroy_method(mut self) -> Self {
        self.destroy_method = Some(DestroyMethod::Infer);
        self
    }

    /// 添加限定符
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifiers.insert(qualifier.into());
        self
    }

    /// 添加方法覆盖
    pub fn with_method_override(mut self, method_override: MethodOverride) -> Self {
        self.method_overrides.push(method_override);
        self
    }

    /// 设置属性值（同名覆盖）
    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.set_property_value(name, value);
        self
    }

    /// 添加构造参数
    pub fn with_constructor_arg(mut self, value: PropertyValue) -> Self {
        self.constructor_args.push(value);
        self
    }

    /// 设置静态工厂方法
    pub fn with_factory_method(mut self, method: impl Into<String>) -> Self {
        self.factory_method_name = Some(method.into());
        self
    }

    /// 设置实例工厂 Bean 和工厂方法
    pub fn with_factory_bean(
        mut self,
        factory_bean: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        self.factory_bean_name = Some(factory_bean.into());
        self.factory_method_name = Some(method.into());
        self
    }

    /// 设置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 设置属性值（同名覆盖）
    pub fn set_property_value(&mut self, name: impl Into<String>, value: PropertyValue) {
        let name = name.into();
        match self.property_values.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.property_values.push((name, value)),
        }
    }

    /// 是否能独立确定实例来源
    pub fn has_instance_source(&self) -> bool {
        self.bean_class_name.is_some()
            || self.factory_method_name.is_some()
            || self.parent_name.is_some()
    }
}

/// 合并后的 Bean 定义
#[derive(Debug, Clone)]
pub struct MergedBeanDefinition {
    /// Bean 名称
    pub name: String,
    /// 目标类名
    pub bean_class_name: Option<String>,
    /// 实例工厂 Bean
    pub factory_bean_name: Option<String>,
    /// 工厂方法
    pub factory_method_name: Option<String>,
    /// 作用域
    pub scope: BeanScope,
    /// 是否延迟初始化
    pub lazy_init: bool,
    /// 是否为 primary
    pub primary: bool,
    /// 是否参与按类型装配
    pub autowire_candidate: bool,
    /// 自动装配模式
    pub autowire_mode: AutowireMode,
    /// 前置依赖
    pub depends_on: Vec<String>,
    /// 是否为抽象定义
    pub is_abstract: bool,
    /// 初始化方法
    pub init_method_name: Option<String>,
    /// 销毁方法
    pub destroy_method: Option<DestroyMethod>,
    /// 限定符
    pub qualifiers: BTreeSet<String>,
    /// 方法覆盖
    pub method_overrides: Vec<MethodOverride>,
    /// 属性值
    pub property_values: Vec<(String, PropertyValue)>,
    /// 构造参数
    pub constructor_args: Vec<PropertyValue>,
}

impl MergedBeanDefinition {
    /// 以根定义为起点
    pub fn from_root(name: impl Into<String>, root: &BeanDefinition) -> Self {
        Self {
            name: name.into(),
            bean_class_name: root.bean_class_name.clone(),
            factory_bean_name: root.factory_bean_name.clone(),
            factory_method_name: root.factory_method_name.clone(),
            scope: root.scope.unwrap_or_default(),
            lazy_init: root.lazy_init.unwrap_or(false),
            primary: root.primary,
            autowire_candidate: root.autowire_candidate,
            autowire_mode: root.autowire_mode.unwrap_or_default(),
            depends_on: root.depends_on.clone(),
            is_abstract: root.is_abstract,
            init_method_name: root.init_method_name.clone(),
            destroy_method: root.destroy_method.clone(),
            qualifiers: root.qualifiers.clone(),
            method_overrides: root.method_overrides.clone(),
            property_values: root.property_values.clone(),
            constructor_args: root.constructor_args.clone(),
        }
    }

    /// 用子定义覆盖：子定义设置的字段优先，未设置的字段保留父值
    pub fn override_from(&mut self, name: impl Into<String>, child: &BeanDefinition) {
        self.name = name.into();
        if child.bean_class_name.is_some() {
            self.bean_class_name.clone_from(&child.bean_class_name);
        }
        if child.factory_bean_name.is_some() {
            self.factory_bean_name.clone_from(&child.factory_bean_name);
        }
        if child.factory_method_name.is_some() {
            self.factory_method_name.clone_from(&child.factory_method_name);
        }
        if let Some(scope) = child.scope {
            self.scope = scope;
        }
        if let Some(lazy) = child.lazy_init {
            self.lazy_init = lazy;
        }
        if let Some(mode) = child.autowire_mode {
            self.autowire_mode = mode;
        }
        if child.init_method_name.is_some() {
            self.init_method_name.clone_from(&child.init_method_name);
        }
        if child.destroy_method.is_some() {
            self.destroy_method.clone_from(&child.destroy_method);
        }
        if !child.depends_on.is_empty() {
            self.depends_on.clone_from(&child.depends_on);
        }
        if !child.constructor_args.is_empty() {
            self.constructor_args.clone_from(&child.constructor_args);
        }

        self.primary = child.primary;
        self.is_abstract = child.is_abstract;
        self.autowire_candidate = child.autowire_candidate;
        self.qualifiers.extend(child.qualifiers.iter().cloned());

        for (name, value) in &child.property_values {
            match self.property_values.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = value.clone(),
                None => self.property_values.push((name.clone(), value.clone())),
            }
        }
        for method_override in &child.method_overrides {
            self.method_overrides
                .retain(|o| o.method_name != method_override.method_name);
            self.method_overrides.push(method_override.clone());
        }
    }

    /// 是否为单例
    pub fn is_singleton(&self) -> bool {
        self.scope == BeanScope::Singleton
    }

    /// 是否为原型
    pub fn is_prototype(&self) -> bool {
        self.scope == BeanScope::Prototype
    }

    /// 是否存在方法覆盖
    pub fn has_method_overrides(&self) -> bool {
        !self.method_overrides.is_empty()
    }

    /// 查找显式属性值
    pub fn property_value(&self, name: &str) -> Option<&PropertyValue> {
        self.property_values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// 查找方法覆盖
    pub fn method_override(&self, method_name: &str) -> Option<&MethodOverride> {
        self.method_overrides
            .iter()
            .find(|o| o.method_name == method_name)
    }
}
