//! Bean 类元数据
//!
//! 容器本身不做内省。每个可实例化的类型都由元数据提取方描述为一个 [`BeanClass`]，
//! 以类名注册到容器，Bean 定义通过类名引用它。

use crate::bean::{Bean, BeanValue};
use infrastructure_common::{BoxError, TypeInfo};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// 构造函数 / 静态工厂方法
pub type CreateFn = Arc<dyn Fn(&[BeanValue]) -> Result<Box<dyn Bean>, BoxError> + Send + Sync>;

/// 属性或参数的类型种类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    /// 简单值（字面量），不参与按类型装配
    Simple,
    /// Bean 引用，声明类型用于按类型装配
    Bean(TypeInfo),
}

impl PropertyKind {
    /// 声明类型为 `T` 的 Bean 引用
    pub fn bean<T: ?Sized + 'static>() -> Self {
        Self::Bean(TypeInfo::of::<T>())
    }

    /// 声明的 Bean 类型
    pub fn bean_type(&self) -> Option<&TypeInfo> {
        match self {
            Self::Simple => None,
            Self::Bean(type_info) => Some(type_info),
        }
    }
}

/// 构造参数 / 工厂方法参数描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// 参数名
    pub name: String,
    /// 参数种类
    pub kind: PropertyKind,
}

impl ParameterDescriptor {
    /// 简单值参数
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Simple,
        }
    }

    /// Bean 参数
    pub fn bean<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::bean::<T>(),
        }
    }
}

/// 可写属性描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// 属性名
    pub name: String,
    /// 属性种类
    pub kind: PropertyKind,
    /// 注入点限定符
    pub qualifier: Option<String>,
    /// 是否为必需依赖
    pub required: bool,
    /// 标记（例如 `autowired`）
    pub markers: BTreeSet<String>,
}

impl PropertyDescriptor {
    /// 简单值属性
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Simple,
            qualifier: None,
            required: false,
            markers: BTreeSet::new(),
        }
    }

    /// Bean 引用属性
    pub fn bean<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            kind: PropertyKind::bean::<T>(),
            ..Self::simple(name)
        }
    }

    /// 设置限定符
    pub fn qualified(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// 标记为必需
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// 添加标记
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.insert(marker.into());
        self
    }

    /// 是否携带标记
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.contains(marker)
    }
}

/// 方法描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// 方法名
    pub name: String,
    /// 参数个数
    pub parameter_count: usize,
    /// 标记（例如 `post_construct`）
    pub markers: BTreeSet<String>,
    /// 返回的 Bean 类名（实例工厂方法）
    pub returns: Option<String>,
}

impl MethodDescriptor {
    /// 无参方法
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter_count: 0,
            markers: BTreeSet::new(),
            returns: None,
        }
    }

    /// 设置参数个数
    pub fn with_parameters(mut self, count: usize) -> Self {
        self.parameter_count = count;
        self
    }

    /// 添加标记
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.insert(marker.into());
        self
    }

    /// 声明返回的 Bean 类
    pub fn returning(mut self, class_name: impl Into<String>) -> Self {
        self.returns = Some(class_name.into());
        self
    }

    /// 是否携带标记
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.contains(marker)
    }
}

/// 构造函数描述
#[derive(Clone)]
pub struct ConstructorDescriptor {
    /// 参数
    pub parameters: Vec<ParameterDescriptor>,
    /// 构造函数
    pub create: CreateFn,
}

impl ConstructorDescriptor {
    /// 创建构造函数描述
    pub fn new<F>(parameters: Vec<ParameterDescriptor>, create: F) -> Self
    where
        F: Fn(&[BeanValue]) -> Result<Box<dyn Bean>, BoxError> + Send + Sync + 'static,
    {
        Self {
            parameters,
            create: Arc::new(create),
        }
    }

    /// 参数个数
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// 是否所有参数都是 Bean 引用
    pub fn is_autowirable(&self) -> bool {
        !self.parameters.is_empty()
            && self
                .parameters
                .iter()
                .all(|p| matches!(p.kind, PropertyKind::Bean(_)))
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// 静态工厂方法描述
#[derive(Clone)]
pub struct FactoryMethodDescriptor {
    /// 方法名
    pub name: String,
    /// 参数
    pub parameters: Vec<ParameterDescriptor>,
    /// 产出的 Bean 类名，为空时视为声明类本身
    pub product_class: Option<String>,
    /// 工厂函数
    pub create: CreateFn,
}

impl fmt::Debug for FactoryMethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryMethodDescriptor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("product_class", &self.product_class)
            .finish_non_exhaustive()
    }
}

/// Bean 类元数据
#[derive(Debug, Clone)]
pub struct BeanClass {
    /// 类名（注册键）
    pub name: String,
    /// 具体类型
    pub type_info: TypeInfo,
    /// 可赋值的接口类型（`dyn Trait`）
    pub interfaces: Vec<TypeInfo>,
    /// 构造函数
    pub constructors: Vec<ConstructorDescriptor>,
    /// 静态工厂方法
    pub factory_methods: Vec<FactoryMethodDescriptor>,
    /// 可写属性
    pub properties: Vec<PropertyDescriptor>,
    /// 可调用方法
    pub methods: Vec<MethodDescriptor>,
    /// 是否已废弃
    pub deprecated: bool,
}

impl BeanClass {
    /// 描述类型 `T`
    pub fn of<T: Bean>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_info: TypeInfo::of::<T>(),
            interfaces: Vec::new(),
            constructors: Vec::new(),
            factory_methods: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            deprecated: false,
        }
    }

    /// 描述类型 `T`，并以 `T::default()` 作为无参构造函数
    pub fn with_default<T: Bean + Default>(name: impl Into<String>) -> Self {
        Self::of::<T>(name).constructor(Vec::new(), |_| Ok(Box::new(T::default())))
    }

    /// 声明可赋值的接口类型
    pub fn implements<I: ?Sized + 'static>(mut self) -> Self {
        self.interfaces.push(TypeInfo::of::<I>());
        self
    }

    /// 添加构造函数
    pub fn constructor<F>(mut self, parameters: Vec<ParameterDescriptor>, create: F) -> Self
    where
        F: Fn(&[BeanValue]) -> Result<Box<dyn Bean>, BoxError> + Send + Sync + 'static,
    {
        self.constructors
            .push(ConstructorDescriptor::new(parameters, create));
        self
    }

    /// 添加静态工厂方法
    pub fn factory_method<F>(
        mut self,
        name: impl Into<String>,
        parameters: Vec<ParameterDescriptor>,
        product_class: Option<&str>,
        create: F,
    ) -> Self
    where
        F: Fn(&[BeanValue]) -> Result<Box<dyn Bean>, BoxError> + Send + Sync + 'static,
    {
        self.factory_methods.push(FactoryMethodDescriptor {
            name: name.into(),
            parameters,
            product_class: product_class.map(str::to_string),
            create: Arc::new(create),
        });
        self
    }

    /// 添加属性
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// 添加方法
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// 标记为已废弃
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// 是否可赋值给指定类型
    pub fn is_assignable_to(&self, required: &TypeInfo) -> bool {
        self.type_info.id == required.id || self.interfaces.iter().any(|i| i.id == required.id)
    }

    /// 无参构造函数
    pub fn default_constructor(&self) -> Option<&ConstructorDescriptor> {
        self.constructors.iter().find(|c| c.arity() == 0)
    }

    /// 指定参数个数的构造函数
    pub fn constructor_with_arity(&self, arity: usize) -> Option<&ConstructorDescriptor> {
        self.constructors.iter().find(|c| c.arity() == arity)
    }

    /// 查找静态工厂方法
    pub fn find_factory_method(&self, name: &str) -> Option<&FactoryMethodDescriptor> {
        self.factory_methods.iter().find(|m| m.name == name)
    }

    /// 查找属性
    pub fn find_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// 查找方法
    pub fn find_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// 携带指定标记的方法
    pub fn methods_with_marker<'a>(
        &'a self,
        marker: &'a str,
    ) -> impl Iterator<Item = &'a MethodDescriptor> + 'a {
        self.methods.iter().filter(move |m| m.has_marker(marker))
    }
}
