//! 依赖解析抽象接口
//!
//! 提供注入点描述、候选过滤策略，以及单次解析的上下文（循环检测与深度限制）。

use crate::bean::BeanRef;
use crate::definition::MergedBeanDefinition;
use infrastructure_common::{BeanError, BeanResult, TypeInfo};

/// 注入点描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDescriptor {
    /// 注入点名称（属性名或参数名）
    pub name: String,
    /// 需要的类型
    pub required_type: TypeInfo,
    /// 限定符
    pub qualifier: Option<String>,
    /// 是否必需
    pub required: bool,
}

impl DependencyDescriptor {
    /// 创建可选依赖描述
    pub fn new(name: impl Into<String>, required_type: TypeInfo) -> Self {
        Self {
            name: name.into(),
            required_type,
            qualifier: None,
            required: false,
        }
    }

    /// 设置限定符
    pub fn with_qualifier(mut self, qualifier: Option<String>) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// 设置是否必需
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// 依赖解析器
///
/// 在属性填充阶段暴露给实例后处理器。
pub trait DependencyResolver {
    /// 按类型解析注入点
    ///
    /// 返回 `Ok(None)` 表示非必需依赖无法满足，属性保持未设置。
    fn resolve_dependency(&self, descriptor: &DependencyDescriptor) -> BeanResult<Option<BeanRef>>;

    /// 按名称解析，名称不存在时返回 `Ok(None)`
    fn resolve_by_name(&self, name: &str) -> BeanResult<Option<BeanRef>>;
}

/// 自动装配候选过滤策略
pub trait AutowireCandidateResolver: Send + Sync {
    /// 候选定义是否可注入到注入点
    fn is_autowire_candidate(
        &self,
        candidate_name: &str,
        candidate: &MergedBeanDefinition,
        descriptor: &DependencyDescriptor,
    ) -> bool;
}

/// 只按类型和 `autowire_candidate` 标志过滤
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleAutowireCandidateResolver;

impl AutowireCandidateResolver for SimpleAutowireCandidateResolver {
    fn is_autowire_candidate(
        &self,
        _candidate_name: &str,
        candidate: &MergedBeanDefinition,
        _descriptor: &DependencyDescriptor,
    ) -> bool {
        candidate.autowire_candidate
    }
}

/// 额外比对注入点限定符
///
/// 候选定义声明了相同限定符，或候选名称等于限定符时匹配。
#[derive(Debug, Clone, Copy, Default)]
pub struct QualifierAutowireCandidateResolver;

impl AutowireCandidateResolver for QualifierAutowireCandidateResolver {
    fn is_autowire_candidate(
        &self,
        candidate_name: &str,
        candidate: &MergedBeanDefinition,
        descriptor: &DependencyDescriptor,
    ) -> bool {
        if !candidate.autowire_candidate {
            return false;
        }
        match &descriptor.qualifier {
            None => true,
            Some(qualifier) => {
                candidate.qualifiers.contains(qualifier) || candidate_name == qualifier
            }
        }
    }
}

/// 解析上下文
///
/// 记录当前调用栈上的解析链，用于原型循环检测和深度限制。
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前解析链
    pub resolution_chain: Vec<String>,
    /// 最大解析深度
    pub max_depth: usize,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new(max_depth: usize) -> Self {
        Self {
            resolution_chain: Vec::new(),
            max_depth,
        }
    }

    /// 添加 Bean 到解析链
    pub fn push(&mut self, bean_name: &str) -> BeanResult<()> {
        if self.resolution_chain.iter().any(|n| n == bean_name) {
            return Err(BeanError::CircularReference {
                bean_name: bean_name.to_string(),
                chain: self.describe_with(bean_name),
            });
        }
        if self.resolution_chain.len() >= self.max_depth {
            return Err(BeanError::ResolutionDepthExceeded {
                max_depth: self.max_depth,
                chain: self.describe_with(bean_name),
            });
        }
        self.resolution_chain.push(bean_name.to_string());
        Ok(())
    }

    /// 从解析链中移除最后一个 Bean
    pub fn pop(&mut self) {
        self.resolution_chain.pop();
    }

    /// 当前深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    /// 描述解析链（附加即将解析的 Bean）
    pub fn describe_with(&self, bean_name: &str) -> String {
        let mut chain = self.resolution_chain.join(" -> ");
        if !chain.is_empty() {
            chain.push_str(" -> ");
        }
        chain.push_str(bean_name);
        chain
    }
}
