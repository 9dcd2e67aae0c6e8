//! 代理工厂
//!
//! 用一组有序的通知器（拦截器 + 方法匹配器）包装任意 Bean。代理实现同一个 [`Bean`]
//! 接口，调用方无法区分代理和原始实例。

use di_abstractions::{
    Bean, BeanRef, BeanValue, InstancePostProcessor, MethodInterceptor, MethodInvocation,
    MethodReplacer, ProcessingContext,
};
use infrastructure_common::{BeanResult, BoxError};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 方法匹配器
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatcher {
    /// 匹配所有方法
    All,
    /// 只匹配列出的方法
    Names(BTreeSet<String>),
}

impl MethodMatcher {
    /// 按方法名匹配
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    /// 是否匹配
    pub fn matches(&self, method: &str) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => names.contains(method),
        }
    }
}

/// 通知器：拦截器与方法匹配器的组合
#[derive(Clone)]
pub struct Advisor {
    /// 方法匹配器
    pub matcher: MethodMatcher,
    /// 拦截器
    pub interceptor: Arc<dyn MethodInterceptor>,
}

impl Advisor {
    /// 创建通知器
    pub fn new(matcher: MethodMatcher, interceptor: Arc<dyn MethodInterceptor>) -> Self {
        Self {
            matcher,
            interceptor,
        }
    }

    /// 拦截所有方法的通知器
    pub fn for_all(interceptor: Arc<dyn MethodInterceptor>) -> Self {
        Self::new(MethodMatcher::All, interceptor)
    }
}

impl fmt::Debug for Advisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advisor")
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

/// 代理工厂
#[derive(Debug, Clone, Default)]
pub struct ProxyFactory {
    advisors: Vec<Advisor>,
}

impl ProxyFactory {
    /// 创建空的代理工厂
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加通知器
    pub fn add_advisor(&mut self, advisor: Advisor) -> &mut Self {
        self.advisors.push(advisor);
        self
    }

    /// 添加拦截所有方法的通知
    pub fn add_advice(&mut self, interceptor: Arc<dyn MethodInterceptor>) -> &mut Self {
        self.add_advisor(Advisor::for_all(interceptor))
    }

    /// 通知器数量
    pub fn advisor_count(&self) -> usize {
        self.advisors.len()
    }

    /// 生成代理
    pub fn get_proxy(&self, target: BeanRef) -> BeanRef {
        debug!("创建代理，通知器数量: {}", self.advisors.len());
        Arc::new(ProxyBean {
            target,
            advisors: self.advisors.clone(),
        })
    }
}

/// 代理 Bean
pub struct ProxyBean {
    target: BeanRef,
    advisors: Vec<Advisor>,
}

impl ProxyBean {
    /// 被代理的实例
    pub fn proxied(&self) -> &BeanRef {
        &self.target
    }
}

impl Bean for ProxyBean {
    fn invoke(&self, method: &str, args: &[BeanValue]) -> Result<BeanValue, BoxError> {
        let chain: Vec<Arc<dyn MethodInterceptor>> = self
            .advisors
            .iter()
            .filter(|a| a.matcher.matches(method))
            .map(|a| a.interceptor.clone())
            .collect();
        let mut invocation =
            MethodInvocation::new(method, args.to_vec(), self.target.as_ref(), &chain);
        invocation.proceed()
    }

    fn target(&self) -> Option<&dyn Bean> {
        Some(self.target.as_ref())
    }

    fn as_method_replacer(&self) -> Option<&dyn MethodReplacer> {
        self.target.as_method_replacer()
    }
}

/// 固定返回值拦截器，不调用目标
#[derive(Debug, Clone)]
pub struct FixedValueInterceptor {
    value: BeanValue,
}

impl FixedValueInterceptor {
    /// 创建拦截器
    pub fn new(value: impl Into<BeanValue>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl MethodInterceptor for FixedValueInterceptor {
    fn invoke(&self, _invocation: &mut MethodInvocation<'_>) -> Result<BeanValue, BoxError> {
        Ok(self.value.clone())
    }
}

/// 自动代理后处理器
///
/// 在初始化后钩子中为选中的 Bean 生成代理。
#[derive(Debug, Clone)]
pub struct AutoProxyPostProcessor {
    bean_names: BTreeSet<String>,
    factory: ProxyFactory,
}

impl AutoProxyPostProcessor {
    /// 为指定名称的 Bean 生成代理
    pub fn new<I, S>(bean_names: I, factory: ProxyFactory) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bean_names: bean_names.into_iter().map(Into::into).collect(),
            factory,
        }
    }
}

impl InstancePostProcessor for AutoProxyPostProcessor {
    fn name(&self) -> &str {
        "auto-proxy"
    }

    fn post_process_after_initialization(
        &self,
        bean: BeanRef,
        context: &ProcessingContext<'_>,
    ) -> BeanResult<BeanRef> {
        if self.bean_names.contains(context.bean_name) {
            debug!("为 Bean '{}' 创建自动代理", context.bean_name);
            return Ok(self.factory.get_proxy(bean));
        }
        Ok(bean)
    }
}
