//! 方法拦截抽象
//!
//! - [`MethodReplacer`] - Replace 方法覆盖的替换器入口
//! - [`MethodInterceptor`] - 代理通知（环绕调用）
//! - [`MethodInvocation`] - 拦截器链上的一次调用

use crate::bean::{Bean, BeanValue};
use crate::class::MethodDescriptor;
use infrastructure_common::BoxError;
use std::sync::Arc;

/// 方法替换器
///
/// 返回值完全取代原方法体的结果，原方法体不会执行。
pub trait MethodReplacer: Send + Sync {
    /// 重新实现被拦截的方法
    fn reimplement(
        &self,
        target: &dyn Bean,
        method: &MethodDescriptor,
        args: &[BeanValue],
    ) -> Result<BeanValue, BoxError>;
}

/// 方法拦截器
pub trait MethodInterceptor: Send + Sync {
    /// 拦截一次调用，调用 [`MethodInvocation::proceed`] 继续执行链
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> Result<BeanValue, BoxError>;
}

impl<F> MethodInterceptor for F
where
    F: Fn(&mut MethodInvocation<'_>) -> Result<BeanValue, BoxError> + Send + Sync,
{
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> Result<BeanValue, BoxError> {
        self(invocation)
    }
}

/// 拦截器链上的一次方法调用
pub struct MethodInvocation<'a> {
    method: &'a str,
    args: Vec<BeanValue>,
    target: &'a dyn Bean,
    chain: &'a [Arc<dyn MethodInterceptor>],
    position: usize,
}

impl<'a> MethodInvocation<'a> {
    /// 创建调用，`chain` 为已按方法过滤的拦截器
    pub fn new(
        method: &'a str,
        args: Vec<BeanValue>,
        target: &'a dyn Bean,
        chain: &'a [Arc<dyn MethodInterceptor>],
    ) -> Self {
        Self {
            method,
            args,
            target,
            chain,
            position: 0,
        }
    }

    /// 方法名
    pub fn method(&self) -> &str {
        self.method
    }

    /// 调用参数
    pub fn args(&self) -> &[BeanValue] {
        &self.args
    }

    /// 可修改的调用参数
    pub fn args_mut(&mut self) -> &mut Vec<BeanValue> {
        &mut self.args
    }

    /// 目标实例
    pub fn target(&self) -> &dyn Bean {
        self.target
    }

    /// 执行链上的下一个拦截器，链尾调用目标实例
    pub fn proceed(&mut self) -> Result<BeanValue, BoxError> {
        let chain = self.chain;
        match chain.get(self.position) {
            Some(next) => {
                self.position += 1;
                let result = next.invoke(self);
                self.position -= 1;
                result
            }
            None => self.target.invoke(self.method, &self.args),
        }
    }
}
