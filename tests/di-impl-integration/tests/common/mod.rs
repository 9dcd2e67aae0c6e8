//! 集成测试共用的 Bean 与工具
#![allow(dead_code)]

use anyhow::anyhow;
use di_abstractions::{
    Bean, BeanClass, BeanRef, BeanValue, MethodDescriptor, MethodReplacer, PropertyDescriptor,
};
use infrastructure_common::{BeanError, BoxError};
use parking_lot::Mutex;
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
pub fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// 多个 Bean 共享的调用日志
pub type Journal = Arc<Mutex<Vec<String>>>;

/// 新建日志
pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// 通用测试 Bean
pub struct Widget {
    pub label: String,
    pub peer: Option<BeanRef>,
    journal: Journal,
}

impl Widget {
    pub fn new(journal: Journal) -> Self {
        Self {
            label: String::new(),
            peer: None,
            journal,
        }
    }
}

impl Bean for Widget {
    fn set_property(&mut self, name: &str, value: BeanValue) -> Result<(), BoxError> {
        match name {
            "label" => {
                self.label = value
                    .as_str()
                    .ok_or_else(|| anyhow!("label 必须是字符串"))?
                    .to_string();
                Ok(())
            }
            "peer" => {
                self.peer = value.into_bean();
                Ok(())
            }
            other => Err(anyhow!("Widget 没有属性 {other}").into()),
        }
    }

    fn invoke(&self, method: &str, _args: &[BeanValue]) -> Result<BeanValue, BoxError> {
        match method {
            "init" | "close" | "shutdown" | "dispose" | "setup" | "teardown" => {
                self.journal.lock().push(format!("{}:{}", self.label, method));
                Ok(BeanValue::Null)
            }
            "label" => Ok(self.label.clone().into()),
            "compute" => Ok("ORIGINAL".into()),
            "explode" => Err(anyhow!("widget {} exploded", self.label).into()),
            other => Err(BeanError::NoSuchMethod {
                method: other.to_string(),
            }
            .into()),
        }
    }
}

/// Widget 的类元数据
pub fn widget_class(journal: &Journal) -> BeanClass {
    let journal = journal.clone();
    BeanClass::of::<Widget>("Widget")
        .constructor(Vec::new(), move |_| Ok(Box::new(Widget::new(journal.clone()))))
        .property(PropertyDescriptor::simple("label"))
        .property(PropertyDescriptor::bean::<Widget>("peer"))
        .method(MethodDescriptor::new("init"))
        .method(MethodDescriptor::new("close"))
        .method(MethodDescriptor::new("dispose"))
        .method(MethodDescriptor::new("label"))
        .method(MethodDescriptor::new("compute"))
        .method(MethodDescriptor::new("explode"))
}

/// 替换器：整体替换被覆盖方法的结果
#[derive(Default)]
pub struct Reimplementer;

impl MethodReplacer for Reimplementer {
    fn reimplement(
        &self,
        _target: &dyn Bean,
        _method: &MethodDescriptor,
        _args: &[BeanValue],
    ) -> Result<BeanValue, BoxError> {
        Ok("REIMPLEMENTED".into())
    }
}

impl Bean for Reimplementer {
    fn as_method_replacer(&self) -> Option<&dyn MethodReplacer> {
        Some(self)
    }
}

/// 替换器的类元数据
pub fn reimplementer_class() -> BeanClass {
    BeanClass::with_default::<Reimplementer>("Reimplementer")
}

/// 取出 Widget 的标签
pub fn label_of(bean: &BeanRef) -> String {
    bean.invoke("label", &[])
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
