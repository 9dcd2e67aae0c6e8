//! 后处理器管道与代理

mod common;

use common::{init_test_logger, journal, label_of, widget_class, Journal, Widget};
use di_abstractions::{
    downcast_bean, Bean, BeanClass, BeanClassRegistry, BeanDefinition, BeanDefinitionRegistry,
    BeanFactory, BeanFactoryExt, BeanRef, BeanValue, ConfigurableBeanFactory,
    FactoryPostProcessor, InstancePostProcessor, MethodDescriptor, MethodInvocation,
    ProcessingContext, PropertyDescriptor, PropertyValue,
};
use di_impl::{
    Advisor, AutoProxyPostProcessor, AutowiredMarkerPostProcessor, DefaultBeanFactory,
    DeprecatedBeanWarner, FixedValueInterceptor, InitDestroyMarkerPostProcessor, MethodMatcher,
    ProxyBean, ProxyFactory, AUTOWIRED_MARKER, POST_CONSTRUCT_MARKER, PRE_DESTROY_MARKER,
};
use infrastructure_common::{BeanError, BeanResult, BeanScope, BoxError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Tagging {
    name: &'static str,
    journal: Journal,
}

impl InstancePostProcessor for Tagging {
    fn name(&self) -> &str {
        self.name
    }

    fn post_process_before_initialization(
        &self,
        bean: BeanRef,
        context: &ProcessingContext<'_>,
    ) -> BeanResult<BeanRef> {
        self.journal
            .lock()
            .push(format!("{}:before:{}", self.name, context.bean_name));
        Ok(bean)
    }

    fn post_process_after_initialization(
        &self,
        bean: BeanRef,
        context: &ProcessingContext<'_>,
    ) -> BeanResult<BeanRef> {
        self.journal
            .lock()
            .push(format!("{}:after:{}", self.name, context.bean_name));
        Ok(bean)
    }
}

/// 初始化后把 Bean 换成另一个对象
struct Swapping;

struct Replacement {
    original: BeanRef,
}

impl Bean for Replacement {
    fn invoke(&self, method: &str, args: &[BeanValue]) -> Result<BeanValue, BoxError> {
        match method {
            "label" => Ok("replacement".into()),
            _ => self.original.invoke(method, args),
        }
    }
}

impl InstancePostProcessor for Swapping {
    fn name(&self) -> &str {
        "swapping"
    }

    fn post_process_after_initialization(
        &self,
        bean: BeanRef,
        _context: &ProcessingContext<'_>,
    ) -> BeanResult<BeanRef> {
        Ok(Arc::new(Replacement { original: bean }))
    }
}

/// 把所有定义改为原型作用域
struct AllPrototypes;

impl FactoryPostProcessor for AllPrototypes {
    fn name(&self) -> &str {
        "all-prototypes"
    }

    fn post_process_bean_factory(&self, factory: &dyn ConfigurableBeanFactory) -> BeanResult<()> {
        for name in factory.bean_definition_names() {
            factory.update_bean_definition(&name, &mut |definition: &mut BeanDefinition| {
                definition.scope = Some(BeanScope::Prototype);
            })?;
        }
        Ok(())
    }
}

/// 第一次执行失败，之后成功
#[derive(Default)]
struct FailsOnce {
    runs: AtomicUsize,
}

impl FactoryPostProcessor for FailsOnce {
    fn name(&self) -> &str {
        "fails-once"
    }

    fn post_process_bean_factory(&self, _factory: &dyn ConfigurableBeanFactory) -> BeanResult<()> {
        if self.runs.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(BeanError::Configuration {
                message: "boom".to_string(),
            });
        }
        Ok(())
    }
}

fn widget_factory(log: &Journal) -> Arc<DefaultBeanFactory> {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    factory.register_class(widget_class(log));
    factory
}

#[test]
fn test_hooks_fire_once_per_creation_in_registration_order() {
    let log = journal();
    let factory = widget_factory(&log);
    factory
        .register_bean_definition(
            "widget",
            BeanDefinition::of_class("Widget")
                .with_property("label", PropertyValue::literal("widget"))
                .with_init_method("init"),
        )
        .unwrap();
    factory.add_instance_post_processor(Arc::new(Tagging {
        name: "first",
        journal: log.clone(),
    }));
    factory.add_instance_post_processor(Arc::new(Tagging {
        name: "second",
        journal: log.clone(),
    }));

    factory.get_bean("widget").unwrap();
    factory.get_bean("widget").unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "first:before:widget",
            "second:before:widget",
            "widget:init",
            "first:after:widget",
            "second:after:widget",
        ]
    );
}

#[test]
fn test_hook_replacement_is_what_consumers_observe() {
    let log = journal();
    let factory = widget_factory(&log);
    factory
        .register_bean_definition("original", BeanDefinition::of_class("Widget"))
        .unwrap();
    factory
        .register_bean_definition(
            "consumer",
            BeanDefinition::of_class("Widget")
                .with_property("peer", PropertyValue::reference("original")),
        )
        .unwrap();
    factory.add_instance_post_processor(Arc::new(Swapping));

    let original = factory.get_bean("original").unwrap();
    assert_eq!(label_of(&original), "replacement");
    assert!(downcast_bean::<Replacement>(original.as_ref()).is_some());

    let consumer = factory.get_bean("consumer").unwrap();
    let consumer = downcast_bean::<Replacement>(consumer.as_ref()).unwrap();
    let peer = downcast_bean::<Widget>(consumer.original.as_ref())
        .and_then(|w| w.peer.clone())
        .unwrap();
    assert!(Arc::ptr_eq(&peer, &original));
}

#[test]
fn test_factory_processor_switching_to_prototype() {
    let log = journal();
    let factory = widget_factory(&log);
    factory
        .register_bean_definition("widget", BeanDefinition::of_class("Widget"))
        .unwrap();
    factory.add_factory_post_processor(Arc::new(AllPrototypes));

    let a = factory.get_bean("widget").unwrap();
    let b = factory.get_bean("widget").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(factory.is_prototype("widget").unwrap());
}

#[test]
fn test_failed_factory_processor_is_retried_before_later_processors() {
    let log = journal();
    let factory = widget_factory(&log);
    factory
        .register_bean_definition("widget", BeanDefinition::of_class("Widget"))
        .unwrap();
    let flaky = Arc::new(FailsOnce::default());
    factory.add_factory_post_processor(flaky.clone());
    factory.add_factory_post_processor(Arc::new(AllPrototypes));

    let err = factory.get_bean("widget").unwrap_err();
    assert!(matches!(err, BeanError::Configuration { .. }));
    assert!(!factory.is_prototype("widget").unwrap());
    assert_eq!(factory.creation_log().len(), 0);

    let a = factory.get_bean("widget").unwrap();
    let b = factory.get_bean("widget").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(factory.is_prototype("widget").unwrap());
    assert_eq!(flaky.runs.load(Ordering::SeqCst), 2);
}

#[test]
fn test_marker_driven_init_destroy_and_injection() {
    init_test_logger();
    let log = journal();
    let factory = DefaultBeanFactory::new();
    let marked = widget_class(&log);
    let marked = BeanClass {
        name: "MarkedWidget".to_string(),
        methods: vec![
            MethodDescriptor::new("setup").with_marker(POST_CONSTRUCT_MARKER),
            MethodDescriptor::new("teardown").with_marker(PRE_DESTROY_MARKER),
        ],
        properties: vec![
            PropertyDescriptor::simple("label"),
            PropertyDescriptor::bean::<Widget>("peer").with_marker(AUTOWIRED_MARKER),
        ],
        ..marked
    };
    factory.register_class(widget_class(&log));
    factory.register_class(marked);
    factory
        .register_bean_definition(
            "dependency",
            BeanDefinition::of_class("Widget").with_property("label", PropertyValue::literal("dep")),
        )
        .unwrap();
    factory
        .register_bean_definition(
            "marked",
            BeanDefinition::of_class("MarkedWidget")
                .with_property("label", PropertyValue::literal("marked")),
        )
        .unwrap();
    factory.add_instance_post_processor(Arc::new(InitDestroyMarkerPostProcessor::default()));
    factory.add_instance_post_processor(Arc::new(AutowiredMarkerPostProcessor::default()));

    let marked = factory.get_bean_as::<Widget>("marked").unwrap();
    let peer = marked.peer.clone().unwrap();
    assert!(Arc::ptr_eq(&peer, &factory.get_bean("dependency").unwrap()));
    assert_eq!(*log.lock(), vec!["marked:setup"]);

    assert!(factory.destroy_singletons().is_clean());
    assert_eq!(*log.lock(), vec!["marked:setup", "marked:teardown"]);
}

#[test]
fn test_deprecated_class_warning() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    let log = journal();
    factory.register_class(BeanClass {
        name: "LegacyWidget".to_string(),
        ..widget_class(&log).deprecated()
    });
    factory
        .register_bean_definition("legacy", BeanDefinition::of_class("LegacyWidget"))
        .unwrap();
    let warner = Arc::new(DeprecatedBeanWarner::new());
    factory.add_factory_post_processor(warner.clone());

    factory.get_bean("legacy").unwrap();
    assert_eq!(warner.warned_beans(), vec!["legacy"]);
}

#[test]
fn test_proxy_advice_chain_wraps_target() {
    let log = journal();
    let factory = widget_factory(&log);
    factory
        .register_bean_definition(
            "widget",
            BeanDefinition::of_class("Widget").with_property("label", PropertyValue::literal("w")),
        )
        .unwrap();
    let target = factory.get_bean("widget").unwrap();

    let outer_log = log.clone();
    let inner_log = log.clone();
    let mut proxies = ProxyFactory::new();
    proxies
        .add_advice(Arc::new(move |invocation: &mut MethodInvocation<'_>| {
            outer_log.lock().push(format!("outer:{}", invocation.method()));
            let result = invocation.proceed();
            outer_log.lock().push("outer:done".to_string());
            result
        }))
        .add_advice(Arc::new(move |invocation: &mut MethodInvocation<'_>| {
            inner_log.lock().push(format!("inner:{}", invocation.method()));
            invocation.proceed()
        }));

    let proxy = proxies.get_proxy(target.clone());
    assert_eq!(label_of(&proxy), "w");
    assert_eq!(*log.lock(), vec!["outer:label", "inner:label", "outer:done"]);

    let proxied = downcast_bean::<ProxyBean>(proxy.as_ref()).unwrap();
    assert!(Arc::ptr_eq(proxied.proxied(), &target));
}

#[test]
fn test_auto_proxy_substitutes_selected_beans() {
    let log = journal();
    let factory = widget_factory(&log);
    factory
        .register_bean_definition("proxied", BeanDefinition::of_class("Widget"))
        .unwrap();
    factory
        .register_bean_definition("untouched", BeanDefinition::of_class("Widget"))
        .unwrap();

    let mut proxies = ProxyFactory::new();
    proxies.add_advisor(Advisor::new(
        MethodMatcher::names(["compute"]),
        Arc::new(FixedValueInterceptor::new("FIXED")),
    ));
    factory.add_instance_post_processor(Arc::new(AutoProxyPostProcessor::new(["proxied"], proxies)));

    let proxied = factory.get_bean("proxied").unwrap();
    assert_eq!(proxied.invoke("compute", &[]).unwrap().as_str(), Some("FIXED"));
    assert!(proxied.invoke("label", &[]).is_ok());
    assert!(Arc::ptr_eq(&proxied, &factory.get_bean("proxied").unwrap()));

    let untouched = factory.get_bean("untouched").unwrap();
    assert_eq!(untouched.invoke("compute", &[]).unwrap().as_str(), Some("ORIGINAL"));
    assert!(factory.get_bean_as::<Widget>("untouched").is_ok());
    assert!(factory.get_bean_as::<Widget>("proxied").is_err());
}
