//! 工厂方法与构造参数

mod common;

use common::{init_test_logger, journal, label_of, widget_class, Journal, Widget};
use di_abstractions::{
    Bean, BeanClass, BeanClassRegistry, BeanDefinition, BeanDefinitionRegistry, BeanFactory,
    BeanFactoryExt, BeanValue, MethodDescriptor, ParameterDescriptor, PropertyValue,
};
use di_impl::DefaultBeanFactory;
use infrastructure_common::{BeanError, BoxError, TypeInfo};
use serde_json::json;
use std::sync::Arc;

/// 带标签参数构造的 Widget
fn labelled_widget(journal: &Journal, args: &[BeanValue]) -> Result<Box<dyn Bean>, BoxError> {
    let label = args
        .first()
        .and_then(BeanValue::as_str)
        .ok_or_else(|| anyhow::anyhow!("需要字符串标签"))?;
    let mut widget = Widget::new(journal.clone());
    widget.set_property("label", label.into())?;
    Ok(Box::new(widget))
}

/// 实例工厂：`make` 返回新的 Widget
struct WidgetMaker {
    journal: Journal,
}

impl Bean for WidgetMaker {
    fn invoke(&self, method: &str, args: &[BeanValue]) -> Result<BeanValue, BoxError> {
        match method {
            "make" => {
                let widget: Arc<dyn Bean> = Arc::from(labelled_widget(&self.journal, args)?);
                Ok(BeanValue::Bean(widget))
            }
            other => Err(anyhow::anyhow!("WidgetMaker 没有方法 {other}").into()),
        }
    }
}

fn register_classes(factory: &DefaultBeanFactory, log: &Journal) {
    let ctor_log = log.clone();
    let static_log = log.clone();
    factory.register_class(
        widget_class(log)
            .constructor(vec![ParameterDescriptor::simple("label")], move |args| {
                labelled_widget(&ctor_log, args)
            })
            .factory_method(
                "with_label",
                vec![ParameterDescriptor::simple("label")],
                None,
                move |args| labelled_widget(&static_log, args),
            ),
    );
    let maker_log = log.clone();
    factory.register_class(
        BeanClass::of::<WidgetMaker>("WidgetMaker")
            .constructor(Vec::new(), move |_| {
                Ok(Box::new(WidgetMaker {
                    journal: maker_log.clone(),
                }))
            })
            .method(MethodDescriptor::new("make").with_parameters(1).returning("Widget")),
    );
}

#[test]
fn test_constructor_arguments_select_constructor_by_arity() {
    init_test_logger();
    let log = journal();
    let factory = DefaultBeanFactory::new();
    register_classes(&factory, &log);
    factory
        .register_bean_definition(
            "named",
            BeanDefinition::of_class("Widget").with_constructor_arg(PropertyValue::literal("ctor")),
        )
        .unwrap();
    factory
        .register_bean_definition("runtime", BeanDefinition::of_class("Widget").prototype())
        .unwrap();

    assert_eq!(label_of(&factory.get_bean("named").unwrap()), "ctor");
    let runtime = factory
        .get_bean_with_args("runtime", &["given".into()])
        .unwrap();
    assert_eq!(label_of(&runtime), "given");
    assert_eq!(label_of(&factory.get_bean("runtime").unwrap()), "");
}

#[test]
fn test_static_factory_method() {
    init_test_logger();
    let log = journal();
    let factory = DefaultBeanFactory::new();
    register_classes(&factory, &log);
    factory
        .register_bean_definition(
            "made",
            BeanDefinition::of_class("Widget")
                .with_factory_method("with_label")
                .with_constructor_arg(PropertyValue::literal("static")),
        )
        .unwrap();
    factory
        .register_bean_definition(
            "unknown",
            BeanDefinition::of_class("Widget").with_factory_method("nope"),
        )
        .unwrap();

    let made = factory.get_bean_as::<Widget>("made").unwrap();
    assert_eq!(made.label, "static");
    assert_eq!(factory.get_type("made").unwrap(), Some(TypeInfo::of::<Widget>()));
    assert!(matches!(
        factory.get_bean("unknown"),
        Err(BeanError::InvalidBeanDefinition { .. })
    ));
}

#[test]
fn test_instance_factory_method_with_property_population() {
    init_test_logger();
    let log = journal();
    let factory = DefaultBeanFactory::new();
    register_classes(&factory, &log);
    factory
        .register_bean_definition("maker", BeanDefinition::of_class("WidgetMaker"))
        .unwrap();
    factory
        .register_bean_definition("target", BeanDefinition::of_class("Widget"))
        .unwrap();
    factory
        .register_bean_definition(
            "product",
            BeanDefinition::new()
                .with_factory_bean("maker", "make")
                .with_constructor_arg(PropertyValue::literal("from-maker"))
                .with_property("peer", PropertyValue::reference("target"))
                .prototype(),
        )
        .unwrap();

    let product = factory.get_bean_as::<Widget>("product").unwrap();
    assert_eq!(product.label, "from-maker");
    assert!(Arc::ptr_eq(
        product.peer.as_ref().unwrap(),
        &factory.get_bean("target").unwrap()
    ));
    assert_eq!(factory.get_type("product").unwrap(), Some(TypeInfo::of::<Widget>()));
    assert!(factory
        .get_bean_checked("product", &TypeInfo::of::<Widget>())
        .is_ok());
}

#[test]
fn test_factory_method_errors_are_wrapped_with_bean_name() {
    init_test_logger();
    let log = journal();
    let factory = DefaultBeanFactory::new();
    register_classes(&factory, &log);
    factory
        .register_bean_definition(
            "broken",
            BeanDefinition::of_class("Widget")
                .with_factory_method("with_label")
                .with_constructor_arg(PropertyValue::literal(json!({ "label": 42 }))),
        )
        .unwrap();

    let err = factory.get_bean("broken").unwrap_err();
    assert!(matches!(err, BeanError::BeanCreation { ref bean_name, .. } if bean_name == "broken"));
}
