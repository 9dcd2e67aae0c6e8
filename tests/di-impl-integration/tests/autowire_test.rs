//! 自动装配：唯一候选、primary、限定符、按名称、构造函数装配

mod common;

use common::init_test_logger;
use di_abstractions::{
    Bean, BeanClass, BeanDefinition, BeanDefinitionRegistry, BeanClassRegistry, BeanFactory,
    BeanFactoryExt, BeanRef, BeanValue, downcast_bean, ParameterDescriptor, PropertyDescriptor,
    SimpleAutowireCandidateResolver,
};
use di_impl::DefaultBeanFactory;
use infrastructure_common::{AutowireMode, BeanError, BoxError, TypeInfo};
use std::sync::Arc;

/// 存储接口
trait Store: Send + Sync {}

#[derive(Default)]
struct MemoryStore;

impl Bean for MemoryStore {}
impl Store for MemoryStore {}

#[derive(Default)]
struct DiskStore;

impl Bean for DiskStore {}
impl Store for DiskStore {}

#[derive(Default)]
struct Repository {
    store: Option<BeanRef>,
}

impl Bean for Repository {
    fn set_property(&mut self, name: &str, value: BeanValue) -> Result<(), BoxError> {
        match name {
            "store" => {
                self.store = value.into_bean();
                Ok(())
            }
            other => Err(anyhow::anyhow!("Repository 没有属性 {other}").into()),
        }
    }
}

struct Service {
    store: BeanRef,
}

impl Bean for Service {}

fn is_a<T: Bean>(bean: &BeanRef) -> bool {
    downcast_bean::<T>(bean.as_ref()).is_some()
}

fn register_stores(factory: &DefaultBeanFactory) {
    factory.register_class(BeanClass::with_default::<MemoryStore>("MemoryStore").implements::<dyn Store>());
    factory.register_class(BeanClass::with_default::<DiskStore>("DiskStore").implements::<dyn Store>());
}

fn repository_class(qualifier: Option<&str>) -> BeanClass {
    let property = PropertyDescriptor::bean::<dyn Store>("store");
    let property = match qualifier {
        Some(q) => property.qualified(q),
        None => property,
    };
    BeanClass::with_default::<Repository>("Repository").property(property)
}

fn by_type(class: &str) -> BeanDefinition {
    BeanDefinition::of_class(class).with_autowire(AutowireMode::ByType)
}

fn injected_store(factory: &DefaultBeanFactory, name: &str) -> BeanRef {
    factory
        .get_bean_as::<Repository>(name)
        .unwrap()
        .store
        .clone()
        .expect("store 应已注入")
}

#[test]
fn test_single_candidate_is_injected() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    register_stores(&factory);
    factory.register_class(repository_class(None));
    factory
        .register_bean_definition("memory", BeanDefinition::of_class("MemoryStore"))
        .unwrap();
    factory
        .register_bean_definition("repository", by_type("Repository"))
        .unwrap();

    let store = injected_store(&factory, "repository");
    assert!(Arc::ptr_eq(&store, &factory.get_bean("memory").unwrap()));
    assert!(is_a::<MemoryStore>(&store));
}

#[test]
fn test_primary_wins_between_two_candidates() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    register_stores(&factory);
    factory.register_class(repository_class(None));
    factory
        .register_bean_definition("memory", BeanDefinition::of_class("MemoryStore"))
        .unwrap();
    factory
        .register_bean_definition("disk", BeanDefinition::of_class("DiskStore").primary(true))
        .unwrap();
    factory
        .register_bean_definition("repository", by_type("Repository"))
        .unwrap();

    let store = injected_store(&factory, "repository");
    assert!(is_a::<DiskStore>(&store));

    let by_type = factory.get_bean_by::<dyn Store>().unwrap();
    assert!(Arc::ptr_eq(&by_type, &store));
}

#[test]
fn test_qualifier_restricts_candidates() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    register_stores(&factory);
    factory.register_class(repository_class(Some("durable")));
    factory
        .register_bean_definition("memory", BeanDefinition::of_class("MemoryStore"))
        .unwrap();
    factory
        .register_bean_definition(
            "disk",
            BeanDefinition::of_class("DiskStore").with_qualifier("durable"),
        )
        .unwrap();
    factory
        .register_bean_definition("repository", by_type("Repository"))
        .unwrap();

    let store = injected_store(&factory, "repository");
    assert!(is_a::<DiskStore>(&store));
}

#[test]
fn test_simple_resolver_ignores_qualifiers() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    factory.set_autowire_candidate_resolver(Arc::new(SimpleAutowireCandidateResolver));
    register_stores(&factory);
    factory.register_class(repository_class(Some("durable")));
    factory
        .register_bean_definition("memory", BeanDefinition::of_class("MemoryStore"))
        .unwrap();
    factory
        .register_bean_definition(
            "disk",
            BeanDefinition::of_class("DiskStore").with_qualifier("durable"),
        )
        .unwrap();
    factory
        .register_bean_definition("repository", by_type("Repository"))
        .unwrap();

    // 类型匹配的两个候选都有效且没有 primary，可选属性保持未设置
    let repository = factory.get_bean_as::<Repository>("repository").unwrap();
    assert!(repository.store.is_none());
}

#[test]
fn test_ambiguous_type_lookup_fails() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    register_stores(&factory);
    factory
        .register_bean_definition("memory", BeanDefinition::of_class("MemoryStore"))
        .unwrap();
    factory
        .register_bean_definition("disk", BeanDefinition::of_class("DiskStore"))
        .unwrap();

    let err = factory.get_bean_of_type(&TypeInfo::of::<dyn Store>()).unwrap_err();
    match err {
        BeanError::NoUniqueBeanDefinition { candidates, .. } => {
            assert_eq!(candidates, vec!["memory", "disk"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        factory.get_bean_of_type(&TypeInfo::of::<Repository>()),
        Err(BeanError::NoSuchBeanOfType { .. })
    ));
}

fn register_two_stores(factory: &DefaultBeanFactory) {
    register_stores(factory);
    factory
        .register_bean_definition("memory", BeanDefinition::of_class("MemoryStore"))
        .unwrap();
    factory
        .register_bean_definition("disk", BeanDefinition::of_class("DiskStore"))
        .unwrap();
}

#[test]
fn test_required_property_with_ambiguous_candidates_fails() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    register_two_stores(&factory);
    factory.register_class(
        BeanClass::with_default::<Repository>("Repository")
            .property(PropertyDescriptor::bean::<dyn Store>("store").required()),
    );
    factory
        .register_bean_definition("repository", by_type("Repository"))
        .unwrap();

    match factory.get_bean("repository").err() {
        Some(BeanError::NoUniqueBeanDefinition { candidates, .. }) => {
            assert_eq!(candidates, vec!["memory", "disk"]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(factory.stats().creation_failures, 1);
}

#[test]
fn test_optional_property_with_ambiguous_candidates_stays_unset() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    register_two_stores(&factory);
    factory.register_class(repository_class(None));
    factory
        .register_bean_definition("repository", by_type("Repository"))
        .unwrap();

    let repository = factory.get_bean_as::<Repository>("repository").unwrap();
    assert!(repository.store.is_none());
}

#[test]
fn test_by_name_uses_matching_definition() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    register_stores(&factory);
    factory.register_class(repository_class(None));
    factory
        .register_bean_definition("store", BeanDefinition::of_class("DiskStore"))
        .unwrap();
    factory
        .register_bean_definition("other", BeanDefinition::of_class("MemoryStore"))
        .unwrap();
    factory
        .register_bean_definition(
            "repository",
            BeanDefinition::of_class("Repository").with_autowire(AutowireMode::ByName),
        )
        .unwrap();

    let store = injected_store(&factory, "repository");
    assert!(is_a::<DiskStore>(&store));
}

#[test]
fn test_explicit_property_value_beats_autowiring() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    register_stores(&factory);
    factory.register_class(repository_class(None));
    factory
        .register_bean_definition("memory", BeanDefinition::of_class("MemoryStore"))
        .unwrap();
    factory
        .register_bean_definition("disk", BeanDefinition::of_class("DiskStore"))
        .unwrap();
    factory
        .register_bean_definition(
            "repository",
            by_type("Repository")
                .with_property("store", di_abstractions::PropertyValue::reference("memory")),
        )
        .unwrap();

    let store = injected_store(&factory, "repository");
    assert!(is_a::<MemoryStore>(&store));
}

#[test]
fn test_constructor_autowiring_picks_satisfiable_constructor() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    register_stores(&factory);
    factory.register_class(
        BeanClass::of::<Service>("Service").constructor(
            vec![ParameterDescriptor::bean::<dyn Store>("store")],
            |args| {
                let store = args[0]
                    .as_bean()
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("store 参数缺失"))?;
                Ok(Box::new(Service { store }))
            },
        ),
    );
    factory
        .register_bean_definition("service", BeanDefinition::of_class("Service"))
        .unwrap();

    // 没有候选时无法选择构造函数
    assert!(matches!(
        factory.get_bean("service"),
        Err(BeanError::InvalidBeanDefinition { .. })
    ));

    factory
        .register_bean_definition("memory", BeanDefinition::of_class("MemoryStore"))
        .unwrap();
    let service = factory.get_bean_as::<Service>("service").unwrap();
    assert!(Arc::ptr_eq(&service.store, &factory.get_bean("memory").unwrap()));
}
