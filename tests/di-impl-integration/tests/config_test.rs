//! 配置文件加载与容器配置生效

mod common;

use common::{init_test_logger, journal, widget_class};
use di_abstractions::{BeanClassRegistry, BeanDefinition, BeanDefinitionRegistry, BeanFactory};
use di_impl::{ContainerConfigLoader, DefaultBeanFactory};
use std::io::Write;

#[test]
fn test_loaded_config_drives_container_behaviour() -> anyhow::Result<()> {
    init_test_logger();
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    write!(
        file,
        r#"{{"allow_bean_definition_overriding": true, "inferred_destroy_methods": ["dispose"]}}"#
    )?;

    let config = ContainerConfigLoader::new()
        .with_file(file.path())
        .with_env_prefix("IOC_INTEGRATION_JSON")
        .load()?;
    assert!(config.allow_bean_definition_overriding);
    assert_eq!(config.max_resolution_depth, 100);

    let log = journal();
    let factory = DefaultBeanFactory::with_config(config);
    factory.register_class(widget_class(&log));
    factory.register_bean_definition("widget", BeanDefinition::of_class("Widget"))?;
    // 允许覆盖
    factory.register_bean_definition(
        "widget",
        BeanDefinition::of_class("Widget")
            .with_property("label", di_abstractions::PropertyValue::literal("w"))
            .infer_destroy_method(),
    )?;
    factory.get_bean("widget")?;

    let report = factory.destroy_singletons();
    assert!(report.is_clean());
    assert_eq!(*log.lock(), vec!["w:dispose"]);
    Ok(())
}

#[test]
fn test_yaml_file_is_supported() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
    writeln!(file, "allow_alias_overriding: false\nmax_resolution_depth: 5")?;

    let config = ContainerConfigLoader::new()
        .with_file(file.path())
        .with_env_prefix("IOC_INTEGRATION_YAML")
        .load()?;
    assert!(!config.allow_alias_overriding);
    assert_eq!(config.max_resolution_depth, 5);
    Ok(())
}

#[test]
fn test_malformed_file_is_configuration_error() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "max_resolution_depth = \"deep\"")?;

    let err = ContainerConfigLoader::new()
        .with_file(file.path())
        .with_env_prefix("IOC_INTEGRATION_BAD")
        .load()
        .unwrap_err();
    assert!(matches!(err, infrastructure_common::BeanError::Configuration { .. }));
    Ok(())
}
