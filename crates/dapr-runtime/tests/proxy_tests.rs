mod common;

use anyhow::Result;
use common::{factory, Call, MockInvocationClient};
use dapr_client::ReturnHint;
use dapr_runtime::actor::generators::FileGenerator;
use dapr_runtime::{
    actor_interface, ActorProxy, GenerateProxy, HttpVerb, InterfaceDescriptor, MethodDescriptor,
    ProxyDefinition, ProxyError, ProxyMode, ReturnType, VerbHint,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn counter_interface() -> InterfaceDescriptor {
    InterfaceDescriptor::new("ICounter")
        .with_dapr_type("Counter")
        .with_method(MethodDescriptor::new("get_count").returning("int"))
        .with_method(
            MethodDescriptor::new("increment")
                .with_parameter("int")
                .returning("int"),
        )
        .with_method(
            MethodDescriptor::new("reset")
                .with_verb(VerbHint::Delete)
                .with_return_type(ReturnType::void()),
        )
        .with_method(MethodDescriptor::host_only("on_activation"))
}

actor_interface! {
    /// Remote counter used by the typed proxy tests
    pub interface Counter as "Counter" {
        get fn get_count() -> i64;
        call fn increment(by: i64) -> i64;
        delete fn reset();
        host fn on_activation();
    }
}

#[tokio::test]
async fn test_same_type_and_id_share_one_proxy() -> Result<()> {
    let client = MockInvocationClient::new();
    let proxies = ActorProxy::new(factory(ProxyMode::Dynamic, client.clone()));
    let interface = counter_interface();

    let first = proxies.get(&interface, "c1", None)?;
    let second = proxies.get(&interface, "c1", None)?;
    let other = proxies.get(&interface, "c2", None)?;

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(first.get_id(), "c1");
    assert_eq!(proxies.len(), 2);
    assert!(client.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_override_type_keys_separately() -> Result<()> {
    let client = MockInvocationClient::new();
    let proxies = ActorProxy::new(factory(ProxyMode::Dynamic, client.clone()));
    let interface = counter_interface();

    let declared = proxies.get(&interface, "c1", None)?;
    let overridden = proxies.get(&interface, "c1", Some("OtherCounter"))?;

    assert!(!Arc::ptr_eq(&declared, &overridden));
    assert_eq!(overridden.dapr_type(), "OtherCounter");
    Ok(())
}

#[tokio::test]
async fn test_missing_dapr_type_makes_no_call() {
    let client = MockInvocationClient::new();
    let proxies = ActorProxy::new(factory(ProxyMode::Dynamic, client.clone()));
    let interface =
        InterfaceDescriptor::new("IUntyped").with_method(MethodDescriptor::new("ping"));

    let result = proxies.get(&interface, "u1", None);

    assert!(matches!(
        result,
        Err(ProxyError::MissingDaprType { interface }) if interface == "IUntyped"
    ));
    assert!(proxies.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_verbs_follow_parameters_and_hints() -> Result<()> {
    let client = MockInvocationClient::new();
    client.returning("get_count", json!(5));
    client.returning("increment", json!(6));
    client.returning("reset", json!("ignored"));
    let proxies = ActorProxy::new(factory(ProxyMode::Generated, client.clone()));
    let counter = proxies.get(&counter_interface(), "c1", None)?;

    assert_eq!(counter.invoke("get_count", None).await?, json!(5));
    assert_eq!(counter.invoke("increment", Some(json!(1))).await?, json!(6));
    assert_eq!(counter.invoke("reset", None).await?, serde_json::Value::Null);

    let verbs: Vec<(HttpVerb, String, Option<serde_json::Value>)> = client
        .invocations()
        .into_iter()
        .map(|call| match call {
            Call::Invoke {
                verb,
                method,
                parameter,
                ..
            } => (verb, method, parameter),
            other => panic!("unexpected call {:?}", other),
        })
        .collect();
    assert_eq!(
        verbs,
        vec![
            (HttpVerb::Get, "get_count".to_string(), None),
            (HttpVerb::Post, "increment".to_string(), Some(json!(1))),
            (HttpVerb::Delete, "reset".to_string(), None),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_invocation_carries_actor_and_return_hint() -> Result<()> {
    let client = MockInvocationClient::new();
    let proxies = ActorProxy::new(factory(ProxyMode::Dynamic, client.clone()));
    let counter = proxies.get(&counter_interface(), "c9", None)?;

    counter.invoke("get_count", None).await?;

    match &client.invocations()[0] {
        Call::Invoke { actor, returns, .. } => {
            assert_eq!(actor.actor_type(), "Counter");
            assert_eq!(actor.actor_id(), "c9");
            assert_eq!(returns, &ReturnHint::Value("int".to_string()));
        }
        other => panic!("unexpected call {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_host_only_and_unknown_methods_make_no_call() -> Result<()> {
    let client = MockInvocationClient::new();
    let proxies = ActorProxy::new(factory(ProxyMode::Dynamic, client.clone()));
    let counter = proxies.get(&counter_interface(), "c1", None)?;

    let hook = counter.invoke("on_activation", None).await;
    assert!(matches!(
        hook,
        Err(ProxyError::NotActorContext { method }) if method == "on_activation"
    ));

    let unknown = counter.invoke("explode", None).await;
    assert!(matches!(
        unknown,
        Err(ProxyError::UnknownMethod { method }) if method == "explode"
    ));

    assert!(client.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_reference_parameter_fails_generation() {
    let client = MockInvocationClient::new();
    let proxies = ActorProxy::new(factory(ProxyMode::Generated, client.clone()));
    let interface = InterfaceDescriptor::new("IBuffer")
        .with_dapr_type("Buffer")
        .with_method(MethodDescriptor::new("fill").with_reference_parameter("Vec<u8>"));

    let result = proxies.get(&interface, "b1", None);

    assert!(matches!(
        result,
        Err(ProxyError::PassByReference { method }) if method == "fill"
    ));
    assert!(proxies.is_empty());
}

#[tokio::test]
async fn test_generated_mode_generates_once() -> Result<()> {
    let client = MockInvocationClient::new();
    let proxies = ActorProxy::new(factory(ProxyMode::Generated, client.clone()));
    let interface = counter_interface();

    for id in ["c1", "c2", "c3"] {
        proxies.get(&interface, id, None)?;
    }

    let definitions = proxies.factory().definitions();
    assert_eq!(definitions.generated_count(), 1);
    assert_eq!(definitions.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_cached_mode_generates_once_and_persists() -> Result<()> {
    let cache_dir = tempfile::tempdir()?;
    let client = MockInvocationClient::new();
    let proxies = ActorProxy::new(
        factory(ProxyMode::GeneratedCached, client.clone()).with_cache_dir(cache_dir.path()),
    );
    let interface = counter_interface();

    proxies.get(&interface, "c1", None)?;
    proxies.get(&interface, "c2", None)?;
    assert_eq!(proxies.factory().definitions().generated_count(), 1);

    let cached = cache_dir.path().join("ICounter.Counter.json");
    let persisted = ProxyDefinition::from_json(&std::fs::read_to_string(&cached)?)?;
    assert_eq!(persisted.interface, "ICounter");
    assert_eq!(persisted.dapr_type, "Counter");
    assert_eq!(persisted.methods.len(), 4);

    // A fresh registry over the same directory loads instead of generating.
    let restarted = ActorProxy::new(
        factory(ProxyMode::GeneratedCached, client.clone()).with_cache_dir(cache_dir.path()),
    );
    let counter = restarted.get(&interface, "c1", None)?;
    assert_eq!(restarted.factory().definitions().generated_count(), 0);
    assert_eq!(counter.definition().as_ref(), &persisted);
    Ok(())
}

#[tokio::test]
async fn test_existing_only_requires_a_definition() -> Result<()> {
    let client = MockInvocationClient::new();
    let proxies = ActorProxy::new(factory(ProxyMode::OnlyExisting, client.clone()));
    let interface = counter_interface();

    let missing = proxies.get(&interface, "c1", None);
    assert!(matches!(
        missing,
        Err(ProxyError::NoExistingProxy { interface, dapr_type })
            if interface == "ICounter" && dapr_type == "Counter"
    ));

    let rendered = FileGenerator::render(&interface, None)?;
    proxies
        .factory()
        .definitions()
        .register(ProxyDefinition::from_json(&rendered)?);

    let counter = proxies.get(&interface, "c1", None)?;
    counter.invoke("increment", Some(json!(2))).await?;
    assert_eq!(client.invocations().len(), 1);
    assert_eq!(proxies.factory().definitions().generated_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_existing_only_loads_from_cache_dir() -> Result<()> {
    let cache_dir = tempfile::tempdir()?;
    let client = MockInvocationClient::new();
    let interface = counter_interface();

    let warm = ActorProxy::new(
        factory(ProxyMode::GeneratedCached, client.clone()).with_cache_dir(cache_dir.path()),
    );
    warm.get(&interface, "c1", None)?;

    let existing = ActorProxy::new(
        factory(ProxyMode::OnlyExisting, client.clone()).with_cache_dir(cache_dir.path()),
    );
    let counter = existing.get(&interface, "c1", None)?;
    assert_eq!(counter.dapr_type(), "Counter");
    Ok(())
}

#[tokio::test]
async fn test_existing_only_refuses_to_generate() {
    let client = MockInvocationClient::new();
    let generator = factory(ProxyMode::OnlyExisting, client.clone())
        .get_generator(Arc::new(counter_interface()), "Counter");

    assert!(matches!(
        generator.generate_method(&MethodDescriptor::new("get_count")),
        Err(ProxyError::GenerationRefused { method }) if method == "get_count"
    ));
    assert!(matches!(
        generator.generate_definition(),
        Err(ProxyError::GenerationRefused { .. })
    ));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_colliding_cache_file_is_treated_as_stale() -> Result<()> {
    let cache_dir = tempfile::tempdir()?;
    let client = MockInvocationClient::new();
    let scoped = InterfaceDescriptor::new("app::ICounter")
        .with_dapr_type("Counter")
        .with_method(MethodDescriptor::new("get_count").returning("int"));
    let flat = InterfaceDescriptor::new("app__ICounter")
        .with_dapr_type("Counter")
        .with_method(MethodDescriptor::new("ping"));

    let warm = ActorProxy::new(
        factory(ProxyMode::GeneratedCached, client.clone()).with_cache_dir(cache_dir.path()),
    );
    warm.get(&scoped, "c1", None)?;

    let existing = ActorProxy::new(
        factory(ProxyMode::OnlyExisting, client.clone()).with_cache_dir(cache_dir.path()),
    );
    assert!(matches!(
        existing.get(&flat, "c1", None),
        Err(ProxyError::NoExistingProxy { interface, .. }) if interface == "app__ICounter"
    ));
    assert!(existing.factory().definitions().is_empty());

    let cached = ActorProxy::new(
        factory(ProxyMode::GeneratedCached, client.clone()).with_cache_dir(cache_dir.path()),
    );
    let proxy = cached.get(&flat, "c1", None)?;
    assert_eq!(proxy.definition().interface, "app__ICounter");
    assert!(proxy.definition().entry("ping").is_some());
    assert_eq!(cached.factory().definitions().generated_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_render_uses_override_type() -> Result<()> {
    let rendered = FileGenerator::render(&counter_interface(), Some("Renamed"))?;
    let definition = ProxyDefinition::from_json(&rendered)?;
    assert_eq!(definition.dapr_type, "Renamed");

    let untyped = InterfaceDescriptor::new("IUntyped");
    assert!(matches!(
        FileGenerator::render(&untyped, None),
        Err(ProxyError::MissingDaprType { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_typed_proxy_from_macro() -> Result<()> {
    let client = MockInvocationClient::new();
    client.returning("get_count", json!(41));
    client.returning("increment", json!(42));
    let proxies = ActorProxy::new(factory(ProxyMode::Generated, client.clone()));

    let counter: Counter = proxies.get_typed("c1", None)?;
    assert_eq!(counter.get_id(), "c1");
    assert_eq!(counter.get_count().await?, 41);
    assert_eq!(counter.increment(1).await?, 42);
    counter.reset().await?;
    assert!(matches!(
        counter.on_activation().await,
        Err(ProxyError::NotActorContext { .. })
    ));

    let same: Counter = proxies.get_typed("c1", None)?;
    assert!(Arc::ptr_eq(counter.instance(), same.instance()));

    let methods: Vec<(HttpVerb, String)> = client
        .invocations()
        .into_iter()
        .filter_map(|call| match call {
            Call::Invoke { verb, method, .. } => Some((verb, method)),
            _ => None,
        })
        .collect();
    assert_eq!(
        methods,
        vec![
            (HttpVerb::Get, "get_count".to_string()),
            (HttpVerb::Post, "increment".to_string()),
            (HttpVerb::Delete, "reset".to_string()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_parameter_for_parameterless_method_is_dropped() -> Result<()> {
    let client = MockInvocationClient::new();
    let proxies = ActorProxy::new(factory(ProxyMode::Dynamic, client.clone()));
    let counter = proxies.get(&counter_interface(), "c1", None)?;

    counter.invoke("get_count", Some(json!("extra"))).await?;

    match &client.invocations()[0] {
        Call::Invoke { parameter, .. } => assert_eq!(parameter, &None),
        other => panic!("unexpected call {:?}", other),
    }
    Ok(())
}
