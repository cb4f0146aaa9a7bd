//! Property tests for the plan builder.

use std::collections::BTreeMap;

use proptest::prelude::*;

use shipwright::{PlanBuilder, SecretBundle, ServiceDefinition, ServiceType};

fn secrets() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map("[A-Z][A-Z0-9_]{0,10}", "sv-[a-zA-Z0-9]{8,16}", 0..6)
}

fn service() -> impl Strategy<Value = ServiceDefinition> {
    (
        "[a-z][a-z0-9-]{0,12}",
        proptest::option::of(1u16..=65535),
        any::<bool>(),
    )
        .prop_map(|(name, port, platform)| {
            if platform {
                ServiceDefinition::new(name, ServiceType::Platform)
                    .with_repository("https://git.example.com/acme/app.git")
                    .with_requires_secrets(true)
            } else {
                let svc = ServiceDefinition::new(name, ServiceType::Service)
                    .with_host("10.0.0.5")
                    .with_requires_secrets(true);
                match port {
                    Some(port) => svc.with_port(port),
                    None => svc,
                }
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: identical inputs give identical plans, byte for byte.
    #[test]
    fn property_build_is_pure(svc in service(), values in secrets()) {
        let builder = PlanBuilder::default();
        let bundle = SecretBundle::from_map(values);

        let first = builder.build(&svc, &bundle).unwrap();
        let second = builder.build(&svc, &bundle).unwrap();

        prop_assert_eq!(first.steps(), second.steps());
        prop_assert_eq!(first.fingerprint(), second.fingerprint());
    }

    /// PROPERTY: step descriptions never contain secret values.
    #[test]
    fn property_describe_masks_secrets(svc in service(), values in secrets()) {
        let bundle = SecretBundle::from_map(values.clone());
        let plan = PlanBuilder::default().build(&svc, &bundle).unwrap();

        for step in plan.steps() {
            let described = step.describe();
            for value in values.values() {
                prop_assert!(!described.contains(value.as_str()));
            }
        }
        prop_assert_eq!(plan.environment_keys().len(), values.len());
    }

    /// PROPERTY: the compose descriptor carries exactly the bundle.
    #[test]
    fn property_compose_environment_matches_bundle(
        name in "[a-z][a-z0-9-]{0,12}",
        values in secrets(),
    ) {
        let svc = ServiceDefinition::new(name.clone(), ServiceType::Service).with_host("h");
        let bundle = SecretBundle::from_map(values.clone());
        let plan = PlanBuilder::default().build(&svc, &bundle).unwrap();

        let path = format!("/opt/deployments/{}/docker-compose.yml", name);
        let compose = plan.file_content(std::path::Path::new(&path)).unwrap();
        let doc: serde_yaml_ng::Value = serde_yaml_ng::from_str(compose).unwrap();
        let env = doc["services"][name.as_str()]["environment"].as_mapping().unwrap();
        prop_assert_eq!(env.len(), values.len());
    }
}
