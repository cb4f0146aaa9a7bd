//! Property tests for loading and looking up service records.

use std::collections::BTreeSet;

use proptest::prelude::*;

use shipwright::config::ConfigStore;
use shipwright::ErrorKind;

fn service_names() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set("[a-z][a-z0-9-]{0,12}", 1..8)
}

fn document(names: &BTreeSet<String>) -> String {
    let mut doc = String::from("services:\n");
    for (i, name) in names.iter().enumerate() {
        doc.push_str(&format!(
            "  - name: \"{}\"\n    type: service\n    host: host-{}.internal\n    port: {}\n",
            name,
            i,
            8000 + i
        ));
    }
    doc
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every declared name is found with its own record.
    #[test]
    fn property_find_returns_declared_record(names in service_names()) {
        let store = ConfigStore::from_yaml_str("deployments.yml", &document(&names)).unwrap();
        prop_assert_eq!(store.services().len(), names.len());

        for (i, name) in names.iter().enumerate() {
            let service = store.find(name).unwrap();
            prop_assert_eq!(&service.name, name);
            let expected_host = format!("host-{}.internal", i);
            prop_assert_eq!(service.host.as_deref(), Some(expected_host.as_str()));
        }
    }

    /// PROPERTY: names absent from the document are NotFound.
    #[test]
    fn property_absent_name_is_not_found(
        names in service_names(),
        absent in "[a-z][a-z0-9-]{0,12}",
    ) {
        prop_assume!(!names.contains(&absent));
        let store = ConfigStore::from_yaml_str("deployments.yml", &document(&names)).unwrap();
        let err = store.find(&absent).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    /// PROPERTY: declaring any name twice is rejected at load time.
    #[test]
    fn property_duplicate_names_are_rejected(names in service_names()) {
        let mut doc = document(&names);
        let first = names.iter().next().unwrap();
        doc.push_str(&format!("  - name: \"{}\"\n    type: service\n    host: again\n", first));

        let err = ConfigStore::from_yaml_str("deployments.yml", &doc).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Config);
        prop_assert!(err.to_string().contains("duplicate"));
    }
}
