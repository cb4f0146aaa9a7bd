//! Artefact rendering
//!
//! Pure functions turning a service and its secrets into file contents.
//! Output is deterministic: maps are ordered and nothing depends on time.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::entities::{SecretBundle, ServiceDefinition};

/// Compose format version written into descriptors
pub const COMPOSE_VERSION: &str = "3.8";

/// Restart policy for single-container services
pub const RESTART_POLICY: &str = "always";

#[derive(Serialize)]
struct ComposeDocument<'a> {
    version: &'static str,
    services: BTreeMap<&'a str, ComposeService<'a>>,
}

#[derive(Serialize)]
struct ComposeService<'a> {
    image: String,
    container_name: &'a str,
    restart: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ports: Vec<String>,
    environment: &'a BTreeMap<String, String>,
}

/// Render the compose descriptor for a `service`-type deployment
///
/// The port is published as `port:port`; secrets become the container
/// environment (an empty mapping when the bundle is empty).
pub fn render_compose(
    service: &ServiceDefinition,
    secrets: &SecretBundle,
    image_namespace: &str,
) -> Result<String, serde_yaml_ng::Error> {
    let ports = service
        .port
        .map(|port| vec![format!("{}:{}", port, port)])
        .unwrap_or_default();

    let mut services = BTreeMap::new();
    services.insert(
        service.name.as_str(),
        ComposeService {
            image: service.image_reference(image_namespace),
            container_name: &service.name,
            restart: RESTART_POLICY,
            ports,
            environment: secrets.as_map(),
        },
    );

    serde_yaml_ng::to_string(&ComposeDocument {
        version: COMPOSE_VERSION,
        services,
    })
}

/// Render secrets as a dotenv file, one `KEY=VALUE` per line, sorted by key
pub fn render_env_file(secrets: &SecretBundle) -> String {
    let mut out = String::new();
    for (key, value) in secrets.iter() {
        out.push_str(key);
        out.push('=');
        out.push_str(&quote_env_value(value));
        out.push('\n');
    }
    out
}

fn quote_env_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$' | '`'));
    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '$' => quoted.push_str("\\$"),
            '`' => quoted.push_str("\\`"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ServiceType;

    fn api() -> ServiceDefinition {
        ServiceDefinition::new("api", ServiceType::Service)
            .with_host("10.0.0.5")
            .with_port(8080)
    }

    fn parse(yaml: &str) -> serde_yaml_ng::Value {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn compose_has_ports_restart_and_environment() {
        let secrets: SecretBundle = [("API_KEY", "abc")].into_iter().collect();
        let yaml = render_compose(&api(), &secrets, "your-org").unwrap();
        let doc = parse(&yaml);

        let svc = &doc["services"]["api"];
        assert_eq!(doc["version"].as_str(), Some("3.8"));
        assert_eq!(svc["image"].as_str(), Some("your-org/api:latest"));
        assert_eq!(svc["container_name"].as_str(), Some("api"));
        assert_eq!(svc["restart"].as_str(), Some("always"));
        assert_eq!(svc["ports"][0].as_str(), Some("8080:8080"));
        assert_eq!(svc["environment"]["API_KEY"].as_str(), Some("abc"));
    }

    #[test]
    fn compose_with_empty_bundle_has_empty_environment() {
        let yaml = render_compose(&api(), &SecretBundle::empty(), "your-org").unwrap();
        let doc = parse(&yaml);
        let env = doc["services"]["api"]["environment"].as_mapping().unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn compose_without_port_omits_ports() {
        let svc = ServiceDefinition::new("worker", ServiceType::Service).with_host("h");
        let yaml = render_compose(&svc, &SecretBundle::empty(), "acme").unwrap();
        let doc = parse(&yaml);
        assert!(doc["services"]["worker"].get("ports").is_none());
    }

    #[test]
    fn env_file_is_sorted_and_quoted() {
        let secrets: SecretBundle = [
            ("TOKEN", "plain"),
            ("GREETING", "hello world"),
            ("DATABASE_URL", "postgres://u:p@db:5432/app"),
            ("PRICE", "$5 \"net\""),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            render_env_file(&secrets),
            "DATABASE_URL=postgres://u:p@db:5432/app\n\
             GREETING=\"hello world\"\n\
             PRICE=\"\\$5 \\\"net\\\"\"\n\
             TOKEN=plain\n"
        );
    }

    #[test]
    fn env_file_for_empty_bundle_is_empty() {
        assert_eq!(render_env_file(&SecretBundle::empty()), "");
    }
}
