//! Reusable deployments documents.

/// One remote service needing secrets, one without, one platform stack
pub const MIXED_DEPLOYMENTS: &str = r#"services:
  - name: billing
    type: service
    host: 10.0.0.5
    port: 8080
    requires_secrets: true
  - name: web
    type: service
    host: web.internal
    port: 80
  - name: stack
    type: platform
    repository: https://github.com/acme/stack.git
    compose_file: docker-compose.prod.yml
"#;

/// Platform whose repository cannot be cloned
pub const BROKEN_PLATFORM: &str = r#"services:
  - name: stack
    type: platform
    repository: /nonexistent/shipwright-test/stack.git
"#;

/// Record missing its type
pub const MISSING_TYPE: &str = r#"services:
  - name: billing
    host: 10.0.0.5
"#;
