use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::descriptor::ResourceDescriptor;
use super::registry::{RegistryError, ResourceRegistry};
use crate::rbac::{NavigationItem, Role};

/// Catalog shipped with the binary.
const DEFAULT_CATALOG: &str = include_str!("../../config/admin.yaml");

/// A page of the admin shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRoute {
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub required_role: Role,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    resources: Vec<ResourceDescriptor>,
    #[serde(default)]
    navigation: Vec<NavigationItem>,
    #[serde(default)]
    routes: Vec<AdminRoute>,
}

/// Validated static configuration: registry, navigation and routes.
#[derive(Debug, Clone)]
pub struct AdminCatalog {
    pub registry: ResourceRegistry,
    pub navigation: Vec<NavigationItem>,
    pub routes: Vec<AdminRoute>,
}

impl AdminCatalog {
    /// The embedded catalog. Fails on any misconfiguration.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_yaml(DEFAULT_CATALOG)
    }

    pub fn from_yaml(source: &str) -> Result<Self, RegistryError> {
        let file: CatalogFile =
            serde_yaml::from_str(source).map_err(|e| RegistryError::Catalog(e.to_string()))?;
        Self::new(file.resources, file.navigation, file.routes)
    }

    pub fn new(
        resources: Vec<ResourceDescriptor>,
        navigation: Vec<NavigationItem>,
        routes: Vec<AdminRoute>,
    ) -> Result<Self, RegistryError> {
        let registry = ResourceRegistry::new(resources)?;

        let mut seen = HashSet::new();
        for route in &routes {
            if !seen.insert(route.path.as_str()) {
                return Err(RegistryError::DuplicateRoute(route.path.clone()));
            }
        }

        registry.validate_references(
            routes
                .iter()
                .filter_map(|r| r.resource.as_deref().map(|res| (r.path.as_str(), res))),
        )?;

        Ok(Self {
            registry,
            navigation,
            routes,
        })
    }

    pub fn route(&self, path: &str) -> Option<&AdminRoute> {
        let path = path.trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };
        self.routes.iter().find(|r| r.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::FieldType;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = AdminCatalog::builtin().expect("embedded catalog must be valid");
        let courses = catalog.registry.get("courses").unwrap();
        assert_eq!(courses.access_role(), Role::Operator);
        let title = courses.field("title").unwrap();
        assert!(title.required);
        assert_eq!(title.field_type, FieldType::Text);
        assert_eq!(catalog.registry.get("users").unwrap().access_role(), Role::Admin);
        assert!(catalog.route("/admin/users/").is_some());
    }

    #[test]
    fn route_with_unknown_resource_fails_fast() {
        let yaml = r#"
resources:
  - { name: users, endpoint: users, list_columns: [], form_fields: [] }
routes:
  - { path: /admin/grades, title: Grades, resource: grades }
"#;
        assert_eq!(
            AdminCatalog::from_yaml(yaml).unwrap_err(),
            RegistryError::UnknownRouteResource {
                route: "/admin/grades".into(),
                resource: "grades".into()
            }
        );
    }

    #[test]
    fn duplicate_resource_in_yaml_is_rejected() {
        let yaml = r#"
resources:
  - { name: users, endpoint: users, list_columns: [], form_fields: [] }
  - { name: users, endpoint: people, list_columns: [], form_fields: [] }
"#;
        assert_eq!(
            AdminCatalog::from_yaml(yaml).unwrap_err(),
            RegistryError::Duplicate("users".into())
        );
    }

    #[test]
    fn shared_endpoint_in_yaml_is_rejected() {
        let yaml = r#"
resources:
  - { name: staff, endpoint: users, list_columns: [], form_fields: [] }
  - { name: users, endpoint: users, required_role: admin, list_columns: [], form_fields: [] }
"#;
        assert_eq!(
            AdminCatalog::from_yaml(yaml).unwrap_err(),
            RegistryError::DuplicateEndpoint("users".into())
        );
    }

    #[test]
    fn malformed_yaml_is_a_catalog_error() {
        let err = AdminCatalog::from_yaml("resources: [ { name: 1").unwrap_err();
        assert!(matches!(err, RegistryError::Catalog(_)));
    }
}
