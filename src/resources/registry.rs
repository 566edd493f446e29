use std::collections::HashMap;
use thiserror::Error;

use super::descriptor::ResourceDescriptor;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no resource registered under '{0}'")]
    NotFound(String),

    #[error("resource '{0}' is registered more than once")]
    Duplicate(String),

    #[error("endpoint '{0}' is served by more than one resource")]
    DuplicateEndpoint(String),

    #[error("route '{route}' references unknown resource '{resource}'")]
    UnknownRouteResource { route: String, resource: String },

    #[error("route '{0}' is declared more than once")]
    DuplicateRoute(String),

    #[error("invalid admin catalog: {0}")]
    Catalog(String),
}

/// Immutable lookup table from resource name to descriptor.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    descriptors: Vec<ResourceDescriptor>,
    index: HashMap<String, usize>,
    endpoints: HashMap<String, usize>,
}

impl ResourceRegistry {
    /// Build the registry, rejecting duplicate names and shared endpoints.
    pub fn new(descriptors: Vec<ResourceDescriptor>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(descriptors.len());
        let mut endpoints = HashMap::with_capacity(descriptors.len());
        for (position, descriptor) in descriptors.iter().enumerate() {
            if index.insert(descriptor.name.clone(), position).is_some() {
                return Err(RegistryError::Duplicate(descriptor.name.clone()));
            }
            if endpoints.insert(descriptor.endpoint.clone(), position).is_some() {
                return Err(RegistryError::DuplicateEndpoint(descriptor.endpoint.clone()));
            }
        }
        Ok(Self {
            descriptors,
            index,
            endpoints,
        })
    }

    pub fn get(&self, name: &str) -> Result<&ResourceDescriptor, RegistryError> {
        self.index
            .get(name)
            .map(|&position| &self.descriptors[position])
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Descriptor served at `endpoint`, as used in backend routes.
    pub fn by_endpoint(&self, endpoint: &str) -> Result<&ResourceDescriptor, RegistryError> {
        self.endpoints
            .get(endpoint)
            .map(|&position| &self.descriptors[position])
            .ok_or_else(|| RegistryError::NotFound(endpoint.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Check that every `(route, resource)` reference resolves.
    pub fn validate_references<'a>(
        &self,
        references: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<(), RegistryError> {
        for (route, resource) in references {
            if !self.contains(resource) {
                return Err(RegistryError::UnknownRouteResource {
                    route: route.to_string(),
                    resource: resource.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> ResourceDescriptor {
        ResourceDescriptor {
            name: name.to_string(),
            endpoint: name.to_string(),
            title: None,
            icon: None,
            list_columns: vec![],
            form_fields: vec![],
            required_role: None,
        }
    }

    #[test]
    fn looks_up_registered_descriptor() {
        let registry = ResourceRegistry::new(vec![descriptor("users"), descriptor("courses")]).unwrap();
        assert_eq!(registry.get("courses").unwrap().endpoint, "courses");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_name_is_not_found() {
        let registry = ResourceRegistry::new(vec![descriptor("users")]).unwrap();
        assert_eq!(
            registry.get("lessons").unwrap_err(),
            RegistryError::NotFound("lessons".into())
        );
    }

    #[test]
    fn duplicate_names_are_rejected_at_load() {
        let err = ResourceRegistry::new(vec![descriptor("users"), descriptor("users")]).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("users".into()));
    }

    #[test]
    fn shared_endpoint_is_rejected_at_load() {
        let mut staff = descriptor("staff");
        staff.endpoint = "users".into();
        let err = ResourceRegistry::new(vec![staff, descriptor("users")]).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateEndpoint("users".into()));
    }

    #[test]
    fn endpoint_lookup_uses_the_endpoint_not_the_name() {
        let mut people = descriptor("people");
        people.endpoint = "users".into();
        let registry = ResourceRegistry::new(vec![people, descriptor("courses")]).unwrap();
        assert_eq!(registry.by_endpoint("users").unwrap().name, "people");
        assert_eq!(
            registry.by_endpoint("people").unwrap_err(),
            RegistryError::NotFound("people".into())
        );
    }

    #[test]
    fn dangling_route_reference_fails_validation() {
        let registry = ResourceRegistry::new(vec![descriptor("users")]).unwrap();
        assert!(registry.validate_references([("/users", "users")]).is_ok());
        assert_eq!(
            registry
                .validate_references([("/users", "users"), ("/grades", "grades")])
                .unwrap_err(),
            RegistryError::UnknownRouteResource {
                route: "/grades".into(),
                resource: "grades".into()
            }
        );
    }

    #[test]
    fn iterates_in_registration_order() {
        let registry =
            ResourceRegistry::new(vec![descriptor("b"), descriptor("a"), descriptor("c")]).unwrap();
        let names: Vec<_> = registry.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }
}
