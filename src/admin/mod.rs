// admin/mod.rs - route shell: session -> guard -> registry -> page

use crate::rbac::{guard, visible_items, GuardDecision, NavigationItem, Session, SessionState};
use crate::resources::{AdminCatalog, AdminRoute, RegistryError, ResourceDescriptor};

pub const SIGN_IN_PATH: &str = "/auth/signin";

/// What the shell shows for a navigation.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteView<'a> {
    /// Session still resolving.
    Loading,
    RedirectToSignIn { location: String },
    AccessDenied { message: String },
    NotFound { path: String },
    Page {
        session: Session,
        route: &'a AdminRoute,
        navigation: Vec<NavigationItem>,
        resource: Option<&'a ResourceDescriptor>,
    },
}

/// Validated catalog plus navigation logic. Built once at startup.
#[derive(Debug, Clone)]
pub struct AdminShell {
    catalog: AdminCatalog,
}

impl AdminShell {
    pub fn new(catalog: AdminCatalog) -> Self {
        Self { catalog }
    }

    pub fn builtin() -> Result<Self, RegistryError> {
        AdminCatalog::builtin().map(Self::new)
    }

    pub fn catalog(&self) -> &AdminCatalog {
        &self.catalog
    }

    /// Evaluate a navigation. Re-run on every session or path change.
    pub fn navigate(&self, state: &SessionState, path: &str) -> RouteView<'_> {
        let Some(route) = self.catalog.route(path) else {
            return RouteView::NotFound { path: path.to_string() };
        };

        match guard(state, route.required_role) {
            GuardDecision::Pending => RouteView::Loading,
            GuardDecision::Unauthenticated => RouteView::RedirectToSignIn {
                location: sign_in_location(&route.path),
            },
            GuardDecision::Forbidden { required, .. } => RouteView::AccessDenied {
                message: format!("Access denied: {} requires the {} role", route.title, required),
            },
            GuardDecision::Granted(session) => {
                let navigation = visible_items(&self.catalog.navigation, session.role);
                // references were validated when the catalog was built
                let resource = route
                    .resource
                    .as_deref()
                    .and_then(|name| self.catalog.registry.get(name).ok());
                RouteView::Page {
                    session,
                    route,
                    navigation,
                    resource,
                }
            }
        }
    }
}

fn sign_in_location(return_to: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
    format!("{}?callbackUrl={}", SIGN_IN_PATH, encoded)
}
