use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::role::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationItem {
    pub name: String,
    pub href: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub allowed_roles: BTreeSet<Role>,
}

impl NavigationItem {
    /// Admins see every item; everyone else only items listing their role.
    pub fn is_visible_to(&self, role: Role) -> bool {
        role == Role::Admin || self.allowed_roles.contains(&role)
    }
}

/// Items visible to `role`, in declaration order.
pub fn visible_items(items: &[NavigationItem], role: Role) -> Vec<NavigationItem> {
    items
        .iter()
        .filter(|item| item.is_visible_to(role))
        .cloned()
        .collect()
}
