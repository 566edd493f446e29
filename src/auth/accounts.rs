use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::rbac::{Role, Session};

/// Explicit role store keyed by lowercase email.
#[derive(Debug, Clone, Default)]
pub struct RoleAssignments {
    roles: HashMap<String, Role>,
}

impl RoleAssignments {
    pub fn new(roles: HashMap<String, Role>) -> Self {
        let roles = roles
            .into_iter()
            .map(|(email, role)| (email.trim().to_ascii_lowercase(), role))
            .collect();
        Self { roles }
    }

    pub fn assign(&mut self, email: &str, role: Role) {
        self.roles.insert(email.trim().to_ascii_lowercase(), role);
    }

    pub fn role_for(&self, email: &str) -> Role {
        self.roles
            .get(&email.trim().to_ascii_lowercase())
            .copied()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Accounts known to this process, created on first sign-in.
#[derive(Debug, Clone)]
pub struct AccountDirectory {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    roles: RoleAssignments,
}

impl AccountDirectory {
    pub fn new(roles: RoleAssignments) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            roles,
        }
    }

    /// Resolve (or create) the account for `email` and build its session.
    ///
    /// The user id is stable across sign-ins; the role always comes from
    /// the assignment store.
    pub async fn sign_in(&self, email: &str, name: Option<&str>, avatar_url: Option<&str>) -> Session {
        let key = email.trim().to_ascii_lowercase();
        let mut accounts = self.accounts.write().await;

        let account = accounts.entry(key.clone()).or_insert_with(|| {
            tracing::info!("creating account for {}", key);
            Account {
                user_id: Uuid::new_v4(),
                email: key.clone(),
                name: default_name(&key),
                avatar_url: None,
            }
        });

        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            account.name = name.trim().to_string();
        }
        if let Some(url) = avatar_url {
            account.avatar_url = Some(url.to_string());
        }

        Session {
            user_id: account.user_id.to_string(),
            email: account.email.clone(),
            name: account.name.clone(),
            role: self.roles.role_for(&key),
            avatar_url: account.avatar_url.clone(),
        }
    }

    pub async fn find(&self, email: &str) -> Option<Account> {
        self.accounts
            .read()
            .await
            .get(&email.trim().to_ascii_lowercase())
            .cloned()
    }
}

fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
