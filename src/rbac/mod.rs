// rbac/mod.rs - role hierarchy, access guard and role-filtered navigation

pub mod guard;
pub mod navigation;
pub mod role;

pub use guard::{guard, GuardDecision, Session, SessionState};
pub use navigation::{visible_items, NavigationItem};
pub use role::{is_allowed, Role, UnknownRole};
