use serde::{Deserialize, Serialize};

use crate::rbac::Role;

/// Declarative description of a CRUD-manageable entity type.
///
/// Carries no rendering types: icons are referenced by name and cell
/// formatting by a [`CellFormat`] hint, both resolved by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    pub endpoint: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    pub list_columns: Vec<ColumnDef>,
    pub form_fields: Vec<FormField>,
    #[serde(default)]
    pub required_role: Option<Role>,
}

impl ResourceDescriptor {
    /// Role needed to see or mutate this resource; `user` when unspecified.
    pub fn access_role(&self) -> Role {
        self.required_role.unwrap_or_default()
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.form_fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub format: Option<CellFormat>,
}

/// Presentation hint for a list cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    Raw,
    Date,
    Boolean,
    Badge,
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Number,
    Textarea,
    Select,
    Checkbox,
}
