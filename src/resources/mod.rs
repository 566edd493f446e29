// resources/mod.rs - declarative resource registry and the admin catalog

pub mod catalog;
pub mod descriptor;
pub mod registry;

pub use catalog::{AdminCatalog, AdminRoute};
pub use descriptor::{CellFormat, ColumnDef, FieldType, FormField, ResourceDescriptor};
pub use registry::{RegistryError, ResourceRegistry};
