// renderer/mod.rs - headless list/form pages driven by the resource registry

pub mod cells;
pub mod form;
pub mod page;
pub mod table;

pub use cells::{label_with_icon, ColumnRenderers, IconSet, TextIcons};
pub use form::{validate_form, FormErrors};
pub use page::{render_records, Completion, PageAction, PageError, PageOptions, PageState, ResourcePage};
pub use table::text_table;
