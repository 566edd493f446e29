pub mod record;
pub mod resource;
pub mod utils;

// Re-export handler functions for use in routing
pub use record::delete;
pub use record::show;
pub use record::update;

pub use resource::create;
pub use resource::list;
