pub mod actions;
pub mod content_ref;
pub mod ids;
pub mod priority;
pub mod taxonomy;

pub use actions::*;
pub use content_ref::*;
pub use ids::*;
pub use priority::*;
pub use taxonomy::*;
