// handlers/projects - /projects resource
//
// Every handler takes the resolved `Caller` and passes its id to the
// project service explicitly; identity never comes from the body or query.

pub mod collection;
pub mod content;
pub mod record;
pub mod utils;

// Re-export handler functions for use in routing
pub use collection::get as projects_get;
pub use collection::post as projects_post;

pub use record::get as project_get;
pub use record::put as project_put;
pub use record::delete as project_delete;

pub use content::get as project_content_get;
