pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryProjectRepository;
pub use models::{Project, ProjectStatus};
pub use repository::{PgProjectRepository, ProjectRepository};
