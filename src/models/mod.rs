pub mod refill;
pub mod scan;
pub mod task;

pub use refill::RefillRecord;
pub use scan::ScanRecord;
pub use task::{Task, TaskList};
