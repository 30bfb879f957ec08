mod collection;
mod status;
mod task;
pub mod timing;

pub use collection::TaskList;
pub use status::{Priority, TaskStatus, parse_priority, parse_status};
pub use task::Task;
