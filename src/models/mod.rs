pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskChanges, TaskInput, TaskQuery, TaskStatus, TaskUpdateInput};
pub use user::{User, UserResponse};
