//! Tools the TODO agent exposes to the model.

mod add_todo;
mod list_todo;
mod search;
mod update_todo;

pub use add_todo::{AddTodoParameters, AddTodoTool};
pub use list_todo::{ListTodoParameters, ListTodoTool};
pub use search::{SearchParameters, SearchResult, SearchTool};
pub use update_todo::{UpdateTodoParameters, UpdateTodoTool};
