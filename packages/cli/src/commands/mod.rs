pub mod edit;
pub mod init;
pub mod list;
pub mod query;

pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use list::{list, ListArgs};
pub use query::{query, QueryArgs};
