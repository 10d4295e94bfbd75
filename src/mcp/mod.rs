pub mod fetch;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod stdio;
