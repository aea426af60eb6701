pub mod apply;
pub mod destroy;
pub mod import;
pub mod list;
pub mod plan;
pub mod read;
pub mod schema;
