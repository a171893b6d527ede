pub mod schema;
pub mod transform;
