pub mod draft;
pub mod standings;
