pub mod item_source;
pub mod parser;
pub mod portal;
