pub mod parsers;
pub mod portal;
