pub mod json_parser;
pub mod xml_parser;
pub mod yaml_parser;
