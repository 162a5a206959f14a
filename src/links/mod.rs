pub mod generator;
pub mod parser;

pub use generator::{LinkGenerator, LinkRequest, Region, generate_utm_link, get_base_url};
pub use parser::{UtmParameters, is_valid_utm_link, is_valid_utm_link_for, parse_utm_parameters};
