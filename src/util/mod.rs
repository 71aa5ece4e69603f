//! Utility functions shared by the format parsers and converters.
//!
//! - **Text**: pre-passes that repair documents before tokenizing
//! - **Dates**: heuristic normalization of feed timestamps
//! - **Addresses**: splitting "Name <email>" style author strings

mod address;
mod date;
mod text;

pub use address::parse_name_address;
pub use date::{parse_date, DateError};
pub use text::{escape_unescaped_markup, strip_invalid_xml_chars};

pub(crate) use date::parse_date_field;
