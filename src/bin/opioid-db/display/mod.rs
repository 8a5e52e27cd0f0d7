mod content;
mod error;
mod pages;
mod text;

pub use error::print_error;
pub use pages::{print_detail, print_home, print_properties, print_sdf_status};
