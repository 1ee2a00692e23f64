pub mod fields;
pub mod timezone;
pub mod util;
