mod extract_text;
pub use extract_text::*;

mod fix;
pub use fix::*;

mod json;
pub use json::*;
