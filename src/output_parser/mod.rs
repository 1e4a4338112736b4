mod error;
pub use error::*;

mod parsed_step;
pub use parsed_step::*;

mod instructor;
pub use instructor::*;

mod react;
pub use react::*;

mod parse_helper;
pub use parse_helper::*;
