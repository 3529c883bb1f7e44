pub mod clock;
pub mod results;
pub mod cursor;
