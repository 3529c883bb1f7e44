pub mod value;
pub mod state;
pub mod list_diff;
pub mod equality;
pub mod copy;
pub mod diff;
pub mod apply;
pub mod json;
