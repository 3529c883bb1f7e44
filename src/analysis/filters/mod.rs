pub mod fold;
pub mod plural;
pub mod stopword;
pub mod length;
