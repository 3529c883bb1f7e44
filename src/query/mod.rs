pub mod ast;
pub mod nxql;
pub mod tri;
pub mod like;
pub mod compare;
pub mod resolver;
pub mod evaluator;
pub mod sql;
pub mod prefix;
pub mod optimizer;
