pub mod batch;
pub mod epub;
pub mod error;
pub mod relink;
