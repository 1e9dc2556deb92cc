pub mod name;
pub mod output;
pub mod problem;
pub mod record;
