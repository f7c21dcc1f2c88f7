pub mod commands;
pub mod machine;
pub mod model;
