pub mod cli;
pub mod portero;
