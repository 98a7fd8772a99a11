pub mod commands;
pub mod console;
pub mod logging;
pub mod presenter;
pub mod update_check;
