pub mod chat;
pub mod config_dialog;
