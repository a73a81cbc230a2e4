pub mod compare;
pub mod evaluate;
pub mod generate;
pub mod init;
pub mod list_models;
pub mod output;
pub mod validate;
