pub mod compare;
pub mod evaluate;
pub mod init;
pub mod rules;
pub mod run;
pub mod validate;
