pub mod logs;
pub mod motor;
pub mod response;
