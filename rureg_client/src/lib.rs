pub mod console;
pub mod gateway;
