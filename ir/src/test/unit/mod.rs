pub mod substitute;
pub mod var;
