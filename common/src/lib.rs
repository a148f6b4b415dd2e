pub mod asm;
pub mod constants;
pub mod program;
