pub const MEM_SIZE: usize = 256; // Bytes

// The stack grows down from here, leaving the top of memory reserved.
pub const STACK_START: u8 = 0xf4;
