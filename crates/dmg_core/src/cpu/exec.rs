//! Instruction handlers for the unprefixed opcode table.
//!
//! Each handler decodes its operand fields from the opcode byte, performs
//! the operation, leaves PC on the next instruction (or a branch target)
//! and returns the T-cycles it took.

mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;
