//! Core assembler functionality: the line record, the binary image buffer,
//! the conditional-assembly stack, and the orchestrating `AssemblerCore`.

pub mod assembler;
pub mod binary;
pub mod conditional;
pub mod line_info;

pub use assembler::{AssemblerCore, AssemblyOutcome};
pub use binary::{BinaryBuffer, WriteFormat, WriteRecord};
pub use conditional::ConditionalStack;
pub use line_info::LineInfo;

/// Core assembler result type.
pub type CoreResult<T> = crate::error::AssemblyResult<T>;
