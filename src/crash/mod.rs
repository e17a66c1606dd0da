//! Built-in crash text parser and obfuscation mappings.

pub mod mappings;
pub mod parser;
pub mod patterns;

pub use mappings::{MappingDeobfuscator, MappingTable};
pub use parser::TextCrashParser;
