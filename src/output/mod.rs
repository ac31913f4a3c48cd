//! Terminal presentation: styled output, tables and prompts.

pub mod prompt;
pub mod table;
pub mod terminal;
