//! IPPcode23 loader: XML listing → [`Program`].
//!
//! The loader checks the document shape, decodes every argument literal,
//! orders instructions by their `order` attribute and builds the label
//! table. Operand counts are left to the VM, which checks them at dispatch.
//!
//! # Usage
//!
//! ```
//! use ippcode_loader::load;
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <program language="IPPcode23">
//!   <instruction order="2" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>
//!   <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
//! </program>"#;
//!
//! let program = load(xml).unwrap();
//! assert_eq!(program.len(), 2);
//! assert_eq!(program.instructions[0].to_string(), "DEFVAR GF@x");
//! ```

pub mod error;

mod literal;
mod parser;

pub use error::LoadError;

use ippcode_common::Program;
use tracing::debug;

/// Load a program from XML text.
///
/// Returns the first error encountered.
pub fn load(text: &str) -> Result<Program, LoadError> {
    let document =
        roxmltree::Document::parse(text).map_err(|e| LoadError::Xml(e.to_string()))?;
    let instructions = parser::parse_program(document.root_element())?;
    let program = Program::new(instructions)?;

    debug!(
        instructions = program.len(),
        labels = program.label_count(),
        "program loaded"
    );
    Ok(program)
}

/// Load a program from raw bytes, which must be UTF-8.
pub fn load_bytes(bytes: &[u8]) -> Result<Program, LoadError> {
    let text = std::str::from_utf8(bytes).map_err(|_| LoadError::NotUtf8)?;
    load(text)
}
