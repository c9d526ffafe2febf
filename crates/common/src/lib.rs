//! IPPcode23 common types.
//!
//! This crate provides the data structures shared by the loader, the VM
//! and the CLI:
//!
//! - [`Opcode`]: the closed set of 35 operations
//! - [`TypeTag`]: dynamic types of storable values
//! - [`Value`]: tagged runtime values and the comparison rules
//! - [`Instruction`] / [`Argument`] / [`Variable`]: operands and instructions
//! - [`Program`]: instructions in execution order plus the label table
//! - [`ErrorKind`]: the failure taxonomy and its exit codes

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod type_tag;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::{ErrorKind, ProgramError};
pub use instruction::{Argument, FrameKind, Instruction, Variable};
pub use opcode::Opcode;
pub use program::Program;
pub use type_tag::TypeTag;
pub use value::Value;

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::cmp::Ordering;

    /// Strategy that generates a random storable value.
    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(Value::Int),
            any::<bool>().prop_map(Value::Bool),
            "[a-z0-9 ]{0,8}".prop_map(Value::Str),
            Just(Value::Nil),
        ]
    }

    proptest! {
        /// EQ with exactly one nil operand is always false.
        #[test]
        fn nil_never_equals_non_nil(v in arb_value()) {
            prop_assume!(v != Value::Nil);
            prop_assert_eq!(Value::Nil.equals(&v), Some(false));
            prop_assert_eq!(v.equals(&Value::Nil), Some(false));
        }

        /// Every storable value equals itself.
        #[test]
        fn equals_is_reflexive(v in arb_value()) {
            prop_assert_eq!(v.equals(&v), Some(true));
        }

        /// Integer ordering agrees with numeric ordering.
        #[test]
        fn int_compare_matches_numeric(a in any::<i64>(), b in any::<i64>()) {
            prop_assert_eq!(Value::Int(a).compare(&Value::Int(b)), Some(a.cmp(&b)));
        }

        /// Strings without escapes render unchanged.
        #[test]
        fn plain_strings_render_verbatim(s in "[a-zA-Z0-9 #]{0,16}") {
            prop_assert_eq!(Value::Str(s.clone()).render(), s);
        }

        /// Each label maps to the index of its LABEL instruction.
        #[test]
        fn label_table_indexes(gaps in prop::collection::vec(0usize..4, 1..20)) {
            let mut instrs = Vec::new();
            let mut expected = Vec::new();
            for (n, gap) in gaps.iter().enumerate() {
                for _ in 0..*gap {
                    instrs.push(Instruction::new(Opcode::Break, vec![]));
                }
                expected.push((format!("l{n}"), instrs.len()));
                instrs.push(Instruction::new(
                    Opcode::Label,
                    vec![Argument::Const(Value::Label(format!("l{n}")))],
                ));
            }
            let program = Program::new(instrs).unwrap();
            for (name, index) in expected {
                prop_assert_eq!(program.label(&name), Some(index));
            }
        }

        /// compare() is antisymmetric wherever it is defined.
        #[test]
        fn compare_antisymmetric(a in arb_value(), b in arb_value()) {
            if let Some(ord) = a.compare(&b) {
                prop_assert_eq!(b.compare(&a), Some(ord.reverse()));
                prop_assert_eq!(a.equals(&b), Some(ord == Ordering::Equal));
            }
        }
    }
}
