//! XML tree → instructions in execution order.
//!
//! Element and attribute checks follow the listing format: a `program`
//! root holding `instruction` elements, each holding up to three `argN`
//! elements.

use roxmltree::Node;

use crate::error::LoadError;
use crate::literal::parse_argument;
use ippcode_common::{Argument, Instruction, Opcode};

const LANGUAGE: &str = "IPPcode23";
const ROOT_ATTRIBUTES: [&str; 3] = ["language", "name", "description"];
const MAX_ARGUMENTS: usize = 3;

/// Parse the document element into instructions sorted by `order`.
pub(crate) fn parse_program(root: Node<'_, '_>) -> Result<Vec<Instruction>, LoadError> {
    if root.tag_name().name() != "program" {
        return Err(LoadError::UnexpectedRoot(root.tag_name().name().to_string()));
    }
    check_root_attributes(root)?;

    let elements: Vec<Node<'_, '_>> = root.children().filter(Node::is_element).collect();
    let count = elements.len();

    // slot[order - 1]
    let mut slots: Vec<Option<Instruction>> = vec![None; count];
    for element in elements {
        let (order, instr) = parse_instruction(element)?;
        let slot = usize::try_from(order)
            .ok()
            .and_then(|o| slots.get_mut(o - 1))
            .ok_or(LoadError::OrderOutOfRange { order, count })?;
        if slot.is_some() {
            return Err(LoadError::DuplicateOrder(order));
        }
        *slot = Some(instr);
    }

    // Orders are unique and within 1..=count, so every slot is filled.
    Ok(slots.into_iter().flatten().collect())
}

fn check_root_attributes(root: Node<'_, '_>) -> Result<(), LoadError> {
    let language = root
        .attribute("language")
        .ok_or(LoadError::MissingLanguage)?;
    if language != LANGUAGE {
        return Err(LoadError::WrongLanguage(language.to_string()));
    }
    if let Some(extra) = root
        .attributes()
        .find(|attr| !ROOT_ATTRIBUTES.contains(&attr.name()))
    {
        return Err(LoadError::UnexpectedAttribute(extra.name().to_string()));
    }
    Ok(())
}

/// Parse one `instruction` element, returning its `order` and the instruction.
fn parse_instruction(element: Node<'_, '_>) -> Result<(u64, Instruction), LoadError> {
    if element.tag_name().name() != "instruction" {
        return Err(LoadError::UnexpectedElement {
            parent: "program".to_string(),
            name: element.tag_name().name().to_string(),
        });
    }

    let order_text = element
        .attribute("order")
        .ok_or(LoadError::MissingAttribute {
            element: "instruction",
            attribute: "order",
        })?;
    let mnemonic = element
        .attribute("opcode")
        .ok_or(LoadError::MissingAttribute {
            element: "instruction",
            attribute: "opcode",
        })?;
    let order = parse_order(order_text)?;

    let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| LoadError::UnknownOpcode {
        order,
        opcode: mnemonic.to_string(),
    })?;
    let args = parse_arguments(element, order)?;

    Ok((order, Instruction::new(opcode, args)))
}

/// A positive decimal integer, digits only.
fn parse_order(text: &str) -> Result<u64, LoadError> {
    let invalid = || LoadError::InvalidOrder(text.to_string());
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match text.parse::<u64>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(order) => Ok(order),
    }
}

fn parse_arguments(element: Node<'_, '_>, order: u64) -> Result<Vec<Argument>, LoadError> {
    let children: Vec<Node<'_, '_>> = element.children().filter(Node::is_element).collect();
    if children.len() > MAX_ARGUMENTS {
        return Err(LoadError::TooManyArguments {
            order,
            found: children.len(),
        });
    }

    let mut slots: [Option<Argument>; MAX_ARGUMENTS] = [None, None, None];
    for child in &children {
        let position = argument_position(child.tag_name().name()).ok_or_else(|| {
            LoadError::UnexpectedElement {
                parent: "instruction".to_string(),
                name: child.tag_name().name().to_string(),
            }
        })?;
        if slots[position - 1].is_some() {
            return Err(LoadError::DuplicateArgument { order, position });
        }

        let kind = child.attribute("type").ok_or(LoadError::MissingAttribute {
            element: "arg",
            attribute: "type",
        })?;
        let text = child.text().unwrap_or("").trim();
        slots[position - 1] = Some(parse_argument(order, kind, text)?);
    }

    // Positions must be exactly 1..=n.
    let count = children.len();
    let mut args = Vec::with_capacity(count);
    for (index, slot) in slots.into_iter().take(count).enumerate() {
        let arg = slot.ok_or(LoadError::MissingArgument {
            order,
            position: index + 1,
        })?;
        args.push(arg);
    }
    Ok(args)
}

/// `arg1` → 1, `arg2` → 2, `arg3` → 3.
fn argument_position(tag: &str) -> Option<usize> {
    match tag {
        "arg1" => Some(1),
        "arg2" => Some(2),
        "arg3" => Some(3),
        _ => None,
    }
}
