//! Frame manager: the global frame, the local frame stack and the
//! temporary frame.
//!
//! A variable slot is either absent (not declared), declared but unset
//! (`None`), or holds a value (`Some`).

use std::collections::BTreeMap;
use std::fmt;

use ippcode_common::{FrameKind, Value, Variable};
use thiserror::Error;

/// Variable name → slot. Ordered so BREAK dumps are stable.
pub type Frame = BTreeMap<String, Option<Value>>;

/// Frame manager failures, without instruction position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The referenced frame role has no current instance.
    #[error("{0} frame does not exist")]
    Missing(FrameKind),

    /// The name is not declared in the referenced frame.
    #[error("variable {0} is not declared")]
    Undeclared(Variable),

    /// DEFVAR of a name already present in the frame.
    #[error("variable {0} is already declared")]
    Redeclared(Variable),

    /// The variable is declared but holds no value.
    #[error("variable {0} has no value")]
    Unset(Variable),
}

/// All frames visible to one program run.
#[derive(Debug, Default)]
pub struct Frames {
    global: Frame,
    locals: Vec<Frame>,
    temporary: Option<Frame>,
}

impl Frames {
    /// An empty global frame, no local frames, no temporary frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending temporary frame with a fresh empty one.
    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// Move the temporary frame onto the local stack, leaving no temporary frame.
    pub fn push_temporary_to_local(&mut self) -> Result<(), FrameError> {
        let frame = self
            .temporary
            .take()
            .ok_or(FrameError::Missing(FrameKind::Temporary))?;
        self.locals.push(frame);
        Ok(())
    }

    /// Pop the top local frame into the temporary slot.
    pub fn pop_local_to_temporary(&mut self) -> Result<(), FrameError> {
        let frame = self
            .locals
            .pop()
            .ok_or(FrameError::Missing(FrameKind::Local))?;
        self.temporary = Some(frame);
        Ok(())
    }

    /// Declare `var` as an unset slot in its frame.
    pub fn declare(&mut self, var: &Variable) -> Result<(), FrameError> {
        let frame = self.frame_mut(var.frame)?;
        if frame.contains_key(&var.name) {
            return Err(FrameError::Redeclared(var.clone()));
        }
        frame.insert(var.name.clone(), None);
        Ok(())
    }

    /// The slot of a declared variable: `None` if it is still unset.
    pub fn slot(&self, var: &Variable) -> Result<Option<&Value>, FrameError> {
        self.frame(var.frame)?
            .get(&var.name)
            .map(Option::as_ref)
            .ok_or_else(|| FrameError::Undeclared(var.clone()))
    }

    /// The value of a declared, assigned variable.
    pub fn read(&self, var: &Variable) -> Result<&Value, FrameError> {
        self.slot(var)?
            .ok_or_else(|| FrameError::Unset(var.clone()))
    }

    /// Assign a value to a declared variable.
    pub fn write(&mut self, var: &Variable, value: Value) -> Result<(), FrameError> {
        debug_assert!(value.is_storable(), "descriptor stored in {var}");
        let slot = self
            .frame_mut(var.frame)?
            .get_mut(&var.name)
            .ok_or_else(|| FrameError::Undeclared(var.clone()))?;
        *slot = Some(value);
        Ok(())
    }

    /// Number of frames on the local stack.
    pub fn local_depth(&self) -> usize {
        self.locals.len()
    }

    /// Whether a temporary frame currently exists.
    pub fn has_temporary(&self) -> bool {
        self.temporary.is_some()
    }

    fn frame(&self, kind: FrameKind) -> Result<&Frame, FrameError> {
        match kind {
            FrameKind::Global => Some(&self.global),
            FrameKind::Local => self.locals.last(),
            FrameKind::Temporary => self.temporary.as_ref(),
        }
        .ok_or(FrameError::Missing(kind))
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, FrameError> {
        match kind {
            FrameKind::Global => Some(&mut self.global),
            FrameKind::Local => self.locals.last_mut(),
            FrameKind::Temporary => self.temporary.as_mut(),
        }
        .ok_or(FrameError::Missing(kind))
    }
}

/// One line per frame; local frames are listed top first as `LF[0]`, `LF[1]`, ...
impl fmt::Display for Frames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_frame(f, "GF", &self.global)?;
        if self.locals.is_empty() {
            writeln!(f, "LF: <undefined>")?;
        }
        for (depth, frame) in self.locals.iter().rev().enumerate() {
            write_frame(f, &format!("LF[{depth}]"), frame)?;
        }
        match &self.temporary {
            Some(frame) => write_frame(f, "TF", frame),
            None => writeln!(f, "TF: <undefined>"),
        }
    }
}

fn write_frame(f: &mut fmt::Formatter<'_>, label: &str, frame: &Frame) -> fmt::Result {
    write!(f, "{label}:")?;
    if frame.is_empty() {
        write!(f, " <empty>")?;
    }
    for (name, slot) in frame {
        match slot {
            Some(value) => write!(f, " {name}={value}")?,
            None => write!(f, " {name}=<unset>")?,
        }
    }
    writeln!(f)
}
