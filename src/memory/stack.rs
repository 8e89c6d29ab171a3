//! Call stack implementation
//!
//! This module provides the call stack for guest execution:
//! - [`Stack`]: The call stack containing frames; frame 0 is the module frame
//!   whose locals are the program's globals
//! - [`StackFrame`]: One activation record (module, function call, or class body)
//!
//! # Binding Order
//!
//! Frames keep their bindings in an [`FxHashMap`] for lookup plus a separate
//! insertion-order list, so that the variables shown at each step appear in
//! the order the program first bound them.

use super::value::{Function, Value};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// What a frame is executing
#[derive(Debug, Clone)]
pub enum FrameKind {
    Module,
    Function(Rc<Function>),
    ClassBody,
}

/// Stack frame for a module, function call or class body
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub name: String,
    pub kind: FrameKind,
    locals: FxHashMap<String, Value>,
    insertion_order: Vec<String>,
}

impl StackFrame {
    pub fn new(name: impl Into<String>, kind: FrameKind) -> Self {
        StackFrame {
            name: name.into(),
            kind,
            locals: FxHashMap::default(),
            insertion_order: Vec::new(),
        }
    }

    /// Bind or rebind a name; rebinding keeps its original position
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.locals.get_mut(name) {
            *slot = value;
        } else {
            self.insertion_order.push(name.to_string());
            self.locals.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locals.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let removed = self.locals.remove(name)?;
        if let Some(pos) = self.insertion_order.iter().position(|n| n == name) {
            self.insertion_order.remove(pos);
        }
        Some(removed)
    }

    /// Bindings in first-bound order
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.locals.get(name).map(|v| (name.as_str(), v)))
    }

    /// Consume the frame, yielding its bindings in first-bound order
    pub fn into_bindings(mut self) -> Vec<(String, Value)> {
        let order = std::mem::take(&mut self.insertion_order);
        order
            .into_iter()
            .filter_map(|name| self.locals.remove(&name).map(|v| (name, v)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    /// Whether this frame declared `name` as global
    pub fn declares_global(&self, name: &str) -> bool {
        match &self.kind {
            FrameKind::Function(function) => function.global_names.contains(name),
            _ => false,
        }
    }

    /// Whether `name` is local to this function's body
    pub fn is_local_name(&self, name: &str) -> bool {
        match &self.kind {
            FrameKind::Function(function) => function.local_names.contains(name),
            _ => false,
        }
    }
}

/// The call stack
#[derive(Debug, Clone)]
pub struct Stack {
    frames: Vec<StackFrame>,
}

impl Stack {
    /// A stack holding only the module frame
    pub fn new() -> Self {
        Stack {
            frames: vec![StackFrame::new("<module>", FrameKind::Module)],
        }
    }

    pub fn push_frame(&mut self, frame: StackFrame) {
        self.frames.push(frame);
    }

    /// Pop the top frame; the module frame is never popped
    pub fn pop_frame(&mut self) -> Option<StackFrame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    pub fn current_frame(&self) -> &StackFrame {
        self.frames.last().unwrap_or(&self.frames[0])
    }

    pub fn current_frame_mut(&mut self) -> &mut StackFrame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    pub fn globals(&self) -> &StackFrame {
        &self.frames[0]
    }

    pub fn globals_mut(&mut self) -> &mut StackFrame {
        &mut self.frames[0]
    }

    /// Get all frames (for UI display)
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_keep_first_bound_order() {
        let mut frame = StackFrame::new("<module>", FrameKind::Module);
        frame.set("b", Value::Int(1));
        frame.set("a", Value::Int(2));
        frame.set("b", Value::Int(3));
        let names: Vec<&str> = frame.bindings().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(frame.get("b").and_then(Value::as_int), Some(3));
    }

    #[test]
    fn test_remove_drops_from_order() {
        let mut frame = StackFrame::new("<module>", FrameKind::Module);
        frame.set("x", Value::Int(1));
        frame.set("y", Value::Int(2));
        assert!(frame.remove("x").is_some());
        assert!(frame.remove("x").is_none());
        frame.set("x", Value::Int(3));
        let names: Vec<&str> = frame.bindings().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["y", "x"]);
    }

    #[test]
    fn test_module_frame_is_never_popped() {
        let mut stack = Stack::new();
        stack.push_frame(StackFrame::new("f", FrameKind::ClassBody));
        assert_eq!(stack.depth(), 2);
        assert!(stack.pop_frame().is_some());
        assert!(stack.pop_frame().is_none());
        assert_eq!(stack.current_frame().name, "<module>");
    }
}
