//! Call frame for the stack virtual machine.

use core_types::Value;

/// Saved caller state, pushed on `Call` and restored on `Return`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    /// Caller's function index
    pub function: usize,
    /// Caller's instruction pointer to resume at
    pub return_ip: usize,
    /// Caller's local variable slots
    pub locals: Vec<Value>,
}

impl CallFrame {
    /// Create a frame capturing the caller's position and locals.
    pub fn new(function: usize, return_ip: usize, locals: Vec<Value>) -> Self {
        Self {
            function,
            return_ip,
            locals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_frame_new() {
        let frame = CallFrame::new(2, 14, vec![Value::Number(1.0)]);
        assert_eq!(frame.function, 2);
        assert_eq!(frame.return_ip, 14);
        assert_eq!(frame.locals.len(), 1);
    }
}
