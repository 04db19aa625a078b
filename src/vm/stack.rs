// BlueStack Stack Manager
// Bounded collection of named integer stacks with a current-stack selector

use crate::config::Limits;
use crate::error::{VmError, VmResult};

pub const MAIN_STACK: &str = "main";
pub const DEFAULT_STACK: &str = "default";

/// A named LIFO of integers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    name: String,
    values: Vec<i32>,
}

impl Stack {
    fn new(name: String) -> Self {
        Self {
            name,
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values bottom to top
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn top(&self) -> Option<i32> {
        self.values.last().copied()
    }
}

#[derive(Debug, Clone)]
pub struct StackManager {
    stacks: Vec<Stack>,
    current: usize,
    limits: Limits,
}

impl StackManager {
    /// A manager holding one empty `main` stack, selected
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        let mut stacks = Vec::with_capacity(limits.max_stacks);
        stacks.push(Stack::new(truncate_name(MAIN_STACK, limits.max_stack_name)));
        Self {
            stacks,
            current: 0,
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Append an empty stack; the selector does not move
    pub fn create(&mut self, name: &str) -> VmResult<usize> {
        if self.stacks.len() >= self.limits.max_stacks {
            return Err(VmError::capacity_exceeded("Maximum number of stacks reached"));
        }
        self.stacks
            .push(Stack::new(truncate_name(name, self.limits.max_stack_name)));
        Ok(self.stacks.len() - 1)
    }

    /// First stack with this name in collection order
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        let name = truncate_name(name, self.limits.max_stack_name);
        self.stacks.iter().position(|s| s.name == name)
    }

    pub fn select(&mut self, index: usize) -> VmResult<()> {
        if index >= self.stacks.len() {
            return Err(VmError::invalid_index("Invalid stack index"));
        }
        self.current = index;
        Ok(())
    }

    pub fn push(&mut self, value: i32) -> VmResult<()> {
        let capacity = self.limits.stack_capacity;
        let stack = self.current_stack_mut();
        if stack.values.len() >= capacity {
            return Err(VmError::stack_overflow(&stack.name));
        }
        stack.values.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> VmResult<i32> {
        let stack = self.current_stack_mut();
        match stack.values.pop() {
            Some(value) => Ok(value),
            None => Err(VmError::stack_underflow(format!(
                "Stack underflow on stack {}",
                stack.name
            ))),
        }
    }

    pub fn peek(&self) -> VmResult<i32> {
        let stack = self.current_stack();
        stack
            .top()
            .ok_or_else(|| VmError::stack_underflow(format!("Stack {} is empty", stack.name)))
    }

    /// Push a copy of `from`'s top value onto `to`. The source is left as is.
    pub fn copy(&mut self, from: usize, to: usize) -> VmResult<()> {
        if from >= self.stacks.len() || to >= self.stacks.len() {
            return Err(VmError::invalid_index("Invalid stack index for copy operation"));
        }
        let value = self.stacks[from].top().ok_or_else(VmError::empty_source)?;

        let selected = self.current;
        self.current = to;
        let pushed = self.push(value);
        self.current = selected;
        pushed
    }

    /// Remove a stack, shifting later ones down, and keep the selector valid
    pub fn delete(&mut self, index: usize) -> VmResult<()> {
        if index >= self.stacks.len() {
            return Err(VmError::invalid_index("Invalid stack index for deletion"));
        }
        self.stacks.remove(index);

        // Selector at or past the removed slot moves back one, clamped at 0
        if self.current >= index {
            self.current = self.current.saturating_sub(1);
        }
        if self.stacks.is_empty() {
            self.current = self.create(DEFAULT_STACK)?;
        }
        Ok(())
    }

    pub fn clear_current(&mut self) {
        self.current_stack_mut().values.clear();
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_stack(&self) -> &Stack {
        &self.stacks[self.current]
    }

    fn current_stack_mut(&mut self) -> &mut Stack {
        &mut self.stacks[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&Stack> {
        self.stacks.get(index)
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}

impl Default for StackManager {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_name(name: &str, max_chars: usize) -> String {
    name.chars().take(max_chars).collect()
}
