// BlueStack Instruction Set

/// What kind of operand token follows an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    /// Next whitespace-delimited token: stack name or integer literal
    Word,
    /// Label name
    Label,
    /// Text taken from between double quotes
    Text,
}

/// Operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Stack management
    InitStack,    // Create a named stack
    CurrentStack, // Select a stack by name
    Copy,         // Copy top of named stack onto current
    DeleteStack,  // Remove a named stack
    Flush,        // Empty the current stack

    // Values
    Push, // Push integer literal
    Pop,  // Discard top
    Swap, // Exchange top two
    Dup,  // Duplicate top
    Dup2, // Duplicate top two: [b, a] -> [b, a, b, a]

    // Arithmetic, second-popped on the left
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Console
    Print, // Write text with \n and \t escapes
    Top,   // Write top value and a newline
    Read,  // Read integer from input
    Dump,  // Write every stack

    // Control flow
    Jump,           // Unconditional
    JumpIfZero,     // JUMP.=0
    JumpIfPositive, // JUMP.>0
    JumpIfNegative, // JUMP.<0
    Halt,
}

impl Opcode {
    pub const ALL: [Opcode; 24] = [
        Opcode::InitStack,
        Opcode::CurrentStack,
        Opcode::Copy,
        Opcode::DeleteStack,
        Opcode::Flush,
        Opcode::Push,
        Opcode::Pop,
        Opcode::Swap,
        Opcode::Dup,
        Opcode::Dup2,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Mod,
        Opcode::Print,
        Opcode::Top,
        Opcode::Read,
        Opcode::Dump,
        Opcode::Jump,
        Opcode::JumpIfZero,
        Opcode::JumpIfPositive,
        Opcode::JumpIfNegative,
        Opcode::Halt,
    ];

    /// Decode a mnemonic, case-sensitive
    pub fn from_mnemonic(token: &str) -> Option<Opcode> {
        let op = match token {
            "INITSTACK" => Opcode::InitStack,
            "CURRENTSTACK" => Opcode::CurrentStack,
            "COPY" => Opcode::Copy,
            "DELETESTACK" => Opcode::DeleteStack,
            "FLUSH" => Opcode::Flush,
            "PUSH" => Opcode::Push,
            "POP" => Opcode::Pop,
            "SWAP" => Opcode::Swap,
            "DUP" => Opcode::Dup,
            "DUP2" => Opcode::Dup2,
            "ADD" => Opcode::Add,
            "SUB" => Opcode::Sub,
            "MUL" => Opcode::Mul,
            "DIV" => Opcode::Div,
            "MOD" => Opcode::Mod,
            "PRINT" => Opcode::Print,
            "TOP" => Opcode::Top,
            "READ" => Opcode::Read,
            "DUMP" => Opcode::Dump,
            "JUMP" => Opcode::Jump,
            "JUMP.=0" => Opcode::JumpIfZero,
            "JUMP.>0" => Opcode::JumpIfPositive,
            "JUMP.<0" => Opcode::JumpIfNegative,
            "HALT" => Opcode::Halt,
            _ => return None,
        };
        Some(op)
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::InitStack => "INITSTACK",
            Opcode::CurrentStack => "CURRENTSTACK",
            Opcode::Copy => "COPY",
            Opcode::DeleteStack => "DELETESTACK",
            Opcode::Flush => "FLUSH",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Swap => "SWAP",
            Opcode::Dup => "DUP",
            Opcode::Dup2 => "DUP2",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Print => "PRINT",
            Opcode::Top => "TOP",
            Opcode::Read => "READ",
            Opcode::Dump => "DUMP",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfZero => "JUMP.=0",
            Opcode::JumpIfPositive => "JUMP.>0",
            Opcode::JumpIfNegative => "JUMP.<0",
            Opcode::Halt => "HALT",
        }
    }

    pub fn operand_kind(&self) -> OperandKind {
        match self {
            Opcode::InitStack
            | Opcode::CurrentStack
            | Opcode::Copy
            | Opcode::DeleteStack
            | Opcode::Push => OperandKind::Word,

            Opcode::Jump
            | Opcode::JumpIfZero
            | Opcode::JumpIfPositive
            | Opcode::JumpIfNegative => OperandKind::Label,

            Opcode::Print => OperandKind::Text,

            _ => OperandKind::None,
        }
    }

    /// Number of operand tokens following this opcode in a program
    pub fn operand_count(&self) -> usize {
        match self.operand_kind() {
            OperandKind::None => 0,
            _ => 1,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonics_round_trip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
        }
    }

    #[test]
    fn test_mnemonics_are_case_sensitive() {
        assert_eq!(Opcode::from_mnemonic("push"), None);
        assert_eq!(Opcode::from_mnemonic("JUMP.=1"), None);
    }

    #[test]
    fn test_arity_table() {
        assert_eq!(Opcode::Push.operand_count(), 1);
        assert_eq!(Opcode::Print.operand_kind(), OperandKind::Text);
        assert_eq!(Opcode::JumpIfNegative.operand_kind(), OperandKind::Label);
        assert_eq!(Opcode::Dup2.operand_count(), 0);
        assert_eq!(Opcode::Halt.operand_count(), 0);
    }
}
