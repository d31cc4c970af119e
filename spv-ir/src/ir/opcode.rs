//! Opcodes
//!
//! Defines the opcodes of the supported instruction subset, with their
//! binary-format numeric values and fixed encoding properties.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction opcode (values match the binary format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum OpCode {
    Nop = 0,
    Undef = 1,

    // Types
    TypeVoid = 19,
    TypeBool = 20,
    TypeInt = 21,
    TypeFloat = 22,
    TypeVector = 23,
    TypePointer = 32,
    TypeFunction = 33,

    // Constants
    ConstantTrue = 41,
    ConstantFalse = 42,
    Constant = 43,

    // Functions
    Function = 54,
    FunctionParameter = 55,
    FunctionEnd = 56,
    FunctionCall = 57,

    // Memory
    Variable = 59,
    Load = 61,
    Store = 62,

    // Integer arithmetic
    IAdd = 128,
    ISub = 130,
    IMul = 132,
    UDiv = 134,
    SDiv = 135,

    // Integer comparison
    IEqual = 170,
    INotEqual = 171,
    UGreaterThan = 172,
    SGreaterThan = 173,
    ULessThan = 176,
    SLessThan = 177,

    // Control flow
    Label = 248,
    Branch = 249,
    BranchConditional = 250,
    Return = 253,
    ReturnValue = 254,
    Unreachable = 255,
}

impl OpCode {
    const ALL: [OpCode; 36] = [
        OpCode::Nop, OpCode::Undef,
        OpCode::TypeVoid, OpCode::TypeBool, OpCode::TypeInt, OpCode::TypeFloat,
        OpCode::TypeVector, OpCode::TypePointer, OpCode::TypeFunction,
        OpCode::ConstantTrue, OpCode::ConstantFalse, OpCode::Constant,
        OpCode::Function, OpCode::FunctionParameter, OpCode::FunctionEnd, OpCode::FunctionCall,
        OpCode::Variable, OpCode::Load, OpCode::Store,
        OpCode::IAdd, OpCode::ISub, OpCode::IMul, OpCode::UDiv, OpCode::SDiv,
        OpCode::IEqual, OpCode::INotEqual, OpCode::UGreaterThan, OpCode::SGreaterThan,
        OpCode::ULessThan, OpCode::SLessThan,
        OpCode::Label, OpCode::Branch, OpCode::BranchConditional,
        OpCode::Return, OpCode::ReturnValue, OpCode::Unreachable,
    ];

    /// Numeric value as encoded in the low half of the first word
    pub fn value(self) -> u16 {
        self as u16
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.value() == value)
    }

    pub fn name(self) -> &'static str {
        match self {
            OpCode::Nop => "OpNop",
            OpCode::Undef => "OpUndef",
            OpCode::TypeVoid => "OpTypeVoid",
            OpCode::TypeBool => "OpTypeBool",
            OpCode::TypeInt => "OpTypeInt",
            OpCode::TypeFloat => "OpTypeFloat",
            OpCode::TypeVector => "OpTypeVector",
            OpCode::TypePointer => "OpTypePointer",
            OpCode::TypeFunction => "OpTypeFunction",
            OpCode::ConstantTrue => "OpConstantTrue",
            OpCode::ConstantFalse => "OpConstantFalse",
            OpCode::Constant => "OpConstant",
            OpCode::Function => "OpFunction",
            OpCode::FunctionParameter => "OpFunctionParameter",
            OpCode::FunctionEnd => "OpFunctionEnd",
            OpCode::FunctionCall => "OpFunctionCall",
            OpCode::Variable => "OpVariable",
            OpCode::Load => "OpLoad",
            OpCode::Store => "OpStore",
            OpCode::IAdd => "OpIAdd",
            OpCode::ISub => "OpISub",
            OpCode::IMul => "OpIMul",
            OpCode::UDiv => "OpUDiv",
            OpCode::SDiv => "OpSDiv",
            OpCode::IEqual => "OpIEqual",
            OpCode::INotEqual => "OpINotEqual",
            OpCode::UGreaterThan => "OpUGreaterThan",
            OpCode::SGreaterThan => "OpSGreaterThan",
            OpCode::ULessThan => "OpULessThan",
            OpCode::SLessThan => "OpSLessThan",
            OpCode::Label => "OpLabel",
            OpCode::Branch => "OpBranch",
            OpCode::BranchConditional => "OpBranchConditional",
            OpCode::Return => "OpReturn",
            OpCode::ReturnValue => "OpReturnValue",
            OpCode::Unreachable => "OpUnreachable",
        }
    }

    /// Whether the encoding carries a result type word
    pub fn has_result_type(self) -> bool {
        matches!(
            self,
            OpCode::Undef
                | OpCode::ConstantTrue
                | OpCode::ConstantFalse
                | OpCode::Constant
                | OpCode::Function
                | OpCode::FunctionParameter
                | OpCode::FunctionCall
                | OpCode::Variable
                | OpCode::Load
        ) || self.is_binary()
    }

    /// Whether the encoding carries a result id word
    pub fn has_result_id(self) -> bool {
        self.has_result_type() || self.is_type() || self == OpCode::Label
    }

    /// Smallest legal word count, including the opcode/word-count word
    pub fn min_word_count(self) -> u32 {
        match self {
            OpCode::Nop
            | OpCode::FunctionEnd
            | OpCode::Return
            | OpCode::Unreachable => 1,
            OpCode::TypeVoid
            | OpCode::TypeBool
            | OpCode::Label
            | OpCode::Branch
            | OpCode::ReturnValue => 2,
            OpCode::Undef
            | OpCode::TypeFloat
            | OpCode::TypeFunction
            | OpCode::ConstantTrue
            | OpCode::ConstantFalse
            | OpCode::FunctionParameter
            | OpCode::Store => 3,
            OpCode::TypeInt
            | OpCode::TypeVector
            | OpCode::TypePointer
            | OpCode::Constant
            | OpCode::FunctionCall
            | OpCode::Variable
            | OpCode::Load
            | OpCode::BranchConditional => 4,
            OpCode::Function => 5,
            OpCode::IAdd
            | OpCode::ISub
            | OpCode::IMul
            | OpCode::UDiv
            | OpCode::SDiv
            | OpCode::IEqual
            | OpCode::INotEqual
            | OpCode::UGreaterThan
            | OpCode::SGreaterThan
            | OpCode::ULessThan
            | OpCode::SLessThan => 5,
        }
    }

    /// Whether trailing operands may extend the encoding past `min_word_count`
    pub fn is_variable_length(self) -> bool {
        matches!(
            self,
            OpCode::TypeFunction | OpCode::Constant | OpCode::FunctionCall | OpCode::Variable
        )
    }

    pub fn is_type(self) -> bool {
        matches!(
            self,
            OpCode::TypeVoid
                | OpCode::TypeBool
                | OpCode::TypeInt
                | OpCode::TypeFloat
                | OpCode::TypeVector
                | OpCode::TypePointer
                | OpCode::TypeFunction
        )
    }

    pub fn is_constant(self) -> bool {
        matches!(self, OpCode::ConstantTrue | OpCode::ConstantFalse | OpCode::Constant)
    }

    pub fn is_binary(self) -> bool {
        BinaryOp::from_op_code(self).is_some()
    }

    /// Block terminators
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            OpCode::Branch
                | OpCode::BranchConditional
                | OpCode::Return
                | OpCode::ReturnValue
                | OpCode::Unreachable
        )
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Two-operand integer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    IAdd, ISub, IMul,
    UDiv, SDiv,

    // Comparison (result is bool)
    IEqual, INotEqual,
    UGreaterThan, SGreaterThan,
    ULessThan, SLessThan,
}

impl BinaryOp {
    pub fn op_code(self) -> OpCode {
        match self {
            BinaryOp::IAdd => OpCode::IAdd,
            BinaryOp::ISub => OpCode::ISub,
            BinaryOp::IMul => OpCode::IMul,
            BinaryOp::UDiv => OpCode::UDiv,
            BinaryOp::SDiv => OpCode::SDiv,
            BinaryOp::IEqual => OpCode::IEqual,
            BinaryOp::INotEqual => OpCode::INotEqual,
            BinaryOp::UGreaterThan => OpCode::UGreaterThan,
            BinaryOp::SGreaterThan => OpCode::SGreaterThan,
            BinaryOp::ULessThan => OpCode::ULessThan,
            BinaryOp::SLessThan => OpCode::SLessThan,
        }
    }

    pub fn from_op_code(op_code: OpCode) -> Option<Self> {
        let op = match op_code {
            OpCode::IAdd => BinaryOp::IAdd,
            OpCode::ISub => BinaryOp::ISub,
            OpCode::IMul => BinaryOp::IMul,
            OpCode::UDiv => BinaryOp::UDiv,
            OpCode::SDiv => BinaryOp::SDiv,
            OpCode::IEqual => BinaryOp::IEqual,
            OpCode::INotEqual => BinaryOp::INotEqual,
            OpCode::UGreaterThan => BinaryOp::UGreaterThan,
            OpCode::SGreaterThan => BinaryOp::SGreaterThan,
            OpCode::ULessThan => BinaryOp::ULessThan,
            OpCode::SLessThan => BinaryOp::SLessThan,
            _ => return None,
        };
        Some(op)
    }

    pub fn is_comparison(self) -> bool {
        !matches!(
            self,
            BinaryOp::IAdd | BinaryOp::ISub | BinaryOp::IMul | BinaryOp::UDiv | BinaryOp::SDiv
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op_code())
    }
}
