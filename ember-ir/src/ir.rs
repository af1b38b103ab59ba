//! Virtual-register IR
//!
//! Operands and instructions of the textual IR. Every `Instruction` renders
//! as exactly one IR line through its `Display` impl; indentation is added by
//! the function renderer.

use ember_common::{LabelId, NumberType, RegisterId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// IR Value - represents operands and results of IR instructions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrValue {
    /// No value (statements, compare-and-jump)
    None,

    /// An SSA register holding a value of `ty`
    Register { id: RegisterId, ty: NumberType },

    /// A register holding the address of a stack slot of `ty`
    RegisterPointer { id: RegisterId, ty: NumberType },

    /// A branch target
    Label(LabelId),

    /// An immediate; `value` is already wrapped to `ty`
    Constant { value: i64, ty: NumberType },

    /// Address of a named global of `ty`
    GlobalPointer { name: String, ty: NumberType },
}

impl IrValue {
    pub fn register(id: RegisterId, ty: NumberType) -> Self {
        IrValue::Register { id, ty }
    }

    pub fn constant(value: i64, ty: NumberType) -> Self {
        IrValue::Constant {
            value: ty.wrap(value),
            ty,
        }
    }

    /// The number type carried by this value, if any
    pub fn number_type(&self) -> Option<NumberType> {
        match self {
            IrValue::Register { ty, .. }
            | IrValue::RegisterPointer { ty, .. }
            | IrValue::Constant { ty, .. }
            | IrValue::GlobalPointer { ty, .. } => Some(*ty),
            IrValue::None | IrValue::Label(_) => None,
        }
    }

    /// Check if this value is an address that can be stored through
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            IrValue::RegisterPointer { .. } | IrValue::GlobalPointer { .. }
        )
    }

    pub fn is_none(&self) -> bool {
        matches!(self, IrValue::None)
    }

    /// Short description used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            IrValue::None => "no value",
            IrValue::Register { .. } => "register",
            IrValue::RegisterPointer { .. } => "stack slot",
            IrValue::Label(_) => "label",
            IrValue::Constant { .. } => "constant",
            IrValue::GlobalPointer { .. } => "global",
        }
    }
}

impl fmt::Display for IrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrValue::None => Ok(()),
            IrValue::Register { id, .. } | IrValue::RegisterPointer { id, .. } => {
                write!(f, "%{}", id)
            }
            IrValue::Label(id) => write!(f, "%L{}", id),
            IrValue::Constant { value, ty: NumberType::Bool } => {
                write!(f, "{}", if *value != 0 { "true" } else { "false" })
            }
            IrValue::Constant { value, .. } => write!(f, "{}", value),
            IrValue::GlobalPointer { name, .. } => write!(f, "@{}", name),
        }
    }
}

/// Integer arithmetic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    /// IR mnemonic for operands of type `ty`
    pub fn mnemonic(&self, ty: NumberType) -> &'static str {
        match (self, ty.is_signed()) {
            (ArithmeticOp::Add, true) => "add nsw",
            (ArithmeticOp::Add, false) => "add",
            (ArithmeticOp::Sub, true) => "sub nsw",
            (ArithmeticOp::Sub, false) => "sub",
            (ArithmeticOp::Mul, true) => "mul nsw",
            (ArithmeticOp::Mul, false) => "mul",
            (ArithmeticOp::Div, true) => "sdiv",
            (ArithmeticOp::Div, false) => "udiv",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticOp::Add => write!(f, "add"),
            ArithmeticOp::Sub => write!(f, "sub"),
            ArithmeticOp::Mul => write!(f, "mul"),
            ArithmeticOp::Div => write!(f, "div"),
        }
    }
}

/// Integer comparisons producing an `i1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// `icmp` predicate for operands of type `ty`
    pub fn predicate(&self, ty: NumberType) -> &'static str {
        let signed = ty.is_signed();
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Lt if signed => "slt",
            CompareOp::Lt => "ult",
            CompareOp::Le if signed => "sle",
            CompareOp::Le => "ule",
            CompareOp::Gt if signed => "sgt",
            CompareOp::Gt => "ugt",
            CompareOp::Ge if signed => "sge",
            CompareOp::Ge => "uge",
        }
    }

    /// The comparison that holds exactly when this one fails
    pub fn negate(&self) -> CompareOp {
        match self {
            CompareOp::Eq => CompareOp::Ne,
            CompareOp::Ne => CompareOp::Eq,
            CompareOp::Lt => CompareOp::Ge,
            CompareOp::Le => CompareOp::Gt,
            CompareOp::Gt => CompareOp::Le,
            CompareOp::Ge => CompareOp::Lt,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        };
        write!(f, "{}", text)
    }
}

/// Boolean connectives over `i1` operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "and"),
            LogicalOp::Or => write!(f, "or"),
        }
    }
}

/// Width-changing conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversionOp {
    SignExtend,
    ZeroExtend,
    Truncate,
}

impl fmt::Display for ConversionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionOp::SignExtend => write!(f, "sext"),
            ConversionOp::ZeroExtend => write!(f, "zext"),
            ConversionOp::Truncate => write!(f, "trunc"),
        }
    }
}

/// Module-level string constants used by `printf`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatString {
    Signed,
    Unsigned,
    Text,
    True,
    False,
}

impl FormatString {
    pub const ALL: [FormatString; 5] = [
        FormatString::Signed,
        FormatString::Unsigned,
        FormatString::Text,
        FormatString::True,
        FormatString::False,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            FormatString::Signed => "print_signed_fstring",
            FormatString::Unsigned => "print_unsigned_fstring",
            FormatString::Text => "print_text_fstring",
            FormatString::True => "print_true_string",
            FormatString::False => "print_false_string",
        }
    }

    /// Contents without the terminating NUL
    pub fn contents(&self) -> &'static str {
        match self {
            FormatString::Signed => "%lld\n",
            FormatString::Unsigned => "%llu\n",
            FormatString::Text => "%s\n",
            FormatString::True => "true",
            FormatString::False => "false",
        }
    }

    /// Array length including the terminating NUL
    pub fn len(&self) -> usize {
        self.contents().len() + 1
    }

    /// `i8*` constant expression pointing at the first byte
    pub fn pointer(&self) -> String {
        format!(
            "getelementptr inbounds ([{len} x i8], [{len} x i8]* @{sym}, i32 0, i32 0)",
            len = self.len(),
            sym = self.symbol()
        )
    }

    /// The module-level definition line
    pub fn definition(&self) -> String {
        let mut escaped = String::new();
        for byte in self.contents().bytes() {
            match byte {
                b'\n' => escaped.push_str("\\0A"),
                b'"' => escaped.push_str("\\22"),
                b'\\' => escaped.push_str("\\5C"),
                b => escaped.push(b as char),
            }
        }
        format!(
            "@{} = private unnamed_addr constant [{} x i8] c\"{}\\00\", align 1",
            self.symbol(),
            self.len(),
            escaped
        )
    }
}

/// Argument passed to `printf` after the format string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintArg {
    Number { ty: NumberType, value: IrValue },
    Text(RegisterId),
}

/// IR Instructions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Stack slot: %result = alloca ty, align N
    Alloca {
        result: RegisterId,
        ty: NumberType,
        align: u32,
    },

    /// %result = load ty, ty* ptr
    Load {
        result: RegisterId,
        ty: NumberType,
        ptr: IrValue,
    },

    /// store ty value, ty* ptr
    Store {
        ty: NumberType,
        value: IrValue,
        ptr: IrValue,
    },

    /// %result = op ty lhs, rhs
    Binary {
        result: RegisterId,
        op: ArithmeticOp,
        ty: NumberType,
        lhs: IrValue,
        rhs: IrValue,
    },

    /// %result = icmp pred ty lhs, rhs
    Compare {
        result: RegisterId,
        op: CompareOp,
        ty: NumberType,
        lhs: IrValue,
        rhs: IrValue,
    },

    /// %result = and|or i1 lhs, rhs
    Logical {
        result: RegisterId,
        op: LogicalOp,
        lhs: IrValue,
        rhs: IrValue,
    },

    /// %result = sext|zext|trunc from value to to
    Convert {
        result: RegisterId,
        op: ConversionOp,
        from: NumberType,
        value: IrValue,
        to: NumberType,
    },

    /// %result = select i1 cond, i8* <if_true>, i8* <if_false>
    SelectString {
        result: RegisterId,
        condition: IrValue,
        if_true: FormatString,
        if_false: FormatString,
    },

    /// %result = call i32 (i8*, ...) @printf(...)
    Printf {
        result: RegisterId,
        format: FormatString,
        arg: PrintArg,
    },

    /// br label %L
    Branch(LabelId),

    /// br i1 cond, label %Lt, label %Lf
    BranchCond {
        condition: IrValue,
        true_label: LabelId,
        false_label: LabelId,
    },

    /// L:
    Label(LabelId),

    /// ret ty value
    Return { ty: NumberType, value: IrValue },

    /// ; text
    Comment(String),
}

impl Instruction {
    /// Check if this instruction ends a basic block
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Branch(_) | Instruction::BranchCond { .. } | Instruction::Return { .. }
        )
    }

    /// Register defined by this instruction, if any
    pub fn result(&self) -> Option<RegisterId> {
        match self {
            Instruction::Alloca { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::Binary { result, .. }
            | Instruction::Compare { result, .. }
            | Instruction::Logical { result, .. }
            | Instruction::Convert { result, .. }
            | Instruction::SelectString { result, .. }
            | Instruction::Printf { result, .. } => Some(*result),
            Instruction::Store { .. }
            | Instruction::Branch(_)
            | Instruction::BranchCond { .. }
            | Instruction::Label(_)
            | Instruction::Return { .. }
            | Instruction::Comment(_) => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Alloca { result, ty, align } => {
                write!(f, "%{} = alloca {}, align {}", result, ty.ir_repr(), align)
            }
            Instruction::Load { result, ty, ptr } => {
                let ty = ty.ir_repr();
                write!(f, "%{} = load {}, {}* {}", result, ty, ty, ptr)
            }
            Instruction::Store { ty, value, ptr } => {
                let ty = ty.ir_repr();
                write!(f, "store {} {}, {}* {}", ty, value, ty, ptr)
            }
            Instruction::Binary { result, op, ty, lhs, rhs } => {
                write!(f, "%{} = {} {} {}, {}", result, op.mnemonic(*ty), ty.ir_repr(), lhs, rhs)
            }
            Instruction::Compare { result, op, ty, lhs, rhs } => {
                write!(f, "%{} = icmp {} {} {}, {}", result, op.predicate(*ty), ty.ir_repr(), lhs, rhs)
            }
            Instruction::Logical { result, op, lhs, rhs } => {
                write!(f, "%{} = {} i1 {}, {}", result, op, lhs, rhs)
            }
            Instruction::Convert { result, op, from, value, to } => {
                write!(f, "%{} = {} {} {} to {}", result, op, from.ir_repr(), value, to.ir_repr())
            }
            Instruction::SelectString { result, condition, if_true, if_false } => {
                write!(
                    f,
                    "%{} = select i1 {}, i8* {}, i8* {}",
                    result,
                    condition,
                    if_true.pointer(),
                    if_false.pointer()
                )
            }
            Instruction::Printf { result, format, arg } => {
                write!(f, "%{} = call i32 (i8*, ...) @printf(i8* {}, ", result, format.pointer())?;
                match arg {
                    PrintArg::Number { ty, value } => write!(f, "{} {})", ty.ir_repr(), value),
                    PrintArg::Text(id) => write!(f, "i8* %{})", id),
                }
            }
            Instruction::Branch(label) => write!(f, "br label %L{}", label),
            Instruction::BranchCond { condition, true_label, false_label } => {
                write!(f, "br i1 {}, label %L{}, label %L{}", condition, true_label, false_label)
            }
            Instruction::Label(label) => write!(f, "L{}:", label),
            Instruction::Return { ty, value } => write!(f, "ret {} {}", ty.ir_repr(), value),
            Instruction::Comment(text) => write!(f, "; {}", text),
        }
    }
}
