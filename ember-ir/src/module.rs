//! Module-level IR containers and textual rendering

use crate::ir::{FormatString, Instruction, IrValue};
use ember_common::NumberType;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attributes attached to every generated function
pub const FUNCTION_ATTRIBUTES: &str = "attributes #0 = { noinline nounwind optnone uwtable \"frame-pointer\"=\"all\" \"no-trapping-math\"=\"true\" \"stack-protector-buffer-size\"=\"8\" }";

/// Attributes attached to the `printf` declaration
pub const PRINTF_ATTRIBUTES: &str = "attributes #1 = { \"frame-pointer\"=\"all\" \"no-trapping-math\"=\"true\" \"stack-protector-buffer-size\"=\"8\" }";

/// Global variable definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub name: String,
    pub ty: NumberType,
    /// Initial value, zero when absent
    pub initializer: Option<i64>,
}

impl GlobalVariable {
    pub fn new(name: &str, ty: NumberType, initializer: Option<i64>) -> Self {
        Self {
            name: name.to_string(),
            ty,
            initializer,
        }
    }

    /// Address of this global as an operand
    pub fn pointer(&self) -> IrValue {
        IrValue::GlobalPointer {
            name: self.name.clone(),
            ty: self.ty,
        }
    }
}

impl fmt::Display for GlobalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let init = IrValue::constant(self.initializer.unwrap_or(0), self.ty);
        write!(f, "@{} = global {} {}", self.name, self.ty.ir_repr(), init)
    }
}

/// A finished function: header information plus its instruction stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionBlock {
    pub name: String,
    pub instructions: Vec<Instruction>,
}

impl FunctionBlock {
    pub fn new(name: &str, instructions: Vec<Instruction>) -> Self {
        Self {
            name: name.to_string(),
            instructions,
        }
    }

    /// Check if the body calls `printf`
    pub fn calls_printf(&self) -> bool {
        self.instructions
            .iter()
            .any(|inst| matches!(inst, Instruction::Printf { .. }))
    }

    /// Render the function definition, optionally tagged with attribute group #0
    pub fn render(&self, with_attributes: bool) -> String {
        let mut out = String::new();
        if with_attributes {
            out.push_str("; Function Attrs: noinline nounwind optnone uwtable\n");
        }
        let attrs = if with_attributes { " #0" } else { "" };
        out.push_str(&format!("define dso_local i32 @{}(){} {{\n", self.name, attrs));
        for inst in &self.instructions {
            match inst {
                Instruction::Label(_) => out.push_str(&format!("{}\n", inst)),
                _ => out.push_str(&format!("  {}\n", inst)),
            }
        }
        out.push_str("}\n");
        out
    }
}

/// A complete translation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub module_id: String,
    pub data_layout: Option<String>,
    pub target_triple: Option<String>,
    pub emit_attributes: bool,
    pub globals: Vec<GlobalVariable>,
    pub functions: Vec<FunctionBlock>,
}

impl Module {
    pub fn new(module_id: &str) -> Self {
        Self {
            module_id: module_id.to_string(),
            data_layout: None,
            target_triple: None,
            emit_attributes: true,
            globals: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn uses_printf(&self) -> bool {
        self.functions.iter().any(FunctionBlock::calls_printf)
    }

    /// Render the whole module as IR text
    pub fn render(&self) -> String {
        debug!(
            "rendering module '{}': {} globals, {} functions",
            self.module_id,
            self.globals.len(),
            self.functions.len()
        );

        let mut out = String::new();
        out.push_str(&format!("; ModuleID = '{}'\n", self.module_id));
        out.push_str(&format!("source_filename = \"{}\"\n", self.module_id));
        if let Some(layout) = &self.data_layout {
            out.push_str(&format!("target datalayout = \"{}\"\n", layout));
        }
        if let Some(triple) = &self.target_triple {
            out.push_str(&format!("target triple = \"{}\"\n", triple));
        }
        out.push('\n');

        if !self.globals.is_empty() {
            for global in &self.globals {
                out.push_str(&format!("{}\n", global));
            }
            out.push('\n');
        }

        let uses_printf = self.uses_printf();
        if uses_printf {
            for format in FormatString::ALL {
                out.push_str(&format!("{}\n", format.definition()));
            }
            out.push('\n');
        }

        for function in &self.functions {
            out.push_str(&function.render(self.emit_attributes));
            out.push('\n');
        }

        if uses_printf {
            let attrs = if self.emit_attributes { " #1" } else { "" };
            out.push_str(&format!("declare i32 @printf(i8*, ...){}\n", attrs));
            out.push('\n');
        }

        if self.emit_attributes && !self.functions.is_empty() {
            out.push_str(&format!("{}\n", FUNCTION_ATTRIBUTES));
            if uses_printf {
                out.push_str(&format!("{}\n", PRINTF_ATTRIBUTES));
            }
        }

        out
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
