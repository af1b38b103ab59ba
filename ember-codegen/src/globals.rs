//! Global variable handling
//!
//! Tracks the globals declared in a module, in declaration order, so loads
//! and stores can be checked against them and the module header can list
//! their definitions.

use crate::error::CodegenError;
use ember_common::NumberType;
use ember_ir::{GlobalVariable, IrValue};
use log::debug;
use std::collections::HashMap;

/// Global variable manager for tracking declared globals
#[derive(Debug, Clone, Default)]
pub struct GlobalManager {
    globals: Vec<GlobalVariable>,
    index: HashMap<String, usize>,
}

impl GlobalManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a global with an optional initial value
    pub fn declare(
        &mut self,
        name: &str,
        ty: NumberType,
        initializer: Option<i64>,
    ) -> Result<IrValue, CodegenError> {
        if self.index.contains_key(name) {
            return Err(CodegenError::Redeclaration {
                name: name.to_string(),
            });
        }
        let global = GlobalVariable::new(name, ty, initializer.map(|v| ty.wrap(v)));
        debug!("Declared global {}", global);

        let pointer = global.pointer();
        self.index.insert(name.to_string(), self.globals.len());
        self.globals.push(global);
        Ok(pointer)
    }

    pub fn get(&self, name: &str) -> Option<&GlobalVariable> {
        self.index.get(name).map(|&i| &self.globals[i])
    }

    /// Address of a declared global
    pub fn pointer(&self, name: &str) -> Result<IrValue, CodegenError> {
        self.get(name)
            .map(GlobalVariable::pointer)
            .ok_or_else(|| CodegenError::UnknownSymbol {
                name: name.to_string(),
            })
    }

    /// All globals in declaration order
    pub fn globals(&self) -> &[GlobalVariable] {
        &self.globals
    }
}
