//! Module-level IR emission
//!
//! `IrEmitter` owns the module's globals and finished functions and hands
//! out one `FunctionBuilder` at a time.

use crate::error::CodegenError;
use crate::function::FunctionBuilder;
use crate::globals::GlobalManager;
use ember_common::NumberType;
use ember_ir::{FunctionBlock, IrValue, Module};
use log::{debug, info};
use std::collections::HashSet;

/// Settings that shape the module header and footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterConfig {
    /// Written as `; ModuleID` and `source_filename`
    pub module_id: String,
    pub target_triple: Option<String>,
    pub data_layout: Option<String>,
    /// Tag functions with attribute groups
    pub emit_attributes: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            module_id: "ember".to_string(),
            target_triple: None,
            data_layout: None,
            emit_attributes: true,
        }
    }
}

pub struct IrEmitter {
    config: EmitterConfig,
    globals: GlobalManager,
    current: Option<FunctionBuilder>,
    functions: Vec<FunctionBlock>,
    function_names: HashSet<String>,
}

impl IrEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            config,
            globals: GlobalManager::new(),
            current: None,
            functions: Vec::new(),
            function_names: HashSet::new(),
        }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn globals(&self) -> &GlobalManager {
        &self.globals
    }

    /// Define a global, embedding its initial value
    pub fn declare_global(
        &mut self,
        name: &str,
        ty: NumberType,
        initializer: Option<i64>,
    ) -> Result<IrValue, CodegenError> {
        self.globals.declare(name, ty, initializer)
    }

    /// Address of a declared global
    pub fn global(&self, name: &str) -> Result<IrValue, CodegenError> {
        self.globals.pointer(name)
    }

    /// Start a new function; the previous one must be finished
    pub fn begin_function(&mut self, name: &str) -> Result<&mut FunctionBuilder, CodegenError> {
        if let Some(current) = &self.current {
            return Err(CodegenError::invalid_state(format!(
                "cannot begin '{}' while '{}' is open",
                name,
                current.name()
            )));
        }
        if self.function_names.contains(name) {
            return Err(CodegenError::Redeclaration {
                name: name.to_string(),
            });
        }
        debug!("begin function '{}'", name);
        Ok(self.current.insert(FunctionBuilder::new(name)))
    }

    /// The open function
    pub fn function(&mut self) -> Result<&mut FunctionBuilder, CodegenError> {
        self.current
            .as_mut()
            .ok_or_else(|| CodegenError::invalid_state("no function is open"))
    }

    /// Load a global into a fresh register of the open function
    pub fn load_global(&mut self, name: &str) -> Result<IrValue, CodegenError> {
        let builder = self
            .current
            .as_mut()
            .ok_or_else(|| CodegenError::invalid_state("load of a global outside a function"))?;
        builder.load_global(&self.globals, name)
    }

    /// Store into a global from the open function
    pub fn store_global(&mut self, name: &str, value: &IrValue) -> Result<(), CodegenError> {
        let ptr = self.globals.pointer(name)?;
        self.function()?.store(value, &ptr)
    }

    /// Emit the postamble of the open function and keep its block
    pub fn end_function(&mut self) -> Result<(), CodegenError> {
        let mut builder = self
            .current
            .take()
            .ok_or_else(|| CodegenError::invalid_state("no function to end"))?;
        let block = builder.postamble()?;
        self.function_names.insert(block.name.clone());
        self.functions.push(block);
        Ok(())
    }

    /// Assemble the module; every function must be finished
    pub fn finish(self) -> Result<Module, CodegenError> {
        if let Some(current) = &self.current {
            return Err(CodegenError::invalid_state(format!(
                "function '{}' was never finished",
                current.name()
            )));
        }
        info!(
            "emitted module '{}' with {} globals and {} functions",
            self.config.module_id,
            self.globals.globals().len(),
            self.functions.len()
        );
        Ok(Module {
            module_id: self.config.module_id,
            data_layout: self.config.data_layout,
            target_triple: self.config.target_triple,
            emit_attributes: self.config.emit_attributes,
            globals: self.globals.globals().to_vec(),
            functions: self.functions,
        })
    }
}
