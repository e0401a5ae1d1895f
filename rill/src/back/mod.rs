use std::collections::HashMap;

use thiserror::Error;

use crate::error;
use crate::front::ast::{Stmt, Ty};
use crate::front::Span;
use crate::vm::Value;

pub mod code;
mod codegen;

pub use code::Unit;

/// A storage slot in the lowering target. Units refer to globals through
/// these; the slot outlives the unit that declared it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct GlobalRef(pub usize);

/// What the execution pipeline needs from its code-generation
/// collaborator. Everything about how units actually run lives behind
/// these three operations.
pub trait Target {
    /// Allocate the unit for one statement.
    fn begin_unit(&mut self, id: usize) -> Unit;

    /// Allocate storage for a global declared by `unit`, initialized to
    /// `initial`.
    fn declare_global(&mut self, unit: &mut Unit, name: &str, ty: Ty, initial: Value)
        -> GlobalRef;

    /// Link the unit against the declared globals and run it. The value
    /// is the unit's result, present when its statement was a bare
    /// expression.
    fn run_unit(&mut self, unit: &Unit) -> Result<Option<Value>, UnitError>;
}

/// A failure from a running unit.
#[derive(Error, Copy, Clone, PartialEq, Eq, Debug)]
pub enum UnitError {
    #[error("division by zero")]
    DivideByZero,
    #[error("malformed unit")]
    Malformed,
}

/// A name's current meaning: the unit that declared it, its resolved
/// type, and its storage slot.
#[derive(Copy, Clone, Debug)]
pub struct GlobalBinding {
    pub unit: usize,
    pub ty: Ty,
    pub slot: GlobalRef,
}

/// The persistent compile-link-run environment.
///
/// Each statement becomes one unit, numbered by a monotonically
/// increasing counter. Declarations append to the global table;
/// re-declaring a name shadows the earlier binding for every statement
/// executed afterwards, without touching units that already ran.
pub struct Environment<T> {
    target: T,
    globals: HashMap<String, GlobalBinding>,
    counter: usize,
}

impl<T: Target> Environment<T> {
    pub fn new(target: T) -> Environment<T> {
        Environment { target, globals: HashMap::new(), counter: 0 }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// The binding a name currently resolves to.
    pub fn global(&self, name: &str) -> Option<&GlobalBinding> {
        self.globals.get(name)
    }

    /// Compile one statement into a fresh unit, run it, and absorb its
    /// declarations. On failure the global table is left untouched, so
    /// bindings from earlier statements stay valid.
    pub fn execute(&mut self, statement: &(Stmt, Span)) -> Result<Option<Value>, error::Error> {
        let id = self.counter;
        let unit = self.target.begin_unit(id);

        let mut codegen = codegen::Codegen::new(&mut self.target, &self.globals, unit);
        codegen.statement(statement, true)?;
        let (unit, declared) = codegen.finish();

        let value = self
            .target
            .run_unit(&unit)
            .map_err(|error| error::Error::Unit { unit: id, error })?;

        self.globals.extend(declared);
        self.counter += 1;
        Ok(value)
    }
}
