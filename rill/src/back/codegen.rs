use std::collections::HashMap;

use crate::back::code::{Inst, Unit};
use crate::back::{GlobalBinding, Target};
use crate::error::Error;
use crate::front::ast::{BinaryOp, Expr, Stmt, Ty, UnaryOp};
use crate::front::Span;
use crate::vm::Value;

/// Lowers one statement into one unit.
///
/// Names resolve against the environment's table plus the bindings this
/// unit has declared so far; the latter are handed back from `finish` and
/// only reach the real table once the unit has run.
pub struct Codegen<'e, T> {
    target: &'e mut T,
    globals: &'e HashMap<String, GlobalBinding>,
    declared: Vec<(String, GlobalBinding)>,
    unit: Unit,
}

impl<'e, T: Target> Codegen<'e, T> {
    pub fn new(
        target: &'e mut T,
        globals: &'e HashMap<String, GlobalBinding>,
        unit: Unit,
    ) -> Codegen<'e, T> {
        Codegen { target, globals, declared: Vec::new(), unit }
    }

    pub fn finish(self) -> (Unit, Vec<(String, GlobalBinding)>) {
        (self.unit, self.declared)
    }

    fn lookup(&self, name: &str) -> Option<GlobalBinding> {
        self.declared
            .iter()
            .rev()
            .find(|(declared, _)| declared.as_str() == name)
            .map(|&(_, binding)| binding)
            .or_else(|| self.globals.get(name).copied())
    }

    /// Lower one statement. `tail` marks the unit's top-level statement,
    /// whose bare expression value is left as the unit's result instead of
    /// being discarded.
    pub fn statement(&mut self, statement: &(Stmt, Span), tail: bool) -> Result<(), Error> {
        match statement.0 {
            Stmt::Expression(None) => Ok(()),

            Stmt::Expression(Some(ref expr)) => {
                self.expression(expr)?;
                if !tail {
                    self.unit.push(Inst::Pop);
                }
                Ok(())
            }

            Stmt::Declaration(ref name, ty, ref init) => {
                let init_ty = match init {
                    Some(init) => Some(self.expression(init)?),
                    None => None,
                };
                let resolved = match ty {
                    Some((annotated, _)) => annotated,
                    None => init_ty.unwrap_or(Ty::Integer),
                };
                if let (Some(init_ty), Some((annotated, _))) = (init_ty, ty) {
                    self.coerce(init_ty, annotated);
                }

                let slot =
                    self.target.declare_global(&mut self.unit, name, resolved, Value::zero(resolved));
                if init.is_some() {
                    self.unit.push(Inst::Store(slot));
                }
                let binding = GlobalBinding { unit: self.unit.id, ty: resolved, slot };
                self.declared.push((name.clone(), binding));
                Ok(())
            }

            Stmt::Block(ref statements) => {
                for statement in statements.iter() {
                    self.statement(statement, false)?;
                }
                Ok(())
            }

            Stmt::If(ref condition, ref then, ref other) => {
                let ty = self.expression(condition)?;
                self.coerce(ty, Ty::Boolean);
                let branch = self.unit.push(Inst::BranchFalse(0));
                self.statement(then, false)?;
                match other {
                    None => {
                        let end = self.unit.here();
                        self.unit.patch(branch, end);
                    }
                    Some(other) => {
                        let jump = self.unit.push(Inst::Jump(0));
                        let otherwise = self.unit.here();
                        self.unit.patch(branch, otherwise);
                        self.statement(other, false)?;
                        let end = self.unit.here();
                        self.unit.patch(jump, end);
                    }
                }
                Ok(())
            }

            Stmt::While(ref condition, ref body) => {
                let head = self.unit.here();
                let ty = self.expression(condition)?;
                self.coerce(ty, Ty::Boolean);
                let exit = self.unit.push(Inst::BranchFalse(0));
                self.statement(body, false)?;
                self.unit.push(Inst::Jump(head));
                let end = self.unit.here();
                self.unit.patch(exit, end);
                Ok(())
            }
        }
    }

    /// Lower an expression, leaving its value on the stack; the returned
    /// type is what that value will be.
    fn expression(&mut self, expr: &(Expr, Span)) -> Result<Ty, Error> {
        let (ref expr, span) = *expr;
        match *expr {
            Expr::Identifier(ref name) => {
                let binding = self.lookup(name).ok_or_else(|| Error::UndefinedVariable {
                    name: name.clone(),
                    span,
                })?;
                self.unit.push(Inst::Load(binding.slot));
                Ok(binding.ty)
            }

            Expr::Integer(value) => {
                self.unit.push(Inst::Push(Value::Int(value)));
                Ok(Ty::Integer)
            }

            Expr::Group(ref inner) => self.expression(inner),

            Expr::Unary(op, ref operand) => {
                let ty = self.expression(operand)?;
                match op {
                    UnaryOp::Plus => {
                        self.coerce(ty, Ty::Integer);
                    }
                    UnaryOp::Minus => {
                        self.coerce(ty, Ty::Integer);
                        self.unit.push(Inst::Neg);
                    }
                    UnaryOp::BitNot => {
                        self.coerce(ty, Ty::Integer);
                        self.unit.push(Inst::BitNot);
                    }
                    UnaryOp::LogicalNot => {
                        self.coerce(ty, Ty::Boolean);
                        self.unit.push(Inst::Not);
                        return Ok(Ty::Boolean);
                    }
                }
                Ok(Ty::Integer)
            }

            Expr::Binary(op, ref left, ref right) => self.binary(op, left, right),

            Expr::Call(..) => Err(Error::Lowering {
                message: "function calls are not supported by the execution target",
                span: Some(span),
            }),
        }
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        left: &(Expr, Span),
        right: &(Expr, Span),
    ) -> Result<Ty, Error> {
        if op == BinaryOp::Assign || op.compound().is_some() {
            return self.assign(op, left, right);
        }

        match op {
            BinaryOp::LogicalAnd => {
                let ty = self.expression(left)?;
                self.coerce(ty, Ty::Boolean);
                self.unit.push(Inst::Dup);
                let skip = self.unit.push(Inst::BranchFalse(0));
                self.unit.push(Inst::Pop);
                let ty = self.expression(right)?;
                self.coerce(ty, Ty::Boolean);
                let end = self.unit.here();
                self.unit.patch(skip, end);
                Ok(Ty::Boolean)
            }

            BinaryOp::LogicalOr => {
                // Branching on the negation keeps a true left operand as
                // the result; only a false one falls through to the right.
                let ty = self.expression(left)?;
                self.coerce(ty, Ty::Boolean);
                self.unit.push(Inst::Dup);
                self.unit.push(Inst::Not);
                let skip = self.unit.push(Inst::BranchFalse(0));
                self.unit.push(Inst::Pop);
                let ty = self.expression(right)?;
                self.coerce(ty, Ty::Boolean);
                let end = self.unit.here();
                self.unit.patch(skip, end);
                Ok(Ty::Boolean)
            }

            _ => {
                let ty = self.expression(left)?;
                self.coerce(ty, Ty::Integer);
                let ty = self.expression(right)?;
                self.coerce(ty, Ty::Integer);
                let (inst, result) = operator(op);
                self.unit.push(inst);
                Ok(result)
            }
        }
    }

    fn assign(
        &mut self,
        op: BinaryOp,
        left: &(Expr, Span),
        right: &(Expr, Span),
    ) -> Result<Ty, Error> {
        let name = match left.0.identifier() {
            Some(name) => name,
            None => {
                return Err(Error::Lowering {
                    message: "assignment target is not a variable name",
                    span: Some(left.1),
                })
            }
        };
        let binding = self.lookup(name).ok_or_else(|| Error::UndefinedVariable {
            name: name.to_owned(),
            span: left.1,
        })?;

        match op.compound() {
            None => {
                let ty = self.expression(right)?;
                self.coerce(ty, binding.ty);
            }
            Some(base) => {
                self.unit.push(Inst::Load(binding.slot));
                self.coerce(binding.ty, Ty::Integer);
                let ty = self.expression(right)?;
                self.coerce(ty, Ty::Integer);
                let (inst, _) = operator(base);
                self.unit.push(inst);
                self.coerce(Ty::Integer, binding.ty);
            }
        }

        // An assignment is an expression; its value is what was stored.
        self.unit.push(Inst::Dup);
        self.unit.push(Inst::Store(binding.slot));
        Ok(binding.ty)
    }

    fn coerce(&mut self, from: Ty, to: Ty) {
        match (from, to) {
            (Ty::Boolean, Ty::Integer) => {
                self.unit.push(Inst::BoolToInt);
            }
            (Ty::Integer, Ty::Boolean) => {
                self.unit.push(Inst::IntToBool);
            }
            (Ty::Integer, Ty::Integer) | (Ty::Boolean, Ty::Boolean) => {}
        }
    }
}

fn operator(op: BinaryOp) -> (Inst, Ty) {
    match op {
        BinaryOp::Mul => (Inst::Mul, Ty::Integer),
        BinaryOp::Div => (Inst::Div, Ty::Integer),
        BinaryOp::Rem => (Inst::Rem, Ty::Integer),
        BinaryOp::Add => (Inst::Add, Ty::Integer),
        BinaryOp::Sub => (Inst::Sub, Ty::Integer),
        BinaryOp::LeftShift => (Inst::Shl, Ty::Integer),
        BinaryOp::RightShift => (Inst::Shr, Ty::Integer),
        BinaryOp::BitAnd => (Inst::BitAnd, Ty::Integer),
        BinaryOp::BitXor => (Inst::BitXor, Ty::Integer),
        BinaryOp::BitOr => (Inst::BitOr, Ty::Integer),
        BinaryOp::Equal => (Inst::Eq, Ty::Boolean),
        BinaryOp::NotEqual => (Inst::Ne, Ty::Boolean),
        BinaryOp::Less => (Inst::Lt, Ty::Boolean),
        BinaryOp::Greater => (Inst::Gt, Ty::Boolean),
        BinaryOp::LessEqual => (Inst::Le, Ty::Boolean),
        BinaryOp::GreaterEqual => (Inst::Ge, Ty::Boolean),
        _ => unreachable!("not an operator instruction"),
    }
}
