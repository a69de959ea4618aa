use tracing::debug;

use crate::runtime::native;
use crate::syntax::{
    block::Block,
    expression::{Expression, FnExpr, Identifier, StructLit, Target},
    program::Program,
    statement::{DeclKind, ForSlots, Statement},
};

use super::{
    errors::{ResolveError, ResolveErrorKind},
    scope::{ScopeTable, THIS},
    variable::Resolution,
};

/// Resolves every identifier in `program`, annotating the tree in place.
///
/// All static errors are collected and returned together, in visitation order.
pub fn resolve(program: &mut Program) -> Result<(), Vec<ResolveError>> {
    let mut resolver = Resolver::new();
    resolver.resolve_function(&mut program.root);
    if resolver.errors.is_empty() {
        Ok(())
    } else {
        Err(resolver.errors)
    }
}

#[derive(Debug, Default)]
pub struct Resolver {
    scopes: ScopeTable,
    errors: Vec<ResolveError>,
    /// Open loops in the current function.
    loop_depth: usize,
    /// Struct literals lexically open around the current node.
    struct_depth: usize,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn error(&mut self, kind: ResolveErrorKind, ident: &Identifier) {
        self.errors
            .push(ResolveError::new(kind, ident.name.clone(), ident.span));
    }

    pub fn resolve_function(&mut self, function: &mut FnExpr) {
        // Loops do not extend into nested functions.
        let saved_loops = std::mem::take(&mut self.loop_depth);
        self.scopes.push_function();

        for parameter in &mut function.parameters {
            self.define(parameter, false);
        }
        for statement in &mut function.body.statements {
            self.resolve_statement(statement);
        }

        function.info = self.scopes.pop_function();
        self.loop_depth = saved_loops;

        debug!(
            target: "ember::resolver",
            function = function.display_name(),
            locals = function.info.num_locals,
            captures = function.info.num_captures,
            "froze function scope"
        );
    }

    fn define(&mut self, ident: &mut Identifier, is_const: bool) {
        match self.scopes.define(&ident.name, is_const) {
            Some(handle) => ident.binding = Some(Resolution::Variable(handle)),
            None => self.error(ResolveErrorKind::DuplicateSymbol, ident),
        }
    }

    fn resolve_reference(&mut self, ident: &mut Identifier) {
        if let Some(handle) = self.scopes.resolve(&ident.name) {
            ident.binding = Some(Resolution::Variable(handle));
        } else if let Some(index) = native::lookup(&ident.name) {
            ident.binding = Some(Resolution::Native(index));
        } else {
            self.error(ResolveErrorKind::UndefinedSymbol, ident);
        }
    }

    fn resolve_assignee(&mut self, ident: &mut Identifier) {
        self.resolve_reference(ident);
        let writable = match &ident.binding {
            Some(Resolution::Variable(handle)) => !handle.get().is_const,
            Some(Resolution::Native(_)) => false,
            // Already reported as undefined.
            None => true,
        };
        if !writable {
            self.error(ResolveErrorKind::ConstViolation, ident);
        }
    }

    fn resolve_block(&mut self, block: &mut Block) {
        self.scopes.push_block();
        for statement in &mut block.statements {
            self.resolve_statement(statement);
        }
        self.scopes.pop_block();
    }

    fn resolve_loop_body(&mut self, body: &mut Block) {
        self.loop_depth += 1;
        self.resolve_block(body);
        self.loop_depth -= 1;
    }

    fn resolve_statement(&mut self, statement: &mut Statement) {
        match statement {
            Statement::Let { kind, decls, .. } => {
                let is_const = *kind == DeclKind::Const;
                for decl in decls {
                    match &mut decl.value {
                        // Defined first so the body can call itself.
                        Some(value @ Expression::Function(_)) => {
                            self.define(&mut decl.name, is_const);
                            self.resolve_expression(value);
                        }
                        Some(value) => {
                            self.resolve_expression(value);
                            self.define(&mut decl.name, is_const);
                        }
                        None => self.define(&mut decl.name, is_const),
                    }
                }
            }
            Statement::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                self.resolve_expression(condition);
                self.resolve_block(consequence);
                if let Some(alternative) = alternative {
                    self.resolve_block(alternative);
                }
            }
            Statement::While {
                condition, body, ..
            } => {
                self.resolve_expression(condition);
                self.resolve_loop_body(body);
            }
            Statement::For {
                variable,
                iterable,
                body,
                slots,
                ..
            } => {
                self.resolve_expression(iterable);
                self.scopes.push_block();
                let iterable_slot = self.scopes.allocate_hidden();
                let cursor_slot = self.scopes.allocate_hidden();
                if let (Some(iterable), Some(cursor)) = (iterable_slot, cursor_slot) {
                    *slots = Some(ForSlots { iterable, cursor });
                }
                self.define(variable, false);
                self.resolve_loop_body(body);
                self.scopes.pop_block();
            }
            Statement::Break { span } => {
                if self.loop_depth == 0 {
                    self.errors.push(ResolveError::new(
                        ResolveErrorKind::BreakOutsideLoop,
                        "break",
                        *span,
                    ));
                }
            }
            Statement::Continue { span } => {
                if self.loop_depth == 0 {
                    self.errors.push(ResolveError::new(
                        ResolveErrorKind::ContinueOutsideLoop,
                        "continue",
                        *span,
                    ));
                }
            }
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.resolve_expression(value);
                }
            }
            Statement::Block(block) => self.resolve_block(block),
            Statement::Expression { expression, .. } => self.resolve_expression(expression),
        }
    }

    fn resolve_target(&mut self, target: &mut Target) {
        match target {
            Target::Identifier(ident) => self.resolve_assignee(ident),
            Target::Field { object, .. } => self.resolve_expression(object),
            Target::Index { object, index } => {
                self.resolve_expression(object);
                self.resolve_expression(index);
            }
        }
    }

    fn resolve_expression(&mut self, expression: &mut Expression) {
        match expression {
            Expression::Identifier(ident) => self.resolve_reference(ident),
            Expression::This(ident) => {
                if self.struct_depth == 0 {
                    self.error(ResolveErrorKind::ThisOutsideStruct, ident);
                } else {
                    match self.scopes.resolve(THIS) {
                        Some(handle) => ident.binding = Some(Resolution::Variable(handle)),
                        None => self.error(ResolveErrorKind::ThisOutsideStruct, ident),
                    }
                }
            }
            Expression::Integer { .. }
            | Expression::Float { .. }
            | Expression::String { .. }
            | Expression::Boolean { .. }
            | Expression::Null { .. } => {}
            Expression::Prefix { right, .. } => self.resolve_expression(right),
            Expression::Infix { left, right, .. } => {
                self.resolve_expression(left);
                self.resolve_expression(right);
            }
            Expression::Assign { target, value, .. } => {
                self.resolve_target(target);
                self.resolve_expression(value);
            }
            Expression::Postfix { target, .. } => self.resolve_target(target),
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                self.resolve_expression(function);
                for argument in arguments {
                    self.resolve_expression(argument);
                }
            }
            Expression::List { elements, .. } => {
                for element in elements {
                    self.resolve_expression(element);
                }
            }
            Expression::Index { left, index, .. } => {
                self.resolve_expression(left);
                self.resolve_expression(index);
            }
            Expression::Field { object, .. } => self.resolve_expression(object),
            Expression::Function(function) => self.resolve_function(function),
            Expression::Struct(lit) => self.resolve_struct(lit),
        }
    }

    fn resolve_struct(&mut self, lit: &mut StructLit) {
        for (i, field) in lit.fields.iter().enumerate() {
            if lit.fields[..i].iter().any(|prev| prev.key == field.key) {
                self.errors.push(ResolveError::new(
                    ResolveErrorKind::DuplicateSymbol,
                    field.key.clone(),
                    field.key_span,
                ));
            }
        }

        self.scopes.push_struct();
        self.struct_depth += 1;
        for field in &mut lit.fields {
            self.resolve_expression(&mut field.value);
        }
        self.struct_depth -= 1;
        lit.this_slot = self.scopes.pop_struct();
    }
}
