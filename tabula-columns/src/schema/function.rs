//! Function contracts.
//!
//! A contract states which capability context a user function receives,
//! which positional arguments follow, and what it must return. Validating a
//! callable against a contract checks its declared arity and yields the same
//! function behind a [`ContractGuard`], which enforces the rest of the
//! contract on every call.

use std::sync::Arc;

use tabula_value::{Call, CallGuard, Callable, Context, Value, ValueError};
use tracing::{trace, warn};

use super::{Checked, Schema, Validator};
use crate::api;
use crate::config::UnknownKeys;
use crate::issue::{Issue, PathSegment};

/// Which capability context a callable receives as its first parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextScope {
    Cell,
    Column,
}

impl ContextScope {
    pub fn name(&self) -> &'static str {
        match self {
            ContextScope::Cell => "cell",
            ContextScope::Column => "column",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionContract {
    scope: Option<ContextScope>,
    context: Option<Schema>,
    args: Vec<Schema>,
    returns: Schema,
}

impl FunctionContract {
    /// `(CellApi<any>, ...) -> returns`
    pub fn cell(returns: impl Into<Schema>) -> Self {
        Self::scoped(ContextScope::Cell, returns.into())
    }

    /// `(ColumnApi<any>, ...) -> returns`
    pub fn column(returns: impl Into<Schema>) -> Self {
        Self::scoped(ContextScope::Column, returns.into())
    }

    /// `(...) -> returns`, no context.
    pub fn bare(returns: impl Into<Schema>) -> Self {
        Self {
            scope: None,
            context: None,
            args: Vec::new(),
            returns: returns.into(),
        }
    }

    fn scoped(scope: ContextScope, returns: Schema) -> Self {
        Self {
            scope: Some(scope),
            context: None,
            args: Vec::new(),
            returns,
        }
        .value(Schema::any())
    }

    /// Parameterize the context by the column's value type.
    pub fn value(mut self, value: impl Into<Schema>) -> Self {
        self.context = self.scope.map(|scope| match scope {
            ContextScope::Cell => api::cell_api_schema(value.into()),
            ContextScope::Column => api::column_api_schema(value.into()),
        });
        self
    }

    /// Append a positional argument.
    pub fn arg(mut self, schema: impl Into<Schema>) -> Self {
        self.args.push(schema.into());
        self
    }

    pub fn scope(&self) -> Option<ContextScope> {
        self.scope
    }

    /// Parameter count, context included.
    pub fn params(&self) -> usize {
        usize::from(self.scope.is_some()) + self.args.len()
    }

    pub(super) fn validate(self: &Arc<Self>, value: &Value, v: &mut Validator) -> Checked {
        let Value::Function(callable) = value else {
            return v.mismatch("function", value.type_name());
        };
        let params = self.params();
        if let Some(arity) = callable.arity() {
            if arity > params {
                return v.mismatch(
                    format!("function of at most {} parameters", params),
                    format!("function of {} parameters", arity),
                );
            }
        }
        trace!(scope = ?self.scope, params, "guarding callable");
        let guard = ContractGuard {
            contract: Arc::clone(self),
            unknown_keys: v.unknown_keys(),
        };
        Ok(Some(Value::Function(callable.guarded(Arc::new(guard)))))
    }
}

/// Enforces a [`FunctionContract`] on each invocation.
#[derive(Debug)]
pub struct ContractGuard {
    contract: Arc<FunctionContract>,
    unknown_keys: UnknownKeys,
}

impl ContractGuard {
    fn check_arguments(&self, call: &Call<'_>) -> Vec<Issue> {
        let contract = &self.contract;
        let mut v = Validator::new(self.unknown_keys);

        let offset = usize::from(contract.scope.is_some());
        if let (Some(schema), Some(context)) = (&contract.context, call.context()) {
            let snapshot = context.to_value();
            let _ = v.nested("context", |v| schema.validate(Some(&snapshot), v));
        }
        for (i, schema) in contract.args.iter().enumerate() {
            let _ = v.nested(i + offset, |v| schema.validate(call.arg(i), v));
        }
        for (i, extra) in call.args().iter().enumerate().skip(contract.args.len()) {
            let _ = v.nested(i + offset, |v| v.mismatch("no argument", extra.type_name()));
        }
        v.into_issues()
    }
}

impl CallGuard for ContractGuard {
    fn invoke(&self, target: &Callable, call: Call<'_>) -> tabula_value::Result<Value> {
        if let Some(scope) = self.contract.scope {
            let received = call.context().map(Context::scope_name);
            if received != Some(scope.name()) {
                return Err(ValueError::ContextScope {
                    expected: scope.name(),
                    received: received.unwrap_or("no context"),
                });
            }
        }

        let issues = self.check_arguments(&call);
        if !issues.is_empty() {
            return Err(ValueError::InvalidArguments {
                issues: issues.iter().map(Issue::to_string).collect(),
            });
        }

        let returned = target.call(call)?;

        let mut v = Validator::at(self.unknown_keys, vec![PathSegment::from("returns")]);
        match self.contract.returns.validate(Some(&returned), &mut v) {
            Ok(checked) if v.is_clean() => Ok(checked.unwrap_or(Value::Null)),
            _ => {
                let issues: Vec<String> = v.issues().iter().map(Issue::to_string).collect();
                warn!(issues = ?issues, "callable returned a value outside its contract");
                Err(ValueError::InvalidReturn { issues })
            }
        }
    }
}
