//! Shareable handles to user functions embedded in column definitions.
//!
//! A [`Callable`] is cheap to clone and compares by identity of the user
//! function it wraps. Validation wraps callables in a [`CallGuard`] which sees
//! every invocation; re-guarding replaces the guard instead of nesting, so a
//! definition can be validated any number of times.

use std::fmt;
use std::sync::Arc;

use crate::context::{CellApi, ColumnApi, Context};
use crate::error::Result;
use crate::value::Value;

type Func = dyn Fn(Call<'_>) -> Result<Value> + Send + Sync;

/// Arguments of a single invocation: an optional capability context followed
/// by positional values.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    context: Option<&'a Context>,
    args: &'a [Value],
}

impl<'a> Call<'a> {
    /// An invocation without a capability context.
    pub fn new(args: &'a [Value]) -> Self {
        Self {
            context: None,
            args,
        }
    }

    /// An invocation receiving `context` as its first parameter.
    pub fn with_context(context: &'a Context, args: &'a [Value]) -> Self {
        Self {
            context: Some(context),
            args,
        }
    }

    pub fn context(&self) -> Option<&'a Context> {
        self.context
    }

    /// The cell context, if this call received one.
    pub fn cell(&self) -> Option<&'a CellApi> {
        match self.context {
            Some(Context::Cell(api)) => Some(api),
            _ => None,
        }
    }

    /// The column context, if this call received one.
    pub fn column(&self) -> Option<&'a ColumnApi> {
        match self.context {
            Some(Context::Column(api)) => Some(api),
            _ => None,
        }
    }

    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }
}

/// Intercepts invocations of a guarded callable.
///
/// `target` is the same callable with the guard removed; implementations
/// check the call, invoke `target`, and check what it returned.
pub trait CallGuard: Send + Sync + fmt::Debug {
    fn invoke(&self, target: &Callable, call: Call<'_>) -> Result<Value>;
}

/// A user function value.
#[derive(Clone)]
pub struct Callable {
    func: Arc<Func>,
    arity: Option<usize>,
    guard: Option<Arc<dyn CallGuard>>,
}

impl Callable {
    /// Wrap a closure. The arity is undeclared until [`Callable::with_arity`].
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Call<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(f),
            arity: None,
            guard: None,
        }
    }

    /// Declare how many parameters the function takes, context included.
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    pub fn is_guarded(&self) -> bool {
        self.guard.is_some()
    }

    /// Same function behind `guard`, replacing any guard already installed.
    pub fn guarded(&self, guard: Arc<dyn CallGuard>) -> Self {
        Self {
            func: Arc::clone(&self.func),
            arity: self.arity,
            guard: Some(guard),
        }
    }

    /// Same function with no guard.
    pub fn unguarded(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            arity: self.arity,
            guard: None,
        }
    }

    /// Invoke the function, through its guard when one is installed.
    pub fn call(&self, call: Call<'_>) -> Result<Value> {
        match &self.guard {
            Some(guard) => guard.invoke(&self.unguarded(), call),
            None => (self.func)(call),
        }
    }

    /// Invoke with a capability context followed by `args`.
    pub fn call_with(&self, context: &Context, args: &[Value]) -> Result<Value> {
        self.call(Call::with_context(context, args))
    }

    /// Invoke with positional `args` only.
    pub fn call_args(&self, args: &[Value]) -> Result<Value> {
        self.call(Call::new(args))
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.func), Arc::as_ptr(&other.func))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("arity", &self.arity)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl CallGuard for Counting {
        fn invoke(&self, target: &Callable, call: Call<'_>) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(!target.is_guarded());
            target.call(call)
        }
    }

    #[test]
    fn call_passes_arguments() {
        let add = Callable::new(|call| {
            let a = call.arg(0).and_then(Value::as_f64).unwrap_or_default();
            let b = call.arg(1).and_then(Value::as_f64).unwrap_or_default();
            Ok(Value::from(a + b))
        });
        let out = add.call_args(&[Value::from(2), Value::from(3)]).unwrap();
        assert_eq!(out, Value::from(5));
    }

    #[test]
    fn errors_propagate() {
        let f = Callable::new(|_| Err(ValueError::failed("nope")));
        assert_eq!(f.call_args(&[]), Err(ValueError::failed("nope")));
    }

    #[test]
    fn guard_sees_every_call() {
        let guard = Arc::new(Counting::default());
        let f = Callable::new(|_| Ok(Value::Bool(true))).guarded(guard.clone());
        f.call_args(&[]).unwrap();
        f.call_args(&[]).unwrap();
        assert_eq!(guard.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reguarding_replaces_instead_of_nesting() {
        let first = Arc::new(Counting::default());
        let second = Arc::new(Counting::default());
        let f = Callable::new(|_| Ok(Value::Null))
            .guarded(first.clone())
            .guarded(second.clone());
        f.call_args(&[]).unwrap();
        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn guarded_equals_original() {
        let f = Callable::new(|_| Ok(Value::Null)).with_arity(2);
        let g = f.guarded(Arc::new(Counting::default()));
        assert_eq!(f, g);
        assert_eq!(g.arity(), Some(2));
        assert_eq!(g.unguarded(), f);
    }
}
