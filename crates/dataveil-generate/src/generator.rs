use serde_json::Value;

use crate::errors::GenerationError;

/// Source of fake values, addressed by method name.
///
/// Implementations may return any JSON value. Callers that write to a
/// database column are responsible for rejecting non-scalar output.
pub trait ValueGenerator: Send {
    fn generate(&mut self, method: &str, params: &[Value]) -> Result<Value, GenerationError>;

    fn supports(&self, method: &str) -> bool;

    /// Called before each entity pass. Seeded generators restart their
    /// stream for `scope` here.
    fn begin_scope(&mut self, _scope: &str) {}
}

impl<G: ValueGenerator + ?Sized> ValueGenerator for Box<G> {
    fn generate(&mut self, method: &str, params: &[Value]) -> Result<Value, GenerationError> {
        (**self).generate(method, params)
    }

    fn supports(&self, method: &str) -> bool {
        (**self).supports(method)
    }

    fn begin_scope(&mut self, scope: &str) {
        (**self).begin_scope(scope)
    }
}
