use serde_json::Value;

use crate::errors::GenerationError;

/// Positional parameters for one generator call. `null` counts as absent.
pub(crate) struct Params<'a> {
    method: &'static str,
    values: &'a [Value],
}

impl<'a> Params<'a> {
    pub(crate) fn new(method: &'static str, values: &'a [Value]) -> Self {
        Self { method, values }
    }

    pub(crate) fn at_most(&self, count: usize) -> Result<(), GenerationError> {
        if self.values.len() > count {
            return Err(GenerationError::invalid(
                self.method,
                format!(
                    "expected at most {count} params, got {}",
                    self.values.len()
                ),
            ));
        }
        Ok(())
    }

    fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index).filter(|value| !value.is_null())
    }

    pub(crate) fn i64_at(&self, index: usize, default: i64) -> Result<i64, GenerationError> {
        match self.get(index) {
            None => Ok(default),
            Some(Value::Number(number)) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .ok_or_else(|| self.type_error(index, "an integer")),
            Some(Value::String(text)) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| self.type_error(index, "an integer")),
            Some(_) => Err(self.type_error(index, "an integer")),
        }
    }

    pub(crate) fn usize_at(&self, index: usize, default: usize) -> Result<usize, GenerationError> {
        let value = self.i64_at(index, default as i64)?;
        usize::try_from(value).map_err(|_| self.type_error(index, "a non-negative integer"))
    }

    /// Like `usize_at`, rejecting values above `max`.
    pub(crate) fn bounded_at(
        &self,
        index: usize,
        default: usize,
        max: usize,
    ) -> Result<usize, GenerationError> {
        let value = self.usize_at(index, default)?;
        if value > max {
            return Err(GenerationError::invalid(
                self.method,
                format!("param {index} must be at most {max}, got {value}"),
            ));
        }
        Ok(value)
    }

    pub(crate) fn f64_at(&self, index: usize) -> Result<Option<f64>, GenerationError> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::Number(number)) => number
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.type_error(index, "a number")),
            Some(Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(Some)
                .ok_or_else(|| self.type_error(index, "a finite number")),
            Some(_) => Err(self.type_error(index, "a number")),
        }
    }

    pub(crate) fn bool_at(&self, index: usize, default: bool) -> Result<bool, GenerationError> {
        match self.get(index) {
            None => Ok(default),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(Value::Number(number)) => Ok(number.as_f64().is_some_and(|n| n != 0.0)),
            Some(_) => Err(self.type_error(index, "a boolean")),
        }
    }

    pub(crate) fn str_at(&self, index: usize) -> Result<Option<&'a str>, GenerationError> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.as_str())),
            Some(_) => Err(self.type_error(index, "a string")),
        }
    }

    pub(crate) fn require_str(&self, index: usize) -> Result<&'a str, GenerationError> {
        self.str_at(index)?.ok_or_else(|| {
            GenerationError::invalid(self.method, format!("param {index} is required"))
        })
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> GenerationError {
        GenerationError::invalid(self.method, message)
    }

    fn type_error(&self, index: usize, expected: &str) -> GenerationError {
        GenerationError::invalid(self.method, format!("param {index} must be {expected}"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Params;

    #[test]
    fn null_and_missing_fall_back_to_defaults() {
        let values = vec![json!(null)];
        let params = Params::new("words", &values);
        assert_eq!(params.usize_at(0, 3).unwrap(), 3);
        assert!(!params.bool_at(1, false).unwrap());
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let values = vec![json!("12"), json!(4.0)];
        let params = Params::new("number_between", &values);
        assert_eq!(params.i64_at(0, 0).unwrap(), 12);
        assert_eq!(params.i64_at(1, 0).unwrap(), 4);
    }

    #[test]
    fn wrong_types_are_reported() {
        let values = vec![json!([1]), json!(-2)];
        let params = Params::new("sentence", &values);
        assert!(params.i64_at(0, 0).is_err());
        assert!(params.usize_at(1, 0).is_err());
        assert!(params.at_most(1).is_err());
    }

    #[test]
    fn non_finite_numbers_and_oversized_counts_are_rejected() {
        let values = vec![json!("inf"), json!("NaN"), json!(5000), json!("2.5")];
        let params = Params::new("random_float", &values);
        assert!(params.f64_at(0).is_err());
        assert!(params.f64_at(1).is_err());
        assert!(params.bounded_at(2, 3, 1000).is_err());
        assert_eq!(params.bounded_at(2, 3, 5000).unwrap(), 5000);
        assert_eq!(params.f64_at(3).unwrap(), Some(2.5));
    }
}
