//! Descriptive method references attached to call-tree nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable identity of a traced method
///
/// **Public** - supplied by the instrumentation layer next to each handle
///
/// Generic methods carry their parameter names. An instantiation also
/// carries the concrete type arguments; the generic definition itself has
/// none.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodRef {
    pub declaring_type: String,
    pub name: String,

    /// Generic parameter names of the definition (empty if not generic)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<String>,

    /// Concrete type arguments of an instantiation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_arguments: Vec<String>,
}

impl MethodRef {
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            generic_parameters: Vec::new(),
            generic_arguments: Vec::new(),
        }
    }

    /// Generic method definition with the given parameter names
    pub fn with_generic_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Instantiation of this definition with concrete type arguments
    pub fn instantiate<I, S>(&self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            generic_arguments: arguments.into_iter().map(Into::into).collect(),
            ..self.generic_definition()
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_parameters.is_empty()
    }

    pub fn is_generic_instantiation(&self) -> bool {
        self.is_generic() && !self.generic_arguments.is_empty()
    }

    /// The generic definition this method instantiates.
    ///
    /// Non-generic methods and definitions map to themselves.
    pub fn generic_definition(&self) -> MethodRef {
        Self {
            declaring_type: self.declaring_type.clone(),
            name: self.name.clone(),
            generic_parameters: self.generic_parameters.clone(),
            generic_arguments: Vec::new(),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)?;
        let shown = if self.generic_arguments.is_empty() {
            &self.generic_parameters
        } else {
            &self.generic_arguments
        };
        if !shown.is_empty() {
            write!(f, "<{}>", shown.join(", "))?;
        }
        Ok(())
    }
}
