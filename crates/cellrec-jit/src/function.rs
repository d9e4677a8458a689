//! Guest function descriptions and their compilation lifecycle.

use std::fmt;

use cellrec_ir::Type;

use crate::error::StateError;

/// Class of one declared parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamType {
    Integer,
    Float,
    Vector,
}

impl ParamType {
    pub const fn ir_type(self) -> Type {
        match self {
            Self::Integer => Type::I64,
            Self::Float => Type::F64,
            Self::Vector => Type::I128,
        }
    }
}

/// Declared return value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Void,
    #[default]
    Integer,
    Float,
    FloatX2,
    FloatX3,
    FloatX4,
    Vector,
}

impl ReturnType {
    /// IR type of the returned value; `None` for void and for multi-value
    /// floating-point returns, which have no single IR type.
    pub const fn ir_type(self) -> Option<Type> {
        match self {
            Self::Integer => Some(Type::I64),
            Self::Float => Some(Type::F64),
            Self::Vector => Some(Type::I128),
            Self::Void | Self::FloatX2 | Self::FloatX3 | Self::FloatX4 => None,
        }
    }

    pub const fn is_multi_float(self) -> bool {
        matches!(self, Self::FloatX2 | Self::FloatX3 | Self::FloatX4)
    }
}

/// Compilation lifecycle of one function.
///
/// ```text
/// Decoded -> Translated -> PassesRunning -> PassesComplete -> Emitted
///                                       \-> PassFailed
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FunctionState {
    #[default]
    Decoded,
    Translated,
    PassesRunning,
    PassesComplete,
    PassFailed,
    Emitted,
}

impl FunctionState {
    /// Whether `self -> to` is a legal transition.
    pub const fn can_advance(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Decoded, Self::Translated)
                | (Self::Translated, Self::PassesRunning)
                | (Self::PassesRunning, Self::PassesComplete | Self::PassFailed)
                | (Self::PassesComplete, Self::Emitted)
        )
    }

    pub const fn advance(self, to: Self) -> Result<Self, StateError> {
        if self.can_advance(to) {
            Ok(to)
        } else {
            Err(StateError { from: self, to })
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::PassFailed | Self::Emitted)
    }
}

impl fmt::Display for FunctionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decoded => "decoded",
            Self::Translated => "translated",
            Self::PassesRunning => "passes-running",
            Self::PassesComplete => "passes-complete",
            Self::PassFailed => "pass-failed",
            Self::Emitted => "emitted",
        };
        f.write_str(name)
    }
}

/// A guest function inside a segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub address: u64,
    /// Length in bytes.
    pub size: u64,
    pub name: String,
    pub params: Vec<ParamType>,
    pub ret: ReturnType,
    state: FunctionState,
}

impl Function {
    /// Function with the default signature: no parameters, integer return.
    pub fn new(address: u64, size: u64) -> Self {
        Self {
            address,
            size,
            name: format!("func_{address:08x}"),
            params: Vec::new(),
            ret: ReturnType::Integer,
            state: FunctionState::Decoded,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<ParamType>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub const fn with_ret(mut self, ret: ReturnType) -> Self {
        self.ret = ret;
        self
    }

    pub const fn state(&self) -> FunctionState {
        self.state
    }

    /// Move to `to`, rejecting illegal transitions.
    pub fn advance(&mut self, to: FunctionState) -> Result<(), StateError> {
        self.state = self.state.advance(to)?;
        Ok(())
    }

    /// First address past the function.
    pub const fn end(&self) -> u64 {
        self.address + self.size
    }

    pub const fn contains(&self, address: u64) -> bool {
        address >= self.address && address < self.end()
    }

    /// IR parameter types of the function signature.
    pub fn ir_params(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.ir_type()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_happy_path() {
        let mut f = Function::new(0x1000, 8);
        assert_eq!(f.state(), FunctionState::Decoded);
        for next in [
            FunctionState::Translated,
            FunctionState::PassesRunning,
            FunctionState::PassesComplete,
            FunctionState::Emitted,
        ] {
            f.advance(next).unwrap();
        }
        assert!(f.state().is_terminal());
    }

    #[test]
    fn test_illegal_transitions() {
        let mut f = Function::new(0x1000, 8);
        assert_eq!(
            f.advance(FunctionState::Emitted),
            Err(StateError {
                from: FunctionState::Decoded,
                to: FunctionState::Emitted
            })
        );
        assert_eq!(f.state(), FunctionState::Decoded);

        let failed = FunctionState::PassesRunning
            .advance(FunctionState::PassFailed)
            .unwrap();
        assert!(failed.is_terminal());
        assert!(failed.advance(FunctionState::Emitted).is_err());
        assert!(!FunctionState::PassesComplete.can_advance(FunctionState::PassFailed));
        assert!(!FunctionState::Translated.can_advance(FunctionState::Translated));
    }

    #[test]
    fn test_signature_types() {
        let f = Function::new(0x2000, 4)
            .with_params(vec![ParamType::Integer, ParamType::Float])
            .with_ret(ReturnType::Float);
        assert_eq!(f.ir_params(), vec![Type::I64, Type::F64]);
        assert_eq!(f.ret.ir_type(), Some(Type::F64));
        assert_eq!(ReturnType::FloatX3.ir_type(), None);
        assert_eq!(f.name, "func_00002000");
        assert!(f.contains(0x2000) && !f.contains(0x2004));
    }
}
