//! Implementation methods for AST enum types.
//!
//! Legacy compilers encode several of these enums as boolean flags; the
//! constructors below recover the modern value from those flags.

use crate::nodes::{
    DataLocation, FunctionCallKind, FunctionKind, Mutability, StateMutability, Visibility,
};

impl FunctionKind {
    /// Legacy records only flag constructors; a nameless non-constructor is the fallback.
    pub(crate) fn from_legacy(is_constructor: bool, name: &str) -> Self {
        if is_constructor {
            FunctionKind::Constructor
        } else if name.is_empty() {
            FunctionKind::Fallback
        } else {
            FunctionKind::Function
        }
    }
}

impl StateMutability {
    pub(crate) fn from_legacy(payable: bool, constant: bool) -> Self {
        if payable {
            StateMutability::Payable
        } else if constant {
            StateMutability::Constant
        } else {
            StateMutability::NonPayable
        }
    }

    /// Returns `true` for `pure`, `view` and the pre-0.5 `constant`.
    #[must_use]
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            StateMutability::Pure | StateMutability::View | StateMutability::Constant
        )
    }
}

impl Mutability {
    pub(crate) fn from_constant(constant: bool) -> Self {
        if constant {
            Mutability::Constant
        } else {
            Mutability::Mutable
        }
    }
}

impl FunctionCallKind {
    pub(crate) fn from_legacy(type_conversion: bool, struct_constructor: bool) -> Self {
        if type_conversion {
            FunctionCallKind::TypeConversion
        } else if struct_constructor {
            FunctionCallKind::StructConstructorCall
        } else {
            FunctionCallKind::FunctionCall
        }
    }
}

impl Visibility {
    #[must_use]
    pub fn is_externally_visible(self) -> bool {
        matches!(self, Visibility::External | Visibility::Public)
    }
}

impl DataLocation {
    #[must_use]
    pub fn is_reference_location(self) -> bool {
        !matches!(self, DataLocation::Default)
    }
}
