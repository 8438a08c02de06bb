//! Error types reported while building, validating, simulating and exporting designs.

use crate::code_writer;

use thiserror::Error;

use std::io;
use std::num::ParseIntError;

/// Errors raised while declaring or resolving a [`ConditionalBlock`].
///
/// All of these are construction-time programmer errors; they are reported by the operation that detects them.
///
/// [`ConditionalBlock`]: ./struct.ConditionalBlock.html
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConditionalError {
    #[error("Branch does not belong to the conditional block of module \"{module}\".")]
    UnknownBranch { module: String },

    #[error("Cannot add a branch to a closed scope in module \"{module}\". Scopes are closed by `otherwise`, and the root branch has no scope.")]
    ClosedScope { module: String },

    #[error("Target \"{target}\" in module \"{module}\" is assigned more than once under the same branch.")]
    AmbiguousAssignment { module: String, target: String },

    #[error("Conditions must be 1 bit wide, but a {bit_width}-bit condition was given in module \"{module}\".")]
    PredicateWidth { module: String, bit_width: u32 },

    #[error("Cannot assign a {value_bit_width}-bit value to target \"{target}\" with {target_bit_width} bit(s) in module \"{module}\".")]
    WidthMismatch {
        module: String,
        target: String,
        target_bit_width: u32,
        value_bit_width: u32,
    },

    #[error("Attempted to use a signal or target from another module in the conditional block of module \"{module}\".")]
    ForeignSignal { module: String },

    #[error("Target \"{target}\" in module \"{module}\" is already driven.")]
    TargetAlreadyDriven { module: String, target: String },
}

/// Errors found by [`validate_module`](./fn.validate_module.html).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Module \"{module}\" contains a register called \"{name}\" which is not driven.")]
    UndrivenRegister { module: String, name: String },

    #[error("Module \"{module}\" contains a wire called \"{name}\" which is not driven.")]
    UndrivenWire { module: String, name: String },

    #[error("Module \"{module}\" contains a wire called \"{name}\" which forms a combinational loop with itself.")]
    CombinationalLoop { module: String, name: String },
}

/// Errors raised by the reference [`Simulator`](./sim/struct.Simulator.html).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Module has no input called \"{name}\".")]
    UnknownInput { name: String },

    #[error("Module has no output called \"{name}\".")]
    UnknownOutput { name: String },

    #[error("Cannot drive input \"{name}\" with value {value}, which doesn't fit into {bit_width} bit(s).")]
    InputOverflow {
        name: String,
        value: u128,
        bit_width: u32,
    },

    #[error("Input \"{name}\" was never given a value.")]
    MissingInput { name: String },
}

/// Errors raised while rendering or replaying a [`SimTrace`](./trace/struct.SimTrace.html).
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Trace has no signal called \"{name}\".")]
    UnknownSignal { name: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors raised by code generators such as [`firrtl::generate`](./firrtl/fn.generate.html).
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Module \"{module}\" contains a register or wire called \"{name}\", which is reserved in the generated code.")]
    ReservedName { module: String, name: String },

    #[error(transparent)]
    CodeWriter(#[from] code_writer::Error),
}

/// Errors raised while parsing numbers with [`rtllib::str_to_int_array`](./rtllib/fn.str_to_int_array.html).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Cannot parse \"{text}\" as a base {base} number.")]
    InvalidNumber {
        text: String,
        base: u32,
        #[source]
        source: ParseIntError,
    },
}
