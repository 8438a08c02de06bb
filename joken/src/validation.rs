use crate::error::ValidationError;
use crate::graph;
use crate::graph::SignalData;

use std::collections::HashSet;
use std::ptr;

/// Checks that `m` is complete enough to be simulated or exported.
///
/// Every register and wire must be driven, and no wire may depend on itself through combinational logic. Register reads break combinational paths.
///
/// # Examples
///
/// ```
/// use joken::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
/// let r = m.reg("r", 1);
///
/// assert!(validate_module(m).is_err());
///
/// r.drive_next(!r.value);
/// assert!(validate_module(m).is_ok());
/// ```
pub fn validate_module<'a>(m: &'a graph::Module<'a>) -> Result<(), ValidationError> {
    detect_undriven_registers_and_wires(m)?;
    detect_combinational_loops(m)
}

fn detect_undriven_registers_and_wires<'a>(m: &graph::Module<'a>) -> Result<(), ValidationError> {
    for register in m.registers.borrow().iter() {
        if !register.is_driven() {
            return Err(ValidationError::UndrivenRegister {
                module: m.name.clone(),
                name: register.data.name.clone(),
            });
        }
    }

    for wire in m.wires.borrow().iter() {
        if !wire.is_driven() {
            return Err(ValidationError::UndrivenWire {
                module: m.name.clone(),
                name: wire.data.name.clone(),
            });
        }
    }

    Ok(())
}

fn detect_combinational_loops<'a>(m: &graph::Module<'a>) -> Result<(), ValidationError> {
    for wire in m.wires.borrow().iter() {
        if let Some(source) = *wire.data.source.borrow() {
            if reaches_wire(source, wire.data) {
                return Err(ValidationError::CombinationalLoop {
                    module: m.name.clone(),
                    name: wire.data.name.clone(),
                });
            }
        }
    }

    Ok(())
}

fn reaches_wire<'a>(signal: &'a graph::Signal<'a>, target: &'a graph::WireData<'a>) -> bool {
    let mut visited = HashSet::new();
    let mut signals = vec![signal];

    while let Some(signal) = signals.pop() {
        if !visited.insert(signal as *const graph::Signal) {
            continue;
        }

        match signal.data {
            SignalData::Lit { .. } | SignalData::Input { .. } | SignalData::Reg { .. } => (),

            SignalData::Wire { data } => {
                if ptr::eq(data, target) {
                    return true;
                }
                if let Some(source) = *data.source.borrow() {
                    signals.push(source);
                }
            }

            SignalData::UnOp { source, .. } => signals.push(source),
            SignalData::BinOp { lhs, rhs, .. } => {
                signals.push(lhs);
                signals.push(rhs);
            }

            SignalData::Bits { source, .. } => signals.push(source),

            SignalData::Repeat { source, .. } => signals.push(source),
            SignalData::Concat { lhs, rhs } => {
                signals.push(lhs);
                signals.push(rhs);
            }

            SignalData::Mux {
                cond,
                when_true,
                when_false,
            } => {
                signals.push(cond);
                signals.push(when_true);
                signals.push(when_false);
            }
        }
    }

    false
}
