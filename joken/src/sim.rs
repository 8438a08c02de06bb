//! Cycle-based reference evaluator for a single [`Module`](../struct.Module.html).

use crate::error::SimError;
use crate::graph::*;
use crate::trace::SimTrace;
use crate::validation::validate_module;

use log::{debug, trace};

use std::cell::RefCell;
use std::collections::HashMap;

/// Steps a validated [`Module`] one clock cycle at a time.
///
/// All values are unsigned and at most 128 bits wide. Arithmetic wraps at each signal's bit width, and comparisons are unsigned. Inputs that were never given a value read as zero in [`peek`], but [`step`] requires every input to have been set at least once.
///
/// Every named signal is recorded into a [`SimTrace`] on each [`step`]: inputs, registers, wires, and outputs whose names don't collide with a register or wire. Inputs, registers and wires share a namespace within a module, so each of them is traced under its own name.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), joken::SimError> {
/// use joken::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
/// let i = m.input("i", 8);
/// let r = m.reg("r", 8);
/// r.default_value(0xffu32);
/// r.drive_next(r.value + i);
/// m.output("o", r.value);
///
/// let mut sim = sim::Simulator::new(m)?;
/// assert_eq!(sim.output("o")?, 0xff);
/// sim.step(&[("i", 2)])?;
/// assert_eq!(sim.output("o")?, 0x01);
/// assert_eq!(sim.cycle(), 1);
/// # Ok(())
/// # }
/// ```
///
/// [`Module`]: ../struct.Module.html
/// [`peek`]: #method.peek
/// [`SimTrace`]: ../trace/struct.SimTrace.html
/// [`step`]: #method.step
pub struct Simulator<'a> {
    module: &'a Module<'a>,

    inputs: HashMap<String, u128>,
    registers: HashMap<*const RegisterData<'a>, u128>,
    cache: RefCell<HashMap<*const Signal<'a>, u128>>,

    cycle: u64,
    trace: SimTrace,
}

impl<'a> Simulator<'a> {
    /// Validates `m` and creates a `Simulator` for it, in its reset state.
    pub fn new(m: &'a Module<'a>) -> Result<Simulator<'a>, SimError> {
        validate_module(m)?;

        let mut ret = Simulator {
            module: m,

            inputs: HashMap::new(),
            registers: HashMap::new(),
            cache: RefCell::new(HashMap::new()),

            cycle: 0,
            trace: SimTrace::default(),
        };
        ret.reset();

        Ok(ret)
    }

    /// Returns every register to its default value (or zero), forgets all input values, and clears the trace.
    pub fn reset(&mut self) {
        debug!("Resetting simulator for module \"{}\"", self.module.name);

        self.registers = self
            .module
            .registers
            .borrow()
            .iter()
            .map(|register| {
                let value = register
                    .data
                    .initial_value
                    .borrow()
                    .map_or(0, |value| value.value());
                (register.data as *const _, value)
            })
            .collect();
        self.inputs.clear();
        self.cache.borrow_mut().clear();

        self.cycle = 0;
        self.trace = SimTrace::new(self.traced_signals());
    }

    /// Sets input `name` to `value` until it's set again.
    pub fn set_input(&mut self, name: &str, value: u128) -> Result<(), SimError> {
        let bit_width = match self.module.inputs.borrow().get(name) {
            Some(input) => input.bit_width(),
            None => {
                return Err(SimError::UnknownInput {
                    name: name.to_owned(),
                })
            }
        };
        if value & !mask(bit_width) != 0 {
            return Err(SimError::InputOverflow {
                name: name.to_owned(),
                value,
                bit_width,
            });
        }

        self.inputs.insert(name.to_owned(), value);
        self.cache.borrow_mut().clear();

        Ok(())
    }

    /// Evaluates `signal` with the current input and register values.
    pub fn peek(&self, signal: &'a Signal<'a>) -> u128 {
        enum Frame<'a> {
            Enter(&'a Signal<'a>),
            Leave(&'a Signal<'a>),
        }

        let mut cache = self.cache.borrow_mut();
        let mut frames = vec![Frame::Enter(signal)];
        let mut results = Vec::new();

        while let Some(frame) = frames.pop() {
            match frame {
                Frame::Enter(signal) => {
                    if let Some(&value) = cache.get(&(signal as *const _)) {
                        results.push(value);
                        continue;
                    }

                    match signal.data {
                        SignalData::Lit { ref value, .. } => results.push(value.value()),

                        SignalData::Input { ref name, .. } => {
                            results.push(self.inputs.get(name).copied().unwrap_or(0))
                        }

                        SignalData::Reg { data } => results.push(
                            self.registers
                                .get(&(data as *const _))
                                .copied()
                                .unwrap_or(0),
                        ),
                        SignalData::Wire { data } => match *data.source.borrow() {
                            Some(source) => {
                                frames.push(Frame::Leave(signal));
                                frames.push(Frame::Enter(source));
                            }
                            None => results.push(0),
                        },

                        SignalData::UnOp { source, .. }
                        | SignalData::Bits { source, .. }
                        | SignalData::Repeat { source, .. } => {
                            frames.push(Frame::Leave(signal));
                            frames.push(Frame::Enter(source));
                        }
                        SignalData::BinOp { lhs, rhs, .. } | SignalData::Concat { lhs, rhs } => {
                            frames.push(Frame::Leave(signal));
                            frames.push(Frame::Enter(lhs));
                            frames.push(Frame::Enter(rhs));
                        }

                        SignalData::Mux {
                            cond,
                            when_true,
                            when_false,
                        } => {
                            frames.push(Frame::Leave(signal));
                            frames.push(Frame::Enter(cond));
                            frames.push(Frame::Enter(when_true));
                            frames.push(Frame::Enter(when_false));
                        }
                    }
                }
                Frame::Leave(signal) => {
                    let value = match signal.data {
                        SignalData::Wire { .. } => results.pop().unwrap(),

                        SignalData::UnOp { op, .. } => {
                            let source = results.pop().unwrap();
                            match op {
                                UnOp::Not => !source,
                            }
                        }
                        SignalData::BinOp { op, .. } => {
                            let lhs = results.pop().unwrap();
                            let rhs = results.pop().unwrap();
                            match op {
                                BinOp::Add => lhs.wrapping_add(rhs),
                                BinOp::BitAnd => lhs & rhs,
                                BinOp::BitOr => lhs | rhs,
                                BinOp::BitXor => lhs ^ rhs,
                                BinOp::Equal => (lhs == rhs) as u128,
                                BinOp::GreaterThan => (lhs > rhs) as u128,
                                BinOp::GreaterThanEqual => (lhs >= rhs) as u128,
                                BinOp::LessThan => (lhs < rhs) as u128,
                                BinOp::LessThanEqual => (lhs <= rhs) as u128,
                                BinOp::NotEqual => (lhs != rhs) as u128,
                                BinOp::Sub => lhs.wrapping_sub(rhs),
                            }
                        }

                        SignalData::Bits { range_low, .. } => {
                            let source = results.pop().unwrap();
                            source >> range_low
                        }

                        SignalData::Repeat { source, count } => {
                            let value = results.pop().unwrap();
                            let bit_width = source.bit_width();
                            (0..count).fold(0, |acc, _| shl(acc, bit_width) | value)
                        }
                        SignalData::Concat { rhs, .. } => {
                            let lhs_value = results.pop().unwrap();
                            let rhs_value = results.pop().unwrap();
                            shl(lhs_value, rhs.bit_width()) | rhs_value
                        }

                        SignalData::Mux { .. } => {
                            let cond = results.pop().unwrap();
                            let when_true = results.pop().unwrap();
                            let when_false = results.pop().unwrap();
                            if cond != 0 {
                                when_true
                            } else {
                                when_false
                            }
                        }

                        SignalData::Lit { .. } | SignalData::Input { .. } | SignalData::Reg { .. } => {
                            unreachable!()
                        }
                    } & mask(signal.bit_width());

                    cache.insert(signal as *const _, value);
                    results.push(value);
                }
            }
        }

        results.pop().unwrap()
    }

    /// Evaluates the output called `name`.
    pub fn output(&self, name: &str) -> Result<u128, SimError> {
        let source = self.module.outputs.borrow().get(name).copied();
        match source {
            Some(source) => Ok(self.peek(source)),
            None => Err(SimError::UnknownOutput {
                name: name.to_owned(),
            }),
        }
    }

    /// Returns the current value of `register`.
    pub fn register_value(&self, register: &'a Register<'a>) -> u128 {
        self.peek(register.value)
    }

    /// Sets `inputs`, records every named signal into the trace, then clocks all registers simultaneously.
    ///
    /// Inputs not listed keep their previous values.
    pub fn step(&mut self, inputs: &[(&str, u128)]) -> Result<(), SimError> {
        for &(name, value) in inputs.iter() {
            self.set_input(name, value)?;
        }
        if let Some(name) = self
            .module
            .inputs
            .borrow()
            .keys()
            .find(|name| !self.inputs.contains_key(name.as_str()))
        {
            return Err(SimError::MissingInput { name: name.clone() });
        }

        let values = self.sample_traced_signals();
        self.trace.record(&values);

        let next_values = self
            .module
            .registers
            .borrow()
            .iter()
            .map(|register| {
                let next = match *register.data.next.borrow() {
                    Some(next) => self.peek(next),
                    None => self.peek(register.value),
                };
                (register.data as *const _, next)
            })
            .collect::<Vec<_>>();
        self.registers.extend(next_values);
        self.cache.borrow_mut().clear();

        trace!(
            "Module \"{}\" finished cycle {}",
            self.module.name,
            self.cycle
        );
        self.cycle += 1;

        Ok(())
    }

    /// Returns the number of cycles stepped since the last reset.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn trace(&self) -> &SimTrace {
        &self.trace
    }

    // Inputs, registers, wires, then outputs with names not yet taken
    fn traced_signals(&self) -> Vec<(String, u32)> {
        self.traced_sources()
            .into_iter()
            .map(|(name, signal)| (name, signal.bit_width()))
            .collect()
    }

    fn sample_traced_signals(&self) -> Vec<u128> {
        self.traced_sources()
            .into_iter()
            .map(|(_, signal)| self.peek(signal))
            .collect()
    }

    fn traced_sources(&self) -> Vec<(String, &'a Signal<'a>)> {
        let mut ret = Vec::new();
        for (name, &input) in self.module.inputs.borrow().iter() {
            ret.push((name.clone(), input));
        }
        for register in self.module.registers.borrow().iter() {
            ret.push((register.data.name.clone(), register.value));
        }
        for wire in self.module.wires.borrow().iter() {
            ret.push((wire.data.name.clone(), wire.value));
        }
        for (name, &output) in self.module.outputs.borrow().iter() {
            if !ret.iter().any(|(traced_name, _)| traced_name == name) {
                ret.push((name.clone(), output));
            }
        }
        ret
    }
}

fn mask(bit_width: u32) -> u128 {
    if bit_width >= 128 {
        u128::MAX
    } else {
        (1 << bit_width) - 1
    }
}

fn shl(value: u128, shift: u32) -> u128 {
    value.checked_shl(shift).unwrap_or(0)
}
