use super::constant::*;
use super::signal::*;

use std::cell::RefCell;
use std::ptr;

/// A hardware register, created by the [`Module`]::[`reg`] method.
///
/// A `Register` is a stateful component that behaves like a [D flip-flop](https://en.wikipedia.org/wiki/Flip-flop_(electronics)#D_flip-flop) (more precisely as a [positive-edge-triggered D flip-flop](https://en.wikipedia.org/wiki/Flip-flop_(electronics)#Classical_positive-edge-triggered_D_flip-flop)).
///
/// It always has a current value represented by the [`value`] field (often referred to as `Q`) and a next value specified by the [`drive_next`] method (often referred to as `D`). When the register is the target of a [`ConditionalBlock`], its value is held on every path that doesn't assign it.
///
/// # Examples
///
/// ```
/// use joken::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
///
/// let my_reg = m.reg("my_reg", 32);
/// my_reg.default_value(0xfadebabeu32);
/// my_reg.drive_next(!my_reg.value);
/// m.output("my_output", my_reg.value);
/// ```
///
/// [`ConditionalBlock`]: ./struct.ConditionalBlock.html
/// [`drive_next`]: #method.drive_next
/// [`Module`]: ./struct.Module.html
/// [`reg`]: ./struct.Module.html#method.reg
/// [`value`]: #structfield.value
#[must_use]
pub struct Register<'a> {
    pub(crate) data: &'a RegisterData<'a>,

    /// This `Register`'s current value.
    pub value: &'a Signal<'a>,
}

impl<'a> Register<'a> {
    /// Returns the name of this `Register`.
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Returns the bit width of this `Register`.
    pub fn bit_width(&self) -> u32 {
        self.data.bit_width
    }

    /// Specifies the value this `Register` takes when the design is reset.
    ///
    /// Registers without a default value reset to zero in the [`Simulator`](./sim/struct.Simulator.html).
    ///
    /// # Panics
    ///
    /// Panics if this `Register` already has a default value, or if `value` doesn't fit into this `Register`'s bit width.
    pub fn default_value<C: Into<Constant>>(&'a self, value: C) {
        let value = value.into();
        let mut initial_value = self.data.initial_value.borrow_mut();
        if initial_value.is_some() {
            panic!(
                "Attempted to specify a default value for register \"{}\", but this register already has a default value.",
                self.data.name
            );
        }
        if value.required_bits() > self.data.bit_width {
            panic!("Cannot specify a default value for register \"{}\" of '{}', as it doesn't fit into this register's bit width of {} bit(s).", self.data.name, value.value(), self.data.bit_width);
        }
        *initial_value = Some(value);
    }

    /// Specifies the next value for this `Register`.
    ///
    /// A `Register` can only be driven once.
    ///
    /// # Panics
    ///
    /// Panics if `n` belongs to a different module than `self`, if the bit widths of `n` and this `Register` aren't equal, or if this `Register` is already driven.
    pub fn drive_next(&'a self, n: &'a Signal<'a>) {
        if !ptr::eq(self.value.module, n.module) {
            panic!("Attempted to drive a register with a signal from another module.");
        }
        if n.bit_width() != self.data.bit_width {
            panic!("Attempted to drive register \"{}\" with {} bit(s) with a signal with {} bit(s).", self.data.name, self.data.bit_width, n.bit_width());
        }
        let mut next = self.data.next.borrow_mut();
        if next.is_some() {
            panic!(
                "Attempted to drive register \"{}\", but this register is already driven.",
                self.data.name
            );
        }
        *next = Some(n);
    }

    pub(crate) fn is_driven(&self) -> bool {
        self.data.next.borrow().is_some()
    }
}

pub(crate) struct RegisterData<'a> {
    pub name: String,
    pub initial_value: RefCell<Option<Constant>>,
    pub bit_width: u32,
    pub next: RefCell<Option<&'a Signal<'a>>>,
}
