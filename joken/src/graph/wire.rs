use super::signal::*;

use std::cell::RefCell;
use std::ptr;

/// A named combinational signal, created by the [`Module`]::[`wire`] method.
///
/// A `Wire`'s [`value`] can be used before the wire is driven, which makes it a natural target for a [`ConditionalBlock`]. Unlike a [`Register`], a `Wire` has no memory: on every path of a conditional block that doesn't assign it, it's zero.
///
/// [`ConditionalBlock`]: ./struct.ConditionalBlock.html
/// [`Module`]: ./struct.Module.html
/// [`Register`]: ./struct.Register.html
/// [`value`]: #structfield.value
/// [`wire`]: ./struct.Module.html#method.wire
#[must_use]
pub struct Wire<'a> {
    pub(crate) data: &'a WireData<'a>,

    /// This `Wire`'s value.
    pub value: &'a Signal<'a>,
}

impl<'a> Wire<'a> {
    /// Returns the name of this `Wire`.
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Returns the bit width of this `Wire`.
    pub fn bit_width(&self) -> u32 {
        self.data.bit_width
    }

    /// Drives this `Wire` with `source`.
    ///
    /// # Panics
    ///
    /// Panics if `source` belongs to a different module than `self`, if the bit widths of `source` and this `Wire` aren't equal, or if this `Wire` is already driven.
    pub fn drive(&'a self, source: &'a Signal<'a>) {
        if !ptr::eq(self.value.module, source.module) {
            panic!("Attempted to drive a wire with a signal from another module.");
        }
        if source.bit_width() != self.data.bit_width {
            panic!(
                "Attempted to drive wire \"{}\" with {} bit(s) with a signal with {} bit(s).",
                self.data.name,
                self.data.bit_width,
                source.bit_width()
            );
        }
        let mut current = self.data.source.borrow_mut();
        if current.is_some() {
            panic!(
                "Attempted to drive wire \"{}\", but this wire is already driven.",
                self.data.name
            );
        }
        *current = Some(source);
    }

    pub(crate) fn is_driven(&self) -> bool {
        self.data.source.borrow().is_some()
    }
}

pub(crate) struct WireData<'a> {
    pub name: String,
    pub bit_width: u32,
    pub source: RefCell<Option<&'a Signal<'a>>>,
}
