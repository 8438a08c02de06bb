use super::conditional::*;
use super::constant::*;
use super::context::*;
use super::register::*;
use super::signal::*;
use super::wire::*;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ptr;

/// A self-contained hardware design unit, created by the [`Context`]::[`module`] method.
///
/// # Examples
///
/// ```
/// use joken::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
/// m.output("out", m.input("in", 1));
/// ```
///
/// [`Context`]: ./struct.Context.html
/// [`module`]: ./struct.Context.html#method.module
#[must_use]
pub struct Module<'a> {
    context: &'a Context<'a>,

    pub(crate) name: String,

    pub(crate) inputs: RefCell<BTreeMap<String, &'a Signal<'a>>>,
    pub(crate) outputs: RefCell<BTreeMap<String, &'a Signal<'a>>>,
    pub(crate) registers: RefCell<Vec<&'a Register<'a>>>,
    pub(crate) wires: RefCell<Vec<&'a Wire<'a>>>,

    signal_names: RefCell<BTreeMap<String, &'static str>>,
}

impl<'a> Module<'a> {
    pub(super) fn new(context: &'a Context<'a>, name: String) -> Module<'a> {
        Module {
            context,

            name,

            inputs: RefCell::new(BTreeMap::new()),
            outputs: RefCell::new(BTreeMap::new()),
            registers: RefCell::new(Vec::new()),
            wires: RefCell::new(Vec::new()),

            signal_names: RefCell::new(BTreeMap::new()),
        }
    }

    /// Returns the name of this `Module`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a [`Signal`] that represents the constant literal specified by `value` with `bit_width` bits.
    ///
    /// The bit width of the type provided by `value` doesn't need to match `bit_width`, but the value represented by `value` must fit into `bit_width` bits.
    ///
    /// # Panics
    ///
    /// Panics if `bit_width` is less than [`MIN_SIGNAL_BIT_WIDTH`] or greater than [`MAX_SIGNAL_BIT_WIDTH`], respectively, or if the specified `value` doesn't fit into `bit_width` bits.
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
    /// let eight_bit_const = m.lit(0xffu32, 8);
    /// let one_bit_const = m.lit(0u32, 1);
    /// let twenty_seven_bit_const = m.lit(true, 27);
    /// ```
    ///
    /// [`MIN_SIGNAL_BIT_WIDTH`]: ./constant.MIN_SIGNAL_BIT_WIDTH.html
    /// [`MAX_SIGNAL_BIT_WIDTH`]: ./constant.MAX_SIGNAL_BIT_WIDTH.html
    /// [`Signal`]: ./struct.Signal.html
    pub fn lit<C: Into<Constant>>(&'a self, value: C, bit_width: u32) -> &'a Signal<'a> {
        check_bit_width("a literal", bit_width);
        let value = value.into();
        let required_bits = value.required_bits();
        if required_bits > bit_width {
            panic!("Cannot fit the specified value '{}' into the specified bit width '{}'. The value '{}' requires a bit width of at least {} bit(s).", value.value(), bit_width, value.value(), required_bits);
        }
        self.alloc_signal(SignalData::Lit { value, bit_width })
    }

    /// Convenience method to create a [`Signal`] that represents a single `0` bit.
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn low(&'a self) -> &'a Signal<'a> {
        self.lit(false, 1)
    }

    /// Convenience method to create a [`Signal`] that represents a single `1` bit.
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn high(&'a self) -> &'a Signal<'a> {
        self.lit(true, 1)
    }

    /// Creates an input for this `Module` called `name` with `bit_width` bits, and returns a [`Signal`] that represents the value of this input.
    ///
    /// # Panics
    ///
    /// Panics if `bit_width` is out of range, or if an input, output, register, or wire called `name` already exists in this `Module`.
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
    /// let my_input = m.input("my_input", 80);
    /// ```
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn input<S: Into<String>>(&'a self, name: S, bit_width: u32) -> &'a Signal<'a> {
        let name = name.into();
        check_bit_width("an input", bit_width);
        if self.outputs.borrow().contains_key(&name) {
            panic!(
                "Module \"{}\" already has an output called \"{}\".",
                self.name, name
            );
        }
        self.claim_signal_name(&name, "an input");
        let input = self.alloc_signal(SignalData::Input {
            name: name.clone(),
            bit_width,
        });
        self.inputs.borrow_mut().insert(name, input);
        input
    }

    /// Creates an output for this `Module` called `name` with the same number of bits as `source`, and drives this output with `source`.
    ///
    /// # Panics
    ///
    /// Panics if `source` doesn't belong to this `Module`, or if an input or output called `name` already exists in this `Module`.
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
    /// let some_signal = m.high();
    /// m.output("my_output", some_signal);
    /// ```
    pub fn output<S: Into<String>>(&'a self, name: S, source: &'a Signal<'a>) {
        let name = name.into();
        if !ptr::eq(self, source.module) {
            panic!("Cannot output a signal from another module.");
        }
        if self.inputs.borrow().contains_key(&name) {
            panic!(
                "Module \"{}\" already has an input called \"{}\".",
                self.name, name
            );
        }
        let mut outputs = self.outputs.borrow_mut();
        if outputs.contains_key(&name) {
            panic!(
                "Module \"{}\" already has an output called \"{}\".",
                self.name, name
            );
        }
        outputs.insert(name, source);
    }

    /// Creates a [`Register`] in this `Module` called `name` with `bit_width` bits.
    ///
    /// # Panics
    ///
    /// Panics if `bit_width` is out of range, or if an input, register, or wire called `name` already exists in this `Module`.
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
    /// [`Register`]: ./struct.Register.html
    pub fn reg<S: Into<String>>(&'a self, name: S, bit_width: u32) -> &'a Register<'a> {
        let name = name.into();
        check_bit_width("a register", bit_width);
        self.claim_signal_name(&name, "a register");
        let data = self.context.register_data_arena.alloc(RegisterData {
            name,
            initial_value: RefCell::new(None),
            bit_width,
            next: RefCell::new(None),
        });
        let value = self.alloc_signal(SignalData::Reg { data });
        let register = self.context.register_arena.alloc(Register { data, value });
        self.registers.borrow_mut().push(register);
        register
    }

    /// Creates a [`Wire`] in this `Module` called `name` with `bit_width` bits.
    ///
    /// A wire is a named combinational signal that is driven after it's declared, typically by a [`ConditionalBlock`], where it falls back to zero on every path that doesn't assign it.
    ///
    /// # Panics
    ///
    /// Panics if `bit_width` is out of range, or if an input, register, or wire called `name` already exists in this `Module`.
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
    /// let w = m.wire("w", 8);
    /// w.drive(m.input("i", 8));
    /// m.output("o", w.value);
    /// ```
    ///
    /// [`ConditionalBlock`]: ./struct.ConditionalBlock.html
    /// [`Wire`]: ./struct.Wire.html
    pub fn wire<S: Into<String>>(&'a self, name: S, bit_width: u32) -> &'a Wire<'a> {
        let name = name.into();
        check_bit_width("a wire", bit_width);
        self.claim_signal_name(&name, "a wire");
        let data = self.context.wire_data_arena.alloc(WireData {
            name,
            bit_width,
            source: RefCell::new(None),
        });
        let value = self.alloc_signal(SignalData::Wire { data });
        let wire = self.context.wire_arena.alloc(Wire { data, value });
        self.wires.borrow_mut().push(wire);
        wire
    }

    /// Creates a 2:1 [multiplexer](https://en.wikipedia.org/wiki/Multiplexer) that represents `when_true`'s value when `cond` is high, and `when_false`'s value when `cond` is low.
    ///
    /// This is equivalent to `cond.mux(when_true, when_false)`.
    ///
    /// # Panics
    ///
    /// Panics if `cond`, `when_true`, or `when_false` belong to a different `Module` than `self`, if `cond`'s bit width is not 1, or if the bit widths of `when_true` and `when_false` aren't equal.
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
    /// let cond = m.input("cond", 1);
    /// let a = m.input("a", 8);
    /// let b = m.input("b", 8);
    /// m.output("my_output", m.mux(cond, a, b)); // Outputs a when cond is high, b otherwise
    /// ```
    pub fn mux(
        &'a self,
        cond: &'a Signal<'a>,
        when_true: &'a Signal<'a>,
        when_false: &'a Signal<'a>,
    ) -> &'a Signal<'a> {
        if !ptr::eq(self, cond.module) {
            panic!("Attempted to combine signals from different modules.");
        }
        cond.mux(when_true, when_false)
    }

    /// Starts a new [`ConditionalBlock`] for describing prioritized, nested conditional assignments to this `Module`'s registers and wires.
    ///
    /// [`ConditionalBlock`]: ./struct.ConditionalBlock.html
    pub fn conditional(&'a self) -> ConditionalBlock<'a> {
        ConditionalBlock::new(self, self.context.alloc_block_id())
    }

    pub(super) fn alloc_signal(&'a self, data: SignalData<'a>) -> &'a Signal<'a> {
        self.context.signal_arena.alloc(Signal { module: self, data })
    }

    // Inputs, registers and wires share one namespace
    fn claim_signal_name(&self, name: &str, kind: &'static str) {
        let mut signal_names = self.signal_names.borrow_mut();
        if let Some(existing) = signal_names.get(name) {
            panic!(
                "Module \"{}\" already has {} called \"{}\".",
                self.name, existing, name
            );
        }
        signal_names.insert(name.to_owned(), kind);
    }
}

fn check_bit_width(what: &str, bit_width: u32) {
    if bit_width < MIN_SIGNAL_BIT_WIDTH {
        panic!(
            "Cannot create {} with {} bit(s). Signals must not be narrower than {} bit(s).",
            what, bit_width, MIN_SIGNAL_BIT_WIDTH
        );
    }
    if bit_width > MAX_SIGNAL_BIT_WIDTH {
        panic!(
            "Cannot create {} with {} bit(s). Signals must not be wider than {} bit(s).",
            what, bit_width, MAX_SIGNAL_BIT_WIDTH
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(
        expected = "Cannot create a literal with 0 bit(s). Signals must not be narrower than 1 bit(s)."
    )]
    fn lit_bit_width_lt_min_error() {
        let c = Context::new();

        let m = c.module("a");

        // Panic
        let _ = m.lit(false, 0);
    }

    #[test]
    #[should_panic(
        expected = "Cannot create a literal with 129 bit(s). Signals must not be wider than 128 bit(s)."
    )]
    fn lit_bit_width_gt_max_error() {
        let c = Context::new();

        let m = c.module("a");

        // Panic
        let _ = m.lit(false, 129);
    }

    #[test]
    #[should_panic(
        expected = "Cannot fit the specified value '128' into the specified bit width '7'. The value '128' requires a bit width of at least 8 bit(s)."
    )]
    fn lit_value_cannot_fit_into_bit_width_error() {
        let c = Context::new();

        let m = c.module("a");

        // Panic
        let _ = m.lit(128u32, 7);
    }

    #[test]
    #[should_panic(
        expected = "Cannot create an input with 129 bit(s). Signals must not be wider than 128 bit(s)."
    )]
    fn input_width_gt_max_error() {
        let c = Context::new();

        let m = c.module("a");

        // Panic
        let _ = m.input("i", 129);
    }

    #[test]
    #[should_panic(expected = "Module \"a\" already has an input called \"i\".")]
    fn input_duplicate_name_error() {
        let c = Context::new();

        let m = c.module("a");
        let _ = m.input("i", 1);

        // Panic
        let _ = m.input("i", 2);
    }

    #[test]
    #[should_panic(expected = "Cannot output a signal from another module.")]
    fn output_separate_module_error() {
        let c = Context::new();

        let m1 = c.module("a");

        let m2 = c.module("b");
        let i = m2.high();

        // Panic
        m1.output("a", i);
    }

    #[test]
    #[should_panic(expected = "Module \"a\" already has a register called \"state\".")]
    fn reg_wire_name_collision_error() {
        let c = Context::new();

        let m = c.module("a");
        let _ = m.reg("state", 3);

        // Panic
        let _ = m.wire("state", 3);
    }

    #[test]
    #[should_panic(expected = "Module \"a\" already has an input called \"x\".")]
    fn reg_input_name_collision_error() {
        let c = Context::new();

        let m = c.module("a");
        let _ = m.input("x", 4);

        // Panic
        let _ = m.reg("x", 4);
    }

    #[test]
    #[should_panic(expected = "Module \"a\" already has a wire called \"x\".")]
    fn input_wire_name_collision_error() {
        let c = Context::new();

        let m = c.module("a");
        let _ = m.wire("x", 4);

        // Panic
        let _ = m.input("x", 4);
    }

    #[test]
    #[should_panic(expected = "Module \"a\" already has an input called \"x\".")]
    fn output_input_name_collision_error() {
        let c = Context::new();

        let m = c.module("a");
        let x = m.input("x", 1);

        // Panic
        m.output("x", !x);
    }

    #[test]
    #[should_panic(expected = "Module \"a\" already has an output called \"x\".")]
    fn input_output_name_collision_error() {
        let c = Context::new();

        let m = c.module("a");
        m.output("x", m.high());

        // Panic
        let _ = m.input("x", 1);
    }

    #[test]
    #[should_panic(
        expected = "Cannot create a wire with 0 bit(s). Signals must not be narrower than 1 bit(s)."
    )]
    fn wire_bit_width_lt_min_error() {
        let c = Context::new();

        let m = c.module("a");

        // Panic
        let _ = m.wire("w", 0);
    }

    #[test]
    #[should_panic(expected = "Attempted to combine signals from different modules.")]
    fn mux_separate_module_error() {
        let c = Context::new();

        let a = c.module("a");
        let b = c.module("b");

        // Panic
        let _ = a.mux(b.high(), b.low(), b.high());
    }

    #[test]
    fn conditional_blocks_get_distinct_ids() {
        let c = Context::new();

        let m = c.module("a");
        let b1 = m.conditional();
        let b2 = m.conditional();

        assert_ne!(b1.root(), b2.root());
    }
}
