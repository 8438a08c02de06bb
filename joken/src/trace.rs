//! Signal value histories recorded by the [`Simulator`](../sim/struct.Simulator.html), and sinks to replay them into.

pub mod vcd;

use crate::error::TraceError;

use std::io;

#[derive(Debug, Eq, PartialEq)]
pub enum TraceValue {
    /// Contains a boolean value
    Bool(bool),
    /// Contains an unsigned, 32-bit value
    U32(u32),
    /// Contains an unsigned, 64-bit value
    U64(u64),
    /// Contains an unsigned, 128-bit value
    U128(u128),
}

impl TraceValue {
    fn new(value: u128, type_: &TraceValueType) -> TraceValue {
        match type_ {
            TraceValueType::Bool => TraceValue::Bool(value != 0),
            TraceValueType::U32 => TraceValue::U32(value as _),
            TraceValueType::U64 => TraceValue::U64(value as _),
            TraceValueType::U128 => TraceValue::U128(value),
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum TraceValueType {
    Bool,
    U32,
    U64,
    U128,
}

impl TraceValueType {
    pub(crate) fn from_bit_width(bit_width: u32) -> TraceValueType {
        if bit_width == 1 {
            TraceValueType::Bool
        } else if bit_width <= 32 {
            TraceValueType::U32
        } else if bit_width <= 64 {
            TraceValueType::U64
        } else {
            TraceValueType::U128
        }
    }
}

/// A sink for recorded signal values, such as a [`VcdTrace`](vcd/struct.VcdTrace.html).
///
/// Signals are declared between [`push_module`](#tymethod.push_module) and [`pop_module`](#tymethod.pop_module); values follow, grouped by time stamp.
pub trait Trace {
    type SignalId;

    fn push_module(&mut self, name: &str) -> io::Result<()>;
    fn pop_module(&mut self) -> io::Result<()>;
    fn add_signal(
        &mut self,
        name: &str,
        bit_width: u32,
        type_: TraceValueType,
    ) -> io::Result<Self::SignalId>;

    fn update_time_stamp(&mut self, time_stamp: u64) -> io::Result<()>;
    fn update_signal(&mut self, signal_id: &Self::SignalId, value: TraceValue) -> io::Result<()>;
}

/// The values a single named signal took, one per simulated cycle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TracedSignal {
    name: String,
    bit_width: u32,
    values: Vec<u128>,
}

impl TracedSignal {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    pub fn values(&self) -> &[u128] {
        &self.values
    }
}

/// Per-cycle values of every named signal of a simulated module.
///
/// Each call to [`Simulator::step`](../sim/struct.Simulator.html#method.step) appends one value to every signal, sampled before registers are clocked.
#[derive(Clone, Debug, Default)]
pub struct SimTrace {
    signals: Vec<TracedSignal>,
    len: usize,
}

impl SimTrace {
    pub(crate) fn new<I: IntoIterator<Item = (String, u32)>>(signals: I) -> SimTrace {
        SimTrace {
            signals: signals
                .into_iter()
                .map(|(name, bit_width)| TracedSignal {
                    name,
                    bit_width,
                    values: Vec::new(),
                })
                .collect(),
            len: 0,
        }
    }

    // `values` follows the order the signals were declared in
    pub(crate) fn record(&mut self, values: &[u128]) {
        for (signal, &value) in self.signals.iter_mut().zip(values.iter()) {
            signal.values.push(value);
        }
        self.len += 1;
    }

    /// Returns the history of the signal called `name`, if it was traced.
    pub fn signal(&self, name: &str) -> Option<&TracedSignal> {
        self.signals.iter().find(|signal| signal.name == name)
    }

    pub fn signals(&self) -> impl Iterator<Item = &TracedSignal> {
        self.signals.iter()
    }

    /// Returns the number of recorded cycles.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Renders the signals named in `order` as a text waveform, one line per signal.
    ///
    /// 1-bit signals are drawn with `_` (low) and `-` (high); wider signals are printed as hex values, one column per cycle.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use joken::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("MyModule");
    /// let i = m.input("i", 1);
    /// let r = m.reg("r", 4);
    /// r.default_value(0u32);
    /// r.drive_next(r.value + i.repeat(4));
    ///
    /// let mut sim = sim::Simulator::new(m)?;
    /// sim.step(&[("i", 0)])?;
    /// sim.step(&[("i", 1)])?;
    /// sim.step(&[("i", 1)])?;
    ///
    /// assert_eq!(sim.trace().render(&["i", "r"])?, "i __----\nr 0 0 f\n");
    /// # Ok(())
    /// # }
    /// ```
    pub fn render(&self, order: &[&str]) -> Result<String, TraceError> {
        let signals = self.signals_in(order)?;

        let name_width = signals
            .iter()
            .map(|signal| signal.name.len())
            .max()
            .unwrap_or(0);
        let column_width = signals
            .iter()
            .filter(|signal| signal.bit_width > 1)
            .map(|signal| ((signal.bit_width + 3) / 4) as usize)
            .max()
            .unwrap_or(1);

        let mut ret = String::new();
        for signal in signals {
            let mut line = format!("{:<width$} ", signal.name, width = name_width);
            for &value in signal.values.iter() {
                if signal.bit_width == 1 {
                    let level = if value != 0 { "-" } else { "_" };
                    line.push_str(&level.repeat(column_width + 1));
                } else {
                    line.push_str(&format!(
                        "{:<width$}",
                        format!("{:x}", value),
                        width = column_width + 1
                    ));
                }
            }
            ret.push_str(line.trim_end());
            ret.push('\n');
        }

        Ok(ret)
    }

    /// Replays the signals named in `order` into `trace`, inside a single module scope called `module_name`.
    ///
    /// Cycle `n` is replayed at time stamp `n`. Every signal's value is emitted for the first cycle; after that, only changes are.
    pub fn replay<T: Trace>(
        &self,
        module_name: &str,
        order: &[&str],
        trace: &mut T,
    ) -> Result<(), TraceError> {
        let signals = self.signals_in(order)?;

        trace.push_module(module_name)?;
        let mut ids = Vec::with_capacity(signals.len());
        for signal in signals.iter() {
            ids.push(trace.add_signal(
                &signal.name,
                signal.bit_width,
                TraceValueType::from_bit_width(signal.bit_width),
            )?);
        }
        trace.pop_module()?;

        for cycle in 0..self.len {
            trace.update_time_stamp(cycle as _)?;
            for (signal, id) in signals.iter().zip(ids.iter()) {
                let value = signal.values[cycle];
                if cycle > 0 && signal.values[cycle - 1] == value {
                    continue;
                }
                let type_ = TraceValueType::from_bit_width(signal.bit_width);
                trace.update_signal(id, TraceValue::new(value, &type_))?;
            }
        }

        Ok(())
    }

    fn signals_in(&self, order: &[&str]) -> Result<Vec<&TracedSignal>, TraceError> {
        order
            .iter()
            .map(|&name| {
                self.signal(name).ok_or_else(|| TraceError::UnknownSignal {
                    name: name.to_owned(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace() -> SimTrace {
        let mut trace = SimTrace::new(vec![("a".to_owned(), 1), ("state".to_owned(), 12)]);
        trace.record(&[0, 0x5]);
        trace.record(&[1, 0x5]);
        trace.record(&[1, 0xabc]);
        trace
    }

    #[derive(Default)]
    struct CapturingTrace {
        events: Vec<String>,
    }

    impl Trace for CapturingTrace {
        type SignalId = String;

        fn push_module(&mut self, name: &str) -> io::Result<()> {
            self.events.push(format!("push {}", name));
            Ok(())
        }

        fn pop_module(&mut self) -> io::Result<()> {
            self.events.push("pop".to_owned());
            Ok(())
        }

        fn add_signal(
            &mut self,
            name: &str,
            bit_width: u32,
            type_: TraceValueType,
        ) -> io::Result<Self::SignalId> {
            self.events
                .push(format!("add {} {} {:?}", name, bit_width, type_));
            Ok(name.to_owned())
        }

        fn update_time_stamp(&mut self, time_stamp: u64) -> io::Result<()> {
            self.events.push(format!("time {}", time_stamp));
            Ok(())
        }

        fn update_signal(
            &mut self,
            signal_id: &Self::SignalId,
            value: TraceValue,
        ) -> io::Result<()> {
            self.events.push(format!("{} = {:?}", signal_id, value));
            Ok(())
        }
    }

    #[test]
    fn from_bit_width() {
        assert_eq!(TraceValueType::from_bit_width(1), TraceValueType::Bool);
        assert_eq!(TraceValueType::from_bit_width(2), TraceValueType::U32);
        assert_eq!(TraceValueType::from_bit_width(32), TraceValueType::U32);
        assert_eq!(TraceValueType::from_bit_width(33), TraceValueType::U64);
        assert_eq!(TraceValueType::from_bit_width(64), TraceValueType::U64);
        assert_eq!(TraceValueType::from_bit_width(65), TraceValueType::U128);
        assert_eq!(TraceValueType::from_bit_width(128), TraceValueType::U128);
    }

    #[test]
    fn render_in_requested_order() {
        let trace = trace();

        assert_eq!(trace.len(), 3);
        assert_eq!(
            trace.render(&["state", "a"]).unwrap(),
            "state 5   5   abc\n\
             a     ____--------\n"
        );
    }

    #[test]
    fn render_unknown_signal_error() {
        let trace = trace();

        match trace.render(&["a", "b"]) {
            Err(TraceError::UnknownSignal { name }) => assert_eq!(name, "b"),
            _ => panic!("Expected an unknown signal error"),
        }
    }

    #[test]
    fn replay_emits_changes_only() {
        let trace = trace();
        let mut capture = CapturingTrace::default();

        trace.replay("top", &["a", "state"], &mut capture).unwrap();

        assert_eq!(
            capture.events,
            vec![
                "push top",
                "add a 1 Bool",
                "add state 12 U32",
                "pop",
                "time 0",
                "a = Bool(false)",
                "state = U32(5)",
                "time 1",
                "a = Bool(true)",
                "time 2",
                "state = U32(2748)",
            ]
        );
    }

    #[test]
    fn signal_lookup() {
        let trace = trace();

        let state = trace.signal("state").unwrap();
        assert_eq!(state.name(), "state");
        assert_eq!(state.bit_width(), 12);
        assert_eq!(state.values(), &[0x5, 0x5, 0xabc]);
        assert!(trace.signal("missing").is_none());
        assert_eq!(trace.signals().count(), 2);
        assert!(!trace.is_empty());
        assert!(SimTrace::default().is_empty());
    }
}
