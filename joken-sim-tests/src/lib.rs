//! End-to-end designs built with joken, stepped through its reference evaluator.

use joken::*;

pub const WAIT: u32 = 0;
pub const TOK1: u32 = 1;
pub const TOK2: u32 = 2;
pub const TOK3: u32 = 3;
pub const DISPENSE: u32 = 4;
pub const REFUND: u32 = 5;

const STATE_BIT_WIDTH: u32 = 3;

/// A vending machine that dispenses after four tokens and refunds on request.
pub fn vending_machine<'a>(c: &'a Context<'a>) -> Result<&'a Module<'a>, ConditionalError> {
    let m = c.module("vending_machine");

    let token_in = m.input("token_in", 1);
    let req_refund = m.input("req_refund", 1);

    let state = m.reg("state", STATE_BIT_WIDTH);
    state.default_value(WAIT);
    let is = |value: u32| state.value.eq(m.lit(value, STATE_BIT_WIDTH));
    let to = |value: u32| m.lit(value, STATE_BIT_WIDTH);

    let mut block = m.conditional();
    let root = block.root();

    let refunding = block.when(root, req_refund)?;
    block.assign_under(refunding, state, to(REFUND))?;

    let finished = block.else_when(refunding, is(DISPENSE) | is(REFUND))?;
    block.assign_under(finished, state, to(WAIT))?;

    let token = block.else_when(finished, token_in)?;
    let mut branch = block.when(token, is(WAIT))?;
    block.assign_under(branch, state, to(TOK1))?;
    for &(from, to_state) in [(TOK1, TOK2), (TOK2, TOK3), (TOK3, DISPENSE)].iter() {
        branch = block.else_when(branch, is(from))?;
        block.assign_under(branch, state, to(to_state))?;
    }
    let extra_token = block.otherwise(branch)?;
    block.assign_under(extra_token, state, to(REFUND))?;

    block.finish()?;

    m.output("dispense", is(DISPENSE));
    m.output("refund", is(REFUND));

    Ok(m)
}

/// Grants the lowest-numbered of four requests; `grant` is zero when nothing is requested.
pub fn priority_arbiter<'a>(c: &'a Context<'a>) -> Result<&'a Module<'a>, ConditionalError> {
    let m = c.module("priority_arbiter");

    let requests = (0..4)
        .map(|i| m.input(format!("req{}", i), 1))
        .collect::<Vec<_>>();

    let grant = m.wire("grant", 2);
    let valid = m.wire("valid", 1);

    let mut block = m.conditional();
    let root = block.root();
    let mut branch = block.when(root, requests[0])?;
    block.assign_under(branch, valid, m.high())?;
    for (i, &request) in requests.iter().enumerate().skip(1) {
        branch = block.else_when(branch, request)?;
        block.assign_under(branch, grant, m.lit(i as u32, 2))?;
        block.assign_under(branch, valid, m.high())?;
    }
    block.finish()?;

    m.output("grant", grant.value);
    m.output("valid", valid.value);

    Ok(m)
}

/// Loads a 32-bit word, then reads back the byte chosen by `select`, holding the word while `hold` is high.
pub fn byte_selector<'a>(c: &'a Context<'a>) -> Result<&'a Module<'a>, ConditionalError> {
    let m = c.module("byte_selector");

    let load = m.input("load", 1);
    let hold = m.input("hold", 1);
    let data = m.input("data", 32);
    let select = m.input("select", 2);

    let word = m.reg("word", 32);
    word.default_value(0u32);

    let mut block = m.conditional();
    let root = block.root();
    block.assign_under(root, word, m.lit(0u32, 32))?;
    let holding = block.when(root, hold)?;
    block.assign_under(holding, word, word.value)?;
    let loading = block.else_when(holding, load)?;
    block.assign_under(loading, word, data)?;
    block.finish()?;

    let bytes = rtllib::partition(word.value, 8);
    m.output("byte", rtllib::mux_index(m, select, &bytes));

    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    use joken::sim::Simulator;
    use joken::trace::vcd::*;
    use joken::trace::*;

    use std::io;

    fn bits(pattern: &str) -> Vec<u128> {
        pattern.chars().map(|c| (c == '1') as u128).collect()
    }

    #[derive(Debug, Default, Eq, PartialEq)]
    struct Capture {
        module: Option<String>,
        signals: Vec<(String, u32)>,
        changes: Vec<(u64, usize, u128)>,

        time_stamp: u64,
    }

    impl Trace for Capture {
        type SignalId = usize;

        fn push_module(&mut self, name: &str) -> io::Result<()> {
            assert!(self.module.is_none());
            self.module = Some(name.to_owned());
            Ok(())
        }

        fn pop_module(&mut self) -> io::Result<()> {
            assert!(self.module.is_some());
            Ok(())
        }

        fn add_signal(
            &mut self,
            name: &str,
            bit_width: u32,
            _type_: TraceValueType,
        ) -> io::Result<Self::SignalId> {
            self.signals.push((name.to_owned(), bit_width));
            Ok(self.signals.len() - 1)
        }

        fn update_time_stamp(&mut self, time_stamp: u64) -> io::Result<()> {
            self.time_stamp = time_stamp;
            Ok(())
        }

        fn update_signal(&mut self, signal_id: &Self::SignalId, value: TraceValue) -> io::Result<()> {
            let value = match value {
                TraceValue::Bool(value) => value as u128,
                TraceValue::U32(value) => value as _,
                TraceValue::U64(value) => value as _,
                TraceValue::U128(value) => value,
            };
            self.changes.push((self.time_stamp, *signal_id, value));
            Ok(())
        }
    }

    fn run_vending_machine<'a>(m: &'a Module<'a>) -> Simulator<'a> {
        let token_in = bits("0010100111010000");
        let req_refund = bits("1100010000000000");

        let mut sim = Simulator::new(m).unwrap();
        for (&token_in, &req_refund) in token_in.iter().zip(req_refund.iter()) {
            sim.step(&[("token_in", token_in), ("req_refund", req_refund)])
                .unwrap();
        }
        sim
    }

    #[test]
    fn vending_machine_scenario() {
        let c = Context::new();

        let m = vending_machine(&c).unwrap();
        let sim = run_vending_machine(m);

        let trace = sim.trace();
        assert_eq!(trace.len(), 16);
        assert_eq!(
            trace.signal("state").unwrap().values(),
            &[0, 5, 5, 0, 0, 1, 5, 0, 1, 2, 3, 3, 4, 0, 0, 0]
        );
        assert_eq!(
            trace.signal("dispense").unwrap().values(),
            bits("0000000000001000").as_slice()
        );
        assert_eq!(
            trace.signal("refund").unwrap().values(),
            bits("0110001000000000").as_slice()
        );
    }

    #[test]
    fn vending_machine_render() {
        let c = Context::new();

        let m = vending_machine(&c).unwrap();
        let sim = run_vending_machine(m);

        assert_eq!(
            sim.trace()
                .render(&["token_in", "req_refund", "state", "dispense", "refund"])
                .unwrap(),
            "token_in   ____--__--____------__--________\n\
             req_refund ----______--____________________\n\
             state      0 5 5 0 0 1 5 0 1 2 3 3 4 0 0 0\n\
             dispense   ________________________--______\n\
             refund     __----______--__________________\n"
        );
    }

    #[test]
    fn vending_machine_refund_overrides_tokens() {
        let c = Context::new();

        let m = vending_machine(&c).unwrap();
        let mut sim = Simulator::new(m).unwrap();
        for _ in 0..3 {
            sim.step(&[("token_in", 1), ("req_refund", 0)]).unwrap();
        }
        assert_eq!(sim.trace().signal("state").unwrap().values(), &[0, 1, 2]);

        sim.step(&[("token_in", 1), ("req_refund", 1)]).unwrap();
        assert_eq!(sim.output("refund").unwrap(), 1);
        assert_eq!(sim.output("dispense").unwrap(), 0);
    }

    #[test]
    fn vending_machine_returns_to_wait_after_dispensing() {
        let c = Context::new();

        let m = vending_machine(&c).unwrap();
        let mut sim = Simulator::new(m).unwrap();
        for _ in 0..4 {
            sim.step(&[("token_in", 1), ("req_refund", 0)]).unwrap();
        }
        assert_eq!(sim.output("dispense").unwrap(), 1);

        // Tokens while dispensing are ignored
        sim.step(&[]).unwrap();
        assert_eq!(sim.output("dispense").unwrap(), 0);
        assert_eq!(sim.output("refund").unwrap(), 0);
    }

    #[test]
    fn vending_machine_replay() {
        let c = Context::new();

        let m = vending_machine(&c).unwrap();
        let sim = run_vending_machine(m);

        let mut capture = Capture::default();
        sim.trace()
            .replay("vending_machine", &["state", "dispense"], &mut capture)
            .unwrap();

        assert_eq!(capture.module, Some("vending_machine".to_owned()));
        assert_eq!(
            capture.signals,
            vec![("state".to_owned(), 3), ("dispense".to_owned(), 1)]
        );
        assert_eq!(
            capture.changes,
            vec![
                (0, 0, 0),
                (0, 1, 0),
                (1, 0, 5),
                (3, 0, 0),
                (5, 0, 1),
                (6, 0, 5),
                (7, 0, 0),
                (8, 0, 1),
                (9, 0, 2),
                (10, 0, 3),
                (12, 0, 4),
                (12, 1, 1),
                (13, 0, 0),
                (13, 1, 0),
            ]
        );
    }

    #[test]
    fn vending_machine_vcd() {
        let c = Context::new();

        let m = vending_machine(&c).unwrap();
        let sim = run_vending_machine(m);

        let mut buffer = Vec::new();
        {
            let mut vcd = VcdTrace::new(&mut buffer, 1, TimeScaleUnit::Ns).unwrap();
            sim.trace()
                .replay("vending_machine", &["state", "refund"], &mut vcd)
                .unwrap();
        }

        let vcd = String::from_utf8(buffer).unwrap();
        assert!(vcd.contains("$scope module vending_machine $end"));
        assert!(vcd.contains("#15"));
        assert!(vcd.contains("b101"));
    }

    #[test]
    fn vending_machine_firrtl() {
        let c = Context::new();

        let m = vending_machine(&c).unwrap();
        let mut buffer = Vec::new();
        firrtl::generate(m, &mut buffer).unwrap();
        let firrtl = String::from_utf8(buffer).unwrap();

        assert!(firrtl.starts_with("circuit vending_machine :\n  module vending_machine :\n"));
        assert!(firrtl.contains("    input io_req_refund : UInt<1>\n"));
        assert!(firrtl.contains("    input io_token_in : UInt<1>\n"));
        assert!(firrtl.contains("    output io_dispense : UInt<1>\n"));
        assert!(firrtl.contains("    reg state : UInt<3>, clock with :\n"));
        assert!(firrtl.contains("    state <= mux(reset, UInt<3>(\"h0\"), _T_"));
        assert!(firrtl.contains("mux(io_req_refund, UInt<3>(\"h5\"), _T_"));
    }

    #[test]
    fn priority_arbiter_grants_lowest_request() {
        let c = Context::new();

        let m = priority_arbiter(&c).unwrap();
        let mut sim = Simulator::new(m).unwrap();
        for requests in 0..16u128 {
            for i in 0..4 {
                sim.set_input(&format!("req{}", i), (requests >> i) & 1)
                    .unwrap();
            }
            let expected_grant = (0..4u128).find(|&i| requests & (1 << i) != 0);
            assert_eq!(sim.output("valid").unwrap(), expected_grant.is_some() as u128);
            assert_eq!(sim.output("grant").unwrap(), expected_grant.unwrap_or(0));
        }
    }

    #[test]
    fn byte_selector_loads_and_holds() {
        let c = Context::new();

        let m = byte_selector(&c).unwrap();
        let mut sim = Simulator::new(m).unwrap();

        sim.step(&[
            ("load", 1),
            ("hold", 0),
            ("data", 0xdeadbeef),
            ("select", 0),
        ])
        .unwrap();
        assert_eq!(sim.output("byte").unwrap(), 0xef);

        // Holding takes priority over loading
        sim.step(&[("load", 1), ("hold", 1), ("data", 0x12345678)])
            .unwrap();
        for (select, expected) in [0xef, 0xbe, 0xad, 0xde].iter().enumerate() {
            sim.set_input("select", select as u128).unwrap();
            assert_eq!(sim.output("byte").unwrap(), *expected);
        }

        // Neither holding nor loading clears the word
        sim.step(&[("load", 0), ("hold", 0)]).unwrap();
        assert_eq!(sim.output("byte").unwrap(), 0);
    }
}
