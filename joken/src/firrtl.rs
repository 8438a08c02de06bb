//! [FIRRTL](https://github.com/chipsalliance/firrtl-spec) code generation.

mod compiler;
mod ir;

use compiler::*;
use ir::*;

use crate::code_writer;
use crate::error::GenerateError;
use crate::graph;
use crate::validation::validate_module;

use log::debug;

use std::io::Write;

/// Writes `m` as a single-module FIRRTL circuit with the same name.
///
/// The module gets implicit `clock` and `reset` ports, and every input and output is prefixed with `io_`. Registers with a default value take it while `reset` is high. Shared subexpressions are emitted once, as `node`s.
///
/// # Errors
///
/// Fails if `m` doesn't pass [`validate_module`](../fn.validate_module.html), if a register or wire is named `clock` or `reset` or starts with `io_` or `_T_`, or if writing fails.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), joken::GenerateError> {
/// use joken::*;
///
/// let c = Context::new();
///
/// let m = c.module("Inverter");
/// let i = m.input("i", 1);
/// m.output("o", !i);
///
/// let mut buffer = Vec::new();
/// firrtl::generate(m, &mut buffer)?;
///
/// let firrtl = String::from_utf8(buffer).unwrap();
/// assert!(firrtl.contains("node _T_0 = not(io_i)"));
/// assert!(firrtl.contains("io_o <= _T_0"));
/// # Ok(())
/// # }
/// ```
pub fn generate<'a, W: Write>(m: &'a graph::Module<'a>, w: W) -> Result<(), GenerateError> {
    validate_module(m)?;
    check_reserved_names(m)?;

    let mut c = Compiler::new();
    let mut nodes = NodeContext::new();
    let mut connects = Vec::new();

    for wire in m.wires.borrow().iter() {
        if let Some(source) = *wire.data.source.borrow() {
            connects.push(Connect {
                target_name: wire.data.name.clone(),
                expr: c.compile_signal(source, &mut nodes),
            });
        }
    }

    for register in m.registers.borrow().iter() {
        if let Some(next) = *register.data.next.borrow() {
            let next = c.compile_signal(next, &mut nodes);
            let expr = match *register.data.initial_value.borrow() {
                Some(initial_value) => Expr::Mux {
                    cond: Box::new(Expr::Ref {
                        name: "reset".into(),
                    }),
                    when_true: Box::new(Expr::Constant {
                        bit_width: register.data.bit_width,
                        value: initial_value.value(),
                    }),
                    when_false: Box::new(next),
                },
                None => next,
            };
            connects.push(Connect {
                target_name: register.data.name.clone(),
                expr,
            });
        }
    }

    for (name, &output) in m.outputs.borrow().iter() {
        connects.push(Connect {
            target_name: port_name(name),
            expr: c.compile_signal(output, &mut nodes),
        });
    }

    debug!(
        "Generating FIRRTL for module \"{}\": {} node(s), {} connection(s)",
        m.name,
        nodes.len(),
        connects.len()
    );

    let mut w = code_writer::CodeWriter::new(w);

    w.append_line(&format!("circuit {} :", m.name))?;
    w.indent();
    w.append_line(&format!("module {} :", m.name))?;
    w.indent();

    w.append_line("input clock : Clock")?;
    w.append_line("input reset : UInt<1>")?;
    for (name, input) in m.inputs.borrow().iter() {
        w.append_line(&format!(
            "input {} : UInt<{}>",
            port_name(name),
            input.bit_width()
        ))?;
    }
    for (name, output) in m.outputs.borrow().iter() {
        w.append_line(&format!(
            "output {} : UInt<{}>",
            port_name(name),
            output.bit_width()
        ))?;
    }
    w.append_newline()?;

    let registers = m.registers.borrow();
    let wires = m.wires.borrow();
    if !registers.is_empty() || !wires.is_empty() {
        for register in registers.iter() {
            w.append_line(&format!(
                "reg {} : UInt<{}>, clock with :",
                register.data.name, register.data.bit_width
            ))?;
            w.indent();
            w.append_line(&format!(
                "reset => (UInt<1>(\"h0\"), {})",
                register.data.name
            ))?;
            w.unindent()?;
        }
        for wire in wires.iter() {
            w.append_line(&format!(
                "wire {} : UInt<{}>",
                wire.data.name, wire.data.bit_width
            ))?;
        }
        w.append_newline()?;
    }

    if !nodes.is_empty() {
        nodes.write(&mut w)?;
        w.append_newline()?;
    }

    if connects.is_empty() {
        w.append_line("skip")?;
    }
    for connect in connects.iter() {
        connect.write(&mut w)?;
    }

    w.unindent()?;
    w.unindent()?;

    Ok(())
}

// Implicit ports, `io_`-prefixed ports and generated nodes
fn is_reserved_name(name: &str) -> bool {
    name == "clock" || name == "reset" || name.starts_with("io_") || name.starts_with("_T_")
}

fn check_reserved_names<'a>(m: &'a graph::Module<'a>) -> Result<(), GenerateError> {
    let registers = m.registers.borrow();
    let wires = m.wires.borrow();
    let names = registers
        .iter()
        .map(|register| &register.data.name)
        .chain(wires.iter().map(|wire| &wire.data.name));
    for name in names {
        if is_reserved_name(name) {
            return Err(GenerateError::ReservedName {
                module: m.name.clone(),
                name: name.clone(),
            });
        }
    }

    Ok(())
}
