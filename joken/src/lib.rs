//! An [HDL](https://en.wikipedia.org/wiki/Hardware_description_language) embedded in [Rust](https://www.rust-lang.org/), built around prioritized conditional assignment.
//!
//! joken provides an API to describe [`Module`]s composed of [`Signal`]s, [`Register`]s and [`Wire`]s. Register and wire updates can be described with nested, prioritized conditions through a [`ConditionalBlock`], which lowers them into multiplexer chains. Modules can then be stepped with the reference [evaluator](sim/struct.Simulator.html) or exported as [FIRRTL](firrtl/fn.generate.html).
//!
//! # Examples
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use joken::*;
//!
//! let c = Context::new();
//!
//! let m = c.module("counter");
//! let enable = m.input("enable", 1);
//! let count = m.reg("count", 4);
//! count.default_value(0u32);
//!
//! // count.next = count + 1 when enabled, otherwise hold
//! let mut block = m.conditional();
//! let root = block.root();
//! let enabled = block.when(root, enable)?;
//! block.assign_under(enabled, count, count.value + m.lit(1u32, 4))?;
//! block.finish()?;
//!
//! m.output("count", count.value);
//!
//! let mut sim = sim::Simulator::new(m)?;
//! sim.step(&[("enable", 1)])?;
//! sim.step(&[("enable", 0)])?;
//! sim.step(&[("enable", 1)])?;
//! assert_eq!(sim.register_value(count), 2);
//!
//! firrtl::generate(m, std::io::stdout())?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ConditionalBlock`]: ./struct.ConditionalBlock.html
//! [`Module`]: ./struct.Module.html
//! [`Register`]: ./struct.Register.html
//! [`Signal`]: ./struct.Signal.html
//! [`Wire`]: ./struct.Wire.html

mod code_writer;
mod error;
mod graph;
mod validation;

pub mod firrtl;
pub mod rtllib;
pub mod sim;
pub mod trace;

pub use error::*;
pub use graph::*;
pub use validation::validate_module;
