use super::ir::*;

use crate::graph;

use std::collections::HashMap;

pub(super) struct Compiler<'graph> {
    signal_exprs: HashMap<&'graph graph::Signal<'graph>, Expr>,
}

impl<'graph> Compiler<'graph> {
    pub fn new() -> Compiler<'graph> {
        Compiler {
            signal_exprs: HashMap::new(),
        }
    }

    pub fn compile_signal(
        &mut self,
        signal: &'graph graph::Signal<'graph>,
        a: &mut NodeContext,
    ) -> Expr {
        enum Frame<'graph> {
            Enter(&'graph graph::Signal<'graph>),
            Leave(&'graph graph::Signal<'graph>),
        }

        let mut frames = Vec::new();
        frames.push(Frame::Enter(signal));

        let mut results = Vec::new();

        while let Some(frame) = frames.pop() {
            let (signal, expr) = match frame {
                Frame::Enter(signal) => {
                    if let Some(expr) = self.signal_exprs.get(&signal) {
                        results.push(expr.clone());
                        continue;
                    }

                    match signal.data {
                        graph::SignalData::Lit {
                            ref value,
                            bit_width,
                        } => (
                            signal,
                            Expr::Constant {
                                bit_width,
                                value: value.value(),
                            },
                        ),

                        graph::SignalData::Input { ref name, .. } => (
                            signal,
                            Expr::Ref {
                                name: port_name(name),
                            },
                        ),

                        graph::SignalData::Reg { data } => (
                            signal,
                            Expr::Ref {
                                name: data.name.clone(),
                            },
                        ),
                        graph::SignalData::Wire { data } => (
                            signal,
                            Expr::Ref {
                                name: data.name.clone(),
                            },
                        ),

                        graph::SignalData::UnOp { source, .. }
                        | graph::SignalData::Bits { source, .. }
                        | graph::SignalData::Repeat { source, .. } => {
                            frames.push(Frame::Leave(signal));
                            frames.push(Frame::Enter(source));
                            continue;
                        }
                        graph::SignalData::BinOp { lhs, rhs, .. }
                        | graph::SignalData::Concat { lhs, rhs } => {
                            frames.push(Frame::Leave(signal));
                            frames.push(Frame::Enter(lhs));
                            frames.push(Frame::Enter(rhs));
                            continue;
                        }

                        graph::SignalData::Mux {
                            cond,
                            when_true,
                            when_false,
                        } => {
                            frames.push(Frame::Leave(signal));
                            frames.push(Frame::Enter(cond));
                            frames.push(Frame::Enter(when_true));
                            frames.push(Frame::Enter(when_false));
                            continue;
                        }
                    }
                }
                Frame::Leave(signal) => {
                    let expr = match signal.data {
                        graph::SignalData::Lit { .. }
                        | graph::SignalData::Input { .. }
                        | graph::SignalData::Reg { .. }
                        | graph::SignalData::Wire { .. } => unreachable!(),

                        graph::SignalData::UnOp { op, .. } => {
                            let source = results.pop().unwrap();
                            Expr::prim_op(
                                match op {
                                    graph::UnOp::Not => PrimOp::Not,
                                },
                                vec![source],
                            )
                        }
                        graph::SignalData::BinOp { op, .. } => {
                            let lhs = results.pop().unwrap();
                            let rhs = results.pop().unwrap();
                            let args = vec![lhs, rhs];
                            match op {
                                // add and sub grow by a bit; keep the operand width
                                graph::BinOp::Add => truncate(Expr::prim_op(PrimOp::Add, args)),
                                graph::BinOp::Sub => truncate(Expr::prim_op(PrimOp::Sub, args)),
                                graph::BinOp::BitAnd => Expr::prim_op(PrimOp::And, args),
                                graph::BinOp::BitOr => Expr::prim_op(PrimOp::Or, args),
                                graph::BinOp::BitXor => Expr::prim_op(PrimOp::Xor, args),
                                graph::BinOp::Equal => Expr::prim_op(PrimOp::Eq, args),
                                graph::BinOp::NotEqual => Expr::prim_op(PrimOp::Neq, args),
                                graph::BinOp::LessThan => Expr::prim_op(PrimOp::Lt, args),
                                graph::BinOp::LessThanEqual => Expr::prim_op(PrimOp::Leq, args),
                                graph::BinOp::GreaterThan => Expr::prim_op(PrimOp::Gt, args),
                                graph::BinOp::GreaterThanEqual => {
                                    Expr::prim_op(PrimOp::Geq, args)
                                }
                            }
                        }

                        graph::SignalData::Bits {
                            range_high,
                            range_low,
                            ..
                        } => {
                            let source = results.pop().unwrap();
                            Expr::PrimOp {
                                op: PrimOp::Bits,
                                args: vec![source],
                                consts: vec![range_high, range_low],
                            }
                        }

                        graph::SignalData::Repeat { count, .. } => {
                            let source = results.pop().unwrap();
                            (1..count).fold(source.clone(), |acc, _| {
                                Expr::prim_op(PrimOp::Cat, vec![source.clone(), acc])
                            })
                        }
                        graph::SignalData::Concat { .. } => {
                            let lhs = results.pop().unwrap();
                            let rhs = results.pop().unwrap();
                            Expr::prim_op(PrimOp::Cat, vec![lhs, rhs])
                        }

                        graph::SignalData::Mux { .. } => {
                            let cond = results.pop().unwrap();
                            let when_true = results.pop().unwrap();
                            let when_false = results.pop().unwrap();
                            Expr::Mux {
                                cond: Box::new(cond),
                                when_true: Box::new(when_true),
                                when_false: Box::new(when_false),
                            }
                        }
                    };
                    (signal, a.gen_node(expr))
                }
            };

            self.signal_exprs.insert(signal, expr.clone());
            results.push(expr);
        }

        results.pop().unwrap()
    }
}

pub(super) fn port_name(name: &str) -> String {
    format!("io_{}", name)
}

fn truncate(expr: Expr) -> Expr {
    Expr::PrimOp {
        op: PrimOp::Tail,
        args: vec![expr],
        consts: vec![1],
    }
}
