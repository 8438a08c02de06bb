use crate::code_writer;

use std::io::Write;

type Result = std::result::Result<(), code_writer::Error>;

pub struct NodeDecl {
    pub name: String,
    pub expr: Expr,
}

impl NodeDecl {
    fn write<W: Write>(&self, w: &mut code_writer::CodeWriter<W>) -> Result {
        w.append_indent()?;
        w.append(&format!("node {} = ", self.name))?;
        self.expr.write(w)?;
        w.append_newline()?;

        Ok(())
    }
}

pub struct NodeContext {
    nodes: Vec<NodeDecl>,
}

impl NodeContext {
    pub fn new() -> NodeContext {
        NodeContext { nodes: Vec::new() }
    }

    pub fn gen_node(&mut self, expr: Expr) -> Expr {
        let name = format!("_T_{}", self.nodes.len());

        self.nodes.push(NodeDecl {
            name: name.clone(),
            expr,
        });

        Expr::Ref { name }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn write<W: Write>(&self, w: &mut code_writer::CodeWriter<W>) -> Result {
        for node in self.nodes.iter() {
            node.write(w)?;
        }

        Ok(())
    }
}

pub struct Connect {
    pub target_name: String,
    pub expr: Expr,
}

impl Connect {
    pub fn write<W: Write>(&self, w: &mut code_writer::CodeWriter<W>) -> Result {
        w.append_indent()?;
        w.append(&format!("{} <= ", self.target_name))?;
        self.expr.write(w)?;
        w.append_newline()?;

        Ok(())
    }
}

#[derive(Clone)]
pub enum Expr {
    Constant {
        bit_width: u32,
        value: u128,
    },
    Mux {
        cond: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
    },
    PrimOp {
        op: PrimOp,
        args: Vec<Expr>,
        consts: Vec<u32>,
    },
    Ref {
        name: String,
    },
}

impl Expr {
    pub fn prim_op(op: PrimOp, args: Vec<Expr>) -> Expr {
        Expr::PrimOp {
            op,
            args,
            consts: Vec::new(),
        }
    }

    pub fn write<W: Write>(&self, w: &mut code_writer::CodeWriter<W>) -> Result {
        match self {
            Expr::Constant { bit_width, value } => {
                w.append(&format!("UInt<{}>(\"h{:x}\")", bit_width, value))?;
            }
            Expr::Mux {
                cond,
                when_true,
                when_false,
            } => {
                w.append("mux(")?;
                cond.write(w)?;
                w.append(", ")?;
                when_true.write(w)?;
                w.append(", ")?;
                when_false.write(w)?;
                w.append(")")?;
            }
            Expr::PrimOp { op, args, consts } => {
                w.append(&format!("{}(", op.name()))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        w.append(", ")?;
                    }
                    arg.write(w)?;
                }
                for value in consts.iter() {
                    w.append(&format!(", {}", value))?;
                }
                w.append(")")?;
            }
            Expr::Ref { name } => {
                w.append(name)?;
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy)]
pub enum PrimOp {
    Add,
    And,
    Bits,
    Cat,
    Eq,
    Geq,
    Gt,
    Leq,
    Lt,
    Neq,
    Not,
    Or,
    Sub,
    Tail,
    Xor,
}

impl PrimOp {
    fn name(self) -> &'static str {
        match self {
            PrimOp::Add => "add",
            PrimOp::And => "and",
            PrimOp::Bits => "bits",
            PrimOp::Cat => "cat",
            PrimOp::Eq => "eq",
            PrimOp::Geq => "geq",
            PrimOp::Gt => "gt",
            PrimOp::Leq => "leq",
            PrimOp::Lt => "lt",
            PrimOp::Neq => "neq",
            PrimOp::Not => "not",
            PrimOp::Or => "or",
            PrimOp::Sub => "sub",
            PrimOp::Tail => "tail",
            PrimOp::Xor => "xor",
        }
    }
}
