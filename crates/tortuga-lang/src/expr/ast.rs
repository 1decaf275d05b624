#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or, And,
    BitOr, BitAnd,
    Eq, NotEq,
    Lt, LtEq, Gt, GtEq,
    Add, Sub,
    Mul, Div, IntDiv,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp { Plus, Neg, Not }

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Binary { op: BinOp, left: Box<Expr>, right: Box<Expr> },
    Unary { op: UnOp, operand: Box<Expr> },
    Call { name: String, args: Vec<Expr> },
}

impl BinOp {
    /// Binding power, lowest first. `^` is the only right-associative one.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::BitOr => 3,
            BinOp::BitAnd => 4,
            BinOp::Eq | BinOp::NotEq => 5,
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => 6,
            BinOp::Add | BinOp::Sub => 7,
            BinOp::Mul | BinOp::Div | BinOp::IntDiv => 8,
            BinOp::Pow => 9,
        }
    }

    pub fn is_right_assoc(self) -> bool { self == BinOp::Pow }

    pub fn from_symbol(sym: &str) -> Option<BinOp> {
        Some(match sym {
            "||" => BinOp::Or,
            "&&" => BinOp::And,
            "|" => BinOp::BitOr,
            "&" => BinOp::BitAnd,
            "==" | "===" => BinOp::Eq,
            "!=" | "!==" => BinOp::NotEq,
            "<" => BinOp::Lt,
            "<=" => BinOp::LtEq,
            ">" => BinOp::Gt,
            ">=" => BinOp::GtEq,
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "//" => BinOp::IntDiv,
            "^" => BinOp::Pow,
            _ => return None,
        })
    }
}

impl UnOp {
    pub fn from_symbol(sym: &str) -> Option<UnOp> {
        match sym {
            "+" => Some(UnOp::Plus),
            "-" => Some(UnOp::Neg),
            "!" => Some(UnOp::Not),
            _ => None,
        }
    }
}
