use thiserror::Error;

/// Error codes prefixed by phase: P = program syntax, E = expression syntax,
/// S = semantic, R = resource limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Program syntax
    P001, // block opened but never closed with `end`
    P002, // block header without a trailing `do`
    P003, // `end` with no open block
    P004, // block header missing its name / expression
    P005, // unknown block keyword before `do`
    P006, // blocks nested too deeply

    // Expression syntax
    E001, // unexpected character
    E002, // unexpected token
    E003, // stray closing bracket
    E004, // unexpected end of expression
    E005, // mismatched bracket
    E006, // expression nested too deeply

    // Semantic
    S001, // command not defined
    S002, // unknown expression function
    S003, // wrong argument count
    S004, // undefined variable
    S005, // invalid function definition
    S006, // built-in function redefined
    S007, // argument of the wrong kind
    S008, // unknown operator
    S009, // invalid color
    S010, // not callable

    // Resource limits
    R001, // command budget exhausted
    R002, // recursion-event budget exhausted
    R003, // maximum call depth exceeded
}

/// Coarse error classes. Resource errors mean the program ran too long,
/// the others that it is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Semantic,
    Resource,
}

impl ErrorCode {
    pub fn kind(&self) -> ErrorKind {
        match self.as_str().as_bytes()[0] {
            b'P' | b'E' => ErrorKind::Syntax,
            b'R' => ErrorKind::Resource,
            _ => ErrorKind::Semantic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::P003 => "P003",
            Self::P004 => "P004",
            Self::P005 => "P005",
            Self::P006 => "P006",
            Self::E001 => "E001",
            Self::E002 => "E002",
            Self::E003 => "E003",
            Self::E004 => "E004",
            Self::E005 => "E005",
            Self::E006 => "E006",
            Self::S001 => "S001",
            Self::S002 => "S002",
            Self::S003 => "S003",
            Self::S004 => "S004",
            Self::S005 => "S005",
            Self::S006 => "S006",
            Self::S007 => "S007",
            Self::S008 => "S008",
            Self::S009 => "S009",
            Self::S010 => "S010",
            Self::R001 => "R001",
            Self::R002 => "R002",
            Self::R003 => "R003",
        }
    }
}

// ─── Program errors ──────────────────────────────────────────────────────────

/// Any failure of a `draw` run. `line` is the 1-based source line, 0 when the
/// error did not originate from a program line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{}] line {line}: {message}", code.as_str())]
pub struct Error {
    pub code: ErrorCode,
    pub line: usize,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, line: usize, message: impl Into<String>) -> Self {
        Self { code, line, message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn from_expr(err: ExprError, line: usize) -> Self {
        Self::new(err.code(), line, err.to_string())
    }
}

// ─── Expression errors ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),
    #[error("unmatched closing bracket `{0}`")]
    StrayClosing(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expected `{expected}` but found `{found}`")]
    Mismatched { expected: char, found: String },
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("`{name}` expects {expected} argument(s), got {got}")]
    Arity { name: String, expected: usize, got: usize },
    #[error("invalid function signature `{0}`")]
    InvalidSignature(String),
    #[error("parameter `{0}` must be a plain name")]
    InvalidParameter(String),
    #[error("cannot redefine built-in function `{0}`")]
    BuiltinShadow(String),
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),
    #[error("empty expression")]
    Empty,
    #[error("expression nested deeper than {0} levels")]
    NestedTooDeep(usize),
    #[error("function calls nested deeper than {0}")]
    TooDeep(usize),
}

impl ExprError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnexpectedChar(_) => ErrorCode::E001,
            Self::UnexpectedToken(_) => ErrorCode::E002,
            Self::StrayClosing(_) => ErrorCode::E003,
            Self::UnexpectedEnd | Self::Empty => ErrorCode::E004,
            Self::Mismatched { .. } => ErrorCode::E005,
            Self::NestedTooDeep(_) => ErrorCode::E006,
            Self::UndefinedVariable(_) => ErrorCode::S004,
            Self::UnknownFunction(_) => ErrorCode::S002,
            Self::Arity { .. } => ErrorCode::S003,
            Self::InvalidSignature(_) | Self::InvalidParameter(_) => ErrorCode::S005,
            Self::BuiltinShadow(_) => ErrorCode::S006,
            Self::UnknownOperator(_) => ErrorCode::S008,
            Self::TooDeep(_) => ErrorCode::R003,
        }
    }
}
