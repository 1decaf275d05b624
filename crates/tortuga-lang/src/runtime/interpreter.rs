//! Tree-walking interpreter. Runs a parsed program against one turtle and
//! writes what it draws into a [`Timeline`].

use std::collections::HashMap;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::{Config, Limits};
use crate::error::{Error, ErrorCode};
use crate::expr::Engine;
use crate::runtime::commands::Builtin;
use crate::runtime::turtle::{RunMeta, TurtleState};
use crate::runtime::value::{Context, Value};
use crate::syntax::ast::{Node, NodeKind};
use crate::syntax::parser::parse_program;
use crate::timeline::Timeline;
use crate::types::color::Color;

/// Result of one `draw` call, shaped for hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A `draw NAME ARGS do … end` definition.
#[derive(Debug)]
struct DslFunction {
    params: Vec<String>,
    body: Vec<Node>,
}

/// Deepest nesting of bodies being executed at once, counting call bodies
/// and `for`/`when` blocks alike.
const MAX_NESTING: usize = 2_048;

enum Callee {
    User(Rc<DslFunction>),
    Builtin(Builtin),
}

// ─── Interpreter ─────────────────────────────────────────────────────────────

/// Owns everything one program run touches. Every `draw` starts from a
/// reset, so separate instances never share state.
pub struct Interpreter {
    pub(super) config: Config,
    pub(super) state: TurtleState,
    pub(super) timeline: Timeline,
    pub(super) limits: Limits,
    pub(super) rng: StdRng,
    engine: Engine,
    functions: HashMap<String, Rc<DslFunction>>,
    nesting: usize,
}

impl Default for Interpreter {
    fn default() -> Self { Self::new(Config::default()) }
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        Self {
            state: TurtleState::new(&config),
            timeline: Timeline::new(),
            limits: config.limits.clamped(),
            rng: make_rng(config.seed),
            engine: Engine::new(),
            functions: HashMap::new(),
            nesting: 0,
            config,
        }
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn state(&self) -> &TurtleState { &self.state }

    pub fn timeline(&self) -> &Timeline { &self.timeline }

    pub fn limits(&self) -> &Limits { &self.limits }

    pub fn engine(&self) -> &Engine { &self.engine }

    /// Restores the initial pose, pen, counters and limits and forgets all
    /// drawing and every definition.
    pub fn reset(&mut self) {
        self.state = TurtleState::new(&self.config);
        self.timeline.clear();
        self.limits = self.config.limits.clamped();
        self.rng = make_rng(self.config.seed);
        self.engine.clear();
        self.functions.clear();
        self.nesting = 0;
    }

    /// Resets, parses and runs `source`. Failures are logged and reported in
    /// the result; the turtle keeps whatever state the run reached.
    pub fn draw(&mut self, source: &str) -> DrawResult {
        match self.run(source) {
            Ok(commands) => DrawResult { success: true, command_count: Some(commands), error: None },
            Err(e) => DrawResult {
                success: false,
                command_count: Some(self.state.commands),
                error: Some(e.to_string()),
            },
        }
    }

    /// Like [`draw`](Self::draw) but returns the typed error.
    pub fn run(&mut self, source: &str) -> Result<u64, Error> {
        self.reset();
        let outcome = match parse_program(source) {
            Ok(ast) => self.exec_body(&ast, &Context::root()).map(|()| ast),
            Err(e) => Err(e),
        };
        self.timeline.finish(self.state.pose());

        match outcome {
            Ok(ast) => {
                let commands = self.state.commands;
                log::debug!("run finished: {commands} command(s), end time {} ms", self.timeline.end_time());
                self.state.meta = RunMeta::Success { ast, commands };
                Ok(commands)
            }
            Err(e) => {
                log::warn!("draw failed: {e}");
                self.state.meta = RunMeta::Failure { message: e.to_string(), source: source.to_string() };
                Err(e)
            }
        }
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn exec_body(&mut self, nodes: &[Node], cx: &Context) -> Result<(), Error> {
        if self.nesting >= MAX_NESTING {
            let line = nodes.first().map_or(0, Node::line);
            return Err(Error::new(ErrorCode::R003, line,
                format!("program nested deeper than {MAX_NESTING} levels")));
        }
        self.nesting += 1;
        let result = self.exec_nodes(nodes, cx);
        self.nesting -= 1;
        result
    }

    fn exec_nodes(&mut self, nodes: &[Node], cx: &Context) -> Result<(), Error> {
        // Only the first satisfied `when` of this body runs.
        let mut latched = false;

        for node in nodes {
            match node.kind {
                NodeKind::Empty | NodeKind::Argument => {}
                NodeKind::Define => self.define(node),
                NodeKind::Loop => {
                    let n = self.eval_expr(&node.value, cx, node.line())?;
                    let count = if n.is_finite() && n > 0.0 { n.trunc() as u64 } else { 0 };
                    if node.children.iter().all(|c| c.kind == NodeKind::Empty) {
                        continue;
                    }
                    for _ in 0..count {
                        self.exec_body(&node.children, cx)?;
                    }
                }
                NodeKind::When => {
                    if latched {
                        continue;
                    }
                    let guard = self.eval_expr(&node.value, cx, node.line())?;
                    if guard != 0.0 && !guard.is_nan() {
                        latched = true;
                        self.exec_body(&node.children, cx)?;
                    }
                }
                NodeKind::Call => self.exec_call(node, cx)?,
            }
        }
        Ok(())
    }

    fn define(&mut self, node: &Node) {
        let params = node.params().map(str::to_string).collect();
        log::trace!("draw {}", node.value);
        self.functions.insert(
            node.value.clone(),
            Rc::new(DslFunction { params, body: node.children.clone() }),
        );
    }

    fn exec_call(&mut self, node: &Node, cx: &Context) -> Result<(), Error> {
        let line = node.line();
        if matches!(node.value.as_str(), "fn" | "make") {
            return self.define_expr(node);
        }

        let args = node.children.iter()
            .map(|a| self.eval_arg(a, cx))
            .collect::<Result<Vec<_>, _>>()?;

        match self.resolve(&node.value, cx, line)? {
            Callee::User(f) => self.invoke(&f, args, cx, line),
            Callee::Builtin(b) => self.run_builtin(b, &node.value, &args, line),
        }
    }

    /// `make NAME BODY` / `fn f(a, b) BODY`: the raw argument text goes
    /// straight to the engine. An unquoted signature spans words until its
    /// parentheses balance.
    fn define_expr(&mut self, node: &Node) -> Result<(), Error> {
        let line = node.line();
        let words: Vec<&str> = node.children.iter().map(|a| strip_quotes(&a.value)).collect();

        let mut open = 0i32;
        let mut split = words.len();
        for (i, w) in words.iter().enumerate() {
            open += w.matches('(').count() as i32 - w.matches(')').count() as i32;
            if open <= 0 {
                split = i + 1;
                break;
            }
        }
        let (signature, body) = (words[..split].join(", "), words[split..].join(" "));
        if signature.is_empty() || body.is_empty() {
            return Err(Error::new(ErrorCode::S005, line,
                format!("`{}` needs a name and a body expression", node.value)));
        }
        self.engine.define(&signature, &body)
            .map(|name| log::trace!("{} {name}", node.value))
            .map_err(|e| Error::from_expr(e, line))
    }

    /// Context aliases first, then user definitions, then built-ins.
    fn resolve(&self, name: &str, cx: &Context, line: usize) -> Result<Callee, Error> {
        let target = match cx.get(name) {
            Some(Value::Str(alias)) => alias.as_str(),
            Some(Value::Num(_)) => {
                return Err(Error::new(ErrorCode::S010, line,
                    format!("`{name}` is bound to a number and cannot be called")));
            }
            None => name,
        };
        if let Some(f) = self.functions.get(target) {
            return Ok(Callee::User(Rc::clone(f)));
        }
        Builtin::from_name(target)
            .map(Callee::Builtin)
            .ok_or_else(|| Error::new(ErrorCode::S001, line, format!("`{target}` is not defined")))
    }

    fn invoke(&mut self, f: &DslFunction, args: Vec<Value>, cx: &Context, line: usize) -> Result<(), Error> {
        let mut args = args.into_iter();
        let vars = f.params.iter()
            .map(|p| (p.clone(), args.next().unwrap_or(Value::Num(0.0))))
            .collect();
        let child = cx.call(vars);

        if child.depth() > self.limits.max_depth {
            return Err(Error::new(ErrorCode::R003, line,
                format!("call depth limit of {} exceeded", self.limits.max_depth)));
        }
        if child.depth() > 1 {
            if self.state.recursions >= self.limits.max_recursions {
                return Err(Error::new(ErrorCode::R002, line,
                    format!("recursion limit of {} reached", self.limits.max_recursions)));
            }
            self.state.recursions += 1;
        }
        self.exec_body(&f.body, &child)
    }

    // ─── Arguments ───────────────────────────────────────────────────────────

    fn eval_expr(&self, source: &str, cx: &Context, line: usize) -> Result<f64, Error> {
        let expr = self.engine.parse(source).map_err(|e| Error::from_expr(e, line))?;
        self.engine.eval(&expr, cx).map_err(|e| Error::from_expr(e, line))
    }

    /// Quoted text is interpolated; a name bound to a string passes the
    /// string; anything else is an expression, except that an undefined
    /// color word is kept as text.
    fn eval_arg(&self, arg: &Node, cx: &Context) -> Result<Value, Error> {
        let text = arg.value.as_str();
        let line = arg.line();
        if arg.is_quoted() {
            return self.engine.interpolate(strip_quotes(text), cx)
                .map(Value::Str)
                .map_err(|e| Error::from_expr(e, line));
        }
        if let Some(v @ Value::Str(_)) = cx.get(text) {
            return Ok(v.clone());
        }
        match self.eval_expr(text, cx, line) {
            Ok(n) => Ok(Value::Num(n)),
            Err(e) if e.code == ErrorCode::S004 && Color::is_color_word(text) => {
                Ok(Value::Str(text.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Drops one pair of surrounding double quotes, or a lone leading one.
fn strip_quotes(text: &str) -> &str {
    let inner = text.strip_prefix('"').unwrap_or(text);
    if inner.len() < text.len() {
        inner.strip_suffix('"').unwrap_or(inner)
    } else {
        text
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
