//! Built-in turtle commands.

use glam::DVec3;

use crate::error::{Error, ErrorCode};
use crate::runtime::interpreter::Interpreter;
use crate::runtime::value::Value;
use crate::types::color::Color;
use crate::types::draw::{GridData, Primitive, TextData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Forward,
    Back,
    Left,
    Right,
    Pitch,
    Roll,
    Jump,
    Goto,
    JumpTo,
    FaceTo,
    Home,
    PenUp,
    PenDown,
    Hide,
    Show,
    Label,
    Grid,
    Fill,
    Wait,
    Erase,
    Color,
    Thickness,
    LimitCommand,
    LimitRecurse,
    LimitDepth,
    Limits,
}

const NAMES: &[(&str, Builtin)] = &[
    // Movement
    ("fw", Builtin::Forward),
    ("forward", Builtin::Forward),
    ("bk", Builtin::Back),
    ("back", Builtin::Back),
    ("jmp", Builtin::Jump),
    ("jump", Builtin::Jump),
    ("goto", Builtin::Goto),
    ("jmpto", Builtin::JumpTo),
    ("home", Builtin::Home),
    // Rotation
    ("lt", Builtin::Left),
    ("left", Builtin::Left),
    ("yaw", Builtin::Left),
    ("rt", Builtin::Right),
    ("right", Builtin::Right),
    ("pitch", Builtin::Pitch),
    ("dive", Builtin::Pitch),
    ("roll", Builtin::Roll),
    ("faceto", Builtin::FaceTo),
    // Pen and glyph
    ("pu", Builtin::PenUp),
    ("penup", Builtin::PenUp),
    ("pd", Builtin::PenDown),
    ("pendown", Builtin::PenDown),
    ("hide", Builtin::Hide),
    ("show", Builtin::Show),
    ("color", Builtin::Color),
    ("setColor", Builtin::Color),
    ("c", Builtin::Color),
    ("thickness", Builtin::Thickness),
    ("width", Builtin::Thickness),
    // Output
    ("label", Builtin::Label),
    ("text", Builtin::Label),
    ("grid", Builtin::Grid),
    ("fill", Builtin::Fill),
    ("wait", Builtin::Wait),
    ("erase", Builtin::Erase),
    ("clear", Builtin::Erase),
    // Budgets
    ("limitCommand", Builtin::LimitCommand),
    ("limitRecurse", Builtin::LimitRecurse),
    ("limitDepth", Builtin::LimitDepth),
    ("limits", Builtin::Limits),
];

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        NAMES.iter().find(|(n, _)| *n == name).map(|(_, b)| *b)
    }

    /// Every accepted spelling.
    pub fn names() -> impl Iterator<Item = &'static str> {
        NAMES.iter().map(|(n, _)| *n)
    }
}

// ─── Arguments ───────────────────────────────────────────────────────────────

struct Args<'a> {
    name: &'a str,
    values: &'a [Value],
    line: usize,
}

impl Args<'_> {
    fn opt_num(&self, i: usize) -> Result<Option<f64>, Error> {
        match self.values.get(i) {
            None => Ok(None),
            Some(Value::Num(n)) => Ok(Some(*n)),
            Some(Value::Str(s)) => Err(Error::new(ErrorCode::S007, self.line,
                format!("`{}` argument {} must be a number, got \"{s}\"", self.name, i + 1))),
        }
    }

    fn num(&self, i: usize) -> Result<f64, Error> {
        self.opt_num(i)?.ok_or_else(|| Error::new(ErrorCode::S003, self.line,
            format!("`{}` needs at least {} argument(s)", self.name, i + 1)))
    }

    /// Non-negative integer budget value.
    fn count(&self, i: usize) -> Result<Option<u64>, Error> {
        Ok(self.opt_num(i)?.map(|n| if n.is_nan() { 0 } else { n.max(0.0) as u64 }))
    }

    fn point(&self, current: DVec3) -> Result<DVec3, Error> {
        Ok(DVec3::new(self.num(0)?, self.num(1)?, self.opt_num(2)?.unwrap_or(current.z)))
    }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

impl Interpreter {
    pub(super) fn run_builtin(&mut self, builtin: Builtin, name: &str, values: &[Value], line: usize)
        -> Result<(), Error>
    {
        if self.state.commands >= self.limits.max_commands {
            return Err(Error::new(ErrorCode::R001, line,
                format!("command limit of {} reached", self.limits.max_commands)));
        }
        self.state.commands += 1;
        log::trace!("{name} {values:?}");

        let args = Args { name, values, line };
        let state = &mut self.state;
        let timeline = &mut self.timeline;

        match builtin {
            Builtin::Forward => state.forward(args.num(0)?, timeline),
            Builtin::Back => state.forward(-args.num(0)?, timeline),
            Builtin::Left => state.yaw(args.num(0)?),
            Builtin::Right => state.yaw(-args.num(0)?),
            Builtin::Pitch => state.pitch(args.num(0)?),
            Builtin::Roll => state.roll(args.num(0)?),
            Builtin::Jump => state.jump(args.num(0)?, timeline),
            Builtin::Goto => {
                let target = args.point(state.position)?;
                state.move_to(target, timeline);
            }
            Builtin::JumpTo => {
                let target = args.point(state.position)?;
                state.jump_to(target, timeline);
            }
            Builtin::FaceTo => {
                let target = args.point(state.position)?;
                state.face(target);
            }
            Builtin::Home => state.home(timeline),
            Builtin::PenUp => {
                state.pen_down = false;
                timeline.close_path();
            }
            Builtin::PenDown => state.pen_down = true,
            Builtin::Hide => state.visible = false,
            Builtin::Show => {
                state.visible = true;
                state.size = args.opt_num(0)?.unwrap_or(self.config.glyph_size);
            }
            Builtin::Label => {
                let text = values.first().map(Value::to_string).ok_or_else(|| {
                    Error::new(ErrorCode::S003, line, format!("`{name}` needs the text to write"))
                })?;
                let size = args.opt_num(1)?.unwrap_or(self.config.label_size);
                timeline.close_path();
                timeline.push(Primitive::Text(TextData {
                    anchor: state.position,
                    text,
                    size,
                    color: state.color,
                    orientation: state.orientation,
                }));
            }
            Builtin::Grid => {
                let size = args.opt_num(0)?.unwrap_or(self.config.grid_size);
                let divisions = args.count(1)?
                    .map_or(self.config.grid_divisions, |d| d.clamp(1, u32::MAX as u64) as u32);
                timeline.close_path();
                timeline.push(Primitive::Grid(GridData {
                    origin: state.position,
                    size,
                    divisions,
                    color: state.color,
                    orientation: state.orientation,
                }));
            }
            Builtin::Fill => {
                timeline.fill_path();
                timeline.close_path();
            }
            Builtin::Wait => {
                let seconds = args.num(0)?;
                timeline.push(Primitive::Head(state.pose()));
                let ms = if seconds.is_finite() && seconds > 0.0 { (seconds * 1000.0).round() as u64 } else { 0 };
                timeline.advance(ms);
            }
            Builtin::Erase => {
                timeline.close_path();
                timeline.push(Primitive::Clear);
            }
            Builtin::Color => {
                let color = match values.first() {
                    Some(Value::Num(n)) => Color::from_hue(*n),
                    Some(Value::Str(s)) if s.eq_ignore_ascii_case("random") => Color::random(&mut self.rng),
                    Some(Value::Str(s)) => Color::parse(s).ok_or_else(|| {
                        Error::new(ErrorCode::S009, line, format!("\"{s}\" is not a color"))
                    })?,
                    None => return Err(Error::new(ErrorCode::S003, line,
                        format!("`{name}` needs a color"))),
                };
                state.color = color;
                timeline.close_path();
            }
            Builtin::Thickness => {
                state.thickness = args.num(0)?.max(0.0);
                timeline.close_path();
            }
            Builtin::LimitCommand => self.limits.max_commands = args.count(0)?.unwrap_or(0),
            Builtin::LimitRecurse => self.limits.max_recursions = args.count(0)?.unwrap_or(0),
            Builtin::LimitDepth => self.limits.set_depth(args.count(0)?.unwrap_or(0)),
            Builtin::Limits => {
                if let Some(n) = args.count(0)? { self.limits.max_commands = n; }
                if let Some(n) = args.count(1)? { self.limits.max_recursions = n; }
                if let Some(n) = args.count(2)? { self.limits.set_depth(n); }
            }
        }
        Ok(())
    }
}
