use std::time::Instant;

use eframe::egui::{self, Color32, Pos2, RichText, Stroke};
use tortuga_lang::{
    to_source, Canvas, Color, DrawResult, Interpreter, Phase, Player, Pose, Primitive, RunMeta,
};

const BACKGROUND: Color32 = Color32::from_rgb(28, 28, 32);

fn main() -> eframe::Result {
    env_logger::init();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Tortuga", options, Box::new(|_cc| Ok(Box::new(App::default()))))
}

// ─── Scene ───────────────────────────────────────────────────────────────────

/// Geometry received from the player so far, plus the glyph to draw on top.
#[derive(Default)]
struct Scene {
    primitives: Vec<Primitive>,
    glyph: Option<Pose>,
    snapshots: usize,
}

impl Canvas for Scene {
    fn draw(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Clear => self.primitives.clear(),
            Primitive::Head(pose) => self.glyph = Some(pose.clone()),
            other => self.primitives.push(other.clone()),
        }
    }

    fn pose(&mut self, pose: &Pose) {
        log::info!("final pose at ({:.1}, {:.1}, {:.1})", pose.position.x, pose.position.y, pose.position.z);
        self.glyph = Some(pose.clone());
    }

    fn snapshot(&mut self) {
        log::info!("snapshot requested");
        self.snapshots += 1;
    }
}

fn color32(color: &Color) -> Option<Color32> {
    color.to_rgb().map(|(r, g, b)| Color32::from_rgb(r, g, b))
}

/// Top-down orthographic view: world x right, world y up, z dropped.
struct View {
    center: Pos2,
    scale: f32,
}

impl View {
    fn project(&self, x: f64, y: f64) -> Pos2 {
        egui::pos2(self.center.x + x as f32 * self.scale, self.center.y - y as f32 * self.scale)
    }

    /// Point at local (u, v) in the plane spanned by an orientation's
    /// projected x and y axes.
    fn local(&self, origin: (f64, f64), m: &[f64; 6], u: f64, v: f64) -> Pos2 {
        self.project(origin.0 + u * m[0] + v * m[2], origin.1 + u * m[1] + v * m[3])
    }
}

fn paint_primitive(painter: &egui::Painter, view: &View, primitive: &Primitive) {
    match primitive {
        Primitive::Path(path) => {
            let Some(color) = color32(&path.color) else { return };
            let pts: Vec<Pos2> = path.points.iter().map(|p| view.project(p.x, p.y)).collect();
            if path.filled && pts.len() >= 3 {
                painter.add(egui::Shape::convex_polygon(pts.clone(), color, Stroke::NONE));
            }
            painter.add(egui::Shape::line(pts, Stroke::new(path.thickness as f32, color)));
        }
        Primitive::Text(text) => {
            let Some(color) = color32(&text.color) else { return };
            let m = text.orientation.transform_values();
            let galley = painter.layout_no_wrap(text.text.clone(), egui::FontId::proportional(text.size as f32), color);
            let pos = view.project(text.anchor.x, text.anchor.y);
            let angle = -(m[1].atan2(m[0])) as f32;
            painter.add(egui::epaint::TextShape::new(pos, galley, color).with_angle(angle));
        }
        Primitive::Grid(grid) => {
            let Some(color) = color32(&grid.color) else { return };
            let m = grid.orientation.transform_values();
            let origin = (grid.origin.x, grid.origin.y);
            let half = grid.size / 2.0;
            let stroke = Stroke::new(1.0, color.gamma_multiply(0.5));
            for i in 0..=grid.divisions {
                let t = -half + grid.size * i as f64 / grid.divisions.max(1) as f64;
                painter.line_segment([view.local(origin, &m, t, -half), view.local(origin, &m, t, half)], stroke);
                painter.line_segment([view.local(origin, &m, -half, t), view.local(origin, &m, half, t)], stroke);
            }
        }
        Primitive::Head(_) | Primitive::Clear => {}
    }
}

fn paint_glyph(painter: &egui::Painter, view: &View, pose: &Pose) {
    if !pose.is_visible() {
        return;
    }
    let Some(color) = color32(&pose.color) else { return };
    let m = pose.orientation.transform_values();
    let origin = (pose.position.x, pose.position.y);
    let s = pose.size;
    let pts = vec![
        view.local(origin, &m, s, 0.0),
        view.local(origin, &m, -s / 2.0, s / 2.0),
        view.local(origin, &m, -s / 2.0, -s / 2.0),
    ];
    painter.add(egui::Shape::closed_line(pts, Stroke::new(1.5, color)));
}

// ─── App state ───────────────────────────────────────────────────────────────

#[derive(PartialEq)]
enum Tab { Errors, Ast, Canvas }

struct App {
    source: String,
    interp: Interpreter,
    result: DrawResult,
    player: Player,
    scene: Scene,
    started: Instant,
    scale: f32,
    tab: Tab,
}

impl Default for App {
    fn default() -> Self {
        let source = String::from(
"# write turtle code here
draw square size do
  for 4 do
    fw size
    rt 90
  end
end

draw petals n do
  when n > 0 do
    color n/12
    square 80
    rt 30
    wait 0.1
    petals n-1
  end
end

petals 12
label \"done\" 16
");
        let mut app = Self {
            source,
            interp: Interpreter::default(),
            result: DrawResult { success: true, command_count: None, error: None },
            player: Player::new(),
            scene: Scene::default(),
            started: Instant::now(),
            scale: 1.0,
            tab: Tab::Canvas,
        };
        app.run();
        app
    }
}

impl App {
    fn run(&mut self) {
        self.result = self.interp.draw(&self.source);
        match &self.result.error {
            Some(e) => log::info!("run failed: {e}"),
            None => log::info!(
                "run ok: {} command(s), {} ms of playback",
                self.result.command_count.unwrap_or(0),
                self.interp.timeline().end_time()
            ),
        }
        self.player.rewind();
        self.scene = Scene::default();
        self.started = Instant::now();
    }
}

// ─── UI ──────────────────────────────────────────────────────────────────────

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Advance playback ─────────────────────────────────────────────────
        let before = self.player.phase();
        let elapsed = self.started.elapsed().as_millis() as u64;
        self.player.tick(self.interp.timeline(), elapsed, &mut self.scene);
        if self.player.phase() != before {
            log::info!("playback {:?} at {elapsed} ms", self.player.phase());
        }
        if self.player.phase() != Phase::Reached {
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                // ── Left: editor ─────────────────────────────────────────────
                cols[0].vertical(|ui| {
                    ui.label("Source");
                    ui.add(
                        egui::TextEdit::multiline(&mut self.source)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .desired_rows(44),
                    );
                });

                // ── Right: output ────────────────────────────────────────────
                cols[1].vertical(|ui| {
                    ui.horizontal(|ui| {
                        if self.result.success {
                            let n = self.result.command_count.unwrap_or(0);
                            ui.label(RichText::new(format!("✓  {n} command(s)")).color(Color32::from_rgb(80, 200, 80)));
                        } else {
                            ui.label(RichText::new("✗  run failed").color(Color32::from_rgb(220, 80, 80)));
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("run").clicked() {
                                self.run();
                            }
                            if ui.button("replay").clicked() {
                                self.player.rewind();
                                self.scene = Scene::default();
                                self.started = Instant::now();
                            }
                            ui.add(egui::Slider::new(&mut self.scale, 0.1..=8.0).text("zoom"));
                        });
                    });

                    ui.separator();

                    ui.horizontal(|ui| {
                        let err_label = if self.result.success { "Errors" } else { "Errors (1)" };
                        ui.selectable_value(&mut self.tab, Tab::Errors, err_label);
                        ui.selectable_value(&mut self.tab, Tab::Ast, "AST");
                        ui.selectable_value(&mut self.tab, Tab::Canvas, "Canvas");
                    });

                    ui.separator();

                    match self.tab {
                        Tab::Errors => self.show_errors(ui),
                        Tab::Ast => egui::ScrollArea::vertical().show(ui, |ui| self.show_ast(ui)).inner,
                        Tab::Canvas => self.show_canvas(ui),
                    }
                });
            });
        });
    }
}

impl App {
    fn show_errors(&self, ui: &mut egui::Ui) {
        match &self.result.error {
            Some(msg) => {
                ui.label(RichText::new(msg).monospace().color(Color32::from_rgb(220, 80, 80)));
            }
            None => {
                ui.label(RichText::new("No errors.").color(Color32::GRAY));
            }
        }
    }

    fn show_ast(&self, ui: &mut egui::Ui) {
        let RunMeta::Success { ast, .. } = &self.interp.state().meta else {
            ui.label(RichText::new("No AST (run failed).").color(Color32::GRAY));
            return;
        };
        ui.add(
            egui::TextEdit::multiline(&mut to_source(ast))
                .font(egui::TextStyle::Monospace)
                .desired_width(f32::INFINITY)
                .interactive(false),
        );
    }

    fn show_canvas(&self, ui: &mut egui::Ui) {
        let desired = ui.available_size();
        let (rect, _response) = ui.allocate_exact_size(desired, egui::Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND);

        let view = View { center: rect.center(), scale: self.scale };
        for primitive in &self.scene.primitives {
            paint_primitive(&painter, &view, primitive);
        }
        if let Some(pose) = &self.scene.glyph {
            paint_glyph(&painter, &view, pose);
        }

        let status = format!(
            "{} ms / {} ms  {:?}  snapshots: {}",
            self.player.last_render_time().min(self.interp.timeline().end_time()),
            self.interp.timeline().end_time(),
            self.player.phase(),
            self.scene.snapshots,
        );
        painter.text(
            rect.left_bottom() + egui::vec2(8.0, -8.0),
            egui::Align2::LEFT_BOTTOM,
            status,
            egui::FontId::monospace(12.0),
            Color32::GRAY,
        );
    }
}
