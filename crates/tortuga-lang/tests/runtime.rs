//! Interpreter behaviour tests.
//!
//! Programs run through `Interpreter::run`; the turtle state and the
//! timeline are inspected afterwards.

use glam::DVec3;
use tortuga_lang::{Color, Config, Error, ErrorCode, ErrorKind, Interpreter, Limits, Primitive, Quaternion};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn run(src: &str) -> Interpreter {
    let mut interp = Interpreter::default();
    if let Err(e) = interp.run(src) {
        panic!("run failed: {e}");
    }
    interp
}

fn run_err(src: &str) -> (Interpreter, Error) {
    let mut interp = Interpreter::default();
    match interp.run(src) {
        Ok(n) => panic!("expected failure, ran {n} command(s)"),
        Err(e) => (interp, e),
    }
}

fn approx_eq(a: DVec3, b: DVec3) -> bool {
    (a - b).length() < 1e-9
}

fn pos(interp: &Interpreter) -> DVec3 {
    interp.state().position
}

/// Runs `f` on a thread with room for the deepest allowed call chains.
fn with_big_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(256 << 20)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

fn kinds(interp: &Interpreter) -> Vec<&'static str> {
    interp.timeline().primitives().map(Primitive::kind_name).collect()
}

// ─── Movement ────────────────────────────────────────────────────────────────

#[test]
fn forward_steps_sum_along_accumulated_heading() {
    let interp = run("fw 10\nrt 90\nfw 5\nlt 45\nfw 3\nrt 180\nfw 2");

    let steps = [(0.0, 10.0), (-90.0, 5.0), (45.0, 3.0), (-180.0, 2.0)];
    let mut q = Quaternion::IDENTITY;
    let mut expected = DVec3::ZERO;
    for (turn, d) in steps {
        q = q * Quaternion::from_axis_angle(DVec3::Z, turn);
        expected += q.rotate(DVec3::X) * d;
    }
    assert!(approx_eq(pos(&interp), expected));

    let h = 45f64.to_radians();
    let by_hand = DVec3::new(10.0 + 3.0 * h.cos() - 2.0 * h.cos(), -5.0 - 3.0 * h.sin() + 2.0 * h.sin(), 0.0);
    assert!(approx_eq(pos(&interp), by_hand));
}

#[test]
fn back_moves_against_heading() {
    let interp = run("rt 90\nbk 4");
    assert!(approx_eq(pos(&interp), DVec3::new(0.0, 4.0, 0.0)));
}

#[test]
fn pitch_and_roll_leave_the_plane() {
    let interp = run("pitch -90\nfw 10");
    assert!(approx_eq(pos(&interp), DVec3::new(0.0, 0.0, 10.0)));

    let interp = run("roll 90\nlt 90\nfw 1");
    assert!(approx_eq(pos(&interp), DVec3::new(0.0, 0.0, 1.0)));

    let interp = run("dive 90\nfw 2");
    assert!(approx_eq(pos(&interp), DVec3::new(0.0, 0.0, -2.0)));
}

#[test]
fn goto_draws_and_keeps_z() {
    let interp = run("pitch -90\njmp 2\ngoto 3, 4");
    assert!(approx_eq(pos(&interp), DVec3::new(3.0, 4.0, 2.0)));
    assert_eq!(interp.timeline().paths().count(), 1);

    let interp = run("jmpto 1 1 1");
    assert!(approx_eq(pos(&interp), DVec3::ONE));
    assert_eq!(interp.timeline().paths().count(), 0);
}

#[test]
fn faceto_sets_absolute_heading() {
    let interp = run("rt 33\nfaceto 0 10\nfw 5");
    assert!(approx_eq(pos(&interp), DVec3::new(0.0, 5.0, 0.0)));
}

#[test]
fn home_returns_without_drawing() {
    let interp = run("fw 10\nrt 30\nhome\nfw 1");
    assert!(approx_eq(pos(&interp), DVec3::X));
    assert_eq!(interp.timeline().paths().count(), 2);
}

// ─── Paths ───────────────────────────────────────────────────────────────────

#[test]
fn jump_between_moves_makes_two_paths() {
    let interp = run("fw 10\njmp 5\nfw 10");
    let paths: Vec<_> = interp.timeline().paths().collect();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].points, vec![DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0)]);
    assert_eq!(paths[1].points, vec![DVec3::new(15.0, 0.0, 0.0), DVec3::new(25.0, 0.0, 0.0)]);
}

#[test]
fn jump_puts_the_pen_down() {
    let interp = run("pu\njmp 5\nfw 5");
    let paths: Vec<_> = interp.timeline().paths().collect();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].points, vec![DVec3::new(5.0, 0.0, 0.0), DVec3::new(10.0, 0.0, 0.0)]);

    let interp = run("pu\njmpto 0 3\nfw 1");
    assert_eq!(interp.timeline().paths().count(), 1);
    assert!(interp.state().pen_down);
}

#[test]
fn home_keeps_the_pen_up() {
    let interp = run("pu\nfw 3\nhome\nfw 3");
    assert_eq!(interp.timeline().paths().count(), 0);
}

#[test]
fn pen_up_moves_do_not_draw() {
    let interp = run("pu\nfw 5\npd\nfw 5");
    let paths: Vec<_> = interp.timeline().paths().collect();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].points[0], DVec3::new(5.0, 0.0, 0.0));
}

#[test]
fn color_change_starts_a_new_path() {
    let interp = run("fw 1\ncolor red\nfw 1\nthickness 3\nfw 1");
    let paths: Vec<_> = interp.timeline().paths().collect();
    assert_eq!(paths.len(), 3);
    assert_eq!(paths[0].color, Color::WHITE);
    assert_eq!(paths[1].color, Color::Rgb { r: 255, g: 0, b: 0 });
    assert_eq!(paths[2].thickness, 3.0);
}

#[test]
fn fill_marks_the_open_path() {
    let interp = run("fw 10\nrt 120\nfw 10\nfill\nfw 5");
    let paths: Vec<_> = interp.timeline().paths().collect();
    assert_eq!(paths.len(), 2);
    assert!(paths[0].filled);
    assert!(!paths[1].filled);
}

#[test]
fn erase_emits_clear() {
    let interp = run("fw 1\nerase\nfw 1");
    assert_eq!(kinds(&interp), ["path", "clear", "path"]);
}

#[test]
fn label_and_grid() {
    let interp = run("fw 2\nlabel \"hi there\" 20\ngrid\ngrid 50 4");
    let prims: Vec<_> = interp.timeline().primitives().collect();
    match prims[1] {
        Primitive::Text(t) => {
            assert_eq!(t.text, "hi there");
            assert_eq!(t.size, 20.0);
            assert_eq!(t.anchor, DVec3::new(2.0, 0.0, 0.0));
        }
        other => panic!("expected text, got {other:?}"),
    }
    match (prims[2], prims[3]) {
        (Primitive::Grid(a), Primitive::Grid(b)) => {
            assert_eq!((a.size, a.divisions), (100.0, 10));
            assert_eq!((b.size, b.divisions), (50.0, 4));
        }
        other => panic!("expected grids, got {other:?}"),
    }
}

#[test]
fn label_without_size_uses_default() {
    let interp = run("label 42");
    match interp.timeline().primitives().next() {
        Some(Primitive::Text(t)) => {
            assert_eq!(t.text, "42");
            assert_eq!(t.size, Config::default().label_size);
        }
        other => panic!("expected text, got {other:?}"),
    }
}

// ─── Colors ──────────────────────────────────────────────────────────────────

#[test]
fn color_forms() {
    let interp = run("color 0.5");
    assert_eq!(interp.state().color, Color::Hsl { h: 180.0, s: 100.0, l: 50.0 });

    let interp = run("color \"#0f0\"");
    assert_eq!(interp.state().color, Color::Rgb { r: 0, g: 255, b: 0 });

    let interp = run("setColor invisible");
    assert_eq!(interp.state().color, Color::Invisible);

    let (_, e) = run_err("color \"nope\"");
    assert_eq!(e.code, ErrorCode::S009);
}

#[test]
fn seeded_random_color_is_reproducible() {
    let config = Config { seed: Some(7), ..Config::default() };
    let mut a = Interpreter::new(config.clone());
    let mut b = Interpreter::new(config);
    a.run("color random").unwrap();
    b.run("color random").unwrap();
    assert_eq!(a.state().color, b.state().color);
    assert!(matches!(a.state().color, Color::Hsl { .. }));
}

// ─── Control flow ────────────────────────────────────────────────────────────

#[test]
fn loop_runs_exactly_n_times() {
    assert_eq!(run("for 3 do fw 1 end").state().commands, 3);
    assert_eq!(run("for 0 do fw 1 end").state().commands, 0);
    assert_eq!(run("for 2.9 do fw 1 end").state().commands, 2);
    assert_eq!(run("loop -4 do fw 1 end").state().commands, 0);
    assert_eq!(run("for 2 do\n for 3 do\n  fw 1\n end\nend").state().commands, 6);
}

#[test]
fn loop_count_reads_parameters() {
    let interp = run("draw walk n do\nfor n + 1 do fw 1 end\nend\nwalk 4");
    assert!(approx_eq(pos(&interp), DVec3::new(5.0, 0.0, 0.0)));
}

#[test]
fn only_first_true_when_fires() {
    assert_eq!(pos(&run("when 1 do fw 1 end\nwhen 1 do fw 10 end")).x, 1.0);
    assert_eq!(pos(&run("when 0 do fw 1 end\nwhen 2 do fw 2 end")).x, 2.0);
    assert_eq!(pos(&run("when 0 do fw 1 end")).x, 0.0);
}

#[test]
fn when_latch_resets_each_iteration() {
    let interp = run("for 3 do\nwhen 1 do fw 1 end\nwhen 1 do fw 100 end\nend");
    assert_eq!(pos(&interp).x, 3.0);
}

// ─── Functions ───────────────────────────────────────────────────────────────

#[test]
fn square_closes_on_itself() {
    let interp = run("draw sq s do\nfor 4 do\nfw s\nrt 90\nend\nend\nsq 10");
    assert!(approx_eq(pos(&interp), DVec3::ZERO));
    let paths: Vec<_> = interp.timeline().paths().collect();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].points.len(), 5);
}

#[test]
fn missing_arguments_default_to_zero() {
    let interp = run("draw f a b do\nfw a+b\nend\nf 3");
    assert_eq!(pos(&interp).x, 3.0);
}

#[test]
fn functions_see_only_their_parameters() {
    let (_, e) = run_err("draw outer k do\ninner\nend\ndraw inner do\nfw k\nend\nouter 1");
    assert_eq!(e.code, ErrorCode::S004);
}

#[test]
fn definitions_register_in_order() {
    let (_, e) = run_err("sq\ndraw sq do\nfw 1\nend");
    assert_eq!(e.code, ErrorCode::S001);
    assert_eq!(e.line, 1);
}

#[test]
fn recursion_counts_nested_calls_only() {
    let interp = run("draw spiral n do\nwhen n > 0 do\nfw n\nspiral n-1\nend\nend\nspiral 5");
    assert_eq!(pos(&interp).x, 15.0);
    assert_eq!(interp.state().recursions, 5);
}

#[test]
fn mutual_recursion() {
    let interp = run(
        "draw ping n do\n\
         when n > 0 do\n\
         fw 1\n\
         pong n-1\n\
         end\n\
         end\n\
         draw pong n do\n\
         when n > 0 do\n\
         rt 90\n\
         ping n-1\n\
         end\n\
         end\n\
         ping 4",
    );
    assert!(approx_eq(pos(&interp), DVec3::new(1.0, -1.0, 0.0)));
    assert!(approx_eq(interp.state().heading(), -DVec3::X));
    assert_eq!(interp.state().recursions, 4);
}

#[test]
fn string_parameter_aliases_a_command() {
    let interp = run("draw apply cmd n do\ncmd n\nend\napply \"fw\" 7");
    assert_eq!(pos(&interp).x, 7.0);

    let interp = run("draw paint col do\ncolor col\nfw 1\nend\npaint \"red\"");
    assert_eq!(interp.state().color, Color::Rgb { r: 255, g: 0, b: 0 });
}

#[test]
fn numeric_parameter_shadows_a_command() {
    let (_, e) = run_err("draw g fw do\nfw 1\nend\ng 3");
    assert_eq!(e.code, ErrorCode::S010);
}

#[test]
fn interpolated_label() {
    let interp = run("draw sine theta do\nlabel \"sine is [sin[theta]]\"\nend\nsine 0");
    match interp.timeline().primitives().next() {
        Some(Primitive::Text(t)) => assert_eq!(t.text, "sine is 0"),
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn expression_functions_in_arguments() {
    let interp = run("fn sq(x) x*x\nfw sq(3)+1");
    assert_eq!(pos(&interp).x, 10.0);
    let (_, e) = run_err("fn sq(x) x*x\nfw sq(1,2)");
    assert_eq!(e.code, ErrorCode::S003);
}

// ─── Limits ──────────────────────────────────────────────────────────────────

#[test]
fn command_limit_stops_the_run() {
    let (interp, e) = run_err("limitCommand 5\nfw 1\nfw 1\nfw 1\nfw 1\nfw 1");
    assert_eq!(e.code, ErrorCode::R001);
    assert_eq!(e.kind(), ErrorKind::Resource);
    assert_eq!(e.line, 6);
    assert_eq!(interp.state().commands, 5);
    assert_eq!(pos(&interp).x, 4.0);
}

#[test]
fn draw_reports_failure() {
    let mut interp = Interpreter::default();
    let result = interp.draw("limitCommand 5\nfw 1\nfw 1\nfw 1\nfw 1\nfw 1");
    assert!(!result.success);
    assert_eq!(result.command_count, Some(5));
    assert!(result.error.unwrap().starts_with("[R001]"));

    let result = interp.draw("fw 1\nfw 2");
    assert!(result.success);
    assert_eq!(result.command_count, Some(2));
    assert_eq!(result.error, None);
}

#[test]
fn limits_sets_all_budgets() {
    let (interp, e) = run_err("limits 3\nfw 1\nfw 1\nfw 1");
    assert_eq!(e.code, ErrorCode::R001);
    assert_eq!(interp.state().commands, 3);

    let interp = run("limits 10 20 30");
    assert_eq!(interp.limits().max_commands, 10);
    assert_eq!(interp.limits().max_recursions, 20);
    assert_eq!(interp.limits().max_depth, 30);
}

#[test]
fn recursion_limit() {
    let (interp, e) = run_err("limitRecurse 2\ndraw f n do\nwhen n > 0 do f n-1 end\nend\nf 10");
    assert_eq!(e.code, ErrorCode::R002);
    assert_eq!(interp.state().recursions, 2);
}

#[test]
fn depth_limit() {
    let (_, e) = run_err("limitDepth 3\ndraw f do\nf\nend\nf");
    assert_eq!(e.code, ErrorCode::R003);
    assert_eq!(e.kind(), ErrorKind::Resource);
}

#[test]
fn requested_depth_is_capped() {
    let (code, message, recursions, max_depth) = with_big_stack(|| {
        let (interp, e) = run_err("limitDepth 100000000\ndraw f do\nf\nend\nf");
        (e.code, e.message, interp.state().recursions, interp.limits().max_depth)
    });
    assert_eq!(code, ErrorCode::R003);
    assert_eq!(max_depth, Limits::DEPTH_CEILING);
    assert!(message.contains("1000"), "{message}");
    assert_eq!(recursions, Limits::DEPTH_CEILING - 1);
}

#[test]
fn nested_blocks_count_toward_the_nesting_bound() {
    let (code, message) = with_big_stack(|| {
        let (_, e) = run_err(
            "limitDepth 1000\n\
             draw f do\n\
             when 1 do when 1 do when 1 do f end end end\n\
             end\n\
             f",
        );
        (e.code, e.message)
    });
    assert_eq!(code, ErrorCode::R003);
    assert!(message.contains("nested"), "{message}");
}

#[test]
fn runaway_expression_nesting_fails_the_draw() {
    let mut interp = Interpreter::default();
    let src = format!("fw {}1{}", "(".repeat(200_000), ")".repeat(200_000));
    let result = interp.draw(&src);
    assert!(!result.success);
    assert!(result.error.unwrap().starts_with("[E006]"));

    let result = interp.draw(&format!("label \"{}1{}\"", "[".repeat(200_000), "]".repeat(200_000)));
    assert!(!result.success);
}

#[test]
fn limits_reset_between_runs() {
    let mut interp = Interpreter::default();
    interp.run("limitCommand 1").unwrap();
    assert_eq!(interp.run("fw 1\nfw 1\nfw 1"), Ok(3));
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn errors_are_classified() {
    let (_, e) = run_err("for 3 do\nfw 1");
    assert_eq!(e.kind(), ErrorKind::Syntax);

    let (_, e) = run_err("fw (1");
    assert_eq!(e.kind(), ErrorKind::Syntax);

    let (_, e) = run_err("zig 1");
    assert_eq!((e.code, e.kind()), (ErrorCode::S001, ErrorKind::Semantic));

    let (_, e) = run_err("fw q");
    assert_eq!(e.code, ErrorCode::S004);

    let (_, e) = run_err("fw \"ten\"");
    assert_eq!(e.code, ErrorCode::S007);

    let (_, e) = run_err("fw");
    assert_eq!(e.code, ErrorCode::S003);
}

#[test]
fn failed_run_keeps_progress() {
    let (interp, e) = run_err("fw 5\nzig");
    assert_eq!(e.line, 2);
    assert_eq!(pos(&interp).x, 5.0);
    assert_eq!(interp.timeline().final_pose().unwrap().position.x, 5.0);
}

#[test]
fn comments_do_not_count() {
    let interp = run("# setup\n\nfw 1 # step\n");
    assert_eq!(interp.state().commands, 1);
}

#[test]
fn instances_are_independent() {
    let mut a = Interpreter::default();
    let mut b = Interpreter::default();
    a.run("draw f do\nfw 1\nend\nf").unwrap();
    assert_eq!(b.run("f").unwrap_err().code, ErrorCode::S001);
    assert_eq!(a.state().position.x, 1.0);
}

// ─── Time ────────────────────────────────────────────────────────────────────

#[test]
fn waits_advance_virtual_time() {
    let interp = run("wait 1\nwait 1");
    let tl = interp.timeline();
    assert_eq!(tl.current_time(), 2000);
    assert_eq!(tl.end_time(), 2000);
    assert!(matches!(tl.at(0), [Primitive::Head(_)]));
    assert!(matches!(tl.at(1000), [Primitive::Head(_)]));
    assert!(tl.at(2000).is_empty());
}

#[test]
fn wait_splits_paths_across_buckets() {
    let interp = run("fw 1\nwait 0.5\nfw 1");
    let tl = interp.timeline();
    assert!(matches!(tl.at(0), [Primitive::Path(_), Primitive::Head(_)]));
    assert!(matches!(tl.at(500), [Primitive::Path(_)]));
}

#[test]
fn negative_wait_is_ignored() {
    let interp = run("wait -2");
    assert_eq!(interp.timeline().current_time(), 0);
    assert!(matches!(interp.timeline().at(0), [Primitive::Head(_)]));
}

#[test]
fn glyph_visibility_in_poses() {
    let interp = run("hide\nwait 1\nshow 4");
    match interp.timeline().at(0) {
        [Primitive::Head(p)] => assert_eq!(p.size, 0.0),
        other => panic!("expected head, got {other:?}"),
    }
    assert_eq!(interp.timeline().final_pose().unwrap().size, 4.0);
}
