use std::cell::Cell;

use egui::{Event, Modifiers, MouseWheelUnit, Sense, Shape, pos2, vec2};
use egui_datagrid::{
    CellContent, ColumnResizeMode, DataGrid, GridColumn, GridResponse, GridSurface, RenderMode,
    SnapPhase, StickyColumnConfig,
};

struct User {
    id: u32,
    name: String,
    email: String,
}

fn users(count: u32) -> Vec<User> {
    (0..count)
        .map(|id| User {
            id,
            name: format!("user {id}"),
            email: format!("user{id}@example.com"),
        })
        .collect()
}

fn columns<'a>() -> Vec<GridColumn<'a, User>> {
    vec![
        GridColumn::new("id", "ID", |user: &User, _| user.id.to_string().into()),
        GridColumn::new("name", "Name", |user: &User, _| user.name.as_str().into()),
        GridColumn::new("email", "Email", |user: &User, _| user.email.as_str().into()).initial(240.0),
        GridColumn::new("actions", "Actions", |_: &User, _| {
            CellContent::actions(|ui| {
                let _ = ui.button("Edit");
                let _ = ui.button("Delete");
            })
        }),
    ]
}

fn screen_input(width: f32) -> egui::RawInput {
    egui::RawInput {
        screen_rect: Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(width, 600.0),
        )),
        ..Default::default()
    }
}

fn run_input(
    ctx: &egui::Context,
    input: egui::RawInput,
    mut add_contents: impl FnMut(&mut egui::Ui),
) -> egui::FullOutput {
    ctx.run(input, |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| add_contents(ui));
    })
}

/// Run one frame with a central panel of roughly `width` points.
fn run_frame(
    ctx: &egui::Context,
    width: f32,
    add_contents: impl FnMut(&mut egui::Ui),
) -> egui::FullOutput {
    run_input(ctx, screen_input(width), add_contents)
}

/// Every non-empty piece of text painted in a frame, in paint order, with its position.
fn painted_text(output: &egui::FullOutput) -> Vec<(String, egui::Pos2)> {
    fn collect(shape: &Shape, out: &mut Vec<(String, egui::Pos2)>) {
        match shape {
            Shape::Text(text) if !text.galley.text().is_empty() => {
                out.push((text.galley.text().to_owned(), text.pos));
            }
            Shape::Vec(shapes) => {
                for shape in shapes {
                    collect(shape, out);
                }
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    for clipped in &output.shapes {
        collect(&clipped.shape, &mut out);
    }
    out
}

fn text_x(painted: &[(String, egui::Pos2)], text: &str) -> f32 {
    let mut found = painted.iter().filter(|(painted, _)| painted == text);
    let (_, pos) = found.next().unwrap_or_else(|| panic!("{text:?} was not painted"));
    assert!(found.next().is_none(), "{text:?} was painted more than once");
    pos.x
}

fn show_users(ctx: &egui::Context, width: f32, data: &[User]) -> GridResponse {
    let mut response = None;
    run_frame(ctx, width, |ui| {
        response = Some(
            DataGrid::new(data, columns())
                .right_sticky_columns(vec![StickyColumnConfig::new("actions", 140.0)])
                .show(ui),
        );
    });
    response.expect("the grid was shown")
}

#[test]
fn layout_follows_the_available_width() {
    let ctx = egui::Context::default();
    let data = users(30);

    let wide = show_users(&ctx, 1200.0, &data);
    assert_eq!(wide.mode, RenderMode::Desktop);
    assert_eq!(wide.surface, GridSurface::Ready);

    let narrow = show_users(&ctx, 400.0, &data);
    assert_eq!(narrow.mode, RenderMode::Mobile);
    assert_eq!(narrow.snap_target, None);

    let wide_again = show_users(&ctx, 1200.0, &data);
    assert_eq!(wide_again.mode, RenderMode::Desktop);
}

#[test]
fn cards_keep_row_order_and_drop_the_action_label() {
    let ctx = egui::Context::default();
    let data = users(2);

    let output = run_frame(&ctx, 400.0, |ui| {
        let response = DataGrid::new(&data, columns()).show(ui);
        assert_eq!(response.mode, RenderMode::Mobile);
    });

    let texts: Vec<String> = painted_text(&output)
        .into_iter()
        .map(|(text, _)| text)
        .collect();
    let expected: Vec<String> = data
        .iter()
        .flat_map(|user| {
            [
                "ID".to_owned(),
                user.id.to_string(),
                "Name".to_owned(),
                user.name.clone(),
                "Email".to_owned(),
                user.email.clone(),
                "Edit".to_owned(),
                "Delete".to_owned(),
            ]
        })
        .collect();
    assert_eq!(texts, expected);
    assert!(!texts.iter().any(|text| text == "Actions"));
}

#[test]
fn narrow_layout_leaves_column_widths_alone() {
    let ctx = egui::Context::default();
    let data = users(5);

    let narrow = show_users(&ctx, 400.0, &data);
    assert!(narrow.handle.sizing(&ctx).is_empty());
    assert_eq!(narrow.handle.scroll_snap_phase(&ctx), SnapPhase::Idle);

    let wide = show_users(&ctx, 1200.0, &data);
    let sizing = wide.handle.sizing(&ctx);
    // "id" is frozen by default and "actions" explicitly; only the others have widths.
    assert_eq!(sizing.len(), 2);
    assert_eq!(sizing.cell_size("email"), Some(240.0));
    assert_eq!(sizing.get("id"), None);
}

#[test]
fn state_surfaces_in_priority_order() {
    let ctx = egui::Context::default();
    let data = users(3);
    let empty: Vec<User> = Vec::new();

    for width in [1200.0, 400.0] {
        let mut surfaces = Vec::new();
        run_frame(&ctx, width, |ui| {
            surfaces.push(
                DataGrid::new(&data, columns())
                    .id_salt("loading")
                    .loading(true)
                    .error("Failed to load users")
                    .show(ui)
                    .surface,
            );
            surfaces.push(
                DataGrid::new(&data, columns())
                    .id_salt("error")
                    .error("Failed to load users")
                    .show(ui)
                    .surface,
            );
            surfaces.push(
                DataGrid::new(&empty, columns())
                    .id_salt("empty")
                    .show(ui)
                    .surface,
            );
        });
        assert_eq!(
            surfaces,
            vec![GridSurface::Loading, GridSurface::Error, GridSurface::Empty],
            "at width {width}"
        );
    }
}

#[test]
fn empty_grid_keeps_header_widths() {
    let ctx = egui::Context::default();
    let empty: Vec<User> = Vec::new();

    let show = |ctx: &egui::Context| {
        let mut handle = None;
        let output = run_frame(ctx, 1200.0, |ui| {
            let response = DataGrid::new(&empty, columns())
                .right_sticky_columns(vec![StickyColumnConfig::new("actions", 140.0)])
                .empty_content("No users yet")
                .show(ui);
            assert_eq!(response.surface, GridSurface::Empty);
            handle = Some(response.handle);
        });
        (painted_text(&output), handle.expect("the grid was shown"))
    };

    let (painted, handle) = show(&ctx);
    let mut texts: Vec<&str> = painted.iter().map(|(text, _)| text.as_str()).collect();
    texts.sort_unstable();
    assert_eq!(texts, ["Actions", "Email", "ID", "Name", "No users yet"]);

    // "id" is frozen at 60 points, "name" keeps its declared 150.
    assert!((text_x(&painted, "Name") - text_x(&painted, "ID") - 60.0).abs() < 1.0);
    assert!((text_x(&painted, "Email") - text_x(&painted, "Name") - 150.0).abs() < 1.0);

    let mut sizing = handle.sizing(&ctx);
    sizing.drag("name", 40.0, ColumnResizeMode::Live);
    handle.set_sizing(&ctx, sizing);

    let (painted, _) = show(&ctx);
    assert!((text_x(&painted, "Email") - text_x(&painted, "Name") - 190.0).abs() < 1.0);
    assert!(painted.iter().any(|(text, _)| text == "No users yet"));
}

#[test]
fn ready_callback_fires_once_per_column_layout() {
    let ctx = egui::Context::default();
    let data = users(10);
    let ready = Cell::new(0);

    for _ in 0..3 {
        run_frame(&ctx, 1200.0, |ui| {
            DataGrid::new(&data, columns())
                .on_table_ready(|handle| {
                    assert_eq!(handle.column_ids(), ["id", "name", "email", "actions"]);
                    ready.set(ready.get() + 1);
                })
                .show(ui);
        });
    }
    assert_eq!(ready.get(), 1);

    run_frame(&ctx, 1200.0, |ui| {
        DataGrid::new(&data, columns())
            .right_sticky_columns(vec![StickyColumnConfig::new("actions", 140.0)])
            .on_table_ready(|_| ready.set(ready.get() + 1))
            .show(ui);
    });
    assert_eq!(ready.get(), 2);
}

#[test]
fn expansion_renderer_is_asked_about_every_row() {
    let ctx = egui::Context::default();
    let data = users(8);
    let calls = Cell::new(0);

    run_frame(&ctx, 1200.0, |ui| {
        DataGrid::new(&data, columns())
            .expanded_row_render(|user: &User, index| {
                calls.set(calls.get() + 1);
                (index % 3 == 0).then(|| CellContent::text(format!("Details of {}", user.name)))
            })
            .show(ui);
    });
    assert!(calls.get() >= data.len());
}

#[test]
fn expansion_predicate_limits_rendering_to_visible_rows() {
    let ctx = egui::Context::default();
    let data = users(1000);
    let asked = Cell::new(0);
    let rendered = Cell::new(0);

    run_frame(&ctx, 1200.0, |ui| {
        DataGrid::new(&data, columns())
            .has_expanded_row(|_: &User, index| {
                asked.set(asked.get() + 1);
                index % 2 == 0
            })
            .expanded_row_render(|user: &User, _| {
                rendered.set(rendered.get() + 1);
                Some(CellContent::text(format!("Details of {}", user.name)))
            })
            .show(ui);
    });
    // Once per row for every pass of the frame.
    assert!(asked.get() >= data.len() && asked.get() % data.len() == 0);
    assert!(0 < rendered.get() && rendered.get() < 50, "rendered {}", rendered.get());
}

/// Scroll 130 points with the mouse wheel, then let the grid settle for four seconds.
///
/// Returns every snap target the grid started, the final offset and the final snap phase.
fn wheel_scroll_and_settle(
    data: &[User],
    expand_every_third: bool,
) -> (Vec<f32>, f32, SnapPhase) {
    let ctx = egui::Context::default();
    let mut targets = Vec::new();
    let mut last = None;

    for frame in 0..240 {
        let mut input = screen_input(1200.0);
        input.time = Some(frame as f64 / 60.0);
        input.predicted_dt = 1.0 / 60.0;
        match frame {
            0 => input.events.push(Event::PointerMoved(pos2(300.0, 300.0))),
            2 => input.events.push(Event::MouseWheel {
                unit: MouseWheelUnit::Point,
                delta: vec2(0.0, -130.0),
                modifiers: Modifiers::NONE,
            }),
            _ => {}
        }

        run_input(&ctx, input, |ui| {
            let mut grid = DataGrid::new(data, columns());
            if expand_every_third {
                grid = grid
                    .expansion_height_hint(60.0)
                    .expanded_row_render(|_: &User, index| {
                        (index % 3 == 0).then(|| {
                            CellContent::widget(|ui| {
                                let _ = ui.allocate_exact_size(vec2(40.0, 44.0), Sense::hover());
                            })
                        })
                    });
            }
            let response = grid.show(ui);
            targets.extend(response.snap_target);
            last = Some(response);
        });
    }

    let last = last.expect("the grid was shown");
    let phase = last.handle.scroll_snap_phase(&ctx);
    (targets, last.scroll_offset.y, phase)
}

#[test]
fn wheel_scroll_snaps_to_a_row_boundary() {
    let data = users(100);
    let (targets, offset, phase) = wheel_scroll_and_settle(&data, false);

    assert_eq!(targets.len(), 1, "targets: {targets:?}");
    assert!((offset - targets[0]).abs() < 0.5, "offset {offset}, targets {targets:?}");
    // One point above a row top, to leave the row border visible under the header.
    let rows = (offset + 1.0) / 48.0;
    assert!(rows >= 1.0 && (rows - rows.round()).abs() < 0.01, "offset {offset}");
    assert_eq!(phase, SnapPhase::Idle);
}

#[test]
fn wheel_scroll_snaps_around_expansion_rows() {
    let data = users(100);
    let (targets, offset, phase) = wheel_scroll_and_settle(&data, true);

    // 48 point rows, and a 60 point expansion row after every third one.
    let mut tops = Vec::new();
    let mut top = 0.0;
    for index in 0..data.len() {
        tops.push(top);
        top += 48.0;
        if index % 3 == 0 {
            tops.push(top);
            top += 60.0;
        }
    }

    assert_eq!(targets.len(), 1, "targets: {targets:?}");
    assert!((offset - targets[0]).abs() < 0.5, "offset {offset}, targets {targets:?}");
    assert!(offset > 0.0);
    assert!(
        tops.iter().any(|top| (top - 1.0 - offset).abs() < 0.5),
        "offset {offset} is not on a span boundary"
    );
    assert_eq!(phase, SnapPhase::Idle);
}

#[test]
fn resetting_sizes_through_the_handle() {
    let ctx = egui::Context::default();
    let data = users(3);

    let response = show_users(&ctx, 1200.0, &data);
    let handle = response.handle;

    let mut sizing = handle.sizing(&ctx);
    sizing.drag("name", 40.0, ColumnResizeMode::Live);
    sizing.drag("email", -40.0, ColumnResizeMode::Live);
    handle.set_sizing(&ctx, sizing);

    // User widths survive the next frame.
    show_users(&ctx, 1200.0, &data);
    assert_eq!(handle.sizing(&ctx).cell_size("name"), Some(190.0));

    handle.reset_column_size(&ctx, "name");
    let sizing = handle.sizing(&ctx);
    assert_eq!(sizing.cell_size("name"), Some(150.0));
    assert_eq!(sizing.cell_size("email"), Some(200.0));

    handle.reset_all_sizes(&ctx);
    assert_eq!(handle.sizing(&ctx).cell_size("email"), Some(240.0));
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "does not exist")]
fn unresolved_sticky_column_panics_in_debug_builds() {
    let ctx = egui::Context::default();
    let data = users(3);
    run_frame(&ctx, 1200.0, |ui| {
        DataGrid::new(&data, columns())
            .right_sticky_columns(vec![StickyColumnConfig::new("nope", 100.0)])
            .show(ui);
    });
}
