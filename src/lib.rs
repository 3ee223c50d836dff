mod builder;
mod canvas;
mod config;
mod error;
mod font;
mod json;
mod style;
mod surface;
mod table;
mod text;
mod types;

pub use builder::{ContextKind, TableBuilder};
pub use canvas::{Canvas, CanvasBuilder, Command, Document, Page};
pub use config::{CanvasConfig, FontFile, Orientation};
pub use error::TableError;
pub use json::{AlignSpec, CellSpec, TableSpec};
pub use style::{CellStyle, StyleDirective, StyleFn, StyleRegistry};
pub use surface::{Align, BaseStyle, FontStyle, Surface};
pub use table::{Cell, CellValue, ColumnAligns, Row, Table};
pub use text::{count_lines, wrap_lines};
pub use types::{Color, Margins, Pt, Size, MM};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn canvas() -> Canvas {
        Canvas::builder()
            .page_size(Size {
                width: Pt::from_i32(120),
                height: Pt::from_i32(200),
            })
            .margin_all(10.0)
            .cell_height(Pt::from_i32(10))
            .cell_margin(Pt::from_i32(1))
            .build()
            .unwrap()
    }

    fn header(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|v| v.to_string()).collect())
    }

    fn rects(commands: &[Command]) -> Vec<(Pt, Pt, Pt, Pt)> {
        commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::DrawRect {
                    x,
                    y,
                    width,
                    height,
                } => Some((*x, *y, *width, *height)),
                _ => None,
            })
            .collect()
    }

    fn strings(commands: &[Command]) -> Vec<(Pt, String)> {
        commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::DrawString { x, text, .. } => Some((*x, text.clone())),
                _ => None,
            })
            .collect()
    }

    fn pt(v: i32) -> Pt {
        Pt::from_i32(v)
    }

    #[test]
    fn header_row_is_centered_and_body_follows_column_aligns() {
        let mut canvas = canvas();
        {
            let mut b = TableBuilder::new(&mut canvas);
            b.open_table(
                vec![30.0, 30.0, 40.0],
                [Align::Left, Align::Left, Align::Right],
                header(&["T1", "T2", "T3"]),
            )
            .unwrap();
            b.print_row(["a", "b", "c"]).unwrap();
            b.close_table().unwrap();
            assert!(b.is_idle());
        }

        let commands = &canvas.current_page().commands;
        // Content width 100: columns 30/30/40, two rows of one line each.
        assert_eq!(
            rects(commands),
            vec![
                (pt(10), pt(10), pt(30), pt(10)),
                (pt(40), pt(10), pt(30), pt(10)),
                (pt(70), pt(10), pt(40), pt(10)),
                (pt(10), pt(20), pt(30), pt(10)),
                (pt(40), pt(20), pt(30), pt(10)),
                (pt(70), pt(20), pt(40), pt(10)),
            ]
        );

        // Header: bold 9pt fallback advance is 5.4pt per char, "T1" is 10.8pt.
        let texts = strings(commands);
        assert_eq!(texts[0], (Pt::from_f32(19.6), "T1".to_string()));
        assert_eq!(texts[2], (Pt::from_f32(84.6), "T3".to_string()));
        // Body: regular 8pt, 4.8pt per char.
        assert_eq!(texts[3], (pt(11), "a".to_string()));
        assert_eq!(texts[4], (pt(41), "b".to_string()));
        assert_eq!(texts[5], (Pt::from_f32(104.2), "c".to_string()));
        assert_eq!(canvas.cursor(), (pt(10), pt(30)));
    }

    #[test]
    fn nested_table_widths_are_relative_to_the_cell() {
        let mut canvas = canvas();
        {
            let mut b = TableBuilder::new(&mut canvas);
            b.open_table(vec![60.0, 40.0], Align::Left, None).unwrap();
            b.open_row().unwrap();
            b.print_cell("left").unwrap();
            b.open_cell().unwrap();
            b.open_table(vec![40.0, 40.0, 20.0], Align::Left, None)
                .unwrap();
            b.print_row(["x", "y", "z"]).unwrap();
            b.close_table().unwrap();
            b.close_cell().unwrap();
            b.close_row().unwrap();
            b.close_table().unwrap();
        }

        let commands = &canvas.current_page().commands;
        assert_eq!(
            rects(commands),
            vec![
                (pt(10), pt(10), pt(60), pt(10)),
                (pt(70), pt(10), pt(16), pt(10)),
                (pt(86), pt(10), pt(16), pt(10)),
                (pt(102), pt(10), pt(8), pt(10)),
            ]
        );
    }

    #[test]
    fn nested_table_stretches_its_last_row_to_fill_the_cell() {
        let mut canvas = canvas();
        {
            let mut b = TableBuilder::new(&mut canvas);
            b.open_table(vec![50.0, 50.0], Align::Left, None).unwrap();
            b.open_row().unwrap();
            // Three lines at 50pt wide with 4.8pt glyphs.
            b.print_cell("aaaaaaaa bbbbbbbb cccccccc").unwrap();
            b.open_cell().unwrap();
            b.open_table(vec![100.0], Align::Left, None).unwrap();
            b.print_row(["one"]).unwrap();
            b.print_row(["two"]).unwrap();
            b.close_table().unwrap();
            b.close_cell().unwrap();
            b.close_row().unwrap();
            b.close_table().unwrap();
        }

        let commands = &canvas.current_page().commands;
        assert_eq!(
            rects(commands),
            vec![
                (pt(10), pt(10), pt(50), pt(30)),
                (pt(60), pt(10), pt(50), pt(10)),
                (pt(60), pt(20), pt(50), pt(20)),
            ]
        );
        assert_eq!(canvas.cursor(), (pt(10), pt(40)));
    }

    #[test]
    fn column_and_cell_styles_resolve_per_cell() {
        let mut table = Table::new(vec![25.0; 4], Align::Left, None).unwrap();
        for r in 0..5 {
            table
                .push_row(Row::from_values((0..4).map(|c| format!("{r}.{c}"))))
                .unwrap();
        }
        let column = StyleDirective::FillColor(Color::rgb(0.0, 0.0, 1.0));
        let cell = StyleDirective::FillColor(Color::rgb(1.0, 0.0, 0.0));
        table.set_column_style(2, column.clone());
        table.set_cell_style(3, 2, cell.clone());
        table.resolve_styles();
        table.resolve_styles();

        let body = StyleDirective::Base(BaseStyle::Body);
        for (r, row) in table.rows().iter().enumerate() {
            let expected = if r == 3 {
                vec![body.clone(), cell.clone()]
            } else {
                vec![body.clone(), column.clone()]
            };
            assert_eq!(row.cell(2).unwrap().directives(), expected.as_slice());
            assert_eq!(row.cell(1).unwrap().directives(), &[body.clone()][..]);
        }
    }

    #[test]
    fn most_specific_style_wins_on_the_surface() {
        let mut canvas = canvas();
        {
            let mut b = TableBuilder::new(&mut canvas);
            b.open_table(vec![50.0, 50.0], Align::Left, None).unwrap();
            b.set_column_style(1, StyleDirective::font("Courier", FontStyle::Regular, 7.0))
                .unwrap();
            b.set_cell_style(0, 1, StyleDirective::font("Times", FontStyle::Italic, 11.0))
                .unwrap();
            b.print_row(["a", "b"]).unwrap();
            b.close_table().unwrap();
        }
        assert_eq!(canvas.font_family(), "Times");
        assert_eq!(canvas.font_style(), FontStyle::Italic);
        assert_eq!(canvas.font_size(), pt(11));
    }

    #[test]
    fn named_styles_apply_through_the_canvas() {
        let mut canvas = canvas();
        canvas.add_style("alert", StyleDirective::TextColor(Color::rgb(1.0, 0.0, 0.0)));
        {
            let mut b = TableBuilder::new(&mut canvas);
            b.open_table(vec![100.0], Align::Left, None).unwrap();
            b.set_row_style(0, StyleDirective::named("alert")).unwrap();
            b.print_row(["boom"]).unwrap();
            b.close_table().unwrap();
        }
        assert_eq!(canvas.text_color(), Color::rgb(1.0, 0.0, 0.0));
        assert!(
            canvas
                .current_page()
                .commands
                .contains(&Command::SetTextColor(Color::rgb(1.0, 0.0, 0.0)))
        );
    }

    #[test]
    fn fill_height_equal_to_content_draws_unchanged() {
        let mut canvas = canvas();
        let mut table = Table::new(vec![100.0], Align::Left, None).unwrap();
        table.push_row(Row::from_values(["a"])).unwrap();
        table.push_row(Row::from_values(["b"])).unwrap();
        let natural = table.height(&mut canvas, pt(100));
        assert_eq!(natural, pt(20));

        table.draw(&mut canvas, pt(100), Some(natural)).unwrap();
        let heights: Vec<Pt> = rects(&canvas.current_page().commands)
            .into_iter()
            .map(|r| r.3)
            .collect();
        assert_eq!(heights, vec![pt(10), pt(10)]);
    }

    #[test]
    fn fill_height_one_unit_larger_stretches_only_the_last_row() {
        let mut canvas = canvas();
        let mut table = Table::new(vec![100.0], Align::Left, None).unwrap();
        table.push_row(Row::from_values(["a"])).unwrap();
        table.push_row(Row::from_values(["b"])).unwrap();

        table.draw(&mut canvas, pt(100), Some(pt(21))).unwrap();
        let heights: Vec<Pt> = rects(&canvas.current_page().commands)
            .into_iter()
            .map(|r| r.3)
            .collect();
        assert_eq!(heights, vec![pt(10), pt(11)]);
    }

    #[test]
    fn fill_height_below_content_fails_before_the_last_row() {
        init_logs();
        let mut canvas = canvas();
        let mut table = Table::new(vec![100.0], Align::Left, None).unwrap();
        table.push_row(Row::from_values(["a"])).unwrap();
        table.push_row(Row::from_values(["b"])).unwrap();

        let err = table.draw(&mut canvas, pt(100), Some(pt(19))).unwrap_err();
        assert!(matches!(err, TableError::FillHeight { row: 1, .. }));
        assert_eq!(rects(&canvas.current_page().commands).len(), 1);
    }

    #[test]
    fn rows_that_overflow_the_page_move_to_a_new_one() {
        init_logs();
        let mut canvas = canvas();
        let mut table = Table::new(vec![100.0], Align::Left, None).unwrap();
        // Page break trigger is 190; rows of 10 starting at 10 fit 18 per page.
        for i in 0..20 {
            table.push_row(Row::from_values([format!("row {i}")])).unwrap();
        }
        table.render(&mut canvas).unwrap();

        assert_eq!(canvas.page_count(), 2);
        let page_two = rects(&canvas.current_page().commands);
        assert_eq!(page_two.len(), 2);
        assert_eq!(page_two[0], (pt(10), pt(10), pt(100), pt(10)));
        let doc = canvas.finish();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(rects(&doc.pages[0].commands).len(), 18);
    }

    #[test]
    fn builder_rejects_out_of_order_calls() {
        let mut canvas = canvas();
        let mut b = TableBuilder::new(&mut canvas);
        assert!(matches!(
            b.open_row(),
            Err(TableError::ContextViolation { found: None, .. })
        ));
        b.open_table(vec![50.0, 50.0], Align::Left, None).unwrap();
        assert!(matches!(
            b.close_row(),
            Err(TableError::ContextViolation {
                expected: "row",
                found: Some(ContextKind::Table),
                ..
            })
        ));
        assert!(matches!(
            b.print_cell("x"),
            Err(TableError::ContextViolation {
                expected: "row",
                found: Some(ContextKind::Table),
                ..
            })
        ));
        assert!(matches!(
            b.open_cell(),
            Err(TableError::ContextViolation {
                found: Some(ContextKind::Table),
                ..
            })
        ));
        b.open_row().unwrap();
        assert!(matches!(
            b.open_table(vec![100.0], Align::Left, None),
            Err(TableError::ContextViolation {
                found: Some(ContextKind::Row),
                ..
            })
        ));
        assert!(matches!(
            b.print_row(["a", "b"]),
            Err(TableError::ContextViolation {
                found: Some(ContextKind::Row),
                ..
            })
        ));
        assert!(matches!(
            b.open_row(),
            Err(TableError::ContextViolation {
                expected: "table",
                found: Some(ContextKind::Row),
                ..
            })
        ));
        assert!(matches!(
            b.close_table(),
            Err(TableError::ContextViolation { .. })
        ));
        assert!(matches!(
            b.close_cell(),
            Err(TableError::ContextViolation { .. })
        ));
        assert_eq!(b.context(), Some(ContextKind::Row));
        assert_eq!(b.depth(), 2);
    }

    #[test]
    fn builder_checks_row_sizes() {
        let mut canvas = canvas();
        let mut b = TableBuilder::new(&mut canvas);
        b.open_table(vec![50.0, 50.0], Align::Left, header(&["h1", "h2"]))
            .unwrap();
        assert!(matches!(
            b.print_row(["only"]),
            Err(TableError::RowSize {
                row: 1,
                expected: 2,
                found: 1
            })
        ));
        b.open_row().unwrap();
        b.print_cell("a").unwrap();
        b.print_cell("b").unwrap();
        b.print_cell("c").unwrap();
        assert!(matches!(
            b.close_row(),
            Err(TableError::RowSize { found: 3, .. })
        ));
        assert_eq!(b.context(), Some(ContextKind::Table));
    }

    #[test]
    fn mismatched_configuration_is_rejected() {
        assert!(matches!(
            Table::new(vec![50.0, 50.0], vec![Align::Left], None),
            Err(TableError::Configuration {
                widths: 2,
                aligns: 1
            })
        ));
        assert!(matches!(
            Table::new(vec![50.0, 50.0], Align::Center, header(&["a", "b", "c"])),
            Err(TableError::HeaderMismatch {
                header: 3,
                columns: 2
            })
        ));
        let table = Table::new(vec![20.0, 30.0, 50.0], Align::Right, None).unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.aligns(), &[Align::Right; 3]);
    }

    #[test]
    fn non_scalar_values_are_invalid_content() {
        let mut canvas = canvas();
        let mut b = TableBuilder::new(&mut canvas);
        b.open_table(vec![100.0], Align::Left, None).unwrap();
        b.open_row().unwrap();
        let err = b.print_value(&serde_json::json!(["nested"])).unwrap_err();
        assert!(matches!(err, TableError::InvalidContent(_)));
        b.print_value(&serde_json::json!(3.5)).unwrap();
        b.close_row().unwrap();
    }

    #[test]
    fn second_table_in_one_cell_is_rejected() {
        let mut canvas = canvas();
        let mut b = TableBuilder::new(&mut canvas);
        b.open_table(vec![100.0], Align::Left, None).unwrap();
        b.open_row().unwrap();
        b.open_cell().unwrap();
        b.open_table(vec![100.0], Align::Left, None).unwrap();
        b.close_table().unwrap();
        assert!(matches!(
            b.open_table(vec![100.0], Align::Left, None),
            Err(TableError::ContextViolation { .. })
        ));
    }

    #[test]
    fn style_registration_needs_an_open_table() {
        let mut canvas = canvas();
        let mut b = TableBuilder::new(&mut canvas);
        assert!(matches!(
            b.set_column_style(0, StyleDirective::LineWidth(pt(1))),
            Err(TableError::ContextViolation { .. })
        ));
    }
}
