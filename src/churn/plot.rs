// Confusion matrix heatmap
use crate::churn::metrics::ConfusionMatrix;
use crate::model::ChurnError;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::path::Path;

const SIZE: (u32, u32) = (800, 600);
const LIGHT: (u8, u8, u8) = (247, 251, 255);
const DARK: (u8, u8, u8) = (8, 48, 107);

/// Renders the matrix as a blue heatmap with the count in every cell.
/// Actual classes run down the rows, predicted classes across the columns.
pub fn render_confusion_matrix(
    matrix: &ConfusionMatrix,
    labels: [&str; 2],
    path: &Path,
) -> Result<(), ChurnError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    draw(matrix, labels, path).map_err(|e| ChurnError::Plot(e.to_string()))
}

fn draw(
    matrix: &ConfusionMatrix,
    labels: [&str; 2],
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Confusion Matrix", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(120)
        .build_cartesian_2d((0i32..2i32).into_segmented(), (0i32..2i32).into_segmented())?;

    // row 0 (actual "not churned") is drawn on top
    let class_at = |value: &SegmentValue<i32>, flip: bool| match value {
        SegmentValue::CenterOf(i) if (0..2).contains(i) => {
            let idx = if flip { 1 - *i } else { *i };
            labels[idx as usize].to_string()
        }
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Predicted")
        .y_desc("Actual")
        .x_label_formatter(&|v: &SegmentValue<i32>| class_at(v, false))
        .y_label_formatter(&|v: &SegmentValue<i32>| class_at(v, true))
        .axis_desc_style(("sans-serif", 20))
        .label_style(("sans-serif", 16))
        .draw()?;

    let peak = matrix.max().max(1) as f64;
    let cells: Vec<(i32, i32, usize)> = (0..2)
        .flat_map(|actual| (0..2).map(move |predicted| (actual, predicted)))
        .map(|(actual, predicted)| {
            let count = matrix.counts[actual][predicted];
            (predicted as i32, 1 - actual as i32, count)
        })
        .collect();

    chart.draw_series(cells.iter().map(|&(x, y, count)| {
        Rectangle::new(
            [
                (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
            ],
            shade(count as f64 / peak).filled(),
        )
    }))?;

    chart.draw_series(cells.iter().map(|&(x, y, count)| {
        let color: &RGBColor = if count as f64 / peak > 0.5 { &WHITE } else { &BLACK };
        let style = TextStyle::from(("sans-serif", 32).into_font())
            .color(color)
            .pos(Pos::new(HPos::Center, VPos::Center));
        Text::new(
            count.to_string(),
            (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
            style,
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Linear blend from the light to the dark end of the palette, `t` in [0, 1].
fn shade(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(
        mix(LIGHT.0, DARK.0),
        mix(LIGHT.1, DARK.1),
        mix(LIGHT.2, DARK.2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shade_spans_the_palette() {
        assert_eq!(shade(0.0), RGBColor(247, 251, 255));
        assert_eq!(shade(1.0), RGBColor(8, 48, 107));
        assert_eq!(shade(7.0), shade(1.0));
    }

    #[test]
    fn writes_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plots").join("confusion_matrix.svg");
        let matrix = ConfusionMatrix {
            counts: [[120, 14], [9, 57]],
        };
        render_confusion_matrix(&matrix, ["Not Churned", "Churned"], &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("120"));
        assert!(svg.contains("Predicted"));
        assert!(svg.contains("Not Churned"));
    }

    #[test]
    fn empty_matrix_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confusion_matrix.svg");
        render_confusion_matrix(&ConfusionMatrix::default(), ["Not Churned", "Churned"], &path)
            .unwrap();
        assert!(path.exists());
    }
}
