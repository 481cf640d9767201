use plotters::prelude::*;

use super::{axis_range, PlotResult, Series};

/// Plot the target curve against the predictions made while training
/// and while running free.
pub fn plot_series(
    targets: &Series,
    train_preds: &Series,
    test_preds: &Series,
    filename: &str,
    dims: (u32, u32),
) -> PlotResult {
    info!(
        "n_targets: {}, n_train_preds: {}, n_test_preds: {}",
        targets.len(),
        train_preds.len(),
        test_preds.len()
    );

    let (ts_min, ts_max) = axis_range(targets.iter().map(|t| t.0));
    let (target_min, target_max) = axis_range(targets.iter().chain(test_preds.iter()).map(|t| t.1));
    debug!("target_min: {}, target_max: {}", target_min, target_max);

    let root_area = BitMapBackend::new(filename, dims).into_drawing_area();
    root_area.fill(&WHITE)?;
    let root_area = root_area.titled(filename, ("sans-serif", 20).into_font())?;

    let mut cc0 = ChartBuilder::on(&root_area)
        .margin(5)
        .set_all_label_area_size(50)
        .caption("values", ("sans-serif", 30).into_font().with_color(&BLACK))
        .build_cartesian_2d(ts_min..ts_max, target_min..target_max)?;
    cc0.configure_mesh()
        .x_labels(20)
        .y_labels(20)
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.4}", v))
        .draw()?;

    cc0.draw_series(LineSeries::new(targets.clone(), &BLACK))?
        .label("targets")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));
    cc0.draw_series(LineSeries::new(train_preds.clone(), &RED))?
        .label("train_preds")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    cc0.draw_series(LineSeries::new(test_preds.clone(), &GREEN))?
        .label("test_preds")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GREEN));
    cc0.configure_series_labels().border_style(&BLACK).draw()?;
    root_area.present()?;

    info!("successfully plotted to {}", filename);
    Ok(())
}

/// Scatter plot of a two dimensional projection
pub fn plot_projection(points: &Series, caption: &str, filename: &str, dims: (u32, u32)) -> PlotResult {
    let root_area = BitMapBackend::new(filename, dims).into_drawing_area();
    root_area.fill(&WHITE)?;
    draw_points(&root_area, points, caption)?;
    root_area.present()?;

    info!("plotted {} points to {}", points.len(), filename);
    Ok(())
}

pub(crate) fn draw_points<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    points: &Series,
    caption: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (x_min, x_max) = axis_range(points.iter().map(|p| p.0));
    let (y_min, y_max) = axis_range(points.iter().map(|p| p.1));

    let mut cc0 = ChartBuilder::on(area)
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .caption(caption, ("sans-serif", 20).into_font().with_color(BLACK))
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    cc0.configure_mesh()
        .x_label_formatter(&|v| format!("{:.2}", v))
        .y_label_formatter(&|v| format!("{:.2}", v))
        .draw()?;
    cc0.draw_series(points.iter().map(|(x, y)| Circle::new((*x, *y), 3, RED.filled())))?;

    Ok(())
}
