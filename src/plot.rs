use std::path::Path;

use plotters::prelude::*;

use crate::types::Float;

/// Plot a sampled signal against time to a PNG at `path`.
pub fn plot(
    path: impl AsRef<Path>,
    caption: &str,
    data: &[Float],
    dt: Float,
) -> Result<(), Box<dyn std::error::Error>> {
    if data.is_empty() {
        return Err("no samples to plot".into());
    }
    let final_time = dt * (data.len() - 1).max(1) as Float;

    // Determine y-axis limits based on the minimum and maximum values in the data
    let mut min_y = data.iter().cloned().fold(Float::INFINITY, Float::min);
    let mut max_y = data.iter().cloned().fold(Float::NEG_INFINITY, Float::max);
    if max_y - min_y < 1e-9 {
        min_y -= 0.5;
        max_y += 0.5;
    }

    let root = BitMapBackend::new(path.as_ref(), (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..final_time, min_y..max_y)?;

    chart.configure_mesh().x_desc("t (s)").draw()?;

    chart.draw_series(LineSeries::new(
        data.iter().enumerate().map(|(i, y)| (i as Float * dt, *y)),
        &BLUE,
    ))?;

    root.present()?;
    Ok(())
}
