use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::drivers::error::ScopeError;
use crate::drivers::palette::band_color;
use crate::drivers::{Band, BrainwaveSample, FrequencyPoint};
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
    /// Captions, axis labels and legends. These need a system font.
    pub annotated: bool,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 15),
            foreground: WHITE,
            annotated: true,
        }
    }
}
fn rgb(color: [u8; 3]) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}
pub fn render_brainwave_png(
    samples: &[BrainwaveSample],
    style: &PlotStyle,
) -> Result<Vec<u8>, ScopeError> {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Err(ScopeError::Plot("brainwave series is empty".into()));
    };
    // A single tick still needs a non-empty x range.
    let x_range = first.tick as f64..(last.tick as f64).max(first.tick as f64 + 1.0);
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut builder = ChartBuilder::on(&root);
        builder.margin(10);
        if style.annotated {
            builder
                .caption(
                    "Brainwave Data",
                    ("sans-serif", 20).into_font().color(&style.foreground),
                )
                .set_label_area_size(LabelAreaPosition::Left, 45)
                .set_label_area_size(LabelAreaPosition::Bottom, 40);
        }
        let mut chart = builder.build_cartesian_2d(x_range, -0.2f64..0.2f64)?;
        if style.annotated {
            chart
                .configure_mesh()
                .light_line_style(&style.foreground.mix(0.1))
                .draw()?;
        }
        for band in Band::ALL {
            let color = rgb(band_color(band));
            let series = samples.iter().map(|s| (s.tick as f64, s.band(band)));
            chart
                .draw_series(LineSeries::new(series, &color))?
                .label(band.label())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        }
        if style.annotated {
            chart
                .configure_series_labels()
                .border_style(&style.foreground.mix(0.2))
                .background_style(&style.background)
                .draw()?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
/// Scatter of amplitude (dB) against frequency. Points with a non-finite
/// amplitude are left out of the picture.
pub fn render_spectrum_png(
    points: &[FrequencyPoint],
    style: &PlotStyle,
) -> Result<Vec<u8>, ScopeError> {
    let finite: Vec<(f64, f64)> = points
        .iter()
        .filter(|p| p.amplitude_db.is_finite())
        .map(|p| (p.frequency_hz, p.amplitude_db))
        .collect();
    if finite.is_empty() {
        return Err(ScopeError::Plot("no finite amplitude points".into()));
    }
    let y_min = finite.iter().map(|p| p.1).fold(0.0f64, f64::min);
    let y_max = finite.iter().map(|p| p.1).fold(0.0f64, f64::max);
    let y_bounds = if (y_max - y_min).abs() < f64::EPSILON {
        (-10.0, 10.0)
    } else {
        (y_min - 1.0, y_max + 1.0)
    };
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut builder = ChartBuilder::on(&root);
        builder.margin(10);
        if style.annotated {
            builder
                .caption(
                    "Amplitude vs. Frequency",
                    ("sans-serif", 20).into_font().color(&style.foreground),
                )
                .set_label_area_size(LabelAreaPosition::Left, 45)
                .set_label_area_size(LabelAreaPosition::Bottom, 40);
        }
        let mut chart = builder.build_cartesian_2d(0f64..100f64, y_bounds.0..y_bounds.1)?;
        if style.annotated {
            chart
                .configure_mesh()
                .x_desc("Hz")
                .y_desc("dB")
                .light_line_style(&style.foreground.mix(0.1))
                .draw()?;
        }
        let color = rgb(band_color(Band::Delta));
        chart.draw_series(
            finite
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
        )?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScopeError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| ScopeError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::generator::amplitude_db;
    use crate::drivers::SignalGenerator;
    fn bare_style() -> PlotStyle {
        PlotStyle {
            annotated: false,
            ..PlotStyle::default()
        }
    }
    #[test]
    fn renders_pngs_from_generated_history() {
        let mut gen = SignalGenerator::with_seed(4, 11).unwrap();
        let bundles: Vec<_> = (0..5).map(|_| gen.generate()).collect();
        let waves: Vec<_> = bundles.iter().map(|b| b.brainwave).collect();
        let points: Vec<_> = bundles.iter().map(|b| b.frequency).collect();
        let style = bare_style();
        let png_wave = render_brainwave_png(&waves, &style).unwrap();
        let png_fft = render_spectrum_png(&points, &style).unwrap();
        assert_eq!(&png_wave[1..4], b"PNG");
        assert_eq!(&png_fft[1..4], b"PNG");
    }
    #[test]
    fn empty_or_non_finite_inputs_are_plot_errors() {
        let style = bare_style();
        assert!(matches!(
            render_brainwave_png(&[], &style),
            Err(ScopeError::Plot(_))
        ));
        let silent = [FrequencyPoint {
            frequency_hz: 12.0,
            amplitude_db: amplitude_db(0.0),
        }];
        assert!(matches!(
            render_spectrum_png(&silent, &style),
            Err(ScopeError::Plot(_))
        ));
    }
}
