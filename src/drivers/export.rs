use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::drivers::plot::{render_brainwave_png, render_spectrum_png, PlotStyle};
use crate::drivers::{HistorySnapshot, ScopeError};

/// Writes the snapshot as JSON plus brainwave and spectrum PNGs into `dir`.
///
/// Silent amplitudes end up as `null` in the JSON and read back as `-inf`. Charts that have nothing
/// drawable (no brainwave samples yet, or only silent frequency points) are
/// skipped; the JSON is always written.
pub fn export_snapshot(
    dir: &Path,
    snapshot: &HistorySnapshot,
    style: &PlotStyle,
) -> Result<Vec<PathBuf>, ScopeError> {
    fs::create_dir_all(dir)?;
    let tick = snapshot.latest_tick.unwrap_or(0);
    let mut written = Vec::with_capacity(3);

    let json_path = dir.join(format!("eeg_snapshot_{tick}.json"));
    let mut writer = BufWriter::new(File::create(&json_path)?);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.flush()?;
    written.push(json_path);

    if !snapshot.brainwave.is_empty() {
        let path = dir.join(format!("brainwave_{tick}.png"));
        fs::write(&path, render_brainwave_png(&snapshot.brainwave, style)?)?;
        written.push(path);
    }
    if snapshot.frequency.iter().any(|p| p.amplitude_db.is_finite()) {
        let path = dir.join(format!("spectrum_{tick}.png"));
        fs::write(&path, render_spectrum_png(&snapshot.frequency, style)?)?;
        written.push(path);
    }
    log::info!("exported snapshot at tick {tick} ({} files)", written.len());
    Ok(written)
}
