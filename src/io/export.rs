//! CSV and JSON export for evaluated episodes.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::rollout::EpisodeRecord;

/// Column header for CSV telemetry export.
const HEADER: &str = "episode,month,day,hour,price,net_load,\
                      action_battery,action_gen_1,action_gen_2,action_gen_3,\
                      soc,battery_energy_change,gen_1_kw,gen_2_kw,gen_3_kw,\
                      grid_import,grid_export,unbalance,shedding,excess,real_unbalance,\
                      generation_cost,battery_cost,operation_cost,reward";

/// Exports episodes to a CSV file at the given path.
///
/// Writes a header row followed by one data row per hour of every episode.
/// Produces deterministic output for identical inputs.
///
/// # Arguments
///
/// * `episodes` - Evaluated episodes, in run order
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(episodes: &[EpisodeRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(episodes, buf)
}

/// Writes episodes as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(episodes: &[EpisodeRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for (episode, record) in episodes.iter().enumerate() {
        for s in &record.steps {
            let [a_bat, a_g1, a_g2, a_g3] = s.action;
            let [g1, g2, g3] = s.generator_outputs;
            let mut row = vec![
                episode.to_string(),
                record.month.to_string(),
                record.day.to_string(),
                s.hour.to_string(),
            ];
            row.extend(
                [
                    s.price,
                    s.net_load,
                    a_bat,
                    a_g1,
                    a_g2,
                    a_g3,
                    s.soc,
                    s.battery_energy_change,
                    g1,
                    g2,
                    g3,
                    s.grid_import,
                    s.grid_export,
                    s.unbalance,
                    s.shedding,
                    s.excess,
                    s.real_unbalance,
                    s.generation_cost,
                    s.battery_cost,
                    s.operation_cost,
                    s.reward,
                ]
                .iter()
                .map(|v| format!("{v:.4}")),
            );
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Exports episodes as a pretty-printed JSON array at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization or writing fails.
pub fn export_json(episodes: &[EpisodeRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_json(episodes, buf)
}

/// Writes episodes as a pretty-printed JSON array to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_json(episodes: &[EpisodeRecord], mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, episodes)?;
    writeln!(writer)?;
    writer.flush()
}
