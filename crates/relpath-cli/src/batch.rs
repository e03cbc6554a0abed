//! Run one per-sentence function over a JSON-lines batch.
//!
//! Every input line is a JSON object. Its fields are passed through and the
//! function's output fields are added to it. A sentence that fails gets an
//! `error` field instead, and the batch moves on.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use relpath_core::PathError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where a batch reads from and writes to; `None` means stdin / stdout.
pub struct BatchIo {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub records: usize,
    pub failed: usize,
}

fn read_lines(input: Option<&Path>) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(std::io::stdin().lock()),
    };

    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.context("failed to read input")?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn write_records(output: Option<&Path>, records: &[Value]) -> Result<()> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }
    writer.flush().context("failed to write output")?;
    Ok(())
}

/// Output fields for one record, or a message saying why it was skipped.
fn apply<T, O, F>(record: &Map<String, Value>, process: &F) -> Result<Map<String, Value>, String>
where
    T: DeserializeOwned,
    O: Serialize,
    F: Fn(T) -> Result<O, PathError>,
{
    let input: T = serde_json::from_value(Value::Object(record.clone()))
        .map_err(|e| format!("invalid record: {e}"))?;
    let output = process(input).map_err(|e| e.to_string())?;
    match serde_json::to_value(output) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(format!("expected an object, got {other}")),
        Err(e) => Err(e.to_string()),
    }
}

/// Process one input line. The flag is false when the sentence failed.
pub fn enrich_line<T, O, F>(number: usize, line: &str, process: &F) -> (Value, bool)
where
    T: DeserializeOwned,
    O: Serialize,
    F: Fn(T) -> Result<O, PathError>,
{
    let (mut record, outcome) = match serde_json::from_str::<Map<String, Value>>(line) {
        Ok(record) => {
            let outcome = apply(&record, process);
            (record, outcome)
        }
        Err(e) => (Map::new(), Err(format!("invalid JSON object: {e}"))),
    };

    match outcome {
        Ok(fields) => {
            record.extend(fields);
            (Value::Object(record), true)
        }
        Err(message) => {
            tracing::warn!("skipping line {}: {}", number, message);
            record.insert("error".to_string(), Value::String(message));
            (Value::Object(record), false)
        }
    }
}

/// Process every line of the input in parallel, writing results in input
/// order.
pub fn run<T, O, F>(io: &BatchIo, process: F) -> Result<Summary>
where
    T: DeserializeOwned,
    O: Serialize,
    F: Fn(T) -> Result<O, PathError> + Sync,
{
    let lines = read_lines(io.input.as_deref())?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Processing {} sentences...", lines.len()));

    let results: Vec<(Value, bool)> = lines
        .par_iter()
        .enumerate()
        .map(|(i, line)| {
            let result = enrich_line(i + 1, line, &process);
            spinner.tick();
            result
        })
        .collect();
    spinner.finish_and_clear();

    let summary = Summary {
        records: results.len(),
        failed: results.iter().filter(|(_, ok)| !ok).count(),
    };
    let records: Vec<Value> = results.into_iter().map(|(record, _)| record).collect();
    write_records(io.output.as_deref(), &records)?;

    tracing::info!(
        "processed {} sentences, {} skipped",
        summary.records,
        summary.failed
    );
    Ok(summary)
}
