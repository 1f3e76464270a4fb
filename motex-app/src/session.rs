use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use motex_core::{StimulusCondition, TrialDescriptor};
use motex_experiment::{ExperimentConfig, SessionSink};
use serde_json::json;

/// Session log as one JSON object per line. Rows follow the sink contract
/// order: session header, then begin / motion / color / response / end per
/// trial. Each trial is flushed at its end row, so a crash loses at most the
/// trial the ABORT row already closes.
pub struct JsonlSink {
    writer: BufWriter<File>,
    pub confirmed: usize,
    pub canceled: usize,
    pub timed_out: usize,
    rt_sum: u64,
}

impl JsonlSink {
    pub fn create(path: &Path, config: &ExperimentConfig) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("cannot create session log {}", path.display()))?;
        let mut sink = Self {
            writer: BufWriter::new(file),
            confirmed: 0,
            canceled: 0,
            timed_out: 0,
            rt_sum: 0,
        };
        sink.write_row(json!({ "row": "session", "config": config }));
        Ok(sink)
    }

    pub fn mean_confirmed_rt_frames(&self) -> Option<f64> {
        (self.confirmed > 0).then(|| self.rt_sum as f64 / self.confirmed as f64)
    }

    fn write_row(&mut self, row: serde_json::Value) {
        // fire and forget: a logging failure must not stall the block
        if writeln!(self.writer, "{row}").is_err() {
            tracing::error!("failed to write session log row");
        }
    }
}

impl SessionSink for JsonlSink {
    fn begin_trial(
        &mut self,
        descriptor: &TrialDescriptor,
        _config: &ExperimentConfig,
        condition: &StimulusCondition,
    ) {
        self.write_row(json!({
            "row": "begin",
            "trial": descriptor.index,
            "condition": condition.name,
            "heading_deg": descriptor.heading_deg,
            "onset_frame": descriptor.onset_frame,
            "translation_start_frame": descriptor.translation_start_frame,
            "translation_end_frame": descriptor.translation_end_frame,
            "total_frames": descriptor.total_frames,
            "seeds": descriptor.seeds,
            "delayed_color": descriptor.delayed_color,
        }));
    }

    fn log_motion_payload(&mut self, trial_index: usize, payload: &str) {
        self.write_row(json!({ "row": "motion", "trial": trial_index, "payload": payload }));
    }

    fn log_color_payload(&mut self, trial_index: usize, payload: &str) {
        self.write_row(json!({ "row": "color", "trial": trial_index, "payload": payload }));
    }

    fn log_response(&mut self, choice_index: i32, rt_frames: u32, end_event: &str, device: &str) {
        match end_event {
            "Confirm" => {
                self.confirmed += 1;
                self.rt_sum += u64::from(rt_frames);
            }
            "Timeout" => self.timed_out += 1,
            _ => self.canceled += 1,
        }
        self.write_row(json!({
            "row": "response",
            "choice": choice_index,
            "rt_frames": rt_frames,
            "end_event": end_event,
            "device": device,
        }));
    }

    fn end_trial(&mut self) {
        self.write_row(json!({ "row": "end" }));
        if self.writer.flush().is_err() {
            tracing::error!("failed to flush session log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motex_experiment::synthesize;
    use motex_core::{FieldColor, TrialDescriptor};

    fn descriptor() -> TrialDescriptor {
        TrialDescriptor {
            index: 0,
            condition_label: "cued".to_string(),
            heading_deg: 45.0,
            onset_frame: 56,
            translation_start_frame: 79,
            translation_end_frame: 82,
            total_frames: 120,
            seeds: [1, 2, 3, 4],
            delayed_color: FieldColor::Red,
        }
    }

    #[test]
    fn rows_come_out_in_sink_contract_order() {
        let path = std::env::temp_dir().join("motex-session-order-test.jsonl");
        let config = ExperimentConfig::default();
        let trial = descriptor();
        let condition = synthesize(&trial, &config).unwrap();

        let mut sink = JsonlSink::create(&path, &config).unwrap();
        sink.begin_trial(&trial, &config, &condition);
        sink.log_motion_payload(0, "1|1|2|2");
        sink.log_color_payload(0, "R|R|K|K");
        sink.log_response(-1, 0, "ABORT", "");
        sink.end_trial();
        drop(sink);

        let text = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let kinds: Vec<&str> = rows.iter().map(|r| r["row"].as_str().unwrap()).collect();
        assert_eq!(
            kinds,
            ["session", "begin", "motion", "color", "response", "end"]
        );
        assert_eq!(rows[4]["end_event"], "ABORT");
        assert_eq!(rows[4]["choice"], -1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn confirmed_responses_feed_the_debrief_summary() {
        let path = std::env::temp_dir().join("motex-session-summary-test.jsonl");
        let config = ExperimentConfig::default();
        let mut sink = JsonlSink::create(&path, &config).unwrap();
        sink.log_response(3, 10, "Confirm", "scripted");
        sink.log_response(5, 20, "Confirm", "scripted");
        sink.log_response(-1, 60, "Timeout", "");
        sink.log_response(-1, 4, "Cancel", "scripted");
        assert_eq!(sink.confirmed, 2);
        assert_eq!(sink.timed_out, 1);
        assert_eq!(sink.canceled, 1);
        assert_eq!(sink.mean_confirmed_rt_frames(), Some(15.0));
        drop(sink);
        std::fs::remove_file(&path).ok();
    }
}
