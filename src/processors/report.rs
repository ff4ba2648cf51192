use crate::models::MasterKind;

/// Outcome of one processed raw file
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub source_key: String,
    pub output_key: String,
    pub rows_read: usize,
    pub rows_written: usize,
}

impl FileOutcome {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read.saturating_sub(self.rows_written)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformReport {
    pub taxi_files: Vec<FileOutcome>,
    pub weather_files: Vec<FileOutcome>,
    pub new_payment_types: usize,
    pub new_companies: usize,
    pub skipped_keys: Vec<String>,
}

impl TransformReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_new_keys(&mut self, kind: MasterKind, count: usize) {
        match kind {
            MasterKind::PaymentType => self.new_payment_types += count,
            MasterKind::Company => self.new_companies += count,
        }
    }

    pub fn files_processed(&self) -> usize {
        self.taxi_files.len() + self.weather_files.len()
    }

    pub fn trips_written(&self) -> usize {
        self.taxi_files.iter().map(|f| f.rows_written).sum()
    }

    pub fn trips_dropped(&self) -> usize {
        self.taxi_files.iter().map(FileOutcome::rows_dropped).sum()
    }

    pub fn weather_rows_written(&self) -> usize {
        self.weather_files.iter().map(|f| f.rows_written).sum()
    }

    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Transform Summary:\n");
        summary.push_str(&format!(
            "  Files processed: {} ({} taxi, {} weather)\n",
            self.files_processed(),
            self.taxi_files.len(),
            self.weather_files.len()
        ));
        summary.push_str(&format!(
            "  Trips written: {} ({} dropped as incomplete)\n",
            self.trips_written(),
            self.trips_dropped()
        ));
        summary.push_str(&format!(
            "  Weather rows written: {}\n",
            self.weather_rows_written()
        ));
        summary.push_str(&format!(
            "  New master keys: {} payment types, {} companies\n",
            self.new_payment_types, self.new_companies
        ));

        for outcome in self.taxi_files.iter().chain(&self.weather_files) {
            summary.push_str(&format!(
                "    {} -> {} ({} rows)\n",
                outcome.source_key, outcome.output_key, outcome.rows_written
            ));
        }

        if !self.skipped_keys.is_empty() {
            summary.push_str(&format!("  Skipped keys: {}\n", self.skipped_keys.len()));
            for key in &self.skipped_keys {
                summary.push_str(&format!("    {}\n", key));
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let mut report = TransformReport::new();
        report.taxi_files.push(FileOutcome {
            source_key: "in/taxi_raw_2024-01-01.json".to_string(),
            output_key: "out/taxi_2024-01-01.csv".to_string(),
            rows_read: 10,
            rows_written: 7,
        });
        report.weather_files.push(FileOutcome {
            source_key: "in/weather_raw_2024-01-01.json".to_string(),
            output_key: "out/weather_2024-01-01.csv".to_string(),
            rows_read: 24,
            rows_written: 24,
        });
        report.record_new_keys(MasterKind::Company, 2);
        report.record_new_keys(MasterKind::Company, 1);

        assert_eq!(report.files_processed(), 2);
        assert_eq!(report.trips_written(), 7);
        assert_eq!(report.trips_dropped(), 3);
        assert_eq!(report.weather_rows_written(), 24);
        assert_eq!(report.new_companies, 3);

        let summary = report.generate_summary();
        assert!(summary.contains("Trips written: 7 (3 dropped as incomplete)"));
        assert!(summary.contains("0 payment types, 3 companies"));
    }
}
