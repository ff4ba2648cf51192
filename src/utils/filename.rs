use chrono::NaiveDate;

use crate::utils::constants::FILE_DATE_FORMAT;

/// Raw extraction output: `{type}_raw_{YYYY-MM-DD}.json`
pub fn raw_file_name(file_type: &str, date: NaiveDate) -> String {
    format!("{}_raw_{}.json", file_type, date.format(FILE_DATE_FORMAT))
}

/// Transformed output: `{type}_{YYYY-MM-DD}.csv`
pub fn transformed_file_name(file_type: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", file_type, date.format(FILE_DATE_FORMAT))
}

/// Current master table: `{type}_master.csv`
pub fn master_file_name(master_type: &str) -> String {
    format!("{}_master.csv", master_type)
}

/// Archived master table: `{type}_master_previous_version.csv`
pub fn master_previous_file_name(master_type: &str) -> String {
    format!("{}_master_previous_version.csv", master_type)
}

/// Last path segment of an object key
pub fn file_name_from_key(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Extract the date embedded in a raw file name (e.g. taxi_raw_2024-01-31.json -> 2024-01-31)
pub fn date_from_raw_file_name(file_name: &str) -> Option<NaiveDate> {
    let stem = file_name.strip_suffix(".json")?;
    let (_, date_part) = stem.rsplit_once("_raw_")?;
    NaiveDate::parse_from_str(date_part, FILE_DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming_conventions() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        assert_eq!(raw_file_name("taxi", date), "taxi_raw_2024-01-05.json");
        assert_eq!(transformed_file_name("weather", date), "weather_2024-01-05.csv");
        assert_eq!(master_file_name("company"), "company_master.csv");
        assert_eq!(
            master_previous_file_name("payment_type"),
            "payment_type_master_previous_version.csv"
        );
    }

    #[test]
    fn test_file_name_from_key() {
        assert_eq!(
            file_name_from_key("raw_data/to_processed/taxi_data/taxi_raw_2024-01-05.json"),
            "taxi_raw_2024-01-05.json"
        );
        assert_eq!(file_name_from_key("raw_data/to_processed/taxi_data/"), "");
        assert_eq!(file_name_from_key("plain.json"), "plain.json");
    }

    #[test]
    fn test_date_from_raw_file_name() {
        assert_eq!(
            date_from_raw_file_name("weather_raw_2023-11-30.json"),
            NaiveDate::from_ymd_opt(2023, 11, 30)
        );
        assert_eq!(date_from_raw_file_name("weather_2023-11-30.csv"), None);
        assert_eq!(date_from_raw_file_name("taxi_raw_notadate.json"), None);
    }
}
