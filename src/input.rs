//! Common routines for reading input files.
use anyhow::{Context, Result, ensure};
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fs;
use std::path::Path;

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Read a series of type `T`s from a CSV file.
///
/// Rows are numbered from 1 (excluding the header) in error messages.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?;

    let mut vec = Vec::new();
    for (row, record) in reader.deserialize().enumerate() {
        let record: T = record
            .with_context(|| format!("Invalid data on row {}", row + 1))
            .with_context(|| input_err_msg(file_path))?;
        vec.push(record);
    }

    ensure!(
        !vec.is_empty(),
        "{}: CSV file cannot be empty",
        input_err_msg(file_path)
    );

    Ok(vec)
}

/// Read an f64, checking that it is greater than zero and no greater than one
pub fn deserialise_proportion_nonzero<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !(value > 0.0 && value <= 1.0) {
        Err(serde::de::Error::custom("Value must be > 0 and <= 1"))?;
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    #[derive(Debug, Deserialize)]
    struct Proportion {
        #[serde(deserialize_with = "deserialise_proportion_nonzero")]
        value: f64,
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let file_path = dir.join(name);
        let mut file = File::create(&file_path).unwrap();
        write!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = write_file(dir.path(), "test.csv", "id,value\nhello, 1\nworld,2\n");
        let records: Vec<Record> = read_csv(&file_path).unwrap();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".into(),
                    value: 1,
                },
                Record {
                    id: "world".into(),
                    value: 2,
                }
            ]
        );
    }

    #[test]
    fn test_read_csv_empty() {
        let dir = tempdir().unwrap();
        let file_path = write_file(dir.path(), "test.csv", "id,value\n");
        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_read_csv_bad_row() {
        let dir = tempdir().unwrap();
        let file_path = write_file(dir.path(), "test.csv", "id,value\nhello,1\nworld,two\n");
        let err = read_csv::<Record>(&file_path).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid data on row 2"));
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = write_file(dir.path(), "test.toml", "id = \"hello\"\nvalue = 1\n");
        let record: Record = read_toml(&file_path).unwrap();
        assert_eq!(
            record,
            Record {
                id: "hello".into(),
                value: 1
            }
        );

        assert!(read_toml::<Record>(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_deserialise_proportion_nonzero() {
        let parse = |s: &str| toml::from_str::<Proportion>(s);
        assert_eq!(parse("value = 0.2").unwrap().value, 0.2);
        assert_eq!(parse("value = 1.0").unwrap().value, 1.0);
        assert!(parse("value = 0.0").is_err());
        assert!(parse("value = 1.5").is_err());
        assert!(parse("value = -0.1").is_err());
    }
}
