use bitmat::{BitmatError, FilterCommand, PixelImage};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Bitmat(#[from] BitmatError),
    #[error("Missing 'input' path")]
    MissingInput,
    #[error("Missing 'output' path")]
    MissingOutput,
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// A filter applied to one image file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FilterJob {
    pub input: Option<String>,
    pub output: Option<String>,
    pub filter: FilterCommand,
}

impl FilterJob {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load the job
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Load the input image, run the filter and save the result
    pub fn execute(&self) -> Result<(), CliError> {
        let input = self.input.as_deref().ok_or(CliError::MissingInput)?;
        let output = self.output.as_deref().ok_or(CliError::MissingOutput)?;

        let image = PixelImage::open(input)?;
        info!(
            "Running '{}' on {} ({}x{})",
            self.filter,
            input,
            image.width(),
            image.height()
        );
        let result = self.filter.run(&image)?;
        result.save(output)?;
        info!("Wrote {}", output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitmat::{Threshold, ThresholdType};
    use image::{Rgba, RgbaImage};

    const TOML_JOB: &str = r#"
input = "in.png"
output = "out.png"

[filter]
type = "threshold"

[filter.params]
thresh = 90.0
kind = "binary_inv"
"#;

    #[test]
    fn test_from_toml() {
        let job = FilterJob::from_toml(TOML_JOB).expect("Should parse TOML");
        assert_eq!(job.input.as_deref(), Some("in.png"));
        assert_eq!(
            job.filter,
            FilterCommand::Threshold(Threshold {
                thresh: 90.0,
                kind: ThresholdType::BinaryInv,
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let job = FilterJob::from_toml(TOML_JOB).unwrap();

        let toml_path = dir.path().join("job.toml");
        job.to_toml_file(&toml_path).unwrap();
        assert_eq!(FilterJob::from_file(&toml_path).unwrap(), job);

        let json_path = dir.path().join("job.json");
        job.to_json_file(&json_path).unwrap();
        assert_eq!(FilterJob::from_file(&json_path).unwrap(), job);

        assert!(matches!(
            FilterJob::from_file(dir.path().join("job.yaml")),
            Err(CliError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_execute_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255])).save(&input).unwrap();

        let job = FilterJob {
            input: Some(input.display().to_string()),
            output: Some(output.display().to_string()),
            filter: FilterCommand::Gray,
        };
        job.execute().expect("Job should run");

        let written = PixelImage::open(&output).unwrap();
        assert_eq!(written.pixel(0, 0), Some(Rgba([76, 76, 76, 255])));
    }

    #[test]
    fn test_execute_requires_paths() {
        let job = FilterJob {
            input: None,
            output: Some("out.png".to_string()),
            filter: FilterCommand::Gray,
        };
        assert!(matches!(job.execute(), Err(CliError::MissingInput)));
    }
}
