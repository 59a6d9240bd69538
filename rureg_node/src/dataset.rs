//! Training dataset: two numeric csv columns fetched over HTTP.

use ::rureg_common::{
    anyhow::anyhow,
    error::{Result, RuregError},
    tracing::debug,
};

/// Paired training values, `x` and `y` always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Dataset {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(RuregError::fail_to_load_dataset(anyhow!(
                "x has {} values but y has {}",
                x.len(),
                y.len()
            )));
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Parse csv content. The first row is a header and is skipped, blank lines
    /// are ignored, the first two columns of every other row are `x` and `y`.
    pub fn parse_csv(content: &str) -> Result<Self> {
        let mut x = vec![];
        let mut y = vec![];
        for (i, line) in content.lines().enumerate().skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut columns = line.split(',');
            x.push(parse_cell(columns.next(), i + 1)?);
            y.push(parse_cell(columns.next(), i + 1)?);
        }
        Self::new(x, y)
    }
}

fn parse_cell(cell: Option<&str>, line_number: usize) -> Result<f64> {
    let cell = cell.ok_or_else(|| {
        RuregError::fail_to_load_dataset(anyhow!("line {}: missing column", line_number))
    })?;
    let cell = cell.trim().trim_matches('"');
    cell.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            RuregError::fail_to_load_dataset(anyhow!(
                "line {}: `{}` is not a finite number",
                line_number,
                cell
            ))
        })
}

/// Download the csv dataset at `url` and parse it.
pub async fn fetch_dataset(url: &str) -> Result<Dataset> {
    debug!("Downloading dataset from {}", url);
    let response = reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| RuregError::fail_to_load_dataset(anyhow!("GET {} failed: {}", url, e)))?;
    let content = response.text().await.map_err(RuregError::fail_to_load_dataset)?;
    Dataset::parse_csv(&content)
}
