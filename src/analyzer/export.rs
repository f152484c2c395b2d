// Flat-file output of the analytics stage
use crate::analyzer::cohort::CohortMatrix;
use crate::model::{AnalysisError, RfmRecord};
use std::fs;
use std::io;
use std::path::Path;

pub fn write_rfm<W: io::Write>(writer: W, records: &[RfmRecord]) -> Result<(), AnalysisError> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// `CohortMonth,1,2,...` with one-decimal percentages; empty cells stay empty.
pub fn write_cohorts<W: io::Write>(writer: W, matrix: &CohortMatrix) -> Result<(), AnalysisError> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["CohortMonth".to_string()];
    header.extend(matrix.indices.iter().map(|i| i.to_string()));
    csv.write_record(&header)?;

    for row in &matrix.rows {
        let mut fields = vec![row.cohort.to_string()];
        fields.extend(row.retention.iter().map(|cell| match cell {
            Some(pct) => format!("{:.1}", pct),
            None => String::new(),
        }));
        csv.write_record(&fields)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn save_rfm(path: &Path, records: &[RfmRecord]) -> Result<(), AnalysisError> {
    ensure_parent(path)?;
    write_rfm(fs::File::create(path)?, records)
}

pub fn save_cohorts(path: &Path, matrix: &CohortMatrix) -> Result<(), AnalysisError> {
    ensure_parent(path)?;
    write_cohorts(fs::File::create(path)?, matrix)
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::cohort::{CohortRow, Month};

    #[test]
    fn rfm_header_matches_columns() {
        let records = vec![RfmRecord {
            customer_id: 1000,
            recency: 12,
            frequency: 3,
            monetary: 150.0,
            r_score: 4,
            f_score: 2,
            m_score: 3,
            segment: "Potential Loyalists".into(),
        }];
        let mut out = Vec::new();
        write_rfm(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("customer_id,Recency,Frequency,Monetary,R_score,F_score,M_score,Segment")
        );
        assert_eq!(lines.next(), Some("1000,12,3,150.0,4,2,3,Potential Loyalists"));
    }

    #[test]
    fn cohort_csv_leaves_missing_cells_empty() {
        let matrix = CohortMatrix {
            indices: vec![1, 2, 3],
            rows: vec![CohortRow {
                cohort: Month { year: 2023, month: 1 },
                active: vec![Some(4), None, Some(1)],
                retention: vec![Some(100.0), None, Some(25.0)],
            }],
        };
        let mut out = Vec::new();
        write_cohorts(&mut out, &matrix).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text, "CohortMonth,1,2,3\n2023-01-01,100.0,,25.0\n");
    }

    #[test]
    fn save_creates_the_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rfm.csv");
        save_rfm(&path, &[]).unwrap();
        assert!(path.exists());
    }
}
