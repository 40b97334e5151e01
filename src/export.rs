use std::path::Path;

use chrono::{NaiveDate, NaiveTime};

use crate::model::{IndicatorSeries, OutputError, PriceBar, PriceSeries};

const HEADER: [&str; 10] = [
    "date",
    "open",
    "high",
    "low",
    "close",
    "adj_close",
    "volume",
    "ma_20",
    "ma_50",
    "daily_return",
];

/// Writes the price series plus indicator columns, date first. Floats
/// are written with their shortest exact representation so a read-back
/// reproduces the same values.
pub fn write_csv(
    path: &Path,
    series: &PriceSeries,
    indicators: &IndicatorSeries,
) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADER)?;

    for (i, bar) in series.bars.iter().enumerate() {
        let daily_return = indicators.daily_return[i]
            .map(|r| r.to_string())
            .unwrap_or_default();
        writer.write_record(&[
            bar.timestamp.format("%Y-%m-%d").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.adj_close.to_string(),
            bar.volume.to_string(),
            indicators.ma_short[i].to_string(),
            indicators.ma_long[i].to_string(),
            daily_return,
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn parse_float(record: &csv::StringRecord, i: usize) -> Result<f64, OutputError> {
    let raw = record
        .get(i)
        .ok_or_else(|| OutputError::CsvRow(format!("missing column {i}")))?;
    raw.parse()
        .map_err(|_| OutputError::CsvRow(format!("bad float '{raw}'")))
}

/// Reads a file produced by [`write_csv`] back into bars and indicator
/// columns. An empty daily-return field maps back to `None`.
pub fn read_csv(path: &Path) -> Result<(Vec<PriceBar>, IndicatorSeries), OutputError> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut bars = Vec::new();
    let mut ma_short = Vec::new();
    let mut ma_long = Vec::new();
    let mut daily_return = Vec::new();

    for result in reader.records() {
        let record = result?;
        let raw_date = record
            .get(0)
            .ok_or_else(|| OutputError::CsvRow("missing date column".to_string()))?;
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|e| OutputError::CsvRow(format!("bad date '{raw_date}': {e}")))?;

        bars.push(PriceBar {
            timestamp: date.and_time(NaiveTime::MIN).and_utc(),
            open: parse_float(&record, 1)?,
            high: parse_float(&record, 2)?,
            low: parse_float(&record, 3)?,
            close: parse_float(&record, 4)?,
            adj_close: parse_float(&record, 5)?,
            volume: parse_float(&record, 6)?,
        });
        ma_short.push(parse_float(&record, 7)?);
        ma_long.push(parse_float(&record, 8)?);

        match record.get(9) {
            None | Some("") => daily_return.push(None),
            Some(_) => daily_return.push(Some(parse_float(&record, 9)?)),
        }
    }

    Ok((
        bars,
        IndicatorSeries {
            ma_short,
            ma_long,
            daily_return,
        },
    ))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::analyzer::indicators;

    fn sample_series() -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let closes = [100.25, 101.5, 99.875, 103.0625];
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: start + chrono::Days::new(i as u64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                adj_close: close - 0.125,
                volume: 10_000.0 + i as f64,
            })
            .collect();
        PriceSeries {
            symbol: "TEST".into(),
            bars,
        }
    }

    #[test]
    fn round_trip_preserves_closes_and_order() {
        let series = sample_series();
        let ind = indicators::compute(&series);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&path, &series, &ind).unwrap();
        let (bars, read_ind) = read_csv(&path).unwrap();

        assert_eq!(bars.len(), series.len());
        for (read, orig) in bars.iter().zip(&series.bars) {
            assert_eq!(read.close, orig.close);
            assert_eq!(read.timestamp.date_naive(), orig.timestamp.date_naive());
        }
        for pair in bars.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }

        assert_eq!(read_ind.daily_return[0], None);
        for i in 1..bars.len() {
            assert_eq!(read_ind.daily_return[i], ind.daily_return[i]);
            assert_eq!(read_ind.ma_short[i], ind.ma_short[i]);
            assert_eq!(read_ind.ma_long[i], ind.ma_long[i]);
        }
    }

    #[test]
    fn header_has_date_first() {
        let series = sample_series();
        let ind = indicators::compute(&series);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&path, &series, &ind).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let first_line = content.lines().next().unwrap();
        assert!(first_line.starts_with("date,"));
        assert!(first_line.ends_with("ma_20,ma_50,daily_return"));
    }

    #[test]
    fn read_rejects_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(
            &path,
            "date,open,high,low,close,adj_close,volume,ma_20,ma_50,daily_return\nnot-a-date,1,2,3,4,5,6,7,8,\n",
        )
        .unwrap();
        assert!(matches!(read_csv(&path), Err(OutputError::CsvRow(_))));
    }
}
