use crate::core::{ErrorRow, RowSink, SourceRow, SuccessRow};
use crate::utils::error::{EtlError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

/// 來源資料表的欄位名稱
pub const SOURCE_COLUMNS: [&str; 15] = [
    "UB_ID",
    "IH_CRIBNR",
    "Datum",
    "Betreffende",
    "Aanslagnummer",
    "BM_OMSCHRIJVING",
    "Periode",
    "OpenstandBedrag",
    "BestredenBedrag",
    "NietBestredenBedrag",
    "Kosten",
    "TotaalOpenstand",
    "UB_BIJZONDERHEDEN",
    "RU_BIJZONDER",
    "UB_DATUM",
];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Deserialize)]
struct CsvSourceRow {
    #[serde(rename = "UB_ID")]
    ub_id: Option<String>,
    #[serde(rename = "IH_CRIBNR")]
    ih_cribnr: Option<String>,
    #[serde(rename = "Datum")]
    datum: Option<String>,
    #[serde(rename = "Betreffende")]
    betreffende: Option<String>,
    #[serde(rename = "Aanslagnummer")]
    aanslagnummer: Option<String>,
    #[serde(rename = "BM_OMSCHRIJVING")]
    bm_omschrijving: Option<String>,
    #[serde(rename = "Periode")]
    periode: Option<String>,
    #[serde(rename = "OpenstandBedrag")]
    openstand_bedrag: Option<String>,
    #[serde(rename = "BestredenBedrag")]
    bestreden_bedrag: Option<String>,
    #[serde(rename = "NietBestredenBedrag")]
    niet_bestreden_bedrag: Option<String>,
    #[serde(rename = "Kosten")]
    kosten: Option<String>,
    #[serde(rename = "TotaalOpenstand")]
    totaal_openstand: Option<String>,
    #[serde(rename = "UB_BIJZONDERHEDEN")]
    ub_bijzonderheden: Option<String>,
    #[serde(rename = "RU_BIJZONDER")]
    ru_bijzonder: Option<String>,
    #[serde(rename = "UB_DATUM")]
    ub_datum: Option<String>,
}

impl CsvSourceRow {
    fn decode(self) -> Result<SourceRow> {
        let ub_id = match non_empty(self.ub_id.as_deref()) {
            Some(raw) => Some(raw.parse::<i32>().map_err(|e| EtlError::RowDecodeError {
                ub_id: 0,
                column: "UB_ID".to_string(),
                message: format!("invalid integer '{}': {}", raw, e),
            })?),
            None => None,
        };
        let id = ub_id.unwrap_or(0);

        Ok(SourceRow {
            ub_id,
            ih_cribnr: self.ih_cribnr,
            datum: parse_datetime(id, "Datum", self.datum.as_deref())?,
            betreffende: self.betreffende,
            aanslagnummer: self.aanslagnummer,
            bm_omschrijving: self.bm_omschrijving,
            periode: self.periode,
            openstand_bedrag: parse_decimal(id, "OpenstandBedrag", self.openstand_bedrag.as_deref())?,
            bestreden_bedrag: parse_decimal(id, "BestredenBedrag", self.bestreden_bedrag.as_deref())?,
            niet_bestreden_bedrag: parse_decimal(
                id,
                "NietBestredenBedrag",
                self.niet_bestreden_bedrag.as_deref(),
            )?,
            kosten: parse_decimal(id, "Kosten", self.kosten.as_deref())?,
            totaal_openstand: parse_decimal(id, "TotaalOpenstand", self.totaal_openstand.as_deref())?,
            ub_bijzonderheden: self.ub_bijzonderheden,
            ru_bijzonder: self.ru_bijzonder,
            ub_datum: parse_datetime(id, "UB_DATUM", self.ub_datum.as_deref())?,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_decimal(ub_id: i32, column: &str, value: Option<&str>) -> Result<Option<Decimal>> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };
    Decimal::from_str(raw)
        .map(Some)
        .map_err(|e| EtlError::RowDecodeError {
            ub_id,
            column: column.to_string(),
            message: format!("invalid decimal '{}': {}", raw, e),
        })
}

pub fn parse_datetime(ub_id: i32, column: &str, value: Option<&str>) -> Result<Option<NaiveDateTime>> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(parsed));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date.and_time(NaiveTime::default())));
    }

    Err(EtlError::RowDecodeError {
        ub_id,
        column: column.to_string(),
        message: format!("invalid date '{}'", raw),
    })
}

/// Reads objection rows from a headered CSV export. Empty cells are nulls.
pub struct CsvRowSource<R: Read> {
    rows: csv::DeserializeRecordsIntoIter<R, CsvSourceRow>,
    done: bool,
}

impl CsvRowSource<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read> CsvRowSource<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers()?;
        let missing: Vec<&str> = SOURCE_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h.trim() == *column))
            .collect();
        if !missing.is_empty() {
            return Err(EtlError::ProcessingError {
                message: format!("input is missing columns: {}", missing.join(", ")),
            });
        }

        Ok(Self {
            rows: reader.into_deserialize(),
            done: false,
        })
    }
}

impl<R: Read> Iterator for CsvRowSource<R> {
    type Item = Result<SourceRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.rows.next()? {
            Ok(row) => Some(row.decode()),
            Err(e) => {
                // IO 錯誤後讀取器無法繼續
                if e.is_io_error() {
                    tracing::error!("Input read failed, stopping: {}", e);
                    self.done = true;
                }
                Some(Err(EtlError::CsvError(e)))
            }
        }
    }
}

pub trait CsvHeader {
    fn headers() -> &'static [&'static str];
}

impl CsvHeader for SuccessRow {
    fn headers() -> &'static [&'static str] {
        &["UB_ID", "ProcessedDateTime", "ApiResponse"]
    }
}

impl CsvHeader for ErrorRow {
    fn headers() -> &'static [&'static str] {
        &["UB_ID", "ErrorDescription"]
    }
}

/// Headered CSV output. The header is written even when no rows follow.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    pub fn create<T: CsvHeader, P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::from_writer::<T>(File::create(path)?)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer<T: CsvHeader>(writer: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(T::headers())?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| EtlError::IoError(e.into_error()))
    }
}

impl<T: Serialize, W: Write + Send> RowSink<T> for CsvSink<W> {
    fn write_row(&mut self, row: &T) -> Result<()> {
        self.writer.serialize(row)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "UB_ID,IH_CRIBNR,Datum,Betreffende,Aanslagnummer,BM_OMSCHRIJVING,Periode,OpenstandBedrag,BestredenBedrag,NietBestredenBedrag,Kosten,TotaalOpenstand,UB_BIJZONDERHEDEN,RU_BIJZONDER,UB_DATUM";

    fn read_all(body: &str) -> Vec<Result<SourceRow>> {
        let input = format!("{}\n{}", HEADER, body);
        CsvRowSource::from_reader(input.as_bytes()).unwrap().collect()
    }

    #[test]
    fn test_reads_full_row() {
        let rows = read_all(
            "1001,CRIB-778,2024-03-15T09:30:00,Aanslag 2023,A-2023-0042,WOZ,2023,1250.50,800.00,450.50,12.75,1263.25,Geen,Spoed,2024-04-01\n",
        );

        assert_eq!(rows.len(), 1);
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.ub_id, Some(1001));
        assert_eq!(row.ih_cribnr.as_deref(), Some("CRIB-778"));
        assert_eq!(
            row.datum,
            NaiveDate::from_ymd_opt(2024, 3, 15).and_then(|d| d.and_hms_opt(9, 30, 0))
        );
        assert_eq!(row.openstand_bedrag.unwrap().to_string(), "1250.50");
        assert_eq!(row.kosten.unwrap().to_string(), "12.75");
        assert_eq!(
            row.ub_datum,
            NaiveDate::from_ymd_opt(2024, 4, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
    }

    #[test]
    fn test_empty_cells_are_null() {
        let rows = read_all("5,,,,,,,,,,,,,,\n");

        let row = rows[0].as_ref().unwrap();
        assert_eq!(
            *row,
            SourceRow {
                ub_id: Some(5),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_invalid_decimal_keeps_row_id() {
        let rows = read_all("9,CRIB,,,A-1,,,abc,,,,,,,\n10,CRIB,,,A-2,,,,,,,,,,\n");

        assert_eq!(rows.len(), 2);
        let err = rows[0].as_ref().unwrap_err();
        assert_eq!(err.row_id(), Some(9));
        assert!(err.to_string().contains("OpenstandBedrag"));
        assert!(rows[1].is_ok());
    }

    #[test]
    fn test_invalid_ub_id_is_decode_error() {
        let rows = read_all("x1,CRIB,,,A-1,,,,,,,,,,\n");
        let err = rows[0].as_ref().unwrap_err();
        assert_eq!(err.row_id(), Some(0));
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime(1, "Datum", Some("2024-01-02T03:04:05.123")).unwrap().is_some());
        assert!(parse_datetime(1, "Datum", Some("2024-01-02 03:04:05")).unwrap().is_some());
        assert!(parse_datetime(1, "Datum", Some("2024-01-02")).unwrap().is_some());
        assert!(parse_datetime(1, "Datum", Some("  ")).unwrap().is_none());
        assert!(parse_datetime(1, "Datum", Some("02/01/2024")).is_err());
    }

    #[test]
    fn test_missing_columns_rejected() {
        let result = CsvRowSource::from_reader("UB_ID,IH_CRIBNR\n1,CRIB\n".as_bytes());
        let err = result.err().unwrap();
        assert!(err.to_string().contains("Aanslagnummer"));
    }

    #[test]
    fn test_sink_writes_header_and_rows() {
        let mut sink = CsvSink::from_writer::<ErrorRow>(Vec::new()).unwrap();
        sink.write_row(&ErrorRow {
            ub_id: 3,
            error_description: "API call failed".to_string(),
        })
        .unwrap();
        RowSink::<ErrorRow>::flush(&mut sink).unwrap();

        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(output, "UB_ID,ErrorDescription\n3,API call failed\n");
    }

    #[test]
    fn test_sink_header_without_rows() {
        let sink = CsvSink::from_writer::<SuccessRow>(Vec::new()).unwrap();
        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(output, "UB_ID,ProcessedDateTime,ApiResponse\n");
    }
}
