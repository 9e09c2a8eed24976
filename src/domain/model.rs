use crate::utils::error::{EtlError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const INVALID_RECORD_MESSAGE: &str = "Invalid objection letter data - missing required fields";
pub const API_FAILURE_MESSAGE: &str = "API call failed";
pub const SUCCESS_RESPONSE: &str = "Success";

/// 上游資料表的一行。每個欄位都是 `Option`：`None` 即來源的 is-null 旗標。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    pub ub_id: Option<i32>,
    pub ih_cribnr: Option<String>,
    pub datum: Option<NaiveDateTime>,
    pub betreffende: Option<String>,
    pub aanslagnummer: Option<String>,
    pub bm_omschrijving: Option<String>,
    pub periode: Option<String>,
    pub openstand_bedrag: Option<Decimal>,
    pub bestreden_bedrag: Option<Decimal>,
    pub niet_bestreden_bedrag: Option<Decimal>,
    pub kosten: Option<Decimal>,
    pub totaal_openstand: Option<Decimal>,
    pub ub_bijzonderheden: Option<String>,
    pub ru_bijzonder: Option<String>,
    pub ub_datum: Option<NaiveDateTime>,
}

/// Sentinel for a null date column: 0001-01-01T00:00:00.
pub fn min_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .unwrap_or_default()
        .and_time(NaiveTime::default())
}

/// One objection letter, already null-coalesced and ready for the wire.
///
/// Field order is the wire key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectionRecord {
    #[serde(rename = "ih_cribnr")]
    pub identifier: String,
    #[serde(rename = "datum")]
    pub date: NaiveDateTime,
    #[serde(rename = "betreffende")]
    pub subject: String,
    #[serde(rename = "aanslagnummer")]
    pub assessment_number: String,
    #[serde(rename = "bm_omschrijving")]
    pub description: String,
    #[serde(rename = "periode")]
    pub period: String,
    #[serde(rename = "openstandBedrag", with = "rust_decimal::serde::arbitrary_precision")]
    pub outstanding_amount: Decimal,
    #[serde(rename = "bestredenBedrag", with = "rust_decimal::serde::arbitrary_precision")]
    pub disputed_amount: Decimal,
    #[serde(rename = "nietBestredenBedrag", with = "rust_decimal::serde::arbitrary_precision")]
    pub undisputed_amount: Decimal,
    #[serde(rename = "kosten", with = "rust_decimal::serde::arbitrary_precision")]
    pub costs: Decimal,
    #[serde(rename = "totaalOpenstand", with = "rust_decimal::serde::arbitrary_precision")]
    pub total_outstanding: Decimal,
    #[serde(rename = "ub_bijzonderheden")]
    pub special_circumstances: String,
    #[serde(rename = "ru_bijzonder")]
    pub special_remarks: String,
    #[serde(rename = "ub_id")]
    pub ub_id: i32,
    #[serde(rename = "ub_datum")]
    pub processed_date: NaiveDateTime,
}

impl ObjectionRecord {
    /// Coalesces nulls: strings to "", amounts to 0, dates to [`min_datetime`].
    ///
    /// `UB_ID` has no default, a null id is a construction fault.
    pub fn from_source(row: SourceRow) -> Result<Self> {
        let ub_id = row.ub_id.ok_or_else(|| EtlError::MissingFieldError {
            field: "UB_ID".to_string(),
        })?;

        Ok(Self {
            identifier: row.ih_cribnr.unwrap_or_default(),
            date: row.datum.unwrap_or_else(min_datetime),
            subject: row.betreffende.unwrap_or_default(),
            assessment_number: row.aanslagnummer.unwrap_or_default(),
            description: row.bm_omschrijving.unwrap_or_default(),
            period: row.periode.unwrap_or_default(),
            outstanding_amount: row.openstand_bedrag.unwrap_or_default(),
            disputed_amount: row.bestreden_bedrag.unwrap_or_default(),
            undisputed_amount: row.niet_bestreden_bedrag.unwrap_or_default(),
            costs: row.kosten.unwrap_or_default(),
            total_outstanding: row.totaal_openstand.unwrap_or_default(),
            special_circumstances: row.ub_bijzonderheden.unwrap_or_default(),
            special_remarks: row.ru_bijzonder.unwrap_or_default(),
            ub_id,
            processed_date: row.ub_datum.unwrap_or_else(min_datetime),
        })
    }

    pub fn is_valid(&self) -> bool {
        !self.identifier.is_empty() && !self.assessment_number.is_empty() && self.ub_id > 0
    }

    /// 緊湊 JSON (無多餘空白)
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Result of a single delivery attempt. Status codes are kept as plain `u16`
/// so the domain stays independent of the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success { status: u16, body: String },
    ApiRejected { status: u16, body: String },
    TransportError(String),
    Timeout(String),
    ValidationFailed(String),
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Success { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryOutcome::Success { .. } => "success",
            DeliveryOutcome::ApiRejected { .. } => "api_rejected",
            DeliveryOutcome::TransportError(_) => "transport_error",
            DeliveryOutcome::Timeout(_) => "timeout",
            DeliveryOutcome::ValidationFailed(_) => "validation_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessRow {
    #[serde(rename = "UB_ID")]
    pub ub_id: i32,
    #[serde(rename = "ProcessedDateTime")]
    pub processed_at: NaiveDateTime,
    #[serde(rename = "ApiResponse")]
    pub api_response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRow {
    #[serde(rename = "UB_ID")]
    pub ub_id: i32,
    #[serde(rename = "ErrorDescription")]
    pub error_description: String,
}

impl ErrorRow {
    pub fn processing_error(ub_id: i32, reason: impl std::fmt::Display) -> Self {
        Self {
            ub_id,
            error_description: format!("Processing error: {}", reason),
        }
    }
}

/// Exactly one of these is produced for every input row.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputRow {
    Success(SuccessRow),
    Error(ErrorRow),
}

impl OutputRow {
    pub fn from_outcome(ub_id: i32, outcome: &DeliveryOutcome, processed_at: NaiveDateTime) -> Self {
        match outcome {
            DeliveryOutcome::Success { .. } => OutputRow::Success(SuccessRow {
                ub_id,
                processed_at,
                api_response: SUCCESS_RESPONSE.to_string(),
            }),
            DeliveryOutcome::ValidationFailed(_) => OutputRow::Error(ErrorRow {
                ub_id,
                error_description: INVALID_RECORD_MESSAGE.to_string(),
            }),
            DeliveryOutcome::ApiRejected { .. }
            | DeliveryOutcome::TransportError(_)
            | DeliveryOutcome::Timeout(_) => OutputRow::Error(ErrorRow {
                ub_id,
                error_description: API_FAILURE_MESSAGE.to_string(),
            }),
        }
    }

    pub fn ub_id(&self) -> i32 {
        match self {
            OutputRow::Success(row) => row.ub_id,
            OutputRow::Error(row) => row.ub_id,
        }
    }
}
