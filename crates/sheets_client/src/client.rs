//! Sheets v4 / Drive v3 HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Covers what the write-back cache needs: spreadsheet metadata, full
//! worksheet read, batched cell write, row append and insert, Office file
//! conversion.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use sheetsync_core::address::quote_worksheet;
use sheetsync_core::{CellWrite, RemoteError, RemoteStore, SpreadsheetInfo, WorksheetIdentity};

use crate::error::{api_message, SheetsError};

pub const DEFAULT_SHEETS_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_DRIVE_BASE: &str = "https://www.googleapis.com";

const SPREADSHEET_FIELDS: &str = "spreadsheetId,properties.title,sheets.properties.title";
const SHEET_ID_FIELDS: &str = "sheets.properties(sheetId,title)";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
/// Identifiers of uploaded Office files carry this suffix.
const OFFICE_SUFFIX: &str = "-isc";
/// Values are parsed as if typed into the UI, so `=TIME(...)` becomes a formula.
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// Google Sheets API client (blocking).
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    sheets_base: String,
    drive_base: String,
    token: String,
}

// ── Response shapes ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetResponse {
    spreadsheet_id: String,
    #[serde(default)]
    properties: Option<TitleProperties>,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: TitleProperties,
}

#[derive(Debug, Deserialize)]
struct TitleProperties {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetIdsResponse {
    #[serde(default)]
    sheets: Vec<SheetIdEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetIdEntry {
    properties: SheetIdProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetIdProperties {
    sheet_id: i64,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
}

impl SheetsClient {
    /// Client against the public Google endpoints.
    pub fn new(token: String, timeout: Duration) -> Result<Self, SheetsError> {
        Self::with_base_urls(token, DEFAULT_SHEETS_BASE.into(), DEFAULT_DRIVE_BASE.into(), timeout)
    }

    /// Client against explicit API roots (tests, proxies).
    pub fn with_base_urls(
        token: String,
        sheets_base: String,
        drive_base: String,
        timeout: Duration,
    ) -> Result<Self, SheetsError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("sheetsync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        Ok(Self {
            http,
            sheets_base: sheets_base.trim_end_matches('/').to_string(),
            drive_base: drive_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Spreadsheet title and worksheet titles in tab order.
    pub fn spreadsheet_info(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, SheetsError> {
        let url = self.sheets_url(&["v4", "spreadsheets", spreadsheet_id])?;
        log::debug!("GET spreadsheet {}", spreadsheet_id);
        let resp = self.send(self.http.get(url).query(&[("fields", SPREADSHEET_FIELDS)]))?;
        let body: SpreadsheetResponse = resp.json().map_err(|e| SheetsError::Parse(e.to_string()))?;

        Ok(SpreadsheetInfo {
            id: body.spreadsheet_id,
            title: body.properties.map(|p| p.title).unwrap_or_default(),
            worksheets: body.sheets.into_iter().map(|s| s.properties.title).collect(),
        })
    }

    /// Every populated row of a worksheet, as displayed text.
    pub fn values(&self, spreadsheet_id: &str, worksheet: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let range = quote_worksheet(worksheet);
        let url = self.sheets_url(&["v4", "spreadsheets", spreadsheet_id, "values", &range])?;
        log::debug!("GET values {}!{}", spreadsheet_id, range);
        let resp = self.send(self.http.get(url))?;
        let body: ValueRange = resp.json().map_err(|e| SheetsError::Parse(e.to_string()))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    /// Write many cells in one `values:batchUpdate` request.
    pub fn batch_update(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        writes: &[CellWrite],
    ) -> Result<(), SheetsError> {
        let url = self.sheets_url(&["v4", "spreadsheets", spreadsheet_id, "values:batchUpdate"])?;
        let data: Vec<serde_json::Value> = writes
            .iter()
            .map(|w| {
                serde_json::json!({
                    "range": w.address.qualified(worksheet),
                    "values": [[w.value]],
                })
            })
            .collect();
        let body = serde_json::json!({
            "valueInputOption": VALUE_INPUT_OPTION,
            "data": data,
        });

        log::debug!("POST batchUpdate {} ({} cell(s))", spreadsheet_id, writes.len());
        self.send(self.http.post(url).json(&body))?;
        Ok(())
    }

    /// Append one row after the worksheet's last populated row.
    pub fn append(&self, spreadsheet_id: &str, worksheet: &str, row: &[String]) -> Result<(), SheetsError> {
        let segment = format!("{}:append", quote_worksheet(worksheet));
        let url = self.sheets_url(&["v4", "spreadsheets", spreadsheet_id, "values", &segment])?;
        let body = serde_json::json!({ "values": [row] });

        log::debug!("POST append {}!{}", spreadsheet_id, worksheet);
        self.send(
            self.http
                .post(url)
                .query(&[("valueInputOption", VALUE_INPUT_OPTION), ("insertDataOption", "INSERT_ROWS")])
                .json(&body),
        )?;
        Ok(())
    }

    /// Numeric id of a worksheet, needed by structural requests.
    pub fn sheet_id(&self, spreadsheet_id: &str, worksheet: &str) -> Result<i64, SheetsError> {
        let url = self.sheets_url(&["v4", "spreadsheets", spreadsheet_id])?;
        let resp = self.send(self.http.get(url).query(&[("fields", SHEET_ID_FIELDS)]))?;
        let body: SheetIdsResponse = resp.json().map_err(|e| SheetsError::Parse(e.to_string()))?;

        body.sheets
            .into_iter()
            .find(|s| s.properties.title == worksheet)
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| SheetsError::Http(404, format!("worksheet '{}' not found", worksheet)))
    }

    /// Insert one empty row before each 0-based index, in order, in a
    /// single `batchUpdate` request.
    pub fn insert_empty_rows(&self, spreadsheet_id: &str, worksheet: &str, positions: &[usize]) -> Result<(), SheetsError> {
        let sheet_id = self.sheet_id(spreadsheet_id, worksheet)?;
        let segment = format!("{}:batchUpdate", spreadsheet_id);
        let url = self.sheets_url(&["v4", "spreadsheets", &segment])?;
        let requests: Vec<serde_json::Value> = positions
            .iter()
            .map(|&at| {
                serde_json::json!({
                    "insertDimension": {
                        "range": {
                            "sheetId": sheet_id,
                            "dimension": "ROWS",
                            "startIndex": at,
                            "endIndex": at + 1,
                        },
                        "inheritFromBefore": false,
                    }
                })
            })
            .collect();

        log::debug!("POST batchUpdate {} ({} row insert(s))", spreadsheet_id, positions.len());
        self.send(self.http.post(url).json(&serde_json::json!({ "requests": requests })))?;
        Ok(())
    }

    /// Copy an uploaded Office file into a native spreadsheet.
    /// Returns the new spreadsheet's id.
    pub fn convert_office_file(&self, file_id: &str) -> Result<String, SheetsError> {
        let file_id = file_id.strip_suffix(OFFICE_SUFFIX).unwrap_or(file_id);

        let url = self.drive_url(&["drive", "v3", "files", file_id])?;
        let resp = self.send(self.http.get(url).query(&[("fields", "name")]))?;
        let original: DriveFile = resp.json().map_err(|e| SheetsError::Parse(e.to_string()))?;

        let url = self.drive_url(&["drive", "v3", "files", file_id, "copy"])?;
        let body = serde_json::json!({
            "name": format!("{} (Converted)", original.name),
            "mimeType": SPREADSHEET_MIME,
        });
        log::info!("converting Office file {} to a spreadsheet", file_id);
        let resp = self.send(self.http.post(url).json(&body))?;
        let copy: DriveFile = resp.json().map_err(|e| SheetsError::Parse(e.to_string()))?;
        if copy.id.is_empty() {
            return Err(SheetsError::Parse("Missing id in copy response".into()));
        }
        Ok(copy.id)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn sheets_url(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        build_url(&self.sheets_base, segments)
    }

    fn drive_url(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        build_url(&self.drive_base, segments)
    }

    fn send(&self, req: reqwest::blocking::RequestBuilder) -> Result<reqwest::blocking::Response, SheetsError> {
        let response = req
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            log::warn!("Sheets API returned HTTP {}", status);
            return Err(SheetsError::Http(status, api_message(&body)));
        }

        Ok(response)
    }
}

impl RemoteStore for SheetsClient {
    fn open_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, RemoteError> {
        let id = if is_office_file_id(spreadsheet_id) {
            self.convert_office_file(spreadsheet_id)?
        } else {
            spreadsheet_id.to_string()
        };
        Ok(self.spreadsheet_info(&id)?)
    }

    fn read_all(&self, identity: &WorksheetIdentity) -> Result<Vec<Vec<String>>, RemoteError> {
        Ok(self.values(identity.spreadsheet_id(), identity.worksheet())?)
    }

    fn batch_write(&self, identity: &WorksheetIdentity, writes: &[CellWrite]) -> Result<(), RemoteError> {
        Ok(self.batch_update(identity.spreadsheet_id(), identity.worksheet(), writes)?)
    }

    fn append_remote_row(&self, identity: &WorksheetIdentity, row: &[String]) -> Result<(), RemoteError> {
        Ok(self.append(identity.spreadsheet_id(), identity.worksheet(), row)?)
    }

    fn insert_rows(&self, identity: &WorksheetIdentity, positions: &[usize]) -> Result<(), RemoteError> {
        Ok(self.insert_empty_rows(identity.spreadsheet_id(), identity.worksheet(), positions)?)
    }
}

// ── Free functions ──────────────────────────────────────────────────

/// True for identifiers of uploaded Office files that must be converted
/// before the Sheets API can open them.
pub fn is_office_file_id(id: &str) -> bool {
    id.ends_with(OFFICE_SUFFIX)
}

fn build_url(base: &str, segments: &[&str]) -> Result<Url, SheetsError> {
    let mut url = Url::parse(base).map_err(|e| SheetsError::Network(format!("bad API base '{}': {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| SheetsError::Network(format!("bad API base '{}'", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Formatted values are strings; anything else is rendered as JSON text.
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
