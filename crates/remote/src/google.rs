//! Google Sheets backend.
//!
//! Workbooks are spreadsheets found through the Drive API; tabs are sheets
//! inside them. Requests carry a bearer token obtained outside this crate.

use crate::error::{RemoteError, RemoteResult, ResourceKind};
use crate::store::{sheet_from_rows, SheetStore};
use crate::types::{ShareRequest, Workbook, WorkbookInfo};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use sheetsync_sheet::CellValue;
use std::fmt;
use std::time::Duration;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const FILE_FIELDS: &str = "nextPageToken,files(id,name,webViewLink,modifiedTime)";

/// Connection settings for [`GoogleSheetsStore`].
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GoogleSheetsConfig {
    /// Base URL of the Sheets API.
    pub sheets_url: String,
    /// Base URL of the Drive API.
    pub drive_url: String,
    /// OAuth access token sent as a bearer token.
    pub access_token: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for GoogleSheetsConfig {
    fn default() -> Self {
        GoogleSheetsConfig {
            sheets_url: "https://sheets.googleapis.com".to_string(),
            drive_url: "https://www.googleapis.com".to_string(),
            access_token: None,
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for GoogleSheetsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleSheetsConfig")
            .field("sheets_url", &self.sheets_url)
            .field("drive_url", &self.drive_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// [`SheetStore`] backed by the Google Sheets and Drive REST APIs.
pub struct GoogleSheetsStore {
    client: Client,
    sheets_url: Url,
    drive_url: Url,
    token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    web_view_link: Option<String>,
    modified_time: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
    spreadsheet_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TabProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct TabEntry {
    properties: TabProperties,
}

#[derive(Deserialize)]
struct SpreadsheetTabs {
    #[serde(default)]
    sheets: Vec<TabEntry>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

impl GoogleSheetsStore {
    /// Build a store from configuration.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Unavailable` when no access token is configured
    /// or the HTTP client cannot be built, and `RemoteError::InvalidUrl` for
    /// unusable base URLs.
    pub fn new(config: &GoogleSheetsConfig) -> RemoteResult<Self> {
        let token = config
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| RemoteError::Unavailable("no access token configured".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("sheetsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            sheets_url: parse_base(&config.sheets_url)?,
            drive_url: parse_base(&config.drive_url)?,
            token,
        })
    }

    fn sheets_endpoint(&self, segments: &[&str]) -> RemoteResult<Url> {
        endpoint(&self.sheets_url, segments)
    }

    fn drive_endpoint(&self, segments: &[&str]) -> RemoteResult<Url> {
        endpoint(&self.drive_url, segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, %url, "remote request");
        self.client.request(method, url).bearer_auth(&self.token)
    }

    /// Send a request and decode its JSON body. `subject` names what a 404
    /// refers to.
    async fn send(
        &self,
        request: RequestBuilder,
        subject: (ResourceKind, &str),
    ) -> RemoteResult<JsonValue> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(status_error(status, &body, subject));
        }

        if body.trim().is_empty() {
            return Ok(JsonValue::Null);
        }
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn send_as<T: for<'de> Deserialize<'de>>(
        &self,
        request: RequestBuilder,
        subject: (ResourceKind, &str),
    ) -> RemoteResult<T> {
        let value = self.send(request, subject).await?;
        serde_json::from_value(value).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// Page through Drive spreadsheets matching an optional exact name.
    async fn find_spreadsheets(&self, name: Option<&str>) -> RemoteResult<Vec<DriveFile>> {
        let mut query = format!("mimeType = '{SPREADSHEET_MIME}' and trashed = false");
        if let Some(name) = name {
            query.push_str(&format!(" and name = '{}'", escape_query(name)));
        }

        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = self.drive_endpoint(&["drive", "v3", "files"])?;
            let mut request = self
                .request(Method::GET, url)
                .query(&[("q", query.as_str()), ("fields", FILE_FIELDS)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: DriveFileList = self
                .send_as(request, (ResourceKind::Workbook, name.unwrap_or("*")))
                .await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(files)
    }

    async fn tab_properties(&self, workbook: &Workbook) -> RemoteResult<Vec<TabProperties>> {
        let url = self.sheets_endpoint(&["v4", "spreadsheets", &workbook.id])?;
        let request = self
            .request(Method::GET, url)
            .query(&[("fields", "sheets.properties(sheetId,title)")]);
        let tabs: SpreadsheetTabs = self
            .send_as(request, (ResourceKind::Workbook, &workbook.name))
            .await?;
        Ok(tabs.sheets.into_iter().map(|s| s.properties).collect())
    }

    async fn batch_update(
        &self,
        workbook: &Workbook,
        body: JsonValue,
        subject: (ResourceKind, &str),
    ) -> RemoteResult<()> {
        let segment = format!("{}:batchUpdate", workbook.id);
        let url = self.sheets_endpoint(&["v4", "spreadsheets", &segment])?;
        self.send(self.request(Method::POST, url).json(&body), subject)
            .await?;
        Ok(())
    }

    fn values_url(&self, workbook: &Workbook, range: &str) -> RemoteResult<Url> {
        self.sheets_endpoint(&["v4", "spreadsheets", &workbook.id, "values", range])
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    async fn create_workbook(&self, name: &str) -> RemoteResult<Workbook> {
        if !self.find_spreadsheets(Some(name)).await?.is_empty() {
            return Err(RemoteError::already_exists(ResourceKind::Workbook, name));
        }

        let url = self.sheets_endpoint(&["v4", "spreadsheets"])?;
        let body = json!({ "properties": { "title": name } });
        let created: CreatedSpreadsheet = self
            .send_as(
                self.request(Method::POST, url).json(&body),
                (ResourceKind::Workbook, name),
            )
            .await?;

        tracing::info!(workbook = name, id = %created.spreadsheet_id, "created workbook");
        Ok(Workbook {
            id: created.spreadsheet_id,
            name: name.to_string(),
            url: created.spreadsheet_url,
        })
    }

    async fn share_workbook(&self, workbook: &Workbook, share: &ShareRequest) -> RemoteResult<()> {
        let url = self.drive_endpoint(&["drive", "v3", "files", &workbook.id, "permissions"])?;
        let notify = if share.notify { "true" } else { "false" };
        let mut request = self
            .request(Method::POST, url)
            .query(&[("sendNotificationEmail", notify)])
            .json(&json!({
                "type": "user",
                "role": share.role.as_str(),
                "emailAddress": share.email,
            }));
        if let (true, Some(message)) = (share.notify, &share.message) {
            request = request.query(&[("emailMessage", message.as_str())]);
        }

        self.send(request, (ResourceKind::Workbook, &workbook.name))
            .await?;
        Ok(())
    }

    async fn fetch_workbook(&self, name: &str) -> RemoteResult<Workbook> {
        let file = self
            .find_spreadsheets(Some(name))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::not_found(ResourceKind::Workbook, name))?;

        Ok(Workbook {
            id: file.id,
            name: file.name,
            url: file.web_view_link,
        })
    }

    async fn list_workbooks(&self) -> RemoteResult<Vec<WorkbookInfo>> {
        Ok(self
            .find_spreadsheets(None)
            .await?
            .into_iter()
            .map(|file| WorkbookInfo {
                id: file.id,
                name: file.name,
                url: file.web_view_link,
                modified: file.modified_time,
            })
            .collect())
    }

    async fn delete_workbook(&self, workbook: &Workbook) -> RemoteResult<()> {
        let url = self.drive_endpoint(&["drive", "v3", "files", &workbook.id])?;
        self.send(
            self.request(Method::DELETE, url),
            (ResourceKind::Workbook, &workbook.name),
        )
        .await?;
        tracing::info!(workbook = %workbook.name, id = %workbook.id, "deleted workbook");
        Ok(())
    }

    async fn tab_names(&self, workbook: &Workbook) -> RemoteResult<Vec<String>> {
        Ok(self
            .tab_properties(workbook)
            .await?
            .into_iter()
            .map(|p| p.title)
            .collect())
    }

    async fn create_tab(&self, workbook: &Workbook, tab: &str) -> RemoteResult<()> {
        if self
            .tab_properties(workbook)
            .await?
            .iter()
            .any(|p| p.title == tab)
        {
            return Err(RemoteError::already_exists(ResourceKind::Tab, tab));
        }

        let body = json!({ "requests": [{ "addSheet": { "properties": { "title": tab } } }] });
        self.batch_update(workbook, body, (ResourceKind::Tab, tab))
            .await
    }

    async fn delete_tab(&self, workbook: &Workbook, tab: &str) -> RemoteResult<()> {
        let sheet_id = self
            .tab_properties(workbook)
            .await?
            .into_iter()
            .find(|p| p.title == tab)
            .map(|p| p.sheet_id)
            .ok_or_else(|| RemoteError::not_found(ResourceKind::Tab, tab))?;

        let body = json!({ "requests": [{ "deleteSheet": { "sheetId": sheet_id } }] });
        self.batch_update(workbook, body, (ResourceKind::Tab, tab))
            .await
    }

    async fn fetch_tab(
        &self,
        workbook: &Workbook,
        tab: &str,
    ) -> RemoteResult<sheetsync_sheet::Sheet> {
        let url = self.values_url(workbook, &quote_tab(tab))?;
        let request = self.request(Method::GET, url).query(&[
            ("valueRenderOption", "UNFORMATTED_VALUE"),
            ("dateTimeRenderOption", "FORMATTED_STRING"),
        ]);
        let range: ValueRange = self.send_as(request, (ResourceKind::Tab, tab)).await?;

        let rows = range
            .values
            .iter()
            .map(|row| row.iter().map(CellValue::from_json).collect())
            .collect();
        sheet_from_rows(tab, rows)
    }

    async fn insert_rows(
        &self,
        workbook: &Workbook,
        tab: &str,
        rows: &[Vec<CellValue>],
    ) -> RemoteResult<()> {
        let range = format!("{}!A1", quote_tab(tab));
        let url = self.values_url(workbook, &range)?;
        let request = self
            .request(Method::PUT, url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&values_body(Some(&range), rows));

        self.send(request, (ResourceKind::Tab, tab)).await?;
        tracing::debug!(tab, rows = rows.len(), "inserted rows");
        Ok(())
    }

    async fn append_rows(
        &self,
        workbook: &Workbook,
        tab: &str,
        rows: &[Vec<CellValue>],
    ) -> RemoteResult<()> {
        let segment = format!("{}:append", quote_tab(tab));
        let url = self.values_url(workbook, &segment)?;
        let request = self
            .request(Method::POST, url)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&values_body(None, rows));

        self.send(request, (ResourceKind::Tab, tab)).await?;
        Ok(())
    }
}

fn parse_base(raw: &str) -> RemoteResult<Url> {
    let url = Url::parse(raw).map_err(|e| RemoteError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(RemoteError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

fn endpoint(base: &Url, segments: &[&str]) -> RemoteResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| RemoteError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// A1 range for a whole tab: the name in single quotes, inner quotes doubled.
fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// Escape a literal for a Drive `q` expression.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn values_body(range: Option<&str>, rows: &[Vec<CellValue>]) -> JsonValue {
    let values: Vec<Vec<JsonValue>> = rows
        .iter()
        .map(|row| row.iter().map(CellValue::to_json).collect())
        .collect();
    let mut body = json!({ "majorDimension": "ROWS", "values": values });
    if let Some(range) = range {
        body["range"] = JsonValue::String(range.to_string());
    }
    body
}

fn status_error(status: StatusCode, body: &str, (kind, name): (ResourceKind, &str)) -> RemoteError {
    let message = serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RemoteError::Unavailable(format!("HTTP {} - {message}", status.as_u16()))
        }
        StatusCode::NOT_FOUND => RemoteError::not_found(kind, name),
        _ => RemoteError::Api {
            status: status.as_u16(),
            message,
        },
    }
}
