//! In-process store with the same naming rules as the remote backends.
//!
//! Every trait call is recorded so callers can assert on the exact sequence
//! of store operations a workflow performs.

use crate::error::{RemoteError, RemoteResult, ResourceKind};
use crate::store::{sheet_from_rows, SheetStore};
use crate::types::{ShareRequest, Workbook, WorkbookInfo, DEFAULT_TAB};
use async_trait::async_trait;
use indexmap::IndexMap;
use sheetsync_sheet::{CellValue, Sheet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One recorded store operation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    CreateWorkbook { name: String },
    ShareWorkbook { workbook: String, email: String },
    FetchWorkbook { name: String },
    ListWorkbooks,
    DeleteWorkbook { name: String },
    TabNames { workbook: String },
    CreateTab { workbook: String, tab: String },
    DeleteTab { workbook: String, tab: String },
    FetchTab { workbook: String, tab: String },
    InsertRows { workbook: String, tab: String, rows: Vec<Vec<CellValue>> },
    AppendRows { workbook: String, tab: String, rows: Vec<Vec<CellValue>> },
}

#[derive(Debug, Default)]
struct StoredWorkbook {
    id: String,
    tabs: IndexMap<String, Vec<Vec<CellValue>>>,
    shares: Vec<ShareRequest>,
}

#[derive(Debug, Default)]
struct State {
    workbooks: IndexMap<String, StoredWorkbook>,
    calls: Vec<StoreCall>,
    unavailable: bool,
}

/// [`SheetStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent call fail with `RemoteError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Recorded calls, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Raw rows of a tab, header included.
    pub fn rows(&self, workbook: &str, tab: &str) -> Option<Vec<Vec<CellValue>>> {
        self.lock()
            .workbooks
            .get(workbook)
            .and_then(|wb| wb.tabs.get(tab))
            .cloned()
    }

    /// Shares granted on a workbook.
    pub fn shares(&self, workbook: &str) -> Vec<ShareRequest> {
        self.lock()
            .workbooks
            .get(workbook)
            .map(|wb| wb.shares.clone())
            .unwrap_or_default()
    }

    /// Record `call` and hand back the state, or fail if unavailable.
    fn begin(&self, call: StoreCall) -> RemoteResult<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.unavailable {
            return Err(RemoteError::Unavailable("memory store offline".to_string()));
        }
        Ok(state)
    }
}

fn workbook_mut<'a>(state: &'a mut State, workbook: &Workbook) -> RemoteResult<&'a mut StoredWorkbook> {
    state
        .workbooks
        .get_mut(&workbook.name)
        .ok_or_else(|| RemoteError::not_found(ResourceKind::Workbook, &workbook.name))
}

fn tab_mut<'a>(
    state: &'a mut State,
    workbook: &Workbook,
    tab: &str,
) -> RemoteResult<&'a mut Vec<Vec<CellValue>>> {
    workbook_mut(state, workbook)?
        .tabs
        .get_mut(tab)
        .ok_or_else(|| RemoteError::not_found(ResourceKind::Tab, tab))
}

#[async_trait]
impl SheetStore for MemoryStore {
    async fn create_workbook(&self, name: &str) -> RemoteResult<Workbook> {
        let mut state = self.begin(StoreCall::CreateWorkbook {
            name: name.to_string(),
        })?;
        if state.workbooks.contains_key(name) {
            return Err(RemoteError::already_exists(ResourceKind::Workbook, name));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let mut tabs = IndexMap::new();
        tabs.insert(DEFAULT_TAB.to_string(), Vec::new());
        state.workbooks.insert(
            name.to_string(),
            StoredWorkbook {
                id: id.clone(),
                tabs,
                shares: Vec::new(),
            },
        );

        Ok(Workbook {
            url: Some(format!("memory://{id}")),
            id,
            name: name.to_string(),
        })
    }

    async fn share_workbook(&self, workbook: &Workbook, share: &ShareRequest) -> RemoteResult<()> {
        let mut state = self.begin(StoreCall::ShareWorkbook {
            workbook: workbook.name.clone(),
            email: share.email.clone(),
        })?;
        workbook_mut(&mut state, workbook)?.shares.push(share.clone());
        Ok(())
    }

    async fn fetch_workbook(&self, name: &str) -> RemoteResult<Workbook> {
        let state = self.begin(StoreCall::FetchWorkbook {
            name: name.to_string(),
        })?;
        let stored = state
            .workbooks
            .get(name)
            .ok_or_else(|| RemoteError::not_found(ResourceKind::Workbook, name))?;
        Ok(Workbook {
            id: stored.id.clone(),
            name: name.to_string(),
            url: Some(format!("memory://{}", stored.id)),
        })
    }

    async fn list_workbooks(&self) -> RemoteResult<Vec<WorkbookInfo>> {
        let state = self.begin(StoreCall::ListWorkbooks)?;
        Ok(state
            .workbooks
            .iter()
            .map(|(name, wb)| WorkbookInfo {
                id: wb.id.clone(),
                name: name.clone(),
                url: Some(format!("memory://{}", wb.id)),
                modified: None,
            })
            .collect())
    }

    async fn delete_workbook(&self, workbook: &Workbook) -> RemoteResult<()> {
        let mut state = self.begin(StoreCall::DeleteWorkbook {
            name: workbook.name.clone(),
        })?;
        state
            .workbooks
            .shift_remove(&workbook.name)
            .map(|_| ())
            .ok_or_else(|| RemoteError::not_found(ResourceKind::Workbook, &workbook.name))
    }

    async fn tab_names(&self, workbook: &Workbook) -> RemoteResult<Vec<String>> {
        let mut state = self.begin(StoreCall::TabNames {
            workbook: workbook.name.clone(),
        })?;
        Ok(workbook_mut(&mut state, workbook)?.tabs.keys().cloned().collect())
    }

    async fn create_tab(&self, workbook: &Workbook, tab: &str) -> RemoteResult<()> {
        let mut state = self.begin(StoreCall::CreateTab {
            workbook: workbook.name.clone(),
            tab: tab.to_string(),
        })?;
        let stored = workbook_mut(&mut state, workbook)?;
        if stored.tabs.contains_key(tab) {
            return Err(RemoteError::already_exists(ResourceKind::Tab, tab));
        }
        stored.tabs.insert(tab.to_string(), Vec::new());
        Ok(())
    }

    async fn delete_tab(&self, workbook: &Workbook, tab: &str) -> RemoteResult<()> {
        let mut state = self.begin(StoreCall::DeleteTab {
            workbook: workbook.name.clone(),
            tab: tab.to_string(),
        })?;
        workbook_mut(&mut state, workbook)?
            .tabs
            .shift_remove(tab)
            .map(|_| ())
            .ok_or_else(|| RemoteError::not_found(ResourceKind::Tab, tab))
    }

    async fn fetch_tab(&self, workbook: &Workbook, tab: &str) -> RemoteResult<Sheet> {
        let mut state = self.begin(StoreCall::FetchTab {
            workbook: workbook.name.clone(),
            tab: tab.to_string(),
        })?;
        let rows = tab_mut(&mut state, workbook, tab)?.clone();
        sheet_from_rows(tab, rows)
    }

    async fn insert_rows(
        &self,
        workbook: &Workbook,
        tab: &str,
        rows: &[Vec<CellValue>],
    ) -> RemoteResult<()> {
        let mut state = self.begin(StoreCall::InsertRows {
            workbook: workbook.name.clone(),
            tab: tab.to_string(),
            rows: rows.to_vec(),
        })?;
        let stored = tab_mut(&mut state, workbook, tab)?;
        for (i, row) in rows.iter().enumerate() {
            if i < stored.len() {
                stored[i] = row.clone();
            } else {
                stored.push(row.clone());
            }
        }
        Ok(())
    }

    async fn append_rows(
        &self,
        workbook: &Workbook,
        tab: &str,
        rows: &[Vec<CellValue>],
    ) -> RemoteResult<()> {
        let mut state = self.begin(StoreCall::AppendRows {
            workbook: workbook.name.clone(),
            tab: tab.to_string(),
            rows: rows.to_vec(),
        })?;
        tab_mut(&mut state, workbook, tab)?.extend_from_slice(rows);
        Ok(())
    }
}
