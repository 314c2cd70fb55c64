//! Contract uploads and the paged contract list.
//!
//! [`ContractLibrary::upload`] is the upload manager: it checks the file
//! type and size before any request, streams the multipart body while
//! tracking progress, and fetches the new contract once before returning its
//! id so callers never hold an id whose record is not yet readable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use legally_api::{ContractApi, ProgressFn, UploadFile};
use legally_auth::{AuthError, SharedToken};
use legally_core::BusyFlag;
use legally_core::entities::Contract;
use legally_core::upload::{progress_percent, validate_upload};

use crate::error::ClientError;

const UPLOAD_FAILED: &str = "Upload failed";
const FETCH_CONTRACT_FAILED: &str = "Failed to fetch contract";
const FETCH_CONTRACTS_FAILED: &str = "Failed to fetch contracts";
const DELETE_FAILED: &str = "Failed to delete contract";

/// The user's contracts and the upload pipeline.
pub struct ContractLibrary<C> {
    api: C,
    token: SharedToken,
    page_size: u32,
    contracts: Vec<Contract>,
    current: Option<Contract>,
    total: u64,
    page: u32,
    loading: BusyFlag,
    uploading: BusyFlag,
    progress: Arc<AtomicU8>,
    error: Option<String>,
}

impl<C: ContractApi> ContractLibrary<C> {
    pub fn new(api: C, token: SharedToken, page_size: u32) -> Self {
        Self {
            api,
            token,
            page_size: page_size.max(1),
            contracts: Vec::new(),
            current: None,
            total: 0,
            page: 1,
            loading: BusyFlag::new(),
            uploading: BusyFlag::new(),
            progress: Arc::new(AtomicU8::new(0)),
            error: None,
        }
    }

    #[must_use]
    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    #[must_use]
    pub const fn current(&self) -> Option<&Contract> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading.is_set()
    }

    #[must_use]
    pub fn uploading(&self) -> bool {
        self.uploading.is_set()
    }

    /// Upload progress in percent. Zero whenever no upload is running.
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn has_contracts(&self) -> bool {
        !self.contracts.is_empty()
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.page_size))
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn clear_current_contract(&mut self) {
        self.current = None;
    }

    // ── Upload ─────────────────────────────────────────────────────

    /// Validate, upload and re-fetch `file`. Returns the new contract id.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] for a disallowed type or an oversized
    ///   file; nothing is sent
    /// - [`ClientError::Auth`] when signed out; nothing is sent
    /// - [`ClientError::Network`] when the upload or the follow-up fetch fails
    pub async fn upload(&mut self, file: &UploadFile) -> Result<String, ClientError> {
        self.upload_with_progress(file, None).await
    }

    /// [`Self::upload`], also reporting `(bytes_sent, bytes_total)` to `observer`.
    ///
    /// # Errors
    ///
    /// See [`Self::upload`].
    pub async fn upload_with_progress(
        &mut self,
        file: &UploadFile,
        observer: Option<ProgressFn>,
    ) -> Result<String, ClientError> {
        if let Err(error) = validate_upload(&file.mime_type, file.size()) {
            self.error = Some(error.to_string());
            return Err(error.into());
        }
        let token = self.require_token()?;

        let _busy = self.uploading.raise();
        let _reset = ProgressReset(Arc::clone(&self.progress));
        self.progress.store(0, Ordering::Release);
        self.error = None;

        let progress = Arc::clone(&self.progress);
        let report: ProgressFn = Arc::new(move |sent, total| {
            if let Some(pct) = progress_percent(sent, total) {
                progress.store(pct, Ordering::Release);
            }
            if let Some(observer) = &observer {
                observer(sent, total);
            }
        });

        tracing::info!(filename = %file.filename, size = file.size(), "uploading contract");
        let result = self.api.upload_contract(&token, file, report).await;
        let receipt = result.map_err(|error| self.fail(&error, UPLOAD_FAILED))?;

        let result = self.api.get_contract(&token, &receipt.contract_id).await;
        let contract = result.map_err(|error| self.fail(&error, FETCH_CONTRACT_FAILED))?;
        tracing::debug!(contract_id = %contract.id, "upload confirmed");
        self.current = Some(contract);
        Ok(receipt.contract_id)
    }

    // ── Library ────────────────────────────────────────────────────

    /// Load one page of the list. Failures are recorded in [`Self::error`]
    /// and leave an empty first page; they are not returned.
    pub async fn fetch_contracts(&mut self, page: u32) {
        let Some(token) = self.token.get() else {
            self.error = Some(AuthError::NotAuthenticated.to_string());
            self.reset_list();
            return;
        };
        let _busy = self.loading.raise();
        self.error = None;
        match self.api.list_contracts(&token, page, self.page_size).await {
            Ok(listing) => {
                self.contracts = listing.contracts;
                self.total = listing.total;
                self.page = if listing.page == 0 { page } else { listing.page };
            }
            Err(error) => {
                tracing::warn!(%error, page, "listing contracts failed");
                self.error = Some(error.reason_or(FETCH_CONTRACTS_FAILED));
                self.reset_list();
            }
        }
    }

    /// Fetch one contract, make it current, and refresh its list entry.
    ///
    /// # Errors
    ///
    /// [`ClientError::Auth`] when signed out, otherwise the normalized failure.
    pub async fn fetch_contract(&mut self, contract_id: &str) -> Result<Contract, ClientError> {
        let token = self.require_token()?;
        let _busy = self.loading.raise();
        self.error = None;
        let result = self.api.get_contract(&token, contract_id).await;
        let contract = result.map_err(|error| self.fail(&error, FETCH_CONTRACT_FAILED))?;
        if let Some(entry) = self.contracts.iter_mut().find(|c| c.id == contract.id) {
            *entry = contract.clone();
        }
        self.current = Some(contract.clone());
        Ok(contract)
    }

    /// # Errors
    ///
    /// [`ClientError::Auth`] when signed out, otherwise the normalized failure.
    /// The list is unchanged on failure.
    pub async fn delete_contract(&mut self, contract_id: &str) -> Result<(), ClientError> {
        let token = self.require_token()?;
        let _busy = self.loading.raise();
        self.error = None;
        let result = self.api.delete_contract(&token, contract_id).await;
        result.map_err(|error| self.fail(&error, DELETE_FAILED))?;

        let before = self.contracts.len();
        self.contracts.retain(|c| c.id != contract_id);
        if self.contracts.len() < before {
            self.total = self.total.saturating_sub(1);
        }
        if self.current.as_ref().is_some_and(|c| c.id == contract_id) {
            self.current = None;
        }
        Ok(())
    }

    fn require_token(&mut self) -> Result<String, ClientError> {
        self.token.get().ok_or_else(|| {
            let error = AuthError::NotAuthenticated;
            self.error = Some(error.to_string());
            ClientError::Auth(error)
        })
    }

    fn fail(&mut self, error: &legally_api::ApiError, fallback: &str) -> ClientError {
        let error = ClientError::from_api(error, fallback);
        self.error = Some(error.to_string());
        error
    }

    fn reset_list(&mut self) {
        self.contracts.clear();
        self.total = 0;
        self.page = 1;
    }
}

/// Zeroes the progress counter on drop.
struct ProgressReset(Arc<AtomicU8>);

impl Drop for ProgressReset {
    fn drop(&mut self) {
        self.0.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoApi;

    impl ContractApi for NoApi {
        async fn upload_contract(
            &self,
            _token: &str,
            _file: &UploadFile,
            _progress: ProgressFn,
        ) -> Result<legally_core::entities::UploadReceipt, legally_api::ApiError> {
            unreachable!("no network in these tests")
        }
        async fn list_contracts(
            &self,
            _token: &str,
            _page: u32,
            _page_size: u32,
        ) -> Result<legally_core::entities::ContractPage, legally_api::ApiError> {
            unreachable!("no network in these tests")
        }
        async fn get_contract(
            &self,
            _token: &str,
            _id: &str,
        ) -> Result<Contract, legally_api::ApiError> {
            unreachable!("no network in these tests")
        }
        async fn delete_contract(&self, _token: &str, _id: &str) -> Result<(), legally_api::ApiError> {
            unreachable!("no network in these tests")
        }
    }

    #[test]
    fn total_pages_rounds_up() {
        let mut library = ContractLibrary::new(NoApi, SharedToken::new(), 10);
        assert_eq!(library.total_pages(), 0);
        library.total = 10;
        assert_eq!(library.total_pages(), 1);
        library.total = 11;
        assert_eq!(library.total_pages(), 2);
    }

    #[tokio::test]
    async fn fetch_contracts_signed_out_resets_without_network() {
        let mut library = ContractLibrary::new(NoApi, SharedToken::new(), 10);
        library.total = 4;
        library.page = 3;
        library.fetch_contracts(2).await;
        assert_eq!(library.total(), 0);
        assert_eq!(library.page(), 1);
        assert!(!library.has_contracts());
        assert!(library.error().is_some());
    }

    #[tokio::test]
    async fn upload_signed_out_is_auth_error() {
        let mut library = ContractLibrary::new(NoApi, SharedToken::new(), 10);
        let file = UploadFile::new(
            "a.pdf",
            legally_core::upload::MIME_PDF,
            bytes::Bytes::from_static(b"%PDF"),
        );
        let err = library.upload(&file).await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(AuthError::NotAuthenticated)));
        assert!(!library.uploading());
    }
}
