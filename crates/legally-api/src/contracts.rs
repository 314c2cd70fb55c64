//! `/contracts/*` endpoints.

use futures::StreamExt;
use legally_core::entities::{Contract, ContractPage, UploadReceipt};
use reqwest::multipart::{Form, Part};

use crate::http::{check_response, decode_json};
use crate::{ApiClient, ApiError, ContractApi, ProgressFn, UploadFile};

impl ContractApi for ApiClient {
    async fn upload_contract(
        &self,
        token: &str,
        file: &UploadFile,
        progress: ProgressFn,
    ) -> Result<UploadReceipt, ApiError> {
        let total = file.size();
        let mut sent = 0u64;
        let chunks = futures::stream::iter(file.chunks()).map(move |chunk| {
            sent += chunk.len() as u64;
            progress(sent, total);
            Ok::<_, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(chunks), total)
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new().part("file", part);

        tracing::debug!(filename = %file.filename, size = total, "uploading contract");
        let resp = self
            .http
            .post(self.url("/contracts/upload"))
            .timeout(self.timeout)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        decode_json(resp).await
    }

    async fn list_contracts(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ContractPage, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/contracts?page={page}&page_size={page_size}")))
            .timeout(self.timeout)
            .bearer_auth(token)
            .send()
            .await?;
        decode_json(resp).await
    }

    async fn get_contract(&self, token: &str, contract_id: &str) -> Result<Contract, ApiError> {
        let path = format!("/contracts/{}", urlencoding::encode(contract_id));
        let resp = self
            .http
            .get(self.url(&path))
            .timeout(self.timeout)
            .bearer_auth(token)
            .send()
            .await?;
        decode_json(resp).await
    }

    async fn delete_contract(&self, token: &str, contract_id: &str) -> Result<(), ApiError> {
        let path = format!("/contracts/{}", urlencoding::encode(contract_id));
        let resp = self
            .http
            .delete(self.url(&path))
            .timeout(self.timeout)
            .bearer_auth(token)
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }
}
