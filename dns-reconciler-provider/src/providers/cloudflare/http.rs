//! Cloudflare HTTP 请求方法

use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{CF_API_BASE, CloudflareProvider, CloudflareResponse};

impl CloudflareProvider {
    /// 发送请求并解析 Cloudflare 响应信封
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: &str,
        path: &str,
        context: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        let request = request.header("Authorization", format!("Bearer {}", self.api_token));
        let (_status, response_text) =
            HttpUtils::execute_request(request, self.provider_name(), method, path).await?;

        let cf_response: CloudflareResponse<T> =
            HttpUtils::parse_json(&response_text, self.provider_name())?;

        if !cf_response.success {
            let raw = cf_response
                .errors
                .as_ref()
                .and_then(|errors| errors.first())
                .map_or_else(
                    || RawApiError::new("Unknown error"),
                    |e| RawApiError::with_code(e.code.to_string(), e.message.clone()),
                );
            log::warn!("[cloudflare] API error on {method} {path}: {}", raw.message);
            return Err(self.map_error(raw, context));
        }

        Ok(cf_response)
    }

    /// 执行 GET 请求，要求响应带 result
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{CF_API_BASE}{path}");
        self.send(self.client.get(&url), "GET", path, context)
            .await?
            .result
            .ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }

    /// 执行 GET 请求，只取 `result_info.total_count`
    pub(crate) async fn get_total_count(&self, path: &str, context: ErrorContext) -> Result<u32> {
        let url = format!("{CF_API_BASE}{path}");
        let response: CloudflareResponse<serde_json::Value> =
            self.send(self.client.get(&url), "GET", path, context).await?;
        Ok(response.result_info.map_or(0, |i| i.total_count))
    }

    /// 逐页拉取列表接口的全部结果
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        per_page: u32,
        context: ErrorContext,
    ) -> Result<Vec<T>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let paged = format!("{path}{separator}page={page}&per_page={per_page}");
            let url = format!("{CF_API_BASE}{paged}");
            let response: CloudflareResponse<Vec<T>> = self
                .send(self.client.get(&url), "GET", &paged, context.clone())
                .await?;

            let batch = response.result.unwrap_or_default();
            let fetched = batch.len();
            items.extend(batch);

            let last_page = match response.result_info {
                Some(info) => match info.total_pages {
                    Some(total_pages) => page >= total_pages,
                    None => items.len() >= info.total_count as usize,
                },
                None => true,
            };
            if last_page || fetched == 0 {
                break;
            }
            page += 1;
        }

        log::debug!("[cloudflare] GET {path}: {} items in {page} page(s)", items.len());
        Ok(items)
    }

    /// 执行 POST 请求
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{CF_API_BASE}{path}");
        self.send(self.client.post(&url).json(body), "POST", path, context)
            .await?
            .result
            .ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }

    /// 执行 PUT 请求（整条记录覆盖）
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{CF_API_BASE}{path}");
        self.send(self.client.put(&url).json(body), "PUT", path, context)
            .await?
            .result
            .ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }

    /// 执行 DELETE 请求
    pub(crate) async fn delete(&self, path: &str, context: ErrorContext) -> Result<()> {
        let url = format!("{CF_API_BASE}{path}");
        let _: CloudflareResponse<serde::de::IgnoredAny> = self
            .send(self.client.delete(&url), "DELETE", path, context)
            .await?;
        Ok(())
    }
}
