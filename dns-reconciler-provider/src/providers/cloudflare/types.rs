//! Cloudflare API 类型定义

use serde::{Deserialize, Serialize};

/// Cloudflare v4 响应信封
#[derive(Debug, Deserialize)]
pub struct CloudflareResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    pub errors: Option<Vec<CloudflareError>>,
    pub result_info: Option<CloudflareResultInfo>,
}

#[derive(Debug, Deserialize)]
pub struct CloudflareError {
    pub code: i32,
    pub message: String,
}

/// 分页信息；`total_pages` 在部分接口中缺失
#[derive(Debug, Deserialize)]
pub struct CloudflareResultInfo {
    pub total_count: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// `GET /zones` 和 `POST /zones` 返回的 Zone
#[derive(Debug, Deserialize)]
pub struct CloudflareZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub name_servers: Vec<String>,
}

/// `dns_records` 接口返回的记录
#[derive(Debug, Deserialize)]
pub struct CloudflareDnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    pub ttl: u32,
    #[serde(default)]
    pub priority: Option<u16>,
    /// SRV 等复杂记录类型的结构化数据
    #[serde(default)]
    pub data: Option<CloudflareSrvData>,
}

/// SRV 记录的 data 字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareSrvData {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// 创建/替换记录的请求体
#[derive(Debug, Serialize)]
pub struct CloudflareRecordBody {
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CloudflareSrvData>,
}

/// 创建 Zone 的请求体
#[derive(Debug, Serialize)]
pub struct CreateZoneBody<'a> {
    pub name: &'a str,
    pub account: AccountRef<'a>,
    #[serde(rename = "type")]
    pub zone_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AccountRef<'a> {
    pub id: &'a str,
}
