//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use dns_reconciler_provider::{
    DnsRecordType, ProviderCredentials, RemoteRecord, ZoneProvider, create_provider,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 生成唯一的测试记录名称（`_test-` 前缀便于清理）
pub fn generate_test_record_name() -> String {
    let nanos = chrono::Utc::now().timestamp_subsec_nanos();
    format!("_test-{nanos:08x}")
}

/// 测试用记录：(初始值, 更新后的值)
pub fn test_record_pair(name: &str, record_type: DnsRecordType) -> (RemoteRecord, RemoteRecord) {
    let (first, second) = match record_type {
        DnsRecordType::A => ("192.0.2.1", "192.0.2.2"),
        DnsRecordType::Aaaa => ("2001:db8::1", "2001:db8::2"),
        DnsRecordType::Cname => ("target1.example.com", "target2.example.com"),
        DnsRecordType::Mx => ("10 mail1.example.com", "20 mail2.example.com"),
        DnsRecordType::Srv => ("0 5 443 srv1.example.com", "10 10 8443 srv2.example.com"),
        _ => ("test-value-1", "test-value-2"),
    };
    (
        RemoteRecord::new(name, record_type, first, 300),
        RemoteRecord::new(name, record_type, second, 300),
    )
}

/// 测试上下文：Provider + 测试 Zone
pub struct TestContext {
    pub provider: Arc<dyn ZoneProvider>,
    pub zone_name: String,
    pub zone_id: Option<String>,
}

impl TestContext {
    /// 创建 Cloudflare 测试上下文
    pub fn cloudflare() -> Option<Self> {
        let api_token = env::var("CLOUDFLARE_API_TOKEN").ok()?;
        let account_id = env::var("CLOUDFLARE_ACCOUNT_ID").ok();
        let zone_name = env::var("TEST_DOMAIN").ok()?;

        let provider = create_provider(ProviderCredentials::Cloudflare {
            api_token,
            account_id,
        })
        .ok()?;

        Some(Self {
            provider,
            zone_name,
            zone_id: None,
        })
    }

    /// 查找测试 Zone 的 id
    pub async fn find_zone_id(&mut self) -> Option<String> {
        if self.zone_id.is_some() {
            return self.zone_id.clone();
        }

        let zones = self.provider.list_zones().await.ok()?;
        let zone = zones
            .into_iter()
            .find(|z| z.name.trim_end_matches('.') == self.zone_name)?;
        self.zone_id = Some(zone.id.clone());
        Some(zone.id)
    }

    /// 清理所有测试记录（以 `_test-` 开头的记录）
    pub async fn cleanup_all_test_records(&self, zone_id: &str) {
        if let Ok(records) = self.provider.list_records(zone_id).await {
            let leftovers: Vec<RemoteRecord> = records
                .into_iter()
                .filter(|r| r.name.starts_with("_test-"))
                .collect();
            let _ = self.provider.delete_records(zone_id, &leftovers).await;
        }
    }
}
