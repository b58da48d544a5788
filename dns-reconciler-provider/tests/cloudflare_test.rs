//! Cloudflare Provider 集成测试
//!
//! 运行方式:
//! ```bash
//! CLOUDFLARE_API_TOKEN=xxx TEST_DOMAIN=example.com \
//!     cargo test -p dns-reconciler-provider --test cloudflare_test -- --ignored --nocapture --test-threads=1
//! ```

mod common;

use common::{TestContext, generate_test_record_name, test_record_pair};
use dns_reconciler_provider::{DnsRecordType, ProviderError};

// ============ Zone 测试 ============

#[tokio::test]
#[ignore]
async fn test_cloudflare_list_zones() {
    skip_if_no_credentials!("CLOUDFLARE_API_TOKEN", "TEST_DOMAIN");

    let ctx = TestContext::cloudflare().expect("创建测试上下文失败");
    let zones = require_ok!(ctx.provider.list_zones().await, "list_zones 调用失败");

    assert!(
        zones
            .iter()
            .any(|z| z.name.trim_end_matches('.') == ctx.zone_name),
        "Zone 列表中应包含测试域名"
    );
    println!("✓ list_zones 测试通过，共 {} 个 Zone", zones.len());
}

#[tokio::test]
#[ignore]
async fn test_cloudflare_get_zone() {
    skip_if_no_credentials!("CLOUDFLARE_API_TOKEN", "TEST_DOMAIN");

    let mut ctx = TestContext::cloudflare().expect("创建测试上下文失败");
    let zone_id = ctx.find_zone_id().await.expect("找不到测试 Zone");

    let detail = require_ok!(ctx.provider.get_zone(&zone_id).await, "get_zone 调用失败");
    assert_eq!(detail.name, ctx.zone_name);
    assert!(!detail.name_servers.is_empty(), "应返回 name servers");
    println!("✓ get_zone 测试通过: {} 条记录", detail.record_count);
}

#[tokio::test]
#[ignore]
async fn test_cloudflare_get_unknown_zone() {
    skip_if_no_credentials!("CLOUDFLARE_API_TOKEN", "TEST_DOMAIN");

    let ctx = TestContext::cloudflare().expect("创建测试上下文失败");
    let result = ctx
        .provider
        .get_zone("00000000000000000000000000000000")
        .await;
    assert!(
        matches!(
            result,
            Err(ProviderError::ZoneNotFound { .. } | ProviderError::PermissionDenied { .. })
        ),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
#[ignore]
async fn test_cloudflare_list_records_excludes_soa_ns() {
    skip_if_no_credentials!("CLOUDFLARE_API_TOKEN", "TEST_DOMAIN");

    let mut ctx = TestContext::cloudflare().expect("创建测试上下文失败");
    let zone_id = ctx.find_zone_id().await.expect("找不到测试 Zone");

    let records = require_ok!(ctx.provider.list_records(&zone_id).await);
    assert!(records.iter().all(|r| !r.record_type.is_provider_managed()));
    println!("✓ list_records 测试通过，共 {} 条记录", records.len());
}

// ============ 清理测试 ============

/// 清理所有残留的测试记录（手动运行）
#[tokio::test]
#[ignore]
async fn test_cloudflare_cleanup_test_records() {
    skip_if_no_credentials!("CLOUDFLARE_API_TOKEN", "TEST_DOMAIN");

    let mut ctx = TestContext::cloudflare().expect("创建测试上下文失败");
    let zone_id = ctx.find_zone_id().await.expect("找不到测试 Zone");

    ctx.cleanup_all_test_records(&zone_id).await;
    println!("✓ 清理完成");
}

// ============ Upsert / Delete 测试宏 ============

macro_rules! upsert_test {
    ($test_name:ident, $record_type:expr) => {
        #[tokio::test]
        #[ignore]
        async fn $test_name() {
            skip_if_no_credentials!("CLOUDFLARE_API_TOKEN", "TEST_DOMAIN");

            let mut ctx = TestContext::cloudflare().expect("创建测试上下文失败");
            let zone_id = ctx.find_zone_id().await.expect("找不到测试 Zone");

            let name = generate_test_record_name();
            let (first, second) = test_record_pair(&name, $record_type);

            // 1. upsert twice: exactly one copy remains
            require_ok!(ctx.provider.upsert_records(&zone_id, &[first.clone()]).await);
            require_ok!(ctx.provider.upsert_records(&zone_id, &[first.clone()]).await);

            let records = require_ok!(ctx.provider.list_records(&zone_id).await);
            let at_name: Vec<_> = records.iter().filter(|r| r.key() == first.key()).collect();
            assert_eq!(at_name.len(), 1, "upsert 应当幂等");
            assert_eq!(at_name[0].value, first.value);

            // 2. second value: CNAME replaces, other types add
            require_ok!(ctx.provider.upsert_records(&zone_id, &[second.clone()]).await);
            let records = require_ok!(ctx.provider.list_records(&zone_id).await);
            let count = records.iter().filter(|r| r.key() == first.key()).count();
            let expected = if $record_type == DnsRecordType::Cname { 1 } else { 2 };
            assert_eq!(count, expected);

            // 3. delete both; deleting again is a no-op
            require_ok!(
                ctx.provider
                    .delete_records(&zone_id, &[first.clone(), second.clone()])
                    .await
            );
            require_ok!(ctx.provider.delete_records(&zone_id, &[first.clone()]).await);

            let records = require_ok!(ctx.provider.list_records(&zone_id).await);
            assert!(records.iter().all(|r| r.key() != first.key()));

            println!("✓ {} upsert/delete 测试通过", $record_type);
        }
    };
}

upsert_test!(test_cloudflare_upsert_a, DnsRecordType::A);
upsert_test!(test_cloudflare_upsert_aaaa, DnsRecordType::Aaaa);
upsert_test!(test_cloudflare_upsert_cname, DnsRecordType::Cname);
upsert_test!(test_cloudflare_upsert_mx, DnsRecordType::Mx);
upsert_test!(test_cloudflare_upsert_txt, DnsRecordType::Txt);
