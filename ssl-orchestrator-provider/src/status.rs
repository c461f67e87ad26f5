//! Per-vendor order status vocabularies.
//!
//! Mapping native vendor codes onto [`OrderState`] is a provider
//! responsibility; the orchestration layer never interprets raw values.
//! These tables are the reference mappings each platform adapter uses.
//! Codes without a mapping come back as [`OrderState::Unknown`], which
//! callers treat as transient.

use crate::types::OrderState;

/// Maps an Aliyun CAS `DescribeCertificateState` type onto the canonical
/// order state.
///
/// Aliyun reports `domain_verify`, `process`, `verify`, `payed`, `checking`,
/// `certificate` and `failed`; anything else passes through as unknown.
#[cfg(feature = "aliyun")]
#[must_use]
pub fn aliyun_order_state(raw: &str) -> OrderState {
    match raw {
        "domain_verify" => OrderState::DomainVerify,
        "process" | "verify" | "payed" | "checking" => OrderState::Processing,
        "certificate" => OrderState::Issued,
        "failed" => OrderState::Failed,
        other => OrderState::Unknown(other.to_string()),
    }
}

/// Maps a Tencent Cloud SSL numeric certificate status onto the canonical
/// order state.
///
/// Status codes (DescribeCertificate):
/// 0 审核中, 1 已通过, 2 审核失败, 3 已过期, 4 DNS记录添加中,
/// 5 企业证书待提交, 6 订单取消中, 7 已取消, 8 已提交资料待上传确认函,
/// 9 证书吊销中, 10 已吊销, 11 重颁发中, 12 待上传吊销确认函
#[cfg(feature = "tencent")]
#[must_use]
pub fn tencent_order_state(code: u64) -> OrderState {
    match code {
        0 | 4 | 5 | 8 => OrderState::DomainVerify,
        1 => OrderState::Issued,
        2 | 7 | 10 => OrderState::Failed,
        _ => OrderState::Processing,
    }
}

/// Maps a Huawei Cloud SCM certificate status onto the canonical order
/// state.
///
/// Huawei only exposes certificates once an order exists, so an absent
/// status is already treated as issued by its adapter; `PAID`/`CHECKING`
/// are still in flight, `REVOKED`/`EXPIRED` are dead ends.
#[cfg(feature = "huawei")]
#[must_use]
pub fn huawei_order_state(raw: &str) -> OrderState {
    match raw {
        "PAID" | "CHECKING" => OrderState::Processing,
        "ISSUED" => OrderState::Issued,
        "REVOKED" | "EXPIRED" => OrderState::Failed,
        other => OrderState::Unknown(other.to_string()),
    }
}
