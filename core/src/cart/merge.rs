// kifaru-core/src/cart/merge.rs

//! Re-homing an anonymous cart under an authenticated owner.
//!
//! Best-effort and non-transactional: each snapshot row is re-added independently, in snapshot
//! order, and a failure on one row is recorded and skipped. Two logins racing on the same anonymous
//! session can both apply the same snapshot; callers must not rely on exactly-once migration.

use super::CartService;
use crate::models::{CartItem, ProductId};
use crate::ownership::OwnerKey;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedItem {
  pub product_id: ProductId,
  pub quantity: i32,
  pub reason: String,
}

/// What happened to an anonymous cart during a login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
  /// Products re-added under the user's key, in snapshot order.
  pub migrated: Vec<ProductId>,
  pub skipped: Vec<SkippedItem>,
  /// Rows removed from the anonymous cart afterwards.
  pub cleared: u64,
}

impl MergeReport {
  pub fn is_empty(&self) -> bool {
    self.migrated.is_empty() && self.skipped.is_empty() && self.cleared == 0
  }
}

/// Re-adds every snapshot row under `target`, merging quantities with rows `target` already has.
///
/// Rows are processed sequentially, so a later row sees stock as left by earlier ones.
pub async fn rehome_items(cart: &CartService, snapshot: &[CartItem], target: &OwnerKey) -> MergeReport {
  let mut report = MergeReport::default();
  for item in snapshot {
    match cart.add(target, item.product_id, i64::from(item.quantity)).await {
      Ok(added) => {
        report.migrated.push(item.product_id);
        info!(
          product_id = %item.product_id,
          moved = item.quantity,
          now = added.line.item.quantity,
          "Anonymous cart item re-homed."
        );
      }
      Err(err) => {
        if err.is_client_error() {
          info!(product_id = %item.product_id, reason = %err, "Anonymous cart item skipped during merge.");
        } else {
          warn!(product_id = %item.product_id, error = %err, "Anonymous cart item failed to re-home.");
        }
        report.skipped.push(SkippedItem {
          product_id: item.product_id,
          quantity: item.quantity,
          reason: err.to_string(),
        });
      }
    }
  }
  report
}
