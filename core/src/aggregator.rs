use std::collections::HashMap;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::client::ResultClient;
use crate::error::{BreakwaterError, Result};
use crate::types::Scan;

/// Fetches and attaches the server result for every recorded scan.
pub struct ResultAggregator<'a> {
    client: &'a ResultClient,
}

impl<'a> ResultAggregator<'a> {
    pub fn new(client: &'a ResultClient) -> Self {
        Self { client }
    }

    /// Attach results to the scans. Scans whose result never arrives keep
    /// `result` unset and are reported together after every scan has been
    /// attempted.
    pub async fn fetch_results(
        &self,
        scans: &mut HashMap<String, Scan>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut missing = Vec::new();
        for (scan_id, scan) in scans.iter_mut() {
            info!(scan_id = %scan_id, "getting results for scan");
            match self.client.result(scan_id, cancel).await? {
                Some(result) => scan.result = Some(result),
                None => missing.push(scan_id.clone()),
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            missing.sort();
            Err(BreakwaterError::ResultFetch { scan_ids: missing })
        }
    }
}
