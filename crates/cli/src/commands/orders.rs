//! Order export through the REST API.
//!
//! Writes the same CSV or tab-separated file as the back-office export
//! menu. The print layout only exists in the back office.

use std::path::PathBuf;

use secrecy::SecretString;

use spice_hub_client::{ApiClient, ClientError};
use spice_hub_core::analytics::filter_orders_by_status;
use spice_hub_core::export::{
    ExportError, ExportFormat, export_filename, order_rows, orders_to_delimited,
};

#[derive(Debug, thiserror::Error)]
pub enum OrderExportError {
    #[error(transparent)]
    Format(#[from] ExportError),

    #[error("The print layout is only available in the back office")]
    PrintUnsupported,

    #[error("API error: {0}")]
    Api(#[from] ClientError),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a format argument, rejecting `print`.
fn file_format(format: &str) -> Result<ExportFormat, OrderExportError> {
    match format.parse::<ExportFormat>()? {
        ExportFormat::Print => Err(OrderExportError::PrintUnsupported),
        other => Ok(other),
    }
}

/// Fetch orders and customers, keep those with `status`, and write the file.
///
/// # Errors
///
/// Returns an error if the format is not a file format, the API call fails,
/// or the output cannot be written.
pub async fn export(
    api_url: &str,
    token: Option<String>,
    format: &str,
    status: &str,
    output: Option<PathBuf>,
) -> Result<PathBuf, OrderExportError> {
    let format = file_format(format)?;
    let api = ApiClient::new(api_url)?.with_token(token.map(SecretString::from));
    if !api.has_token() {
        tracing::warn!("No API token given; the order listing requires an admin token");
    }

    let (orders, users) = tokio::try_join!(api.list_orders(), api.list_users())?;
    let selected = filter_orders_by_status(&orders, status);
    let body = orders_to_delimited(&order_rows(&selected, &users), format);

    let path = output.unwrap_or_else(|| {
        PathBuf::from(export_filename("orders", format, chrono::Utc::now().date_naive()))
    });
    tokio::fs::write(&path, body).await?;

    tracing::info!(
        rows = selected.len(),
        total = orders.len(),
        path = %path.display(),
        "Orders exported"
    );
    Ok(path)
}
