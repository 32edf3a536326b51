use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::error::FetchError;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client; the timeout of the first call wins for the process lifetime.
pub fn http_client(timeout: Duration) -> Result<&'static Client, FetchError> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)
    })
}
