//! # Logging Subscriber
//!
//! [`LogSubscriber`] drains each delivered stream and logs one line per
//! delivery at info level:
//!
//! ```text
//! [new-data] resource=ECB bytes=4096
//! ```
//!
//! Usually registered under the wildcard id so every refresh shows up in the logs.

use std::io;

use crate::core::resource::{DataStream, Subscriber};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSubscriber;

impl Subscriber for LogSubscriber {
    fn on_new_data(&self, resource_id: &str, mut data: DataStream) -> anyhow::Result<()> {
        let bytes = io::copy(&mut data, &mut io::sink())?;
        log::info!("[new-data] resource={} bytes={}", resource_id, bytes);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
