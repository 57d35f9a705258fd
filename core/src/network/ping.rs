//! Echo probe through the system `ping` command.
//!
//! Used where pnet cannot wait for ICMP replies (Windows). Only the reply line is parsed, and
//! it is recognised by its `TTL=` field, so localized output works as well.

use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::Context;
use tokio::process::Command;
use tracing::debug;

/// Extra time granted to the process on top of its own reply timeout.
const PROCESS_GRACE: Duration = Duration::from_secs(2);

/// Sends a single echo with `ping -n 1 -w <ms>` and returns the replying address.
///
/// `None` when no reply arrived in time.
pub async fn ping_once(destination: Ipv4Addr, timeout: Duration) -> anyhow::Result<Option<Ipv4Addr>> {
    let args: Vec<String> = vec![
        "-n".into(),
        "1".into(),
        "-w".into(),
        timeout.as_millis().to_string(),
        destination.to_string(),
    ];
    let mut child = Command::new("ping");
    child.args(&args).kill_on_drop(true);

    let output = match tokio::time::timeout(timeout + PROCESS_GRACE, child.output()).await {
        Err(_elapsed) => {
            debug!("ping {destination} did not exit in time");
            return Ok(None);
        }
        Ok(result) => result.context("cannot run ping")?,
    };

    Ok(parse_reply(&String::from_utf8_lossy(&output.stdout)))
}

/// First address on a line carrying a `TTL=` field. "Destination host unreachable" lines
/// carry none and are skipped.
pub fn parse_reply(output: &str) -> Option<Ipv4Addr> {
    output
        .lines()
        .filter(|line| line.to_ascii_uppercase().contains("TTL="))
        .find_map(|line| {
            line.split_whitespace()
                .find_map(|word| word.trim_end_matches(':').parse().ok())
        })
}
