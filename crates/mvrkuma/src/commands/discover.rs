//! `discover`: poll for Art-Net nodes and export them as a show file.

use std::path::PathBuf;
use std::time::Duration;

use tabled::Tabled;

use mvrkuma_core::discovery::DEFAULT_DISCOVERY_OUTPUT;
use mvrkuma_core::{ArtNetDiscovery, CoreError, DiscoveredDevice, discovered_scene};

use crate::cli::{DiscoverArgs, GlobalOpts};
use crate::commands::util;
use crate::config::Config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Short name")]
    short_name: String,
    #[tabled(rename = "Long name")]
    long_name: String,
    #[tabled(rename = "DMX")]
    dmx: String,
}

fn device_row(d: &DiscoveredDevice) -> DeviceRow {
    DeviceRow {
        ip: d.ip_address.to_string(),
        short_name: d.short_name.clone(),
        long_name: d.long_name.clone(),
        dmx: match (d.universe, d.address) {
            (Some(u), Some(a)) => format!("{u}.{a}"),
            _ => String::new(),
        },
    }
}

fn scan_timeout(secs: f64) -> Result<Duration, CliError> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or_else(|| CliError::Validation {
            field: "scan-timeout".into(),
            reason: format!("expected a positive number of seconds, got {secs}"),
        })
}

pub async fn handle(args: DiscoverArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let bind = match args.bind {
        Some(ip) => ip,
        None => cfg.discovery_bind()?,
    };
    let timeout = match args.scan_timeout {
        Some(secs) => scan_timeout(secs)?,
        None => cfg.discovery_timeout()?,
    };

    let spinner = util::spinner(
        &format!("Polling Art-Net from {bind} for {:.1}s…", timeout.as_secs_f64()),
        global.quiet,
    );
    let devices = ArtNetDiscovery::new(bind, timeout).discover().await;
    spinner.finish_and_clear();
    let devices = devices?;

    let out = output::render_list(&global.output, &devices, device_row, |d| {
        d.ip_address.to_string()
    });
    output::print_output(&out, global.quiet);

    if args.no_save {
        return Ok(());
    }
    let path = args.out.unwrap_or_else(|| PathBuf::from(DEFAULT_DISCOVERY_OUTPUT));
    discovered_scene(&devices)?
        .write(&path)
        .map_err(CoreError::from)?;
    output::print_status(
        &format!("Saved {} devices to {}", devices.len(), path.display()),
        global.quiet,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    #[test]
    fn non_positive_timeouts_are_rejected() {
        assert!(scan_timeout(0.0).is_err());
        assert!(scan_timeout(-1.0).is_err());
        assert!(scan_timeout(f64::NAN).is_err());
        assert_eq!(scan_timeout(0.5).ok(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn patch_column_needs_both_halves() {
        let mut device = DiscoveredDevice {
            ip_address: IpAddr::V4(Ipv4Addr::new(2, 0, 0, 10)),
            short_name: "Node".into(),
            long_name: "DMX: 17 Universe: 2".into(),
            universe: Some(2),
            address: Some(17),
        };
        assert_eq!(device_row(&device).dmx, "2.17");
        device.address = None;
        assert_eq!(device_row(&device).dmx, "");
    }
}
