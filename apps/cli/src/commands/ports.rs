//! 串口列表命令

use anyhow::{Context, Result};
use servo_link::{DEFAULT_PORT, PortInfo, available_ports};

pub fn execute() -> Result<()> {
    let ports = available_ports().context("Failed to enumerate serial ports")?;
    print!("{}", render(&ports));
    Ok(())
}

fn render(ports: &[PortInfo]) -> String {
    if ports.is_empty() {
        return format!("No serial ports found (default port: {})\n", DEFAULT_PORT);
    }
    ports
        .iter()
        .map(|port| format!("{:<20} {}\n", port.name, port.description))
        .collect()
}
