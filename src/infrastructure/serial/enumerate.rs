use crate::core::link::transport::EndpointDescriptor;
use crate::domain::error::PrintLinkResult;
use serialport::SerialPortType;
use tracing::debug;

/// List currently visible serial endpoints with best-effort display names.
///
/// Read-only; never touches a live session. A system with no attached
/// devices yields an empty list, not an error.
pub fn scan() -> PrintLinkResult<Vec<EndpointDescriptor>> {
    let ports = serialport::available_ports()?;
    debug!(count = ports.len(), "enumerated serial ports");
    Ok(ports
        .into_iter()
        .map(|info| EndpointDescriptor {
            display_name: display_name_for(&info.port_type),
            address: info.port_name,
        })
        .collect())
}

fn display_name_for(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => usb
            .product
            .clone()
            .or_else(|| usb.manufacturer.clone())
            .unwrap_or_else(|| format!("{:04x}:{:04x}", usb.vid, usb.pid)),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb(product: Option<&str>, manufacturer: Option<&str>) -> SerialPortType {
        SerialPortType::UsbPort(UsbPortInfo {
            vid: 0x3513,
            pid: 0x0002,
            serial_number: None,
            manufacturer: manufacturer.map(str::to_string),
            product: product.map(str::to_string),
        })
    }

    #[test]
    fn test_display_name_prefers_product() {
        let name = display_name_for(&usb(Some("Label Printer B1"), Some("NIIMBOT")));
        assert_eq!(name, "Label Printer B1");
    }

    #[test]
    fn test_display_name_falls_back_to_manufacturer_then_ids() {
        assert_eq!(display_name_for(&usb(None, Some("NIIMBOT"))), "NIIMBOT");
        assert_eq!(display_name_for(&usb(None, None)), "3513:0002");
    }

    #[test]
    fn test_non_usb_ports_are_unknown() {
        assert_eq!(display_name_for(&SerialPortType::Unknown), "unknown");
        assert_eq!(display_name_for(&SerialPortType::PciPort), "unknown");
    }

    #[test]
    fn test_scan_does_not_error_without_devices() {
        // On a bare CI machine this is typically empty; either way it must
        // produce a list, not an error.
        let descriptors = scan().expect("scan should not fail");
        for descriptor in descriptors {
            assert!(!descriptor.address.is_empty());
            assert!(!descriptor.display_name.is_empty());
        }
    }
}
