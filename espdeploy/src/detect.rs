//! Serial port discovery.
//!
//! Enumerates host serial ports with USB metadata and classifies the common
//! USB-to-UART bridges found on ESP32 development boards.

use log::{debug, trace};

/// Known USB bridge chips (plus Espressif's native USB interface).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbBridge {
    /// CH340/CH341 USB-to-serial converter.
    Ch340,
    /// Silicon Labs CP210x USB-to-serial converter.
    Cp210x,
    /// FTDI FT232/FT2232/FT4232 USB-to-serial converter.
    Ftdi,
    /// Prolific PL2303 USB-to-serial converter.
    Prolific,
    /// Espressif native USB (built-in USB-Serial/JTAG).
    Espressif,
    /// Unknown device.
    Unknown,
}

/// Known USB VID/PID pairs. An empty PID list matches any product id under
/// that vendor.
const KNOWN_USB_BRIDGES: &[(u16, &[u16], UsbBridge)] = &[
    (
        0x1A86,
        &[0x7523, 0x7522, 0x5523, 0x5512, 0x55D4],
        UsbBridge::Ch340,
    ),
    (0x10C4, &[0xEA60, 0xEA70, 0xEA71, 0xEA63], UsbBridge::Cp210x),
    (
        0x0403,
        &[0x6001, 0x6010, 0x6011, 0x6014, 0x6015],
        UsbBridge::Ftdi,
    ),
    (0x067B, &[0x2303, 0x23A3, 0x23C3, 0x23D3], UsbBridge::Prolific),
    (0x303A, &[], UsbBridge::Espressif),
];

impl UsbBridge {
    /// Classify a VID/PID combination.
    #[must_use]
    pub fn from_vid_pid(vid: u16, pid: u16) -> Self {
        for (known_vid, pids, bridge) in KNOWN_USB_BRIDGES {
            if vid == *known_vid && (pids.is_empty() || pids.contains(&pid)) {
                return *bridge;
            }
        }
        Self::Unknown
    }

    /// Human-readable name for the bridge kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ch340 => "CH340/CH341",
            Self::Cp210x => "CP210x",
            Self::Ftdi => "FTDI",
            Self::Prolific => "PL2303",
            Self::Espressif => "Espressif USB",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether this is a recognized bridge kind.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// A discovered serial port with USB metadata.
#[derive(Debug, Clone)]
pub struct DetectedPort {
    /// Port name/path (e.g. "/dev/ttyACM0" or "COM3").
    pub name: String,
    /// Classified USB bridge kind.
    pub bridge: UsbBridge,
    /// USB Vendor ID (if available).
    pub vid: Option<u16>,
    /// USB Product ID (if available).
    pub pid: Option<u16>,
    /// Manufacturer string (if available).
    pub manufacturer: Option<String>,
    /// Product string (if available).
    pub product: Option<String>,
    /// Serial number (if available).
    pub serial: Option<String>,
}

impl DetectedPort {
    /// Whether this port looks like an ESP32 development board.
    pub fn is_likely_board(&self) -> bool {
        self.bridge.is_known()
    }
}

/// Enumerate all serial ports with metadata, sorted by name.
pub fn detect_ports() -> Vec<DetectedPort> {
    let mut result = Vec::new();

    match serialport::available_ports() {
        Ok(ports) => {
            for port_info in ports {
                let mut detected = DetectedPort {
                    name: port_info.port_name.clone(),
                    bridge: UsbBridge::Unknown,
                    vid: None,
                    pid: None,
                    manufacturer: None,
                    product: None,
                    serial: None,
                };

                if let serialport::SerialPortType::UsbPort(usb_info) = port_info.port_type {
                    detected.vid = Some(usb_info.vid);
                    detected.pid = Some(usb_info.pid);
                    detected.manufacturer = usb_info.manufacturer;
                    detected.product = usb_info.product;
                    detected.serial = usb_info.serial_number;
                    detected.bridge = UsbBridge::from_vid_pid(usb_info.vid, usb_info.pid);

                    trace!(
                        "found USB port: {} (VID: {:04X}, PID: {:04X}, bridge: {:?})",
                        port_info.port_name, usb_info.vid, usb_info.pid, detected.bridge
                    );
                }

                result.push(detected);
            }
        }
        Err(e) => {
            debug!("failed to enumerate serial ports: {e}");
        }
    }

    result.sort_by(|a, b| a.name.cmp(&b.name));
    result
}
