//! Known device emulation profiles.

use crate::utils::error::BrowserError;

/// Viewport, user agent and input capabilities for one emulated device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub mobile: bool,
    pub touch: bool,
    pub user_agent: &'static str,
}

pub const KNOWN_DEVICES: &[DeviceProfile] = &[
    DeviceProfile {
        name: "Moto G4",
        width: 360,
        height: 640,
        device_scale_factor: 3.0,
        mobile: true,
        touch: true,
        user_agent: "Mozilla/5.0 (Linux; Android 7.0; Moto G (4)) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
    },
    DeviceProfile {
        name: "Pixel 5",
        width: 393,
        height: 851,
        device_scale_factor: 2.75,
        mobile: true,
        touch: true,
        user_agent: "Mozilla/5.0 (Linux; Android 11; Pixel 5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
    },
    DeviceProfile {
        name: "Galaxy S9+",
        width: 320,
        height: 658,
        device_scale_factor: 4.5,
        mobile: true,
        touch: true,
        user_agent: "Mozilla/5.0 (Linux; Android 8.0.0; SM-G965U Build/R16NW) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
    },
    DeviceProfile {
        name: "iPhone 12",
        width: 390,
        height: 844,
        device_scale_factor: 3.0,
        mobile: true,
        touch: true,
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 14_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1",
    },
    DeviceProfile {
        name: "iPhone SE",
        width: 320,
        height: 568,
        device_scale_factor: 2.0,
        mobile: true,
        touch: true,
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 10_3_1 like Mac OS X) AppleWebKit/603.1.30 (KHTML, like Gecko) Version/10.0 Mobile/14E304 Safari/602.1",
    },
    DeviceProfile {
        name: "iPad Mini",
        width: 768,
        height: 1024,
        device_scale_factor: 2.0,
        mobile: true,
        touch: true,
        user_agent: "Mozilla/5.0 (iPad; CPU OS 11_0 like Mac OS X) AppleWebKit/604.1.34 (KHTML, like Gecko) Version/11.0 Mobile/15A5341f Safari/604.1",
    },
    DeviceProfile {
        name: "Desktop",
        width: 1350,
        height: 940,
        device_scale_factor: 1.0,
        mobile: false,
        touch: false,
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    },
];

/// Look up a device profile by its exact name
pub fn find_device(name: &str) -> Result<&'static DeviceProfile, BrowserError> {
    KNOWN_DEVICES
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| BrowserError::UnknownDevice(name.to_string()))
}

/// Every valid `--device` value
pub fn device_names() -> Vec<&'static str> {
    KNOWN_DEVICES.iter().map(|d| d.name).collect()
}
