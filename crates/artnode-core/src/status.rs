//! Status and per-port flag bits reported in ArtPollReply

/// Status1
pub mod status1 {
    pub const INDICATOR_MASK: u8 = 3 << 6;
    pub const INDICATOR_LOCATE_MODE: u8 = 1 << 6;
    pub const INDICATOR_MUTE_MODE: u8 = 2 << 6;
    pub const INDICATOR_NORMAL_MODE: u8 = 3 << 6;
    pub const PAP_FRONT_PANEL: u8 = 1 << 4;
    pub const PAP_NETWORK: u8 = 2 << 4;
    pub const NORMAL_FIRMWARE_BOOT: u8 = 0 << 2;
    pub const RDM_CAPABLE: u8 = 1 << 1;
}

/// Status2
pub mod status2 {
    pub const WEB_BROWSER_SUPPORT: u8 = 1 << 0;
    pub const IP_DHCP: u8 = 1 << 1;
    pub const DHCP_CAPABLE: u8 = 1 << 2;
    pub const PORT_ADDRESS_15BIT: u8 = 1 << 3;
    pub const SACN_ABLE_TO_SWITCH: u8 = 1 << 4;
    pub const OUTPUT_STYLE_SWITCH: u8 = 1 << 6;
    pub const RDM_SWITCH: u8 = 1 << 7;
}

/// Status3
pub mod status3 {
    pub const NETWORKLOSS_MASK: u8 = 3 << 6;
    pub const NETWORKLOSS_LAST_STATE: u8 = 0 << 6;
    pub const NETWORKLOSS_OFF_STATE: u8 = 1 << 6;
    pub const NETWORKLOSS_ON_STATE: u8 = 2 << 6;
    pub const NETWORKLOSS_PLAYBACK: u8 = 3 << 6;
    pub const FAILSAFE_CONTROL: u8 = 1 << 5;
    pub const SUPPORTS_LLRP: u8 = 1 << 4;
    pub const OUTPUT_SWITCH: u8 = 1 << 3;
}

/// GoodOutput
pub mod good_output {
    pub const DATA_IS_BEING_TRANSMITTED: u8 = 1 << 7;
    pub const MERGE_ACTIVE: u8 = 1 << 3;
    pub const MERGE_MODE_LTP: u8 = 1 << 1;
    pub const OUTPUT_IS_SACN: u8 = 1 << 0;
}

/// GoodOutputB
pub mod good_output_b {
    pub const RDM_DISABLED: u8 = 1 << 7;
    pub const STYLE_CONSTANT: u8 = 1 << 6;
    pub const DISCOVERY_NOT_RUNNING: u8 = 1 << 5;
    pub const DISCOVERY_DISABLED: u8 = 1 << 4;
}

/// GoodInput
pub mod good_input {
    pub const DATA_RECEIVED: u8 = 1 << 7;
    pub const DISABLED: u8 = 1 << 3;
    pub const ERRORS: u8 = 1 << 2;
}

/// PortTypes
pub mod port_type {
    pub const OUTPUT_ARTNET: u8 = 1 << 7;
    pub const INPUT_ARTNET: u8 = 1 << 6;
    pub const PROTOCOL_DMX: u8 = 0x00;
}

/// NodeReport codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum ReportCode {
    Debug = 0x0000,
    #[default]
    PowerOk = 0x0001,
    PowerFail = 0x0002,
    SocketWr1 = 0x0003,
    ParseFail = 0x0004,
    UdpFail = 0x0005,
    ShortNameOk = 0x0006,
    LongNameOk = 0x0007,
    DmxError = 0x0008,
    DmxUdpFull = 0x0009,
    DmxRxFull = 0x000A,
    SwitchError = 0x000B,
    ConfigError = 0x000C,
    DmxShort = 0x000D,
    FirmwareFail = 0x000E,
    UserFail = 0x000F,
}
