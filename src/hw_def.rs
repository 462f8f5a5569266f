//! Hardware definitions: I²C addresses, command opcodes and status register layout.

#[cfg(feature = "defmt")]
use defmt::Format;

/// I²C address of the device, selected by the level of the ADDR pin
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum I2cAddr {
    /// ADDR pin tied low (0x44)
    #[default]
    AddrA,
    /// ADDR pin tied high (0x45)
    AddrB,
}
impl I2cAddr {
    /// 7-bit bus address
    pub const fn as_u8(self) -> u8 {
        match self {
            I2cAddr::AddrA => I2C_ADDR_A,
            I2cAddr::AddrB => I2C_ADDR_B,
        }
    }
}
pub(crate) const I2C_ADDR_A: u8 = 0x44;
pub(crate) const I2C_ADDR_B: u8 = 0x45;

pub(crate) const CMD_SOFT_RESET: u16 = 0x30A2;
pub(crate) const CMD_HEATER_ON: u16 = 0x306D;
pub(crate) const CMD_HEATER_OFF: u16 = 0x3066;
pub(crate) const CMD_ENABLE_ART: u16 = 0x2B32;
pub(crate) const CMD_BREAK: u16 = 0x3093;
pub(crate) const CMD_FETCH: u16 = 0xE000;
pub(crate) const CMD_GET_STATUS: u16 = 0x3041;

// single shot, clock stretching enabled
pub(crate) const CMD_SINGLE_CS_HIGH: u16 = 0x2C06;
pub(crate) const CMD_SINGLE_CS_MEDIUM: u16 = 0x2C0D;
pub(crate) const CMD_SINGLE_CS_LOW: u16 = 0x2C10;

// periodic, indexed [sample rate][repeatability]
const PERIODIC_TABLE: [[u16; 3]; 5] = [
    [0x2032, 0x2024, 0x202F],
    [0x2130, 0x2126, 0x212D],
    [0x2236, 0x2220, 0x222B],
    [0x2334, 0x2322, 0x2329],
    [0x2737, 0x2721, 0x272A],
];

pub(crate) const STATUS_FIELD_LSBIT_ALERT_PENDING: u16 = 15;
pub(crate) const STATUS_FIELD_LSBIT_HEATER_ON: u16 = 13;
pub(crate) const STATUS_FIELD_LSBIT_RH_TRACKING_ALERT: u16 = 11;
pub(crate) const STATUS_FIELD_LSBIT_T_TRACKING_ALERT: u16 = 10;
pub(crate) const STATUS_FIELD_LSBIT_RESET_DETECTED: u16 = 4;
pub(crate) const STATUS_FIELD_LSBIT_COMMAND_FAILED: u16 = 1;
pub(crate) const STATUS_FIELD_LSBIT_WRITE_CHECKSUM_FAILED: u16 = 0;

/// Measurement repeatability.  Higher repeatability means lower noise and a longer measurement.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Repeatability {
    /// high repeatability
    High,
    /// medium repeatability
    Medium,
    /// low repeatability
    Low,
}
impl Repeatability {
    const ALL: [Repeatability; 3] = [Repeatability::High, Repeatability::Medium, Repeatability::Low];

    const fn index(self) -> usize {
        match self {
            Repeatability::High => 0,
            Repeatability::Medium => 1,
            Repeatability::Low => 2,
        }
    }
}

/// Number of measurements per second in periodic mode
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SampleRate {
    /// 0.5 measurements per second
    Periodic500mHz,
    /// 1 measurement per second
    Periodic1Hz,
    /// 2 measurements per second
    Periodic2Hz,
    /// 4 measurements per second
    Periodic4Hz,
    /// 10 measurements per second
    Periodic10Hz,
}
impl SampleRate {
    const ALL: [SampleRate; 5] = [
        SampleRate::Periodic500mHz,
        SampleRate::Periodic1Hz,
        SampleRate::Periodic2Hz,
        SampleRate::Periodic4Hz,
        SampleRate::Periodic10Hz,
    ];

    const fn index(self) -> usize {
        match self {
            SampleRate::Periodic500mHz => 0,
            SampleRate::Periodic1Hz => 1,
            SampleRate::Periodic2Hz => 2,
            SampleRate::Periodic4Hz => 3,
            SampleRate::Periodic10Hz => 4,
        }
    }
}

/// Single-shot measurement with clock stretching enabled.  The sensor holds the clock until the
/// result is ready, so the result is read in the same bus exchange as the command.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SingleShot(pub Repeatability);
impl SingleShot {
    /// 16-bit opcode
    pub const fn opcode(self) -> u16 {
        match self.0 {
            Repeatability::High => CMD_SINGLE_CS_HIGH,
            Repeatability::Medium => CMD_SINGLE_CS_MEDIUM,
            Repeatability::Low => CMD_SINGLE_CS_LOW,
        }
    }
    /// Opcode in transmission order
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.opcode().to_be_bytes()
    }
}

/// Commands which start periodic (self-timed) sampling on the sensor
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Periodic {
    /// sample continuously at the given rate and repeatability
    Sampling(SampleRate, Repeatability),
    /// accelerated response time: sample at 4 Hz with faster settling
    AcceleratedResponseTime,
}
impl Periodic {
    /// 16-bit opcode
    pub const fn opcode(self) -> u16 {
        match self {
            Periodic::Sampling(rate, repeatability) => PERIODIC_TABLE[rate.index()][repeatability.index()],
            Periodic::AcceleratedResponseTime => CMD_ENABLE_ART,
        }
    }
    /// Opcode in transmission order
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.opcode().to_be_bytes()
    }
}

/// Fixed single-purpose commands
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Control {
    /// software reset; only accepted while the sensor is idle
    SoftReset,
    /// enable the heater
    HeaterOn,
    /// disable the heater
    HeaterOff,
    /// stop periodic sampling and return to idle
    Break,
    /// fetch the latest periodic sample
    Fetch,
    /// request the status register
    GetStatus,
}
impl Control {
    /// 16-bit opcode
    pub const fn opcode(self) -> u16 {
        match self {
            Control::SoftReset => CMD_SOFT_RESET,
            Control::HeaterOn => CMD_HEATER_ON,
            Control::HeaterOff => CMD_HEATER_OFF,
            Control::Break => CMD_BREAK,
            Control::Fetch => CMD_FETCH,
            Control::GetStatus => CMD_GET_STATUS,
        }
    }
    /// Opcode in transmission order
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.opcode().to_be_bytes()
    }
}

/// Any command understood by the SHT3x
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Command {
    /// single-shot measurement
    SingleShot(SingleShot),
    /// start of periodic sampling
    Periodic(Periodic),
    /// fixed command
    Control(Control),
}
impl Command {
    /// 16-bit opcode
    pub const fn opcode(self) -> u16 {
        match self {
            Command::SingleShot(cmd) => cmd.opcode(),
            Command::Periodic(cmd) => cmd.opcode(),
            Command::Control(cmd) => cmd.opcode(),
        }
    }
    /// Opcode in transmission order
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.opcode().to_be_bytes()
    }
    /// Belongs to the single-shot set
    pub const fn is_single_shot(self) -> bool {
        matches!(self, Command::SingleShot(_))
    }
    /// Belongs to the periodic set
    pub const fn is_periodic(self) -> bool {
        matches!(self, Command::Periodic(_))
    }
}

impl From<SingleShot> for Command {
    fn from(cmd: SingleShot) -> Self {
        Command::SingleShot(cmd)
    }
}
impl From<Periodic> for Command {
    fn from(cmd: Periodic) -> Self {
        Command::Periodic(cmd)
    }
}
impl From<Control> for Command {
    fn from(cmd: Control) -> Self {
        Command::Control(cmd)
    }
}

/// Unknown 16-bit opcode
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UnknownOpcode(pub u16);

impl TryFrom<u16> for Command {
    type Error = UnknownOpcode;

    fn try_from(opcode: u16) -> Result<Self, Self::Error> {
        let control = [
            Control::SoftReset,
            Control::HeaterOn,
            Control::HeaterOff,
            Control::Break,
            Control::Fetch,
            Control::GetStatus,
        ];
        if let Some(cmd) = control.into_iter().find(|cmd| cmd.opcode() == opcode) {
            return Ok(cmd.into());
        }
        if let Some(cmd) = Repeatability::ALL.into_iter().map(SingleShot).find(|cmd| cmd.opcode() == opcode) {
            return Ok(cmd.into());
        }
        if opcode == CMD_ENABLE_ART {
            return Ok(Periodic::AcceleratedResponseTime.into());
        }
        for rate in SampleRate::ALL {
            for repeatability in Repeatability::ALL {
                let cmd = Periodic::Sampling(rate, repeatability);
                if cmd.opcode() == opcode {
                    return Ok(cmd.into());
                }
            }
        }
        Err(UnknownOpcode(opcode))
    }
}
