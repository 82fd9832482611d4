//! Async SX1276/77/78/79 (HopeRF RFM95/96/98) LoRa driver.
//!
//! Only what a transmit-only sensor node needs. Modem settings match RadioHead's
//! `RH_RF95` defaults (125 kHz, 4/5, SF7, CRC on, preamble 8) and every packet
//! carries RadioHead's 4-byte header, so stock RH_RF95 receivers accept it.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Error as _, ErrorKind};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::{Operation, SpiDevice};

use crate::node::Radio;

const REG_FIFO: u8 = 0x00;
const REG_OP_MODE: u8 = 0x01;
const REG_FRF_MSB: u8 = 0x06;
const REG_FRF_MID: u8 = 0x07;
const REG_FRF_LSB: u8 = 0x08;
const REG_PA_CONFIG: u8 = 0x09;
const REG_FIFO_ADDR_PTR: u8 = 0x0d;
const REG_FIFO_TX_BASE_ADDR: u8 = 0x0e;
const REG_FIFO_RX_BASE_ADDR: u8 = 0x0f;
const REG_IRQ_FLAGS: u8 = 0x12;
const REG_MODEM_CONFIG_1: u8 = 0x1d;
const REG_MODEM_CONFIG_2: u8 = 0x1e;
const REG_PREAMBLE_MSB: u8 = 0x20;
const REG_PREAMBLE_LSB: u8 = 0x21;
const REG_PAYLOAD_LENGTH: u8 = 0x22;
const REG_MODEM_CONFIG_3: u8 = 0x26;
const REG_DIO_MAPPING_1: u8 = 0x40;
const REG_VERSION: u8 = 0x42;
const REG_PA_DAC: u8 = 0x4d;

const WRITE: u8 = 0x80;

const MODE_LONG_RANGE: u8 = 0x80;
const MODE_SLEEP: u8 = 0x00;
const MODE_STDBY: u8 = 0x01;
const MODE_TX: u8 = 0x03;

const IRQ_TX_DONE: u8 = 0x08;
const DIO0_TX_DONE: u8 = 0x40;

const PA_SELECT_BOOST: u8 = 0x80;
const PA_DAC_DEFAULT: u8 = 0x84;
const PA_DAC_HIGH_POWER: u8 = 0x87;

/// Bw125Cr45Sf128.
const MODEM_CONFIG: [u8; 3] = [0x72, 0x74, 0x04];
const PREAMBLE_LEN: u16 = 8;

const SILICON_VERSION: u8 = 0x12;
const CRYSTAL_HZ: u64 = 32_000_000;

/// RadioHead header: to, from, id, flags. Broadcast both ways.
const RH_HEADER: [u8; 4] = [0xff, 0xff, 0x00, 0x00];
const FIFO_LEN: usize = 255;
pub const MAX_PAYLOAD_LEN: usize = FIFO_LEN - RH_HEADER.len();

/// A 16-byte packet at SF7/125 kHz is ~50 ms on air.
const TX_TIMEOUT_MS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    Spi(ErrorKind),
    Reset,
    /// Something answered on the bus, but not an SX127x.
    UnknownVersion(u8),
    /// OP_MODE did not read back LoRa sleep.
    ModeRejected(u8),
    PayloadTooLarge(usize),
    TxTimeout,
}

pub struct Sx127x<SPI, RST, D> {
    spi: SPI,
    reset: RST,
    delay: D,
    airtime_ms: Option<u32>,
}

impl<SPI, RST, D> Sx127x<SPI, RST, D>
where
    SPI: SpiDevice,
    RST: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, reset: RST, delay: D) -> Self {
        Self {
            spi,
            reset,
            delay,
            airtime_ms: None,
        }
    }

    /// Milliseconds between entering TX and TxDone for the last successful send,
    /// at the 1 ms resolution of the TxDone poll.
    pub fn last_airtime_ms(&self) -> Option<u32> {
        self.airtime_ms
    }

    pub async fn version(&mut self) -> Result<u8, RadioError> {
        self.read_register(REG_VERSION).await
    }

    async fn read_register(&mut self, register: u8) -> Result<u8, RadioError> {
        let mut buf = [register & !WRITE, 0];
        self.spi
            .transfer_in_place(&mut buf)
            .await
            .map_err(|e| RadioError::Spi(e.kind()))?;
        Ok(buf[1])
    }

    async fn write_register(&mut self, register: u8, value: u8) -> Result<(), RadioError> {
        self.spi
            .write(&[register | WRITE, value])
            .await
            .map_err(|e| RadioError::Spi(e.kind()))
    }

    async fn set_mode(&mut self, mode: u8) -> Result<(), RadioError> {
        self.write_register(REG_OP_MODE, MODE_LONG_RANGE | mode).await
    }

    async fn hard_reset(&mut self) -> Result<(), RadioError> {
        self.reset.set_low().map_err(|_| RadioError::Reset)?;
        self.delay.delay_us(100).await;
        self.reset.set_high().map_err(|_| RadioError::Reset)?;
        self.delay.delay_ms(5).await;
        Ok(())
    }

    /// Polls for TxDone and returns the elapsed milliseconds.
    async fn wait_tx_done(&mut self) -> Result<u32, RadioError> {
        for elapsed_ms in 0..TX_TIMEOUT_MS {
            if self.read_register(REG_IRQ_FLAGS).await? & IRQ_TX_DONE != 0 {
                self.write_register(REG_IRQ_FLAGS, 0xff).await?;
                return Ok(elapsed_ms);
            }
            self.delay.delay_ms(1).await;
        }
        Err(RadioError::TxTimeout)
    }
}

/// FRF register value for a carrier frequency: f · 2¹⁹ / 32 MHz.
pub const fn frf(frequency_hz: u32) -> u32 {
    (((frequency_hz as u64) << 19) / CRYSTAL_HZ) as u32
}

/// PA_CONFIG and PA_DAC for a PA_BOOST output power, clamped to 2..=20 dBm.
pub const fn pa_settings(dbm: i8) -> (u8, u8) {
    let dbm = if dbm > 20 {
        20
    } else if dbm < 2 {
        2
    } else {
        dbm
    };
    // Above 17 dBm the high-power DAC adds 3 dB on top of the configured level.
    let (level, dac) = if dbm > 17 {
        (dbm - 3, PA_DAC_HIGH_POWER)
    } else {
        (dbm, PA_DAC_DEFAULT)
    };
    (PA_SELECT_BOOST | (level - 2) as u8, dac)
}

impl<SPI, RST, D> Radio for Sx127x<SPI, RST, D>
where
    SPI: SpiDevice,
    RST: OutputPin,
    D: DelayNs,
{
    type Error = RadioError;

    async fn init(&mut self) -> Result<(), RadioError> {
        self.hard_reset().await?;

        let version = self.version().await?;
        if version != SILICON_VERSION {
            return Err(RadioError::UnknownVersion(version));
        }

        // LoRa mode can only be entered from sleep.
        self.write_register(REG_OP_MODE, MODE_SLEEP).await?;
        self.set_mode(MODE_SLEEP).await?;
        self.delay.delay_ms(10).await;
        let mode = self.read_register(REG_OP_MODE).await?;
        if mode != MODE_LONG_RANGE | MODE_SLEEP {
            return Err(RadioError::ModeRejected(mode));
        }

        // Whole FIFO for either direction.
        self.write_register(REG_FIFO_TX_BASE_ADDR, 0).await?;
        self.write_register(REG_FIFO_RX_BASE_ADDR, 0).await?;
        self.set_mode(MODE_STDBY).await?;

        self.write_register(REG_MODEM_CONFIG_1, MODEM_CONFIG[0]).await?;
        self.write_register(REG_MODEM_CONFIG_2, MODEM_CONFIG[1]).await?;
        self.write_register(REG_MODEM_CONFIG_3, MODEM_CONFIG[2]).await?;
        let [msb, lsb] = PREAMBLE_LEN.to_be_bytes();
        self.write_register(REG_PREAMBLE_MSB, msb).await?;
        self.write_register(REG_PREAMBLE_LSB, lsb).await?;

        debug!("sx127x ready, version {}", version);
        Ok(())
    }

    async fn set_frequency(&mut self, frequency_hz: u32) -> Result<(), RadioError> {
        let [_, msb, mid, lsb] = frf(frequency_hz).to_be_bytes();
        self.write_register(REG_FRF_MSB, msb).await?;
        self.write_register(REG_FRF_MID, mid).await?;
        self.write_register(REG_FRF_LSB, lsb).await
    }

    async fn set_tx_power(&mut self, dbm: i8) -> Result<(), RadioError> {
        let (pa_config, pa_dac) = pa_settings(dbm);
        self.write_register(REG_PA_DAC, pa_dac).await?;
        self.write_register(REG_PA_CONFIG, pa_config).await
    }

    async fn send(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        self.airtime_ms = None;
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(RadioError::PayloadTooLarge(payload.len()));
        }

        self.set_mode(MODE_STDBY).await?;
        self.write_register(REG_FIFO_ADDR_PTR, 0).await?;
        self.spi
            .transaction(&mut [
                Operation::Write(&[REG_FIFO | WRITE]),
                Operation::Write(&RH_HEADER),
                Operation::Write(payload),
            ])
            .await
            .map_err(|e| RadioError::Spi(e.kind()))?;
        self.write_register(REG_PAYLOAD_LENGTH, (RH_HEADER.len() + payload.len()) as u8)
            .await?;

        self.write_register(REG_DIO_MAPPING_1, DIO0_TX_DONE).await?;
        self.set_mode(MODE_TX).await?;
        let elapsed_ms = self.wait_tx_done().await?;
        debug!("TxDone after {} ms", elapsed_ms);
        self.airtime_ms = Some(elapsed_ms);
        Ok(())
    }

    async fn sleep(&mut self) -> Result<(), RadioError> {
        self.set_mode(MODE_SLEEP).await
    }
}
